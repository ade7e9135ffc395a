pub mod bulk_dialog;
pub mod filter_panel;
pub mod help_dialog;
pub mod market_view;
pub mod modal;
pub mod purchase_dialog;
pub mod summary_bar;
pub mod tile_map;
pub mod toast_stack;
pub mod tutorial_banner;

/// Two-decimal display used for prices and costs.
#[must_use]
pub fn fmt_amount(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "0.00".to_string()
    }
}
