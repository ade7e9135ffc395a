use landmark_core::{AvailableTile, PriceProtection, PurchaseValidation, TileDetails};
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use super::fmt_amount;
use super::filter_panel::parse_bound;
use super::modal::Modal;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub open: bool,
    #[prop_or_default]
    pub tile: Option<AvailableTile>,
    #[prop_or_default]
    pub details: Option<TileDetails>,
    pub area: f64,
    #[prop_or_default]
    pub validation: Option<PurchaseValidation>,
    #[prop_or_default]
    pub purchasing: bool,
    #[prop_or_default]
    pub protection: PriceProtection,
    #[prop_or_default]
    pub description: Option<String>,
    pub on_area: Callback<f64>,
    pub on_protection: Callback<PriceProtection>,
    pub on_description: Callback<String>,
    pub on_confirm: Callback<()>,
    pub on_close: Callback<()>,
}

/// Area input is passed through as typed; the flow rejects bad values.
#[must_use]
pub fn parse_area(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn cost_rows(validation: &PurchaseValidation) -> Html {
    html! {
        <dl class="purchase-dialog__costs">
            <dt>{"Gold cost"}</dt><dd>{ fmt_amount(validation.gold_cost) }</dd>
            <dt>{"Carbon cost"}</dt><dd>{ fmt_amount(validation.carbon_cost) }</dd>
            <dt>{"Total"}</dt><dd id="purchase-total">{ fmt_amount(validation.total_cost) }</dd>
            <dt>{"Available area"}</dt><dd>{ fmt_amount(validation.available_area) }</dd>
            <dt>{"Gold balance"}</dt><dd>{ fmt_amount(validation.team_gold_balance) }</dd>
            <dt>{"Carbon balance"}</dt><dd>{ fmt_amount(validation.team_carbon_balance) }</dd>
        </dl>
    }
}

fn ownership_rows(details: &TileDetails) -> Html {
    if details.ownerships.is_empty() {
        return html! { <p class="purchase-dialog__owners">{"No team owns land here yet."}</p> };
    }
    html! {
        <ul class="purchase-dialog__owners">
            { for details.ownerships.iter().map(|o| html! {
                <li key={o.team_id.clone()}>{ format!("{}: {}", o.team_name, fmt_amount(o.owned_area)) }</li>
            }) }
        </ul>
    }
}

#[function_component(PurchaseDialog)]
pub fn purchase_dialog(props: &Props) -> Html {
    let Some(tile) = props.tile.as_ref() else {
        return Html::default();
    };

    let on_area = {
        let cb = props.on_area.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(parse_area(&input.value()));
        })
    };
    let on_description = {
        let cb = props.on_description.clone();
        Callback::from(move |e: Event| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            cb.emit(input.value());
        })
    };
    let on_protect_toggle = {
        let cb = props.on_protection.clone();
        let current = props.protection.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(PriceProtection {
                enabled: input.checked(),
                ..current.clone()
            });
        })
    };
    let on_max_gold = {
        let cb = props.on_protection.clone();
        let current = props.protection.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(PriceProtection {
                max_gold_cost: parse_bound(&input.value()),
                ..current.clone()
            });
        })
    };
    let on_max_carbon = {
        let cb = props.on_protection.clone();
        let current = props.protection.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(PriceProtection {
                max_carbon_cost: parse_bound(&input.value()),
                ..current.clone()
            });
        })
    };
    let on_confirm = {
        let cb = props.on_confirm.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    let on_cancel = {
        let cb = props.on_close.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };

    let can_buy = props
        .validation
        .as_ref()
        .is_some_and(|v| v.can_purchase)
        && !props.purchasing;
    let title = format!("Purchase Tile {}", tile.tile_id);
    let description = format!(
        "{} land, unit price {}",
        tile.land_type,
        fmt_amount(tile.unit_price())
    );

    html! {
        <Modal open={props.open} title={AttrValue::from(title)} description={Some(AttrValue::from(description))} on_close={props.on_close.clone()}>
            <div class="purchase-dialog">
                <label>
                    {"Area"}
                    <input type="number" id="purchase-area" min="1" step="1" value={props.area.to_string()} onchange={on_area} />
                </label>
                { props.validation.as_ref().map(cost_rows).unwrap_or_default() }
                { props.validation.as_ref().filter(|v| !v.errors.is_empty()).map(|v| html! {
                    <ul class="purchase-dialog__errors" role="alert">
                        { for v.errors.iter().map(|err| html! { <li>{ err.clone() }</li> }) }
                    </ul>
                }).unwrap_or_default() }
                { props.details.as_ref().map(ownership_rows).unwrap_or_default() }
                <label>
                    {"Description"}
                    <textarea id="purchase-description" value={props.description.clone().unwrap_or_default()} onchange={on_description} />
                </label>
                <fieldset class="purchase-dialog__protection">
                    <label>
                        <input type="checkbox" id="price-protection" checked={props.protection.enabled} onchange={on_protect_toggle} />
                        {"Price protection"}
                    </label>
                    if props.protection.enabled {
                        <input type="number" id="max-gold" placeholder="Max gold" min="0"
                            value={props.protection.max_gold_cost.map(|v| v.to_string()).unwrap_or_default()}
                            onchange={on_max_gold} />
                        <input type="number" id="max-carbon" placeholder="Max carbon" min="0"
                            value={props.protection.max_carbon_cost.map(|v| v.to_string()).unwrap_or_default()}
                            onchange={on_max_carbon} />
                    }
                </fieldset>
                <div class="purchase-dialog__actions">
                    <button type="button" onclick={on_cancel}>{"Cancel"}</button>
                    <button type="button" id="purchase-confirm" class="primary" disabled={!can_buy} onclick={on_confirm}>
                        { if props.purchasing { "Purchasing..." } else { "Confirm Purchase" } }
                    </button>
                </div>
            </div>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_input_keeps_fractions_for_the_flow_to_reject() {
        assert!((parse_area("3") - 3.0).abs() < f64::EPSILON);
        assert!((parse_area("1.5") - 1.5).abs() < f64::EPSILON);
        assert!(parse_area("").is_nan());
    }
}
