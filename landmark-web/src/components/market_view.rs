use std::rc::Rc;

use landmark_core::{
    AvailableTile, BulkEstimate, Command, Dialogs, LandApi, LandMarket, Notice, PriceProtection,
    PurchaseValidation, TeamLandSummary, TileDetails, TileFilter, TileView,
};
use yew::prelude::*;

use super::bulk_dialog::BulkDialog;
use super::filter_panel::FilterPanel;
use super::fmt_amount;
use super::help_dialog::HelpDialog;
use super::purchase_dialog::PurchaseDialog;
use super::summary_bar::SummaryBar;
use super::tile_map::TileMap;
use super::toast_stack::ToastStack;
use super::tutorial_banner::TutorialBanner;
use crate::action::Action;

/// Everything the page renders, copied out of the market in one borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub view: Rc<TileView>,
    pub summary: Option<TeamLandSummary>,
    pub loading: bool,
    pub filter: TileFilter,
    pub zoom: f64,
    pub hex_size: f64,
    pub dialogs: Dialogs,
    pub bulk_mode: bool,
    pub bulk_selection: Vec<i64>,
    pub bulk_area: f64,
    pub bulk_estimate: BulkEstimate,
    pub bulk_purchasing: bool,
    pub selected: Option<AvailableTile>,
    pub details: Option<TileDetails>,
    pub area: f64,
    pub validation: Option<PurchaseValidation>,
    pub purchasing: bool,
    pub protection: PriceProtection,
    pub description: Option<String>,
}

impl Snapshot {
    pub fn capture<A: LandApi>(market: &mut LandMarket<A>) -> Self {
        let flow = market.purchase();
        let selected = flow.selected().cloned();
        let details = flow.details().cloned();
        let area = flow.area();
        let validation = flow.validation().cloned();
        let purchasing = flow.is_purchasing();
        let protection = flow.protection.clone();
        let description = flow.description.clone();
        Self {
            view: market.view(),
            summary: market.team_summary().cloned(),
            loading: market.is_loading(),
            filter: market.filter().clone(),
            zoom: market.viewport().zoom(),
            hex_size: market.config().hex_size,
            dialogs: market.dialogs(),
            bulk_mode: market.bulk_mode(),
            bulk_selection: market.selection().ids().to_vec(),
            bulk_area: market.bulk_area(),
            bulk_estimate: market.bulk_estimate(),
            bulk_purchasing: market.is_bulk_purchasing(),
            selected,
            details,
            area,
            validation,
            purchasing,
            protection,
            description,
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub snapshot: Snapshot,
    #[prop_or_default]
    pub toasts: Vec<Notice>,
    #[prop_or_default]
    pub animating: Vec<i64>,
    #[prop_or_default]
    pub tutorial_visible: bool,
    pub on_action: Callback<Action>,
}

fn selected_panel(snapshot: &Snapshot, on_action: &Callback<Action>) -> Html {
    let Some(tile) = snapshot.selected.as_ref() else {
        return html! {
            <p class="selection-panel__hint">{"Select a tile on the map to see its price."}</p>
        };
    };
    let open = {
        let cb = on_action.clone();
        Callback::from(move |_: MouseEvent| cb.emit(Action::OpenPurchase))
    };
    let ready = snapshot.validation.as_ref().is_some_and(|v| v.can_purchase);
    html! {
        <div class="selection-panel__tile" id="selected-tile">
            <h3>{ format!("Tile {}", tile.tile_id) }</h3>
            <p>{ format!("{} at ({}, {})", tile.land_type, tile.axial_q, tile.axial_r) }</p>
            <p>{ format!("Gold {} / Carbon {}", fmt_amount(tile.current_gold_price), fmt_amount(tile.current_carbon_price)) }</p>
            if let Some(population) = tile.current_population {
                <p>{ format!("Population {population}") }</p>
            }
            <button type="button" id="open-purchase" class="primary" disabled={!ready} onclick={open}>
                {"Purchase..."}
            </button>
        </div>
    }
}

fn bulk_panel(snapshot: &Snapshot, on_action: &Callback<Action>) -> Html {
    let emit = |action: Action| {
        let cb = on_action.clone();
        Callback::from(move |_: MouseEvent| cb.emit(action.clone()))
    };
    html! {
        <div class="bulk-panel" id="bulk-panel">
            <p>{ format!("{} tile(s) selected", snapshot.bulk_selection.len()) }</p>
            <p>{ format!("Estimate {}", fmt_amount(snapshot.bulk_estimate.total_cost)) }</p>
            <button type="button" onclick={emit(Action::ClearBulk)}>{"Clear"}</button>
            <button type="button" class="primary" id="open-bulk"
                disabled={snapshot.bulk_selection.is_empty()} onclick={emit(Action::OpenBulk)}>
                {"Purchase Selected..."}
            </button>
        </div>
    }
}

#[function_component(MarketView)]
pub fn market_view(props: &Props) -> Html {
    let snapshot = &props.snapshot;
    let on_action = props.on_action.clone();
    let emit = |action: Action| {
        let cb = on_action.clone();
        Callback::from(move |_: MouseEvent| cb.emit(action.clone()))
    };
    let forward = |wrap: fn(f64) -> Action| {
        let cb = on_action.clone();
        Callback::from(move |value: f64| cb.emit(wrap(value)))
    };
    let unit = |action: Action| {
        let cb = on_action.clone();
        Callback::from(move |()| cb.emit(action.clone()))
    };

    let on_tile = {
        let cb = on_action.clone();
        Callback::from(move |id: i64| cb.emit(Action::ClickTile(id)))
    };
    let on_filter = {
        let cb = on_action.clone();
        Callback::from(move |filter: TileFilter| cb.emit(Action::SetFilter(filter)))
    };
    let on_protection = {
        let cb = on_action.clone();
        Callback::from(move |p: PriceProtection| cb.emit(Action::SetProtection(p)))
    };
    let on_description = {
        let cb = on_action.clone();
        Callback::from(move |text: String| cb.emit(Action::SetDescription(text)))
    };
    let on_dismiss_toast = {
        let cb = on_action.clone();
        Callback::from(move |idx: usize| cb.emit(Action::DismissToast(idx)))
    };

    html! {
        <main class="land-market">
            <TutorialBanner visible={props.tutorial_visible} on_dismiss={unit(Action::DismissTutorial)} />
            <SummaryBar summary={snapshot.summary.clone()} stats={snapshot.view.stats.clone()} loading={snapshot.loading} />
            <div class="land-market__toolbar" role="toolbar">
                <button type="button" aria-label="Zoom in" onclick={emit(Action::Key(Command::ZoomIn))}>{"+"}</button>
                <button type="button" aria-label="Zoom out" onclick={emit(Action::Key(Command::ZoomOut))}>{"-"}</button>
                <button type="button" aria-label="Reset zoom" onclick={emit(Action::Key(Command::ResetZoom))}>{"0"}</button>
                <button type="button" id="refresh" onclick={emit(Action::Refresh)}>{"Refresh"}</button>
                <button type="button" id="bulk-toggle" aria-pressed={snapshot.bulk_mode.to_string()}
                    onclick={emit(Action::ToggleBulkMode)}>
                    { if snapshot.bulk_mode { "Exit Bulk Mode" } else { "Bulk Mode" } }
                </button>
                <button type="button" aria-label="Keyboard shortcuts" onclick={emit(Action::Key(Command::ShowHelp))}>{"?"}</button>
            </div>
            <div class="land-market__body">
                <FilterPanel filter={snapshot.filter.clone()} on_change={on_filter} />
                <TileMap
                    view={Rc::clone(&snapshot.view)}
                    hex_size={snapshot.hex_size}
                    zoom={snapshot.zoom}
                    selected={snapshot.selected.as_ref().map(|t| t.tile_id)}
                    bulk_mode={snapshot.bulk_mode}
                    animating={props.animating.clone()}
                    on_click={on_tile}
                />
                <aside class="selection-panel">
                    { if snapshot.bulk_mode {
                        bulk_panel(snapshot, &on_action)
                    } else {
                        selected_panel(snapshot, &on_action)
                    } }
                </aside>
            </div>
            <PurchaseDialog
                open={snapshot.dialogs.purchase}
                tile={snapshot.selected.clone()}
                details={snapshot.details.clone()}
                area={snapshot.area}
                validation={snapshot.validation.clone()}
                purchasing={snapshot.purchasing}
                protection={snapshot.protection.clone()}
                description={snapshot.description.clone()}
                on_area={forward(Action::SetArea)}
                on_protection={on_protection}
                on_description={on_description}
                on_confirm={unit(Action::ConfirmPurchase)}
                on_close={unit(Action::ClosePurchase)}
            />
            <BulkDialog
                open={snapshot.dialogs.bulk}
                selected={snapshot.bulk_selection.clone()}
                area={snapshot.bulk_area}
                estimate={snapshot.bulk_estimate.clone()}
                purchasing={snapshot.bulk_purchasing}
                on_area={forward(Action::SetBulkArea)}
                on_confirm={unit(Action::ConfirmBulk)}
                on_close={unit(Action::CloseBulk)}
            />
            <HelpDialog open={snapshot.dialogs.help} on_close={unit(Action::CloseHelp)} />
            <ToastStack notices={props.toasts.clone()} on_dismiss={on_dismiss_toast} />
        </main>
    }
}
