use landmark_core::BulkEstimate;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use super::fmt_amount;
use super::modal::Modal;
use super::purchase_dialog::parse_area;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub open: bool,
    pub selected: Vec<i64>,
    pub area: f64,
    pub estimate: BulkEstimate,
    #[prop_or_default]
    pub purchasing: bool,
    pub on_area: Callback<f64>,
    pub on_confirm: Callback<()>,
    pub on_close: Callback<()>,
}

#[function_component(BulkDialog)]
pub fn bulk_dialog(props: &Props) -> Html {
    let on_area = {
        let cb = props.on_area.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(parse_area(&input.value()));
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
    let title = format!("Bulk Purchase ({} tiles)", props.selected.len());

    html! {
        <Modal open={props.open} title={AttrValue::from(title)} on_close={props.on_close.clone()}>
            <div class="bulk-dialog">
                <p class="bulk-dialog__tiles">
                    { props.selected.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ") }
                </p>
                <label>
                    {"Area per tile"}
                    <input type="range" id="bulk-area" min="1" max="50" step="0.5" value={props.area.to_string()} onchange={on_area} />
                    <span class="bulk-dialog__area">{ format!("{:.0}", props.area.round()) }</span>
                </label>
                <p id="bulk-estimate">
                    { format!("Estimated total: {}", fmt_amount(props.estimate.total_cost)) }
                </p>
                <div class="bulk-dialog__actions">
                    <button type="button" onclick={on_cancel}>{"Cancel"}</button>
                    <button type="button" id="bulk-confirm" class="primary"
                        disabled={props.purchasing || props.selected.is_empty()} onclick={on_confirm}>
                        { if props.purchasing { "Purchasing..." } else { "Purchase All" } }
                    </button>
                </div>
            </div>
        </Modal>
    }
}
