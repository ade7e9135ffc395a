use landmark_core::{TeamLandSummary, TileStats};
use yew::prelude::*;

use super::fmt_amount;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    #[prop_or_default]
    pub summary: Option<TeamLandSummary>,
    pub stats: TileStats,
    #[prop_or_default]
    pub loading: bool,
}

#[function_component(SummaryBar)]
pub fn summary_bar(props: &Props) -> Html {
    let summary = props.summary.clone().unwrap_or_default();
    html! {
        <section class="summary-bar" aria-label="Team land summary" aria-busy={props.loading.to_string()}>
            <dl>
                <dt>{"Tiles owned"}</dt><dd id="summary-tiles">{ summary.tiles_owned_count }</dd>
                <dt>{"Area owned"}</dt><dd>{ fmt_amount(summary.total_owned_area) }</dd>
                <dt>{"Gold spent"}</dt><dd>{ fmt_amount(summary.total_gold_spent) }</dd>
                <dt>{"Carbon spent"}</dt><dd>{ fmt_amount(summary.total_carbon_spent) }</dd>
                <dt>{"Purchases"}</dt><dd>{ summary.total_purchases }</dd>
            </dl>
            <p class="summary-bar__stats">
                { format!(
                    "{} visible, {} purchasable, avg price {}",
                    props.stats.visible,
                    props.stats.purchasable,
                    fmt_amount(props.stats.average_unit_price)
                ) }
            </p>
            if props.loading {
                <span class="summary-bar__loading">{"Loading..."}</span>
            }
        </section>
    }
}
