use landmark_core::MarketConfig;
use yew::prelude::*;

use crate::page::LandMarketPage;

#[derive(Properties, PartialEq, Clone, Default)]
pub struct Props {
    #[prop_or_default]
    pub config: MarketConfig,
}

#[function_component(App)]
pub fn app(props: &Props) -> Html {
    html! {
        <div class="app">
            <header class="app__header">
                <h1>{"Land Market"}</h1>
            </header>
            <LandMarketPage config={props.config.clone()} />
        </div>
    }
}
