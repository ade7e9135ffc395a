use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub visible: bool,
    pub on_dismiss: Callback<()>,
}

#[function_component(TutorialBanner)]
pub fn tutorial_banner(props: &Props) -> Html {
    if !props.visible {
        return Html::default();
    }
    let on_dismiss = {
        let cb = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    html! {
        <aside class="tutorial-banner" aria-label="Getting started">
            <ol>
                <li>{"Click a highlighted tile to see its price."}</li>
                <li>{"Pick an area and confirm to buy it for your team."}</li>
                <li>{"Press Ctrl+B to select several tiles and buy them together."}</li>
            </ol>
            <button type="button" id="tutorial-dismiss" onclick={on_dismiss}>{"Got it"}</button>
        </aside>
    }
}
