use landmark_core::{Notice, NoticeLevel};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub notices: Vec<Notice>,
    pub on_dismiss: Callback<usize>,
}

#[must_use]
pub const fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "toast toast--success",
        NoticeLevel::Info => "toast toast--info",
        NoticeLevel::Warning => "toast toast--warning",
        NoticeLevel::Error => "toast toast--error",
    }
}

#[function_component(ToastStack)]
pub fn toast_stack(props: &Props) -> Html {
    if props.notices.is_empty() {
        return Html::default();
    }
    html! {
        <div class="toast-stack" role="status" aria-live="polite">
            { for props.notices.iter().enumerate().map(|(idx, notice)| {
                let on_dismiss = props.on_dismiss.clone();
                let dismiss = Callback::from(move |_: MouseEvent| on_dismiss.emit(idx));
                html! {
                    <div class={level_class(notice.level)} key={idx}>
                        <strong class="toast__title">{ notice.title.clone() }</strong>
                        <p class="toast__message">{ notice.message.clone() }</p>
                        <button type="button" class="toast__close" aria-label="Dismiss" onclick={dismiss}>
                            {"X"}
                        </button>
                    </div>
                }
            }) }
        </div>
    }
}
