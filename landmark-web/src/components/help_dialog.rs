use landmark_core::SHORTCUTS;
use yew::prelude::*;

use super::modal::Modal;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub open: bool,
    pub on_close: Callback<()>,
}

#[function_component(HelpDialog)]
pub fn help_dialog(props: &Props) -> Html {
    html! {
        <Modal open={props.open} title={AttrValue::from("Keyboard Shortcuts")} on_close={props.on_close.clone()}>
            <table class="help-dialog">
                <tbody>
                    { for SHORTCUTS.iter().map(|(keys, command)| html! {
                        <tr>
                            <td><kbd>{ *keys }</kbd></td>
                            <td>{ command.describe() }</td>
                        </tr>
                    }) }
                </tbody>
            </table>
            <p class="help-dialog__note">{"Shortcuts are ignored while typing in a form field."}</p>
        </Modal>
    }
}
