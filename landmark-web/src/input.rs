//! Browser keyboard events to [`KeyInput`].
use landmark_core::{FocusTarget, KeyInput};
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

/// Focus classification for the element the event was dispatched from.
#[must_use]
pub fn focus_of(tag_name: Option<&str>, content_editable: bool) -> FocusTarget {
    if content_editable {
        return FocusTarget::TextArea;
    }
    tag_name.map_or(FocusTarget::Page, FocusTarget::from_tag)
}

#[must_use]
pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    let element = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    let tag = element.as_ref().map(Element::tag_name);
    let editable = element
        .as_ref()
        .and_then(|el| el.get_attribute("contenteditable"))
        .is_some_and(|value| value.is_empty() || value == "true");
    KeyInput {
        key: event.key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        shift: event.shift_key(),
        focus: focus_of(tag.as_deref(), editable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_fields_capture_focus() {
        assert_eq!(focus_of(Some("INPUT"), false), FocusTarget::TextInput);
        assert_eq!(focus_of(Some("SELECT"), false), FocusTarget::Select);
        assert_eq!(focus_of(Some("DIV"), false), FocusTarget::Page);
        assert_eq!(focus_of(Some("DIV"), true), FocusTarget::TextArea);
        assert_eq!(focus_of(None, false), FocusTarget::Page);
    }
}
