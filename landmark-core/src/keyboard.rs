//! Keyboard shortcuts for the land map.
//!
//! Mapping a key to a [`Command`] needs no state; the market decides what a
//! command does with its current state, so the shell subscribes once.

/// Where keyboard focus was when the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Page,
    TextInput,
    TextArea,
    Select,
}

impl FocusTarget {
    /// Classify by element tag name (`INPUT`, `textarea`, ...).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "input" => Self::TextInput,
            "textarea" => Self::TextArea,
            "select" => Self::Select,
            _ => Self::Page,
        }
    }

    #[must_use]
    pub const fn captures_keys(self) -> bool {
        !matches!(self, Self::Page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub focus: FocusTarget,
}

impl KeyInput {
    #[must_use]
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn in_focus(mut self, focus: FocusTarget) -> Self {
        self.focus = focus;
        self
    }

    const fn modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Refresh,
    PurchaseSelected,
    ToggleBulkMode,
    ClearBulkSelection,
    Escape,
    ShowHelp,
}

impl Command {
    /// Label for the shortcut help dialog.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ZoomIn => "Zoom in",
            Self::ZoomOut => "Zoom out",
            Self::ResetZoom => "Reset zoom",
            Self::Refresh => "Refresh map data",
            Self::PurchaseSelected => "Purchase selected tile",
            Self::ToggleBulkMode => "Toggle bulk mode",
            Self::ClearBulkSelection => "Clear bulk selection",
            Self::Escape => "Close dialog / exit bulk mode",
            Self::ShowHelp => "Show shortcuts",
        }
    }
}

/// Shortcut table shown in the help dialog.
pub const SHORTCUTS: [(&str, Command); 9] = [
    ("+", Command::ZoomIn),
    ("-", Command::ZoomOut),
    ("0", Command::ResetZoom),
    ("Ctrl/Cmd+R", Command::Refresh),
    ("Enter", Command::PurchaseSelected),
    ("Ctrl/Cmd+B", Command::ToggleBulkMode),
    ("Ctrl/Cmd+C", Command::ClearBulkSelection),
    ("Escape", Command::Escape),
    ("?", Command::ShowHelp),
];

/// Map a key press to a command. Returns `None` while a form field has focus.
#[must_use]
pub fn command_for(input: &KeyInput) -> Option<Command> {
    if input.focus.captures_keys() {
        return None;
    }
    if input.modifier() {
        return match input.key.to_ascii_lowercase().as_str() {
            "r" => Some(Command::Refresh),
            "b" => Some(Command::ToggleBulkMode),
            "c" => Some(Command::ClearBulkSelection),
            _ => None,
        };
    }
    match input.key.as_str() {
        "+" | "=" => Some(Command::ZoomIn),
        "-" | "_" => Some(Command::ZoomOut),
        "0" => Some(Command::ResetZoom),
        "Enter" => Some(Command::PurchaseSelected),
        "Escape" => Some(Command::Escape),
        "?" => Some(Command::ShowHelp),
        _ => None,
    }
}
