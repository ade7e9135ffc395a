//! Everything the land market page can be asked to do.
use landmark_core::{Command, PriceProtection, TileFilter};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ClickTile(i64),
    SetArea(f64),
    SetProtection(PriceProtection),
    SetDescription(String),
    OpenPurchase,
    ConfirmPurchase,
    ClosePurchase,
    ToggleBulkMode,
    OpenBulk,
    SetBulkArea(f64),
    ConfirmBulk,
    CloseBulk,
    ClearBulk,
    SetFilter(TileFilter),
    Key(Command),
    Refresh,
    CloseHelp,
    DismissToast(usize),
    DismissTutorial,
}

impl Action {
    /// Whether handling the action needs the backend.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::ClickTile(_)
                | Self::SetArea(_)
                | Self::ConfirmPurchase
                | Self::ConfirmBulk
                | Self::Refresh
                | Self::Key(Command::Refresh)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_backend_actions_are_remote() {
        assert!(Action::ClickTile(3).is_remote());
        assert!(Action::Key(Command::Refresh).is_remote());
        assert!(!Action::Key(Command::ZoomIn).is_remote());
        assert!(!Action::SetFilter(TileFilter::default()).is_remote());
    }
}
