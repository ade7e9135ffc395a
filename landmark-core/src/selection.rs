//! Bulk-mode tile selection kept in insertion order.
use std::collections::HashSet;

use crate::error::FlowError;
use crate::tile::TileIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSelection {
    order: Vec<i64>,
    members: HashSet<i64>,
    revision: u64,
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

impl BulkSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove `tile_id`. Only purchasable tiles may be added; removal
    /// is always allowed.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownTile`] or [`FlowError::TileNotPurchasable`]
    /// when adding a tile that cannot be bought.
    pub fn toggle(&mut self, tile_id: i64, index: &TileIndex) -> Result<Toggle, FlowError> {
        if self.remove(tile_id) {
            return Ok(Toggle::Removed);
        }
        let tile = index.get(tile_id).ok_or(FlowError::UnknownTile(tile_id))?;
        if !tile.can_purchase {
            return Err(FlowError::TileNotPurchasable(tile_id));
        }
        self.members.insert(tile_id);
        self.order.push(tile_id);
        self.bump();
        Ok(Toggle::Added)
    }

    pub fn remove(&mut self, tile_id: i64) -> bool {
        if !self.members.remove(&tile_id) {
            return false;
        }
        self.order.retain(|id| *id != tile_id);
        self.bump();
        true
    }

    pub fn clear(&mut self) {
        if self.order.is_empty() {
            return;
        }
        self.order.clear();
        self.members.clear();
        self.bump();
    }

    #[must_use]
    pub fn contains(&self, tile_id: i64) -> bool {
        self.members.contains(&tile_id)
    }

    /// Selected ids in the order they were added.
    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Changes whenever membership changes.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    const fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::AvailableTile;
    use serde_json::json;

    fn index() -> TileIndex {
        let tiles: Vec<AvailableTile> = serde_json::from_value(json!([
            { "tileId": 1, "axialQ": 0, "axialR": 0, "landType": "PLAIN", "canPurchase": true },
            { "tileId": 2, "axialQ": 1, "axialR": 0, "landType": "PLAIN", "canPurchase": true },
            { "tileId": 3, "axialQ": 2, "axialR": 0, "landType": "MARINE", "canPurchase": false }
        ]))
        .unwrap();
        TileIndex::build(&tiles)
    }

    #[test]
    fn toggle_round_trip_removes_only_that_id() {
        let index = index();
        let mut selection = BulkSelection::new();
        assert_eq!(selection.toggle(2, &index), Ok(Toggle::Added));
        assert_eq!(selection.toggle(1, &index), Ok(Toggle::Added));
        assert_eq!(selection.toggle(2, &index), Ok(Toggle::Removed));
        assert_eq!(selection.ids(), &[1]);
        assert!(selection.contains(1));
        assert!(!selection.contains(2));
    }

    #[test]
    fn non_purchasable_and_unknown_tiles_are_refused() {
        let index = index();
        let mut selection = BulkSelection::new();
        assert_eq!(
            selection.toggle(3, &index),
            Err(FlowError::TileNotPurchasable(3))
        );
        assert_eq!(selection.toggle(9, &index), Err(FlowError::UnknownTile(9)));
        assert!(selection.is_empty());
    }

    #[test]
    fn insertion_order_is_preserved_and_revision_tracks_changes() {
        let index = index();
        let mut selection = BulkSelection::new();
        selection.toggle(2, &index).unwrap();
        selection.toggle(1, &index).unwrap();
        assert_eq!(selection.ids(), &[2, 1]);
        let rev = selection.revision();
        selection.clear();
        assert!(selection.is_empty());
        assert!(selection.revision() > rev);
    }
}
