//! Filtered and annotated tile views derived from the cached tile list.
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::numbers::{nan_to_zero, usize_to_f64};
use crate::selection::BulkSelection;
use crate::tile::{AvailableTile, LandType, axial_to_pixel};

/// Map filter criteria. Every field is optional; unset means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TileFilter {
    pub available_only: bool,
    pub owned_only: bool,
    pub land_type: Option<LandType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_available_area: Option<f64>,
}

impl TileFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Availability, ownership, land type, price range, then available area.
    #[must_use]
    pub fn matches(&self, tile: &AvailableTile) -> bool {
        if self.available_only && !tile.can_purchase {
            return false;
        }
        if self.owned_only && !tile.is_owned() {
            return false;
        }
        if let Some(land_type) = &self.land_type
            && tile.land_type != *land_type
        {
            return false;
        }
        let price = tile.unit_price();
        if let Some(min) = self.min_price
            && price < nan_to_zero(min)
        {
            return false;
        }
        if let Some(max) = self.max_price
            && !max.is_nan()
            && price > max
        {
            return false;
        }
        if let Some(min_area) = self.min_available_area {
            let available = tile.available_area.map_or(0.0, nan_to_zero);
            if available < nan_to_zero(min_area) {
                return false;
            }
        }
        true
    }
}

/// Apply `filter`, returning NaN-sanitized copies of the tiles that pass.
#[must_use]
pub fn filter_tiles(tiles: &[AvailableTile], filter: &TileFilter) -> Vec<AvailableTile> {
    tiles
        .iter()
        .filter(|tile| filter.matches(tile))
        .map(AvailableTile::sanitized)
        .collect()
}

/// A tile ready for the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapTile {
    pub tile: AvailableTile,
    pub center: (f64, f64),
    pub unit_price: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TileStats {
    pub visible: usize,
    pub purchasable: usize,
    pub owned: usize,
    pub average_unit_price: f64,
    pub min_unit_price: f64,
    pub max_unit_price: f64,
    pub team_owned_area: f64,
}

impl TileStats {
    #[must_use]
    pub fn from_tiles(tiles: &[AvailableTile]) -> Self {
        if tiles.is_empty() {
            return Self::default();
        }
        let prices: Vec<f64> = tiles.iter().map(AvailableTile::unit_price).collect();
        let total: f64 = prices.iter().sum();
        Self {
            visible: tiles.len(),
            purchasable: tiles.iter().filter(|t| t.can_purchase).count(),
            owned: tiles.iter().filter(|t| t.is_owned()).count(),
            average_unit_price: total / usize_to_f64(tiles.len()),
            min_unit_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max_unit_price: prices.iter().copied().fold(0.0, f64::max),
            team_owned_area: tiles.iter().map(|t| nan_to_zero(t.team_owned_area)).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub filtered: Vec<AvailableTile>,
    pub map_tiles: Vec<MapTile>,
    pub stats: TileStats,
}

#[must_use]
pub fn derive_view(
    tiles: &[AvailableTile],
    filter: &TileFilter,
    selection: &BulkSelection,
    hex_size: f64,
) -> TileView {
    let filtered = filter_tiles(tiles, filter);
    let map_tiles = filtered
        .iter()
        .map(|tile| MapTile {
            center: axial_to_pixel(tile.axial_q, tile.axial_r, hex_size),
            unit_price: tile.unit_price(),
            selected: selection.contains(tile.tile_id),
            tile: tile.clone(),
        })
        .collect();
    let stats = TileStats::from_tiles(&filtered);
    TileView {
        filtered,
        map_tiles,
        stats,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    tiles_generation: u64,
    filter: TileFilter,
    selection_revision: u64,
}

/// Memo for [`derive_view`]: the same `Rc` comes back until the tile list,
/// filter or selection changes.
#[derive(Debug, Default)]
pub struct TileViewCache {
    memo: Option<(ViewKey, Rc<TileView>)>,
}

impl TileViewCache {
    pub fn view(
        &mut self,
        tiles_generation: u64,
        tiles: &[AvailableTile],
        filter: &TileFilter,
        selection: &BulkSelection,
        hex_size: f64,
    ) -> Rc<TileView> {
        let key = ViewKey {
            tiles_generation,
            filter: filter.clone(),
            selection_revision: selection.revision(),
        };
        if let Some((cached_key, view)) = &self.memo
            && *cached_key == key
        {
            return Rc::clone(view);
        }
        let view = Rc::new(derive_view(tiles, filter, selection, hex_size));
        self.memo = Some((key, Rc::clone(&view)));
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tiles() -> Vec<AvailableTile> {
        serde_json::from_value(json!([
            { "tileId": 1, "axialQ": 0, "axialR": 0, "landType": "PLAIN",
              "currentGoldPrice": 10, "currentCarbonPrice": 5, "teamOwnedArea": 0,
              "availableArea": 20, "canPurchase": true },
            { "tileId": 2, "axialQ": 1, "axialR": 0, "landType": "COASTAL",
              "currentGoldPrice": 30, "currentCarbonPrice": 10, "teamOwnedArea": 4,
              "availableArea": 2, "canPurchase": true },
            { "tileId": 3, "axialQ": 0, "axialR": 1, "landType": "MARINE",
              "currentGoldPrice": null, "currentCarbonPrice": 2, "teamOwnedArea": 0,
              "canPurchase": false }
        ]))
        .unwrap()
    }

    fn ids(tiles: &[AvailableTile]) -> Vec<i64> {
        tiles.iter().map(|t| t.tile_id).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_but_sanitizes() {
        let filtered = filter_tiles(&tiles(), &TileFilter::default());
        assert_eq!(ids(&filtered), vec![1, 2, 3]);
        assert!(filtered[2].current_gold_price.abs() < f64::EPSILON);
    }

    #[test]
    fn predicates_are_and_combined() {
        let filter = TileFilter {
            available_only: true,
            min_price: Some(10.0),
            max_price: Some(20.0),
            ..TileFilter::default()
        };
        assert_eq!(ids(&filter_tiles(&tiles(), &filter)), vec![1]);

        let filter = TileFilter {
            owned_only: true,
            land_type: Some(LandType::Coastal),
            ..TileFilter::default()
        };
        assert_eq!(ids(&filter_tiles(&tiles(), &filter)), vec![2]);

        let filter = TileFilter {
            min_available_area: Some(5.0),
            ..TileFilter::default()
        };
        assert_eq!(ids(&filter_tiles(&tiles(), &filter)), vec![1]);
    }

    #[test]
    fn nan_price_bounds_are_ignored_or_zeroed() {
        let filter = TileFilter {
            min_price: Some(f64::NAN),
            max_price: Some(f64::NAN),
            ..TileFilter::default()
        };
        assert_eq!(filter_tiles(&tiles(), &filter).len(), 3);
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = TileFilter {
            available_only: true,
            ..TileFilter::default()
        };
        let once = filter_tiles(&tiles(), &filter);
        let twice = filter_tiles(&once, &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn stats_cover_visible_tiles() {
        let view = derive_view(&tiles(), &TileFilter::default(), &BulkSelection::new(), 10.0);
        assert_eq!(view.stats.visible, 3);
        assert_eq!(view.stats.purchasable, 2);
        assert_eq!(view.stats.owned, 1);
        assert!((view.stats.min_unit_price - 2.0).abs() < f64::EPSILON);
        assert!((view.stats.max_unit_price - 40.0).abs() < f64::EPSILON);
        assert!((view.stats.team_owned_area - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn view_cache_returns_same_rc_until_inputs_change() {
        let tiles = tiles();
        let selection = BulkSelection::new();
        let filter = TileFilter::default();
        let mut cache = TileViewCache::default();
        let first = cache.view(1, &tiles, &filter, &selection, 10.0);
        let second = cache.view(1, &tiles, &filter, &selection, 10.0);
        assert!(Rc::ptr_eq(&first, &second));
        let third = cache.view(2, &tiles, &filter, &selection, 10.0);
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(first.filtered, third.filtered);
    }
}
