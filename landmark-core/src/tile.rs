//! Tile records, ownership snapshots and purchase payloads.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::numbers::nan_to_zero;

/// Land classification reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandType {
    Plain,
    Coastal,
    Marine,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for LandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("PLAIN"),
            Self::Coastal => f.write_str("COASTAL"),
            Self::Marine => f.write_str("MARINE"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// A purchasable hex tile as listed by the available-tiles endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTile {
    pub tile_id: i64,
    pub axial_q: i32,
    pub axial_r: i32,
    pub land_type: LandType,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub current_gold_price: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub current_carbon_price: f64,
    #[serde(default)]
    pub current_population: Option<i64>,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub team_owned_area: f64,
    /// Area still for sale; absent when the backend does not track it.
    #[serde(default)]
    pub available_area: Option<f64>,
    #[serde(default)]
    pub can_purchase: bool,
}

const fn nan() -> f64 {
    f64::NAN
}

/// Accept numbers, numeric strings or null; anything unusable becomes NaN so
/// later stages can apply their own guard.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

impl AvailableTile {
    /// Gold plus carbon price per unit of area, with NaN prices counted as 0.
    #[must_use]
    pub fn unit_price(&self) -> f64 {
        nan_to_zero(self.current_gold_price) + nan_to_zero(self.current_carbon_price)
    }

    #[must_use]
    pub fn is_owned(&self) -> bool {
        nan_to_zero(self.team_owned_area) > 0.0
    }

    /// Copy with every numeric field NaN-guarded.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            current_gold_price: nan_to_zero(self.current_gold_price),
            current_carbon_price: nan_to_zero(self.current_carbon_price),
            team_owned_area: nan_to_zero(self.team_owned_area),
            available_area: self.available_area.map(nan_to_zero),
            ..self.clone()
        }
    }
}

/// One team's holding on a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileOwnership {
    pub team_id: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub owned_area: f64,
}

/// Extended tile record from the tile-details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDetails {
    pub tile_id: i64,
    #[serde(default)]
    pub land_type: Option<LandType>,
    #[serde(default)]
    pub current_gold_price: Option<f64>,
    #[serde(default)]
    pub current_carbon_price: Option<f64>,
    #[serde(default)]
    pub current_population: Option<i64>,
    #[serde(default)]
    pub total_owned_area: f64,
    #[serde(default)]
    pub ownerships: Vec<TileOwnership>,
}

/// Aggregate ownership snapshot for the caller's team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamLandSummary {
    pub total_owned_area: f64,
    pub total_gold_spent: f64,
    pub total_carbon_spent: f64,
    pub total_spent: f64,
    pub total_purchases: i64,
    pub tiles_owned_count: i64,
}

/// Payload for the purchase endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandPurchaseRequest {
    pub tile_id: i64,
    pub area: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_gold_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_carbon_cost: Option<f64>,
}

impl LandPurchaseRequest {
    #[must_use]
    pub const fn new(tile_id: i64, area: u32) -> Self {
        Self {
            tile_id,
            area,
            description: None,
            max_gold_cost: None,
            max_carbon_cost: None,
        }
    }
}

/// Purchase confirmation echoed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseReceipt {
    pub tile_id: i64,
    pub purchased_area: f64,
    pub gold_cost: f64,
    pub carbon_cost: f64,
    pub total_cost: f64,
}

/// `tileId -> AvailableTile` lookup rebuilt once per tile refresh.
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    by_id: HashMap<i64, AvailableTile>,
}

impl TileIndex {
    #[must_use]
    pub fn build(tiles: &[AvailableTile]) -> Self {
        let by_id = tiles
            .iter()
            .map(|tile| (tile.tile_id, tile.clone()))
            .collect();
        Self { by_id }
    }

    #[must_use]
    pub fn get(&self, tile_id: i64) -> Option<&AvailableTile> {
        self.by_id.get(&tile_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Pixel centre of a pointy-top hex for the given axial coordinates.
#[must_use]
pub fn axial_to_pixel(q: i32, r: i32, hex_size: f64) -> (f64, f64) {
    let q = f64::from(q);
    let r = f64::from(r);
    let x = hex_size * 3.0_f64.sqrt() * (q + r / 2.0);
    let y = hex_size * 1.5 * r;
    (x, y)
}
