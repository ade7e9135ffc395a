//! In-memory land backend.
//!
//! Prices and balances behave like the real service closely enough to drive
//! the flows in tests and in the tester's offline mode. Every call is counted
//! and failures can be scripted per tile.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::api::LandApi;
use crate::error::ApiError;
use crate::numbers::{nan_to_zero, u32_to_f64};
use crate::tile::{
    AvailableTile, LandPurchaseRequest, LandType, PurchaseReceipt, TeamLandSummary, TileDetails,
    TileOwnership,
};
use crate::validation::RawPurchaseValidation;

pub const MEMORY_TEAM_ID: &str = "team-local";

/// How many times each endpoint was hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub available_tiles: usize,
    pub team_summary: usize,
    pub tile_details: usize,
    pub validate_purchase: usize,
    pub purchase: usize,
}

#[derive(Debug, Default)]
struct Ledger {
    tiles: Vec<AvailableTile>,
    gold_balance: f64,
    carbon_balance: f64,
    summary: TeamLandSummary,
    owned_tiles: HashSet<i64>,
    calls: CallCounts,
    purchases: Vec<LandPurchaseRequest>,
    purchase_failures: HashMap<i64, String>,
    validation_overrides: HashMap<i64, Value>,
    offline: bool,
}

#[derive(Debug, Default)]
pub struct MemoryLandApi {
    ledger: RefCell<Ledger>,
}

impl MemoryLandApi {
    #[must_use]
    pub fn new(tiles: Vec<AvailableTile>, gold_balance: f64, carbon_balance: f64) -> Self {
        Self {
            ledger: RefCell::new(Ledger {
                tiles,
                gold_balance,
                carbon_balance,
                ..Ledger::default()
            }),
        }
    }

    /// Deterministic hex map of `radius` rings around the origin.
    #[must_use]
    pub fn generated(seed: u64, radius: i32) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut tiles = Vec::new();
        let mut next_id = 1_i64;
        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                let land_type = match rng.gen_range(0..10) {
                    0..=5 => LandType::Plain,
                    6..=8 => LandType::Coastal,
                    _ => LandType::Marine,
                };
                let base = match land_type {
                    LandType::Marine => 4.0,
                    LandType::Coastal => 12.0,
                    _ => 8.0,
                };
                tiles.push(AvailableTile {
                    tile_id: next_id,
                    axial_q: q,
                    axial_r: r,
                    current_gold_price: (base + rng.gen_range(0.0..6.0_f64)).round(),
                    current_carbon_price: (base / 2.0 + rng.gen_range(0.0..3.0_f64)).round(),
                    current_population: (land_type != LandType::Marine)
                        .then(|| rng.gen_range(100..5_000)),
                    team_owned_area: 0.0,
                    available_area: Some(f64::from(rng.gen_range(10_u32..=60))),
                    can_purchase: rng.gen_bool(0.85),
                    land_type,
                });
                next_id += 1;
            }
        }
        Self::new(tiles, 5_000.0, 2_500.0)
    }

    /// Make every purchase of `tile_id` fail with `message`.
    pub fn fail_purchases_for(&self, tile_id: i64, message: &str) {
        self.ledger
            .borrow_mut()
            .purchase_failures
            .insert(tile_id, message.to_string());
    }

    /// Return `body` verbatim from the validate endpoint for `tile_id`.
    pub fn override_validation(&self, tile_id: i64, body: Value) {
        self.ledger
            .borrow_mut()
            .validation_overrides
            .insert(tile_id, body);
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.ledger.borrow_mut().offline = offline;
    }

    /// Drop a tile from the listing, as if another team bought it out.
    pub fn remove_tile(&self, tile_id: i64) {
        self.ledger
            .borrow_mut()
            .tiles
            .retain(|tile| tile.tile_id != tile_id);
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.ledger.borrow().calls
    }

    #[must_use]
    pub fn purchases(&self) -> Vec<LandPurchaseRequest> {
        self.ledger.borrow().purchases.clone()
    }

    #[must_use]
    pub fn balances(&self) -> (f64, f64) {
        let ledger = self.ledger.borrow();
        (ledger.gold_balance, ledger.carbon_balance)
    }

    #[must_use]
    pub fn tiles(&self) -> Vec<AvailableTile> {
        self.ledger.borrow().tiles.clone()
    }

    fn check_online(ledger: &Ledger) -> Result<(), ApiError> {
        if ledger.offline {
            Err(ApiError::Network("backend unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

struct Quote {
    gold_cost: f64,
    carbon_cost: f64,
    available_area: f64,
    errors: Vec<String>,
}

impl Ledger {
    fn tile(&self, tile_id: i64) -> Option<&AvailableTile> {
        self.tiles.iter().find(|tile| tile.tile_id == tile_id)
    }

    fn quote(&self, tile_id: i64, area: u32) -> Result<Quote, ApiError> {
        let tile = self.tile(tile_id).ok_or_else(|| ApiError::Status {
            status: 404,
            message: format!("Tile {tile_id} not found"),
        })?;
        let area_f = u32_to_f64(area);
        let gold_cost = area_f * nan_to_zero(tile.current_gold_price);
        let carbon_cost = area_f * nan_to_zero(tile.current_carbon_price);
        let available_area = tile.available_area.map_or(f64::INFINITY, nan_to_zero);
        let mut errors = Vec::new();
        if !tile.can_purchase {
            errors.push("Tile is not available for purchase".to_string());
        }
        if area_f > available_area {
            errors.push(format!(
                "Requested area {area} exceeds available area {available_area}"
            ));
        }
        if gold_cost > self.gold_balance {
            errors.push("Insufficient gold balance".to_string());
        }
        if carbon_cost > self.carbon_balance {
            errors.push("Insufficient carbon balance".to_string());
        }
        Ok(Quote {
            gold_cost,
            carbon_cost,
            available_area,
            errors,
        })
    }
}

impl LandApi for MemoryLandApi {
    async fn available_tiles(&self) -> Result<Vec<AvailableTile>, ApiError> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.available_tiles += 1;
        Self::check_online(&ledger)?;
        Ok(ledger.tiles.clone())
    }

    async fn team_summary(&self) -> Result<TeamLandSummary, ApiError> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.team_summary += 1;
        Self::check_online(&ledger)?;
        Ok(ledger.summary.clone())
    }

    async fn tile_details(&self, tile_id: i64) -> Result<TileDetails, ApiError> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.tile_details += 1;
        Self::check_online(&ledger)?;
        let tile = ledger.tile(tile_id).ok_or_else(|| ApiError::Status {
            status: 404,
            message: format!("Tile {tile_id} not found"),
        })?;
        let owned = nan_to_zero(tile.team_owned_area);
        let ownerships = if owned > 0.0 {
            vec![TileOwnership {
                team_id: MEMORY_TEAM_ID.to_string(),
                team_name: "Local Team".to_string(),
                owned_area: owned,
            }]
        } else {
            Vec::new()
        };
        Ok(TileDetails {
            tile_id,
            land_type: Some(tile.land_type.clone()),
            current_gold_price: Some(tile.current_gold_price),
            current_carbon_price: Some(tile.current_carbon_price),
            current_population: tile.current_population,
            total_owned_area: owned,
            ownerships,
        })
    }

    async fn validate_purchase(
        &self,
        tile_id: i64,
        area: u32,
    ) -> Result<RawPurchaseValidation, ApiError> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.validate_purchase += 1;
        Self::check_online(&ledger)?;
        if let Some(body) = ledger.validation_overrides.get(&tile_id) {
            return Ok(RawPurchaseValidation(body.clone()));
        }
        let quote = ledger.quote(tile_id, area)?;
        let available_area = if quote.available_area.is_finite() {
            json!(quote.available_area)
        } else {
            Value::Null
        };
        Ok(RawPurchaseValidation(json!({
            "canPurchase": quote.errors.is_empty(),
            "goldCost": quote.gold_cost,
            "carbonCost": quote.carbon_cost,
            "totalCost": quote.gold_cost + quote.carbon_cost,
            "availableArea": available_area,
            "teamGoldBalance": ledger.gold_balance,
            "teamCarbonBalance": ledger.carbon_balance,
            "errors": quote.errors,
        })))
    }

    async fn purchase(&self, request: &LandPurchaseRequest) -> Result<PurchaseReceipt, ApiError> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.purchase += 1;
        ledger.purchases.push(request.clone());
        Self::check_online(&ledger)?;
        if let Some(message) = ledger.purchase_failures.get(&request.tile_id) {
            return Err(ApiError::Status {
                status: 400,
                message: message.clone(),
            });
        }
        let quote = ledger.quote(request.tile_id, request.area)?;
        if let Some(first) = quote.errors.first() {
            return Err(ApiError::Status {
                status: 400,
                message: first.clone(),
            });
        }
        if request.max_gold_cost.is_some_and(|max| quote.gold_cost > max) {
            return Err(ApiError::Status {
                status: 409,
                message: "Gold cost exceeds the price protection limit".to_string(),
            });
        }
        if request
            .max_carbon_cost
            .is_some_and(|max| quote.carbon_cost > max)
        {
            return Err(ApiError::Status {
                status: 409,
                message: "Carbon cost exceeds the price protection limit".to_string(),
            });
        }

        let area = u32_to_f64(request.area);
        ledger.gold_balance -= quote.gold_cost;
        ledger.carbon_balance -= quote.carbon_cost;
        if let Some(tile) = ledger
            .tiles
            .iter_mut()
            .find(|tile| tile.tile_id == request.tile_id)
        {
            tile.team_owned_area = nan_to_zero(tile.team_owned_area) + area;
            if let Some(available) = tile.available_area.as_mut() {
                *available -= area;
            }
        }
        let newly_owned = ledger.owned_tiles.insert(request.tile_id);
        let summary = &mut ledger.summary;
        summary.total_owned_area += area;
        summary.total_gold_spent += quote.gold_cost;
        summary.total_carbon_spent += quote.carbon_cost;
        summary.total_spent += quote.gold_cost + quote.carbon_cost;
        summary.total_purchases += 1;
        if newly_owned {
            summary.tiles_owned_count += 1;
        }

        Ok(PurchaseReceipt {
            tile_id: request.tile_id,
            purchased_area: area,
            gold_cost: quote.gold_cost,
            carbon_cost: quote.carbon_cost,
            total_cost: quote.gold_cost + quote.carbon_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn generated_map_is_deterministic() {
        let a = MemoryLandApi::generated(42, 2).tiles();
        let b = MemoryLandApi::generated(42, 2).tiles();
        assert_eq!(a.len(), 19);
        assert_eq!(a, b);
    }

    #[test]
    fn purchase_moves_balances_and_summary() {
        let api = MemoryLandApi::generated(7, 1);
        let tile = api
            .tiles()
            .into_iter()
            .find(|t| t.can_purchase)
            .expect("a purchasable tile");
        let (gold_before, _) = api.balances();
        let receipt = block_on(api.purchase(&LandPurchaseRequest::new(tile.tile_id, 2))).unwrap();
        assert!((receipt.purchased_area - 2.0).abs() < f64::EPSILON);
        let (gold_after, _) = api.balances();
        assert!((gold_before - gold_after - receipt.gold_cost).abs() < 1e-9);
        let summary = block_on(api.team_summary()).unwrap();
        assert_eq!(summary.total_purchases, 1);
        assert_eq!(summary.tiles_owned_count, 1);
        assert_eq!(api.calls().purchase, 1);
    }

    #[test]
    fn price_protection_is_enforced() {
        let api = MemoryLandApi::generated(7, 1);
        let tile = api.tiles().into_iter().find(|t| t.can_purchase).unwrap();
        let mut request = LandPurchaseRequest::new(tile.tile_id, 1);
        request.max_gold_cost = Some(0.5);
        let err = block_on(api.purchase(&request)).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 409, .. }));
    }

    #[test]
    fn offline_mode_fails_every_call() {
        let api = MemoryLandApi::generated(1, 1);
        api.set_offline(true);
        assert!(matches!(
            block_on(api.available_tiles()),
            Err(ApiError::Network(_))
        ));
        assert_eq!(api.calls().available_tiles, 1);
    }
}
