//! Single-tile purchase state machine.
//!
//! The flow is synchronous: it hands out the data for each remote call and
//! takes the result back, so shells can run the call however they like
//! without holding the flow across an await.
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, AreaError, FlowError, error_message};
use crate::notice::Notice;
use crate::tile::{AvailableTile, LandPurchaseRequest, PurchaseReceipt, TileDetails};
use crate::validation::{PurchaseValidation, QuoteResult, validate_area};

/// Where the single-tile flow stands. There is no failed phase: a rejected
/// purchase goes straight back to `ValidationReady` with `last_error` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchasePhase {
    Idle,
    TileSelected,
    Validating,
    ValidationReady,
    Confirming,
    Purchasing,
    Success,
}

/// Optional client-side cost ceilings sent with the purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceProtection {
    pub enabled: bool,
    pub max_gold_cost: Option<f64>,
    pub max_carbon_cost: Option<f64>,
}

/// Side effects the shell should carry out after a purchase settles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseEffects {
    pub notices: Vec<Notice>,
    /// Tile to play the purchase animation on.
    pub animate_tile: Option<i64>,
    /// Invalidate and refetch the tile list and team summary.
    pub refresh: bool,
}

#[derive(Debug, Clone)]
pub struct PurchaseFlow {
    phase: PurchasePhase,
    selected: Option<AvailableTile>,
    details: Option<TileDetails>,
    area: f64,
    validation: Option<PurchaseValidation>,
    /// The confirm dialog is showing, even while a requote runs under it.
    dialog_open: bool,
    pub protection: PriceProtection,
    pub description: Option<String>,
    last_receipt: Option<PurchaseReceipt>,
    last_error: Option<String>,
    success_delay_ms: u32,
}

impl PurchaseFlow {
    #[must_use]
    pub const fn new(default_area: f64, success_delay_ms: u32) -> Self {
        Self {
            phase: PurchasePhase::Idle,
            selected: None,
            details: None,
            area: default_area,
            validation: None,
            dialog_open: false,
            protection: PriceProtection {
                enabled: false,
                max_gold_cost: None,
                max_carbon_cost: None,
            },
            description: None,
            last_receipt: None,
            last_error: None,
            success_delay_ms,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> PurchasePhase {
        self.phase
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&AvailableTile> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn details(&self) -> Option<&TileDetails> {
        self.details.as_ref()
    }

    #[must_use]
    pub const fn area(&self) -> f64 {
        self.area
    }

    #[must_use]
    pub const fn validation(&self) -> Option<&PurchaseValidation> {
        self.validation.as_ref()
    }

    #[must_use]
    pub const fn last_receipt(&self) -> Option<&PurchaseReceipt> {
        self.last_receipt.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub const fn dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// The dialog is open over a quote that allows buying. Also true after a
    /// failed attempt, so the user can retry without reopening.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.dialog_open
            && matches!(
                self.phase,
                PurchasePhase::Confirming | PurchasePhase::ValidationReady
            )
            && self.validation.as_ref().is_some_and(|v| v.can_purchase)
    }

    #[must_use]
    pub const fn is_purchasing(&self) -> bool {
        matches!(self.phase, PurchasePhase::Purchasing)
    }

    /// Select an eligible tile. The previous quote is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::TileNotPurchasable`] if the tile cannot be bought
    /// or [`FlowError::Busy`] while a purchase is in flight.
    pub fn select(&mut self, tile: &AvailableTile) -> Result<(), FlowError> {
        if self.is_purchasing() {
            return Err(FlowError::Busy);
        }
        if !tile.can_purchase {
            return Err(FlowError::TileNotPurchasable(tile.tile_id));
        }
        self.selected = Some(tile.clone());
        self.details = None;
        self.validation = None;
        self.last_error = None;
        self.phase = PurchasePhase::TileSelected;
        Ok(())
    }

    /// Store the best-effort details fetch. A failure is logged and the flow
    /// keeps going with the list data.
    pub fn apply_details(&mut self, tile_id: i64, result: Result<TileDetails, ApiError>) {
        if self.selected.as_ref().map(|t| t.tile_id) != Some(tile_id) {
            return;
        }
        match result {
            Ok(details) => self.details = Some(details),
            Err(err) => log::warn!("could not load details for tile {tile_id}: {err}"),
        }
    }

    /// Change the requested area. The quote becomes outdated; inside the
    /// confirm dialog it is dropped so the old cost can't be confirmed.
    pub fn set_area(&mut self, area: f64) {
        if self.is_purchasing() {
            return;
        }
        self.area = area;
        if self.selected.is_none() {
            return;
        }
        if self.dialog_open {
            self.validation = None;
        }
        self.phase = PurchasePhase::TileSelected;
    }

    /// Whether the current tile/area pair still needs a quote.
    #[must_use]
    pub fn needs_validation(&self) -> bool {
        self.selected.is_some() && self.phase == PurchasePhase::TileSelected
    }

    /// Start a quote for the selected tile, returning `(tile_id, area)`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoTileSelected`] without a tile. An invalid area
    /// is reported as `Ok(Err(..))` and leaves the phase untouched.
    pub fn begin_validation(&mut self) -> Result<Result<(i64, f64), AreaError>, FlowError> {
        let tile_id = self
            .selected
            .as_ref()
            .map(|t| t.tile_id)
            .ok_or(FlowError::NoTileSelected)?;
        if let Err(err) = validate_area(self.area) {
            return Ok(Err(err));
        }
        self.phase = PurchasePhase::Validating;
        Ok(Ok((tile_id, self.area)))
    }

    /// Take the quote back. Returns the notices to show.
    pub fn apply_quote(&mut self, tile_id: i64, result: QuoteResult) -> Vec<Notice> {
        let notices = result.notices();
        if self.selected.as_ref().map(|t| t.tile_id) != Some(tile_id) {
            return notices;
        }
        if let QuoteResult::Quoted { validation, .. } = result {
            let can_purchase = validation.can_purchase;
            self.validation = Some(validation);
            if self.phase == PurchasePhase::Validating {
                self.phase = if self.dialog_open && can_purchase {
                    PurchasePhase::Confirming
                } else {
                    PurchasePhase::ValidationReady
                };
            }
        } else if self.phase == PurchasePhase::Validating {
            self.phase = PurchasePhase::TileSelected;
        }
        notices
    }

    /// Move to confirmation.
    ///
    /// # Errors
    ///
    /// Fails without a tile, or when the latest quote does not allow buying.
    pub fn open_dialog(&mut self) -> Result<(), FlowError> {
        if self.selected.is_none() {
            return Err(FlowError::NoTileSelected);
        }
        let allowed = self.phase == PurchasePhase::ValidationReady
            && self.validation.as_ref().is_some_and(|v| v.can_purchase);
        if !allowed {
            return Err(FlowError::ValidationBlocked);
        }
        self.phase = PurchasePhase::Confirming;
        self.dialog_open = true;
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
        if self.phase == PurchasePhase::Confirming {
            self.phase = PurchasePhase::ValidationReady;
        }
    }

    /// Build the purchase request and enter `Purchasing`.
    ///
    /// # Errors
    ///
    /// Fails without a tile, with an invalid area, or unless
    /// [`can_confirm`](Self::can_confirm) holds.
    pub fn begin_purchase(&mut self) -> Result<LandPurchaseRequest, FlowError> {
        if self.is_purchasing() {
            return Err(FlowError::Busy);
        }
        let tile_id = self
            .selected
            .as_ref()
            .map(|t| t.tile_id)
            .ok_or(FlowError::NoTileSelected)?;
        if !self.can_confirm() {
            return Err(FlowError::ValidationBlocked);
        }
        let area = validate_area(self.area).map_err(|_| FlowError::ValidationBlocked)?;
        let mut request = LandPurchaseRequest::new(tile_id, area);
        request.description = self.description.clone().filter(|d| !d.trim().is_empty());
        if self.protection.enabled {
            request.max_gold_cost = self.protection.max_gold_cost;
            request.max_carbon_cost = self.protection.max_carbon_cost;
        }
        self.phase = PurchasePhase::Purchasing;
        Ok(request)
    }

    /// Settle the purchase call. Success forgets the tile, so the next
    /// purchase starts from a fresh selection.
    pub fn apply_purchase(&mut self, result: Result<PurchaseReceipt, ApiError>) -> PurchaseEffects {
        match result {
            Ok(receipt) => {
                log::info!(
                    "purchased {} area on tile {} for {:.2}",
                    receipt.purchased_area,
                    receipt.tile_id,
                    receipt.total_cost
                );
                let notice = Notice::success(
                    "Land Purchased",
                    format!(
                        "Bought {} area on tile {} (gold {:.2}, carbon {:.2})",
                        receipt.purchased_area,
                        receipt.tile_id,
                        receipt.gold_cost,
                        receipt.carbon_cost
                    ),
                )
                .delayed(self.success_delay_ms);
                let animate_tile = Some(receipt.tile_id);
                self.last_receipt = Some(receipt);
                self.last_error = None;
                self.selected = None;
                self.details = None;
                self.validation = None;
                self.dialog_open = false;
                self.phase = PurchasePhase::Success;
                PurchaseEffects {
                    notices: vec![notice],
                    animate_tile,
                    refresh: true,
                }
            }
            Err(err) => {
                let message = error_message(&err);
                log::error!("land purchase failed: {err}");
                self.last_error = Some(message.clone());
                self.phase = PurchasePhase::ValidationReady;
                PurchaseEffects {
                    notices: vec![Notice::error("Purchase Failed", message)],
                    animate_tile: None,
                    refresh: false,
                }
            }
        }
    }

    /// Forget the selected tile and its quote.
    pub fn deselect(&mut self) {
        if self.is_purchasing() {
            return;
        }
        self.selected = None;
        self.details = None;
        self.validation = None;
        self.dialog_open = false;
        self.phase = PurchasePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tile(id: i64, can_purchase: bool) -> AvailableTile {
        serde_json::from_value(json!({
            "tileId": id, "axialQ": 0, "axialR": 0, "landType": "PLAIN",
            "currentGoldPrice": 10, "currentCarbonPrice": 5, "canPurchase": can_purchase
        }))
        .unwrap()
    }

    fn quoted(can_purchase: bool) -> QuoteResult {
        QuoteResult::Quoted {
            validation: PurchaseValidation {
                can_purchase,
                total_cost: 45.0,
                ..PurchaseValidation::default()
            },
            notices: Vec::new(),
        }
    }

    fn ready_flow() -> PurchaseFlow {
        let mut flow = PurchaseFlow::new(3.0, 1_500);
        flow.select(&tile(7, true)).unwrap();
        let (id, _) = flow.begin_validation().unwrap().unwrap();
        flow.apply_quote(id, quoted(true));
        flow
    }

    #[test]
    fn happy_path_walks_every_phase() {
        let mut flow = PurchaseFlow::new(3.0, 1_500);
        assert_eq!(flow.phase(), PurchasePhase::Idle);
        flow.select(&tile(7, true)).unwrap();
        assert_eq!(flow.phase(), PurchasePhase::TileSelected);
        assert!(flow.needs_validation());
        let (id, area) = flow.begin_validation().unwrap().unwrap();
        assert_eq!((id, area), (7, 3.0));
        assert_eq!(flow.phase(), PurchasePhase::Validating);
        flow.apply_quote(id, quoted(true));
        assert_eq!(flow.phase(), PurchasePhase::ValidationReady);
        flow.open_dialog().unwrap();
        let request = flow.begin_purchase().unwrap();
        assert_eq!(request, LandPurchaseRequest::new(7, 3));
        assert!(flow.is_purchasing());
        let effects = flow.apply_purchase(Ok(PurchaseReceipt {
            tile_id: 7,
            purchased_area: 3.0,
            ..PurchaseReceipt::default()
        }));
        assert_eq!(flow.phase(), PurchasePhase::Success);
        assert!(flow.selected().is_none());
        assert!(!flow.dialog_open());
        assert!(!flow.needs_validation());
        assert!(effects.refresh);
        assert_eq!(effects.animate_tile, Some(7));
        assert_eq!(effects.notices[0].delay_ms, 1_500);
    }

    #[test]
    fn ineligible_tiles_cannot_be_selected() {
        let mut flow = PurchaseFlow::new(1.0, 0);
        assert_eq!(
            flow.select(&tile(4, false)),
            Err(FlowError::TileNotPurchasable(4))
        );
        assert_eq!(flow.phase(), PurchasePhase::Idle);
    }

    #[test]
    fn invalid_area_leaves_phase_alone() {
        let mut flow = PurchaseFlow::new(1.0, 0);
        flow.select(&tile(7, true)).unwrap();
        flow.set_area(1.5);
        let outcome = flow.begin_validation().unwrap();
        assert!(outcome.is_err());
        assert_eq!(flow.phase(), PurchasePhase::TileSelected);
    }

    #[test]
    fn dialog_requires_purchasable_quote() {
        let mut flow = PurchaseFlow::new(2.0, 0);
        flow.select(&tile(7, true)).unwrap();
        let (id, _) = flow.begin_validation().unwrap().unwrap();
        flow.apply_quote(id, quoted(false));
        assert_eq!(flow.open_dialog(), Err(FlowError::ValidationBlocked));
    }

    #[test]
    fn price_protection_only_sent_when_enabled() {
        let mut flow = ready_flow();
        flow.protection = PriceProtection {
            enabled: false,
            max_gold_cost: Some(50.0),
            max_carbon_cost: Some(20.0),
        };
        flow.open_dialog().unwrap();
        let request = flow.begin_purchase().unwrap();
        assert_eq!(request.max_gold_cost, None);

        let mut flow = ready_flow();
        flow.protection = PriceProtection {
            enabled: true,
            max_gold_cost: Some(50.0),
            max_carbon_cost: None,
        };
        flow.open_dialog().unwrap();
        let request = flow.begin_purchase().unwrap();
        assert_eq!(request.max_gold_cost, Some(50.0));
        assert_eq!(request.max_carbon_cost, None);
    }

    #[test]
    fn failed_purchase_returns_to_validation_ready() {
        let mut flow = ready_flow();
        flow.open_dialog().unwrap();
        flow.begin_purchase().unwrap();
        let effects = flow.apply_purchase(Err(ApiError::from_status(
            400,
            r#"{"message":"Insufficient gold"}"#,
        )));
        assert_eq!(flow.phase(), PurchasePhase::ValidationReady);
        assert_eq!(flow.last_error(), Some("Insufficient gold"));
        assert!(!effects.refresh);
        assert_eq!(effects.notices[0].message, "Insufficient gold");
    }

    #[test]
    fn area_change_requests_a_new_quote() {
        let mut flow = ready_flow();
        flow.set_area(5.0);
        assert!(flow.needs_validation());
    }

    #[test]
    fn area_change_in_dialog_requotes_before_confirming() {
        let mut flow = ready_flow();
        flow.open_dialog().unwrap();
        flow.set_area(9.0);
        assert!(flow.dialog_open());
        assert!(flow.validation().is_none());
        assert!(flow.needs_validation());
        assert!(!flow.can_confirm());
        assert_eq!(flow.begin_purchase(), Err(FlowError::ValidationBlocked));

        let (id, area) = flow.begin_validation().unwrap().unwrap();
        assert_eq!((id, area), (7, 9.0));
        flow.apply_quote(id, quoted(true));
        assert_eq!(flow.phase(), PurchasePhase::Confirming);
        assert_eq!(flow.begin_purchase().unwrap().area, 9);
    }

    #[test]
    fn refused_requote_in_dialog_disables_confirm() {
        let mut flow = ready_flow();
        flow.open_dialog().unwrap();
        flow.set_area(50.0);
        let (id, _) = flow.begin_validation().unwrap().unwrap();
        flow.apply_quote(id, quoted(false));
        assert_eq!(flow.phase(), PurchasePhase::ValidationReady);
        assert!(!flow.can_confirm());
        assert_eq!(flow.begin_purchase(), Err(FlowError::ValidationBlocked));
    }

    #[test]
    fn fractional_area_in_dialog_blocks_purchase() {
        let mut flow = ready_flow();
        flow.open_dialog().unwrap();
        flow.set_area(2.5);
        assert!(flow.begin_validation().unwrap().is_err());
        assert_eq!(flow.phase(), PurchasePhase::TileSelected);
        assert_eq!(flow.begin_purchase(), Err(FlowError::ValidationBlocked));
    }

    #[test]
    fn failed_purchase_can_be_retried_from_open_dialog() {
        let mut flow = ready_flow();
        flow.open_dialog().unwrap();
        flow.begin_purchase().unwrap();
        flow.apply_purchase(Err(ApiError::Network("offline".into())));
        assert!(flow.can_confirm());
        assert!(flow.begin_purchase().is_ok());

        flow.apply_purchase(Err(ApiError::Network("offline".into())));
        flow.close_dialog();
        assert!(!flow.can_confirm());
        assert_eq!(flow.begin_purchase(), Err(FlowError::ValidationBlocked));
    }

    #[test]
    fn stale_quote_for_other_tile_is_ignored() {
        let mut flow = PurchaseFlow::new(1.0, 0);
        flow.select(&tile(7, true)).unwrap();
        flow.begin_validation().unwrap().unwrap();
        flow.select(&tile(8, true)).unwrap();
        flow.apply_quote(7, quoted(true));
        assert!(flow.validation().is_none());
        assert_eq!(flow.phase(), PurchasePhase::TileSelected);
    }
}
