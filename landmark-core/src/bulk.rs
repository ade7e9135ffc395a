//! Bulk purchase: one request per selected tile, issued sequentially.
use serde::Serialize;

use crate::api::LandApi;
use crate::error::{AreaError, error_message};
use crate::notice::Notice;
use crate::numbers::round_f64_to_u32;
use crate::tile::{LandPurchaseRequest, PurchaseReceipt, TileIndex};
use crate::validation::estimate_quote;

/// Round the shared per-tile area; fractional slider values are not sold.
///
/// # Errors
///
/// Returns [`AreaError::NotPositive`] if the rounded area is zero or the
/// input is not a real number.
pub fn bulk_area(raw: f64) -> Result<u32, AreaError> {
    if raw.is_nan() || raw.round() <= 0.0 {
        return Err(AreaError::NotPositive(raw));
    }
    Ok(round_f64_to_u32(raw))
}

/// Outcome of a bulk run. Purchases that succeeded stay committed even when
/// later ones fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkReport {
    pub area: u32,
    pub success_count: usize,
    pub fail_count: usize,
    /// Ids that could not be resolved to a tile; neither success nor failure.
    pub skipped: Vec<i64>,
    pub errors: Vec<String>,
    pub receipts: Vec<PurchaseReceipt>,
}

impl BulkReport {
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.success_count + self.fail_count
    }

    /// Notices for the run. Success is delayed behind the purchase animation.
    #[must_use]
    pub fn notices(&self, success_delay_ms: u32) -> Vec<Notice> {
        let mut notices = Vec::new();
        if self.success_count > 0 {
            let total: f64 = self.receipts.iter().map(|r| r.total_cost).sum();
            notices.push(
                Notice::success(
                    "Bulk Purchase Complete",
                    format!(
                        "Purchased {} area on {} tile(s) for {:.2} total",
                        self.area, self.success_count, total
                    ),
                )
                .delayed(success_delay_ms),
            );
        }
        if self.fail_count > 0 {
            notices.push(Notice::error(
                "Some Purchases Failed",
                format!("{} purchase(s) failed: {}", self.fail_count, self.errors.join("; ")),
            ));
        }
        notices
    }

    /// Tiles to animate after the run.
    #[must_use]
    pub fn purchased_tiles(&self) -> Vec<i64> {
        self.receipts.iter().map(|r| r.tile_id).collect()
    }
}

/// Buy `area` units of every id in `ids`, in order.
///
/// Ids that no longer resolve are skipped; per-tile failures are recorded
/// and never abort the run.
pub async fn run_bulk_purchase<A: LandApi>(
    api: &A,
    ids: &[i64],
    index: &TileIndex,
    area: u32,
) -> BulkReport {
    let mut report = BulkReport {
        area,
        ..BulkReport::default()
    };

    for &tile_id in ids {
        let Some(tile) = index.get(tile_id) else {
            log::warn!("bulk purchase skipped unknown tile {tile_id}");
            report.skipped.push(tile_id);
            continue;
        };
        if !tile.can_purchase {
            report.fail_count += 1;
            report
                .errors
                .push(format!("Tile {tile_id}: no longer available for purchase"));
            continue;
        }

        let request = LandPurchaseRequest::new(tile_id, area);
        match api.purchase(&request).await {
            Ok(receipt) => {
                report.success_count += 1;
                report.receipts.push(receipt);
            }
            Err(err) => {
                log::error!("bulk purchase of tile {tile_id} failed: {err}");
                report.fail_count += 1;
                report
                    .errors
                    .push(format!("Tile {tile_id}: {}", error_message(&err)));
            }
        }
    }

    report
}

/// Local cost preview for a bulk selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkEstimate {
    pub tiles: usize,
    pub total_cost: f64,
    pub unresolved: usize,
}

#[must_use]
pub fn estimate_bulk(ids: &[i64], index: &TileIndex, area: u32) -> BulkEstimate {
    ids.iter().fold(BulkEstimate::default(), |mut acc, id| {
        match index.get(*id) {
            Some(tile) => {
                acc.tiles += 1;
                acc.total_cost += estimate_quote(tile, area);
            }
            None => acc.unresolved += 1,
        }
        acc
    })
}
