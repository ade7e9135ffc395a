//! Purchase quotes: area checks, sanitizing the backend's validation body,
//! and classifying the reasons a purchase is refused.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::LandApi;
use crate::error::{AreaError, error_message};
use crate::notice::Notice;
use crate::numbers::{json_number_or_zero, json_truthy, nan_to_zero, round_f64_to_u32, u32_to_f64};
use crate::tile::AvailableTile;

pub const VALIDATION_FALLBACK_ERROR: &str = "Unable to validate purchase. Please try again.";

/// Validation body exactly as the backend sent it. Numeric fields may be
/// missing, null or of the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPurchaseValidation(pub Value);

impl RawPurchaseValidation {
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Display-safe quote: every number is real, `can_purchase` is a strict bool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseValidation {
    pub can_purchase: bool,
    pub gold_cost: f64,
    pub carbon_cost: f64,
    pub total_cost: f64,
    pub available_area: f64,
    pub team_gold_balance: f64,
    pub team_carbon_balance: f64,
    pub errors: Vec<String>,
}

impl PurchaseValidation {
    /// Record used when the quote could not be obtained at all.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            errors: vec![VALIDATION_FALLBACK_ERROR.to_string()],
            ..Self::default()
        }
    }

    /// Apply the NaN guard to an already typed record.
    #[must_use]
    pub fn guarded(self) -> Self {
        Self {
            gold_cost: nan_to_zero(self.gold_cost),
            carbon_cost: nan_to_zero(self.carbon_cost),
            total_cost: nan_to_zero(self.total_cost),
            available_area: nan_to_zero(self.available_area),
            team_gold_balance: nan_to_zero(self.team_gold_balance),
            team_carbon_balance: nan_to_zero(self.team_carbon_balance),
            ..self
        }
    }
}

/// Coerce a raw validation body into a [`PurchaseValidation`].
#[must_use]
pub fn sanitize(raw: &RawPurchaseValidation) -> PurchaseValidation {
    let errors = match raw.field("errors") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    PurchaseValidation {
        can_purchase: json_truthy(raw.field("canPurchase")),
        gold_cost: json_number_or_zero(raw.field("goldCost")),
        carbon_cost: json_number_or_zero(raw.field("carbonCost")),
        total_cost: json_number_or_zero(raw.field("totalCost")),
        available_area: json_number_or_zero(raw.field("availableArea")),
        team_gold_balance: json_number_or_zero(raw.field("teamGoldBalance")),
        team_carbon_balance: json_number_or_zero(raw.field("teamCarbonBalance")),
        errors,
    }
}

/// Check a requested area before any network call.
///
/// # Errors
///
/// Returns [`AreaError`] for fractional, non-finite or non-positive input.
pub fn validate_area(area: f64) -> Result<u32, AreaError> {
    if !area.is_finite() || area.fract() != 0.0 {
        return Err(AreaError::NotInteger(area));
    }
    if area <= 0.0 {
        return Err(AreaError::NotPositive(area));
    }
    Ok(round_f64_to_u32(area))
}

/// Warning shown when [`validate_area`] rejects the input.
#[must_use]
pub fn area_warning(err: &AreaError) -> Notice {
    Notice::warning("Invalid Area", err.to_string())
}

/// Why the backend refused a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    TeamMembership,
    ActivityEnrollment,
    Pricing,
    Generic,
}

impl ErrorCategory {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::TeamMembership => "Team Membership Required",
            Self::ActivityEnrollment => "Activity Enrollment Required",
            Self::Pricing => "Pricing Unavailable",
            Self::Generic => "Purchase Not Allowed",
        }
    }
}

#[must_use]
pub fn classify_error(message: &str) -> ErrorCategory {
    let lower = message.to_lowercase();
    if lower.contains("team") || lower.contains("member") {
        ErrorCategory::TeamMembership
    } else if lower.contains("activity") {
        ErrorCategory::ActivityEnrollment
    } else if lower.contains("pricing") || lower.contains("price") {
        ErrorCategory::Pricing
    } else {
        ErrorCategory::Generic
    }
}

/// One notice per category present in `errors`, in first-seen order.
#[must_use]
pub fn category_notices(errors: &[String]) -> Vec<Notice> {
    let mut grouped: Vec<(ErrorCategory, Vec<&str>)> = Vec::new();
    for error in errors {
        let category = classify_error(error);
        if let Some((_, messages)) = grouped.iter_mut().find(|(c, _)| *c == category) {
            messages.push(error);
        } else {
            grouped.push((category, vec![error]));
        }
    }
    grouped
        .into_iter()
        .map(|(category, messages)| {
            let message = messages.join("; ");
            if category == ErrorCategory::Pricing {
                Notice::warning(category.title(), message)
            } else {
                Notice::error(category.title(), message)
            }
        })
        .collect()
}

/// Result of asking for a quote.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteResult {
    /// The area never left the client.
    InvalidArea(AreaError),
    Quoted {
        validation: PurchaseValidation,
        notices: Vec<Notice>,
    },
}

impl QuoteResult {
    #[must_use]
    pub fn validation(&self) -> Option<&PurchaseValidation> {
        match self {
            Self::Quoted { validation, .. } => Some(validation),
            Self::InvalidArea(_) => None,
        }
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        match self {
            Self::InvalidArea(err) => vec![area_warning(err)],
            Self::Quoted { notices, .. } => notices.clone(),
        }
    }
}

/// Obtain a sanitized quote for `area` units of `tile_id`. Never fails: a
/// transport error produces [`PurchaseValidation::fallback`].
pub async fn quote<A: LandApi>(api: &A, tile_id: i64, area: f64) -> QuoteResult {
    let area = match validate_area(area) {
        Ok(area) => area,
        Err(err) => {
            log::warn!("rejected purchase area for tile {tile_id}: {err}");
            return QuoteResult::InvalidArea(err);
        }
    };

    match api.validate_purchase(tile_id, area).await {
        Ok(raw) => {
            let validation = sanitize(&raw);
            let notices = category_notices(&validation.errors);
            QuoteResult::Quoted {
                validation,
                notices,
            }
        }
        Err(err) => {
            log::error!("purchase validation failed for tile {tile_id}: {err}");
            QuoteResult::Quoted {
                validation: PurchaseValidation::fallback(),
                notices: vec![Notice::error("Validation Failed", error_message(&err))],
            }
        }
    }
}

/// Local cost estimate shown before the server quote arrives.
#[must_use]
pub fn estimate_quote(tile: &AvailableTile, area: u32) -> f64 {
    u32_to_f64(area) * tile.unit_price()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_zeroes_missing_and_wrong_typed_numbers() {
        let raw = RawPurchaseValidation(json!({
            "canPurchase": 1,
            "goldCost": "12",
            "carbonCost": null,
            "availableArea": 40,
            "errors": ["Insufficient gold", 7]
        }));
        let v = sanitize(&raw);
        assert!(v.can_purchase);
        assert!(v.gold_cost.abs() < f64::EPSILON);
        assert!(v.carbon_cost.abs() < f64::EPSILON);
        assert!(v.total_cost.abs() < f64::EPSILON);
        assert!((v.available_area - 40.0).abs() < f64::EPSILON);
        assert_eq!(v.errors, vec!["Insufficient gold".to_string()]);
    }

    #[test]
    fn guarded_clears_nan() {
        let v = PurchaseValidation {
            gold_cost: f64::NAN,
            team_carbon_balance: f64::NAN,
            ..PurchaseValidation::default()
        }
        .guarded();
        assert!(v.gold_cost.abs() < f64::EPSILON);
        assert!(!v.team_carbon_balance.is_nan());
    }

    #[test]
    fn area_check_rejects_fractions_and_non_positive() {
        assert_eq!(validate_area(3.0), Ok(3));
        assert_eq!(validate_area(2.5), Err(AreaError::NotInteger(2.5)));
        assert_eq!(validate_area(0.0), Err(AreaError::NotPositive(0.0)));
        assert_eq!(validate_area(-4.0), Err(AreaError::NotPositive(-4.0)));
        assert!(matches!(validate_area(f64::NAN), Err(AreaError::NotInteger(_))));
    }

    #[test]
    fn errors_are_classified_by_substring() {
        assert_eq!(
            classify_error("User is not a member of any team"),
            ErrorCategory::TeamMembership
        );
        assert_eq!(
            classify_error("No active Activity enrollment"),
            ErrorCategory::ActivityEnrollment
        );
        assert_eq!(
            classify_error("Pricing data not found"),
            ErrorCategory::Pricing
        );
        assert_eq!(classify_error("Tile is full"), ErrorCategory::Generic);
    }

    #[test]
    fn category_notices_group_and_pick_levels() {
        let notices = category_notices(&[
            "Price changed".to_string(),
            "Not a team member".to_string(),
            "Price ceiling exceeded".to_string(),
        ]);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].title, "Pricing Unavailable");
        assert_eq!(notices[0].level, crate::notice::NoticeLevel::Warning);
        assert_eq!(notices[0].message, "Price changed; Price ceiling exceeded");
        assert_eq!(notices[1].level, crate::notice::NoticeLevel::Error);
    }

    #[test]
    fn estimate_multiplies_area_by_unit_price() {
        let tile: AvailableTile = serde_json::from_value(json!({
            "tileId": 7, "axialQ": 0, "axialR": 0, "landType": "PLAIN",
            "currentGoldPrice": 10, "currentCarbonPrice": 5, "canPurchase": true
        }))
        .unwrap();
        assert!((estimate_quote(&tile, 3) - 45.0).abs() < f64::EPSILON);
    }
}
