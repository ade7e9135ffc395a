//! `fetch` transport for the land backend.
use landmark_core::api::{
    AVAILABLE_TILES_PATH, PURCHASE_PATH, TEAM_SUMMARY_PATH, VALIDATE_PURCHASE_PATH,
    tile_details_path,
};
use landmark_core::{
    ApiError, AvailableTile, LandApi, LandPurchaseRequest, PurchaseReceipt,
    RawPurchaseValidation, TeamLandSummary, TileDetails, decode_payload, endpoint_url,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::dom::{self, DomError, FetchedText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpLandApi {
    base_url: String,
}

impl HttpLandApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let fetched = dom::fetch_text("GET", &self.url(path), None)
            .await
            .map_err(network_error)?;
        decode_response(&fetched)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &str) -> Result<T, ApiError> {
        let fetched = dom::fetch_text("POST", &self.url(path), Some(body))
            .await
            .map_err(network_error)?;
        decode_response(&fetched)
    }
}

fn network_error(err: DomError) -> ApiError {
    ApiError::Network(err.to_string())
}

/// Turn a completed response into a payload or an [`ApiError`].
///
/// # Errors
/// Non-2xx statuses become [`ApiError::Status`]; undecodable bodies become
/// [`ApiError::Decode`].
pub fn decode_response<T: DeserializeOwned>(fetched: &FetchedText) -> Result<T, ApiError> {
    if !fetched.is_success() {
        return Err(ApiError::from_status(fetched.status, &fetched.body));
    }
    decode_payload(&fetched.body)
}

#[must_use]
pub fn validate_body(tile_id: i64, area: u32) -> String {
    json!({ "tileId": tile_id, "area": area }).to_string()
}

impl LandApi for HttpLandApi {
    async fn available_tiles(&self) -> Result<Vec<AvailableTile>, ApiError> {
        self.get(AVAILABLE_TILES_PATH).await
    }

    async fn team_summary(&self) -> Result<TeamLandSummary, ApiError> {
        self.get(TEAM_SUMMARY_PATH).await
    }

    async fn tile_details(&self, tile_id: i64) -> Result<TileDetails, ApiError> {
        self.get(&tile_details_path(tile_id)).await
    }

    async fn validate_purchase(
        &self,
        tile_id: i64,
        area: u32,
    ) -> Result<RawPurchaseValidation, ApiError> {
        self.post(VALIDATE_PURCHASE_PATH, &validate_body(tile_id, area))
            .await
    }

    async fn purchase(&self, request: &LandPurchaseRequest) -> Result<PurchaseReceipt, ApiError> {
        let body = serde_json::to_string(request)?;
        self.post(PURCHASE_PATH, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_against_the_base() {
        let api = HttpLandApi::new("/api");
        assert_eq!(api.url(PURCHASE_PATH), "/api/land/purchase");
        assert_eq!(api.url(&tile_details_path(9)), "/api/land/tiles/9");
    }

    #[test]
    fn error_statuses_carry_backend_message() {
        let fetched = FetchedText {
            status: 403,
            body: r#"{"message":"Team membership required"}"#.to_string(),
        };
        let err = decode_response::<TeamLandSummary>(&fetched).unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 403,
                message: "Team membership required".to_string()
            }
        );
    }

    #[test]
    fn wrapped_success_bodies_decode() {
        let fetched = FetchedText {
            status: 200,
            body: r#"{"data":{"tileId":4,"purchasedArea":2,"totalCost":30}}"#.to_string(),
        };
        let receipt: PurchaseReceipt = decode_response(&fetched).unwrap();
        assert_eq!(receipt.tile_id, 4);
        assert!((receipt.total_cost - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_body_uses_camel_case() {
        assert_eq!(validate_body(7, 3), r#"{"area":3,"tileId":7}"#);
    }
}
