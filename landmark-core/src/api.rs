//! Request/response contract with the land backend.
//!
//! Platform shells provide the transport: the web crate uses `fetch`, the
//! tester uses `reqwest`, and [`crate::memory::MemoryLandApi`] serves tests.
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::rc::Rc;

use crate::error::ApiError;
use crate::tile::{
    AvailableTile, LandPurchaseRequest, PurchaseReceipt, TeamLandSummary, TileDetails,
};
use crate::validation::RawPurchaseValidation;

pub const AVAILABLE_TILES_PATH: &str = "/land/available-tiles";
pub const TEAM_SUMMARY_PATH: &str = "/land/team/summary";
pub const VALIDATE_PURCHASE_PATH: &str = "/land/validate-purchase";
pub const PURCHASE_PATH: &str = "/land/purchase";

#[must_use]
pub fn tile_details_path(tile_id: i64) -> String {
    format!("/land/tiles/{tile_id}")
}

/// Join a base URL and an endpoint path without doubling slashes.
#[must_use]
pub fn endpoint_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Decode a response body that is either the payload itself or wrapped as
/// `{ "data": payload }`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if neither shape matches `T`.
pub fn decode_payload<T>(body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let value: Value = serde_json::from_str(body)?;
    decode_value(value)
}

/// Same as [`decode_payload`] for an already parsed value.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if neither shape matches `T`.
pub fn decode_value<T>(value: Value) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    if let Value::Object(map) = &value
        && let Some(inner) = map.get("data")
        && let Ok(parsed) = serde_json::from_value::<T>(inner.clone())
    {
        return Ok(parsed);
    }
    serde_json::from_value(value).map_err(ApiError::from)
}

/// The five backend calls the land market needs.
///
/// Futures are not required to be `Send`; browser transports are
/// single-threaded.
#[allow(async_fn_in_trait)]
pub trait LandApi {
    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    async fn available_tiles(&self) -> Result<Vec<AvailableTile>, ApiError>;

    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    async fn team_summary(&self) -> Result<TeamLandSummary, ApiError>;

    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    async fn tile_details(&self, tile_id: i64) -> Result<TileDetails, ApiError>;

    /// Ask for a cost/eligibility quote. The raw body is returned unvalidated.
    ///
    /// # Errors
    /// Returns an error if the request fails or the body is not JSON.
    async fn validate_purchase(
        &self,
        tile_id: i64,
        area: u32,
    ) -> Result<RawPurchaseValidation, ApiError>;

    /// # Errors
    /// Returns an error if the backend rejects the purchase or the request fails.
    async fn purchase(&self, request: &LandPurchaseRequest) -> Result<PurchaseReceipt, ApiError>;
}

/// Shared handles forward to the backend they wrap.
impl<T: LandApi> LandApi for Rc<T> {
    async fn available_tiles(&self) -> Result<Vec<AvailableTile>, ApiError> {
        (**self).available_tiles().await
    }

    async fn team_summary(&self) -> Result<TeamLandSummary, ApiError> {
        (**self).team_summary().await
    }

    async fn tile_details(&self, tile_id: i64) -> Result<TileDetails, ApiError> {
        (**self).tile_details(tile_id).await
    }

    async fn validate_purchase(
        &self,
        tile_id: i64,
        area: u32,
    ) -> Result<RawPurchaseValidation, ApiError> {
        (**self).validate_purchase(tile_id, area).await
    }

    async fn purchase(&self, request: &LandPurchaseRequest) -> Result<PurchaseReceipt, ApiError> {
        (**self).purchase(request).await
    }
}
