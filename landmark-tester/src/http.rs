//! `reqwest` transport for running scenarios against a live backend.
use landmark_core::api::{
    AVAILABLE_TILES_PATH, PURCHASE_PATH, TEAM_SUMMARY_PATH, VALIDATE_PURCHASE_PATH,
    tile_details_path,
};
use landmark_core::{
    ApiError, AvailableTile, LandApi, LandPurchaseRequest, PurchaseReceipt,
    RawPurchaseValidation, TeamLandSummary, TileDetails, decode_payload, endpoint_url,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct ReqwestLandApi {
    client: Client,
    base_url: String,
}

impl ReqwestLandApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        log::debug!("{status} ({} bytes)", body.len());
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        decode_payload(&body)
    }
}

fn network_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

impl LandApi for ReqwestLandApi {
    async fn available_tiles(&self) -> Result<Vec<AvailableTile>, ApiError> {
        self.send(self.client.get(self.url(AVAILABLE_TILES_PATH)))
            .await
    }

    async fn team_summary(&self) -> Result<TeamLandSummary, ApiError> {
        self.send(self.client.get(self.url(TEAM_SUMMARY_PATH))).await
    }

    async fn tile_details(&self, tile_id: i64) -> Result<TileDetails, ApiError> {
        self.send(self.client.get(self.url(&tile_details_path(tile_id))))
            .await
    }

    async fn validate_purchase(
        &self,
        tile_id: i64,
        area: u32,
    ) -> Result<RawPurchaseValidation, ApiError> {
        let body = json!({ "tileId": tile_id, "area": area });
        self.send(
            self.client
                .post(self.url(VALIDATE_PURCHASE_PATH))
                .json(&body),
        )
        .await
    }

    async fn purchase(&self, request: &LandPurchaseRequest) -> Result<PurchaseReceipt, ApiError> {
        self.send(self.client.post(self.url(PURCHASE_PATH)).json(request))
            .await
    }
}
