use landmark_core::{
    ApiError, AvailableTile, LandApi, LandPurchaseRequest, MemoryLandApi, PurchaseReceipt,
    RawPurchaseValidation, TeamLandSummary, TileDetails,
};

use crate::http::ReqwestLandApi;

/// How to build a backend for one scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSpec {
    /// Generated hex map, rebuilt for every run so runs cannot see each
    /// other's purchases.
    Memory { radius: i32 },
    Http { base_url: String },
}

impl BackendSpec {
    #[must_use]
    pub fn connect(&self, seed: u64) -> Backend {
        match self {
            Self::Memory { radius } => Backend::Memory(MemoryLandApi::generated(seed, *radius)),
            Self::Http { base_url } => Backend::Http(ReqwestLandApi::new(base_url.clone())),
        }
    }

    /// Seeds only shape generated maps; a live backend runs once.
    #[must_use]
    pub fn seeds_for<'a>(&self, seeds: &'a [u64]) -> &'a [u64] {
        match self {
            Self::Memory { .. } => seeds,
            Self::Http { .. } => &seeds[..seeds.len().min(1)],
        }
    }
}

/// Where scenarios send their calls.
#[derive(Debug)]
pub enum Backend {
    Memory(MemoryLandApi),
    Http(ReqwestLandApi),
}

impl Backend {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Http(_) => "http",
        }
    }
}

impl LandApi for Backend {
    async fn available_tiles(&self) -> Result<Vec<AvailableTile>, ApiError> {
        match self {
            Self::Memory(api) => api.available_tiles().await,
            Self::Http(api) => api.available_tiles().await,
        }
    }

    async fn team_summary(&self) -> Result<TeamLandSummary, ApiError> {
        match self {
            Self::Memory(api) => api.team_summary().await,
            Self::Http(api) => api.team_summary().await,
        }
    }

    async fn tile_details(&self, tile_id: i64) -> Result<TileDetails, ApiError> {
        match self {
            Self::Memory(api) => api.tile_details(tile_id).await,
            Self::Http(api) => api.tile_details(tile_id).await,
        }
    }

    async fn validate_purchase(
        &self,
        tile_id: i64,
        area: u32,
    ) -> Result<RawPurchaseValidation, ApiError> {
        match self {
            Self::Memory(api) => api.validate_purchase(tile_id, area).await,
            Self::Http(api) => api.validate_purchase(tile_id, area).await,
        }
    }

    async fn purchase(&self, request: &LandPurchaseRequest) -> Result<PurchaseReceipt, ApiError> {
        match self {
            Self::Memory(api) => api.purchase(request).await,
            Self::Http(api) => api.purchase(request).await,
        }
    }
}
