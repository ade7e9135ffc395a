//! Landmark Market Core
//!
//! Platform-agnostic logic for the team land market: quote sanitization,
//! the single and bulk purchase flows, tile filtering, caching and keyboard
//! commands. This crate performs no I/O of its own; transports implement
//! [`LandApi`].

pub mod api;
pub mod bulk;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod keyboard;
pub mod market;
pub mod memory;
pub mod notice;
pub mod numbers;
pub mod prefs;
pub mod purchase;
pub mod selection;
pub mod tile;
pub mod validation;
pub mod viewport;

// Re-export commonly used types
pub use api::{LandApi, decode_payload, decode_value, endpoint_url};
pub use bulk::{BulkEstimate, BulkReport, bulk_area, estimate_bulk, run_bulk_purchase};
pub use cache::{CachePolicy, CachedResource, Freshness};
pub use config::{ConfigError, MarketConfig};
pub use error::{ApiError, AreaError, FlowError, error_message};
pub use filter::{MapTile, TileFilter, TileStats, TileView, TileViewCache, derive_view, filter_tiles};
pub use keyboard::{Command, FocusTarget, KeyInput, SHORTCUTS, command_for};
pub use market::{BulkJob, Dialogs, Followup, LandMarket};
pub use memory::MemoryLandApi;
pub use notice::{Notice, NoticeLevel, Outbox};
pub use prefs::{MemoryPreferences, PreferenceStore, TUTORIAL_COMPLETED_KEY};
pub use purchase::{PriceProtection, PurchaseEffects, PurchaseFlow, PurchasePhase};
pub use selection::{BulkSelection, Toggle};
pub use tile::{
    AvailableTile, LandPurchaseRequest, LandType, PurchaseReceipt, TeamLandSummary, TileDetails,
    TileIndex, TileOwnership, axial_to_pixel,
};
pub use validation::{
    ErrorCategory, PurchaseValidation, QuoteResult, RawPurchaseValidation, category_notices,
    classify_error, estimate_quote, quote, sanitize, validate_area,
};
pub use viewport::Viewport;
