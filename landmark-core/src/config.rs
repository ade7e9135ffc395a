//! Market configuration loaded from JSON.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CachePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub api_base_url: String,
    pub tiles_ttl_ms: u64,
    pub summary_ttl_ms: u64,
    pub stale_window_ms: u64,
    /// Delay before success toasts so the purchase animation plays first.
    pub success_notice_delay_ms: u32,
    pub default_purchase_area: f64,
    pub hex_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_base_url: "/api".to_string(),
            tiles_ttl_ms: 30_000,
            summary_ttl_ms: 30_000,
            stale_window_ms: 120_000,
            success_notice_delay_ms: 1_200,
            default_purchase_area: 1.0,
            hex_size: 24.0,
            min_zoom: 0.5,
            max_zoom: 3.0,
            zoom_step: 0.2,
        }
    }
}

impl MarketConfig {
    /// Parse and validate a JSON config. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiles_ttl_ms == 0 || self.summary_ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "cache TTLs must be greater than zero".to_string(),
            ));
        }
        if self.default_purchase_area.is_nan() || self.default_purchase_area < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "default_purchase_area must be at least 1, got {}",
                self.default_purchase_area
            )));
        }
        if self.hex_size.is_nan() || self.hex_size <= 0.0 {
            return Err(ConfigError::Invalid("hex_size must be positive".to_string()));
        }
        let zoom_ok = self.min_zoom > 0.0 && self.min_zoom < self.max_zoom;
        if !zoom_ok {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min < max, got {}..{}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step.is_nan() || self.zoom_step <= 0.0 {
            return Err(ConfigError::Invalid("zoom_step must be positive".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn tiles_policy(&self) -> CachePolicy {
        CachePolicy {
            ttl_ms: self.tiles_ttl_ms,
            stale_window_ms: self.stale_window_ms,
        }
    }

    #[must_use]
    pub const fn summary_policy(&self) -> CachePolicy {
        CachePolicy {
            ttl_ms: self.summary_ttl_ms,
            stale_window_ms: self.stale_window_ms,
        }
    }
}
