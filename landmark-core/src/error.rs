//! Error types shared by the flows and the API implementations.
use serde_json::Value;
use thiserror::Error;

/// Failure talking to the land backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl ApiError {
    /// Build a status error, pulling the backend's `message` field out of the
    /// body when there is one.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| backend_message(&value))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.trim().to_string()
                }
            });
        Self::Status { status, message }
    }
}

fn backend_message(value: &Value) -> Option<String> {
    match value.get("message")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

/// Best-effort human-readable message for any flow error.
#[must_use]
pub fn error_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. } => message.clone(),
        ApiError::Network(msg) | ApiError::Decode(msg) if !msg.is_empty() => msg.clone(),
        _ => "An unexpected error occurred".to_string(),
    }
}

/// Rejected purchase area.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AreaError {
    #[error("Area must be a whole number, got {0}")]
    NotInteger(f64),
    #[error("Area must be greater than zero, got {0}")]
    NotPositive(f64),
}

/// A flow operation attempted from the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("No tile is selected")]
    NoTileSelected,
    #[error("Tile {0} is not available for purchase")]
    TileNotPurchasable(i64),
    #[error("Tile {0} is not in the current tile list")]
    UnknownTile(i64),
    #[error("Purchase is not allowed by the latest validation")]
    ValidationBlocked,
    #[error("A purchase is already in progress")]
    Busy,
    #[error("Bulk selection is empty")]
    EmptySelection,
}
