//! Error type shared by every module in the crate.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading shelters or building a route.
#[derive(Debug, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum Error {
    /// The shelter asset could not be read.
    #[error("failed to read shelter asset: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document (shelter asset or directions response) did not parse.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A shelter entry carried an unusable name or coordinate.
    #[error("invalid shelter at index {index}: {reason}")]
    InvalidShelter { index: usize, reason: String },

    /// The encoded geometry string could not be decoded.
    #[error("malformed polyline at byte {position}: {reason}")]
    MalformedPolyline { position: usize, reason: &'static str },

    /// The directions service answered with a non-OK status and no routes.
    #[error("directions service returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    ApiStatus { status: String, message: Option<String> },

    /// The directions response held no usable route or leg.
    #[error("directions response contains no route")]
    NoRoute,

    /// No API key was configured for the directions service.
    #[error("directions API key is not configured")]
    MissingApiKey,

    /// The directions service answered with a non-success HTTP status.
    #[cfg(feature = "http")]
    #[error("directions request failed with HTTP {0}")]
    HttpStatus(u16),

    /// The request never produced a response.
    #[cfg(feature = "http")]
    #[error("directions request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The blocking wrapper could not start its runtime.
    #[cfg(feature = "http")]
    #[error("failed to start async runtime: {0}")]
    Runtime(String),
}
