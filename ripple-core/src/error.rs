//! Error Types
//!
//! Errors surfaced by the reactive runtime and its supporting value types.
//!
//! Most reactive operations are infallible: reads and writes never fail, and
//! equality is total. Errors only appear at the edges, when loading
//! configuration, converting values to and from JSON, or when the optional
//! recursion limit trips.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReactiveError>;

/// Errors produced by the reactive runtime.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// Nested effect runs exceeded the configured depth limit.
    ///
    /// This is raised as a panic payload because the write that started the
    /// cascade has no error channel; see [`RuntimeConfig::max_depth`].
    ///
    /// [`RuntimeConfig::max_depth`]: crate::reactive::RuntimeConfig::max_depth
    #[error("effect recursion exceeded the configured limit of {limit} nested runs")]
    RecursionLimit { limit: usize },

    /// A value has no JSON representation (undefined, opaque, non-finite).
    #[error("value cannot be represented as JSON: {reason}")]
    NotRepresentable { reason: String },

    /// Input was not valid JSON for the requested type.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A runtime configuration failed validation.
    #[error("invalid runtime configuration: {reason}")]
    InvalidConfig { reason: String },
}
