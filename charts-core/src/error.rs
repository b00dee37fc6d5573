//! Error types for chart spec parsing.
//!
//! The normalization pipeline itself never fails; errors only arise when a
//! document is read from its serialized form.

use thiserror::Error;

/// Result type for chart spec operations.
pub type ChartSpecResult<T> = Result<T, ChartSpecError>;

/// Errors that can occur while reading a chart spec.
#[derive(Debug, Error)]
pub enum ChartSpecError {
    /// The chart type tag is not one of the supported tags.
    #[error("Unknown chart type: {0}")]
    UnknownChartType(String),

    /// The theme name is neither `dark` nor `light`.
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// Spec serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
