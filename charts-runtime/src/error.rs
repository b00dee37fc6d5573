//! Runtime error types.

use thiserror::Error;

/// Result type for chart operations.
pub type ChartResult<T> = Result<T, ChartError>;

/// Result type for rendering backend operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors surfaced to callers of a [`Chart`](crate::Chart).
#[derive(Debug, Error)]
pub enum ChartError {
    /// The construction target cannot be drawn on.
    #[error("Invalid chart target: {0}")]
    InvalidTarget(String),

    /// The chart was destroyed.
    #[error("Chart {0} has been destroyed")]
    Destroyed(String),

    /// The rendering library did not become ready.
    #[error("Rendering library not ready: {0}")]
    NotReady(String),

    /// No rendered instance exists yet.
    #[error("Chart has not been rendered")]
    NotRendered,

    /// Image capture could not be decoded or written.
    #[error("Export failed: {0}")]
    Export(String),

    /// The backend failed to draw.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors raised by a rendering backend.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The rendering library entry point is missing.
    #[error("Rendering library unavailable: {0}")]
    Unavailable(String),

    /// Creating the chart instance failed.
    #[error("Failed to create chart: {0}")]
    Create(String),

    /// Registering an extension failed.
    #[error("Failed to register extension '{name}': {reason}")]
    Register {
        /// Extension name.
        name: String,
        /// Backend message.
        reason: String,
    },

    /// Capturing the drawn image failed.
    #[error("Capture failed: {0}")]
    Capture(String),
}

/// Errors raised while loading a script source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The name is not in the extension catalog.
    #[error("Unknown extension: {0}")]
    UnknownExtension(String),

    /// The loader reported a failure.
    #[error("Failed to load '{source_url}': {reason}")]
    Failed {
        /// Script source.
        source_url: String,
        /// Loader message.
        reason: String,
    },

    /// The deadline passed before the load finished.
    #[error("Timed out loading '{0}'")]
    TimedOut(String),
}
