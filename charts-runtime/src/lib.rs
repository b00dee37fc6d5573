//! # Canvas Charts Runtime
//!
//! Lifecycle management for charts drawn by an external canvas chart
//! library. Generic over the rendering backend so the same lifecycle runs
//! in the browser and under native tests.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Chart                     │
//! │  render · mutate · resize · export · destroy│
//! ├──────────────────────┬──────────────────────┤
//! │  ExtensionRegistry   │  Bounded readiness   │
//! │  (load once,         │  (deadline raced     │
//! │   register once)     │   against a Timer)   │
//! ├──────────────────────┴──────────────────────┤
//! │ RenderBackend │ HostSurface │ ScriptLoader  │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod ready;
pub mod registry;

pub use backend::{HostSurface, ObserverGuard, RenderBackend, RenderedChart};
pub use chart::{Chart, ChartRuntime};
pub use config::{default_catalog, ExtensionDescriptor, ExtensionKind, RuntimeConfig};
pub use error::{ChartError, ChartResult, LoadError, RenderError, RenderResult};
pub use export::{png_filename, ExportedImage};
#[cfg(not(target_arch = "wasm32"))]
pub use ready::TokioTimer;
pub use ready::{with_deadline, ScriptLoader, Timer};
pub use registry::{ExtensionRegistry, LoadState};
