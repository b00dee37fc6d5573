//! # Canvas Charts Core
//!
//! The configuration pipeline that turns a declarative chart description into
//! the fully-resolved configuration a canvas chart renderer consumes.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 ChartSpec                   │
//! ├─────────────────────────────────────────────┤
//! │  Type Resolver   │  Palette Generator       │
//! │  - aliases       │  - explicit cycling      │
//! │  - fallbacks     │  - built-in tables       │
//! ├─────────────────────────────────────────────┤
//! │  Dataset Normalizer  │  Theme & Option Merge│
//! │  - per-type defaults │  - default tree      │
//! │  - histogram bins    │  - deep merge        │
//! ├─────────────────────────────────────────────┤
//! │               ResolvedConfig                │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chart_type;
pub mod config;
pub mod dataset;
pub mod error;
pub mod histogram;
pub mod merge;
pub mod palette;
pub mod schema;
pub mod spec;
pub mod theme;

pub use chart_type::{resolve, ChartType, ControllerLookup, ResolvedType, StaticControllers};
pub use config::{prepare_labels, resolve_config, ResolvedConfig};
pub use dataset::{normalize, NormalizeContext, Normalized, ResolvedDataset};
pub use error::{ChartSpecError, ChartSpecResult};
pub use histogram::{bin, Bin, DEFAULT_BIN_COUNT, MAX_BIN_COUNT};
pub use merge::deep_merge;
pub use palette::generate_palette;
pub use schema::{ChartSpecDocument, DatasetDocument};
pub use spec::{
    ChartEvent, ChartEventKind, ChartSpec, ColorSpec, DatasetSpec, EventHandler, EventPoint,
    InteractionHooks, Radius, Theme,
};
pub use theme::{default_options, ThemeOptions};

/// Charts core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
