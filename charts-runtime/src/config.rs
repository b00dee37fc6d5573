//! Runtime configuration and the default extension catalog.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default readiness deadline.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default download name for exported images.
pub const DEFAULT_EXPORT_FILENAME: &str = "chart.png";

/// Default location of the rendering library.
pub const DEFAULT_LIBRARY_SOURCE: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Global symbol the rendering library installs.
pub const LIBRARY_GLOBAL: &str = "Chart";

/// How an extension participates in rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    /// Provides chart controllers; loaded when a chart type needs it.
    #[default]
    Controller,
    /// Option plugin; loaded for every chart.
    Plugin,
}

/// A loadable add-on for the rendering library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    /// Catalog name, e.g. `"matrix"`.
    pub name: String,
    /// Script source.
    pub source: String,
    /// Controller names the extension provides.
    #[serde(default)]
    pub controllers: Vec<String>,
    /// Global symbol to register after loading, if the script does not
    /// register itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
    /// Controller or plugin.
    #[serde(default)]
    pub kind: ExtensionKind,
}

impl ExtensionDescriptor {
    /// Describe a controller extension.
    #[must_use]
    pub fn controller<I, S>(name: &str, source: &str, controllers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            controllers: controllers.into_iter().map(Into::into).collect(),
            global: None,
            kind: ExtensionKind::Controller,
        }
    }

    /// Describe a plugin registered through a global symbol.
    #[must_use]
    pub fn plugin(name: &str, source: &str, global: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            controllers: Vec::new(),
            global: Some(global.to_string()),
            kind: ExtensionKind::Plugin,
        }
    }
}

/// The extensions known out of the box.
#[must_use]
pub fn default_catalog() -> Vec<ExtensionDescriptor> {
    vec![
        ExtensionDescriptor::controller(
            "matrix",
            "https://cdn.jsdelivr.net/npm/chartjs-chart-matrix@2",
            ["matrix"],
        ),
        ExtensionDescriptor::controller(
            "treemap",
            "https://cdn.jsdelivr.net/npm/chartjs-chart-treemap@2",
            ["treemap"],
        ),
        ExtensionDescriptor::controller(
            "financial",
            "https://cdn.jsdelivr.net/npm/chartjs-chart-financial@0.2",
            ["candlestick", "ohlc"],
        ),
        ExtensionDescriptor::controller(
            "funnel",
            "https://cdn.jsdelivr.net/npm/chartjs-chart-funnel@4",
            ["funnel"],
        ),
        ExtensionDescriptor::controller(
            "boxplot",
            "https://cdn.jsdelivr.net/npm/@sgratzl/chartjs-chart-boxplot@4",
            ["boxplot"],
        ),
        ExtensionDescriptor::plugin(
            "datalabels",
            "https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2",
            "ChartDataLabels",
        ),
    ]
}

/// Settings shared by every chart created through one runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    /// Script source of the rendering library.
    pub library_source: String,
    /// How long to wait for the library and extensions.
    #[serde(with = "millis")]
    pub ready_timeout: Duration,
    /// Filename used when an export names none.
    pub default_export_filename: String,
    /// Extension catalog.
    pub extensions: Vec<ExtensionDescriptor>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            library_source: DEFAULT_LIBRARY_SOURCE.to_string(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            default_export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
            extensions: default_catalog(),
        }
    }
}

impl RuntimeConfig {
    /// Set the readiness deadline.
    #[must_use]
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Replace the extension catalog.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<ExtensionDescriptor>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Look up a catalog entry.
    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&ExtensionDescriptor> {
        self.extensions.iter().find(|d| d.name == name)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
