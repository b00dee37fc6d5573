//! Chart type tags and resolution to the renderer's controller types.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChartSpecError;

/// Chart types a spec may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    /// Line chart.
    Line,
    /// Vertical bar chart.
    Bar,
    /// Pie chart.
    Pie,
    /// Doughnut chart.
    Doughnut,
    /// Polar area chart.
    PolarArea,
    /// Radar chart.
    Radar,
    /// Scatter plot.
    Scatter,
    /// Bubble chart.
    Bubble,
    /// Area chart (filled line).
    Area,
    /// Heatmap (matrix extension).
    Heatmap,
    /// Treemap (treemap extension).
    Treemap,
    /// Candlestick / OHLC (financial extension).
    #[serde(alias = "ohlc")]
    Candlestick,
    /// Half-doughnut gauge.
    Gauge,
    /// Funnel (funnel extension).
    Funnel,
    /// Box plot (boxplot extension).
    Boxplot,
    /// Histogram computed from raw values.
    Histogram,
}

impl ChartType {
    /// Every supported tag, in declaration order.
    pub const ALL: [ChartType; 16] = [
        Self::Line,
        Self::Bar,
        Self::Pie,
        Self::Doughnut,
        Self::PolarArea,
        Self::Radar,
        Self::Scatter,
        Self::Bubble,
        Self::Area,
        Self::Heatmap,
        Self::Treemap,
        Self::Candlestick,
        Self::Gauge,
        Self::Funnel,
        Self::Boxplot,
        Self::Histogram,
    ];

    /// The tag as it appears in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Doughnut => "doughnut",
            Self::PolarArea => "polarArea",
            Self::Radar => "radar",
            Self::Scatter => "scatter",
            Self::Bubble => "bubble",
            Self::Area => "area",
            Self::Heatmap => "heatmap",
            Self::Treemap => "treemap",
            Self::Candlestick => "candlestick",
            Self::Gauge => "gauge",
            Self::Funnel => "funnel",
            Self::Boxplot => "boxplot",
            Self::Histogram => "histogram",
        }
    }

    /// Name of the extension module this type needs, if any.
    #[must_use]
    pub const fn required_extension(self) -> Option<&'static str> {
        match self {
            Self::Heatmap => Some("matrix"),
            Self::Treemap => Some("treemap"),
            Self::Candlestick => Some("financial"),
            Self::Funnel => Some("funnel"),
            Self::Boxplot => Some("boxplot"),
            _ => None,
        }
    }

    /// Controller the extension registers for this type, if any.
    #[must_use]
    pub const fn extension_controller(self) -> Option<&'static str> {
        match self {
            Self::Heatmap => Some("matrix"),
            Self::Treemap => Some("treemap"),
            Self::Candlestick => Some("candlestick"),
            Self::Funnel => Some("funnel"),
            Self::Boxplot => Some("boxplot"),
            _ => None,
        }
    }

    /// Whether datasets of this type are drawn as slices of a whole.
    #[must_use]
    pub const fn is_radial(self) -> bool {
        matches!(self, Self::Pie | Self::Doughnut | Self::PolarArea)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ChartSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            "doughnut" => Ok(Self::Doughnut),
            "polararea" => Ok(Self::PolarArea),
            "radar" => Ok(Self::Radar),
            "scatter" => Ok(Self::Scatter),
            "bubble" => Ok(Self::Bubble),
            "area" => Ok(Self::Area),
            "heatmap" => Ok(Self::Heatmap),
            "treemap" => Ok(Self::Treemap),
            "candlestick" | "ohlc" => Ok(Self::Candlestick),
            "gauge" => Ok(Self::Gauge),
            "funnel" => Ok(Self::Funnel),
            "boxplot" => Ok(Self::Boxplot),
            "histogram" => Ok(Self::Histogram),
            _ => Err(ChartSpecError::UnknownChartType(s.to_string())),
        }
    }
}

/// Query for controllers registered with the renderer.
///
/// Extension availability is only known once their scripts have loaded, so
/// resolution asks this at render time rather than relying on a fixed table.
pub trait ControllerLookup {
    /// Whether a controller (or plugin) with this name is registered.
    fn has_controller(&self, name: &str) -> bool;
}

/// A fixed set of registered controller names.
#[derive(Debug, Clone, Default)]
pub struct StaticControllers(HashSet<String>);

impl StaticControllers {
    /// No extension controllers registered.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from controller names.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Every extension controller registered.
    #[must_use]
    pub fn all_extensions() -> Self {
        Self::from_names(ChartType::ALL.iter().filter_map(|t| t.extension_controller()))
    }
}

impl ControllerLookup for StaticControllers {
    fn has_controller(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Outcome of resolving a requested chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    /// The requested type.
    pub requested: ChartType,
    /// Renderer controller tag to draw with.
    pub tag: &'static str,
    /// Datasets must be drawn filled regardless of their own setting.
    pub forced_fill: bool,
    /// The extension controller was missing and a base type was used instead.
    pub fell_back: bool,
}

/// Base type used when an extension controller is unavailable.
pub const FALLBACK_TAG: &str = "bar";

/// Resolve a requested chart type against the currently registered controllers.
#[must_use]
pub fn resolve(requested: ChartType, controllers: &dyn ControllerLookup) -> ResolvedType {
    let base = |tag| ResolvedType {
        requested,
        tag,
        forced_fill: false,
        fell_back: false,
    };

    match requested {
        ChartType::Area => ResolvedType {
            forced_fill: true,
            ..base("line")
        },
        ChartType::Gauge => base("doughnut"),
        ChartType::Histogram => base("bar"),
        ChartType::Heatmap
        | ChartType::Treemap
        | ChartType::Candlestick
        | ChartType::Funnel
        | ChartType::Boxplot => {
            let controller = requested.extension_controller().unwrap_or(FALLBACK_TAG);
            if controllers.has_controller(controller) {
                base(controller)
            } else {
                tracing::debug!(
                    "Controller '{controller}' not registered, {requested} falls back to {FALLBACK_TAG}"
                );
                ResolvedType {
                    fell_back: true,
                    ..base(FALLBACK_TAG)
                }
            }
        }
        ChartType::Line
        | ChartType::Bar
        | ChartType::Pie
        | ChartType::Doughnut
        | ChartType::PolarArea
        | ChartType::Radar
        | ChartType::Scatter
        | ChartType::Bubble => base(requested.as_str()),
    }
}
