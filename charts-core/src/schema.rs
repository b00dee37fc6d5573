//! Serialized representation of a chart spec shared by the CLI and web client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ChartSpec, ChartSpecResult, ChartType, DatasetSpec, Theme};

/// Dataset as it appears in documents.
pub type DatasetDocument = DatasetSpec;

/// Document-friendly chart description.
///
/// Every field is optional; missing fields take the construction defaults.
/// Callbacks cannot be serialized and are attached after conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpecDocument {
    /// Chart type tag.
    #[serde(rename = "type", default = "ChartSpecDocument::default_type")]
    pub chart_type: ChartType,
    /// Category labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Data series.
    #[serde(default)]
    pub datasets: Vec<DatasetDocument>,
    /// Title text.
    #[serde(default)]
    pub title_text: String,
    /// Color theme.
    #[serde(default)]
    pub theme: Theme,
    /// Explicit palette.
    #[serde(default)]
    pub palette: Vec<String>,
    /// Option overrides.
    #[serde(default = "ChartSpecDocument::default_options")]
    pub options: Value,
    /// Accessibility label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
}

impl ChartSpecDocument {
    const fn default_type() -> ChartType {
        ChartType::Line
    }

    fn default_options() -> Value {
        Value::Object(Map::new())
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown chart
    /// type or theme.
    pub fn from_json(json: &str) -> ChartSpecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert to a runtime spec without callbacks.
    #[must_use]
    pub fn into_spec(self) -> ChartSpec {
        let options = if self.options.is_object() {
            self.options
        } else {
            tracing::debug!("Ignoring non-object options override");
            Self::default_options()
        };
        ChartSpec {
            chart_type: self.chart_type,
            labels: self.labels,
            datasets: self.datasets,
            title_text: self.title_text,
            theme: self.theme,
            palette: self.palette,
            options,
            hooks: crate::InteractionHooks::default(),
            aria_label: self.aria_label,
        }
    }
}

impl From<&ChartSpec> for ChartSpecDocument {
    fn from(spec: &ChartSpec) -> Self {
        Self {
            chart_type: spec.chart_type,
            labels: spec.labels.clone(),
            datasets: spec.datasets.clone(),
            title_text: spec.title_text.clone(),
            theme: spec.theme,
            palette: spec.palette.clone(),
            options: spec.options.clone(),
            aria_label: spec.aria_label.clone(),
        }
    }
}
