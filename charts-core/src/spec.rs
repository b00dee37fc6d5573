//! Declarative chart description - the input to the pipeline.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{ChartSpecError, ChartType};

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light text on a dark background.
    #[default]
    Dark,
    /// Dark text on a light background.
    Light,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// The theme name as it appears in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ChartSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(ChartSpecError::UnknownTheme(s.to_string())),
        }
    }
}

/// A single color or one color per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// One color for the whole dataset.
    Single(String),
    /// A color per data point.
    Many(Vec<String>),
}

impl ColorSpec {
    /// Colors as a list, wrapping a single color.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(color) => vec![color],
            Self::Many(colors) => colors,
        }
    }

    /// The first color, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(color) => Some(color),
            Self::Many(colors) => colors.first().map(String::as_str),
        }
    }

    /// JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Single(color) => Value::String(color.clone()),
            Self::Many(colors) => Value::from(colors.clone()),
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(color: &str) -> Self {
        Self::Single(color.to_string())
    }
}

/// Bubble radius: one value for all points or one per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Radius {
    /// Same radius for every bubble.
    Scalar(f64),
    /// Radius per bubble.
    PerPoint(Vec<f64>),
}

impl Radius {
    /// JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Scalar(r) => Value::from(*r),
            Self::PerPoint(rs) => Value::from(rs.clone()),
        }
    }
}

/// Deserialize a field, treating a malformed value as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!("Ignoring malformed dataset field: {e}");
            Ok(None)
        }
    }
}

/// Deserialize a series label. Numbers are written out; other shapes become empty.
fn lenient_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(label) => label,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => {
            tracing::debug!("Ignoring malformed dataset label: {other}");
            String::new()
        }
    })
}

/// Deserialize series data. A lone number or point is wrapped; anything else
/// that is not an array becomes empty.
fn lenient_data<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        Value::Null => Vec::new(),
        point @ (Value::Number(_) | Value::Object(_)) => vec![point],
        other => {
            tracing::debug!("Ignoring malformed dataset data: {other}");
            Vec::new()
        }
    })
}

/// One data series as supplied by the caller.
///
/// Style fields are only meaningful for some chart types; a field that does
/// not apply to the chart's type is ignored. Any key not recognized here is
/// captured in [`DatasetSpec::extra`] and passed straight to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSpec {
    /// Series label.
    #[serde(default, deserialize_with = "lenient_label")]
    pub label: String,
    /// Numbers or structured points, depending on the chart type.
    #[serde(default, deserialize_with = "lenient_data")]
    pub data: Vec<Value>,
    /// Fill color(s).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorSpec>,
    /// Stroke color(s).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorSpec>,
    /// Stroke width.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Point marker radius (line-like charts).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    /// Fill the area under the line.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    /// Bezier curve tension.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    /// Bubble radius.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub radius: Option<Radius>,
    /// Slice offset on hover (pie-like charts).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hover_offset: Option<f64>,
    /// Histogram bin count.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub bins: Option<usize>,
    /// Explicit histogram bin edges.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub bin_edges: Option<Vec<f64>>,
    /// Box plot padding.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    /// Box plot item radius.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub item_radius: Option<f64>,
    /// Box plot outlier color.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub outlier_color: Option<String>,
    /// Box plot item marker style.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub item_style: Option<String>,
    /// Treemap value key.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Treemap grouping keys.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    /// Treemap cell spacing.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
    /// Treemap label color.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    /// Candlestick rising color.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rising_color: Option<String>,
    /// Candlestick falling color.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub falling_color: Option<String>,
    /// Candlestick unchanged color.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub neutral_color: Option<String>,
    /// Gauge maximum.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Passthrough fields spliced into the renderer dataset last.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatasetSpec {
    /// Create a dataset from a label and numeric values.
    #[must_use]
    pub fn new<I>(label: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self {
            label: label.into(),
            data: values.into_iter().map(Value::from).collect(),
            ..Self::default()
        }
    }

    /// Set the fill color(s).
    #[must_use]
    pub fn with_background_color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Add a passthrough field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The finite numeric values in `data`, skipping anything else.
    #[must_use]
    pub fn numeric_values(&self) -> Vec<f64> {
        self.data
            .iter()
            .filter_map(Value::as_f64)
            .filter(|v| v.is_finite())
            .collect()
    }
}

/// Kind of pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartEventKind {
    /// Pointer click.
    Click,
    /// Pointer movement.
    Hover,
}

/// A data element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPoint {
    /// Index of the dataset.
    pub dataset_index: usize,
    /// Index within the dataset.
    pub index: usize,
}

/// Pointer interaction reported by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEvent {
    /// Interaction kind.
    pub kind: ChartEventKind,
    /// X position in canvas pixels.
    pub x: f64,
    /// Y position in canvas pixels.
    pub y: f64,
    /// Elements under the pointer.
    pub points: Vec<EventPoint>,
}

/// Opaque interaction callback.
pub type EventHandler = Rc<dyn Fn(&ChartEvent)>;

/// Click and hover callbacks attached to the resolved options.
#[derive(Clone, Default)]
pub struct InteractionHooks {
    /// Called on click.
    pub on_click: Option<EventHandler>,
    /// Called on hover.
    pub on_hover: Option<EventHandler>,
}

impl InteractionHooks {
    /// Whether no callback is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on_click.is_none() && self.on_hover.is_none()
    }

    /// Dispatch an event to the matching callback.
    pub fn dispatch(&self, event: &ChartEvent) {
        let handler = match event.kind {
            ChartEventKind::Click => &self.on_click,
            ChartEventKind::Hover => &self.on_hover,
        };
        if let Some(handler) = handler {
            handler(event);
        }
    }
}

impl fmt::Debug for InteractionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionHooks")
            .field("on_click", &self.on_click.is_some())
            .field("on_hover", &self.on_hover.is_some())
            .finish()
    }
}

/// The full declarative chart description.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    /// Requested chart type.
    pub chart_type: ChartType,
    /// Category labels.
    pub labels: Vec<String>,
    /// Data series.
    pub datasets: Vec<DatasetSpec>,
    /// Title text; empty hides the title.
    pub title_text: String,
    /// Color theme.
    pub theme: Theme,
    /// Explicit palette; empty means generate from the theme.
    pub palette: Vec<String>,
    /// Partial option tree merged over the defaults.
    pub options: Value,
    /// Interaction callbacks.
    pub hooks: InteractionHooks,
    /// Accessibility label for the host element.
    pub aria_label: Option<String>,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            labels: Vec::new(),
            datasets: Vec::new(),
            title_text: String::new(),
            theme: Theme::Dark,
            palette: Vec::new(),
            options: Value::Object(Map::new()),
            hooks: InteractionHooks::default(),
            aria_label: None,
        }
    }
}

impl ChartSpec {
    /// Create a spec for the given chart type with default settings.
    #[must_use]
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Self::default()
        }
    }

    /// Set the labels.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Append a dataset.
    #[must_use]
    pub fn with_dataset(mut self, dataset: DatasetSpec) -> Self {
        self.datasets.push(dataset);
        self
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_text = title.into();
        self
    }

    /// Set the theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set an explicit palette.
    #[must_use]
    pub fn with_palette<I, S>(mut self, palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.palette = palette.into_iter().map(Into::into).collect();
        self
    }

    /// Set the option overrides.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// Set the click callback.
    #[must_use]
    pub fn with_on_click(mut self, handler: impl Fn(&ChartEvent) + 'static) -> Self {
        self.hooks.on_click = Some(Rc::new(handler));
        self
    }

    /// Set the hover callback.
    #[must_use]
    pub fn with_on_hover(mut self, handler: impl Fn(&ChartEvent) + 'static) -> Self {
        self.hooks.on_hover = Some(Rc::new(handler));
        self
    }

    /// Set the accessibility label.
    #[must_use]
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn theme_toggles_back_and_forth() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn theme_parse() {
        assert_eq!("LIGHT".parse::<Theme>().ok(), Some(Theme::Light));
        assert!(matches!(
            "sepia".parse::<Theme>(),
            Err(ChartSpecError::UnknownTheme(_))
        ));
    }

    #[test]
    fn dataset_captures_unknown_fields_as_passthrough() {
        let json = r##"{"label":"Sales","data":[1,2],"borderDash":[4,2],"order":3}"##;
        let dataset: DatasetSpec = serde_json::from_str(json).expect("dataset");
        assert_eq!(dataset.label, "Sales");
        assert_eq!(dataset.extra.get("order"), Some(&Value::from(3)));
        assert!(dataset.extra.contains_key("borderDash"));
        assert!(!dataset.extra.contains_key("label"));
    }

    #[test]
    fn dataset_malformed_fields_become_unset() {
        let json = r#"{"data":[1],"pointRadius":"big","fill":"yes","tension":0.2}"#;
        let dataset: DatasetSpec = serde_json::from_str(json).expect("dataset");
        assert_eq!(dataset.point_radius, None);
        assert_eq!(dataset.fill, None);
        assert_eq!(dataset.tension, Some(0.2));
    }

    #[test]
    fn dataset_malformed_label_and_data_are_coerced() {
        let dataset: DatasetSpec =
            serde_json::from_str(r#"{"label":["x"],"data":"oops"}"#).expect("dataset");
        assert_eq!(dataset.label, "");
        assert!(dataset.data.is_empty());

        let dataset: DatasetSpec =
            serde_json::from_str(r#"{"label":2024,"data":7}"#).expect("dataset");
        assert_eq!(dataset.label, "2024");
        assert_eq!(dataset.data, vec![Value::from(7)]);

        let dataset: DatasetSpec =
            serde_json::from_str(r#"{"label":null,"data":null}"#).expect("dataset");
        assert_eq!(dataset.label, "");
        assert!(dataset.data.is_empty());
    }

    #[test]
    fn color_spec_accepts_single_and_many() {
        let single: ColorSpec = serde_json::from_str("\"#fff\"").expect("single");
        assert_eq!(single, ColorSpec::Single("#fff".to_string()));
        let many: ColorSpec = serde_json::from_str(r##"["#fff","#000"]"##).expect("many");
        assert_eq!(many.clone().into_vec().len(), 2);
        assert_eq!(many.first(), Some("#fff"));
    }

    #[test]
    fn numeric_values_skip_non_numbers() {
        let mut dataset = DatasetSpec::new("v", [1.0, 2.0]);
        dataset.data.push(Value::from("x"));
        dataset.data.push(Value::Null);
        assert_eq!(dataset.numeric_values(), vec![1.0, 2.0]);
    }

    #[test]
    fn hooks_dispatch_by_kind() {
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let spec = ChartSpec::default().with_on_click(move |_| counter.set(counter.get() + 1));

        let click = ChartEvent {
            kind: ChartEventKind::Click,
            x: 1.0,
            y: 2.0,
            points: Vec::new(),
        };
        let hover = ChartEvent {
            kind: ChartEventKind::Hover,
            ..click.clone()
        };
        spec.hooks.dispatch(&click);
        spec.hooks.dispatch(&hover);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn default_spec_matches_construction_defaults() {
        let spec = ChartSpec::default();
        assert_eq!(spec.chart_type, ChartType::Line);
        assert_eq!(spec.theme, Theme::Dark);
        assert!(spec.labels.is_empty());
        assert!(spec.palette.is_empty());
        assert_eq!(spec.options, Value::Object(Map::new()));
        assert!(spec.hooks.is_empty());
    }
}
