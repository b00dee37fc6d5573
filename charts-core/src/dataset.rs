//! Per-type dataset normalization.
//!
//! Every chart type category has its own output shape. [`normalize`] fills
//! in the category's defaults for fields the caller left unset, and
//! [`ResolvedDataset::to_value`] is the single mapping from those shapes to
//! the renderer's JSON. Caller passthrough fields are spliced in last and
//! always win.

use serde_json::{json, Map, Value};

use crate::histogram::{self, Bin, DEFAULT_BIN_COUNT};
use crate::{ChartType, ColorSpec, DatasetSpec, Radius, Theme, ThemeOptions};

/// Point radius for line-like charts.
pub const DEFAULT_POINT_RADIUS: f64 = 4.0;
/// Curve tension for line-like charts.
pub const DEFAULT_TENSION: f64 = 0.4;
/// Stroke width for the generic shape.
pub const DEFAULT_BORDER_WIDTH: f64 = 2.0;
/// Stroke width for heatmap cells.
pub const HEATMAP_BORDER_WIDTH: f64 = 1.0;
/// Slice offset on hover.
pub const DEFAULT_HOVER_OFFSET: f64 = 4.0;
/// Bubble radius.
pub const DEFAULT_BUBBLE_RADIUS: f64 = 5.0;
/// Candlestick colors.
pub const RISING_COLOR: &str = "#26a69a";
/// Falling candle color.
pub const FALLING_COLOR: &str = "#ef5350";
/// Unchanged candle color.
pub const NEUTRAL_COLOR: &str = "#999999";
/// Treemap defaults.
pub const TREEMAP_KEY: &str = "value";
/// Treemap cell spacing.
pub const TREEMAP_SPACING: f64 = 2.0;
/// Box plot defaults.
pub const BOXPLOT_PADDING: f64 = 10.0;
/// Box plot item radius.
pub const BOXPLOT_ITEM_RADIUS: f64 = 2.0;
/// Box plot outlier color.
pub const BOXPLOT_OUTLIER_COLOR: &str = "#777777";
/// Box plot item style.
pub const BOXPLOT_ITEM_STYLE: &str = "circle";
/// Gauge scale maximum.
pub const GAUGE_MAX: f64 = 100.0;
/// Gauge track color.
pub const GAUGE_TRACK_COLOR: &str = "#e0e0e0";

/// What a dataset needs to know about its chart to be normalized.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    /// Palette color assigned to this dataset by position.
    pub color: String,
    /// Per-slice colors for pie-like charts, sized to the data.
    pub slice_colors: Vec<String>,
    /// Active theme.
    pub theme: Theme,
    /// Fill forced by the chart type (area charts).
    pub forced_fill: bool,
}

impl NormalizeContext {
    /// Context with a single assigned color and no forced fill.
    #[must_use]
    pub fn new(color: impl Into<String>, theme: Theme) -> Self {
        Self {
            color: color.into(),
            slice_colors: Vec::new(),
            theme,
            forced_fill: false,
        }
    }
}

/// Label, data, colors and stroke - the shape shared by bar-like types.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericDataset {
    /// Series label.
    pub label: String,
    /// Data values.
    pub data: Vec<Value>,
    /// Fill color(s).
    pub background_color: ColorSpec,
    /// Stroke color(s).
    pub border_color: ColorSpec,
    /// Stroke width.
    pub border_width: f64,
}

/// Line, scatter, radar and area series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDataset {
    /// Colors, data and stroke.
    pub base: GenericDataset,
    /// Point marker radius.
    pub point_radius: f64,
    /// Fill under the line.
    pub fill: bool,
    /// Curve tension.
    pub tension: f64,
}

/// Pie, doughnut and polar area slices.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceDataset {
    /// Series label.
    pub label: String,
    /// Slice values.
    pub data: Vec<Value>,
    /// One color per slice.
    pub background_color: Vec<String>,
    /// Slice outline, when set.
    pub border_color: Option<ColorSpec>,
    /// Outline width, when set.
    pub border_width: Option<f64>,
    /// Offset on hover.
    pub hover_offset: f64,
}

/// Bubble series.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleDataset {
    /// Colors, data and stroke.
    pub base: GenericDataset,
    /// Bubble radius.
    pub radius: Radius,
}

/// Candlestick series.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialDataset {
    /// Series label.
    pub label: String,
    /// OHLC points.
    pub data: Vec<Value>,
    /// Color of rising candles.
    pub rising: String,
    /// Color of falling candles.
    pub falling: String,
    /// Color of unchanged candles.
    pub neutral: String,
}

/// Treemap tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapDataset {
    /// Series label.
    pub label: String,
    /// Tree source rows.
    pub tree: Vec<Value>,
    /// Row key holding the cell size.
    pub key: String,
    /// Row keys to group by.
    pub groups: Vec<String>,
    /// Cell fill.
    pub background_color: ColorSpec,
    /// Gap between cells.
    pub spacing: f64,
    /// Cell label color.
    pub font_color: String,
}

/// Box plot series.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotDataset {
    /// Series label.
    pub label: String,
    /// Raw samples per category.
    pub data: Vec<Value>,
    /// Box padding.
    pub padding: f64,
    /// Sample marker radius.
    pub item_radius: f64,
    /// Outlier marker color.
    pub outlier_color: String,
    /// Sample marker style.
    pub item_style: String,
}

/// Half-doughnut gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeDataset {
    /// Series label.
    pub label: String,
    /// Current value.
    pub value: f64,
    /// Distance from the value to the maximum, never negative.
    pub remainder: f64,
    /// Value arc color.
    pub color: String,
}

/// Histogram computed from raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramDataset {
    /// Colors and stroke; `data` is unused and replaced by the bin counts.
    pub base: GenericDataset,
    /// The computed bins.
    pub bins: Vec<Bin>,
}

/// A dataset in the shape its chart type requires.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDataset {
    /// Line, scatter, radar, area.
    Series(SeriesDataset),
    /// Pie, doughnut, polar area.
    Slices(SliceDataset),
    /// Bubble.
    Bubble(BubbleDataset),
    /// Candlestick.
    Financial(FinancialDataset),
    /// Heatmap cells.
    Matrix(GenericDataset),
    /// Treemap.
    Treemap(TreemapDataset),
    /// Box plot.
    BoxPlot(BoxPlotDataset),
    /// Gauge.
    Gauge(GaugeDataset),
    /// Histogram.
    Histogram(HistogramDataset),
    /// Bar, funnel and anything else.
    Generic(GenericDataset),
}

/// A shaped dataset together with its passthrough fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The shaped dataset.
    pub dataset: ResolvedDataset,
    /// Passthrough fields, spliced in last.
    pub extra: Map<String, Value>,
}

impl Normalized {
    /// Renderer JSON for this dataset, passthrough fields applied last.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut value = self.dataset.to_value();
        if let Some(obj) = value.as_object_mut() {
            for (key, extra) in &self.extra {
                obj.insert(key.clone(), extra.clone());
            }
        }
        value
    }
}

fn generic_value(base: &GenericDataset) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("label".to_string(), Value::from(base.label.clone()));
    map.insert("data".to_string(), Value::from(base.data.clone()));
    map.insert("backgroundColor".to_string(), base.background_color.to_value());
    map.insert("borderColor".to_string(), base.border_color.to_value());
    map.insert("borderWidth".to_string(), Value::from(base.border_width));
    map
}

impl ResolvedDataset {
    /// Renderer JSON for this shape, without passthrough fields.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Series(series) => {
                let mut map = generic_value(&series.base);
                map.insert("pointRadius".to_string(), Value::from(series.point_radius));
                map.insert("fill".to_string(), Value::from(series.fill));
                map.insert("tension".to_string(), Value::from(series.tension));
                Value::Object(map)
            }
            Self::Slices(slices) => {
                let mut map = Map::new();
                map.insert("label".to_string(), Value::from(slices.label.clone()));
                map.insert("data".to_string(), Value::from(slices.data.clone()));
                map.insert(
                    "backgroundColor".to_string(),
                    Value::from(slices.background_color.clone()),
                );
                if let Some(border) = &slices.border_color {
                    map.insert("borderColor".to_string(), border.to_value());
                }
                if let Some(width) = slices.border_width {
                    map.insert("borderWidth".to_string(), Value::from(width));
                }
                map.insert("hoverOffset".to_string(), Value::from(slices.hover_offset));
                Value::Object(map)
            }
            Self::Bubble(bubble) => {
                let mut map = generic_value(&bubble.base);
                map.insert("radius".to_string(), bubble.radius.to_value());
                Value::Object(map)
            }
            Self::Financial(financial) => json!({
                "label": financial.label,
                "data": financial.data,
                "rising": { "color": financial.rising },
                "falling": { "color": financial.falling },
                "neutral": { "color": financial.neutral },
            }),
            Self::Matrix(base) | Self::Generic(base) => Value::Object(generic_value(base)),
            Self::Treemap(treemap) => json!({
                "label": treemap.label,
                "tree": treemap.tree,
                "key": treemap.key,
                "groups": treemap.groups,
                "backgroundColor": treemap.background_color.to_value(),
                "spacing": treemap.spacing,
                "labels": { "display": true, "color": treemap.font_color },
            }),
            Self::BoxPlot(boxplot) => json!({
                "label": boxplot.label,
                "data": boxplot.data,
                "padding": boxplot.padding,
                "itemRadius": boxplot.item_radius,
                "outlierColor": boxplot.outlier_color,
                "itemStyle": boxplot.item_style,
            }),
            Self::Gauge(gauge) => json!({
                "label": gauge.label,
                "data": [gauge.value, gauge.remainder],
                "backgroundColor": [gauge.color, GAUGE_TRACK_COLOR],
                "borderWidth": 0,
                "circumference": 180,
                "rotation": -90,
                "cutout": "80%",
            }),
            Self::Histogram(histogram) => {
                let mut map = generic_value(&histogram.base);
                let counts: Vec<Value> =
                    histogram.bins.iter().map(|b| Value::from(b.count)).collect();
                map.insert("data".to_string(), Value::from(counts));
                map.insert("barPercentage".to_string(), Value::from(1.0));
                map.insert("categoryPercentage".to_string(), Value::from(1.0));
                Value::Object(map)
            }
        }
    }
}

/// Bin a histogram dataset's values with its own bin settings.
#[must_use]
pub fn histogram_bins(spec: &DatasetSpec) -> Vec<Bin> {
    histogram::bin(
        &spec.numeric_values(),
        spec.bin_edges.as_deref(),
        spec.bins.unwrap_or(DEFAULT_BIN_COUNT),
    )
}

fn generic(spec: &DatasetSpec, ctx: &NormalizeContext, border_width: f64) -> GenericDataset {
    GenericDataset {
        label: spec.label.clone(),
        data: spec.data.clone(),
        background_color: spec
            .background_color
            .clone()
            .unwrap_or_else(|| ColorSpec::Single(ctx.color.clone())),
        border_color: spec
            .border_color
            .clone()
            .unwrap_or_else(|| ColorSpec::Single(ctx.color.clone())),
        border_width: spec.border_width.unwrap_or(border_width),
    }
}

/// Shape a dataset for `chart_type`, filling unset fields with the type's defaults.
///
/// `chart_type` is the type the dataset will be drawn as; when an extension
/// was unavailable and the chart fell back to a bar rendering the caller
/// passes [`ChartType::Bar`].
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn normalize(spec: &DatasetSpec, ctx: &NormalizeContext, chart_type: ChartType) -> Normalized {
    let dataset = match chart_type {
        ChartType::Line | ChartType::Scatter | ChartType::Radar | ChartType::Area => {
            let fill =
                ctx.forced_fill || chart_type == ChartType::Area || spec.fill.unwrap_or(false);
            ResolvedDataset::Series(SeriesDataset {
                base: generic(spec, ctx, DEFAULT_BORDER_WIDTH),
                point_radius: spec.point_radius.unwrap_or(DEFAULT_POINT_RADIUS),
                fill,
                tension: spec.tension.unwrap_or(DEFAULT_TENSION),
            })
        }
        ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => {
            let background_color = match &spec.background_color {
                Some(colors) => colors.clone().into_vec(),
                None if ctx.slice_colors.is_empty() => vec![ctx.color.clone()],
                None => ctx.slice_colors.clone(),
            };
            ResolvedDataset::Slices(SliceDataset {
                label: spec.label.clone(),
                data: spec.data.clone(),
                background_color,
                border_color: spec.border_color.clone(),
                border_width: spec.border_width,
                hover_offset: spec.hover_offset.unwrap_or(DEFAULT_HOVER_OFFSET),
            })
        }
        ChartType::Bubble => ResolvedDataset::Bubble(BubbleDataset {
            base: generic(spec, ctx, DEFAULT_BORDER_WIDTH),
            radius: spec
                .radius
                .clone()
                .unwrap_or(Radius::Scalar(DEFAULT_BUBBLE_RADIUS)),
        }),
        ChartType::Candlestick => ResolvedDataset::Financial(FinancialDataset {
            label: spec.label.clone(),
            data: spec.data.clone(),
            rising: spec.rising_color.clone().unwrap_or_else(|| RISING_COLOR.to_string()),
            falling: spec
                .falling_color
                .clone()
                .unwrap_or_else(|| FALLING_COLOR.to_string()),
            neutral: spec
                .neutral_color
                .clone()
                .unwrap_or_else(|| NEUTRAL_COLOR.to_string()),
        }),
        ChartType::Heatmap => ResolvedDataset::Matrix(generic(spec, ctx, HEATMAP_BORDER_WIDTH)),
        ChartType::Treemap => ResolvedDataset::Treemap(TreemapDataset {
            label: spec.label.clone(),
            tree: spec.data.clone(),
            key: spec.key.clone().unwrap_or_else(|| TREEMAP_KEY.to_string()),
            groups: spec.groups.clone().unwrap_or_default(),
            background_color: spec
                .background_color
                .clone()
                .unwrap_or_else(|| ColorSpec::Single(ctx.color.clone())),
            spacing: spec.spacing.unwrap_or(TREEMAP_SPACING),
            font_color: spec.font_color.clone().unwrap_or_else(|| {
                ThemeOptions::for_theme(ctx.theme).text.to_string()
            }),
        }),
        ChartType::Boxplot => ResolvedDataset::BoxPlot(BoxPlotDataset {
            label: spec.label.clone(),
            data: spec.data.clone(),
            padding: spec.padding.unwrap_or(BOXPLOT_PADDING),
            item_radius: spec.item_radius.unwrap_or(BOXPLOT_ITEM_RADIUS),
            outlier_color: spec
                .outlier_color
                .clone()
                .unwrap_or_else(|| BOXPLOT_OUTLIER_COLOR.to_string()),
            item_style: spec
                .item_style
                .clone()
                .unwrap_or_else(|| BOXPLOT_ITEM_STYLE.to_string()),
        }),
        ChartType::Gauge => {
            let value = spec
                .data
                .first()
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
                .unwrap_or(0.0);
            let max = spec.max.filter(|m| m.is_finite()).unwrap_or(GAUGE_MAX);
            let color = spec
                .background_color
                .as_ref()
                .and_then(ColorSpec::first)
                .map_or_else(|| ctx.color.clone(), str::to_string);
            ResolvedDataset::Gauge(GaugeDataset {
                label: spec.label.clone(),
                value,
                remainder: (max - value).max(0.0),
                color,
            })
        }
        ChartType::Histogram => ResolvedDataset::Histogram(HistogramDataset {
            base: generic(spec, ctx, DEFAULT_BORDER_WIDTH),
            bins: histogram_bins(spec),
        }),
        ChartType::Bar | ChartType::Funnel => {
            ResolvedDataset::Generic(generic(spec, ctx, DEFAULT_BORDER_WIDTH))
        }
    };

    Normalized {
        dataset,
        extra: spec.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> NormalizeContext {
        NormalizeContext::new("#123456", Theme::Dark)
    }

    #[test]
    fn line_defaults() {
        let out = normalize(&DatasetSpec::new("a", [1.0, 2.0]), &ctx(), ChartType::Line).to_value();
        assert_eq!(out["pointRadius"], json!(4.0));
        assert_eq!(out["fill"], json!(false));
        assert_eq!(out["tension"], json!(0.4));
        assert_eq!(out["backgroundColor"], json!("#123456"));
        assert_eq!(out["borderColor"], json!("#123456"));
        assert_eq!(out["borderWidth"], json!(2.0));
    }

    #[test]
    fn explicit_fields_are_not_overwritten() {
        let mut spec = DatasetSpec::new("a", [1.0]);
        spec.point_radius = Some(0.0);
        spec.tension = Some(0.0);
        spec.border_width = Some(5.0);
        spec.background_color = Some(ColorSpec::from("red"));
        let out = normalize(&spec, &ctx(), ChartType::Scatter).to_value();
        assert_eq!(out["pointRadius"], json!(0.0));
        assert_eq!(out["tension"], json!(0.0));
        assert_eq!(out["borderWidth"], json!(5.0));
        assert_eq!(out["backgroundColor"], json!("red"));
        assert_eq!(out["borderColor"], json!("#123456"));
    }

    #[test]
    fn area_forces_fill_over_explicit_false() {
        let mut spec = DatasetSpec::new("a", [1.0]);
        spec.fill = Some(false);
        let out = normalize(&spec, &ctx(), ChartType::Area).to_value();
        assert_eq!(out["fill"], json!(true));
        assert_eq!(out["pointRadius"], json!(4.0));
    }

    #[test]
    fn pie_wraps_scalar_color_and_sets_hover_offset() {
        let spec = DatasetSpec::new("a", [1.0, 2.0]).with_background_color("#ff0000");
        let out = normalize(&spec, &ctx(), ChartType::Pie).to_value();
        assert_eq!(out["backgroundColor"], json!(["#ff0000"]));
        assert_eq!(out["hoverOffset"], json!(4.0));
        assert!(out.get("borderWidth").is_none());
    }

    #[test]
    fn pie_uses_slice_palette_when_unset() {
        let mut context = ctx();
        context.slice_colors = vec!["#a".to_string(), "#b".to_string()];
        let out = normalize(&DatasetSpec::new("a", [1.0, 2.0]), &context, ChartType::Doughnut)
            .to_value();
        assert_eq!(out["backgroundColor"], json!(["#a", "#b"]));
    }

    #[test]
    fn bubble_radius_scalar_or_per_point() {
        let out = normalize(&DatasetSpec::new("a", []), &ctx(), ChartType::Bubble).to_value();
        assert_eq!(out["radius"], json!(5.0));

        let mut spec = DatasetSpec::new("a", []);
        spec.radius = Some(Radius::PerPoint(vec![1.0, 9.0]));
        let out = normalize(&spec, &ctx(), ChartType::Bubble).to_value();
        assert_eq!(out["radius"], json!([1.0, 9.0]));
    }

    #[test]
    fn candlestick_has_its_own_shape() {
        let out =
            normalize(&DatasetSpec::new("ohlc", []), &ctx(), ChartType::Candlestick).to_value();
        assert_eq!(out["rising"]["color"], json!(RISING_COLOR));
        assert_eq!(out["falling"]["color"], json!(FALLING_COLOR));
        assert_eq!(out["neutral"]["color"], json!(NEUTRAL_COLOR));
        assert!(out.get("backgroundColor").is_none());
        assert!(out.get("borderWidth").is_none());
    }

    #[test]
    fn heatmap_uses_thin_border() {
        let out = normalize(&DatasetSpec::new("h", []), &ctx(), ChartType::Heatmap).to_value();
        assert_eq!(out["borderWidth"], json!(1.0));
        assert_eq!(out["backgroundColor"], json!("#123456"));
    }

    #[test]
    fn treemap_defaults_follow_theme() {
        let out = normalize(&DatasetSpec::new("t", []), &ctx(), ChartType::Treemap).to_value();
        assert_eq!(out["key"], json!("value"));
        assert_eq!(out["groups"], json!([]));
        assert_eq!(out["spacing"], json!(2.0));
        assert_eq!(
            out["labels"]["color"],
            json!(ThemeOptions::for_theme(Theme::Dark).text)
        );

        let light = NormalizeContext::new("#123456", Theme::Light);
        let out = normalize(&DatasetSpec::new("t", []), &light, ChartType::Treemap).to_value();
        assert_eq!(
            out["labels"]["color"],
            json!(ThemeOptions::for_theme(Theme::Light).text)
        );
    }

    #[test]
    fn boxplot_defaults() {
        let out = normalize(&DatasetSpec::new("b", []), &ctx(), ChartType::Boxplot).to_value();
        assert_eq!(out["padding"], json!(10.0));
        assert_eq!(out["itemRadius"], json!(2.0));
        assert_eq!(out["outlierColor"], json!("#777777"));
        assert_eq!(out["itemStyle"], json!("circle"));
        assert!(out.get("pointRadius").is_none());
    }

    #[test]
    fn gauge_splits_value_and_remainder() {
        let out = normalize(&DatasetSpec::new("g", [65.0]), &ctx(), ChartType::Gauge).to_value();
        assert_eq!(out["data"], json!([65.0, 35.0]));
        assert_eq!(out["backgroundColor"], json!(["#123456", GAUGE_TRACK_COLOR]));
        assert_eq!(out["borderWidth"], json!(0));
        assert_eq!(out["circumference"], json!(180));
        assert_eq!(out["rotation"], json!(-90));
        assert_eq!(out["cutout"], json!("80%"));
    }

    #[test]
    fn gauge_custom_max_and_malformed_value() {
        let mut spec = DatasetSpec::new("g", [30.0]);
        spec.max = Some(50.0);
        let out = normalize(&spec, &ctx(), ChartType::Gauge).to_value();
        assert_eq!(out["data"], json!([30.0, 20.0]));

        let mut spec = DatasetSpec::default();
        spec.data = vec![json!("n/a")];
        let out = normalize(&spec, &ctx(), ChartType::Gauge).to_value();
        assert_eq!(out["data"], json!([0.0, 100.0]));

        let over = normalize(&DatasetSpec::new("g", [150.0]), &ctx(), ChartType::Gauge).to_value();
        assert_eq!(over["data"], json!([150.0, 0.0]));
    }

    #[test]
    fn histogram_emits_counts() {
        let mut spec = DatasetSpec::new("h", [1.0, 6.0, 10.0]);
        spec.bin_edges = Some(vec![0.0, 5.0, 10.0]);
        let out = normalize(&spec, &ctx(), ChartType::Histogram).to_value();
        assert_eq!(out["data"], json!([1, 2]));
        assert_eq!(out["barPercentage"], json!(1.0));
    }

    #[test]
    fn bar_generic_shape_has_no_line_fields() {
        let out = normalize(&DatasetSpec::new("b", [1.0]), &ctx(), ChartType::Bar).to_value();
        assert!(out.get("pointRadius").is_none());
        assert!(out.get("tension").is_none());
        assert_eq!(out["borderWidth"], json!(2.0));
    }

    #[test]
    fn passthrough_wins_over_computed_fields() {
        let spec = DatasetSpec::new("g", [10.0])
            .with_extra("borderWidth", json!(7))
            .with_extra("order", json!(1));
        let out = normalize(&spec, &ctx(), ChartType::Gauge).to_value();
        assert_eq!(out["borderWidth"], json!(7));
        assert_eq!(out["order"], json!(1));
    }
}
