//! Assembly of the complete renderer configuration.

use serde_json::{json, Value};

use crate::chart_type::{resolve, ControllerLookup, ResolvedType};
use crate::dataset::{histogram_bins, normalize, NormalizeContext, Normalized};
use crate::merge::deep_merge;
use crate::palette::generate_palette;
use crate::theme::{apply_type_overrides, default_options};
use crate::{ChartSpec, ChartType, InteractionHooks};

/// Everything the renderer needs to draw a chart.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Outcome of type resolution.
    pub resolved_type: ResolvedType,
    /// Category labels.
    pub labels: Vec<String>,
    /// Shaped datasets.
    pub datasets: Vec<Normalized>,
    /// Defaults merged with the caller's overrides.
    pub options: Value,
    /// Interaction callbacks, attached by the renderer after the options.
    pub hooks: InteractionHooks,
}

impl ResolvedConfig {
    /// Renderer controller tag.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.resolved_type.tag
    }

    /// Renderer JSON: `{type, data: {labels, datasets}, options}`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let datasets: Vec<Value> = self.datasets.iter().map(Normalized::to_value).collect();
        json!({
            "type": self.tag(),
            "data": {
                "labels": self.labels,
                "datasets": datasets,
            },
            "options": self.options,
        })
    }
}

/// Labels to draw: histogram charts take them from the first dataset's bins.
#[must_use]
pub fn prepare_labels(spec: &ChartSpec) -> Vec<String> {
    if spec.chart_type == ChartType::Histogram {
        return spec
            .datasets
            .first()
            .map(|dataset| {
                histogram_bins(dataset)
                    .into_iter()
                    .map(|b| b.range_label)
                    .collect()
            })
            .unwrap_or_default();
    }
    spec.labels.clone()
}

/// Resolve a spec against the controllers currently registered with the renderer.
#[must_use]
pub fn resolve_config(spec: &ChartSpec, controllers: &dyn ControllerLookup) -> ResolvedConfig {
    let resolved_type = resolve(spec.chart_type, controllers);
    let draw_as = if resolved_type.fell_back {
        ChartType::Bar
    } else {
        spec.chart_type
    };

    let palette = generate_palette(spec.datasets.len(), spec.theme, &spec.palette);
    let datasets = spec
        .datasets
        .iter()
        .zip(palette)
        .map(|(dataset, color)| {
            let slice_colors = if draw_as.is_radial() {
                generate_palette(dataset.data.len(), spec.theme, &spec.palette)
            } else {
                Vec::new()
            };
            let ctx = NormalizeContext {
                color,
                slice_colors,
                theme: spec.theme,
                forced_fill: resolved_type.forced_fill,
            };
            normalize(dataset, &ctx, draw_as)
        })
        .collect();

    let defaults = apply_type_overrides(default_options(spec.theme, &spec.title_text), draw_as);
    let options = deep_merge(defaults, &spec.options);

    tracing::debug!(
        "Resolved {} chart as '{}' with {} dataset(s)",
        spec.chart_type,
        resolved_type.tag,
        spec.datasets.len()
    );

    ResolvedConfig {
        resolved_type,
        labels: prepare_labels(spec),
        datasets,
        options,
        hooks: spec.hooks.clone(),
    }
}
