//! Theme colors and the default option tree.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{ChartType, Theme};

/// Animation length applied to every chart, in milliseconds.
pub const ANIMATION_DURATION_MS: u64 = 700;

/// Padding around the plot area, in pixels.
pub const LAYOUT_PADDING: u32 = 12;

/// Colors derived from a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOptions {
    /// Grid line color.
    pub grid: &'static str,
    /// Tick label color.
    pub tick: &'static str,
    /// Canvas and tooltip background.
    pub background: &'static str,
    /// Title and legend text.
    pub text: &'static str,
    /// Axis title color.
    pub axis_label: &'static str,
}

impl ThemeOptions {
    /// Colors for a theme.
    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                grid: "rgba(255, 255, 255, 0.1)",
                tick: "#b0b3b8",
                background: "#1e1e2e",
                text: "#e4e6eb",
                axis_label: "#c8ccd2",
            },
            Theme::Light => Self {
                grid: "rgba(0, 0, 0, 0.08)",
                tick: "#4a4f57",
                background: "#ffffff",
                text: "#1c1e21",
                axis_label: "#3a3f47",
            },
        }
    }
}

fn axis(colors: ThemeOptions) -> Value {
    json!({
        "grid": { "color": colors.grid },
        "ticks": { "color": colors.tick },
        "title": { "color": colors.axis_label },
    })
}

/// The default option tree for a theme and title.
///
/// The tree is built from the theme and title only; the chart type adjusts
/// it afterwards through [`apply_type_overrides`].
#[must_use]
pub fn default_options(theme: Theme, title: &str) -> Value {
    let colors = ThemeOptions::for_theme(theme);
    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "animation": { "duration": ANIMATION_DURATION_MS },
        "layout": { "padding": LAYOUT_PADDING },
        "plugins": {
            "title": {
                "display": !title.is_empty(),
                "text": title,
                "color": colors.text,
                "font": { "size": 16, "weight": "bold" },
            },
            "legend": {
                "display": true,
                "labels": { "color": colors.text },
            },
            "tooltip": {
                "enabled": true,
                "backgroundColor": colors.background,
                "titleColor": colors.text,
                "bodyColor": colors.text,
                "borderColor": colors.grid,
                "borderWidth": 1,
            },
            "datalabels": {
                "display": false,
                "color": colors.text,
            },
        },
        "scales": {
            "x": axis(colors),
            "y": axis(colors),
        },
    })
}

/// Adjust the default tree for types whose axes or plugins make no sense.
///
/// Runs before user overrides are merged, so callers may still re-enable
/// anything switched off here.
#[must_use]
pub fn apply_type_overrides(mut defaults: Value, chart_type: ChartType) -> Value {
    let Some(root) = defaults.as_object_mut() else {
        return defaults;
    };

    if chart_type == ChartType::Gauge {
        root.insert(
            "scales".to_string(),
            json!({
                "x": { "display": false },
                "y": { "display": false },
            }),
        );
        root.insert("cutout".to_string(), json!("80%"));
        root.insert("circumference".to_string(), json!(180));
        root.insert("rotation".to_string(), json!(-90));
        if let Some(plugins) = root.get_mut("plugins").and_then(Value::as_object_mut) {
            set_flag(plugins, "tooltip", "enabled", false);
            set_flag(plugins, "legend", "display", false);
        }
    } else if chart_type.is_radial() {
        root.insert("scales".to_string(), Value::Object(Map::new()));
    }

    defaults
}

fn set_flag(plugins: &mut Map<String, Value>, plugin: &str, flag: &str, value: bool) {
    let entry = plugins
        .entry(plugin.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(obj) = entry.as_object_mut() {
        obj.insert(flag.to_string(), Value::Bool(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_colors_are_fully_determined_by_theme() {
        assert_eq!(
            ThemeOptions::for_theme(Theme::Dark),
            ThemeOptions::for_theme(Theme::Dark)
        );
        assert_ne!(
            ThemeOptions::for_theme(Theme::Dark).text,
            ThemeOptions::for_theme(Theme::Light).text
        );
    }

    #[test]
    fn defaults_carry_fixed_animation_duration() {
        let options = default_options(Theme::Light, "");
        assert_eq!(options["animation"]["duration"], json!(700));
    }

    #[test]
    fn title_displayed_only_when_present() {
        assert_eq!(default_options(Theme::Dark, "")["plugins"]["title"]["display"], json!(false));
        let titled = default_options(Theme::Dark, "Revenue");
        assert_eq!(titled["plugins"]["title"]["display"], json!(true));
        assert_eq!(titled["plugins"]["title"]["text"], json!("Revenue"));
    }

    #[test]
    fn axis_colors_follow_theme() {
        let light = default_options(Theme::Light, "");
        let colors = ThemeOptions::for_theme(Theme::Light);
        assert_eq!(light["scales"]["x"]["grid"]["color"], json!(colors.grid));
        assert_eq!(light["scales"]["y"]["ticks"]["color"], json!(colors.tick));
    }

    #[test]
    fn gauge_hides_axes_tooltip_and_legend() {
        let gauge = apply_type_overrides(default_options(Theme::Dark, "t"), ChartType::Gauge);
        assert_eq!(gauge["scales"]["x"]["display"], json!(false));
        assert_eq!(gauge["scales"]["y"]["display"], json!(false));
        assert_eq!(gauge["plugins"]["tooltip"]["enabled"], json!(false));
        assert_eq!(gauge["plugins"]["legend"]["display"], json!(false));
        assert_eq!(gauge["cutout"], json!("80%"));
        assert_eq!(gauge["circumference"], json!(180));
        assert_eq!(gauge["rotation"], json!(-90));
    }

    #[test]
    fn radial_types_get_empty_scales() {
        for chart_type in [ChartType::Pie, ChartType::Doughnut, ChartType::PolarArea] {
            let options = apply_type_overrides(default_options(Theme::Dark, ""), chart_type);
            assert_eq!(options["scales"], json!({}));
        }
    }

    #[test]
    fn other_types_keep_axes() {
        let options = apply_type_overrides(default_options(Theme::Dark, ""), ChartType::Bar);
        assert!(options["scales"]["x"].is_object());
    }
}
