//! Dataset color assignment.

use crate::Theme;

/// Built-in categorical colors for the dark theme.
pub const DARK_PALETTE: [&str; 10] = [
    "#4dc9f6", "#f67019", "#f53794", "#537bc4", "#acc236", "#166a8f", "#00a950", "#58595b",
    "#8549ba", "#ffcd56",
];

/// Built-in categorical colors for the light theme.
pub const LIGHT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// The built-in table for a theme.
#[must_use]
pub const fn builtin(theme: Theme) -> &'static [&'static str; 10] {
    match theme {
        Theme::Dark => &DARK_PALETTE,
        Theme::Light => &LIGHT_PALETTE,
    }
}

/// Produce `n` colors.
///
/// A non-empty `explicit` palette is cycled as-is and never extended;
/// otherwise the theme's built-in table is cycled.
#[must_use]
pub fn generate_palette(n: usize, theme: Theme, explicit: &[String]) -> Vec<String> {
    if explicit.is_empty() {
        let table = builtin(theme);
        (0..n).map(|i| table[i % table.len()].to_string()).collect()
    } else {
        (0..n).map(|i| explicit[i % explicit.len()].clone()).collect()
    }
}
