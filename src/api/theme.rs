use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{DEFAULT_TICK_COUNT, Margin, ParsedChartData};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Text-measurement heuristics and spacing constants of the layout solver.
///
/// Label widths are estimated from character counts, so these values are
/// tuning knobs rather than font metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutTuning {
    pub base_margin: Margin,
    pub title_gap_px: f64,
    /// Left allowance for value-axis tick labels.
    pub y_label_allowance_px: f64,
    /// Allowance for an axis title on the side it is drawn.
    pub axis_title_allowance_px: f64,
    /// Gap between the plot bottom and horizontal category labels.
    pub x_label_gap_px: f64,
    pub diagonal_label_allowance_px: f64,
    pub vertical_label_px_per_char: f64,
    pub vertical_label_cap_px: f64,
    pub legend_row_height_px: f64,
    pub legend_char_width_px: f64,
    pub legend_swatch_px: f64,
    pub legend_item_gap_px: f64,
    pub legend_side_cap_px: f64,
    pub min_plot_size_px: f64,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            base_margin: Margin::new(12.0, 16.0, 12.0, 12.0),
            title_gap_px: 8.0,
            y_label_allowance_px: 44.0,
            axis_title_allowance_px: 20.0,
            x_label_gap_px: 6.0,
            diagonal_label_allowance_px: 40.0,
            vertical_label_px_per_char: 5.0,
            vertical_label_cap_px: 60.0,
            legend_row_height_px: 24.0,
            legend_char_width_px: 7.0,
            legend_swatch_px: 10.0,
            legend_item_gap_px: 12.0,
            legend_side_cap_px: 150.0,
            min_plot_size_px: 10.0,
        }
    }
}

/// Colors, fonts and bar spacing used by layout, painting and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTheme {
    pub name: String,
    pub background: Color,
    pub plot_background: Color,
    pub grid: Color,
    pub axis_line: Color,
    pub axis_label: Color,
    pub axis_title: Color,
    pub title: Color,
    pub legend_text: Color,
    pub selection: Color,
    pub selection_handle: Color,
    pub placeholder_fill: Color,
    pub placeholder_text: Color,
    pub title_font_px: f64,
    pub axis_label_font_px: f64,
    pub axis_title_font_px: f64,
    pub legend_font_px: f64,
    pub grid_stroke_px: f64,
    pub axis_stroke_px: f64,
    /// Horizontal gap between bars of one category group.
    pub bar_gap_px: f64,
    pub min_bar_width_px: f64,
    /// Band padding fraction in `[0, 1)`.
    pub band_padding: f64,
    /// Desired number of value-axis intervals.
    pub value_tick_count: usize,
    #[serde(default)]
    pub layout: LayoutTuning,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl ChartTheme {
    #[must_use]
    pub fn light() -> Self {
        Self {
            name: "light".to_owned(),
            background: Color::rgb8(255, 255, 255),
            plot_background: Color::rgb8(250, 250, 252),
            grid: Color::rgb8(230, 230, 235),
            axis_line: Color::rgb8(120, 120, 130),
            axis_label: Color::rgb8(70, 70, 80),
            axis_title: Color::rgb8(50, 50, 60),
            title: Color::rgb8(20, 20, 30),
            legend_text: Color::rgb8(50, 50, 60),
            selection: Color::rgb8(33, 115, 70),
            selection_handle: Color::rgb8(255, 255, 255),
            placeholder_fill: Color::rgb8(245, 245, 245),
            placeholder_text: Color::rgb8(140, 140, 150),
            title_font_px: 16.0,
            axis_label_font_px: 11.0,
            axis_title_font_px: 12.0,
            legend_font_px: 11.0,
            grid_stroke_px: 1.0,
            axis_stroke_px: 1.0,
            bar_gap_px: 2.0,
            min_bar_width_px: 2.0,
            band_padding: 0.2,
            value_tick_count: DEFAULT_TICK_COUNT,
            layout: LayoutTuning::default(),
        }
    }

    #[must_use]
    pub fn dark() -> Self {
        Self {
            name: "dark".to_owned(),
            background: Color::rgb8(18, 18, 20),
            plot_background: Color::rgb8(24, 24, 28),
            grid: Color::rgb8(40, 40, 45),
            axis_line: Color::rgb8(180, 180, 190),
            axis_label: Color::rgb8(210, 210, 220),
            axis_title: Color::rgb8(225, 225, 235),
            title: Color::rgb8(235, 235, 245),
            legend_text: Color::rgb8(210, 210, 220),
            selection: Color::rgb8(64, 160, 255),
            selection_handle: Color::rgb8(18, 18, 20),
            placeholder_fill: Color::rgb8(30, 30, 34),
            placeholder_text: Color::rgb8(150, 150, 160),
            ..Self::light()
        }
    }

    /// Finds a preset by name, falling back to `light`.
    #[must_use]
    pub fn find(name: &str) -> Self {
        [Self::light(), Self::dark()]
            .into_iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(name))
            .unwrap_or_else(Self::light)
    }

    pub fn validate(&self) -> ChartResult<()> {
        for color in [
            self.background,
            self.plot_background,
            self.grid,
            self.axis_line,
            self.axis_label,
            self.axis_title,
            self.title,
            self.legend_text,
            self.selection,
            self.selection_handle,
            self.placeholder_fill,
            self.placeholder_text,
        ] {
            color.validate()?;
        }

        for (field, value) in [
            ("title_font_px", self.title_font_px),
            ("axis_label_font_px", self.axis_label_font_px),
            ("axis_title_font_px", self.axis_title_font_px),
            ("legend_font_px", self.legend_font_px),
            ("grid_stroke_px", self.grid_stroke_px),
            ("axis_stroke_px", self.axis_stroke_px),
            ("min_bar_width_px", self.min_bar_width_px),
            ("min_plot_size_px", self.layout.min_plot_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "theme `{field}` must be finite and > 0"
                )));
            }
        }

        if !self.bar_gap_px.is_finite() || self.bar_gap_px < 0.0 {
            return Err(ChartError::InvalidData(
                "theme `bar_gap_px` must be finite and >= 0".to_owned(),
            ));
        }
        if !self.band_padding.is_finite() || !(0.0..1.0).contains(&self.band_padding) {
            return Err(ChartError::InvalidData(
                "theme `band_padding` must be finite and in [0, 1)".to_owned(),
            ));
        }
        if self.value_tick_count == 0 {
            return Err(ChartError::InvalidData(
                "theme `value_tick_count` must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

const DEFAULT_PALETTE: [Color; 8] = [
    Color::rgb8(68, 114, 196),
    Color::rgb8(237, 125, 49),
    Color::rgb8(165, 165, 165),
    Color::rgb8(255, 192, 0),
    Color::rgb8(91, 155, 213),
    Color::rgb8(112, 173, 71),
    Color::rgb8(38, 68, 120),
    Color::rgb8(158, 72, 14),
];

const PASTEL_PALETTE: [Color; 6] = [
    Color::rgb8(174, 198, 232),
    Color::rgb8(255, 187, 120),
    Color::rgb8(152, 223, 138),
    Color::rgb8(255, 152, 150),
    Color::rgb8(197, 176, 213),
    Color::rgb8(196, 156, 148),
];

const VIVID_PALETTE: [Color; 6] = [
    Color::rgb8(230, 25, 75),
    Color::rgb8(60, 180, 75),
    Color::rgb8(0, 130, 200),
    Color::rgb8(245, 130, 48),
    Color::rgb8(145, 30, 180),
    Color::rgb8(70, 240, 240),
];

const MONOCHROME_PALETTE: [Color; 4] = [
    Color::rgb8(40, 40, 40),
    Color::rgb8(90, 90, 90),
    Color::rgb8(140, 140, 140),
    Color::rgb8(190, 190, 190),
];

/// Series colors for a palette name; unknown names use `default`.
#[must_use]
pub fn palette(name: &str) -> &'static [Color] {
    match name.to_ascii_lowercase().as_str() {
        "pastel" => &PASTEL_PALETTE,
        "vivid" => &VIVID_PALETTE,
        "monochrome" => &MONOCHROME_PALETTE,
        _ => &DEFAULT_PALETTE,
    }
}

/// Fill color of a series: its hex override when valid, otherwise the
/// palette entry at `series_index`.
#[must_use]
pub fn series_color(data: &ParsedChartData, palette_name: &str, series_index: usize) -> Color {
    let colors = palette(palette_name);
    let fallback = colors[series_index % colors.len()];
    let Some(hex) = data
        .series
        .get(series_index)
        .and_then(|series| series.color.as_deref())
    else {
        return fallback;
    };

    match Color::from_hex(hex) {
        Ok(color) => color,
        Err(err) => {
            warn!(series_index, error = %err, "ignoring series color override");
            fallback
        }
    }
}
