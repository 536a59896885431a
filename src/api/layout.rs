use serde::{Deserialize, Serialize};

use crate::core::{ChartSpec, LabelAngle, LegendPosition, Margin, ParsedChartData, PixelRect};

use super::ChartTheme;

/// Line height applied to single-line labels, relative to the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Canvas size, resolved margins and the plot rectangle of one bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub plot_area: PixelRect,
}

/// Solves margins for everything drawn around the plot and returns the plot
/// rectangle left in the middle.
///
/// Each side grows additively from the theme's base margin, so margins are
/// monotonic in title presence, label settings, label length and legend
/// content. The plot size is floored at the theme's minimum even when the
/// margins exceed the canvas.
#[must_use]
pub fn compute_layout(
    width: f64,
    height: f64,
    spec: &ChartSpec,
    data: &ParsedChartData,
    theme: &ChartTheme,
) -> BarChartLayout {
    let tuning = &theme.layout;
    let mut margin = tuning.base_margin;

    if spec.visible_title().is_some() {
        margin.top += theme.title_font_px + tuning.title_gap_px;
    }

    if spec.y_axis.show_labels {
        margin.left += tuning.y_label_allowance_px;
    }
    if spec.y_axis.visible_title().is_some() {
        margin.left += tuning.axis_title_allowance_px;
    }

    margin.bottom += x_label_extent(spec, data, theme);
    if spec.x_axis.visible_title().is_some() {
        margin.bottom += tuning.axis_title_allowance_px;
    }

    if legend_visible(spec, data) {
        match spec.legend.position {
            LegendPosition::Top => margin.top += tuning.legend_row_height_px,
            LegendPosition::Bottom => margin.bottom += tuning.legend_row_height_px,
            LegendPosition::Left => margin.left += legend_side_width(data, theme),
            LegendPosition::Right => margin.right += legend_side_width(data, theme),
        }
    }

    let min_plot = tuning.min_plot_size_px;
    let plot_width = (width - margin.horizontal()).max(min_plot);
    let plot_height = (height - margin.vertical()).max(min_plot);

    BarChartLayout {
        width,
        height,
        margin,
        plot_area: PixelRect::new(margin.left, margin.top, plot_width, plot_height),
    }
}

/// Legend is drawn only when enabled and there is more than one series to tell apart.
pub(crate) fn legend_visible(spec: &ChartSpec, data: &ParsedChartData) -> bool {
    spec.legend.visible && data.series.len() > 1
}

/// Vertical space reserved below the plot for category labels.
pub(crate) fn x_label_extent(spec: &ChartSpec, data: &ParsedChartData, theme: &ChartTheme) -> f64 {
    if !spec.x_axis.show_labels {
        return 0.0;
    }

    let tuning = &theme.layout;
    match spec.x_axis.label_angle {
        LabelAngle::Horizontal => {
            theme.axis_label_font_px * LINE_HEIGHT_FACTOR + tuning.x_label_gap_px
        }
        LabelAngle::Diagonal => tuning.diagonal_label_allowance_px,
        LabelAngle::Vertical => (data.longest_category_chars() as f64
            * tuning.vertical_label_px_per_char)
            .min(tuning.vertical_label_cap_px),
    }
}

/// Width of a stacked legend column placed left or right of the plot.
pub(crate) fn legend_side_width(data: &ParsedChartData, theme: &ChartTheme) -> f64 {
    let tuning = &theme.layout;
    let label = data.longest_series_name_chars() as f64 * tuning.legend_char_width_px;
    (tuning.legend_swatch_px + LEGEND_SWATCH_GAP_PX + label + tuning.legend_item_gap_px)
        .min(tuning.legend_side_cap_px)
}

/// Gap between a legend swatch and its label.
pub(crate) const LEGEND_SWATCH_GAP_PX: f64 = 6.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataRangeRef, LegendSpec, Series};

    fn two_series() -> ParsedChartData {
        ParsedChartData::new(
            vec!["North".to_owned(), "South".to_owned()],
            vec![
                Series::new("Revenue", vec![1.0, 2.0]),
                Series::new("Cost", vec![0.5, 1.5]),
            ],
        )
    }

    #[test]
    fn right_legend_width_is_capped() {
        let theme = ChartTheme::default();
        let mut data = two_series();
        data.series[0].name = "x".repeat(200);
        assert_eq!(legend_side_width(&data, &theme), theme.layout.legend_side_cap_px);
    }

    #[test]
    fn hidden_legend_leaves_margins_untouched() {
        let theme = ChartTheme::default();
        let data = two_series();
        let range = DataRangeRef::new(0, 0, 0, 2, 2);
        let shown = ChartSpec::bar(range);
        let hidden = ChartSpec::bar(range).with_legend(LegendSpec {
            visible: false,
            position: LegendPosition::Bottom,
        });

        let shown = compute_layout(400.0, 300.0, &shown, &data, &theme);
        let hidden = compute_layout(400.0, 300.0, &hidden, &data, &theme);
        assert_eq!(
            shown.margin.bottom - hidden.margin.bottom,
            theme.layout.legend_row_height_px
        );
    }
}
