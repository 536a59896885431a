use serde::{Deserialize, Serialize};

use crate::core::{BandScale, ChartSpec, LinearScale, ParsedChartData, PixelRect};
use crate::error::ChartResult;

use super::{BarChartLayout, ChartTheme};

/// One painted bar segment together with what it represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRect {
    pub series_index: usize,
    pub category_index: usize,
    pub rect: PixelRect,
    pub value: f64,
    pub series_name: String,
    pub category_name: String,
}

/// Category and value scales of a bar chart's plot area.
#[derive(Debug, Clone, PartialEq)]
pub struct BarScales {
    pub x: BandScale,
    pub y: LinearScale,
}

/// Builds the band scale over the plot width and the zero-anchored value
/// scale over the plot height (pixel y grows downward).
///
/// Explicit value-axis bounds replace the niced ends afterwards.
pub fn bar_scales(
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
) -> ChartResult<BarScales> {
    let plot = layout.plot_area;
    let x = BandScale::new(&data.categories, (plot.x, plot.right()), theme.band_padding)?;
    let y = LinearScale::including_zero(
        data.value_extent().unwrap_or((0.0, 0.0)),
        (plot.bottom(), plot.y),
        theme.value_tick_count,
    )?
    .with_bounds(spec.y_axis.min, spec.y_axis.max);
    Ok(BarScales { x, y })
}

/// Width of each bar in a category group of `series_count` bars.
#[must_use]
pub fn bar_width(bandwidth: f64, series_count: usize, theme: &ChartTheme) -> f64 {
    let count = series_count.max(1) as f64;
    ((bandwidth - theme.bar_gap_px * (count - 1.0)) / count).max(theme.min_bar_width_px)
}

/// Solves every visible bar rectangle, category-major then series order.
///
/// This is the only place bar pixels are computed: the painter draws
/// exactly these rectangles, so hit testing always agrees with the screen.
/// Bars grow away from the zero line, are clipped to the plot's vertical
/// extent, and are dropped when nothing is left after clipping.
pub fn compute_bar_rects(
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
) -> ChartResult<Vec<BarRect>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let scales = bar_scales(data, spec, layout, theme)?;
    let plot = layout.plot_area;
    let series_count = data.series.len();
    let width = bar_width(scales.x.bandwidth(), series_count, theme);
    let zero_px = scales.y.scale(0.0);

    let mut rects = Vec::with_capacity(data.categories.len() * series_count);
    for (category_index, category_name) in data.categories.iter().enumerate() {
        let group_x = scales.x.scale_index(category_index);
        for (series_index, series) in data.series.iter().enumerate() {
            let value = series.value_at(category_index);
            let value_px = scales.y.scale(value);

            let top = value_px.min(zero_px).max(plot.y);
            let bottom = value_px.max(zero_px).min(plot.bottom());
            let height = bottom - top;
            if height <= 0.0 {
                continue;
            }

            rects.push(BarRect {
                series_index,
                category_index,
                rect: PixelRect::new(
                    group_x + series_index as f64 * (width + theme.bar_gap_px),
                    top,
                    width,
                    height,
                ),
                value,
                series_name: series.name.clone(),
                category_name: category_name.clone(),
            });
        }
    }
    Ok(rects)
}
