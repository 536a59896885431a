use tracing::trace;

use crate::core::{
    ChartSpec, LabelAngle, LegendPosition, ParsedChartData, PixelRect, Viewport,
    format_tick_value,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CanvasLayerKind, LinePrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign,
    TextPrimitive,
};

use super::bar_geometry::{BarScales, bar_scales};
use super::layout::{LEGEND_SWATCH_GAP_PX, legend_side_width, legend_visible, x_label_extent};
use super::{BarChartLayout, BarRect, ChartTheme, compute_bar_rects, series_color};

/// Gap between the y axis and the right edge of its tick labels.
const Y_LABEL_GAP_PX: f64 = 6.0;
/// Gap between the plot bottom and the top of category labels.
const X_LABEL_OFFSET_PX: f64 = 4.0;

/// Materializes the full bar chart scene in logical pixels.
pub fn build_bar_chart_frame(
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
) -> ChartResult<RenderFrame> {
    build_frame_with_bars(data, spec, layout, theme).map(|(frame, _)| frame)
}

/// Paints the chart through `renderer` and returns the bars it drew.
pub fn paint<R: Renderer + ?Sized>(
    renderer: &mut R,
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
) -> ChartResult<Vec<BarRect>> {
    let (frame, bars) = build_frame_with_bars(data, spec, layout, theme)?;
    renderer.render(&frame)?;
    Ok(bars)
}

fn build_frame_with_bars(
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
) -> ChartResult<(RenderFrame, Vec<BarRect>)> {
    let viewport = logical_viewport(layout)?;
    let mut frame = RenderFrame::new(viewport);
    let scales = bar_scales(data, spec, layout, theme)?;

    paint_backgrounds(&mut frame, layout, theme);
    paint_grid(&mut frame, data, spec, layout, theme, &scales);
    paint_axes(&mut frame, data, spec, layout, theme, &scales);

    let bars = compute_bar_rects(data, spec, layout, theme)?;
    for bar in &bars {
        let rect = bar.rect;
        frame.push_rect(
            CanvasLayerKind::Series,
            RectPrimitive::new(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                series_color(data, &spec.palette, bar.series_index),
            ),
        );
    }

    paint_title(&mut frame, spec, layout, theme);
    if legend_visible(spec, data) {
        paint_legend(&mut frame, data, spec, layout, theme);
    }

    let (lines, rects, texts) = frame.counts();
    trace!(lines, rects, texts, bars = bars.len(), "bar chart frame built");
    Ok((frame, bars))
}

/// Ticks on the plot edges survive float noise from the scale mapping.
fn within_plot_rows(y: f64, plot: PixelRect) -> bool {
    const EDGE_TOLERANCE_PX: f64 = 1e-6;
    y >= plot.y - EDGE_TOLERANCE_PX && y <= plot.bottom() + EDGE_TOLERANCE_PX
}

fn logical_viewport(layout: &BarChartLayout) -> ChartResult<Viewport> {
    let to_px = |value: f64| {
        if value.is_finite() && value >= 1.0 {
            value.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    let viewport = Viewport::new(to_px(layout.width), to_px(layout.height));
    if !viewport.is_valid() {
        return Err(ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(viewport)
}

fn paint_backgrounds(frame: &mut RenderFrame, layout: &BarChartLayout, theme: &ChartTheme) {
    frame.push_rect(
        CanvasLayerKind::Background,
        RectPrimitive::new(0.0, 0.0, layout.width, layout.height, theme.background),
    );
    let plot = layout.plot_area;
    frame.push_rect(
        CanvasLayerKind::Background,
        RectPrimitive::new(plot.x, plot.y, plot.width, plot.height, theme.plot_background),
    );
}

fn paint_grid(
    frame: &mut RenderFrame,
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
    scales: &BarScales,
) {
    let plot = layout.plot_area;

    if spec.y_axis.grid_lines {
        for tick in scales.y.ticks(theme.value_tick_count) {
            let y = scales.y.scale(tick);
            if !within_plot_rows(y, plot) {
                continue;
            }
            frame.push_line(
                CanvasLayerKind::Grid,
                LinePrimitive::new(plot.x, y, plot.right(), y, theme.grid_stroke_px, theme.grid),
            );
        }
    }

    if spec.x_axis.grid_lines {
        let half_band = scales.x.bandwidth() / 2.0;
        for index in 0..data.categories.len() {
            let x = scales.x.scale_index(index) + half_band;
            frame.push_line(
                CanvasLayerKind::Grid,
                LinePrimitive::new(x, plot.y, x, plot.bottom(), theme.grid_stroke_px, theme.grid),
            );
        }
    }
}

fn paint_axes(
    frame: &mut RenderFrame,
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
    scales: &BarScales,
) {
    let plot = layout.plot_area;
    let baseline = scales.y.scale(0.0).clamp(plot.y, plot.bottom());

    frame.push_line(
        CanvasLayerKind::Axis,
        LinePrimitive::new(
            plot.x,
            plot.y,
            plot.x,
            plot.bottom(),
            theme.axis_stroke_px,
            theme.axis_line,
        ),
    );
    frame.push_line(
        CanvasLayerKind::Axis,
        LinePrimitive::new(
            plot.x,
            baseline,
            plot.right(),
            baseline,
            theme.axis_stroke_px,
            theme.axis_line,
        ),
    );

    if spec.y_axis.show_labels {
        let half_font = theme.axis_label_font_px / 2.0;
        for tick in scales.y.ticks(theme.value_tick_count) {
            let y = scales.y.scale(tick);
            if !within_plot_rows(y, plot) {
                continue;
            }
            frame.push_text(
                CanvasLayerKind::Axis,
                TextPrimitive::new(
                    format_tick_value(tick),
                    plot.x - Y_LABEL_GAP_PX,
                    y - half_font,
                    theme.axis_label_font_px,
                    theme.axis_label,
                    TextHAlign::Right,
                ),
            );
        }
    }

    if spec.x_axis.show_labels {
        let half_band = scales.x.bandwidth() / 2.0;
        let angle = spec.x_axis.label_angle;
        for (index, category) in data.categories.iter().enumerate() {
            if category.is_empty() {
                continue;
            }
            let x = scales.x.scale_index(index) + half_band;
            let y = plot.bottom() + X_LABEL_OFFSET_PX;
            let label = match angle {
                LabelAngle::Horizontal => TextPrimitive::new(
                    category.as_str(),
                    x,
                    y,
                    theme.axis_label_font_px,
                    theme.axis_label,
                    TextHAlign::Center,
                ),
                LabelAngle::Diagonal | LabelAngle::Vertical => TextPrimitive::new(
                    category.as_str(),
                    x,
                    y,
                    theme.axis_label_font_px,
                    theme.axis_label,
                    TextHAlign::Right,
                )
                .rotated(-angle.degrees()),
            };
            frame.push_text(CanvasLayerKind::Axis, label);
        }
    }

    if let Some(title) = spec.x_axis.visible_title() {
        frame.push_text(
            CanvasLayerKind::Axis,
            TextPrimitive::new(
                title,
                plot.x + plot.width / 2.0,
                plot.bottom() + x_label_extent(spec, data, theme) + X_LABEL_OFFSET_PX,
                theme.axis_title_font_px,
                theme.axis_title,
                TextHAlign::Center,
            ),
        );
    }

    if let Some(title) = spec.y_axis.visible_title() {
        let left_legend = if legend_visible(spec, data) && spec.legend.position == LegendPosition::Left
        {
            legend_side_width(data, theme)
        } else {
            0.0
        };
        frame.push_text(
            CanvasLayerKind::Axis,
            TextPrimitive::new(
                title,
                theme.layout.base_margin.left + left_legend,
                plot.y + plot.height / 2.0,
                theme.axis_title_font_px,
                theme.axis_title,
                TextHAlign::Center,
            )
            .rotated(-90.0),
        );
    }
}

fn paint_title(
    frame: &mut RenderFrame,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
) {
    let Some(title) = spec.visible_title() else {
        return;
    };
    frame.push_text(
        CanvasLayerKind::Overlay,
        TextPrimitive::new(
            title,
            layout.width / 2.0,
            theme.layout.base_margin.top,
            theme.title_font_px,
            theme.title,
            TextHAlign::Center,
        ),
    );
}

fn paint_legend(
    frame: &mut RenderFrame,
    data: &ParsedChartData,
    spec: &ChartSpec,
    layout: &BarChartLayout,
    theme: &ChartTheme,
) {
    let tuning = &theme.layout;
    let row_height = tuning.legend_row_height_px;
    let swatch = tuning.legend_swatch_px;
    let label_width =
        |name: &str| name.chars().count() as f64 * tuning.legend_char_width_px;

    match spec.legend.position {
        LegendPosition::Top | LegendPosition::Bottom => {
            let item_widths: Vec<f64> = data
                .series
                .iter()
                .map(|series| swatch + LEGEND_SWATCH_GAP_PX + label_width(&series.name))
                .collect();
            let total = item_widths.iter().sum::<f64>()
                + tuning.legend_item_gap_px * (item_widths.len().saturating_sub(1)) as f64;

            let row_y = if spec.legend.position == LegendPosition::Top {
                let title_extent = if spec.visible_title().is_some() {
                    theme.title_font_px + tuning.title_gap_px
                } else {
                    0.0
                };
                tuning.base_margin.top + title_extent
            } else {
                layout.height - tuning.base_margin.bottom - row_height
            };

            let mut x = (layout.width - total) / 2.0;
            for (index, width) in item_widths.into_iter().enumerate() {
                push_legend_item(
                    frame,
                    data,
                    spec,
                    theme,
                    index,
                    PixelRect::new(x, row_y, width, row_height),
                );
                x += width + tuning.legend_item_gap_px;
            }
        }
        LegendPosition::Left | LegendPosition::Right => {
            let column_width = legend_side_width(data, theme);
            let column_x = if spec.legend.position == LegendPosition::Left {
                tuning.base_margin.left
            } else {
                layout.width - tuning.base_margin.right - column_width + tuning.legend_item_gap_px
            };

            for index in 0..data.series.len() {
                let row_y = layout.plot_area.y + index as f64 * row_height;
                push_legend_item(
                    frame,
                    data,
                    spec,
                    theme,
                    index,
                    PixelRect::new(column_x, row_y, column_width, row_height),
                );
            }
        }
    }
}

fn push_legend_item(
    frame: &mut RenderFrame,
    data: &ParsedChartData,
    spec: &ChartSpec,
    theme: &ChartTheme,
    series_index: usize,
    slot: PixelRect,
) {
    let swatch = theme.layout.legend_swatch_px;
    let center_y = slot.y + slot.height / 2.0;
    frame.push_rect(
        CanvasLayerKind::Overlay,
        RectPrimitive::new(
            slot.x,
            center_y - swatch / 2.0,
            swatch,
            swatch,
            series_color(data, &spec.palette, series_index),
        ),
    );

    let name = &data.series[series_index].name;
    if name.is_empty() {
        return;
    }
    frame.push_text(
        CanvasLayerKind::Overlay,
        TextPrimitive::new(
            name.as_str(),
            slot.x + swatch + LEGEND_SWATCH_GAP_PX,
            center_y - theme.legend_font_px / 2.0,
            theme.legend_font_px,
            theme.legend_text,
            TextHAlign::Left,
        ),
    );
}
