use approx::assert_relative_eq;
use gridchart::api::{
    BarChartLayout, ChartTheme, bar_scales, build_bar_chart_frame, compute_bar_rects,
    compute_layout, paint,
};
use gridchart::core::{AxisSpec, ChartSpec, DataRangeRef, ParsedChartData, PixelRect, Series};
use gridchart::render::{
    CanvasLayerKind, NullRenderer, OffscreenSurface, RecordingSurface, RenderFrame, SurfaceSize,
};

fn spec() -> ChartSpec {
    ChartSpec::bar(DataRangeRef::new(0, 0, 0, 2, 1))
}

fn mixed_sign_data() -> ParsedChartData {
    ParsedChartData::new(
        vec!["A".to_owned(), "B".to_owned()],
        vec![Series::new("S1", vec![10.0, -5.0])],
    )
}

fn quarterly_data() -> ParsedChartData {
    ParsedChartData::new(
        vec!["Q1".to_owned(), "Q2".to_owned(), "Q3".to_owned(), "Q4".to_owned()],
        vec![
            Series::new("North", vec![120.0, 80.0, 0.0, 45.5]),
            Series::new("South", vec![-30.0, 60.0, 95.0, 20.0]),
            Series::new("West", vec![15.0, f64::NAN, 70.0, 33.0]),
        ],
    )
}

fn series_rects(frame: &RenderFrame) -> Vec<PixelRect> {
    frame
        .layer(CanvasLayerKind::Series)
        .expect("series layer")
        .rects
        .iter()
        .map(|rect| PixelRect::new(rect.x, rect.y, rect.width, rect.height))
        .collect()
}

#[test]
fn negative_value_is_drawn_below_zero_line() {
    let theme = ChartTheme::default();
    let data = mixed_sign_data();
    let layout = compute_layout(400.0, 300.0, &spec(), &data, &theme);

    let scales = bar_scales(&data, &spec(), &layout, &theme).expect("scales");
    let (lo, hi) = scales.y.domain();
    assert!(lo <= 0.0 && 0.0 <= hi);
    let zero = scales.y.scale(0.0);

    let bars = compute_bar_rects(&data, &spec(), &layout, &theme).expect("bars");
    assert_eq!(bars.len(), 2);

    let a = &bars[0];
    let b = &bars[1];
    assert_eq!(a.category_name, "A");
    assert_eq!(b.category_name, "B");
    assert_relative_eq!(a.rect.bottom(), zero, epsilon = 1e-9);
    assert_relative_eq!(b.rect.y, zero, epsilon = 1e-9);
    assert!(b.rect.bottom() > zero);
    assert_relative_eq!(b.rect.bottom(), layout.plot_area.bottom(), epsilon = 1e-9);
}

#[test]
fn zero_and_missing_values_produce_no_bar() {
    let theme = ChartTheme::default();
    let data = quarterly_data();
    let layout = compute_layout(640.0, 360.0, &spec(), &data, &theme);
    let bars = compute_bar_rects(&data, &spec(), &layout, &theme).expect("bars");

    assert_eq!(bars.len(), 10);
    assert!(
        !bars
            .iter()
            .any(|bar| bar.series_name == "North" && bar.category_name == "Q3")
    );
    assert!(
        !bars
            .iter()
            .any(|bar| bar.series_name == "West" && bar.category_name == "Q2")
    );
}

#[test]
fn bars_are_clipped_to_explicit_axis_bounds() {
    let theme = ChartTheme::default();
    let data = quarterly_data();
    let clipped = spec().with_y_axis(AxisSpec::value_axis().with_bounds(Some(0.0), Some(50.0)));
    let layout = compute_layout(640.0, 360.0, &clipped, &data, &theme);
    let bars = compute_bar_rects(&data, &clipped, &layout, &theme).expect("bars");

    let plot = layout.plot_area;
    for bar in &bars {
        assert!(bar.rect.y >= plot.y - 1e-9);
        assert!(bar.rect.bottom() <= plot.bottom() + 1e-9);
        assert!(bar.rect.height > 0.0);
    }
    // negatives sit entirely below a zero minimum
    assert!(!bars.iter().any(|bar| bar.value < 0.0));

    let north_q1 = bars
        .iter()
        .find(|bar| bar.series_name == "North" && bar.category_name == "Q1")
        .expect("clipped bar kept");
    assert_relative_eq!(north_q1.rect.y, plot.y, epsilon = 1e-9);
}

#[test]
fn painted_bars_match_extracted_geometry() {
    let theme = ChartTheme::default();
    let data = quarterly_data();
    let chart = spec().with_title("Regional totals");
    let layout = compute_layout(640.0, 360.0, &chart, &data, &theme);

    let bars = compute_bar_rects(&data, &chart, &layout, &theme).expect("bars");
    let frame = build_bar_chart_frame(&data, &chart, &layout, &theme).expect("frame");
    let painted = series_rects(&frame);

    assert_eq!(painted.len(), bars.len());
    for (painted, bar) in painted.iter().zip(&bars) {
        assert_eq!(*painted, bar.rect);
    }

    let mut renderer = NullRenderer::default();
    let returned = paint(&mut renderer, &data, &chart, &layout, &theme).expect("paint");
    assert_eq!(returned, bars);
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_bar_count, bars.len());
    assert_eq!(
        (renderer.last_line_count, renderer.last_rect_count, renderer.last_text_count),
        frame.counts()
    );
}

#[test]
fn recorded_surface_holds_bars_at_physical_resolution() {
    let theme = ChartTheme::default();
    let data = quarterly_data();
    let layout = compute_layout(320.0, 200.0, &spec(), &data, &theme);
    let size = SurfaceSize::new(320.0, 200.0, 2.0).expect("size");

    let mut surface = RecordingSurface::new(size);
    let bars = paint(&mut surface, &data, &spec(), &layout, &theme).expect("paint");
    let bitmap = surface.into_bitmap().expect("bitmap");

    assert_eq!(bitmap.frame.viewport.width, 640);
    assert_eq!(bitmap.frame.viewport.height, 400);
    let physical = series_rects(&bitmap.frame);
    assert_eq!(physical.len(), bars.len());
    for (rect, bar) in physical.iter().zip(&bars) {
        assert_relative_eq!(rect.x, bar.rect.x * 2.0, epsilon = 1e-9);
        assert_relative_eq!(rect.height, bar.rect.height * 2.0, epsilon = 1e-9);
    }
}

#[test]
fn empty_data_paints_frame_without_bars() {
    let theme = ChartTheme::default();
    let data = ParsedChartData::default();
    let layout = compute_layout(200.0, 120.0, &spec(), &data, &theme);

    assert!(compute_bar_rects(&data, &spec(), &layout, &theme).expect("bars").is_empty());
    let frame = build_bar_chart_frame(&data, &spec(), &layout, &theme).expect("frame");
    assert!(series_rects(&frame).is_empty());
    assert_eq!(
        frame
            .layer(CanvasLayerKind::Background)
            .expect("background")
            .rects
            .len(),
        2
    );
}

#[test]
fn zero_sized_layout_is_rejected_by_painter() {
    let theme = ChartTheme::default();
    let data = mixed_sign_data();
    let layout = BarChartLayout {
        width: 0.0,
        ..compute_layout(200.0, 120.0, &spec(), &data, &theme)
    };
    assert!(build_bar_chart_frame(&data, &spec(), &layout, &theme).is_err());
}
