#![cfg(feature = "cairo-backend")]

use gridchart::api::{
    CellTable, CellValue, ChartRenderEngine, ChartTheme, CompositeContent, FrameContext,
    RenderEngineConfig, TableDataSource, build_bar_chart_frame, compute_layout, paint,
};
use gridchart::core::{ChartId, ChartSpec, DataRangeRef, ParsedChartData, PixelRect, Series};
use gridchart::render::{
    CairoRenderer, CairoSurfaceProvider, OffscreenSurface, SurfaceProvider, SurfaceSize,
};
use tokio::task::LocalSet;

fn data() -> ParsedChartData {
    ParsedChartData::new(
        vec!["Q1".to_owned(), "Q2".to_owned()],
        vec![
            Series::new("North", vec![4.0, -2.0]),
            Series::new("South", vec![3.0, 5.0]),
        ],
    )
}

fn spec() -> ChartSpec {
    ChartSpec::bar(DataRangeRef::new(0, 0, 0, 2, 2)).with_title("Quarterly")
}

#[test]
fn provider_allocates_physical_pixels() {
    let size = SurfaceSize::new(200.0, 160.0, 2.0).expect("size");
    let mut surface = CairoSurfaceProvider.create_surface(size).expect("surface");

    let theme = ChartTheme::default();
    let layout = compute_layout(200.0, 160.0, &spec(), &data(), &theme);
    let bars = paint(&mut surface, &data(), &spec(), &layout, &theme).expect("paint");
    assert_eq!(bars.len(), 4);

    let frame = build_bar_chart_frame(&data(), &spec(), &layout, &theme).expect("frame");
    let (lines, rects, texts) = frame.counts();
    let stats = surface.last_stats();
    assert_eq!(
        (stats.lines_drawn, stats.rects_drawn, stats.texts_drawn),
        (lines, rects, texts)
    );

    let bitmap = surface.into_bitmap().expect("bitmap");
    assert_eq!((bitmap.width(), bitmap.height()), (400, 320));
}

#[test]
fn renderer_rejects_empty_surface() {
    assert!(CairoRenderer::new(0, 10).is_err());
}

#[tokio::test(flavor = "current_thread")]
async fn engine_caches_cairo_bitmaps() {
    LocalSet::new()
        .run_until(async {
            let text = |value: &str| CellValue::Text(value.to_owned());
            let source = TableDataSource::new(vec![CellTable::from_rows(vec![
                vec![text("Quarter"), text("North"), text("South")],
                vec![text("Q1"), CellValue::Number(4.0), CellValue::Number(3.0)],
                vec![text("Q2"), CellValue::Number(-2.0), CellValue::Number(5.0)],
            ])]);
            let engine = ChartRenderEngine::new(
                source,
                CairoSurfaceProvider,
                RenderEngineConfig::default(),
            )
            .expect("engine");
            let spec = spec();
            let frame = FrameContext {
                chart_id: ChartId::new(1),
                spec: &spec,
                target: PixelRect::new(0.0, 0.0, 300.0, 200.0),
                pixel_ratio: 1.5,
                selected: false,
            };

            assert!(engine.render_chart(&frame).is_placeholder());
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }

            match engine.render_chart(&frame).content {
                CompositeContent::Bitmap {
                    bitmap,
                    source_width,
                    source_height,
                    ..
                } => {
                    assert_eq!((source_width, source_height), (300, 200));
                    assert_eq!((bitmap.width(), bitmap.height()), (300, 200));
                }
                CompositeContent::Placeholder { .. } => panic!("expected cairo bitmap"),
            }
        })
        .await;
}
