use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use gridchart::api::{
    CellTable, CellValue, ChartDataSource, ChartRenderEngine, CompositeContent, FrameContext,
    Freshness, HitResult, PointerContext, RenderEngineConfig, TableDataSource, compute_bar_rects,
    compute_layout,
};
use gridchart::core::{ChartId, ChartSpec, DataRangeRef, ParsedChartData, PixelRect, Series, SeriesDef};
use gridchart::error::{ChartError, ChartResult};
use gridchart::render::RecordingSurfaceProvider;
use tokio::sync::oneshot;
use tokio::task::LocalSet;

type DataReply = oneshot::Sender<ChartResult<ParsedChartData>>;

/// Data source whose fetches stay pending until the test answers them.
#[derive(Default)]
struct GatedSource {
    pending: RefCell<Vec<DataReply>>,
    fetches: Cell<usize>,
}

impl GatedSource {
    fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    fn answer_next(&self, reply: ChartResult<ParsedChartData>) {
        let sender = self.pending.borrow_mut().remove(0);
        let _ = sender.send(reply);
    }
}

impl ChartDataSource for GatedSource {
    fn fetch_chart_data(
        &self,
        _spec: &ChartSpec,
    ) -> impl Future<Output = ChartResult<ParsedChartData>> {
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push(sender);
        self.fetches.set(self.fetches.get() + 1);
        async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(ChartError::DataFetch("request dropped".to_owned())))
        }
    }
}

type GatedEngine = ChartRenderEngine<GatedSource, RecordingSurfaceProvider>;

const CHART: ChartId = ChartId::new(7);
const TARGET: PixelRect = PixelRect::new(100.0, 50.0, 320.0, 200.0);

fn spec() -> ChartSpec {
    ChartSpec::bar(DataRangeRef::new(0, 0, 0, 3, 2))
        .with_series(SeriesDef::new("Sales", 1))
        .with_series(SeriesDef::new("Cost", 2))
}

fn sample_data() -> ParsedChartData {
    ParsedChartData::new(
        vec!["North".to_owned(), "South".to_owned(), "West".to_owned()],
        vec![
            Series::new("Sales", vec![10.0, 14.0, 6.0]),
            Series::new("Cost", vec![4.0, 9.0, 3.0]),
        ],
    )
}

fn frame<'a>(spec: &'a ChartSpec, target: PixelRect, selected: bool) -> FrameContext<'a> {
    FrameContext {
        chart_id: CHART,
        spec,
        target,
        pixel_ratio: 1.0,
        selected,
    }
}

fn gated_engine(redraws: &Rc<Cell<usize>>) -> GatedEngine {
    let counter = Rc::clone(redraws);
    ChartRenderEngine::new(
        GatedSource::default(),
        RecordingSurfaceProvider::new(),
        RenderEngineConfig::default(),
    )
    .expect("engine")
    .with_redraw_signal(move |_: ChartId| counter.set(counter.get() + 1))
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(flavor = "current_thread")]
async fn first_frame_serves_placeholder_and_starts_one_render() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let composite = engine.render_chart(&frame(&spec, TARGET, false));
            assert!(composite.is_placeholder());
            assert!(composite.render_scheduled);
            assert!(engine.is_render_in_flight(CHART));

            let again = engine.render_chart(&frame(&spec, TARGET, false));
            assert!(again.is_placeholder());
            assert!(!again.render_scheduled);

            settle().await;
            assert_eq!(engine.data_source().fetches.get(), 1);
            assert_eq!(engine.render_stats().started, 1);
            assert_eq!(redraws.get(), 0);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn completed_render_is_served_as_current_bitmap() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;

            assert_eq!(redraws.get(), 1);
            assert!(!engine.is_render_in_flight(CHART));
            assert_eq!(engine.render_stats().committed, 1);

            let composite = engine.render_chart(&frame(&spec, TARGET, false));
            assert_eq!(composite.freshness(), Some(Freshness::Current));
            assert!(!composite.render_scheduled);
            match composite.content {
                CompositeContent::Bitmap {
                    bitmap,
                    source_width,
                    source_height,
                    ..
                } => {
                    assert_eq!((source_width, source_height), (320, 200));
                    assert!(!bitmap.frame.is_empty());
                }
                CompositeContent::Placeholder { .. } => panic!("expected cached bitmap"),
            }

            let cached = engine.cached_chart_data(CHART).expect("cached data");
            assert_eq!(cached.categories.len(), 3);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn burst_of_invalidations_discards_one_render_and_restarts_once() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;

            // edit while a refresh is pending
            engine.invalidate_chart_cache(CHART);
            let stale = engine.render_chart(&frame(&spec, TARGET, false));
            assert_eq!(stale.freshness(), Some(Freshness::Stale));
            assert!(stale.render_scheduled);
            settle().await;

            for _ in 0..5 {
                engine.invalidate_chart_cache(CHART);
                let composite = engine.render_chart(&frame(&spec, TARGET, false));
                assert_eq!(composite.freshness(), Some(Freshness::Stale));
                assert!(!composite.render_scheduled);
            }
            assert_eq!(engine.chart_version(CHART), 6);

            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;
            let stats = engine.render_stats();
            assert_eq!(stats.discarded, 1);
            assert_eq!(stats.committed, 1);
            assert!(!engine.is_render_in_flight(CHART));

            let retry = engine.render_chart(&frame(&spec, TARGET, false));
            assert_eq!(retry.freshness(), Some(Freshness::Stale));
            assert!(retry.render_scheduled);
            settle().await;
            assert_eq!(engine.data_source().pending_count(), 1);

            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;
            let current = engine.render_chart(&frame(&spec, TARGET, false));
            assert_eq!(current.freshness(), Some(Freshness::Current));
            assert_eq!(engine.render_stats().started, 3);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn failed_fetch_frees_the_slot_and_keeps_the_placeholder() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            engine
                .data_source()
                .answer_next(Err(ChartError::DataFetch("sheet closed".to_owned())));
            settle().await;

            assert!(!engine.is_render_in_flight(CHART));
            assert_eq!(engine.render_stats().failed, 1);
            assert_eq!(redraws.get(), 0);

            let retry = engine.render_chart(&frame(&spec, TARGET, false));
            assert!(retry.is_placeholder());
            assert!(retry.render_scheduled);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn mismatched_data_counts_as_a_failure() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            let broken = ParsedChartData::new(
                vec!["North".to_owned()],
                vec![Series::new("Sales", vec![1.0, 2.0])],
            );
            engine.data_source().answer_next(Ok(broken));
            settle().await;

            assert_eq!(engine.render_stats().failed, 1);
            assert!(engine.cached_chart_data(CHART).is_none());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn eviction_during_render_drops_the_late_result() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            engine.remove_chart_from_cache(CHART);
            assert!(!engine.is_render_in_flight(CHART));

            let restarted = engine.render_chart(&frame(&spec, TARGET, false));
            assert!(restarted.render_scheduled);
            settle().await;
            assert_eq!(engine.data_source().pending_count(), 2);

            // the first answer belongs to the evicted render
            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;
            assert!(engine.is_render_in_flight(CHART));
            assert!(engine.cached_chart_data(CHART).is_none());
            assert_eq!(engine.render_stats().discarded, 1);
            assert_eq!(redraws.get(), 0);

            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;
            assert!(!engine.is_render_in_flight(CHART));
            assert!(engine.cached_chart_data(CHART).is_some());
            assert_eq!(redraws.get(), 1);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn failure_after_eviction_is_not_counted() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            engine.remove_chart_from_cache(CHART);
            engine
                .data_source()
                .answer_next(Err(ChartError::DataFetch("sheet closed".to_owned())));
            settle().await;

            assert_eq!(engine.render_stats().failed, 0);
            assert!(!engine.is_render_in_flight(CHART));
            assert_eq!(redraws.get(), 0);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn resized_target_stretches_the_cached_bitmap() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;

            let wider = PixelRect::new(100.0, 50.0, 640.0, 300.0);
            let composite = engine.render_chart(&frame(&spec, wider, false));
            assert_eq!(composite.freshness(), Some(Freshness::Current));
            assert!(!composite.render_scheduled);
            assert_eq!(composite.target, wider);
            match composite.content {
                CompositeContent::Bitmap {
                    source_width,
                    source_height,
                    ..
                } => assert_eq!((source_width, source_height), (320, 200)),
                CompositeContent::Placeholder { .. } => panic!("expected cached bitmap"),
            }
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn selection_adds_border_and_handles() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let selected = engine.render_chart(&frame(&spec, TARGET, true));
            assert_eq!(selected.decorations.len(), 9);

            let plain = engine.render_chart(&frame(&spec, TARGET, false));
            assert!(plain.decorations.is_empty());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn unrenderable_region_schedules_nothing() {
    LocalSet::new()
        .run_until(async {
            let redraws = Rc::new(Cell::new(0));
            let engine = gated_engine(&redraws);
            let spec = spec();

            let empty = PixelRect::new(0.0, 0.0, 0.0, 120.0);
            let composite = engine.render_chart(&frame(&spec, empty, false));
            assert!(composite.is_placeholder());
            assert!(!composite.render_scheduled);
            assert!(!engine.is_render_in_flight(CHART));
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn oversized_surface_is_reported_as_failure() {
    LocalSet::new()
        .run_until(async {
            let engine = ChartRenderEngine::new(
                GatedSource::default(),
                RecordingSurfaceProvider::new().with_max_pixels(1_000),
                RenderEngineConfig::default(),
            )
            .expect("engine");
            let spec = spec();

            let _ = engine.render_chart(&frame(&spec, TARGET, false));
            settle().await;
            engine.data_source().answer_next(Ok(sample_data()));
            settle().await;

            assert_eq!(engine.render_stats().failed, 1);
            assert!(!engine.is_render_in_flight(CHART));
        })
        .await;
}

#[test]
fn chart_bounds_hit_test_uses_the_target() {
    let engine = ChartRenderEngine::new(
        GatedSource::default(),
        RecordingSurfaceProvider::new(),
        RenderEngineConfig::default(),
    )
    .expect("engine");
    let pointer = |x: f64, y: f64| PointerContext {
        chart_id: CHART,
        canvas_x: x,
        canvas_y: y,
        target: TARGET,
        pixel_ratio: 1.0,
    };

    assert!(engine.hit_test_chart(&pointer(150.0, 60.0)));
    assert!(!engine.hit_test_chart(&pointer(99.0, 60.0)));
    assert!(!engine.hit_test_chart(&pointer(150.0, 251.0)));
}

fn text(value: &str) -> CellValue {
    CellValue::from(value)
}

fn table_source() -> TableDataSource {
    TableDataSource::new(vec![CellTable::from_rows(vec![
        vec![text("Region"), text("Sales"), text("Cost")],
        vec![text("North"), CellValue::Number(10.0), CellValue::Number(4.0)],
        vec![text("South"), CellValue::Number(14.0), CellValue::Number(9.0)],
        vec![text("West"), CellValue::Number(6.0), CellValue::Number(3.0)],
    ])])
}

async fn bar_hit_round_trip(pixel_ratio: f64) {
    let engine = ChartRenderEngine::new(
        table_source(),
        RecordingSurfaceProvider::new(),
        RenderEngineConfig::default(),
    )
    .expect("engine");
    let spec = spec();
    let target = PixelRect::new(40.0, 30.0, 320.0 * pixel_ratio, 200.0 * pixel_ratio);
    let frame = FrameContext {
        chart_id: CHART,
        spec: &spec,
        target,
        pixel_ratio,
        selected: false,
    };
    let pointer = |x: f64, y: f64| PointerContext {
        chart_id: CHART,
        canvas_x: target.x + x * pixel_ratio,
        canvas_y: target.y + y * pixel_ratio,
        target,
        pixel_ratio,
    };

    assert_eq!(
        engine.hit_test_bar_at(&pointer(160.0, 100.0), &spec),
        HitResult::None
    );

    let _ = engine.render_chart(&frame);
    settle().await;
    let data = engine.cached_chart_data(CHART).expect("rendered");

    let layout = compute_layout(320.0, 200.0, &spec, &data, engine.theme());
    let bars = compute_bar_rects(&data, &spec, &layout, engine.theme()).expect("bars");
    let south_cost = bars
        .iter()
        .find(|bar| bar.category_index == 1 && bar.series_index == 1)
        .expect("bar");
    let center_x = south_cost.rect.x + south_cost.rect.width / 2.0;
    let center_y = south_cost.rect.y + south_cost.rect.height / 2.0;

    match engine.hit_test_bar_at(&pointer(center_x, center_y), &spec) {
        HitResult::Bar(hit) => {
            assert_eq!(hit.series_name, "Cost");
            assert_eq!(hit.category_name, "South");
            assert_eq!(hit.value, 9.0);
        }
        other => panic!("expected a bar, got {other:?}"),
    }

    let plot = layout.plot_area;
    assert_eq!(
        engine.hit_test_bar_at(&pointer(plot.x + 1.0, plot.y + 1.0), &spec),
        HitResult::PlotArea
    );
    assert_eq!(
        engine.hit_test_bar_at(&pointer(1.0, 1.0), &spec),
        HitResult::None
    );
}

#[tokio::test(flavor = "current_thread")]
async fn bar_hit_test_resolves_cached_geometry() {
    LocalSet::new().run_until(bar_hit_round_trip(1.0)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn bar_hit_test_accounts_for_pixel_ratio() {
    LocalSet::new().run_until(bar_hit_round_trip(2.0)).await;
}
