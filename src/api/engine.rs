use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::core::{ChartId, ChartSpec, ParsedChartData};
use crate::error::ChartResult;
use crate::render::{OffscreenSurface, ProviderBitmap, SurfaceProvider, SurfaceSize};

use super::composite::{placeholder_content, selection_decorations};
use super::{
    CacheLookup, CachedRender, ChartComposite, ChartDataSource, ChartRenderRegistry, ChartTheme,
    CommitOutcome, CompositeContent, FrameContext, Freshness, HitResult, LocalSpawner,
    PointerContext, RedrawSignal, RenderEngineConfig, RenderStats, RenderTicket,
    TokioLocalSpawner, chart_local_coords, compute_bar_rects, compute_layout, hit_test_bar_chart,
    paint,
};

type SharedRegistry<B> = Rc<RefCell<ChartRenderRegistry<B>>>;

/// Stale-while-revalidate bitmap cache and async render scheduler for all
/// charts of one workbook view.
///
/// Every method runs on the UI thread. `render_chart` never blocks: it hands
/// back whatever is cached (or a placeholder) and starts at most one
/// background render per chart. Data fetching is the only suspension point
/// of a render; layout and painting run synchronously once data arrives.
pub struct ChartRenderEngine<D, P>
where
    D: ChartDataSource + 'static,
    P: SurfaceProvider + 'static,
{
    registry: SharedRegistry<ProviderBitmap<P>>,
    source: Rc<D>,
    provider: Rc<P>,
    spawner: Rc<dyn LocalSpawner>,
    redraw: Rc<dyn RedrawSignal>,
    config: RenderEngineConfig,
    theme: ChartTheme,
}

impl<D, P> ChartRenderEngine<D, P>
where
    D: ChartDataSource + 'static,
    P: SurfaceProvider + 'static,
{
    /// Engine that spawns on the current tokio `LocalSet` and signals no redraws.
    pub fn new(source: D, provider: P, config: RenderEngineConfig) -> ChartResult<Self> {
        config.validate()?;
        let theme = config.effective_theme();
        Ok(Self {
            registry: Rc::new(RefCell::new(ChartRenderRegistry::new())),
            source: Rc::new(source),
            provider: Rc::new(provider),
            spawner: Rc::new(TokioLocalSpawner),
            redraw: Rc::new(|_: ChartId| {}),
            config,
            theme,
        })
    }

    #[must_use]
    pub fn with_spawner(mut self, spawner: impl LocalSpawner + 'static) -> Self {
        self.spawner = Rc::new(spawner);
        self
    }

    #[must_use]
    pub fn with_redraw_signal(mut self, redraw: impl RedrawSignal + 'static) -> Self {
        self.redraw = Rc::new(redraw);
        self
    }

    #[must_use]
    pub fn config(&self) -> &RenderEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn theme(&self) -> &ChartTheme {
        &self.theme
    }

    #[must_use]
    pub fn data_source(&self) -> &D {
        &self.source
    }

    /// Returns what to composite for the chart this frame and schedules a
    /// background render when the cache is stale or empty.
    pub fn render_chart(&self, frame: &FrameContext<'_>) -> ChartComposite<ProviderBitmap<P>> {
        let (content, needs_render) = {
            let registry = self.registry.borrow();
            match registry.lookup(frame.chart_id) {
                CacheLookup::Current(entry) => {
                    trace!(chart_id = %frame.chart_id, version = entry.version, "serving current bitmap");
                    (bitmap_content(entry, Freshness::Current), false)
                }
                CacheLookup::Stale(entry) => {
                    trace!(chart_id = %frame.chart_id, version = entry.version, "serving stale bitmap");
                    (bitmap_content(entry, Freshness::Stale), true)
                }
                CacheLookup::Missing => {
                    trace!(chart_id = %frame.chart_id, "serving placeholder");
                    (
                        placeholder_content(
                            frame.target,
                            frame.pixel_ratio,
                            &self.config.placeholder_label,
                            &self.theme,
                        ),
                        true,
                    )
                }
            }
        };

        let render_scheduled = needs_render && self.schedule_render(frame);
        let decorations = if frame.selected && self.config.draw_selection {
            selection_decorations(frame.target, frame.pixel_ratio, &self.theme)
        } else {
            Vec::new()
        };

        ChartComposite {
            chart_id: frame.chart_id,
            target: frame.target,
            content,
            render_scheduled,
            decorations,
        }
    }

    /// Whole-chart bounds test used for click routing.
    #[must_use]
    pub fn hit_test_chart(&self, pointer: &PointerContext) -> bool {
        pointer.target.contains(pointer.canvas_x, pointer.canvas_y)
    }

    /// Resolves the pointer against the bars of the cached render.
    ///
    /// Geometry is rebuilt at the cached render's size so a stretched stale
    /// bitmap still answers for the bar the user sees. Charts without a
    /// cached render report `HitResult::None`.
    #[must_use]
    pub fn hit_test_bar_at(&self, pointer: &PointerContext, spec: &ChartSpec) -> HitResult {
        let cached = {
            let registry = self.registry.borrow();
            registry
                .cached_data(pointer.chart_id)
                .zip(registry.cached_size(pointer.chart_id))
        };
        let Some((data, size)) = cached else {
            return HitResult::None;
        };

        let local = chart_local_coords(
            pointer.canvas_x,
            pointer.canvas_y,
            pointer.target,
            pointer.pixel_ratio,
        );
        let ratio = if pointer.pixel_ratio > 0.0 {
            pointer.pixel_ratio
        } else {
            1.0
        };
        let stretch = |cached: f64, target_physical: f64| {
            let target_logical = target_physical / ratio;
            if target_logical > 0.0 {
                cached / target_logical
            } else {
                1.0
            }
        };
        let x = local.x * stretch(size.logical_width, pointer.target.width);
        let y = local.y * stretch(size.logical_height, pointer.target.height);

        let layout = compute_layout(
            size.logical_width,
            size.logical_height,
            spec,
            &data,
            &self.theme,
        );
        match compute_bar_rects(&data, spec, &layout, &self.theme) {
            Ok(bars) => hit_test_bar_chart(x, y, &bars, &layout),
            Err(err) => {
                warn!(chart_id = %pointer.chart_id, error = %err, "bar hit test failed");
                HitResult::None
            }
        }
    }

    /// Marks the chart's cached bitmap stale; it keeps being served until a
    /// fresh render commits.
    pub fn invalidate_chart_cache(&self, chart_id: ChartId) {
        let version = self.registry.borrow_mut().invalidate(chart_id);
        debug!(chart_id = %chart_id, version, "chart cache invalidated");
    }

    /// Drops every version counter, cached bitmap and in-flight flag.
    pub fn invalidate_all_chart_caches(&self) {
        self.registry.borrow_mut().reset();
        debug!("all chart caches reset");
    }

    pub fn remove_chart_from_cache(&self, chart_id: ChartId) {
        self.registry.borrow_mut().evict(chart_id);
        debug!(chart_id = %chart_id, "chart evicted from cache");
    }

    #[must_use]
    pub fn cached_chart_data(&self, chart_id: ChartId) -> Option<Rc<ParsedChartData>> {
        self.registry.borrow().cached_data(chart_id)
    }

    #[must_use]
    pub fn render_stats(&self) -> RenderStats {
        self.registry.borrow().stats()
    }

    #[must_use]
    pub fn is_render_in_flight(&self, chart_id: ChartId) -> bool {
        self.registry.borrow().is_in_flight(chart_id)
    }

    #[must_use]
    pub fn chart_version(&self, chart_id: ChartId) -> u64 {
        self.registry.borrow().version(chart_id)
    }

    fn schedule_render(&self, frame: &FrameContext<'_>) -> bool {
        let ratio = frame.pixel_ratio;
        let size = match SurfaceSize::new(
            frame.target.width / ratio,
            frame.target.height / ratio,
            ratio,
        ) {
            Ok(size) => size,
            Err(err) => {
                warn!(chart_id = %frame.chart_id, error = %err, "chart region cannot be rendered");
                return false;
            }
        };

        let Some(ticket) = self.registry.borrow_mut().try_begin_render(frame.chart_id) else {
            trace!(chart_id = %frame.chart_id, "render already in flight");
            return false;
        };
        debug!(
            chart_id = %ticket.chart_id,
            version = ticket.version,
            ticket = ticket.ticket,
            "scheduling chart render"
        );

        let job = RenderJob {
            registry: Rc::clone(&self.registry),
            source: Rc::clone(&self.source),
            provider: Rc::clone(&self.provider),
            redraw: Rc::clone(&self.redraw),
            spec: frame.spec.clone(),
            theme: self.theme.clone(),
            ticket,
            size,
        };
        self.spawner.spawn_local(Box::pin(job.run()));
        true
    }
}

fn bitmap_content<B>(entry: &CachedRender<B>, freshness: Freshness) -> CompositeContent<B> {
    CompositeContent::Bitmap {
        bitmap: Rc::clone(&entry.bitmap),
        source_width: entry.size.pixel_width,
        source_height: entry.size.pixel_height,
        freshness,
    }
}

/// Frees the render slot when the job ends, however it ends.
struct InFlightGuard<B> {
    registry: SharedRegistry<B>,
    ticket: RenderTicket,
}

impl<B> Drop for InFlightGuard<B> {
    fn drop(&mut self) {
        match self.registry.try_borrow_mut() {
            Ok(mut registry) => {
                registry.release(&self.ticket);
            }
            Err(_) => warn!(
                chart_id = %self.ticket.chart_id,
                ticket = self.ticket.ticket,
                "registry busy; render slot not released"
            ),
        }
    }
}

struct RenderJob<D, P>
where
    P: SurfaceProvider,
{
    registry: SharedRegistry<ProviderBitmap<P>>,
    source: Rc<D>,
    provider: Rc<P>,
    redraw: Rc<dyn RedrawSignal>,
    spec: ChartSpec,
    theme: ChartTheme,
    ticket: RenderTicket,
    size: SurfaceSize,
}

impl<D, P> RenderJob<D, P>
where
    D: ChartDataSource,
    P: SurfaceProvider,
{
    async fn run(self) {
        let chart_id = self.ticket.chart_id;
        let guard = InFlightGuard {
            registry: Rc::clone(&self.registry),
            ticket: self.ticket,
        };

        let redraw = match self.render().await {
            Ok((bitmap, data)) => {
                let outcome = self.registry.borrow_mut().commit(
                    &self.ticket,
                    bitmap,
                    self.size,
                    Rc::new(data),
                );
                match outcome {
                    CommitOutcome::Stored => {
                        debug!(chart_id = %chart_id, version = self.ticket.version, "chart render committed");
                        true
                    }
                    CommitOutcome::Superseded { current_version } => {
                        debug!(
                            chart_id = %chart_id,
                            version = self.ticket.version,
                            current_version,
                            "discarding superseded chart render"
                        );
                        true
                    }
                    CommitOutcome::Evicted => {
                        debug!(chart_id = %chart_id, ticket = self.ticket.ticket, "discarding render of evicted chart");
                        false
                    }
                }
            }
            Err(err) => {
                if self.registry.borrow_mut().record_failure(&self.ticket) {
                    warn!(chart_id = %chart_id, error = %err, "chart render failed; keeping previous bitmap");
                } else {
                    debug!(chart_id = %chart_id, error = %err, "render of evicted chart failed");
                }
                false
            }
        };

        // the slot must be free before the host draws the next frame
        drop(guard);
        if redraw {
            self.redraw.request_redraw(chart_id);
        }
    }

    async fn render(&self) -> ChartResult<(ProviderBitmap<P>, ParsedChartData)> {
        let data = self.source.fetch_chart_data(&self.spec).await?;
        data.validate()?;

        let mut surface = self.provider.create_surface(self.size)?;
        let layout = compute_layout(
            self.size.logical_width,
            self.size.logical_height,
            &self.spec,
            &data,
            &self.theme,
        );
        paint(&mut surface, &data, &self.spec, &layout, &self.theme)?;
        let bitmap = surface.into_bitmap()?;
        Ok((bitmap, data))
    }
}
