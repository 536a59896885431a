mod bar_geometry;
mod composite;
mod data_source;
mod engine;
mod engine_config;
mod layout;
mod painter;
mod registry;
mod scheduling;
mod theme;

pub use bar_geometry::{BarRect, BarScales, bar_scales, bar_width, compute_bar_rects};
pub use composite::{
    ChartComposite, CompositeContent, FrameContext, Freshness, PointerContext,
};
pub use data_source::{CellTable, CellValue, ChartDataSource, TableDataSource};
pub use engine::ChartRenderEngine;
pub use engine_config::RenderEngineConfig;
pub use hit_test::{BarHit, HitResult, chart_local_coords, hit_test_bar_chart};
pub use layout::{BarChartLayout, compute_layout};
pub use painter::{build_bar_chart_frame, paint};
pub use registry::{
    CacheLookup, CachedRender, ChartRenderRegistry, CommitOutcome, RenderStats, RenderTicket,
};
pub use scheduling::{LocalSpawner, RedrawSignal, RenderTask, TokioLocalSpawner};
pub use theme::{ChartTheme, LayoutTuning, palette, series_color};
