pub mod data;
pub mod format;
pub mod scale;
pub mod spec;
pub mod types;

pub use data::{ParsedChartData, Series};
pub use format::format_tick_value;
pub use scale::{BandScale, DEFAULT_TICK_COUNT, LinearScale, Ticks, nice_domain, nice_step};
pub use spec::{
    AxisSpec, ChartSpec, DataRangeRef, LabelAngle, LegendPosition, LegendSpec, MarkType,
    SeriesDef, SeriesOrientation,
};
pub use types::{ChartId, LocalPoint, Margin, PixelRect, Viewport};
