use serde::{Deserialize, Serialize};

/// Paint layers of one chart, in the order they are composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasLayerKind {
    /// Canvas and plot-area fills.
    Background,
    /// Horizontal value grid lines.
    Grid,
    /// Axis lines, tick labels and axis titles.
    Axis,
    /// Bars.
    Series,
    /// Title and legend.
    Overlay,
}

impl CanvasLayerKind {
    /// Canonical back-to-front order.
    pub const ORDERED: [Self; 5] = [
        Self::Background,
        Self::Grid,
        Self::Axis,
        Self::Series,
        Self::Overlay,
    ];
}
