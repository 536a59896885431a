use crate::error::ChartResult;
use crate::render::{CanvasLayerKind, RenderFrame, Renderer};

/// Headless renderer that validates frames and keeps their primitive counts.
///
/// Used where only geometry matters: the snapshot CLI, tests and benches.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_line_count: usize,
    pub last_rect_count: usize,
    pub last_text_count: usize,
    /// Rects of the `Series` layer, i.e. painted bars.
    pub last_bar_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        (self.last_line_count, self.last_rect_count, self.last_text_count) = frame.counts();
        self.last_bar_count = frame
            .layer(CanvasLayerKind::Series)
            .map_or(0, |layer| layer.rects.len());
        self.frames_rendered += 1;
        Ok(())
    }
}
