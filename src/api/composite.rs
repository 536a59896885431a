use std::rc::Rc;

use crate::core::{ChartId, ChartSpec, PixelRect};
use crate::render::{RectPrimitive, TextHAlign, TextPrimitive};

use super::ChartTheme;

const SELECTION_BORDER_PX: f64 = 2.0;
const HANDLE_SIZE_PX: f64 = 6.0;
const HANDLE_BORDER_PX: f64 = 1.0;

/// Per-frame input for one visible chart region.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub chart_id: ChartId,
    pub spec: &'a ChartSpec,
    /// Chart region on the canvas, in physical pixels.
    pub target: PixelRect,
    pub pixel_ratio: f64,
    pub selected: bool,
}

/// Pointer position on the canvas for a chart region, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerContext {
    pub chart_id: ChartId,
    pub canvas_x: f64,
    pub canvas_y: f64,
    pub target: PixelRect,
    pub pixel_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Current,
    /// Rendered before the latest invalidation; a refresh is pending or due.
    Stale,
}

/// What to draw in the chart region this frame.
///
/// Bitmaps are always drawn scaled to the target: after a resize the old
/// bitmap is stretched until the new render lands.
#[derive(Debug)]
pub enum CompositeContent<B> {
    Bitmap {
        bitmap: Rc<B>,
        source_width: u32,
        source_height: u32,
        freshness: Freshness,
    },
    Placeholder {
        background: RectPrimitive,
        label: TextPrimitive,
    },
}

/// Result of one `render_chart` call.
#[derive(Debug)]
pub struct ChartComposite<B> {
    pub chart_id: ChartId,
    pub target: PixelRect,
    pub content: CompositeContent<B>,
    /// An async render was started by this call.
    pub render_scheduled: bool,
    /// Selection border and resize handles, drawn over the content.
    pub decorations: Vec<RectPrimitive>,
}

impl<B> ChartComposite<B> {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, CompositeContent::Placeholder { .. })
    }

    #[must_use]
    pub fn freshness(&self) -> Option<Freshness> {
        match self.content {
            CompositeContent::Bitmap { freshness, .. } => Some(freshness),
            CompositeContent::Placeholder { .. } => None,
        }
    }
}

pub(crate) fn placeholder_content<B>(
    target: PixelRect,
    pixel_ratio: f64,
    label: &str,
    theme: &ChartTheme,
) -> CompositeContent<B> {
    let font_size = theme.axis_title_font_px * pixel_ratio;
    CompositeContent::Placeholder {
        background: RectPrimitive::new(
            target.x,
            target.y,
            target.width,
            target.height,
            theme.placeholder_fill,
        ),
        label: TextPrimitive::new(
            label,
            target.x + target.width / 2.0,
            target.y + (target.height - font_size) / 2.0,
            font_size,
            theme.placeholder_text,
            TextHAlign::Center,
        ),
    }
}

/// Border plus eight resize handles (corners and edge midpoints).
pub(crate) fn selection_decorations(
    target: PixelRect,
    pixel_ratio: f64,
    theme: &ChartTheme,
) -> Vec<RectPrimitive> {
    let mut decorations = Vec::with_capacity(9);
    decorations.push(RectPrimitive::outline(
        target.x,
        target.y,
        target.width,
        target.height,
        SELECTION_BORDER_PX * pixel_ratio,
        theme.selection,
    ));

    let handle = HANDLE_SIZE_PX * pixel_ratio;
    let xs = [target.x, target.x + target.width / 2.0, target.right()];
    let ys = [target.y, target.y + target.height / 2.0, target.bottom()];
    for (row, y) in ys.into_iter().enumerate() {
        for (col, x) in xs.into_iter().enumerate() {
            if row == 1 && col == 1 {
                continue;
            }
            decorations.push(
                RectPrimitive::new(
                    x - handle / 2.0,
                    y - handle / 2.0,
                    handle,
                    handle,
                    theme.selection_handle,
                )
                .with_border(HANDLE_BORDER_PX * pixel_ratio, theme.selection),
            );
        }
    }
    decorations
}
