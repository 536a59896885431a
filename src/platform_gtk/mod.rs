use gtk4 as gtk;

use cairo::{Context, ImageSurface};
use gtk::glib;
use gtk::prelude::*;

use crate::api::{ChartComposite, CompositeContent, LocalSpawner, RedrawSignal, RenderTask};
use crate::core::ChartId;
use crate::error::ChartResult;
use crate::render::{draw_rect, draw_text, map_backend_error};

/// Queues a redraw of the `DrawingArea` hosting the grid canvas.
#[derive(Debug, Clone)]
pub struct GtkRedrawSignal {
    area: gtk::DrawingArea,
}

impl GtkRedrawSignal {
    #[must_use]
    pub fn new(area: gtk::DrawingArea) -> Self {
        Self { area }
    }
}

impl RedrawSignal for GtkRedrawSignal {
    fn request_redraw(&self, _chart_id: ChartId) {
        self.area.queue_draw();
    }
}

/// Runs render jobs on the default glib main context.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlibLocalSpawner;

impl LocalSpawner for GlibLocalSpawner {
    fn spawn_local(&self, task: RenderTask) {
        drop(glib::MainContext::default().spawn_local(task));
    }
}

/// Draws one composite onto the canvas context inside a `DrawingArea`
/// draw callback. The bitmap is scaled to the target rectangle.
pub fn composite_on_cairo(
    context: &Context,
    composite: &ChartComposite<ImageSurface>,
) -> ChartResult<()> {
    let target = composite.target;
    match &composite.content {
        CompositeContent::Bitmap {
            bitmap,
            source_width,
            source_height,
            ..
        } => {
            let surface: &ImageSurface = bitmap;
            context
                .save()
                .map_err(|err| map_backend_error("failed to save context", err))?;
            context.translate(target.x, target.y);
            if *source_width > 0 && *source_height > 0 {
                context.scale(
                    target.width / f64::from(*source_width),
                    target.height / f64::from(*source_height),
                );
            }
            context
                .set_source_surface(surface, 0.0, 0.0)
                .map_err(|err| map_backend_error("failed to set bitmap source", err))?;
            context
                .paint()
                .map_err(|err| map_backend_error("failed to paint bitmap", err))?;
            context
                .restore()
                .map_err(|err| map_backend_error("failed to restore context", err))?;
        }
        CompositeContent::Placeholder { background, label } => {
            draw_rect(context, *background)?;
            draw_text(context, label)?;
        }
    }

    for decoration in &composite.decorations {
        draw_rect(context, *decoration)?;
    }
    Ok(())
}
