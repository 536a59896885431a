use cairo::{Context, Format, ImageSurface, LineCap};
use pango::FontDescription;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, LinePrimitive, OffscreenSurface, RectPrimitive, RenderFrame, Renderer, SurfaceProvider,
    SurfaceSize, TextHAlign, TextPrimitive,
};

/// Primitive counts of the last frame painted by a `CairoRenderer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub texts_drawn: usize,
}

/// Off-screen ARGB32 image surface painted with Cairo and Pango.
///
/// Frames arrive in logical pixels; the context is scaled once by the
/// surface's pixel ratio, so the image comes out at physical resolution.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    pixel_ratio: f64,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    /// Surface of exactly `width × height` physical pixels at ratio 1.
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidViewport {
                width: width.max(0).unsigned_abs(),
                height: height.max(0).unsigned_abs(),
            });
        }
        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create image surface", err))?;
        Ok(Self {
            surface,
            pixel_ratio: 1.0,
            last_stats: CairoRenderStats::default(),
        })
    }

    pub fn for_surface_size(size: SurfaceSize) -> ChartResult<Self> {
        let to_i32 = |pixels: u32| {
            i32::try_from(pixels).map_err(|_| {
                ChartError::SurfaceUnavailable(format!("{pixels} px exceeds cairo limits"))
            })
        };
        let mut renderer = Self::new(to_i32(size.pixel_width)?, to_i32(size.pixel_height)?)?;
        renderer.pixel_ratio = size.pixel_ratio;
        Ok(renderer)
    }

    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        context.scale(self.pixel_ratio, self.pixel_ratio);
        context.set_line_cap(LineCap::Butt);

        let mut stats = CairoRenderStats::default();
        for layer in &frame.layers {
            for rect in &layer.rects {
                draw_rect(&context, *rect)?;
            }
            for line in &layer.lines {
                draw_line(&context, *line)?;
            }
            for text in &layer.texts {
                draw_text(&context, text)?;
            }
            stats.rects_drawn += layer.rects.len();
            stats.lines_drawn += layer.lines.len();
            stats.texts_drawn += layer.texts.len();
        }
        self.last_stats = stats;
        Ok(())
    }
}

impl OffscreenSurface for CairoRenderer {
    type Bitmap = ImageSurface;

    fn into_bitmap(self) -> ChartResult<Self::Bitmap> {
        self.surface.flush();
        Ok(self.surface)
    }
}

/// Hands out one fresh `CairoRenderer` per chart render.
#[derive(Debug, Clone, Copy, Default)]
pub struct CairoSurfaceProvider;

impl SurfaceProvider for CairoSurfaceProvider {
    type Surface = CairoRenderer;

    fn create_surface(&self, size: SurfaceSize) -> ChartResult<Self::Surface> {
        CairoRenderer::for_surface_size(size).map_err(|err| match err {
            ChartError::SurfaceUnavailable(message) => ChartError::SurfaceUnavailable(message),
            other => ChartError::SurfaceUnavailable(other.to_string()),
        })
    }
}

fn set_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn draw_line(context: &Context, line: LinePrimitive) -> ChartResult<()> {
    set_color(context, line.color);
    context.set_line_width(line.stroke_width);
    context.move_to(line.x1, line.y1);
    context.line_to(line.x2, line.y2);
    context
        .stroke()
        .map_err(|err| map_backend_error("failed to stroke line", err))
}

pub(crate) fn draw_rect(context: &Context, rect: RectPrimitive) -> ChartResult<()> {
    context.rectangle(rect.x, rect.y, rect.width, rect.height);
    if rect.fill_color.alpha > 0.0 {
        set_color(context, rect.fill_color);
        context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill rect", err))?;
    }
    if rect.border_width > 0.0 {
        set_color(context, rect.border_color);
        context.set_line_width(rect.border_width);
        context
            .stroke_preserve()
            .map_err(|err| map_backend_error("failed to stroke rect border", err))?;
    }
    context.new_path();
    Ok(())
}

pub(crate) fn draw_text(context: &Context, text: &TextPrimitive) -> ChartResult<()> {
    let layout = pangocairo::functions::create_layout(context);
    let font = FontDescription::from_string(&format!("Sans {}", text.font_size_px));
    layout.set_font_description(Some(&font));
    layout.set_text(&text.text);

    let (width, _) = layout.pixel_size();
    let anchor_x = match text.h_align {
        TextHAlign::Left => 0.0,
        TextHAlign::Center => -f64::from(width) / 2.0,
        TextHAlign::Right => -f64::from(width),
    };

    context
        .save()
        .map_err(|err| map_backend_error("failed to save context", err))?;
    context.translate(text.x, text.y);
    context.rotate(text.rotation_deg.to_radians());
    set_color(context, text.color);
    context.move_to(anchor_x, 0.0);
    pangocairo::functions::show_layout(context, &layout);
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore context", err))
}

pub(crate) fn map_backend_error(what: &str, err: cairo::Error) -> ChartError {
    ChartError::SurfaceUnavailable(format!("{what}: {err}"))
}
