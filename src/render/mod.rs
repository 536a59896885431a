mod frame;
mod layer_stack;
mod null_renderer;
mod primitives;
mod recording;

pub use frame::{LayerPrimitives, RenderFrame};
pub use layer_stack::CanvasLayerKind;
pub use null_renderer::NullRenderer;
pub use primitives::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};
pub use recording::{RecordedBitmap, RecordingSurface, RecordingSurfaceProvider, SurfaceSize};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from chart domain and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

/// Off-screen target a render pipeline paints into before the result is
/// handed to the bitmap cache.
///
/// Frames arrive in logical pixels; the surface applies its device pixel
/// ratio once so the bitmap comes out at physical resolution.
pub trait OffscreenSurface: Renderer {
    type Bitmap: 'static;

    fn into_bitmap(self) -> ChartResult<Self::Bitmap>;
}

/// Factory for fresh off-screen surfaces, one per render.
pub trait SurfaceProvider {
    type Surface: OffscreenSurface;

    /// Fails with `ChartError::SurfaceUnavailable` when the backend cannot
    /// allocate a drawing context of the requested size.
    fn create_surface(&self, size: SurfaceSize) -> ChartResult<Self::Surface>;
}

/// Bitmap type produced by a provider's surfaces.
pub type ProviderBitmap<P> = <<P as SurfaceProvider>::Surface as OffscreenSurface>::Bitmap;

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoRenderStats, CairoRenderer, CairoSurfaceProvider};
#[cfg(feature = "gtk4-adapter")]
pub(crate) use cairo_backend::{draw_rect, draw_text, map_backend_error};
