use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{OffscreenSurface, RenderFrame, Renderer, SurfaceProvider};

/// Logical and physical dimensions of an off-screen surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub logical_width: f64,
    pub logical_height: f64,
    pub pixel_ratio: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl SurfaceSize {
    /// Physical size is `logical × pixel_ratio`, rounded, and at least 1×1.
    pub fn new(logical_width: f64, logical_height: f64, pixel_ratio: f64) -> ChartResult<Self> {
        if !logical_width.is_finite()
            || !logical_height.is_finite()
            || logical_width <= 0.0
            || logical_height <= 0.0
        {
            return Err(ChartError::InvalidData(
                "surface logical size must be finite and > 0".to_owned(),
            ));
        }
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "device pixel ratio must be finite and > 0".to_owned(),
            ));
        }

        let to_pixels = |logical: f64| (logical * pixel_ratio).round().clamp(1.0, u32::MAX as f64) as u32;
        Ok(Self {
            logical_width,
            logical_height,
            pixel_ratio,
            pixel_width: to_pixels(logical_width),
            pixel_height: to_pixels(logical_height),
        })
    }

    #[must_use]
    pub fn physical_viewport(self) -> Viewport {
        Viewport::new(self.pixel_width, self.pixel_height)
    }
}

/// Bitmap that keeps the painted scene as a display list at physical
/// resolution instead of rasterized pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBitmap {
    pub size: SurfaceSize,
    pub frame: RenderFrame,
}

/// Headless off-screen surface that records the last frame painted into it.
#[derive(Debug)]
pub struct RecordingSurface {
    size: SurfaceSize,
    recorded: Option<RenderFrame>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            recorded: None,
        }
    }

    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }
}

impl Renderer for RecordingSurface {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.recorded = Some(frame.scaled(self.size.pixel_ratio, self.size.physical_viewport()));
        Ok(())
    }
}

impl OffscreenSurface for RecordingSurface {
    type Bitmap = RecordedBitmap;

    fn into_bitmap(self) -> ChartResult<Self::Bitmap> {
        let frame = self.recorded.ok_or_else(|| {
            ChartError::SurfaceUnavailable("nothing was painted on the surface".to_owned())
        })?;
        Ok(RecordedBitmap {
            size: self.size,
            frame,
        })
    }
}

/// Provider of `RecordingSurface`s with an optional physical pixel budget,
/// mirroring backends that refuse oversized contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingSurfaceProvider {
    max_pixels: Option<u64>,
}

impl RecordingSurfaceProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = Some(max_pixels);
        self
    }
}

impl SurfaceProvider for RecordingSurfaceProvider {
    type Surface = RecordingSurface;

    fn create_surface(&self, size: SurfaceSize) -> ChartResult<Self::Surface> {
        let pixels = u64::from(size.pixel_width) * u64::from(size.pixel_height);
        if let Some(max_pixels) = self.max_pixels {
            if pixels > max_pixels {
                return Err(ChartError::SurfaceUnavailable(format!(
                    "{}x{} exceeds the {max_pixels} pixel budget",
                    size.pixel_width, size.pixel_height
                )));
            }
        }
        Ok(RecordingSurface::new(size))
    }
}
