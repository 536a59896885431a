use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{CanvasLayerKind, LinePrimitive, RectPrimitive, TextPrimitive};

/// Primitives of a single paint layer.
///
/// Backends draw rects first, then lines, then texts within a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPrimitives {
    pub kind: CanvasLayerKind,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl LayerPrimitives {
    #[must_use]
    fn empty(kind: CanvasLayerKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }
}

/// Backend-agnostic scene for one chart draw pass, split into layers in
/// canonical composite order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub layers: Vec<LayerPrimitives>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: CanvasLayerKind::ORDERED
                .into_iter()
                .map(LayerPrimitives::empty)
                .collect(),
        }
    }

    pub fn push_line(&mut self, kind: CanvasLayerKind, line: LinePrimitive) {
        self.layer_mut(kind).lines.push(line);
    }

    pub fn push_rect(&mut self, kind: CanvasLayerKind, rect: RectPrimitive) {
        self.layer_mut(kind).rects.push(rect);
    }

    pub fn push_text(&mut self, kind: CanvasLayerKind, text: TextPrimitive) {
        self.layer_mut(kind).texts.push(text);
    }

    #[must_use]
    pub fn layer(&self, kind: CanvasLayerKind) -> Option<&LayerPrimitives> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    fn layer_mut(&mut self, kind: CanvasLayerKind) -> &mut LayerPrimitives {
        let position = match self.layers.iter().position(|layer| layer.kind == kind) {
            Some(position) => position,
            None => {
                self.layers.push(LayerPrimitives::empty(kind));
                self.layers.len() - 1
            }
        };
        &mut self.layers[position]
    }

    /// All primitives counted across layers as `(lines, rects, texts)`.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        self.layers.iter().fold((0, 0, 0), |(lines, rects, texts), layer| {
            (
                lines + layer.lines.len(),
                rects + layer.rects.len(),
                texts + layer.texts.len(),
            )
        })
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for layer in &self.layers {
            for line in &layer.lines {
                line.validate()?;
            }
            for rect in &layer.rects {
                rect.validate()?;
            }
            for text in &layer.texts {
                text.validate()?;
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(LayerPrimitives::is_empty)
    }

    /// Copy of the frame with every coordinate multiplied by `factor`, used to
    /// bake a device pixel ratio into a recorded bitmap.
    #[must_use]
    pub fn scaled(&self, factor: f64, viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: self
                .layers
                .iter()
                .map(|layer| LayerPrimitives {
                    kind: layer.kind,
                    lines: layer.lines.iter().map(|line| line.scaled(factor)).collect(),
                    rects: layer.rects.iter().map(|rect| rect.scaled(factor)).collect(),
                    texts: layer.texts.iter().map(|text| text.scaled(factor)).collect(),
                })
                .collect(),
        }
    }
}
