//! A [`DrawingSurface`] that records every operation, for tests and for
//! callers that want to replay a render later.

use kurbo::{Affine, Rect};
use svx_core::config::ImageHandle;
use svx_core::values::FillRule;
use svx_core::PathProgram;

use crate::surface::{DrawingSurface, FontSpec, Layer, PaintState};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Save,
    Restore,
    Concat(Affine),
    ClipRect(Rect),
    ClipPath {
        path: PathProgram,
        rule: FillRule,
    },
    DrawPath {
        path: PathProgram,
        paint: PaintState,
    },
    DrawText {
        text: String,
        x: f32,
        y: f32,
        font: FontSpec,
        paint: PaintState,
    },
    DrawBitmap {
        image: ImageHandle,
        x: f32,
        y: f32,
    },
    SaveLayer(Layer),
}

impl Op {
    /// True for operations that put pixels on the surface.
    pub fn is_draw(&self) -> bool {
        matches!(self, Op::DrawPath { .. } | Op::DrawText { .. } | Op::DrawBitmap { .. })
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<Op>,
    depth: usize,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Only the drawing operations, in order.
    pub fn draws(&self) -> Vec<&Op> {
        self.ops.iter().filter(|op| op.is_draw()).collect()
    }

    /// Number of `draw_path` calls painted with a stroke.
    pub fn stroke_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::DrawPath { paint, .. } if paint.is_stroke()))
            .count()
    }

    /// Texts passed to `draw_text`, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Current save nesting. Zero once a render has finished.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl DrawingSurface for RecordingSurface {
    fn save(&mut self) {
        self.depth += 1;
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.ops.push(Op::Restore);
    }

    fn concat(&mut self, transform: Affine) {
        self.ops.push(Op::Concat(transform));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(Op::ClipRect(rect));
    }

    fn clip_path(&mut self, path: &PathProgram, rule: FillRule) {
        self.ops.push(Op::ClipPath {
            path: path.clone(),
            rule,
        });
    }

    fn draw_path(&mut self, path: &PathProgram, paint: &PaintState) {
        self.ops.push(Op::DrawPath {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, paint: &PaintState) {
        self.ops.push(Op::DrawText {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            paint: paint.clone(),
        });
    }

    fn draw_bitmap(&mut self, image: &ImageHandle, x: f32, y: f32, _paint: &PaintState) {
        self.ops.push(Op::DrawBitmap {
            image: image.clone(),
            x,
            y,
        });
    }

    fn save_layer(&mut self, layer: Layer) {
        self.depth += 1;
        self.ops.push(Op::SaveLayer(layer));
    }
}
