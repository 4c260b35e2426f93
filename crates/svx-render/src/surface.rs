//! The drawing surface the walker emits into, and the paint state attached
//! to each draw call.
//!
//! The renderer never rasterizes. A backend (a GPU scene builder, a
//! bitmap canvas, the [`RecordingSurface`](crate::RecordingSurface) used
//! in tests) implements [`DrawingSurface`] and decides what the
//! operations mean for it.

use kurbo::{Affine, Point, Rect};
use smallvec::SmallVec;
use svx_core::config::{FontHandle, ImageHandle};
use svx_core::model::SpreadMethod;
use svx_core::values::{FillRule, FontStyle, LineCap, LineJoin, TextDecoration};
use svx_core::{Color, PathProgram};

// ─── Surface ─────────────────────────────────────────────────────────────────

/// An ordered sink of drawing operations.
///
/// `save`/`save_layer` and `restore` are always balanced by the walker.
/// Transforms and clips are scoped by them.
pub trait DrawingSurface {
    /// Push the current transform and clip.
    fn save(&mut self);

    /// Pop the state pushed by the matching `save` or `save_layer`,
    /// compositing the layer if it was one.
    fn restore(&mut self);

    /// Pre-multiply the current transform by `transform`.
    fn concat(&mut self, transform: Affine);

    /// Intersect the clip with `rect` in current user space.
    fn clip_rect(&mut self, rect: Rect);

    /// Intersect the clip with the interior of `path`.
    fn clip_path(&mut self, path: &PathProgram, rule: FillRule);

    fn draw_path(&mut self, path: &PathProgram, paint: &PaintState);

    /// Draw a run of text with its baseline origin at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, paint: &PaintState);

    /// Draw an image at its intrinsic size with its top-left at `(x, y)`.
    fn draw_bitmap(&mut self, image: &ImageHandle, x: f32, y: f32, paint: &PaintState);

    /// Start an offscreen layer, composited on the matching `restore`.
    fn save_layer(&mut self, layer: Layer);

    /// Advance width of `text`. Surfaces with real font metrics should
    /// override the estimate.
    fn measure_text(&self, text: &str, font: &FontSpec) -> f32 {
        text.chars().count() as f32 * font.size * AVERAGE_ADVANCE
    }
}

/// Average glyph advance as a fraction of the font size, used by the
/// default [`DrawingSurface::measure_text`].
pub const AVERAGE_ADVANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer {
    /// Group opacity: the layer is composited with this alpha.
    Opacity(f32),
    /// The layer's luminance masks the enclosing layer when restored.
    LuminanceMask,
}

// ─── Paint ───────────────────────────────────────────────────────────────────

/// How a single draw call is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintState {
    pub brush: Brush,
    pub mode: PaintMode,
}

impl PaintState {
    #[must_use]
    pub fn fill(brush: Brush, rule: FillRule) -> Self {
        Self {
            brush,
            mode: PaintMode::Fill(rule),
        }
    }

    #[must_use]
    pub fn stroke(brush: Brush, stroke: StrokeStyle) -> Self {
        Self {
            brush,
            mode: PaintMode::Stroke(stroke),
        }
    }

    /// Opaque black fill, used for images where opacity is carried by layers.
    #[must_use]
    pub fn opaque() -> Self {
        Self::fill(Brush::Solid(Color::BLACK), FillRule::NonZero)
    }

    pub fn is_stroke(&self) -> bool {
        matches!(self.mode, PaintMode::Stroke(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintMode {
    Fill(FillRule),
    Stroke(StrokeStyle),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Brush {
    /// Colour with fill or stroke opacity already applied to its alpha.
    Solid(Color),
    LinearGradient(LinearBrush),
    RadialGradient(RadialBrush),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient vector, non-decreasing across stops.
    pub offset: f32,
    pub color: Color,
}

pub type GradientStops = SmallVec<[GradientStop; 4]>;

/// Gradient geometry is in gradient space; `transform` maps it into the
/// user space of the shape being painted.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearBrush {
    pub start: Point,
    pub end: Point,
    pub stops: GradientStops,
    pub spread: SpreadMethod,
    pub transform: Affine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialBrush {
    pub center: Point,
    pub radius: f64,
    pub focus: Point,
    pub stops: GradientStops,
    pub spread: SpreadMethod,
    pub transform: Affine,
}

/// Stroke geometry with every length already in user-space px.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    /// Even-length dash pattern, or empty for a solid line.
    pub dashes: SmallVec<[f32; 4]>,
    /// Offset into the dash pattern, in `0..pattern length`.
    pub dash_offset: f32,
    /// `vector-effect: non-scaling-stroke`.
    pub non_scaling: bool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dashes: SmallVec::new(),
            dash_offset: 0.0,
            non_scaling: false,
        }
    }
}

// ─── Text ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family names in preference order.
    pub families: Vec<String>,
    /// Font resolved by the external resolver, if any family matched.
    pub handle: Option<FontHandle>,
    /// Size in user-space px.
    pub size: f32,
    pub weight: u16,
    pub style: FontStyle,
    pub decoration: TextDecoration,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            families: Vec::new(),
            handle: None,
            size: 16.0,
            weight: 400,
            style: FontStyle::Normal,
            decoration: TextDecoration::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Null;

    impl DrawingSurface for Null {
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn concat(&mut self, _: Affine) {}
        fn clip_rect(&mut self, _: Rect) {}
        fn clip_path(&mut self, _: &PathProgram, _: FillRule) {}
        fn draw_path(&mut self, _: &PathProgram, _: &PaintState) {}
        fn draw_text(&mut self, _: &str, _: f32, _: f32, _: &FontSpec, _: &PaintState) {}
        fn draw_bitmap(&mut self, _: &ImageHandle, _: f32, _: f32, _: &PaintState) {}
        fn save_layer(&mut self, _: Layer) {}
    }

    #[test]
    fn default_text_measure_scales_with_size() {
        let font = FontSpec {
            size: 20.0,
            ..FontSpec::default()
        };
        assert_eq!(Null.measure_text("abcd", &font), 40.0);
        assert_eq!(Null.measure_text("", &font), 0.0);
    }

    #[test]
    fn paint_state_modes() {
        let fill = PaintState::opaque();
        assert!(!fill.is_stroke());
        let stroke = PaintState::stroke(Brush::Solid(Color::BLACK), StrokeStyle::default());
        assert!(stroke.is_stroke());
    }
}
