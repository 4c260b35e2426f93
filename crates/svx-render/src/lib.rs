pub mod aspect;
pub mod geometry;
pub mod marker;
pub mod options;
pub mod paint;
pub mod recording;
pub mod surface;
pub mod text;
pub mod walker;

pub use aspect::view_box_transform;
pub use marker::{MarkerVertex, marker_vertices};
pub use options::RenderOptions;
pub use recording::{Op, RecordingSurface};
pub use surface::{
    Brush, DrawingSurface, FontSpec, GradientStop, GradientStops, Layer, LinearBrush, PaintMode, PaintState,
    RadialBrush, StrokeStyle,
};
pub use walker::{DEFAULT_VIEWPORT, Renderer};

use svx_core::{Config, Document, Result};

/// Render `doc` into `surface`.
///
/// Fails only when the options' extra style sheet cannot be parsed. Missing
/// references, unresolvable resources and reference cycles are logged and
/// skipped, so whatever can be drawn still is.
pub fn render_document<S: DrawingSurface + ?Sized>(
    doc: &Document,
    config: &Config,
    options: &RenderOptions,
    surface: &mut S,
) -> Result<()> {
    Renderer::new(doc, config, options, surface)?.render();
    Ok(())
}
