//! Integration tests: SVG text → Document → recorded drawing operations.

use std::sync::Arc;

use kurbo::Point;
use pretty_assertions::assert_eq;
use svx_core::config::ImageHandle;
use svx_core::values::{Bounds, FillRule};
use svx_core::{Color, Config, Document, ExternalResolver, parse_str};
use svx_render::{Brush, Layer, Op, PaintMode, RecordingSurface, RenderOptions, render_document};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(input: &str) -> Document {
    init_logging();
    parse_str(input, &Config::default()).unwrap()
}

fn render_with(doc: &Document, config: &Config, options: &RenderOptions) -> RecordingSurface {
    let mut surface = RecordingSurface::new();
    render_document(doc, config, options, &mut surface).unwrap();
    assert_eq!(surface.depth(), 0, "save/restore must balance");
    surface
}

fn render(input: &str) -> RecordingSurface {
    render_with(&parse(input), &Config::default(), &RenderOptions::default())
}

fn brushes(surface: &RecordingSurface) -> Vec<Brush> {
    surface
        .ops()
        .iter()
        .filter_map(|op| match op {
            Op::DrawPath { paint, .. } | Op::DrawText { paint, .. } => Some(paint.brush.clone()),
            _ => None,
        })
        .collect()
}

fn first_concat(surface: &RecordingSurface) -> kurbo::Affine {
    surface
        .ops()
        .iter()
        .find_map(|op| match op {
            Op::Concat(t) => Some(*t),
            _ => None,
        })
        .expect("no transform emitted")
}

fn assert_near(actual: Point, expected: Point) {
    assert!(
        (actual - expected).hypot() < 1e-6,
        "expected {expected:?}, got {actual:?}"
    );
}

const RED: Color = Color(0xffff_0000);
const LIME: Color = Color(0xff00_ff00);
const BLUE: Color = Color(0xff00_00ff);

// ─── Shapes ──────────────────────────────────────────────────────────────────

#[test]
fn zero_stroke_width_draws_no_stroke() {
    let surface = render(include_str!("fixtures/shapes.svg"));
    // hairline rect fill, ring stroke; the empty rect draws nothing
    assert_eq!(surface.draws().len(), 2);
    assert_eq!(surface.stroke_count(), 1);
    assert_eq!(brushes(&surface), vec![Brush::Solid(RED), Brush::Solid(BLUE)]);

    let Op::DrawPath { paint, .. } = surface.draws()[1] else {
        panic!("expected a path");
    };
    let PaintMode::Stroke(stroke) = &paint.mode else {
        panic!("expected a stroke");
    };
    assert_eq!(stroke.width, 2.0);
}

// ─── References ──────────────────────────────────────────────────────────────

#[test]
fn missing_and_cyclic_references_are_skipped() {
    let surface = render(include_str!("fixtures/references.svg"));
    // only the rect inside #loop; every <use> resolves to nothing drawable
    assert_eq!(surface.draws().len(), 1);
}

#[test]
fn switch_renders_first_passing_child() {
    let surface = render(include_str!("fixtures/switch.svg"));
    assert_eq!(brushes(&surface), vec![Brush::Solid(LIME)]);
}

// ─── Paint servers and compositing ───────────────────────────────────────────

#[test]
fn gradients_solid_fallbacks_and_empty_servers() {
    let surface = render(include_str!("fixtures/paint_servers.svg"));
    let brushes = brushes(&surface);
    assert_eq!(brushes.len(), 4, "{brushes:#?}");

    let Brush::LinearGradient(linear) = &brushes[0] else {
        panic!("expected a linear gradient, got {:?}", brushes[0]);
    };
    let colors: Vec<(f32, Color)> = linear.stops.iter().map(|s| (s.offset, s.color)).collect();
    assert_eq!(colors, vec![(0.0, RED), (1.0, BLUE)]);
    // objectBoundingBox: the unit vector spans the rect
    assert_near(linear.transform * linear.start, Point::new(10.0, 20.0));
    assert_near(linear.transform * linear.end, Point::new(110.0, 20.0));

    // one stop paints a solid colour; stop-opacity lands in the alpha
    assert_eq!(brushes[1], Brush::Solid(Color(0x8000_ff00)));
    // unresolved reference uses the fallback colour
    assert_eq!(brushes[2], Brush::Solid(LIME));
}

#[test]
fn opacity_opens_a_layer_and_clip_path_clips() {
    let surface = render(include_str!("fixtures/paint_servers.svg"));
    let ops = surface.ops();
    assert!(ops.contains(&Op::SaveLayer(Layer::Opacity(0.5))));
    let clips: Vec<FillRule> = ops
        .iter()
        .filter_map(|op| match op {
            Op::ClipPath { rule, .. } => Some(*rule),
            _ => None,
        })
        .collect();
    assert_eq!(clips, vec![FillRule::NonZero]);
}

#[test]
fn bounding_box_clip_on_offset_use() {
    let surface = render(include_str!("fixtures/use_clip.svg"));
    assert_eq!(brushes(&surface), vec![Brush::Solid(LIME)]);

    let ops = surface.ops();
    let clip = ops
        .iter()
        .position(|op| matches!(op, Op::ClipPath { .. }))
        .expect("no clip emitted");
    let Op::ClipPath { path, .. } = &ops[clip] else {
        unreachable!();
    };
    // the x offset counts once: the clip covers the referenced rect where it lands
    assert_eq!(
        svx_render::geometry::path_bounds(path),
        Some(Bounds::new(100.0, 0.0, 10.0, 10.0))
    );
    let offset = ops
        .iter()
        .position(|op| *op == Op::Concat(kurbo::Affine::translate((100.0, 0.0))))
        .expect("no use offset emitted");
    assert!(clip < offset, "clip must be set up before the use offset");
}

#[test]
fn pattern_tiles_are_capped() {
    let surface = render(include_str!("fixtures/pattern_tiles.svg"));
    // the dust pattern would need ~1e65 tiles and is dropped; the grid tiles twice
    assert_eq!(brushes(&surface), vec![Brush::Solid(LIME), Brush::Solid(LIME)]);
}

// ─── Markers ─────────────────────────────────────────────────────────────────

#[test]
fn markers_at_start_mid_and_end() {
    let surface = render(include_str!("fixtures/markers.svg"));
    // the stroked path plus one marker rect per vertex
    assert_eq!(surface.draws().len(), 4);
    assert_eq!(surface.stroke_count(), 1);
}

// ─── Text ────────────────────────────────────────────────────────────────────

#[test]
fn text_anchor_and_tspan_offsets() {
    let surface = render(include_str!("fixtures/text.svg"));
    let runs: Vec<(&str, f32, f32)> = surface
        .ops()
        .iter()
        .filter_map(|op| match op {
            Op::DrawText { text, x, y, .. } => Some((text.as_str(), *x, *y)),
            _ => None,
        })
        .collect();
    // default metrics: half an em per character
    assert_eq!(
        runs,
        vec![("abcd", 90.0, 50.0), ("ab", 10.0, 20.0), ("cd", 25.0, 20.0)]
    );
    assert_eq!(
        brushes(&surface),
        vec![Brush::Solid(Color::BLACK), Brush::Solid(Color::BLACK), Brush::Solid(RED)]
    );
}

// ─── Viewports and options ───────────────────────────────────────────────────

#[test]
fn view_box_is_centred_in_the_viewport() {
    let surface = render(include_str!("fixtures/viewbox.svg"));
    let t = first_concat(&surface);
    assert_near(t * Point::new(0.0, 0.0), Point::new(50.0, 0.0));
    assert_near(t * Point::new(100.0, 100.0), Point::new(150.0, 100.0));
}

#[test]
fn options_override_view_box() {
    let doc = parse(include_str!("fixtures/viewbox.svg"));
    let options = RenderOptions::new().view_box(0.0, 0.0, 50.0, 50.0);
    let surface = render_with(&doc, &Config::default(), &options);
    let t = first_concat(&surface);
    assert_near(t * Point::new(0.0, 0.0), Point::new(50.0, 0.0));
    assert_near(t * Point::new(50.0, 50.0), Point::new(150.0, 100.0));
}

#[test]
fn target_renders_one_subtree() {
    let doc = parse(include_str!("fixtures/viewbox.svg"));
    let surface = render_with(&doc, &Config::default(), &RenderOptions::new().target("b"));
    assert_eq!(brushes(&surface), vec![Brush::Solid(LIME)]);
    // the group's transform still applies
    assert!(surface.ops().contains(&Op::Concat(kurbo::Affine::translate((1.0, 2.0)))));

    let missing = render_with(&doc, &Config::default(), &RenderOptions::new().target("nope"));
    assert!(missing.draws().is_empty());
}

#[test]
fn extra_css_and_target_pseudo_class() {
    let doc = parse(include_str!("fixtures/viewbox.svg"));
    let options = RenderOptions::new()
        .css("#a { fill: blue } rect:target { fill: red }")
        .target_element("b");
    let surface = render_with(&doc, &Config::default(), &options);
    assert_eq!(brushes(&surface), vec![Brush::Solid(BLUE), Brush::Solid(RED)]);

    // nothing is stored on the document between renders
    let plain = render_with(&doc, &Config::default(), &RenderOptions::default());
    assert_eq!(brushes(&plain), vec![Brush::Solid(RED), Brush::Solid(LIME)]);
}

// ─── External resources ──────────────────────────────────────────────────────

struct OneImage;

impl ExternalResolver for OneImage {
    fn resolve_image(&self, uri: &str) -> Option<ImageHandle> {
        (uri == "photo.png").then_some(ImageHandle {
            id: 7,
            width: 10.0,
            height: 10.0,
        })
    }
}

#[test]
fn images_come_from_the_resolver() {
    let doc = parse(include_str!("fixtures/image.svg"));
    let config = Config {
        resolver: Some(Arc::new(OneImage)),
        ..Config::default()
    };
    let surface = render_with(&doc, &config, &RenderOptions::default());
    let ids: Vec<u64> = surface
        .ops()
        .iter()
        .filter_map(|op| match op {
            Op::DrawBitmap { image, .. } => Some(image.id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![7]);

    // without a resolver nothing is drawn
    let bare = render_with(&doc, &Config::default(), &RenderOptions::default());
    assert!(bare.draws().is_empty());
}
