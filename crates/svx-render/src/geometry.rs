//! Basic shapes as path programs, path transforms and bounding boxes.

use kurbo::{Affine, Point, Shape};
use svx_core::path::{ArcSegment, PathSink};
use svx_core::values::LengthContext;
use svx_core::{Bounds, Length, NodeKind, PathProgram};

/// Outline of a shape element, or `None` when the element draws nothing
/// (zero width or radius, fewer than two points, empty path data).
pub fn shape_path(kind: &NodeKind, ctx: &LengthContext) -> Option<PathProgram> {
    let x = |l: &Option<Length>| l.map_or(0.0, |l| l.to_px_x(ctx));
    let y = |l: &Option<Length>| l.map_or(0.0, |l| l.to_px_y(ctx));
    match kind {
        NodeKind::Path(data) => (!data.d.is_empty()).then(|| data.d.clone()),
        NodeKind::Rect(r) => {
            let width = r.width.map(|l| l.to_px_x(ctx))?;
            let height = r.height.map(|l| l.to_px_y(ctx))?;
            rect_path(
                x(&r.x),
                y(&r.y),
                width,
                height,
                r.rx.map(|l| l.to_px_x(ctx)),
                r.ry.map(|l| l.to_px_y(ctx)),
            )
        }
        NodeKind::Circle(c) => {
            let r = c.r.map(|l| l.to_px(ctx))?;
            ellipse_path(x(&c.cx), y(&c.cy), r, r)
        }
        NodeKind::Ellipse(e) => {
            let rx = e.rx.map(|l| l.to_px_x(ctx))?;
            let ry = e.ry.map(|l| l.to_px_y(ctx))?;
            ellipse_path(x(&e.cx), y(&e.cy), rx, ry)
        }
        NodeKind::Line(l) => Some(line_path(x(&l.x1), y(&l.y1), x(&l.x2), y(&l.y2))),
        NodeKind::Polyline(points) => poly_path(points, false),
        NodeKind::Polygon(points) => poly_path(points, true),
        _ => None,
    }
}

/// Rectangle, rounded when `rx`/`ry` are non-zero. A missing radius takes
/// the other's value and both are clamped to half the side they round.
pub fn rect_path(x: f32, y: f32, width: f32, height: f32, rx: Option<f32>, ry: Option<f32>) -> Option<PathProgram> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let (rx, ry) = match (rx, ry) {
        (None, None) => (0.0, 0.0),
        (Some(rx), None) => (rx, rx),
        (None, Some(ry)) => (ry, ry),
        (Some(rx), Some(ry)) => (rx, ry),
    };
    let rx = rx.clamp(0.0, width / 2.0);
    let ry = ry.clamp(0.0, height / 2.0);

    let mut path = PathProgram::new();
    if rx == 0.0 || ry == 0.0 {
        path.move_to(x, y);
        path.line_to(x + width, y);
        path.line_to(x + width, y + height);
        path.line_to(x, y + height);
        path.close();
        return Some(path);
    }

    let (right, bottom) = (x + width, y + height);
    path.move_to(x + rx, y);
    path.line_to(right - rx, y);
    corner(&mut path, (right - rx, y), rx, ry, right, y + ry);
    path.line_to(right, bottom - ry);
    corner(&mut path, (right, bottom - ry), rx, ry, right - rx, bottom);
    path.line_to(x + rx, bottom);
    corner(&mut path, (x + rx, bottom), rx, ry, x, bottom - ry);
    path.line_to(x, y + ry);
    corner(&mut path, (x, y + ry), rx, ry, x + rx, y);
    path.close();
    Some(path)
}

fn corner(path: &mut PathProgram, from: (f32, f32), rx: f32, ry: f32, x: f32, y: f32) {
    path.arc_to(from, &quarter_arc(rx, ry, x, y));
}

fn quarter_arc(rx: f32, ry: f32, x: f32, y: f32) -> ArcSegment {
    ArcSegment {
        rx,
        ry,
        rotation: 0.0,
        large_arc: false,
        sweep: true,
        x,
        y,
    }
}

/// Ellipse as four clockwise quarter arcs starting at the rightmost point.
pub fn ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<PathProgram> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    let points = [
        (cx + rx, cy),
        (cx, cy + ry),
        (cx - rx, cy),
        (cx, cy - ry),
        (cx + rx, cy),
    ];
    let mut path = PathProgram::new();
    path.move_to(points[0].0, points[0].1);
    for pair in points.windows(2) {
        let (x, y) = pair[1];
        path.arc_to(pair[0], &quarter_arc(rx, ry, x, y));
    }
    path.close();
    Some(path)
}

pub fn line_path(x1: f32, y1: f32, x2: f32, y2: f32) -> PathProgram {
    let mut path = PathProgram::new();
    path.move_to(x1, y1);
    path.line_to(x2, y2);
    path
}

/// Polyline or polygon through flat `x, y` pairs.
pub fn poly_path(points: &[f32], close: bool) -> Option<PathProgram> {
    if points.len() < 4 {
        return None;
    }
    let mut path = PathProgram::new();
    let mut pairs = points.chunks_exact(2);
    let first = pairs.next()?;
    path.move_to(first[0], first[1]);
    for p in pairs {
        path.line_to(p[0], p[1]);
    }
    if close {
        path.close();
    }
    Some(path)
}

// ─── Transforms and bounds ───────────────────────────────────────────────────

/// Apply `transform` to every point of `path`. Arcs are flattened to
/// cubics, since an affine map does not keep them axis-aligned.
pub fn transform_path(path: &PathProgram, transform: Affine) -> PathProgram {
    if transform == Affine::IDENTITY {
        return path.clone();
    }
    let mut out = PathProgram::new();
    path.replay(&mut Transformed {
        out: &mut out,
        transform,
    });
    out
}

struct Transformed<'a> {
    out: &'a mut PathProgram,
    transform: Affine,
}

impl Transformed<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        let p = self.transform * Point::new(f64::from(x), f64::from(y));
        (p.x as f32, p.y as f32)
    }
}

impl PathSink for Transformed<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.out.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.out.line_to(x, y);
    }

    fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.out.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.out.quad_to(x1, y1, x, y);
    }

    fn close(&mut self) {
        self.out.close();
    }
}

/// Tight bounding box of the path geometry, control points excluded.
pub fn path_bounds(path: &PathProgram) -> Option<Bounds> {
    if path.is_empty() {
        return None;
    }
    Some(Bounds::from_rect(path.to_bez_path().bounding_box()))
}

/// Bounding box of `bounds` after `transform`.
pub fn transform_bounds(bounds: &Bounds, transform: Affine) -> Bounds {
    Bounds::from_rect(transform.transform_rect_bbox(bounds.to_rect()))
}

/// Map from a unit square onto `bounds`, for `objectBoundingBox` units.
pub fn bbox_transform(bounds: &Bounds) -> Affine {
    Affine::translate((f64::from(bounds.min_x), f64::from(bounds.min_y)))
        * Affine::scale_non_uniform(f64::from(bounds.width), f64::from(bounds.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svx_core::{PathSegment, RectShape, Unit};

    fn ctx() -> LengthContext {
        LengthContext {
            dpi: 96.0,
            font_size: 16.0,
            viewport: Bounds::new(0.0, 0.0, 200.0, 100.0),
        }
    }

    #[test]
    fn plain_rect_is_closed_polygon() {
        let path = rect_path(1.0, 2.0, 10.0, 5.0, None, None).unwrap();
        let segs: Vec<PathSegment> = path.segments().collect();
        assert_eq!(
            segs,
            vec![
                PathSegment::MoveTo(1.0, 2.0),
                PathSegment::LineTo(11.0, 2.0),
                PathSegment::LineTo(11.0, 7.0),
                PathSegment::LineTo(1.0, 7.0),
                PathSegment::Close,
            ]
        );
    }

    #[test]
    fn rounded_rect_completes_and_clamps_radii() {
        let path = rect_path(0.0, 0.0, 10.0, 4.0, Some(3.0), None).unwrap();
        let arcs: Vec<(f32, f32)> = path
            .segments()
            .filter_map(|s| match s {
                PathSegment::ArcTo(a) => Some((a.rx, a.ry)),
                _ => None,
            })
            .collect();
        // ry copies rx, then clamps to half the height
        assert_eq!(arcs, vec![(3.0, 2.0); 4]);
    }

    #[test]
    fn zero_sized_shapes_draw_nothing() {
        assert!(rect_path(0.0, 0.0, 0.0, 10.0, None, None).is_none());
        assert!(ellipse_path(0.0, 0.0, 0.0, 1.0).is_none());
        assert!(poly_path(&[1.0, 2.0], false).is_none());
        let rect = NodeKind::Rect(RectShape {
            width: Some(Length::px(10.0)),
            ..RectShape::default()
        });
        assert!(shape_path(&rect, &ctx()).is_none());
    }

    #[test]
    fn percentages_resolve_against_viewport() {
        let rect = NodeKind::Rect(RectShape {
            width: Some(Length::new(50.0, Unit::Percent)),
            height: Some(Length::new(50.0, Unit::Percent)),
            ..RectShape::default()
        });
        let path = shape_path(&rect, &ctx()).unwrap();
        assert_eq!(path_bounds(&path), Some(Bounds::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn circle_bounds() {
        let path = ellipse_path(10.0, 10.0, 5.0, 5.0).unwrap();
        let b = path_bounds(&path).unwrap();
        assert!((b.min_x - 5.0).abs() < 1e-3, "{b:?}");
        assert!((b.width - 10.0).abs() < 1e-3, "{b:?}");
    }

    #[test]
    fn transformed_paths_and_boxes() {
        let path = poly_path(&[0.0, 0.0, 10.0, 0.0, 10.0, 10.0], true).unwrap();
        let moved = transform_path(&path, Affine::translate((5.0, 1.0)));
        assert_eq!(path_bounds(&moved), Some(Bounds::new(5.0, 1.0, 10.0, 10.0)));

        let b = transform_bounds(&Bounds::new(0.0, 0.0, 2.0, 3.0), Affine::scale(2.0));
        assert_eq!(b, Bounds::new(0.0, 0.0, 4.0, 6.0));
        let unit = bbox_transform(&Bounds::new(10.0, 20.0, 4.0, 8.0)) * Point::new(0.5, 0.5);
        assert_eq!(unit, Point::new(12.0, 24.0));
    }
}
