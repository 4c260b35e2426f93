//! Path data: the compact [`PathProgram`] encoding, the `d` attribute
//! grammar, and elliptical-arc to cubic Bézier conversion.

use kurbo::{Affine, BezPath, Point};
use serde::{Deserialize, Serialize};

use crate::scanner::TextScanner;

// ─── Encoding ────────────────────────────────────────────────────────────

const OP_MOVE: u8 = 0;
const OP_LINE: u8 = 1;
const OP_CUBIC: u8 = 2;
const OP_QUAD: u8 = 3;
/// Arc opcodes occupy `4..=7`; bit 1 is the large-arc flag, bit 0 sweep.
const OP_ARC: u8 = 4;
const OP_CLOSE: u8 = 8;

/// One endpoint-parameterised elliptical arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub rx: f32,
    pub ry: f32,
    /// X-axis rotation in degrees.
    pub rotation: f32,
    pub large_arc: bool,
    pub sweep: bool,
    pub x: f32,
    pub y: f32,
}

/// A decoded path command with absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CubicTo(f32, f32, f32, f32, f32, f32),
    QuadTo(f32, f32, f32, f32),
    ArcTo(ArcSegment),
    Close,
}

/// Receiver of path commands.
///
/// Arcs are delivered with the current point so sinks without native arc
/// support can use the default, which flattens to cubics.
pub trait PathSink {
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32);
    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32);
    fn close(&mut self);

    fn arc_to(&mut self, from: (f32, f32), arc: &ArcSegment) {
        arc_to_cubics(self, from, arc);
    }
}

/// Append-only opcode stream plus a parallel coordinate stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathProgram {
    ops: Vec<u8>,
    coords: Vec<f32>,
}

impl PathProgram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn opcodes(&self) -> &[u8] {
        &self.ops
    }

    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    /// Decode the program into segments.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            program: self,
            op: 0,
            coord: 0,
        }
    }

    /// Replay every command into `sink`, in order.
    pub fn replay<S: PathSink + ?Sized>(&self, sink: &mut S) {
        let mut current = (0.0, 0.0);
        let mut start = (0.0, 0.0);
        for seg in self.segments() {
            match seg {
                PathSegment::MoveTo(x, y) => {
                    sink.move_to(x, y);
                    current = (x, y);
                    start = current;
                }
                PathSegment::LineTo(x, y) => {
                    sink.line_to(x, y);
                    current = (x, y);
                }
                PathSegment::CubicTo(x1, y1, x2, y2, x, y) => {
                    sink.cubic_to(x1, y1, x2, y2, x, y);
                    current = (x, y);
                }
                PathSegment::QuadTo(x1, y1, x, y) => {
                    sink.quad_to(x1, y1, x, y);
                    current = (x, y);
                }
                PathSegment::ArcTo(arc) => {
                    sink.arc_to(current, &arc);
                    current = (arc.x, arc.y);
                }
                PathSegment::Close => {
                    sink.close();
                    current = start;
                }
            }
        }
    }

    /// Convert to a kurbo path. Arcs become cubics.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        self.replay(&mut path);
        path
    }
}

impl PathSink for PathProgram {
    fn move_to(&mut self, x: f32, y: f32) {
        self.ops.push(OP_MOVE);
        self.coords.extend([x, y]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ops.push(OP_LINE);
        self.coords.extend([x, y]);
    }

    fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.ops.push(OP_CUBIC);
        self.coords.extend([x1, y1, x2, y2, x, y]);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.ops.push(OP_QUAD);
        self.coords.extend([x1, y1, x, y]);
    }

    fn close(&mut self) {
        self.ops.push(OP_CLOSE);
    }

    fn arc_to(&mut self, _from: (f32, f32), arc: &ArcSegment) {
        self.ops
            .push(OP_ARC | (u8::from(arc.large_arc) << 1) | u8::from(arc.sweep));
        self.coords
            .extend([arc.rx, arc.ry, arc.rotation, arc.x, arc.y]);
    }
}

impl PathSink for BezPath {
    fn move_to(&mut self, x: f32, y: f32) {
        BezPath::move_to(self, pt(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        BezPath::line_to(self, pt(x, y));
    }

    fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.curve_to(pt(x1, y1), pt(x2, y2), pt(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        BezPath::quad_to(self, pt(x1, y1), pt(x, y));
    }

    fn close(&mut self) {
        self.close_path();
    }
}

fn pt(x: f32, y: f32) -> Point {
    Point::new(f64::from(x), f64::from(y))
}

/// Iterator returned by [`PathProgram::segments`].
pub struct Segments<'a> {
    program: &'a PathProgram,
    op: usize,
    coord: usize,
}

impl Iterator for Segments<'_> {
    type Item = PathSegment;

    fn next(&mut self) -> Option<PathSegment> {
        let op = *self.program.ops.get(self.op)?;
        let used = match op {
            OP_MOVE | OP_LINE => 2,
            OP_CUBIC => 6,
            OP_QUAD => 4,
            OP_CLOSE => 0,
            OP_ARC..=7 => 5,
            _ => return None,
        };
        // streams that disagree (e.g. a hand-edited serialized program) end the walk
        let c = self.program.coords.get(self.coord..self.coord + used)?;
        self.op += 1;
        let seg = match op {
            OP_MOVE => PathSegment::MoveTo(c[0], c[1]),
            OP_LINE => PathSegment::LineTo(c[0], c[1]),
            OP_CUBIC => PathSegment::CubicTo(c[0], c[1], c[2], c[3], c[4], c[5]),
            OP_QUAD => PathSegment::QuadTo(c[0], c[1], c[2], c[3]),
            OP_CLOSE => PathSegment::Close,
            arc => PathSegment::ArcTo(ArcSegment {
                rx: c[0],
                ry: c[1],
                rotation: c[2],
                large_arc: arc & 0b10 != 0,
                sweep: arc & 0b01 != 0,
                x: c[3],
                y: c[4],
            }),
        };
        self.coord += used;
        Some(seg)
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────

/// Parse an SVG `d` attribute.
///
/// Parsing is best-effort: on the first malformed command the path built
/// so far is returned. Data that does not begin with a moveto yields an
/// empty path.
#[must_use = "parsing result should be used"]
pub fn parse_path(d: &str) -> PathProgram {
    let mut path = PathProgram::new();
    let mut s = TextScanner::new(d);

    let mut command = match s.next_char() {
        Some(c @ ('M' | 'm')) => c,
        _ => return path,
    };

    let (mut cur_x, mut cur_y) = (0.0f32, 0.0f32);
    let (mut start_x, mut start_y) = (0.0f32, 0.0f32);
    let (mut ctrl_x, mut ctrl_y) = (0.0f32, 0.0f32);

    loop {
        s.skip_whitespace();
        let relative = command.is_ascii_lowercase();
        let (ox, oy) = if relative { (cur_x, cur_y) } else { (0.0, 0.0) };

        match command {
            'M' | 'm' => {
                let Some((x, y)) = pair(&mut s) else {
                    return bad_segment(path, command);
                };
                // A leading relative moveto is absolute
                let (x, y) = if command == 'm' && !path.is_empty() {
                    (x + cur_x, y + cur_y)
                } else {
                    (x, y)
                };
                path.move_to(x, y);
                (cur_x, cur_y) = (x, y);
                (start_x, start_y) = (x, y);
                (ctrl_x, ctrl_y) = (x, y);
                command = if command == 'm' { 'l' } else { 'L' };
            }
            'L' | 'l' => {
                let Some((x, y)) = pair(&mut s) else {
                    return bad_segment(path, command);
                };
                let (x, y) = (x + ox, y + oy);
                path.line_to(x, y);
                (cur_x, cur_y) = (x, y);
                (ctrl_x, ctrl_y) = (x, y);
            }
            'H' | 'h' => {
                let x = s.next_float();
                if x.is_nan() {
                    return bad_segment(path, command);
                }
                let x = x + ox;
                path.line_to(x, cur_y);
                cur_x = x;
                ctrl_x = x;
            }
            'V' | 'v' => {
                let y = s.next_float();
                if y.is_nan() {
                    return bad_segment(path, command);
                }
                let y = y + oy;
                path.line_to(cur_x, y);
                cur_y = y;
                ctrl_y = y;
            }
            'C' | 'c' => {
                let Some([x1, y1, x2, y2, x, y]) = floats::<6>(&mut s) else {
                    return bad_segment(path, command);
                };
                let (x1, y1, x2, y2, x, y) = (x1 + ox, y1 + oy, x2 + ox, y2 + oy, x + ox, y + oy);
                path.cubic_to(x1, y1, x2, y2, x, y);
                (ctrl_x, ctrl_y) = (x2, y2);
                (cur_x, cur_y) = (x, y);
            }
            'S' | 's' => {
                let x1 = 2.0 * cur_x - ctrl_x;
                let y1 = 2.0 * cur_y - ctrl_y;
                let Some([x2, y2, x, y]) = floats::<4>(&mut s) else {
                    return bad_segment(path, command);
                };
                let (x2, y2, x, y) = (x2 + ox, y2 + oy, x + ox, y + oy);
                path.cubic_to(x1, y1, x2, y2, x, y);
                (ctrl_x, ctrl_y) = (x2, y2);
                (cur_x, cur_y) = (x, y);
            }
            'Q' | 'q' => {
                let Some([x1, y1, x, y]) = floats::<4>(&mut s) else {
                    return bad_segment(path, command);
                };
                let (x1, y1, x, y) = (x1 + ox, y1 + oy, x + ox, y + oy);
                path.quad_to(x1, y1, x, y);
                (ctrl_x, ctrl_y) = (x1, y1);
                (cur_x, cur_y) = (x, y);
            }
            'T' | 't' => {
                let x1 = 2.0 * cur_x - ctrl_x;
                let y1 = 2.0 * cur_y - ctrl_y;
                let Some((x, y)) = pair(&mut s) else {
                    return bad_segment(path, command);
                };
                let (x, y) = (x + ox, y + oy);
                path.quad_to(x1, y1, x, y);
                (ctrl_x, ctrl_y) = (x1, y1);
                (cur_x, cur_y) = (x, y);
            }
            'A' | 'a' => {
                let Some(arc) = arc_args(&mut s) else {
                    return bad_segment(path, command);
                };
                let arc = ArcSegment {
                    x: arc.x + ox,
                    y: arc.y + oy,
                    ..arc
                };
                path.arc_to((cur_x, cur_y), &arc);
                (cur_x, cur_y) = (arc.x, arc.y);
                (ctrl_x, ctrl_y) = (arc.x, arc.y);
            }
            'Z' | 'z' => {
                path.close();
                (cur_x, cur_y) = (start_x, start_y);
                (ctrl_x, ctrl_y) = (start_x, start_y);
            }
            other => {
                log::warn!("Invalid path command {other:?}");
                return path;
            }
        }

        s.skip_comma_whitespace();
        if s.empty() {
            break;
        }
        if s.has_letter() {
            command = match s.next_char() {
                Some(c) => c,
                None => break,
            };
        } else if matches!(command, 'Z' | 'z') {
            // closepath takes no arguments to repeat
            log::warn!("Unexpected data after closepath: {:?}", s.ahead());
            break;
        }
    }
    path
}

fn bad_segment(path: PathProgram, command: char) -> PathProgram {
    log::warn!("Bad path coords for {command} path segment");
    path
}

/// `number comma-wsp? number`
fn pair(s: &mut TextScanner) -> Option<(f32, f32)> {
    let [x, y] = floats::<2>(s)?;
    Some((x, y))
}

/// `N` comma/whitespace separated numbers, or `None` if any is missing.
fn floats<const N: usize>(s: &mut TextScanner) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        if i > 0 {
            s.skip_comma_whitespace();
        }
        let v = s.next_float();
        if v.is_nan() {
            return None;
        }
        *slot = v;
    }
    Some(out)
}

fn arc_args(s: &mut TextScanner) -> Option<ArcSegment> {
    let [rx, ry, rotation] = floats::<3>(s)?;
    s.skip_comma_whitespace();
    let large_arc = s.next_flag()?;
    s.skip_comma_whitespace();
    let sweep = s.next_flag()?;
    s.skip_comma_whitespace();
    let [x, y] = floats::<2>(s)?;
    if rx < 0.0 || ry < 0.0 {
        return None;
    }
    Some(ArcSegment {
        rx,
        ry,
        rotation,
        large_arc,
        sweep,
        x,
        y,
    })
}

// ─── Arc conversion ──────────────────────────────────────────────────────

/// Emit `arc` from `from` as one cubic per quarter turn (or fewer).
///
/// Degenerate arcs follow the SVG implementation notes: a zero-length arc
/// emits nothing, a zero radius emits a straight line, and radii too small
/// to span the endpoints are scaled up.
pub fn arc_to_cubics<S: PathSink + ?Sized>(sink: &mut S, from: (f32, f32), arc: &ArcSegment) {
    let (x1, y1) = (f64::from(from.0), f64::from(from.1));
    let (x2, y2) = (f64::from(arc.x), f64::from(arc.y));
    if x1 == x2 && y1 == y2 {
        return;
    }
    if arc.rx == 0.0 || arc.ry == 0.0 {
        sink.line_to(arc.x, arc.y);
        return;
    }

    let mut rx = f64::from(arc.rx).abs();
    let mut ry = f64::from(arc.ry).abs();
    let angle = (f64::from(arc.rotation) % 360.0).to_radians();
    let (sin_a, cos_a) = angle.sin_cos();

    // Endpoint to centre parameterisation
    let dx2 = (x1 - x2) / 2.0;
    let dy2 = (y1 - y2) / 2.0;
    let x1p = cos_a * dx2 + sin_a * dy2;
    let y1p = -sin_a * dx2 + cos_a * dy2;

    let mut rx_sq = rx * rx;
    let mut ry_sq = ry * ry;
    let x1p_sq = x1p * x1p;
    let y1p_sq = y1p * y1p;

    let radii_check = x1p_sq / rx_sq + y1p_sq / ry_sq;
    if radii_check > 0.99999 {
        let scale = radii_check.sqrt() * 1.00001;
        rx *= scale;
        ry *= scale;
        rx_sq = rx * rx;
        ry_sq = ry * ry;
    }

    let sign = if arc.large_arc == arc.sweep { -1.0 } else { 1.0 };
    let sq = ((rx_sq * ry_sq - rx_sq * y1p_sq - ry_sq * x1p_sq)
        / (rx_sq * y1p_sq + ry_sq * x1p_sq))
        .max(0.0);
    let coef = sign * sq.sqrt();
    let cx1 = coef * (rx * y1p / ry);
    let cy1 = coef * -(ry * x1p / rx);

    let cx = (x1 + x2) / 2.0 + (cos_a * cx1 - sin_a * cy1);
    let cy = (y1 + y2) / 2.0 + (sin_a * cx1 + cos_a * cy1);

    let ux = (x1p - cx1) / rx;
    let uy = (y1p - cy1) / ry;
    let vx = (-x1p - cx1) / rx;
    let vy = (-y1p - cy1) / ry;

    let n = (ux * ux + uy * uy).sqrt();
    let start_sign = if uy < 0.0 { -1.0 } else { 1.0 };
    let angle_start = (start_sign * checked_acos(ux / n)).to_degrees();

    let n = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
    let p = ux * vx + uy * vy;
    let extent_sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
    let mut angle_extent = (extent_sign * checked_acos(p / n)).to_degrees();

    if angle_extent == 0.0 || !angle_extent.is_finite() || !angle_start.is_finite() {
        sink.line_to(arc.x, arc.y);
        return;
    }
    if !arc.sweep && angle_extent > 0.0 {
        angle_extent -= 360.0;
    } else if arc.sweep && angle_extent < 0.0 {
        angle_extent += 360.0;
    }
    let angle_extent = angle_extent % 360.0;
    let angle_start = angle_start % 360.0;

    let mut points = unit_arc_beziers(angle_start.to_radians(), angle_extent.to_radians());
    let to_user = Affine::translate((cx, cy))
        * Affine::rotate(f64::from(arc.rotation).to_radians())
        * Affine::scale_non_uniform(rx, ry);
    for p in &mut points {
        *p = to_user * *p;
    }
    if let Some(last) = points.last_mut() {
        // exact endpoint avoids accumulated drift
        *last = Point::new(x2, y2);
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        sink.line_to(arc.x, arc.y);
        return;
    }
    for c in points.chunks_exact(3) {
        sink.cubic_to(
            c[0].x as f32,
            c[0].y as f32,
            c[1].x as f32,
            c[1].y as f32,
            c[2].x as f32,
            c[2].y as f32,
        );
    }
}

fn checked_acos(v: f64) -> f64 {
    v.clamp(-1.0, 1.0).acos()
}

/// Cubic approximation of a unit-circle arc, at most 90° per segment.
/// Returns three points (two controls and an end) per segment.
fn unit_arc_beziers(angle_start: f64, angle_extent: f64) -> Vec<Point> {
    let segments = (angle_extent.abs() * 2.0 / std::f64::consts::PI).ceil().max(1.0) as usize;
    let increment = angle_extent / segments as f64;
    let half = increment / 2.0;
    let control = 4.0 / 3.0 * half.sin() / (1.0 + half.cos());

    let mut points = Vec::with_capacity(segments * 3);
    for i in 0..segments {
        let a0 = angle_start + i as f64 * increment;
        let (dy0, dx0) = a0.sin_cos();
        points.push(Point::new(dx0 - control * dy0, dy0 + control * dx0));
        let a1 = a0 + increment;
        let (dy1, dx1) = a1.sin_cos();
        points.push(Point::new(dx1 + control * dy1, dy1 - control * dx1));
        points.push(Point::new(dx1, dy1));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use PathSegment::*;

    fn segs(d: &str) -> Vec<PathSegment> {
        parse_path(d).segments().collect()
    }

    #[test]
    fn mismatched_streams_stop_iteration() {
        let program = PathProgram {
            ops: vec![OP_MOVE, OP_LINE, OP_CUBIC],
            coords: vec![1.0, 2.0, 3.0, 4.0, 5.0],
        };
        assert_eq!(program.segments().collect::<Vec<_>>(), vec![MoveTo(1.0, 2.0), LineTo(3.0, 4.0)]);

        let unknown = PathProgram {
            ops: vec![42],
            coords: vec![],
        };
        assert_eq!(unknown.segments().count(), 0);
    }

    #[test]
    fn truncated_cubic_keeps_prior_segments() {
        assert_eq!(segs("M0,0 L10,10 C20,20 Z"), vec![MoveTo(0.0, 0.0), LineTo(10.0, 10.0)]);
    }

    #[test]
    fn path_must_start_with_moveto() {
        assert!(parse_path("L10 10").is_empty());
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn implicit_repeats_become_lineto() {
        assert_eq!(
            segs("M1 2 3 4 5 6"),
            vec![MoveTo(1.0, 2.0), LineTo(3.0, 4.0), LineTo(5.0, 6.0)]
        );
        assert_eq!(
            segs("m1 1 2 2"),
            vec![MoveTo(1.0, 1.0), LineTo(3.0, 3.0)]
        );
    }

    #[test]
    fn relative_moveto_after_subpath_is_additive() {
        assert_eq!(
            segs("M10 10 l5 0 z m2 2"),
            vec![
                MoveTo(10.0, 10.0),
                LineTo(15.0, 10.0),
                Close,
                MoveTo(12.0, 12.0)
            ]
        );
    }

    #[test]
    fn horizontal_and_vertical() {
        assert_eq!(
            segs("M0 0H10v5h-3V0"),
            vec![
                MoveTo(0.0, 0.0),
                LineTo(10.0, 0.0),
                LineTo(10.0, 5.0),
                LineTo(7.0, 5.0),
                LineTo(7.0, 0.0)
            ]
        );
    }

    #[test]
    fn smooth_cubic_reflects_control_point() {
        assert_eq!(
            segs("M0 0 C0 10 10 10 10 0 S20 -10 20 0"),
            vec![
                MoveTo(0.0, 0.0),
                CubicTo(0.0, 10.0, 10.0, 10.0, 10.0, 0.0),
                CubicTo(10.0, -10.0, 20.0, -10.0, 20.0, 0.0)
            ]
        );
    }

    #[test]
    fn smooth_quad_without_previous_curve_uses_current_point() {
        assert_eq!(
            segs("M5 5 L10 10 T20 10"),
            vec![MoveTo(5.0, 5.0), LineTo(10.0, 10.0), QuadTo(10.0, 10.0, 20.0, 10.0)]
        );
    }

    #[test]
    fn arc_flags_are_packed_into_opcode() {
        let path = parse_path("M0 0 A5 5 0 1 0 10 0 a5,5 0 0,1 10,0");
        assert_eq!(path.opcodes(), &[OP_MOVE, OP_ARC | 0b10, OP_ARC | 0b01]);
        let segs: Vec<_> = path.segments().collect();
        assert_eq!(
            segs[2],
            ArcTo(ArcSegment {
                rx: 5.0,
                ry: 5.0,
                rotation: 0.0,
                large_arc: false,
                sweep: true,
                x: 20.0,
                y: 0.0
            })
        );
    }

    #[test]
    fn arc_flags_may_be_unseparated() {
        let segs = segs("M0 0a5 5 0 1110 0");
        assert!(matches!(segs[1], ArcTo(ArcSegment { large_arc: true, sweep: true, x, .. }) if x == 10.0));
    }

    #[test]
    fn negative_arc_radius_stops_parsing() {
        assert_eq!(segs("M0 0 L1 1 A-5 5 0 0 0 10 0 L3 3"), vec![MoveTo(0.0, 0.0), LineTo(1.0, 1.0)]);
    }

    #[test]
    fn unknown_command_returns_partial() {
        assert_eq!(segs("M0 0 L1 1 X 5"), vec![MoveTo(0.0, 0.0), LineTo(1.0, 1.0)]);
    }

    #[derive(Default)]
    struct Collect(Vec<PathSegment>);

    impl PathSink for Collect {
        fn move_to(&mut self, x: f32, y: f32) {
            self.0.push(MoveTo(x, y));
        }
        fn line_to(&mut self, x: f32, y: f32) {
            self.0.push(LineTo(x, y));
        }
        fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
            self.0.push(CubicTo(x1, y1, x2, y2, x, y));
        }
        fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
            self.0.push(QuadTo(x1, y1, x, y));
        }
        fn close(&mut self) {
            self.0.push(Close);
        }
    }

    #[test]
    fn half_circle_becomes_two_cubics_ending_exactly() {
        let mut out = Collect::default();
        parse_path("M0 0 A5 5 0 0 1 10 0").replay(&mut out);
        assert_eq!(out.0.len(), 3);
        match out.0[2] {
            CubicTo(_, _, _, _, x, y) => assert_eq!((x, y), (10.0, 0.0)),
            other => panic!("expected cubic, got {other:?}"),
        }
        // sweep=1 from (0,0) to (10,0) goes through the top (negative y)
        match out.0[1] {
            CubicTo(_, _, _, _, x, y) => {
                assert!((x - 5.0).abs() < 0.05, "{x}");
                assert!((y + 5.0).abs() < 0.05, "{y}");
            }
            other => panic!("expected cubic, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_arcs() {
        let mut out = Collect::default();
        parse_path("M0 0 A0 5 0 0 1 10 0 A5 5 0 0 1 10 0").replay(&mut out);
        // zero radius is a line; zero-length arc emits nothing
        assert_eq!(out.0, vec![MoveTo(0.0, 0.0), LineTo(10.0, 0.0)]);
    }

    #[test]
    fn huge_radii_stay_finite() {
        let mut out = Collect::default();
        parse_path("M0 0 A1e30 1e30 0 0 1 10 0").replay(&mut out);
        for seg in &out.0 {
            if let CubicTo(a, b, c, d, e, f) = *seg {
                assert!([a, b, c, d, e, f].iter().all(|v| v.is_finite()), "{seg:?}");
            }
        }
        assert!(matches!(out.0.last(), Some(CubicTo(_, _, _, _, x, _)) | Some(LineTo(x, _)) if *x == 10.0));
    }

    #[test]
    fn arc_conversion_is_deterministic() {
        let path = parse_path("M3 7 A40 20 30 1 0 50 -12");
        let a = path.to_bez_path();
        let b = path.to_bez_path();
        assert_eq!(a, b);
    }
}
