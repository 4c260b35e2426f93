//! Markers: vertex positions and directions along a path, and rendering
//! `<marker>` content at them.

use kurbo::{Affine, Rect};
use svx_core::model::{MarkerAttrs, Orient};
use svx_core::path::{ArcSegment, PathSink, arc_to_cubics};
use svx_core::values::{Align, MeetOrSlice};
use svx_core::{Bounds, NodeIndex, NodeKind, PathProgram, PathSegment};

use crate::surface::DrawingSurface;
use crate::walker::Renderer;

/// A point where a marker may be placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerVertex {
    pub x: f32,
    pub y: f32,
    /// Direction of the segment arriving here.
    pub incoming: Option<(f32, f32)>,
    /// Direction of the segment leaving here.
    pub outgoing: Option<(f32, f32)>,
}

impl MarkerVertex {
    fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            incoming: None,
            outgoing: None,
        }
    }

    /// Orientation in degrees for `orient="auto"`: the bisector of the
    /// incoming and outgoing directions, or whichever one exists.
    pub fn auto_angle(&self) -> f32 {
        let angle = |(dx, dy): (f32, f32)| dy.atan2(dx);
        let radians = match (self.incoming, self.outgoing) {
            (Some(a), Some(b)) => {
                let a_in = angle(a);
                let mut delta = angle(b) - a_in;
                if delta > std::f32::consts::PI {
                    delta -= std::f32::consts::TAU;
                } else if delta <= -std::f32::consts::PI {
                    delta += std::f32::consts::TAU;
                }
                a_in + delta / 2.0
            }
            (Some(d), None) | (None, Some(d)) => angle(d),
            (None, None) => 0.0,
        };
        radians.to_degrees()
    }
}

/// Every vertex of `path` in order, with the directions used to orient
/// markers. Closed subpaths join their first and last directions.
pub fn marker_vertices(path: &PathProgram) -> Vec<MarkerVertex> {
    let mut collector = VertexCollector::default();
    path.replay(&mut collector);
    collector.vertices
}

#[derive(Default)]
struct VertexCollector {
    vertices: Vec<MarkerVertex>,
    current: (f32, f32),
    subpath_start: usize,
}

impl VertexCollector {
    fn segment(&mut self, start_dir: (f32, f32), end_dir: (f32, f32), x: f32, y: f32) {
        if let Some(last) = self.vertices.last_mut()
            && last.outgoing.is_none()
        {
            last.outgoing = Some(start_dir);
        }
        self.vertices.push(MarkerVertex {
            incoming: Some(end_dir),
            ..MarkerVertex::at(x, y)
        });
        self.current = (x, y);
    }
}

/// First direction that is not zero-length.
fn direction(candidates: &[(f32, f32)]) -> (f32, f32) {
    candidates
        .iter()
        .copied()
        .find(|&(dx, dy)| dx != 0.0 || dy != 0.0)
        .unwrap_or((0.0, 0.0))
}

impl PathSink for VertexCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.subpath_start = self.vertices.len();
        self.vertices.push(MarkerVertex::at(x, y));
        self.current = (x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let d = (x - self.current.0, y - self.current.1);
        self.segment(d, d, x, y);
    }

    fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (cx, cy) = self.current;
        let start = direction(&[(x1 - cx, y1 - cy), (x2 - cx, y2 - cy), (x - cx, y - cy)]);
        let end = direction(&[(x - x2, y - y2), (x - x1, y - y1), (x - cx, y - cy)]);
        self.segment(start, end, x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (cx, cy) = self.current;
        let start = direction(&[(x1 - cx, y1 - cy), (x - cx, y - cy)]);
        let end = direction(&[(x - x1, y - y1), (x - cx, y - cy)]);
        self.segment(start, end, x, y);
    }

    /// One vertex per arc, oriented by the first and last cubic of its
    /// flattening.
    fn arc_to(&mut self, from: (f32, f32), arc: &ArcSegment) {
        let mut flat = PathProgram::new();
        flat.move_to(from.0, from.1);
        arc_to_cubics(&mut flat, from, arc);
        let mut start = None;
        let mut end = None;
        let mut prev = from;
        for seg in flat.segments() {
            let (d_start, d_end, to) = match seg {
                PathSegment::CubicTo(x1, y1, x2, y2, x, y) => (
                    direction(&[(x1 - prev.0, y1 - prev.1), (x - prev.0, y - prev.1)]),
                    direction(&[(x - x2, y - y2), (x - prev.0, y - prev.1)]),
                    (x, y),
                ),
                PathSegment::LineTo(x, y) => {
                    let d = (x - prev.0, y - prev.1);
                    (d, d, (x, y))
                }
                _ => continue,
            };
            start.get_or_insert(d_start);
            end = Some(d_end);
            prev = to;
        }
        if let (Some(start), Some(end)) = (start, end) {
            self.segment(start, end, arc.x, arc.y);
        }
    }

    fn close(&mut self) {
        let Some(&first) = self.vertices.get(self.subpath_start) else {
            return;
        };
        if self.current != (first.x, first.y) {
            self.line_to(first.x, first.y);
        }
        let last_index = self.vertices.len() - 1;
        if last_index == self.subpath_start {
            return;
        }
        let closing_in = self.vertices[last_index].incoming;
        self.vertices[last_index].outgoing = first.outgoing;
        self.vertices[self.subpath_start].incoming = closing_in;
        self.current = (first.x, first.y);
    }
}

impl<S: DrawingSurface + ?Sized> Renderer<'_, S> {
    /// Draw `marker-start`, `marker-mid` and `marker-end` along `path`.
    pub(crate) fn render_markers(&mut self, path: &PathProgram) {
        let style = &self.state.style;
        if style.marker_start.is_none() && style.marker_mid.is_none() && style.marker_end.is_none() {
            return;
        }
        let start = self.marker_ref(style.marker_start.as_deref());
        let mid = self.marker_ref(style.marker_mid.as_deref());
        let end = self.marker_ref(style.marker_end.as_deref());

        let vertices = marker_vertices(path);
        let Some((last, rest)) = vertices.split_last() else {
            return;
        };
        if let Some(marker) = start {
            self.render_marker(marker, &vertices[0]);
        }
        if let Some(marker) = mid
            && !rest.is_empty()
        {
            for vertex in &rest[1..] {
                self.render_marker(marker, vertex);
            }
        }
        if let Some(marker) = end {
            self.render_marker(marker, last);
        }
    }

    fn marker_ref(&self, href: Option<&str>) -> Option<NodeIndex> {
        let href = href?;
        match self.doc.resolve_iri(href) {
            Some(n) if matches!(self.doc.node(n).kind, NodeKind::Marker(_)) => Some(n),
            _ => {
                log::warn!("Marker reference {href} does not resolve to a <marker>");
                None
            }
        }
    }

    fn render_marker(&mut self, marker: NodeIndex, vertex: &MarkerVertex) {
        let doc = self.doc;
        let NodeKind::Marker(attrs) = &doc.node(marker).kind else {
            return;
        };
        if !self.active.insert(marker) {
            log::warn!("Skipping marker that references itself");
            return;
        }

        let ctx = self.length_ctx();
        let stroke_width = self.state.style.stroke_width.map_or(1.0, |w| w.to_px(&ctx));
        let angle = match attrs.orient {
            Some(Orient::Auto) => vertex.auto_angle(),
            Some(Orient::Angle(a)) => a,
            None => 0.0,
        };
        let units_scale = if attrs.units_user_space { 1.0 } else { stroke_width };

        let ref_x = attrs.ref_x.map_or(0.0, |x| x.to_px_x(&ctx));
        let ref_y = attrs.ref_y.map_or(0.0, |y| y.to_px_y(&ctx));
        let width = attrs.marker_width.map_or(3.0, |w| w.to_px_x(&ctx));
        let height = attrs.marker_height.map_or(3.0, |h| h.to_px_y(&ctx));
        let fit = MarkerFit::new(attrs, width, height);

        self.push();
        self.surface.concat(
            Affine::translate((f64::from(vertex.x), f64::from(vertex.y)))
                * Affine::rotate(f64::from(angle).to_radians())
                * Affine::scale(f64::from(units_scale))
                * Affine::translate((-f64::from(ref_x * fit.sx), -f64::from(ref_y * fit.sy))),
        );

        // properties inherit from the marker's own ancestors
        self.state.style = self.styles.resolve(marker);
        if self.state.style.overflow == Some(false) {
            self.surface.clip_rect(fit.clip_rect(width, height));
        }
        self.surface
            .concat(Affine::scale_non_uniform(f64::from(fit.sx), f64::from(fit.sy)));
        self.state.viewport = fit.view_box;

        self.render_children(marker);
        self.pop();
        self.active.remove(&marker);
    }
}

/// Scale from marker content to the marker box.
struct MarkerFit {
    sx: f32,
    sy: f32,
    view_box: Bounds,
    align: Align,
}

impl MarkerFit {
    fn new(attrs: &MarkerAttrs, width: f32, height: f32) -> Self {
        let aspect = attrs.aspect.unwrap_or_default();
        let Some(view_box) = attrs.view_box.filter(|vb| vb.width > 0.0 && vb.height > 0.0) else {
            return Self {
                sx: 1.0,
                sy: 1.0,
                view_box: Bounds::new(0.0, 0.0, width, height),
                align: Align::XMinYMin,
            };
        };
        let mut sx = width / view_box.width;
        let mut sy = height / view_box.height;
        if aspect.align != Align::None {
            let s = match aspect.scale {
                MeetOrSlice::Slice => sx.max(sy),
                MeetOrSlice::Meet => sx.min(sy),
            };
            sx = s;
            sy = s;
        }
        Self {
            sx,
            sy,
            view_box,
            align: aspect.align,
        }
    }

    /// The marker box in the space where the reference point sits at the
    /// origin, shifted by the alignment slack.
    fn clip_rect(&self, width: f32, height: f32) -> Rect {
        let image_w = self.view_box.width * self.sx;
        let image_h = self.view_box.height * self.sy;
        let x_offset = match self.align {
            Align::XMidYMin | Align::XMidYMid | Align::XMidYMax => -(width - image_w) / 2.0,
            Align::XMaxYMin | Align::XMaxYMid | Align::XMaxYMax => -(width - image_w),
            _ => 0.0,
        };
        let y_offset = match self.align {
            Align::XMinYMid | Align::XMidYMid | Align::XMaxYMid => -(height - image_h) / 2.0,
            Align::XMinYMax | Align::XMidYMax | Align::XMaxYMax => -(height - image_h),
            _ => 0.0,
        };
        let x = self.view_box.min_x * self.sx + x_offset;
        let y = self.view_box.min_y * self.sy + y_offset;
        Rect::new(
            f64::from(x),
            f64::from(y),
            f64::from(x + width),
            f64::from(y + height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svx_core::parse_path;

    fn angles(d: &str) -> Vec<i32> {
        marker_vertices(&parse_path(d))
            .iter()
            .map(|v| v.auto_angle().round() as i32)
            .collect()
    }

    #[test]
    fn open_polyline_vertices() {
        let vertices = marker_vertices(&parse_path("M0,0 L10,0 L10,10"));
        let points: Vec<(f32, f32)> = vertices.iter().map(|v| (v.x, v.y)).collect();
        assert_eq!(points, vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        // mid vertex bisects a right-angle turn
        assert_eq!(angles("M0,0 L10,0 L10,10"), vec![0, 45, 90]);
    }

    #[test]
    fn closed_subpath_joins_ends() {
        let vertices = marker_vertices(&parse_path("M0,0 L10,0 L10,10 Z"));
        assert_eq!(vertices.len(), 4);
        let first = vertices[0];
        let last = vertices[3];
        assert_eq!((last.x, last.y), (0.0, 0.0));
        assert_eq!(first.incoming, last.incoming);
        assert_eq!(last.outgoing, first.outgoing);
    }

    #[test]
    fn curve_tangents() {
        // leaves heading down, arrives heading right
        assert_eq!(angles("M0,0 C0,10 10,10 20,10"), vec![90, 0]);
    }

    #[test]
    fn arcs_count_as_one_vertex() {
        let vertices = marker_vertices(&parse_path("M0,0 A10,10 0 0 1 20,0"));
        assert_eq!(vertices.len(), 2);
        assert_eq!((vertices[1].x, vertices[1].y), (20.0, 0.0));
        // clockwise half circle over the top: starts up, ends down
        assert_eq!(angles("M0,0 A10,10 0 0 1 20,0"), vec![-90, 90]);
    }

    #[test]
    fn fit_without_view_box_is_identity() {
        let fit = MarkerFit::new(&MarkerAttrs::default(), 3.0, 3.0);
        assert_eq!((fit.sx, fit.sy), (1.0, 1.0));
        assert_eq!(fit.clip_rect(3.0, 3.0), Rect::new(0.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn fit_with_view_box_scales_uniformly() {
        let attrs = MarkerAttrs {
            view_box: Some(Bounds::new(0.0, 0.0, 10.0, 5.0)),
            ..MarkerAttrs::default()
        };
        let fit = MarkerFit::new(&attrs, 4.0, 4.0);
        assert_eq!((fit.sx, fit.sy), (0.4, 0.4));
        // 4x2 content centred vertically in the 4x4 box
        assert_eq!(fit.clip_rect(4.0, 4.0), Rect::new(0.0, -1.0, 4.0, 3.0));
    }
}
