//! Fill and stroke painting: colours, gradients, solid colours and
//! patterns, plus stroke geometry.
//!
//! Paint servers are resolved at draw time because `objectBoundingBox`
//! units depend on the shape being painted.

use std::collections::HashSet;

use kurbo::{Affine, Point, Rect};
use smallvec::SmallVec;
use svx_core::model::{GradientAttrs, PatternAttrs, SpreadMethod};
use svx_core::values::{FillRule, LengthContext};
use svx_core::{Bounds, Color, Length, NodeIndex, NodeKind, Paint, PathProgram, PreserveAspectRatio, Style, Unit};

use crate::aspect::view_box_transform;
use crate::geometry::{bbox_transform, path_bounds, transform_bounds};
use crate::surface::{
    Brush, DrawingSurface, GradientStop, GradientStops, LinearBrush, PaintState, RadialBrush, StrokeStyle,
};
use crate::walker::Renderer;

/// Upper bound on pattern tiles drawn for one shape.
const MAX_PATTERN_TILES: f64 = 4096.0;

/// A paint ready to be applied to a shape.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResolvedPaint {
    Brush(Brush),
    /// A `<pattern>` element, drawn as tiles clipped to the shape.
    Pattern(NodeIndex),
}

/// Outcome of following a `url(#id)` paint reference.
enum ServerPaint {
    /// The reference does not name a paint server.
    Unresolved,
    /// The server exists but paints nothing (a gradient without stops).
    Nothing,
    Paint(ResolvedPaint),
}

impl<S: DrawingSurface + ?Sized> Renderer<'_, S> {
    /// Fill then stroke `path` with the current style.
    pub(crate) fn fill_and_stroke(&mut self, path: &PathProgram) {
        let style = self.state.style.clone();
        let bounds = path_bounds(path);

        let fill_opacity = style.fill_opacity.unwrap_or(1.0);
        match self.resolve_paint(style.fill.as_ref(), fill_opacity, bounds, &style) {
            Some(ResolvedPaint::Brush(brush)) => {
                let rule = style.fill_rule.unwrap_or(FillRule::NonZero);
                self.surface.draw_path(path, &PaintState::fill(brush, rule));
            }
            Some(ResolvedPaint::Pattern(pattern)) => {
                self.fill_with_pattern(pattern, path, style.fill_rule.unwrap_or(FillRule::NonZero), bounds);
            }
            None => {}
        }

        let Some(stroke) = self.stroke_style(&style) else {
            return;
        };
        let stroke_opacity = style.stroke_opacity.unwrap_or(1.0);
        match self.resolve_paint(style.stroke.as_ref(), stroke_opacity, bounds, &style) {
            Some(ResolvedPaint::Brush(brush)) => {
                self.surface.draw_path(path, &PaintState::stroke(brush, stroke));
            }
            Some(ResolvedPaint::Pattern(_)) => log::debug!("Pattern strokes are not supported"),
            None => {}
        }
    }

    /// Stroke geometry, or `None` when the stroke width is not positive.
    pub(crate) fn stroke_style(&self, style: &Style) -> Option<StrokeStyle> {
        let ctx = self.length_ctx();
        let width = style.stroke_width.map_or(1.0, |w| w.to_px(&ctx));
        if width <= 0.0 || width.is_nan() {
            return None;
        }

        let dashes: Vec<f32> = style
            .stroke_dash_array
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|d| d.to_px(&ctx))
            .collect();
        let dashes = normalize_dashes(&dashes);
        let offset = style.stroke_dash_offset.map_or(0.0, |o| o.to_px(&ctx));

        Some(StrokeStyle {
            width,
            cap: style.stroke_line_cap.unwrap_or(svx_core::values::LineCap::Butt),
            join: style.stroke_line_join.unwrap_or(svx_core::values::LineJoin::Miter),
            miter_limit: style.stroke_miter_limit.unwrap_or(4.0),
            dash_offset: normalize_dash_offset(&dashes, offset),
            dashes,
            non_scaling: style.vector_effect == Some(svx_core::values::VectorEffect::NonScalingStroke),
        })
    }

    /// Turn a `fill`/`stroke` value into something drawable. `None` means
    /// nothing is painted.
    pub(crate) fn resolve_paint(
        &self,
        paint: Option<&Paint>,
        opacity: f32,
        bounds: Option<Bounds>,
        style: &Style,
    ) -> Option<ResolvedPaint> {
        match paint? {
            Paint::None => None,
            Paint::Color(color) => Some(ResolvedPaint::Brush(Brush::Solid(color.with_opacity(opacity)))),
            Paint::CurrentColor => {
                let color = style.color.unwrap_or(Color::BLACK);
                Some(ResolvedPaint::Brush(Brush::Solid(color.with_opacity(opacity))))
            }
            Paint::Reference { href, fallback } => match self.paint_server(href, opacity, bounds) {
                ServerPaint::Paint(paint) => Some(paint),
                ServerPaint::Nothing => None,
                ServerPaint::Unresolved => {
                    let fallback = fallback.as_deref()?;
                    if matches!(fallback, Paint::Reference { .. }) {
                        return None;
                    }
                    self.resolve_paint(Some(fallback), opacity, bounds, style)
                }
            },
        }
    }

    fn paint_server(&self, href: &str, opacity: f32, bounds: Option<Bounds>) -> ServerPaint {
        let doc = self.doc;
        let Some(server) = doc.resolve_iri(href) else {
            log::warn!("Paint reference {href} not found");
            return ServerPaint::Unresolved;
        };
        match &doc.node(server).kind {
            NodeKind::LinearGradient(_) | NodeKind::RadialGradient(_) => {
                match self.gradient_brush(server, opacity, bounds) {
                    Some(brush) => ServerPaint::Paint(ResolvedPaint::Brush(brush)),
                    None => ServerPaint::Nothing,
                }
            }
            NodeKind::SolidColor => {
                let style = self.styles.resolve(server);
                let color = match style.solid_color {
                    Some(Paint::Color(c)) => c,
                    Some(Paint::CurrentColor) => style.color.unwrap_or(Color::BLACK),
                    _ => Color::BLACK,
                };
                let alpha = style.solid_opacity.unwrap_or(1.0) * opacity;
                ServerPaint::Paint(ResolvedPaint::Brush(Brush::Solid(color.with_opacity(alpha))))
            }
            NodeKind::Pattern(_) => ServerPaint::Paint(ResolvedPaint::Pattern(server)),
            _ => {
                log::warn!("Paint reference {href} is not a paint server");
                ServerPaint::Unresolved
            }
        }
    }

    // ─── Gradients ───────────────────────────────────────────────────────────

    /// The gradient and every gradient it inherits from through `href`.
    fn gradient_chain(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let doc = self.doc;
        let mut chain = vec![start];
        let mut seen = HashSet::from([start]);
        let mut current = start;
        while let Some(href) = gradient_common(&doc.node(current).kind).and_then(|c| c.href.as_deref()) {
            let Some(next) = doc.resolve_iri(href) else {
                log::warn!("Gradient href {href} not found");
                break;
            };
            if gradient_common(&doc.node(next).kind).is_none() || !seen.insert(next) {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    fn gradient_brush(&self, server: NodeIndex, opacity: f32, bounds: Option<Bounds>) -> Option<Brush> {
        let doc = self.doc;
        let chain = self.gradient_chain(server);
        let commons = || chain.iter().filter_map(|&n| gradient_common(&doc.node(n).kind));
        let user_space = commons().find_map(|c| c.units_user_space).unwrap_or(false);
        let gradient_transform = commons().find_map(|c| c.transform).unwrap_or(Affine::IDENTITY);
        let spread = commons().find_map(|c| c.spread).unwrap_or(SpreadMethod::Pad);

        let stops = self.gradient_stops(&chain, opacity);
        match stops.len() {
            0 => return None,
            1 => return Some(Brush::Solid(stops[0].color)),
            _ => {}
        }

        let base = if user_space {
            Affine::IDENTITY
        } else {
            match bounds {
                Some(b) if b.width > 0.0 && b.height > 0.0 => bbox_transform(&b),
                _ => {
                    log::debug!("Skipping objectBoundingBox gradient on an empty box");
                    return None;
                }
            }
        };
        let transform = base * gradient_transform;

        let ctx = self.length_ctx();
        let resolve = GradientLengths { ctx, user_space };
        let percent = |v: f32| Length::new(v, Unit::Percent);

        match &doc.node(server).kind {
            NodeKind::RadialGradient(_) => {
                let radial = |get: fn(&svx_core::RadialGradient) -> Option<Length>| {
                    chain.iter().find_map(|&n| match &doc.node(n).kind {
                        NodeKind::RadialGradient(r) => get(r),
                        _ => None,
                    })
                };
                let cx = radial(|r| r.cx).unwrap_or(percent(50.0));
                let cy = radial(|r| r.cy).unwrap_or(percent(50.0));
                let r = resolve.length(radial(|r| r.r).unwrap_or(percent(50.0)));
                let fx = radial(|r| r.fx).unwrap_or(cx);
                let fy = radial(|r| r.fy).unwrap_or(cy);
                if r <= 0.0 {
                    return stops.last().map(|s| Brush::Solid(s.color));
                }
                Some(Brush::RadialGradient(RadialBrush {
                    center: resolve.point(cx, cy),
                    radius: f64::from(r),
                    focus: resolve.point(fx, fy),
                    stops,
                    spread,
                    transform,
                }))
            }
            _ => {
                let linear = |get: fn(&svx_core::LinearGradient) -> Option<Length>| {
                    chain.iter().find_map(|&n| match &doc.node(n).kind {
                        NodeKind::LinearGradient(l) => get(l),
                        _ => None,
                    })
                };
                let x1 = linear(|l| l.x1).unwrap_or(percent(0.0));
                let y1 = linear(|l| l.y1).unwrap_or(percent(0.0));
                let x2 = linear(|l| l.x2).unwrap_or(percent(100.0));
                let y2 = linear(|l| l.y2).unwrap_or(percent(0.0));
                Some(Brush::LinearGradient(LinearBrush {
                    start: resolve.point(x1, y1),
                    end: resolve.point(x2, y2),
                    stops,
                    spread,
                    transform,
                }))
            }
        }
    }

    /// Stops of the first gradient in the chain that has any. Offsets are
    /// made non-decreasing and colours take `stop-opacity` and `opacity`.
    fn gradient_stops(&self, chain: &[NodeIndex], opacity: f32) -> GradientStops {
        let doc = self.doc;
        let Some(owner) = chain.iter().copied().find(|&n| {
            doc.element_children(n)
                .iter()
                .any(|&c| matches!(doc.node(c).kind, NodeKind::Stop { .. }))
        }) else {
            return SmallVec::new();
        };

        let mut stops = GradientStops::new();
        let mut last_offset = 0.0f32;
        for child in doc.element_children(owner) {
            let NodeKind::Stop { offset } = doc.node(child).kind else {
                continue;
            };
            let offset = offset.max(last_offset);
            last_offset = offset;

            let style = self.styles.resolve(child);
            let color = match style.stop_color {
                Some(Paint::Color(c)) => c,
                Some(Paint::CurrentColor) => style.color.unwrap_or(Color::BLACK),
                _ => Color::BLACK,
            };
            let alpha = style.stop_opacity.unwrap_or(1.0) * opacity;
            stops.push(GradientStop {
                offset,
                color: color.with_opacity(alpha),
            });
        }
        stops
    }

    // ─── Patterns ────────────────────────────────────────────────────────────

    fn pattern_chain(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let doc = self.doc;
        let mut chain = vec![start];
        let mut seen = HashSet::from([start]);
        let mut current = start;
        while let NodeKind::Pattern(attrs) = &doc.node(current).kind
            && let Some(href) = attrs.href.as_deref()
        {
            let Some(next) = doc.resolve_iri(href) else {
                break;
            };
            if !matches!(doc.node(next).kind, NodeKind::Pattern(_)) || !seen.insert(next) {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    /// Fill `path` by repeating the pattern tile over the shape's box.
    pub(crate) fn fill_with_pattern(
        &mut self,
        pattern: NodeIndex,
        path: &PathProgram,
        rule: FillRule,
        bounds: Option<Bounds>,
    ) {
        let doc = self.doc;
        let Some(bounds) = bounds else {
            return;
        };
        let chain = self.pattern_chain(pattern);
        let attrs: Vec<&PatternAttrs> = chain
            .iter()
            .filter_map(|&n| match &doc.node(n).kind {
                NodeKind::Pattern(p) => Some(p),
                _ => None,
            })
            .collect();
        let pick = |get: fn(&PatternAttrs) -> Option<Length>| attrs.iter().find_map(|p| get(p));

        let user_space = attrs.iter().find_map(|p| p.units_user_space).unwrap_or(false);
        let content_user_space = attrs.iter().find_map(|p| p.content_units_user_space).unwrap_or(true);
        let pattern_transform = attrs.iter().find_map(|p| p.transform).unwrap_or(Affine::IDENTITY);
        let view_box = attrs.iter().find_map(|p| p.view_box);
        let aspect: PreserveAspectRatio = attrs.iter().find_map(|p| p.aspect).unwrap_or_default();
        let content = chain
            .iter()
            .copied()
            .find(|&n| !doc.element_children(n).is_empty())
            .unwrap_or(pattern);

        let ctx = self.length_ctx();
        let resolve = GradientLengths { ctx, user_space };
        let zero = Length::px(0.0);
        let tile_origin = resolve.point(pick(|p| p.x).unwrap_or(zero), pick(|p| p.y).unwrap_or(zero));
        let tile_size = resolve.point(pick(|p| p.width).unwrap_or(zero), pick(|p| p.height).unwrap_or(zero));
        let (tile_x, tile_y, tile_w, tile_h) = if user_space {
            (tile_origin.x, tile_origin.y, tile_size.x, tile_size.y)
        } else {
            let b = (
                f64::from(bounds.min_x),
                f64::from(bounds.min_y),
                f64::from(bounds.width),
                f64::from(bounds.height),
            );
            (b.0 + tile_origin.x * b.2, b.1 + tile_origin.y * b.3, tile_size.x * b.2, tile_size.y * b.3)
        };
        if tile_w <= 0.0 || tile_h <= 0.0 {
            return;
        }
        if pattern_transform.determinant() == 0.0 {
            return;
        }

        // shape box in pattern space
        let area = transform_bounds(&bounds, pattern_transform.inverse());
        let first_col = ((f64::from(area.min_x) - tile_x) / tile_w).floor();
        let last_col = ((f64::from(area.max_x()) - tile_x) / tile_w).ceil();
        let first_row = ((f64::from(area.min_y) - tile_y) / tile_h).floor();
        let last_row = ((f64::from(area.max_y()) - tile_y) / tile_h).ceil();
        // counted in f64: tiny tiles put the indices far outside i64
        let tiles = (last_col - first_col).max(0.0) * (last_row - first_row).max(0.0);
        if !tiles.is_finite() || tiles > MAX_PATTERN_TILES {
            log::warn!("Pattern needs {tiles} tiles; skipping");
            return;
        }
        let (first_col, last_col) = (first_col as i64, last_col as i64);
        let (first_row, last_row) = (first_row as i64, last_row as i64);

        if !self.active.insert(pattern) {
            log::warn!("Skipping cyclic pattern reference");
            return;
        }
        let pattern_style = self.styles.resolve(pattern);

        self.surface.save();
        self.surface.clip_path(path, rule);
        self.surface.concat(pattern_transform);
        for row in first_row..last_row {
            for col in first_col..last_col {
                self.push();
                self.state.style = pattern_style.clone();
                let origin = (tile_x + col as f64 * tile_w, tile_y + row as f64 * tile_h);
                self.surface.concat(Affine::translate(origin));
                self.surface.clip_rect(Rect::new(0.0, 0.0, tile_w, tile_h));
                let tile = Bounds::new(0.0, 0.0, tile_w as f32, tile_h as f32);
                match view_box {
                    Some(vb) => {
                        self.surface.concat(view_box_transform(&tile, &vb, aspect));
                        self.state.viewport = vb;
                    }
                    None if !content_user_space => {
                        self.surface.concat(Affine::scale_non_uniform(
                            f64::from(bounds.width),
                            f64::from(bounds.height),
                        ));
                    }
                    None => {}
                }
                self.render_children(content);
                self.pop();
            }
        }
        self.surface.restore();
        self.active.remove(&pattern);
    }
}

fn gradient_common(kind: &NodeKind) -> Option<&GradientAttrs> {
    match kind {
        NodeKind::LinearGradient(l) => Some(&l.common),
        NodeKind::RadialGradient(r) => Some(&r.common),
        _ => None,
    }
}

/// Length resolution for paint server coordinates: user-space px, or
/// fractions of the bounding box.
struct GradientLengths {
    ctx: LengthContext,
    user_space: bool,
}

impl GradientLengths {
    fn x(&self, l: Length) -> f64 {
        f64::from(if self.user_space { l.to_px_x(&self.ctx) } else { l.fraction() })
    }

    fn y(&self, l: Length) -> f64 {
        f64::from(if self.user_space { l.to_px_y(&self.ctx) } else { l.fraction() })
    }

    fn point(&self, x: Length, y: Length) -> Point {
        Point::new(self.x(x), self.y(y))
    }

    fn length(&self, l: Length) -> f32 {
        if self.user_space { l.to_px(&self.ctx) } else { l.fraction() }
    }
}

// ─── Dashes ──────────────────────────────────────────────────────────────────

/// Dash pattern ready for a surface: odd lists are repeated to even
/// length; negative entries or a zero total disable dashing.
pub fn normalize_dashes(dashes: &[f32]) -> SmallVec<[f32; 4]> {
    if dashes.is_empty() {
        return SmallVec::new();
    }
    if dashes.iter().any(|d| *d < 0.0 || d.is_nan()) {
        log::warn!("Ignoring dash array with negative entries");
        return SmallVec::new();
    }
    let total: f32 = dashes.iter().sum();
    if total <= 0.0 {
        return SmallVec::new();
    }
    let mut out: SmallVec<[f32; 4]> = dashes.iter().copied().collect();
    if out.len() % 2 == 1 {
        out.extend_from_slice(dashes);
    }
    out
}

/// Offset wrapped into `0..pattern length`, or zero without dashes.
pub fn normalize_dash_offset(dashes: &[f32], offset: f32) -> f32 {
    let total: f32 = dashes.iter().sum();
    if dashes.is_empty() || total <= 0.0 {
        return 0.0;
    }
    offset.rem_euclid(total)
}
