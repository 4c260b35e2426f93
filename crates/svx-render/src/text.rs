//! `<text>`, `<tspan>`, `<tref>` and `<textPath>`.
//!
//! Text is laid out as runs along a single baseline cursor. Run widths come
//! from [`DrawingSurface::measure_text`], so layout is only as accurate as
//! the surface's metrics. `text-anchor` shifts the whole element by its
//! measured width.

use kurbo::{Affine, BezPath, ParamCurve, ParamCurveArclen, Point};
use svx_core::model::{HasTransform, TextPathRef, TextPositions};
use svx_core::values::{FillRule, FontStyle, LengthContext, TextAnchor, TextDecoration, Unit};
use svx_core::{Bounds, Length, NodeIndex, NodeKind, Style};

use crate::geometry::transform_path;
use crate::paint::ResolvedPaint;
use crate::surface::{DrawingSurface, FontSpec, PaintState};
use crate::walker::Renderer;

const ARCLEN_ACCURACY: f64 = 1e-3;

/// Current text position in user space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TextCursor {
    x: f32,
    y: f32,
}

impl TextCursor {
    /// Absolute `x`/`y` replace the position, `dx`/`dy` shift it. Only the
    /// first value of each list is used.
    fn apply(&mut self, positions: &TextPositions, ctx: &LengthContext) {
        if let Some(x) = first(&positions.x) {
            self.x = x.to_px_x(ctx);
        }
        if let Some(y) = first(&positions.y) {
            self.y = y.to_px_y(ctx);
        }
        if let Some(dx) = first(&positions.dx) {
            self.x += dx.to_px_x(ctx);
        }
        if let Some(dy) = first(&positions.dy) {
            self.y += dy.to_px_y(ctx);
        }
    }
}

fn first(list: &Option<Vec<Length>>) -> Option<Length> {
    list.as_ref().and_then(|l| l.first().copied())
}

fn anchor_shift(anchor: Option<TextAnchor>, width: f32) -> f32 {
    match anchor.unwrap_or(TextAnchor::Start) {
        TextAnchor::Start => 0.0,
        TextAnchor::Middle => -width / 2.0,
        TextAnchor::End => -width,
    }
}

impl<S: DrawingSurface + ?Sized> Renderer<'_, S> {
    pub(crate) fn render_text(&mut self, node: NodeIndex) {
        let doc = self.doc;
        let NodeKind::Text(positions) = &doc.node(node).kind else {
            return;
        };
        self.concat_own_transform(node);

        let mut cursor = TextCursor::default();
        cursor.apply(positions, &self.length_ctx());
        let width = self.measure(node, &self.state.style);
        cursor.x += anchor_shift(self.state.style.text_anchor, width);

        let composite = self.begin_composite(node);
        self.render_text_children(node, &mut cursor);
        self.end_composite(composite);
    }

    fn render_text_children(&mut self, node: NodeIndex, cursor: &mut TextCursor) {
        let doc = self.doc;
        for child in doc.children(node) {
            match &doc.node(child).kind {
                NodeKind::TextContent(text) => self.draw_text_run(text, cursor),
                NodeKind::TSpan(positions) => {
                    if self.enter_text_child(child) {
                        cursor.apply(positions, &self.length_ctx());
                        self.render_text_children(child, cursor);
                    }
                    self.pop();
                }
                NodeKind::TRef { href } => {
                    if self.enter_text_child(child)
                        && let Some(text) = href.as_deref().and_then(|href| self.referenced_text(href))
                    {
                        self.draw_text_run(&text, cursor);
                    }
                    self.pop();
                }
                NodeKind::TextPath(reference) => {
                    if self.enter_text_child(child) {
                        self.render_text_path(child, reference, cursor);
                    }
                    self.pop();
                }
                _ => {}
            }
        }
    }

    /// Push a frame for a text child and cascade its style. Returns false
    /// when it is not displayed; the caller pops either way.
    fn enter_text_child(&mut self, child: NodeIndex) -> bool {
        self.push();
        self.state.style = self.styles.cascade(child, &self.state.style, false);
        self.state.style.display != Some(false)
    }

    /// Draw one run at the cursor and advance past it.
    fn draw_text_run(&mut self, text: &str, cursor: &mut TextCursor) {
        if text.is_empty() {
            return;
        }
        let style = self.state.style.clone();
        let font = self.font_spec(&style);
        let advance = self.surface.measure_text(text, &font);

        if style.visibility != Some(false) {
            let bounds = Some(Bounds::new(cursor.x, cursor.y - font.size, advance, font.size));
            let fill_opacity = style.fill_opacity.unwrap_or(1.0);
            match self.resolve_paint(style.fill.as_ref(), fill_opacity, bounds, &style) {
                Some(ResolvedPaint::Brush(brush)) => {
                    let paint = PaintState::fill(brush, FillRule::NonZero);
                    self.surface.draw_text(text, cursor.x, cursor.y, &font, &paint);
                }
                Some(ResolvedPaint::Pattern(_)) => log::debug!("Pattern fills on text are not supported"),
                None => {}
            }
            if let Some(stroke) = self.stroke_style(&style) {
                let stroke_opacity = style.stroke_opacity.unwrap_or(1.0);
                match self.resolve_paint(style.stroke.as_ref(), stroke_opacity, bounds, &style) {
                    Some(ResolvedPaint::Brush(brush)) => {
                        let paint = PaintState::stroke(brush, stroke);
                        self.surface.draw_text(text, cursor.x, cursor.y, &font, &paint);
                    }
                    Some(ResolvedPaint::Pattern(_)) => log::debug!("Pattern strokes are not supported"),
                    None => {}
                }
            }
        }
        cursor.x += advance;
    }

    /// Place the run at `startOffset` along the referenced path, rotated to
    /// the path direction there. Runs starting off the path are dropped.
    fn render_text_path(&mut self, node: NodeIndex, reference: &TextPathRef, cursor: &mut TextCursor) {
        let doc = self.doc;
        let Some(href) = reference.href.as_deref() else {
            return;
        };
        let Some(target) = doc.resolve_iri(href) else {
            log::warn!("<textPath> references missing element {href}");
            return;
        };
        let NodeKind::Path(data) = &doc.node(target).kind else {
            log::warn!("<textPath> reference {href} is not a <path>");
            return;
        };

        let own = doc.node(target).own_transform().unwrap_or(Affine::IDENTITY);
        let path = transform_path(&data.d, own).to_bez_path();
        let total = path_length(&path);
        let ctx = self.length_ctx();
        let offset = match reference.start_offset {
            Some(l) if l.unit == Unit::Percent => f64::from(l.fraction()) * total,
            Some(l) => f64::from(l.to_px(&ctx)),
            None => 0.0,
        };
        let Some((point, angle)) = point_at_length(&path, offset) else {
            log::debug!("<textPath> start offset {offset} is off the path");
            return;
        };

        self.surface.save();
        self.surface
            .concat(Affine::translate((point.x, point.y)) * Affine::rotate(angle));
        let mut local = TextCursor::default();
        self.render_text_children(node, &mut local);
        self.surface.restore();

        let advance = f64::from(local.x);
        cursor.x = (point.x + advance * angle.cos()) as f32;
        cursor.y = (point.y + advance * angle.sin()) as f32;
    }

    /// Font for `style`, with the first family the resolver knows.
    fn font_spec(&self, style: &Style) -> FontSpec {
        let families = style.font_family.clone().unwrap_or_default();
        let weight = style.font_weight.map_or(400, |w| w.resolve(400));
        let font_style = style.font_style.unwrap_or(FontStyle::Normal);
        let handle = self.config.resolver().and_then(|resolver| {
            families
                .iter()
                .find_map(|family| resolver.resolve_font(family, weight, font_style))
        });
        FontSpec {
            families,
            handle,
            size: self.font_size(style),
            weight,
            style: font_style,
            decoration: style.text_decoration.unwrap_or(TextDecoration::None),
        }
    }

    /// Concatenated character data under the element `href` names.
    fn referenced_text(&self, href: &str) -> Option<String> {
        let doc = self.doc;
        let Some(target) = doc.resolve_iri(href) else {
            log::warn!("<tref> references missing element {href}");
            return None;
        };
        let text: String = doc
            .descendants(target)
            .into_iter()
            .filter_map(|n| match &doc.node(n).kind {
                NodeKind::TextContent(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        Some(text)
    }

    /// Advance width of the inline content of `node` laid out with `style`.
    /// `<textPath>` content is positioned separately and not counted.
    fn measure(&self, node: NodeIndex, style: &Style) -> f32 {
        let doc = self.doc;
        let mut width = 0.0;
        for child in doc.children(node) {
            match &doc.node(child).kind {
                NodeKind::TextContent(text) => {
                    width += self.surface.measure_text(text, &self.font_spec(style));
                }
                NodeKind::TSpan(positions) => {
                    let child_style = self.styles.cascade(child, style, false);
                    if child_style.display == Some(false) {
                        continue;
                    }
                    if let Some(dx) = positions.dx.as_ref().and_then(|d| d.first()) {
                        width += dx.to_px_x(&self.length_ctx());
                    }
                    width += self.measure(child, &child_style);
                }
                NodeKind::TRef { href } => {
                    let child_style = self.styles.cascade(child, style, false);
                    if child_style.display == Some(false) {
                        continue;
                    }
                    if let Some(text) = href.as_deref().and_then(|href| self.referenced_text(href)) {
                        width += self.surface.measure_text(&text, &self.font_spec(&child_style));
                    }
                }
                _ => {}
            }
        }
        width
    }

    /// Estimated box of a `<text>` element: measured width by one font
    /// size above the baseline.
    pub(crate) fn text_bounds(&self, node: NodeIndex) -> Option<Bounds> {
        let NodeKind::Text(positions) = &self.doc.node(node).kind else {
            return None;
        };
        let style = self.styles.resolve(node);
        let mut cursor = TextCursor::default();
        cursor.apply(positions, &self.length_ctx());
        let width = self.measure(node, &style);
        if width <= 0.0 {
            return None;
        }
        let size = self.font_size(&style);
        Some(Bounds::new(
            cursor.x + anchor_shift(style.text_anchor, width),
            cursor.y - size,
            width,
            size,
        ))
    }
}

fn path_length(path: &BezPath) -> f64 {
    path.segments().map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum()
}

/// Point at `distance` along `path` and the direction there in radians.
fn point_at_length(path: &BezPath, distance: f64) -> Option<(Point, f64)> {
    if distance < 0.0 {
        return None;
    }
    let mut remaining = distance;
    for seg in path.segments() {
        let length = seg.arclen(ARCLEN_ACCURACY);
        if remaining <= length && length > 0.0 {
            let t = seg.inv_arclen(remaining, ARCLEN_ACCURACY);
            let before = seg.eval((t - 1e-3).max(0.0));
            let after = seg.eval((t + 1e-3).min(1.0));
            return Some((seg.eval(t), (after - before).atan2()));
        }
        remaining -= length;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use svx_core::parse_path;

    fn ctx() -> LengthContext {
        LengthContext {
            dpi: 96.0,
            font_size: 16.0,
            viewport: Bounds::new(0.0, 0.0, 200.0, 100.0),
        }
    }

    #[test]
    fn cursor_takes_first_position_and_offsets() {
        let positions = TextPositions {
            x: Some(vec![Length::px(10.0), Length::px(20.0)]),
            y: Some(vec![Length::new(50.0, Unit::Percent)]),
            dx: Some(vec![Length::px(2.0)]),
            dy: None,
        };
        let mut cursor = TextCursor::default();
        cursor.apply(&positions, &ctx());
        assert_eq!(cursor, TextCursor { x: 12.0, y: 50.0 });
    }

    #[test]
    fn anchors() {
        assert_eq!(anchor_shift(None, 10.0), 0.0);
        assert_eq!(anchor_shift(Some(TextAnchor::Middle), 10.0), -5.0);
        assert_eq!(anchor_shift(Some(TextAnchor::End), 10.0), -10.0);
    }

    #[test]
    fn points_along_a_path() {
        let path = parse_path("M0,0 L10,0 L10,10").to_bez_path();
        assert!((path_length(&path) - 20.0).abs() < 1e-6);

        let (p, angle) = point_at_length(&path, 5.0).unwrap();
        assert!((p.x - 5.0).abs() < 1e-6 && p.y.abs() < 1e-6, "{p:?}");
        assert!(angle.abs() < 1e-6);

        let (p, angle) = point_at_length(&path, 15.0).unwrap();
        assert!((p.x - 10.0).abs() < 1e-6 && (p.y - 5.0).abs() < 1e-6, "{p:?}");
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-6);

        assert!(point_at_length(&path, 25.0).is_none());
        assert!(point_at_length(&path, -1.0).is_none());
    }
}
