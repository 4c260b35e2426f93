//! Document tree → drawing operations.
//!
//! Walks the tree depth first in document order. Every rendered element
//! pushes a state frame (surface `save` plus a copy of the current style
//! and viewport) and pops it when done. Elements reached through a
//! reference (`<use>`, markers, patterns, clip paths, masks) are tracked in
//! an active set so reference cycles are skipped instead of recursing.

use std::collections::HashSet;

use kurbo::{Affine, Rect};
use svx_core::model::{HasTransform, UseRef, ViewBoxAttrs, Viewport};
use svx_core::values::{FillRule, LengthContext, Unit};
use svx_core::{
    Bounds, Color, Config, Document, ImageAttrs, Length, NodeIndex, NodeKind, Paint, PathProgram, PreserveAspectRatio, Result, Source,
    Style, StyleResolver, default_style,
};
use svx_core::{Conditional, CssParser};

use crate::aspect::view_box_transform;
use crate::geometry::{bbox_transform, path_bounds, rect_path, shape_path, transform_bounds, transform_path};
use crate::options::RenderOptions;
use crate::surface::{Brush, DrawingSurface, Layer, PaintState};

/// Viewport used when neither the options nor the document give a size.
pub const DEFAULT_VIEWPORT: Bounds = Bounds::new(0.0, 0.0, 512.0, 512.0);

/// Font size assumed when converting a font size that is itself relative.
const BASE_FONT_SIZE: f32 = 16.0;

/// Nesting limit for bounding-box queries that follow references.
const MAX_REFERENCE_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub(crate) struct RenderState {
    pub(crate) style: Style,
    /// Viewport in current user units. Percentages resolve against it.
    pub(crate) viewport: Bounds,
}

/// Layers and masks opened for one element.
pub(crate) struct Composite {
    layers: usize,
    mask: Option<NodeIndex>,
    bounds: Option<Bounds>,
}

/// Renders one document into one surface.
pub struct Renderer<'a, S: DrawingSurface + ?Sized> {
    pub(crate) doc: &'a Document,
    pub(crate) config: &'a Config,
    pub(crate) options: &'a RenderOptions,
    pub(crate) styles: StyleResolver<'a>,
    pub(crate) surface: &'a mut S,
    pub(crate) state: RenderState,
    stack: Vec<RenderState>,
    /// Referenced elements currently being rendered.
    pub(crate) active: HashSet<NodeIndex>,
    /// Element rendered instead of the whole document.
    target: Option<NodeIndex>,
}

impl<'a, S: DrawingSurface + ?Sized> Renderer<'a, S> {
    /// Prepare a render. Fails only when the options' style sheet is invalid.
    pub fn new(doc: &'a Document, config: &'a Config, options: &'a RenderOptions, surface: &'a mut S) -> Result<Self> {
        let mut styles = StyleResolver::new(doc);
        if let Some(css) = options.css.as_deref().filter(|_| options.has_css()) {
            let rules = CssParser::new(Source::RenderOptions)
                .with_resolver(config.resolver())
                .parse(css)?;
            styles = styles.with_rules(rules);
        }
        if let Some(id) = &options.target_element {
            let target = doc.element_by_id(id);
            if target.is_none() {
                log::warn!(":target element #{id} not found");
            }
            styles = styles.with_target(target);
        }

        Ok(Self {
            doc,
            config,
            options,
            styles,
            surface,
            state: RenderState {
                style: default_style(),
                viewport: DEFAULT_VIEWPORT,
            },
            stack: Vec::new(),
            active: HashSet::new(),
            target: None,
        })
    }

    /// Emit the whole document, or the options' target subtree.
    pub fn render(&mut self) {
        let doc = self.doc;
        let root = doc.root();
        let NodeKind::Svg(root_vp) = &doc.node(root).kind else {
            return;
        };

        if let Some(id) = &self.options.target {
            match doc.element_by_id(id) {
                Some(target) => self.target = Some(target),
                None => {
                    log::warn!("Render target #{id} not found; nothing rendered");
                    return;
                }
            }
        }

        let view = self.options.view.as_deref().and_then(|id| match doc.element_by_id(id) {
            Some(n) => match &doc.node(n).kind {
                NodeKind::View(attrs) => Some(attrs),
                _ => {
                    log::warn!("#{id} is not a <view> element");
                    None
                }
            },
            None => {
                log::warn!("View #{id} not found");
                None
            }
        });

        let view_box = self
            .options
            .view_box
            .or_else(|| view.and_then(|v| v.view_box))
            .or(root_vp.view_box);
        let aspect = self
            .options
            .preserve_aspect_ratio
            .or_else(|| view.and_then(|v| v.aspect))
            .or(root_vp.aspect)
            .unwrap_or_default();
        let viewport = self.initial_viewport(view_box);

        log::debug!(
            "Rendering {} nodes into {}x{} at ({}, {})",
            doc.len(),
            viewport.width,
            viewport.height,
            viewport.min_x,
            viewport.min_y
        );

        self.state.viewport = viewport;
        self.push();
        self.state.style = self.styles.cascade(root, &default_style(), true);
        if self.state.style.display != Some(false) {
            self.render_viewport(root, viewport, view_box, aspect);
        }
        self.pop();
    }

    fn initial_viewport(&self, view_box: Option<Bounds>) -> Bounds {
        if let Some(viewport) = self.options.viewport {
            return viewport;
        }
        match (self.doc.document_width(), self.doc.document_height()) {
            (Some(w), Some(h)) => Bounds::new(0.0, 0.0, w, h),
            _ => view_box.map_or(DEFAULT_VIEWPORT, |vb| Bounds::new(0.0, 0.0, vb.width, vb.height)),
        }
    }

    // ─── State ───────────────────────────────────────────────────────────────

    pub(crate) fn push(&mut self) {
        self.surface.save();
        self.stack.push(self.state.clone());
    }

    pub(crate) fn pop(&mut self) {
        self.surface.restore();
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    pub(crate) fn length_ctx(&self) -> LengthContext {
        LengthContext {
            dpi: self.doc.dpi(),
            font_size: self.font_size(&self.state.style),
            viewport: self.state.viewport,
        }
    }

    /// Font size of `style` in px. Cascaded sizes are always absolute.
    pub(crate) fn font_size(&self, style: &Style) -> f32 {
        let ctx = LengthContext {
            dpi: self.doc.dpi(),
            font_size: BASE_FONT_SIZE,
            viewport: self.state.viewport,
        };
        style
            .font_size
            .map_or(BASE_FONT_SIZE, |size| size.to_px_of(&ctx, BASE_FONT_SIZE))
    }

    pub(crate) fn concat_own_transform(&mut self, node: NodeIndex) {
        if let Some(transform) = self.doc.node(node).own_transform() {
            self.surface.concat(transform);
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────────

    /// Render one element with the current state as its parent context.
    pub(crate) fn render_node(&mut self, node: NodeIndex) {
        let doc = self.doc;
        let element = doc.node(node);
        if !element.is_element() || element.is_not_directly_rendered() {
            return;
        }
        log::trace!("Render <{}>", element.name());

        self.push();
        self.state.style = self.styles.cascade(node, &self.state.style, false);
        if self.state.style.display == Some(false) {
            self.pop();
            return;
        }

        match &element.kind {
            NodeKind::Svg(vp) => self.render_nested_svg(node, vp, None, None),
            NodeKind::Group | NodeKind::Anchor { .. } => self.render_group(node),
            NodeKind::Switch => self.render_switch(node),
            NodeKind::Use(reference) => self.render_use(node, reference),
            NodeKind::Text(_) => self.render_text(node),
            NodeKind::Image(image) => self.render_image(node, image),
            NodeKind::Path(_)
            | NodeKind::Rect(_)
            | NodeKind::Circle(_)
            | NodeKind::Ellipse(_)
            | NodeKind::Line(_)
            | NodeKind::Polyline(_)
            | NodeKind::Polygon(_) => self.render_shape(node),
            _ => log::debug!("<{}> is not rendered here", element.name()),
        }

        self.pop();
    }

    pub(crate) fn render_children(&mut self, node: NodeIndex) {
        for child in self.doc.element_children(node) {
            self.render_node(child);
        }
    }

    // ─── Containers ──────────────────────────────────────────────────────────

    fn render_group(&mut self, node: NodeIndex) {
        self.concat_own_transform(node);
        let composite = self.begin_composite(node);
        self.render_children(node);
        self.end_composite(composite);
    }

    /// Render the first direct child whose conditional attributes pass.
    fn render_switch(&mut self, node: NodeIndex) {
        self.concat_own_transform(node);
        let doc = self.doc;
        let chosen = doc.element_children(node).into_iter().find(|&child| {
            let element = doc.node(child);
            !element.is_not_directly_rendered()
                && element
                    .conditions()
                    .is_none_or(|conditions| conditions.evaluate(self.config))
        });
        let Some(chosen) = chosen else {
            log::debug!("No <switch> branch passed its conditions");
            return;
        };
        let composite = self.begin_composite(node);
        self.render_node(chosen);
        self.end_composite(composite);
    }

    fn render_nested_svg(&mut self, node: NodeIndex, vp: &Viewport, width: Option<Length>, height: Option<Length>) {
        let ctx = self.length_ctx();
        let full = Length::new(100.0, Unit::Percent);
        let viewport = Bounds::new(
            vp.x.map_or(0.0, |x| x.to_px_x(&ctx)),
            vp.y.map_or(0.0, |y| y.to_px_y(&ctx)),
            width.or(vp.width).unwrap_or(full).to_px_x(&ctx),
            height.or(vp.height).unwrap_or(full).to_px_y(&ctx),
        );
        self.render_viewport(node, viewport, vp.view_box, vp.aspect.unwrap_or_default());
    }

    fn render_symbol(&mut self, node: NodeIndex, attrs: &ViewBoxAttrs, width: Option<Length>, height: Option<Length>) {
        let ctx = self.length_ctx();
        let full = Length::new(100.0, Unit::Percent);
        let viewport = Bounds::new(
            0.0,
            0.0,
            width.unwrap_or(full).to_px_x(&ctx),
            height.unwrap_or(full).to_px_y(&ctx),
        );
        self.render_viewport(node, viewport, attrs.view_box, attrs.aspect.unwrap_or_default());
    }

    /// Establish a new viewport and render the element's children into it.
    fn render_viewport(
        &mut self,
        node: NodeIndex,
        viewport: Bounds,
        view_box: Option<Bounds>,
        aspect: PreserveAspectRatio,
    ) {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            log::debug!("Skipping <{}> with an empty viewport", self.doc.node(node).name());
            return;
        }
        if view_box.is_some_and(|vb| vb.width <= 0.0 || vb.height <= 0.0) {
            return;
        }

        if self.state.style.overflow == Some(false) {
            let clip = self.viewport_clip(&viewport);
            self.surface.clip_rect(clip);
        }
        self.fill_viewport(&viewport);

        let composite = self.begin_composite(node);
        match view_box {
            Some(vb) => {
                self.surface.concat(view_box_transform(&viewport, &vb, aspect));
                self.state.viewport = vb;
            }
            None => {
                self.surface.concat(Affine::translate((
                    f64::from(viewport.min_x),
                    f64::from(viewport.min_y),
                )));
                self.state.viewport = Bounds::new(0.0, 0.0, viewport.width, viewport.height);
            }
        }

        if node == self.doc.root()
            && let Some(target) = self.target
            && target != node
        {
            self.render_target(target);
        } else {
            self.render_children(node);
        }
        self.end_composite(composite);
    }

    /// Viewport rectangle, narrowed by the `clip` property when set.
    fn viewport_clip(&self, viewport: &Bounds) -> Rect {
        let Some(clip) = &self.state.style.clip else {
            return viewport.to_rect();
        };
        let ctx = self.length_ctx();
        let left = viewport.min_x + clip.left.to_px_x(&ctx);
        let top = viewport.min_y + clip.top.to_px_y(&ctx);
        let right = viewport.min_x + clip.right.to_px_x(&ctx);
        let bottom = viewport.min_y + clip.bottom.to_px_y(&ctx);
        Bounds::from_limits(left, top, right.max(left), bottom.max(top)).to_rect()
    }

    fn fill_viewport(&mut self, viewport: &Bounds) {
        let style = &self.state.style;
        let color = match style.viewport_fill {
            Some(Paint::Color(c)) => c,
            Some(Paint::CurrentColor) => style.color.unwrap_or(Color::BLACK),
            _ => return,
        };
        let color = color.with_opacity(style.viewport_fill_opacity.unwrap_or(1.0));
        if let Some(rect) = rect_path(viewport.min_x, viewport.min_y, viewport.width, viewport.height, None, None) {
            let paint = PaintState::fill(Brush::Solid(color), FillRule::NonZero);
            self.surface.draw_path(&rect, &paint);
        }
    }

    /// Render only `target`, with its ancestors' styles and transforms in
    /// effect but none of their other content.
    fn render_target(&mut self, target: NodeIndex) {
        let doc = self.doc;
        let mut chain = doc.ancestors(target);
        chain.reverse();
        // the root frame is already open
        let intermediate: Vec<NodeIndex> = chain.into_iter().filter(|&n| n != doc.root()).collect();

        for &ancestor in &intermediate {
            self.push();
            self.state.style = self.styles.cascade(ancestor, &self.state.style, false);
            self.concat_own_transform(ancestor);
        }
        self.render_node(target);
        for _ in &intermediate {
            self.pop();
        }
    }

    // ─── <use> ───────────────────────────────────────────────────────────────

    fn render_use(&mut self, node: NodeIndex, reference: &UseRef) {
        let doc = self.doc;
        let Some(href) = reference.href.as_deref() else {
            return;
        };
        let Some(target) = doc.resolve_iri(href) else {
            log::warn!("<use> references missing element {href}");
            return;
        };
        if target == node || self.active.contains(&target) || doc.ancestors(node).contains(&target) {
            log::warn!("Skipping cyclic <use> reference to {href}");
            return;
        }

        self.concat_own_transform(node);
        // clip and mask live in the <use> user space; element_bounds already
        // carries the x/y offset
        let composite = self.begin_composite(node);
        let ctx = self.length_ctx();
        let x = reference.x.map_or(0.0, |x| x.to_px_x(&ctx));
        let y = reference.y.map_or(0.0, |y| y.to_px_y(&ctx));
        self.surface.save();
        if x != 0.0 || y != 0.0 {
            self.surface.concat(Affine::translate((f64::from(x), f64::from(y))));
        }

        self.active.insert(target);
        match &doc.node(target).kind {
            NodeKind::Symbol(attrs) => {
                self.push();
                self.state.style = self.styles.cascade(target, &self.state.style, false);
                if self.state.style.display != Some(false) {
                    self.render_symbol(target, attrs, reference.width, reference.height);
                }
                self.pop();
            }
            NodeKind::Svg(vp) => {
                self.push();
                self.state.style = self.styles.cascade(target, &self.state.style, false);
                if self.state.style.display != Some(false) {
                    self.render_nested_svg(target, vp, reference.width, reference.height);
                }
                self.pop();
            }
            _ => self.render_node(target),
        }
        self.active.remove(&target);
        self.surface.restore();
        self.end_composite(composite);
    }

    // ─── Leaves ──────────────────────────────────────────────────────────────

    fn render_shape(&mut self, node: NodeIndex) {
        let doc = self.doc;
        let element = doc.node(node);
        self.concat_own_transform(node);
        let ctx = self.length_ctx();
        let Some(path) = shape_path(&element.kind, &ctx) else {
            return;
        };

        let composite = self.begin_composite(node);
        if self.state.style.visibility != Some(false) {
            self.fill_and_stroke(&path);
            if matches!(
                element.kind,
                NodeKind::Path(_) | NodeKind::Line(_) | NodeKind::Polyline(_) | NodeKind::Polygon(_)
            ) {
                self.render_markers(&path);
            }
        }
        self.end_composite(composite);
    }

    fn render_image(&mut self, node: NodeIndex, image: &ImageAttrs) {
        self.concat_own_transform(node);
        let ctx = self.length_ctx();
        let (Some(width), Some(height)) = (image.width, image.height) else {
            return;
        };
        let viewport = Bounds::new(
            image.x.map_or(0.0, |x| x.to_px_x(&ctx)),
            image.y.map_or(0.0, |y| y.to_px_y(&ctx)),
            width.to_px_x(&ctx),
            height.to_px_y(&ctx),
        );
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return;
        }
        let Some(href) = image.href.as_deref() else {
            return;
        };
        let Some(handle) = self.config.resolver().and_then(|r| r.resolve_image(href)) else {
            log::warn!("Image {href} could not be resolved");
            return;
        };

        let composite = self.begin_composite(node);
        if self.state.style.visibility != Some(false) {
            self.surface.save();
            if self.state.style.overflow == Some(false) {
                self.surface.clip_rect(viewport.to_rect());
            }
            let intrinsic = Bounds::new(0.0, 0.0, handle.width, handle.height);
            self.surface.concat(view_box_transform(
                &viewport,
                &intrinsic,
                image.aspect.unwrap_or_default(),
            ));
            self.surface.draw_bitmap(&handle, 0.0, 0.0, &PaintState::opaque());
            self.surface.restore();
        }
        self.end_composite(composite);
    }

    // ─── Compositing: clip-path, mask, opacity ───────────────────────────────

    pub(crate) fn begin_composite(&mut self, node: NodeIndex) -> Composite {
        let style = &self.state.style;
        let opacity = style.opacity.unwrap_or(1.0);
        let clip_path = style.clip_path.clone();
        let mask_href = style.mask.clone();

        let bounds = if clip_path.is_some() || mask_href.is_some() {
            self.element_bounds(node, 0)
        } else {
            None
        };

        if let Some(href) = clip_path {
            self.apply_clip_path(&href, bounds);
        }

        let mask = mask_href.and_then(|href| match self.doc.resolve_iri(&href) {
            Some(m) if matches!(self.doc.node(m).kind, NodeKind::Mask(_)) => Some(m),
            _ => {
                log::warn!("mask reference {href} does not resolve to a <mask>");
                None
            }
        });

        let layers = if opacity < 1.0 || mask.is_some() {
            self.surface.save_layer(Layer::Opacity(opacity));
            1
        } else {
            0
        };
        Composite { layers, mask, bounds }
    }

    pub(crate) fn end_composite(&mut self, composite: Composite) {
        if let Some(mask) = composite.mask {
            self.surface.save_layer(Layer::LuminanceMask);
            self.render_mask(mask, composite.bounds);
            self.surface.restore();
        }
        for _ in 0..composite.layers {
            self.surface.restore();
        }
    }

    /// Intersect the clip with the union of a `<clipPath>`'s children.
    fn apply_clip_path(&mut self, href: &str, bounds: Option<Bounds>) {
        let doc = self.doc;
        let Some(clip) = doc.resolve_iri(href) else {
            log::warn!("clip-path reference {href} not found");
            return;
        };
        let NodeKind::ClipPath { units_user_space } = doc.node(clip).kind else {
            log::warn!("clip-path reference {href} is not a <clipPath>");
            return;
        };
        if !self.active.insert(clip) {
            log::warn!("Skipping cyclic clip-path {href}");
            return;
        }

        let clip_style = self.styles.resolve(clip);
        let mut transform = doc.node(clip).transform.unwrap_or(Affine::IDENTITY);
        if !units_user_space.unwrap_or(true) {
            match bounds {
                Some(b) => transform = transform * bbox_transform(&b),
                None => {
                    // nothing to size the clip against: clip everything
                    self.surface.clip_rect(Rect::ZERO);
                    self.active.remove(&clip);
                    return;
                }
            }
        }

        if let Some(nested) = clip_style.clip_path.clone() {
            self.apply_clip_path(&nested, bounds);
        }

        let ctx = self.length_ctx();
        let mut combined = PathProgram::new();
        let mut rule = None;
        for child in doc.element_children(clip) {
            let child_style = self.styles.cascade(child, &clip_style, false);
            if child_style.display == Some(false) || child_style.visibility == Some(false) {
                continue;
            }
            let Some(path) = self.clip_child_path(child, &ctx) else {
                continue;
            };
            let own = doc.node(child).own_transform().unwrap_or(Affine::IDENTITY);
            transform_path(&path, own).replay(&mut combined);
            rule = rule.or(child_style.clip_rule);
        }

        self.surface
            .clip_path(&transform_path(&combined, transform), rule.unwrap_or(FillRule::NonZero));
        self.active.remove(&clip);
    }

    /// Geometry a clip path child contributes: shapes directly, `<use>`
    /// through its target.
    fn clip_child_path(&self, child: NodeIndex, ctx: &LengthContext) -> Option<PathProgram> {
        let doc = self.doc;
        match &doc.node(child).kind {
            NodeKind::Use(reference) => {
                let target = doc.resolve_iri(reference.href.as_deref()?)?;
                let path = shape_path(&doc.node(target).kind, ctx)?;
                let offset = Affine::translate((
                    f64::from(reference.x.map_or(0.0, |x| x.to_px_x(ctx))),
                    f64::from(reference.y.map_or(0.0, |y| y.to_px_y(ctx))),
                ));
                let own = doc.node(target).own_transform().unwrap_or(Affine::IDENTITY);
                Some(transform_path(&path, offset * own))
            }
            NodeKind::Text(_) => {
                log::debug!("Text inside <clipPath> is not supported");
                None
            }
            kind => shape_path(kind, ctx),
        }
    }

    fn render_mask(&mut self, mask: NodeIndex, bounds: Option<Bounds>) {
        let doc = self.doc;
        let NodeKind::Mask(attrs) = &doc.node(mask).kind else {
            return;
        };
        if !self.active.insert(mask) {
            log::warn!("Skipping cyclic mask reference");
            return;
        }

        let ctx = self.length_ctx();
        let x = attrs.x.unwrap_or(Length::new(-10.0, Unit::Percent));
        let y = attrs.y.unwrap_or(Length::new(-10.0, Unit::Percent));
        let w = attrs.width.unwrap_or(Length::new(120.0, Unit::Percent));
        let h = attrs.height.unwrap_or(Length::new(120.0, Unit::Percent));
        let region = if attrs.units_user_space.unwrap_or(false) {
            Some(Bounds::new(x.to_px_x(&ctx), y.to_px_y(&ctx), w.to_px_x(&ctx), h.to_px_y(&ctx)))
        } else {
            bounds.map(|b| {
                Bounds::new(
                    b.min_x + x.fraction() * b.width,
                    b.min_y + y.fraction() * b.height,
                    w.fraction() * b.width,
                    h.fraction() * b.height,
                )
            })
        };

        if let Some(region) = region.filter(|r| r.width > 0.0 && r.height > 0.0) {
            self.push();
            self.state.style = self.styles.resolve(mask);
            self.surface.clip_rect(region.to_rect());
            let content_in_bbox = !attrs.content_units_user_space.unwrap_or(true);
            match bounds {
                Some(b) if content_in_bbox => self.surface.concat(bbox_transform(&b)),
                None if content_in_bbox => {
                    self.pop();
                    self.active.remove(&mask);
                    return;
                }
                _ => {}
            }
            self.render_children(mask);
            self.pop();
        }
        self.active.remove(&mask);
    }

    // ─── Bounding boxes ──────────────────────────────────────────────────────

    /// Bounding box of `node` in its own user space, before its transform.
    pub(crate) fn element_bounds(&self, node: NodeIndex, depth: usize) -> Option<Bounds> {
        if depth > MAX_REFERENCE_DEPTH {
            return None;
        }
        let doc = self.doc;
        let ctx = self.length_ctx();
        match &doc.node(node).kind {
            NodeKind::Text(_) => self.text_bounds(node),
            NodeKind::Image(image) => Some(Bounds::new(
                image.x.map_or(0.0, |x| x.to_px_x(&ctx)),
                image.y.map_or(0.0, |y| y.to_px_y(&ctx)),
                image.width?.to_px_x(&ctx),
                image.height?.to_px_y(&ctx),
            )),
            NodeKind::Svg(vp) => Some(Bounds::new(
                vp.x.map_or(0.0, |x| x.to_px_x(&ctx)),
                vp.y.map_or(0.0, |y| y.to_px_y(&ctx)),
                vp.width.map_or(ctx.viewport.width, |w| w.to_px_x(&ctx)),
                vp.height.map_or(ctx.viewport.height, |h| h.to_px_y(&ctx)),
            )),
            NodeKind::Use(reference) => {
                let target = doc.resolve_iri(reference.href.as_deref()?)?;
                let inner = self.transformed_bounds(target, depth + 1)?;
                let offset = Affine::translate((
                    f64::from(reference.x.map_or(0.0, |x| x.to_px_x(&ctx))),
                    f64::from(reference.y.map_or(0.0, |y| y.to_px_y(&ctx))),
                ));
                Some(transform_bounds(&inner, offset))
            }
            NodeKind::Group | NodeKind::Anchor { .. } | NodeKind::Switch => doc
                .element_children(node)
                .into_iter()
                .filter_map(|child| self.transformed_bounds(child, depth + 1))
                .reduce(|a, b| a.union(&b)),
            kind => shape_path(kind, &ctx).and_then(|p| path_bounds(&p)),
        }
    }

    /// Bounds of `node` mapped through its own transform.
    fn transformed_bounds(&self, node: NodeIndex, depth: usize) -> Option<Bounds> {
        let bounds = self.element_bounds(node, depth)?;
        Some(match self.doc.node(node).own_transform() {
            Some(t) => transform_bounds(&bounds, t),
            None => bounds,
        })
    }
}
