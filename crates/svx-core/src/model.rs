//! The parsed SVG document tree.
//!
//! Elements live in a `petgraph` stable graph with edges from parent to
//! child. Nodes are appended in document order, so sorting a node's
//! children by index yields their source order. The tree is immutable once
//! the builder hands it over; rendering and style resolution only borrow it.

use std::collections::HashMap;

use kurbo::Affine;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;

use crate::attr::Tag;
use crate::config::Config;
use crate::css::Ruleset;
use crate::id::Atom;
use crate::path::PathProgram;
use crate::style::Style;
use crate::values::{Bounds, FontStyle, Length, PreserveAspectRatio, Unit};

// ─── Element payloads ────────────────────────────────────────────────────

/// `<svg>`: nested viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Viewport {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub view_box: Option<Bounds>,
    pub aspect: Option<PreserveAspectRatio>,
}

/// `viewBox` + `preserveAspectRatio` for `<symbol>` and `<view>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewBoxAttrs {
    pub view_box: Option<Bounds>,
    pub aspect: Option<PreserveAspectRatio>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UseRef {
    pub href: Option<String>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    pub d: PathProgram,
    pub path_length: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectShape {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub rx: Option<Length>,
    pub ry: Option<Length>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircleShape {
    pub cx: Option<Length>,
    pub cy: Option<Length>,
    pub r: Option<Length>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EllipseShape {
    pub cx: Option<Length>,
    pub cy: Option<Length>,
    pub rx: Option<Length>,
    pub ry: Option<Length>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineShape {
    pub x1: Option<Length>,
    pub y1: Option<Length>,
    pub x2: Option<Length>,
    pub y2: Option<Length>,
}

/// Per-glyph position lists of `<text>` and `<tspan>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPositions {
    pub x: Option<Vec<Length>>,
    pub y: Option<Vec<Length>>,
    pub dx: Option<Vec<Length>>,
    pub dy: Option<Vec<Length>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPathRef {
    pub href: Option<String>,
    pub start_offset: Option<Length>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orient {
    Angle(f32),
    Auto,
}

impl Orient {
    pub fn parse(value: &str) -> Option<Orient> {
        if value == "auto" {
            return Some(Orient::Auto);
        }
        crate::values::parse_float(value).ok().map(Orient::Angle)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerAttrs {
    pub view_box: Option<Bounds>,
    pub aspect: Option<PreserveAspectRatio>,
    /// `markerUnits="userSpaceOnUse"`; the default scales by stroke width.
    pub units_user_space: bool,
    pub ref_x: Option<Length>,
    pub ref_y: Option<Length>,
    pub marker_width: Option<Length>,
    pub marker_height: Option<Length>,
    pub orient: Option<Orient>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadMethod {
    Pad,
    Reflect,
    Repeat,
}

/// Attributes shared by both gradient kinds. Every field is optional so
/// unset values can be inherited through `href`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientAttrs {
    pub units_user_space: Option<bool>,
    pub transform: Option<Affine>,
    pub spread: Option<SpreadMethod>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearGradient {
    pub common: GradientAttrs,
    pub x1: Option<Length>,
    pub y1: Option<Length>,
    pub x2: Option<Length>,
    pub y2: Option<Length>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadialGradient {
    pub common: GradientAttrs,
    pub cx: Option<Length>,
    pub cy: Option<Length>,
    pub r: Option<Length>,
    pub fx: Option<Length>,
    pub fy: Option<Length>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternAttrs {
    pub units_user_space: Option<bool>,
    pub content_units_user_space: Option<bool>,
    pub transform: Option<Affine>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub href: Option<String>,
    pub view_box: Option<Bounds>,
    pub aspect: Option<PreserveAspectRatio>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskAttrs {
    pub units_user_space: Option<bool>,
    pub content_units_user_space: Option<bool>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAttrs {
    pub href: Option<String>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub aspect: Option<PreserveAspectRatio>,
}

/// Conditional processing attributes (`<switch>` children and anything
/// else that can be conditionally rendered).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub required_features: Option<Vec<String>>,
    pub required_extensions: Option<String>,
    pub system_language: Option<Vec<String>>,
    pub required_formats: Option<Vec<String>>,
    pub required_fonts: Option<Vec<String>>,
}

/// SVG 1.1 feature strings (without the `#feature` URL prefix) whose
/// `requiredFeatures` test passes.
pub const SUPPORTED_FEATURES: &[&str] = &[
    "Structure",
    "BasicStructure",
    "ConditionalProcessing",
    "Image",
    "Style",
    "ViewportAttribute",
    "Shape",
    "BasicText",
    "PaintAttribute",
    "BasicPaintAttribute",
    "OpacityAttribute",
    "BasicGraphicsAttribute",
    "Marker",
    "Gradient",
    "Pattern",
    "Clip",
    "BasicClip",
    "Mask",
    "View",
];

impl Conditions {
    pub fn is_empty(&self) -> bool {
        self == &Conditions::default()
    }

    /// Whether every conditional attribute that is present passes. An
    /// attribute present with an empty list always fails.
    pub fn evaluate(&self, config: &Config) -> bool {
        if self.required_extensions.is_some() {
            return false;
        }
        if let Some(languages) = &self.system_language
            && !languages.iter().any(|l| l.eq_ignore_ascii_case(primary_subtag(&config.language)))
        {
            return false;
        }
        if let Some(features) = &self.required_features
            && (features.is_empty() || !features.iter().all(|f| SUPPORTED_FEATURES.contains(&f.as_str())))
        {
            return false;
        }
        if let Some(formats) = &self.required_formats {
            let Some(resolver) = config.resolver() else {
                return false;
            };
            if formats.is_empty() || !formats.iter().all(|f| resolver.is_format_supported(f)) {
                return false;
            }
        }
        if let Some(fonts) = &self.required_fonts {
            let Some(resolver) = config.resolver() else {
                return false;
            };
            if !fonts
                .iter()
                .any(|f| resolver.resolve_font(f, 400, FontStyle::Normal).is_some())
            {
                return false;
            }
        }
        true
    }
}

/// `en-US` -> `en`
pub fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag).trim()
}

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Svg(Viewport),
    Group,
    Anchor { href: Option<String> },
    Defs,
    Switch,
    Use(UseRef),
    Path(PathData),
    Rect(RectShape),
    Circle(CircleShape),
    Ellipse(EllipseShape),
    Line(LineShape),
    /// Flat `x, y` coordinate pairs.
    Polyline(Vec<f32>),
    Polygon(Vec<f32>),
    Text(TextPositions),
    TSpan(TextPositions),
    TRef { href: Option<String> },
    TextPath(TextPathRef),
    /// Character data inside a text element.
    TextContent(String),
    Symbol(ViewBoxAttrs),
    Marker(MarkerAttrs),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
    Stop { offset: f32 },
    ClipPath { units_user_space: Option<bool> },
    Pattern(PatternAttrs),
    Image(ImageAttrs),
    View(ViewBoxAttrs),
    Mask(MaskAttrs),
    SolidColor,
}

/// A node of the document tree. Text content nodes only use `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgNode {
    pub tag: Tag,
    pub id: Option<Atom>,
    pub class_names: SmallVec<[Atom; 2]>,
    /// Style from presentation attributes.
    pub base_style: Style,
    /// Style from the `style` attribute.
    pub inline_style: Style,
    pub transform: Option<Affine>,
    /// `xml:space="preserve"`
    pub space_preserve: Option<bool>,
    pub conditions: Conditions,
    pub kind: NodeKind,
}

impl SvgNode {
    #[must_use]
    pub fn new(tag: Tag, kind: NodeKind) -> Self {
        Self {
            tag,
            id: None,
            class_names: SmallVec::new(),
            base_style: Style::new(),
            inline_style: Style::new(),
            transform: None,
            space_preserve: None,
            conditions: Conditions::default(),
            kind,
        }
    }

    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(Tag::Unsupported, NodeKind::TextContent(content.into()))
    }

    /// False for character data nodes.
    pub fn is_element(&self) -> bool {
        !matches!(self.kind, NodeKind::TextContent(_))
    }

    pub fn name(&self) -> &'static str {
        self.tag.name()
    }

    /// Elements that only render when referenced from elsewhere.
    pub fn is_not_directly_rendered(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Defs
                | NodeKind::Symbol(_)
                | NodeKind::Marker(_)
                | NodeKind::LinearGradient(_)
                | NodeKind::RadialGradient(_)
                | NodeKind::ClipPath { .. }
                | NodeKind::Pattern(_)
                | NodeKind::View(_)
                | NodeKind::Mask(_)
        )
    }

    pub fn is_text_child(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::TSpan(_) | NodeKind::TRef { .. } | NodeKind::TextPath(_) | NodeKind::TextContent(_)
        )
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_names.iter().any(|c| c.as_str() == class)
    }
}

/// Nodes that may contain children.
pub trait HasChildren {
    fn accepts_children(&self) -> bool;
}

/// Nodes whose `transform` attribute applies to their own rendering.
pub trait HasTransform {
    fn own_transform(&self) -> Option<Affine>;
}

/// Nodes that honour the conditional processing attributes.
pub trait Conditional {
    fn conditions(&self) -> Option<&Conditions>;
}

impl HasChildren for SvgNode {
    fn accepts_children(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Svg(_)
                | NodeKind::Group
                | NodeKind::Anchor { .. }
                | NodeKind::Defs
                | NodeKind::Switch
                | NodeKind::Use(_)
                | NodeKind::Text(_)
                | NodeKind::TSpan(_)
                | NodeKind::TRef { .. }
                | NodeKind::TextPath(_)
                | NodeKind::Symbol(_)
                | NodeKind::Marker(_)
                | NodeKind::LinearGradient(_)
                | NodeKind::RadialGradient(_)
                | NodeKind::ClipPath { .. }
                | NodeKind::Pattern(_)
                | NodeKind::Mask(_)
        )
    }
}

impl HasTransform for SvgNode {
    fn own_transform(&self) -> Option<Affine> {
        match self.kind {
            NodeKind::Group
            | NodeKind::Anchor { .. }
            | NodeKind::Defs
            | NodeKind::Switch
            | NodeKind::Use(_)
            | NodeKind::Path(_)
            | NodeKind::Rect(_)
            | NodeKind::Circle(_)
            | NodeKind::Ellipse(_)
            | NodeKind::Line(_)
            | NodeKind::Polyline(_)
            | NodeKind::Polygon(_)
            | NodeKind::Text(_)
            | NodeKind::ClipPath { .. }
            | NodeKind::Image(_) => self.transform,
            _ => None,
        }
    }
}

impl Conditional for SvgNode {
    fn conditions(&self) -> Option<&Conditions> {
        match self.kind {
            NodeKind::TextContent(_)
            | NodeKind::Stop { .. }
            | NodeKind::LinearGradient(_)
            | NodeKind::RadialGradient(_)
            | NodeKind::SolidColor
            | NodeKind::View(_)
            | NodeKind::Marker(_)
            | NodeKind::Symbol(_)
            | NodeKind::Pattern(_) => None,
            _ => Some(&self.conditions),
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// A parsed SVG document: the element tree, its stylesheet rules and
/// root metadata.
#[derive(Debug, Clone)]
pub struct Document {
    graph: StableDiGraph<SvgNode, ()>,
    root: NodeIndex,
    /// First element carrying each id. Built once, never invalidated: the
    /// tree does not change after parsing, so a miss stays a miss.
    id_index: HashMap<Atom, NodeIndex>,
    css_rules: Ruleset,
    title: Option<String>,
    desc: Option<String>,
    dpi: f32,
}

impl Document {
    /// Create a document whose root is `root`.
    #[must_use]
    pub fn new(root: SvgNode, dpi: f32) -> Self {
        let mut graph = StableDiGraph::new();
        let id = root.id;
        let root = graph.add_node(root);
        let mut id_index = HashMap::new();
        if let Some(id) = id {
            id_index.insert(id, root);
        }
        Self {
            graph,
            root,
            id_index,
            css_rules: Ruleset::new(),
            title: None,
            desc: None,
            dpi,
        }
    }

    /// Append `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: SvgNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        if let Some(id) = id {
            self.id_index.entry(id).or_insert(idx);
        }
        idx
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIndex) -> &mut SvgNode {
        &mut self.graph[idx]
    }

    pub fn add_css_rules(&mut self, rules: Ruleset) {
        self.css_rules.add_all(rules);
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    pub(crate) fn set_description(&mut self, desc: String) {
        self.desc = Some(desc);
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn root_node(&self) -> &SvgNode {
        &self.graph[self.root]
    }

    pub fn node(&self, idx: NodeIndex) -> &SvgNode {
        &self.graph[idx]
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&SvgNode> {
        self.graph.node_weight(idx)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children in document order, including text content nodes.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Element children in document order.
    pub fn element_children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children = self.children(idx);
        children.retain(|&c| self.graph[c].is_element());
        children
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut current = self.parent(idx);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Every node in document (pre-)order.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(n) = stack.pop() {
            out.push(n);
            let children = self.children(n);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeIndex> {
        let atom = Atom::get(id)?;
        self.id_index.get(&atom).copied()
    }

    /// Resolve a local IRI (`#id`, optionally quoted) to an element.
    pub fn resolve_iri(&self, iri: &str) -> Option<NodeIndex> {
        let iri = unquote(iri.trim());
        let id = iri.strip_prefix('#')?;
        if id.is_empty() {
            return None;
        }
        self.element_by_id(id)
    }

    pub fn elements_by_tag(&self, tag: Tag) -> Vec<NodeIndex> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| self.graph[n].is_element() && self.graph[n].tag == tag)
            .collect()
    }

    pub fn css_rules(&self) -> &Ruleset {
        &self.css_rules
    }

    pub fn has_css_rules(&self) -> bool {
        !self.css_rules.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    fn root_viewport(&self) -> Option<&Viewport> {
        match &self.root_node().kind {
            NodeKind::Svg(vp) => Some(vp),
            _ => None,
        }
    }

    /// Absolute width of the root in px, if it has one.
    pub fn document_width(&self) -> Option<f32> {
        self.document_dimensions().map(|b| b.width)
    }

    /// Absolute height of the root in px. A missing height is derived from
    /// the width and the viewBox aspect, or equals the width.
    pub fn document_height(&self) -> Option<f32> {
        self.document_dimensions().map(|b| b.height)
    }

    fn document_dimensions(&self) -> Option<Bounds> {
        let vp = self.root_viewport()?;
        let w = vp.width.filter(|w| is_absolute(w))?;
        let w_px = self.absolute_px(&w);
        let h_px = match vp.height {
            Some(h) if is_absolute(&h) => self.absolute_px(&h),
            Some(_) => return None,
            None => match vp.view_box {
                Some(vb) if vb.width != 0.0 => w_px * vb.height / vb.width,
                _ => w_px,
            },
        };
        Some(Bounds::new(0.0, 0.0, w_px, h_px))
    }

    fn absolute_px(&self, length: &Length) -> f32 {
        let ctx = crate::values::LengthContext {
            dpi: self.dpi,
            font_size: 16.0,
            viewport: Bounds::default(),
        };
        length.to_px_of(&ctx, 0.0)
    }

    pub fn document_view_box(&self) -> Option<Bounds> {
        self.root_viewport()?.view_box
    }

    pub fn document_preserve_aspect_ratio(&self) -> Option<PreserveAspectRatio> {
        self.root_viewport()?.aspect
    }

    /// Width / height from absolute dimensions, else from the viewBox.
    pub fn document_aspect_ratio(&self) -> Option<f32> {
        let vp = self.root_viewport()?;
        if let (Some(w), Some(h)) = (vp.width, vp.height)
            && w.unit != Unit::Percent
            && h.unit != Unit::Percent
        {
            if w.is_zero() || h.is_zero() {
                return None;
            }
            return Some(self.absolute_px(&w) / self.absolute_px(&h));
        }
        match vp.view_box {
            Some(vb) if vb.width != 0.0 && vb.height != 0.0 => Some(vb.width / vb.height),
            _ => None,
        }
    }

    /// Ids of all `<view>` elements.
    pub fn view_list(&self) -> Vec<&str> {
        self.elements_by_tag(Tag::View)
            .into_iter()
            .filter_map(|n| self.graph[n].id.map(|id| id.as_str()))
            .collect()
    }
}

fn is_absolute(length: &Length) -> bool {
    !length.is_zero() && !matches!(length.unit, Unit::Percent | Unit::Em | Unit::Ex)
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2
            && let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q))
        {
            return inner;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svg(width: Option<Length>, height: Option<Length>, view_box: Option<Bounds>) -> Document {
        let root = SvgNode::new(
            Tag::Svg,
            NodeKind::Svg(Viewport {
                width,
                height,
                view_box,
                ..Viewport::default()
            }),
        );
        Document::new(root, 96.0)
    }

    fn element(tag: Tag, id: &str) -> SvgNode {
        let mut node = SvgNode::new(tag, NodeKind::Group);
        node.id = Some(Atom::intern(id));
        node
    }

    #[test]
    fn children_in_document_order() {
        let mut doc = svg(None, None, None);
        let root = doc.root();
        let a = doc.add_child(root, element(Tag::G, "a"));
        let b = doc.add_child(root, element(Tag::G, "b"));
        let a1 = doc.add_child(a, element(Tag::G, "a1"));
        let t = doc.add_child(root, SvgNode::text("hi"));
        assert_eq!(doc.children(root), vec![a, b, t]);
        assert_eq!(doc.element_children(root), vec![a, b]);
        assert_eq!(doc.descendants(root), vec![root, a, a1, b, t]);
        assert_eq!(doc.ancestors(a1), vec![a, root]);
        assert_eq!(doc.parent(root), None);
    }

    #[test]
    fn first_id_wins_and_misses_stay_misses() {
        let mut doc = svg(None, None, None);
        let root = doc.root();
        let first = doc.add_child(root, element(Tag::G, "dup"));
        doc.add_child(root, element(Tag::G, "dup"));
        assert_eq!(doc.element_by_id("dup"), Some(first));
        assert_eq!(doc.resolve_iri("#dup"), Some(first));
        assert_eq!(doc.resolve_iri("'#dup'"), Some(first));
        assert_eq!(doc.element_by_id("never-interned-id-xyz"), None);
        assert_eq!(doc.resolve_iri("dup"), None);
        assert_eq!(doc.resolve_iri("#"), None);
    }

    #[test]
    fn dimensions_and_aspect() {
        let doc = svg(Some(Length::px(200.0)), None, Some(Bounds::new(0.0, 0.0, 100.0, 50.0)));
        assert_eq!(doc.document_width(), Some(200.0));
        assert_eq!(doc.document_height(), Some(100.0));
        assert_eq!(doc.document_aspect_ratio(), Some(2.0));

        let doc = svg(Some(Length::new(1.0, Unit::In)), Some(Length::new(50.0, Unit::Percent)), None);
        assert_eq!(doc.document_width(), None);
        assert_eq!(doc.document_aspect_ratio(), None);

        let doc = svg(Some(Length::new(72.0, Unit::Pt)), Some(Length::px(48.0)), None);
        assert_eq!(doc.document_width(), Some(96.0));
        assert_eq!(doc.document_aspect_ratio(), Some(2.0));
    }

    #[test]
    fn capability_traits() {
        let mut g = SvgNode::new(Tag::G, NodeKind::Group);
        g.transform = Some(Affine::translate((1.0, 2.0)));
        assert!(g.accepts_children());
        assert_eq!(g.own_transform(), Some(Affine::translate((1.0, 2.0))));
        assert!(g.conditions().is_some());

        let mut stop = SvgNode::new(Tag::Stop, NodeKind::Stop { offset: 0.5 });
        stop.transform = Some(Affine::scale(2.0));
        assert!(!stop.accepts_children());
        assert_eq!(stop.own_transform(), None);
        assert!(stop.conditions().is_none());
    }

    #[test]
    fn view_list_collects_ids() {
        let mut doc = svg(None, None, None);
        let root = doc.root();
        let mut view = SvgNode::new(Tag::View, NodeKind::View(ViewBoxAttrs::default()));
        view.id = Some(Atom::intern("zoomed"));
        doc.add_child(root, view);
        assert_eq!(doc.view_list(), vec!["zoomed"]);
    }

    #[test]
    fn conditional_attributes() {
        let config = Config::default().with_language("fr-CA");
        let mut cond = Conditions::default();
        assert!(cond.evaluate(&config));

        cond.system_language = Some(vec!["de".into(), "fr".into()]);
        assert!(cond.evaluate(&config));
        assert!(!cond.evaluate(&Config::default()));

        cond.required_features = Some(vec!["Shape".into(), "Gradient".into()]);
        assert!(cond.evaluate(&config));
        cond.required_features = Some(vec!["Shape".into(), "SVG-animation".into()]);
        assert!(!cond.evaluate(&config));
        cond.required_features = Some(Vec::new());
        assert!(!cond.evaluate(&config));

        let cond = Conditions {
            required_extensions: Some("http://example.org/ext".into()),
            ..Conditions::default()
        };
        assert!(!cond.evaluate(&config));

        let cond = Conditions {
            required_formats: Some(vec!["image/png".into()]),
            ..Conditions::default()
        };
        assert!(!cond.evaluate(&config));
        assert_eq!(primary_subtag("en-US"), "en");
    }
}
