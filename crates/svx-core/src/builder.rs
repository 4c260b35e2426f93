//! Document builder: turns XML events into the [`Document`] tree.
//!
//! Attribute errors on geometry and structure (negative sizes, a bad
//! `viewBox`, an invalid transform list) abort the parse. Bad style
//! property values are dropped with a warning.

use petgraph::graph::NodeIndex;

use crate::attr::{Attr, Tag};
use crate::config::Config;
use crate::css::{CssParser, MediaType, Source, media_matches, parse_class_attribute};
use crate::error::{ParseError, Result, ValueError};
use crate::id::Atom;
use crate::model::{
    CircleShape, Document, EllipseShape, GradientAttrs, ImageAttrs, LineShape,
    LinearGradient, MarkerAttrs, MaskAttrs, NodeKind, Orient, PathData, PatternAttrs,
    RadialGradient, RectShape, SpreadMethod, SvgNode, TextPathRef, TextPositions, UseRef,
    ViewBoxAttrs, Viewport, primary_subtag,
};
use crate::path::parse_path;
use crate::style::{is_style_property, parse_style_attribute};
use crate::transform::parse_transform;
use crate::values::{
    self, Length, parse_font_family, parse_length, parse_length_list, parse_positive_length,
    parse_preserve_aspect_ratio, parse_view_box,
};
use crate::xml::{SVG_NS, XLINK_NS, XML_NS, XmlAttribute, XmlHandler};

const FEATURE_PREFIX: &str = "http://www.w3.org/TR/SVG11/feature#";

/// What an open start tag turned into.
#[derive(Debug)]
enum Open {
    Element(NodeIndex),
    /// `<style>` whose text is collected for the CSS parser.
    Style(String),
    /// `<title>` or `<desc>`; `root_level` when its parent is the root.
    Metadata { tag: Tag, root_level: bool, text: String },
}

/// Builds a [`Document`] from [`XmlHandler`] events.
pub struct DocumentBuilder<'c> {
    config: &'c Config,
    doc: Option<Document>,
    open: Vec<Open>,
    /// Depth inside an ignored subtree (unknown or foreign elements).
    ignore_depth: usize,
}

impl<'c> DocumentBuilder<'c> {
    #[must_use]
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            doc: None,
            open: Vec::new(),
            ignore_depth: 0,
        }
    }

    /// Hand over the finished document.
    pub fn finish(self) -> Result<Document> {
        self.doc.ok_or(ParseError::EmptyDocument)
    }

    fn current_element(&self) -> Option<NodeIndex> {
        match self.open.last() {
            Some(Open::Element(idx)) => Some(*idx),
            _ => None,
        }
    }

    fn current_kind(&self) -> Option<&NodeKind> {
        let idx = self.current_element()?;
        Some(&self.doc.as_ref()?.node(idx).kind)
    }

    fn start_svg_element(&mut self, tag: Tag, attrs: &[XmlAttribute]) -> Result<()> {
        if self.doc.is_none() && tag != Tag::Svg {
            return Err(ParseError::RootNotSvg);
        }

        match tag {
            Tag::Unsupported => {
                log::debug!("Skipping unsupported element subtree");
                self.ignore_depth = 1;
                return Ok(());
            }
            Tag::Style => return self.start_style(attrs),
            Tag::Title | Tag::Desc => {
                let root_level = self.current_element() == self.doc.as_ref().map(|d| d.root());
                self.open.push(Open::Metadata {
                    tag,
                    root_level,
                    text: String::new(),
                });
                return Ok(());
            }
            Tag::TSpan | Tag::TRef | Tag::TextPath
                if !matches!(
                    self.current_kind(),
                    Some(NodeKind::Text(_) | NodeKind::TSpan(_) | NodeKind::TextPath(_))
                ) =>
            {
                return Err(ParseError::Misplaced {
                    element: tag.name(),
                    expected: "<text> or <tspan>",
                });
            }
            Tag::Stop
                if !matches!(
                    self.current_kind(),
                    Some(NodeKind::LinearGradient(_) | NodeKind::RadialGradient(_))
                ) =>
            {
                return Err(ParseError::Misplaced {
                    element: tag.name(),
                    expected: "<linearGradient> or <radialGradient>",
                });
            }
            _ => {}
        }

        let kind = element_kind(tag, attrs)?;
        let mut node = SvgNode::new(tag, kind);
        common_attributes(&mut node, attrs)?;
        log::debug!("<{}> id={:?}", tag.name(), node.id);

        let parent = self.current_element();
        let idx = if let Some(doc) = self.doc.as_mut() {
            let Some(parent) = parent else {
                // inside <style>, <title> or <desc>
                log::warn!("Ignoring <{}> inside a text-only element", tag.name());
                self.ignore_depth = 1;
                return Ok(());
            };
            doc.add_child(parent, node)
        } else {
            let doc = Document::new(node, self.config.dpi);
            let root = doc.root();
            self.doc = Some(doc);
            root
        };
        self.open.push(Open::Element(idx));
        Ok(())
    }

    fn start_style(&mut self, attrs: &[XmlAttribute]) -> Result<()> {
        let mut is_css = true;
        let mut media = "all";
        for (attr, value) in svg_attributes(attrs) {
            match attr {
                Attr::Type => is_css = value == "text/css",
                Attr::Media => media = value,
                _ => {}
            }
        }
        if is_css && media_matches(media, MediaType::Screen) {
            self.open.push(Open::Style(String::new()));
        } else {
            log::debug!("Skipping <style> (css: {is_css}, media: {media:?})");
            self.ignore_depth = 1;
        }
        Ok(())
    }

    fn end_svg_element(&mut self) -> Result<()> {
        match self.open.pop() {
            Some(Open::Element(idx)) => {
                if let Some(doc) = self.doc.as_mut()
                    && matches!(doc.node(idx).kind, NodeKind::Text(_))
                {
                    collapse_spaces(doc, idx);
                }
            }
            Some(Open::Style(css)) => {
                let rules = CssParser::new(Source::Document)
                    .with_resolver(self.config.resolver())
                    .parse(&css)?;
                log::debug!("<style> produced {} rules", rules.len());
                if let Some(doc) = self.doc.as_mut() {
                    doc.add_css_rules(rules);
                }
            }
            Some(Open::Metadata {
                tag,
                root_level: true,
                text,
            }) => {
                if let Some(doc) = self.doc.as_mut() {
                    let text = text.trim().to_string();
                    match tag {
                        Tag::Title if doc.title().is_none() => doc.set_title(text),
                        Tag::Desc if doc.description().is_none() => doc.set_description(text),
                        _ => {}
                    }
                }
            }
            Some(Open::Metadata { .. }) | None => {}
        }
        Ok(())
    }
}

impl XmlHandler for DocumentBuilder<'_> {
    fn start_document(&mut self) -> Result<()> {
        log::trace!("start document");
        Ok(())
    }

    fn start_element(&mut self, namespace: &str, local_name: &str, attrs: &[XmlAttribute]) -> Result<()> {
        if self.ignore_depth > 0 {
            self.ignore_depth += 1;
            return Ok(());
        }
        if !namespace.is_empty() && namespace != SVG_NS {
            if self.doc.is_none() {
                return Err(ParseError::RootNotSvg);
            }
            log::debug!("Skipping foreign element {{{namespace}}}{local_name}");
            self.ignore_depth = 1;
            return Ok(());
        }
        self.start_svg_element(Tag::from_name(local_name), attrs)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if self.ignore_depth > 0 {
            return Ok(());
        }
        match self.open.last_mut() {
            Some(Open::Style(css)) => css.push_str(text),
            Some(Open::Metadata { text: buf, .. }) => buf.push_str(text),
            Some(Open::Element(idx)) => {
                let idx = *idx;
                if let Some(doc) = self.doc.as_mut() {
                    append_text(doc, idx, text);
                }
            }
            None => {}
        }
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        // comment-wrapped stylesheet bodies are still CSS
        if self.ignore_depth == 0
            && let Some(Open::Style(css)) = self.open.last_mut()
        {
            css.push_str(text);
        }
        Ok(())
    }

    fn end_element(&mut self, _namespace: &str, _local_name: &str) -> Result<()> {
        if self.ignore_depth > 0 {
            self.ignore_depth -= 1;
            return Ok(());
        }
        self.end_svg_element()
    }

    fn end_document(&mut self) -> Result<()> {
        if let Some(doc) = &self.doc {
            log::debug!(
                "Parsed document: {} nodes, {} css rules",
                doc.len(),
                doc.css_rules().len()
            );
        }
        Ok(())
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────

/// Attributes in the null namespace plus `xlink:href`, trimmed.
fn svg_attributes(attrs: &[XmlAttribute]) -> impl Iterator<Item = (Attr, &str)> {
    attrs.iter().filter_map(|a| {
        let attr = match a.namespace.as_str() {
            "" => Attr::from_name(&a.local_name),
            XLINK_NS if a.local_name == "href" => Attr::Href,
            _ => return None,
        };
        Some((attr, a.value.trim()))
    })
}

/// id, class, style, presentation attributes, transform, xml:space and
/// the conditional processing attributes.
fn common_attributes(node: &mut SvgNode, attrs: &[XmlAttribute]) -> Result<()> {
    for a in attrs {
        if a.namespace == XML_NS && a.local_name == "space" {
            node.space_preserve = match a.value.trim() {
                "preserve" => Some(true),
                "default" => Some(false),
                other => {
                    log::warn!("Ignoring xml:space={other:?}");
                    None
                }
            };
        }
    }

    for (attr, value) in svg_attributes(attrs) {
        match attr {
            Attr::Id if !value.is_empty() => node.id = Some(Atom::intern(value)),
            Attr::Class => {
                node.class_names = parse_class_attribute(value)
                    .into_iter()
                    .map(Atom::intern)
                    .collect();
            }
            Attr::Style => node.inline_style = parse_style_attribute(value),
            Attr::Transform => node.transform = Some(parse_transform(value)?),
            Attr::RequiredFeatures => {
                node.conditions.required_features = Some(
                    value
                        .split_ascii_whitespace()
                        .map(|f| f.strip_prefix(FEATURE_PREFIX).unwrap_or(f).to_string())
                        .collect(),
                );
            }
            Attr::RequiredExtensions => {
                node.conditions.required_extensions = Some(value.to_string());
            }
            Attr::SystemLanguage => {
                node.conditions.system_language = Some(
                    value
                        .split(',')
                        .map(|l| primary_subtag(l.trim()).to_string())
                        .filter(|l| !l.is_empty())
                        .collect(),
                );
            }
            Attr::RequiredFormats => {
                node.conditions.required_formats =
                    Some(value.split_ascii_whitespace().map(String::from).collect());
            }
            Attr::RequiredFonts => match parse_font_family(value) {
                Ok(fonts) => node.conditions.required_fonts = Some(fonts),
                Err(err) => {
                    log::warn!("Ignoring requiredFonts: {err}");
                    node.conditions.required_fonts = Some(Vec::new());
                }
            },
            attr if is_style_property(attr) => {
                if let Err(err) = node.base_style.set_attr(attr, value) {
                    log::warn!("Ignoring <{}> {}: {err}", node.name(), attr.name());
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn attr_error(tag: Tag, attr: Attr, source: ValueError) -> ParseError {
    ParseError::Attribute {
        element: tag.name(),
        attribute: attr.name(),
        source,
    }
}

fn length(tag: Tag, attr: Attr, value: &str) -> Result<Length> {
    parse_length(value).map_err(|e| attr_error(tag, attr, e))
}

fn positive_length(tag: Tag, attr: Attr, value: &str) -> Result<Length> {
    parse_positive_length(value).map_err(|e| attr_error(tag, attr, e))
}

fn length_list(tag: Tag, attr: Attr, value: &str) -> Result<Vec<Length>> {
    parse_length_list(value).map_err(|e| attr_error(tag, attr, e))
}

fn view_box(tag: Tag, attr: Attr, value: &str) -> Result<values::Bounds> {
    parse_view_box(value).map_err(|e| attr_error(tag, attr, e))
}

fn aspect(tag: Tag, attr: Attr, value: &str) -> Result<values::PreserveAspectRatio> {
    parse_preserve_aspect_ratio(value).map_err(|e| attr_error(tag, attr, e))
}

/// `userSpaceOnUse` -> true, `objectBoundingBox` -> false.
fn units(tag: Tag, attr: Attr, value: &str) -> Result<bool> {
    match value {
        "userSpaceOnUse" => Ok(true),
        "objectBoundingBox" => Ok(false),
        _ => Err(attr_error(tag, attr, ValueError::invalid("units", value))),
    }
}

/// Flat coordinate list for `<polyline>`/`<polygon>`.
fn points(value: &str) -> Vec<f32> {
    let mut coords = values::parse_number_list(value);
    if coords.len() % 2 == 1 {
        log::warn!("Dropping dangling coordinate in points list");
        coords.pop();
    }
    coords
}

/// Parse the element-specific attributes into its payload.
fn element_kind(tag: Tag, attrs: &[XmlAttribute]) -> Result<NodeKind> {
    let kind = match tag {
        Tag::Svg => {
            let mut vp = Viewport::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::X => vp.x = Some(length(tag, attr, value)?),
                    Attr::Y => vp.y = Some(length(tag, attr, value)?),
                    Attr::Width => vp.width = Some(positive_length(tag, attr, value)?),
                    Attr::Height => vp.height = Some(positive_length(tag, attr, value)?),
                    Attr::ViewBox => vp.view_box = Some(view_box(tag, attr, value)?),
                    Attr::PreserveAspectRatio => vp.aspect = Some(aspect(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Svg(vp)
        }
        Tag::G => NodeKind::Group,
        Tag::A => NodeKind::Anchor {
            href: svg_attributes(attrs)
                .find(|(attr, _)| *attr == Attr::Href)
                .map(|(_, v)| v.to_string()),
        },
        Tag::Defs => NodeKind::Defs,
        Tag::Switch => NodeKind::Switch,
        Tag::Use => {
            let mut r = UseRef::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::X => r.x = Some(length(tag, attr, value)?),
                    Attr::Y => r.y = Some(length(tag, attr, value)?),
                    Attr::Width => r.width = Some(positive_length(tag, attr, value)?),
                    Attr::Height => r.height = Some(positive_length(tag, attr, value)?),
                    Attr::Href => r.href = Some(value.to_string()),
                    _ => {}
                }
            }
            NodeKind::Use(r)
        }
        Tag::Path => {
            let mut p = PathData::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::D => p.d = parse_path(value),
                    Attr::PathLength => {
                        let len = values::parse_float(value).map_err(|e| attr_error(tag, attr, e))?;
                        if len < 0.0 {
                            return Err(attr_error(tag, attr, ValueError::negative("pathLength", value)));
                        }
                        p.path_length = Some(len);
                    }
                    _ => {}
                }
            }
            NodeKind::Path(p)
        }
        Tag::Rect => {
            let mut r = RectShape::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::X => r.x = Some(length(tag, attr, value)?),
                    Attr::Y => r.y = Some(length(tag, attr, value)?),
                    Attr::Width => r.width = Some(positive_length(tag, attr, value)?),
                    Attr::Height => r.height = Some(positive_length(tag, attr, value)?),
                    Attr::Rx => r.rx = Some(positive_length(tag, attr, value)?),
                    Attr::Ry => r.ry = Some(positive_length(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Rect(r)
        }
        Tag::Circle => {
            let mut c = CircleShape::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::Cx => c.cx = Some(length(tag, attr, value)?),
                    Attr::Cy => c.cy = Some(length(tag, attr, value)?),
                    Attr::R => c.r = Some(positive_length(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Circle(c)
        }
        Tag::Ellipse => {
            let mut e = EllipseShape::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::Cx => e.cx = Some(length(tag, attr, value)?),
                    Attr::Cy => e.cy = Some(length(tag, attr, value)?),
                    Attr::Rx => e.rx = Some(positive_length(tag, attr, value)?),
                    Attr::Ry => e.ry = Some(positive_length(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Ellipse(e)
        }
        Tag::Line => {
            let mut l = LineShape::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::X1 => l.x1 = Some(length(tag, attr, value)?),
                    Attr::Y1 => l.y1 = Some(length(tag, attr, value)?),
                    Attr::X2 => l.x2 = Some(length(tag, attr, value)?),
                    Attr::Y2 => l.y2 = Some(length(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Line(l)
        }
        Tag::Polyline | Tag::Polygon => {
            let coords = svg_attributes(attrs)
                .find(|(attr, _)| *attr == Attr::Points)
                .map(|(_, v)| points(v))
                .unwrap_or_default();
            if tag == Tag::Polyline {
                NodeKind::Polyline(coords)
            } else {
                NodeKind::Polygon(coords)
            }
        }
        Tag::Text | Tag::TSpan => {
            let mut pos = TextPositions::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::X => pos.x = Some(length_list(tag, attr, value)?),
                    Attr::Y => pos.y = Some(length_list(tag, attr, value)?),
                    Attr::Dx => pos.dx = Some(length_list(tag, attr, value)?),
                    Attr::Dy => pos.dy = Some(length_list(tag, attr, value)?),
                    _ => {}
                }
            }
            if tag == Tag::Text {
                NodeKind::Text(pos)
            } else {
                NodeKind::TSpan(pos)
            }
        }
        Tag::TRef => NodeKind::TRef {
            href: svg_attributes(attrs)
                .find(|(attr, _)| *attr == Attr::Href)
                .map(|(_, v)| v.to_string()),
        },
        Tag::TextPath => {
            let mut t = TextPathRef::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::Href => t.href = Some(value.to_string()),
                    Attr::StartOffset => t.start_offset = Some(length(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::TextPath(t)
        }
        Tag::Symbol | Tag::View => {
            let mut vb = ViewBoxAttrs::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::ViewBox => vb.view_box = Some(view_box(tag, attr, value)?),
                    Attr::PreserveAspectRatio => vb.aspect = Some(aspect(tag, attr, value)?),
                    _ => {}
                }
            }
            if tag == Tag::Symbol {
                NodeKind::Symbol(vb)
            } else {
                NodeKind::View(vb)
            }
        }
        Tag::Marker => {
            let mut m = MarkerAttrs::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::ViewBox => m.view_box = Some(view_box(tag, attr, value)?),
                    Attr::PreserveAspectRatio => m.aspect = Some(aspect(tag, attr, value)?),
                    Attr::RefX => m.ref_x = Some(length(tag, attr, value)?),
                    Attr::RefY => m.ref_y = Some(length(tag, attr, value)?),
                    Attr::MarkerWidth => m.marker_width = Some(positive_length(tag, attr, value)?),
                    Attr::MarkerHeight => m.marker_height = Some(positive_length(tag, attr, value)?),
                    Attr::MarkerUnits => {
                        m.units_user_space = match value {
                            "userSpaceOnUse" => true,
                            "strokeWidth" => false,
                            _ => return Err(attr_error(tag, attr, ValueError::invalid("markerUnits", value))),
                        };
                    }
                    Attr::Orient => {
                        m.orient = Some(
                            Orient::parse(value)
                                .ok_or_else(|| attr_error(tag, attr, ValueError::invalid("orient", value)))?,
                        );
                    }
                    _ => {}
                }
            }
            NodeKind::Marker(m)
        }
        Tag::LinearGradient => {
            let mut g = LinearGradient::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::X1 => g.x1 = Some(length(tag, attr, value)?),
                    Attr::Y1 => g.y1 = Some(length(tag, attr, value)?),
                    Attr::X2 => g.x2 = Some(length(tag, attr, value)?),
                    Attr::Y2 => g.y2 = Some(length(tag, attr, value)?),
                    _ => gradient_attribute(tag, &mut g.common, attr, value)?,
                }
            }
            NodeKind::LinearGradient(g)
        }
        Tag::RadialGradient => {
            let mut g = RadialGradient::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::Cx => g.cx = Some(length(tag, attr, value)?),
                    Attr::Cy => g.cy = Some(length(tag, attr, value)?),
                    Attr::R => g.r = Some(positive_length(tag, attr, value)?),
                    Attr::Fx => g.fx = Some(length(tag, attr, value)?),
                    Attr::Fy => g.fy = Some(length(tag, attr, value)?),
                    _ => gradient_attribute(tag, &mut g.common, attr, value)?,
                }
            }
            NodeKind::RadialGradient(g)
        }
        Tag::Stop => {
            let mut offset = 0.0;
            for (attr, value) in svg_attributes(attrs) {
                if attr == Attr::Offset {
                    offset = values::parse_stop_offset(value).map_err(|e| attr_error(tag, attr, e))?;
                }
            }
            NodeKind::Stop { offset }
        }
        Tag::ClipPath => {
            let mut units_user_space = None;
            for (attr, value) in svg_attributes(attrs) {
                if attr == Attr::ClipPathUnits {
                    units_user_space = Some(units(tag, attr, value)?);
                }
            }
            NodeKind::ClipPath { units_user_space }
        }
        Tag::Pattern => {
            let mut p = PatternAttrs::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::PatternUnits => p.units_user_space = Some(units(tag, attr, value)?),
                    Attr::PatternContentUnits => {
                        p.content_units_user_space = Some(units(tag, attr, value)?);
                    }
                    Attr::PatternTransform => p.transform = Some(parse_transform(value)?),
                    Attr::X => p.x = Some(length(tag, attr, value)?),
                    Attr::Y => p.y = Some(length(tag, attr, value)?),
                    Attr::Width => p.width = Some(positive_length(tag, attr, value)?),
                    Attr::Height => p.height = Some(positive_length(tag, attr, value)?),
                    Attr::Href => p.href = Some(value.to_string()),
                    Attr::ViewBox => p.view_box = Some(view_box(tag, attr, value)?),
                    Attr::PreserveAspectRatio => p.aspect = Some(aspect(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Pattern(p)
        }
        Tag::Image => {
            let mut i = ImageAttrs::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::X => i.x = Some(length(tag, attr, value)?),
                    Attr::Y => i.y = Some(length(tag, attr, value)?),
                    Attr::Width => i.width = Some(positive_length(tag, attr, value)?),
                    Attr::Height => i.height = Some(positive_length(tag, attr, value)?),
                    Attr::Href => i.href = Some(value.to_string()),
                    Attr::PreserveAspectRatio => i.aspect = Some(aspect(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Image(i)
        }
        Tag::Mask => {
            let mut m = MaskAttrs::default();
            for (attr, value) in svg_attributes(attrs) {
                match attr {
                    Attr::MaskUnits => m.units_user_space = Some(units(tag, attr, value)?),
                    Attr::MaskContentUnits => m.content_units_user_space = Some(units(tag, attr, value)?),
                    Attr::X => m.x = Some(length(tag, attr, value)?),
                    Attr::Y => m.y = Some(length(tag, attr, value)?),
                    Attr::Width => m.width = Some(positive_length(tag, attr, value)?),
                    Attr::Height => m.height = Some(positive_length(tag, attr, value)?),
                    _ => {}
                }
            }
            NodeKind::Mask(m)
        }
        Tag::SolidColor => NodeKind::SolidColor,
        // handled by the caller
        Tag::Style | Tag::Title | Tag::Desc | Tag::Unsupported => NodeKind::Group,
    };
    Ok(kind)
}

fn gradient_attribute(tag: Tag, common: &mut GradientAttrs, attr: Attr, value: &str) -> Result<()> {
    match attr {
        Attr::GradientUnits => common.units_user_space = Some(units(tag, attr, value)?),
        Attr::GradientTransform => common.transform = Some(parse_transform(value)?),
        Attr::SpreadMethod => {
            common.spread = Some(match value {
                "pad" => SpreadMethod::Pad,
                "reflect" => SpreadMethod::Reflect,
                "repeat" => SpreadMethod::Repeat,
                _ => return Err(attr_error(tag, attr, ValueError::invalid("spreadMethod", value))),
            });
        }
        Attr::Href => common.href = Some(value.to_string()),
        _ => {}
    }
    Ok(())
}

// ─── Text ────────────────────────────────────────────────────────────────

/// Append character data to a text container, merging with a preceding
/// text node. Other elements ignore character data.
fn append_text(doc: &mut Document, parent: NodeIndex, text: &str) {
    if !matches!(
        doc.node(parent).kind,
        NodeKind::Text(_) | NodeKind::TSpan(_) | NodeKind::TextPath(_)
    ) {
        return;
    }
    if let Some(&last) = doc.children(parent).last()
        && let NodeKind::TextContent(existing) = &mut doc.node_mut(last).kind
    {
        existing.push_str(text);
        return;
    }
    doc.add_child(parent, SvgNode::text(text));
}

/// Effective `xml:space` at `node`.
fn preserves_space(doc: &Document, node: NodeIndex) -> bool {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .find_map(|n| doc.node(n).space_preserve)
        .unwrap_or(false)
}

/// Whitespace handling for a finished `<text>` subtree. Leading and
/// trailing whitespace is dropped at the edges of each container; between
/// sibling nodes a single space survives.
fn collapse_spaces(doc: &mut Document, container: NodeIndex) {
    let children = doc.children(container);
    let last = children.len().saturating_sub(1);
    for (i, child) in children.into_iter().enumerate() {
        let text = match &doc.node(child).kind {
            NodeKind::TextContent(text) => text.clone(),
            NodeKind::TSpan(_) | NodeKind::TextPath(_) => {
                collapse_spaces(doc, child);
                continue;
            }
            _ => continue,
        };
        let collapsed = if preserves_space(doc, child) {
            text.replace(['\n', '\r', '\t'], " ")
        } else {
            collapse_whitespace(&text, i == 0, i == last)
        };
        doc.node_mut(child).kind = NodeKind::TextContent(collapsed);
    }
}

fn collapse_whitespace(text: &str, first: bool, last: bool) -> String {
    let words: Vec<&str> = text.split_ascii_whitespace().collect();
    if words.is_empty() {
        return if !text.is_empty() && !first && !last {
            " ".to_string()
        } else {
            String::new()
        };
    }
    let leading = text.starts_with(|c: char| c.is_ascii_whitespace());
    let trailing = text.ends_with(|c: char| c.is_ascii_whitespace());
    let mut out = String::with_capacity(text.len());
    if leading && !first {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if trailing && !last {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(events: &[(&str, Vec<XmlAttribute>)]) -> Result<Document> {
        let config = Config::default();
        let mut builder = DocumentBuilder::new(&config);
        builder.start_document()?;
        for (name, attrs) in events {
            match name.strip_prefix('/') {
                Some(name) => builder.end_element(SVG_NS, name)?,
                None => match name.strip_prefix('"') {
                    Some(text) => builder.characters(text)?,
                    None => builder.start_element(SVG_NS, name, attrs)?,
                },
            }
        }
        builder.end_document()?;
        builder.finish()
    }

    fn attr(name: &str, value: &str) -> XmlAttribute {
        XmlAttribute::new("", name, value)
    }

    #[test]
    fn builds_tree_with_styles() {
        let rect = [
            attr("id", "r"),
            attr("width", "10"),
            attr("fill", "red"),
            attr("stroke-width", "bogus"),
            attr("class", "a b"),
        ];
        let doc = build(&[("svg", vec![]), ("rect", rect.to_vec()), ("/rect", vec![]), ("/svg", vec![])]).unwrap();
        let r = doc.element_by_id("r").unwrap();
        let node = doc.node(r);
        assert_eq!(node.tag, Tag::Rect);
        assert!(node.has_class("b"));
        assert!(node.base_style.fill.is_some());
        assert!(node.base_style.stroke_width.is_none());
        match &node.kind {
            NodeKind::Rect(shape) => assert_eq!(shape.width, Some(Length::px(10.0))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn negative_dimensions_abort() {
        let err = build(&[("svg", vec![]), ("rect", vec![attr("width", "-1")])]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Attribute {
                element: "rect",
                attribute: "width",
                ..
            }
        ));
        let err = build(&[("svg", vec![attr("viewBox", "0 0 -1 5")])]).unwrap_err();
        assert!(matches!(err, ParseError::Attribute { attribute: "viewBox", .. }));
    }

    #[test]
    fn root_must_be_svg() {
        assert!(matches!(build(&[("g", vec![])]), Err(ParseError::RootNotSvg)));
        assert!(matches!(build(&[]), Err(ParseError::EmptyDocument)));
    }

    #[test]
    fn misplaced_elements() {
        let err = build(&[("svg", vec![]), ("tspan", vec![])]).unwrap_err();
        assert!(matches!(err, ParseError::Misplaced { element: "tspan", .. }));
        let err = build(&[("svg", vec![]), ("g", vec![]), ("stop", vec![])]).unwrap_err();
        assert!(matches!(err, ParseError::Misplaced { element: "stop", .. }));
    }

    #[test]
    fn unknown_elements_are_skipped_with_subtree() {
        let doc = build(&[
            ("svg", vec![]),
            ("foo", vec![]),
            ("rect", vec![attr("id", "hidden")]),
            ("/rect", vec![]),
            ("/foo", vec![]),
            ("circle", vec![attr("id", "shown")]),
            ("/circle", vec![]),
            ("/svg", vec![]),
        ])
        .unwrap();
        assert!(doc.element_by_id("hidden").is_none());
        assert!(doc.element_by_id("shown").is_some());
        assert_eq!(doc.element_children(doc.root()).len(), 1);
    }

    #[test]
    fn text_whitespace_collapses() {
        let doc = build(&[
            ("svg", vec![]),
            ("text", vec![]),
            ("\"\n   Hello  ", vec![]),
            ("tspan", vec![]),
            ("\"  big \t world", vec![]),
            ("/tspan", vec![]),
            ("\"  \n", vec![]),
            ("/text", vec![]),
            ("/svg", vec![]),
        ])
        .unwrap();
        let text = doc.elements_by_tag(Tag::Text)[0];
        let contents: Vec<String> = doc
            .descendants(text)
            .into_iter()
            .filter_map(|n| match &doc.node(n).kind {
                NodeKind::TextContent(t) => Some(t.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(contents, vec!["Hello ", "big world", ""]);
    }

    #[test]
    fn collapse_rules() {
        assert_eq!(collapse_whitespace("  a  b  ", true, true), "a b");
        assert_eq!(collapse_whitespace("  a  b  ", false, false), " a b ");
        assert_eq!(collapse_whitespace("   ", false, false), " ");
        assert_eq!(collapse_whitespace("   ", true, false), "");
    }

    #[test]
    fn root_metadata_and_conditions() {
        let doc = build(&[
            ("svg", vec![]),
            ("title", vec![]),
            ("\" Chart ", vec![]),
            ("/title", vec![]),
            (
                "g",
                vec![
                    attr("systemLanguage", "en-GB, fr"),
                    attr("requiredFeatures", "http://www.w3.org/TR/SVG11/feature#Shape"),
                ],
            ),
            ("title", vec![]),
            ("\"inner", vec![]),
            ("/title", vec![]),
            ("/g", vec![]),
            ("/svg", vec![]),
        ])
        .unwrap();
        assert_eq!(doc.title(), Some("Chart"));
        let g = doc.elements_by_tag(Tag::G)[0];
        let cond = &doc.node(g).conditions;
        assert_eq!(cond.system_language, Some(vec!["en".to_string(), "fr".to_string()]));
        assert_eq!(cond.required_features, Some(vec!["Shape".to_string()]));
    }

    #[test]
    fn style_element_feeds_rules() {
        let doc = build(&[
            ("svg", vec![]),
            ("style", vec![]),
            ("\"rect { fill: lime }", vec![]),
            ("/style", vec![]),
            ("style", vec![attr("media", "print")]),
            ("\"circle { fill: red }", vec![]),
            ("/style", vec![]),
            ("/svg", vec![]),
        ])
        .unwrap();
        assert_eq!(doc.css_rules().len(), 1);

        let err = build(&[("svg", vec![]), ("style", vec![]), ("\"rect { fill", vec![]), ("/style", vec![])]).unwrap_err();
        assert!(matches!(err, ParseError::Css(_)));
    }

    #[test]
    fn href_forms_and_points() {
        let doc = build(&[
            ("svg", vec![]),
            ("use", vec![XmlAttribute::new(XLINK_NS, "href", "#a")]),
            ("/use", vec![]),
            ("use", vec![attr("href", "#b")]),
            ("/use", vec![]),
            ("polygon", vec![attr("points", "0,0 10,0 10,10 5")]),
            ("/polygon", vec![]),
            ("/svg", vec![]),
        ])
        .unwrap();
        let hrefs: Vec<Option<String>> = doc
            .elements_by_tag(Tag::Use)
            .into_iter()
            .map(|n| match &doc.node(n).kind {
                NodeKind::Use(u) => u.href.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(hrefs, vec![Some("#a".to_string()), Some("#b".to_string())]);
        let poly = doc.elements_by_tag(Tag::Polygon)[0];
        assert_eq!(doc.node(poly).kind, NodeKind::Polygon(vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0]));
    }
}
