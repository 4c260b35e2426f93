//! Style resolution: the CSS cascade plus SVG property inheritance.
//!
//! An element's own declarations are gathered first (presentation
//! attributes, then matching rules in ascending specificity, then the
//! `style` attribute), and that bag is applied on top of the parent's
//! resolved style after the non-inherited properties are reset.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::css::Ruleset;
use crate::model::Document;
use crate::selector::{self, MatchContext};
use crate::style::{Style, default_style};

/// Resolves effective styles for elements of one document.
///
/// Holds the document's rules merged with any per-call rules. The document
/// itself is only borrowed.
pub struct StyleResolver<'d> {
    doc: &'d Document,
    rules: Ruleset,
    ctx: MatchContext,
}

impl<'d> StyleResolver<'d> {
    #[must_use]
    pub fn new(doc: &'d Document) -> Self {
        Self {
            doc,
            rules: doc.css_rules().clone(),
            ctx: MatchContext::default(),
        }
    }

    /// Add rules that apply to this resolution only.
    #[must_use]
    pub fn with_rules(mut self, extra: Ruleset) -> Self {
        self.rules.add_all(extra);
        self
    }

    /// Element matched by `:target`.
    #[must_use]
    pub fn with_target(mut self, target: Option<NodeIndex>) -> Self {
        self.ctx.target = target;
        self
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    /// The declarations made on `node` itself, in cascade order.
    pub fn specified_style(&self, node: NodeIndex) -> Style {
        let element = self.doc.node(node);
        let mut own = element.base_style.clone();
        for rule in self.rules.rules() {
            if selector::matches(&self.ctx, self.doc, &rule.selector, node) {
                own.apply(&rule.style);
            }
        }
        own.apply(&element.inline_style);
        own
    }

    /// Resolve `node` given its parent's resolved style. Used directly by
    /// the renderer, where `<use>` makes the referencing element the
    /// parent.
    pub fn cascade(&self, node: NodeIndex, parent: &Style, is_root: bool) -> Style {
        let mut style = parent.clone();
        style.reset_non_inheriting(is_root);
        style.apply_inherited(&self.specified_style(node));
        style
    }

    /// Resolve `node` through its structural ancestors.
    pub fn resolve(&self, node: NodeIndex) -> Style {
        let mut chain = self.doc.ancestors(node);
        chain.reverse();
        chain.push(node);

        let mut style = default_style();
        for (i, &n) in chain.iter().enumerate() {
            style = self.cascade(n, &style, i == 0);
        }
        style
    }

    /// Resolve every element in document order in a single pass.
    pub fn resolve_all(&self) -> HashMap<NodeIndex, Style> {
        let mut out = HashMap::new();
        let root = self.doc.root();
        let mut stack = vec![(root, default_style())];
        while let Some((node, parent_style)) = stack.pop() {
            if !self.doc.node(node).is_element() {
                continue;
            }
            let style = self.cascade(node, &parent_style, node == root);
            for child in self.doc.element_children(node).into_iter().rev() {
                stack.push((child, style.clone()));
            }
            out.insert(node, style);
        }
        log::debug!("Resolved styles for {} elements", out.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Tag;
    use crate::css::{CssParser, Source};
    use crate::id::Atom;
    use crate::model::{NodeKind, SvgNode, Viewport};
    use crate::style::{Specified, parse_style_attribute};
    use crate::values::{Color, Length, Paint, Unit};
    use pretty_assertions::assert_eq;

    fn doc_with(css: &str) -> (Document, NodeIndex, NodeIndex) {
        let mut doc = Document::new(SvgNode::new(Tag::Svg, NodeKind::Svg(Viewport::default())), 96.0);
        let root = doc.root();
        let mut g = SvgNode::new(Tag::G, NodeKind::Group);
        g.id = Some(Atom::intern("grp"));
        g.base_style.set_property("opacity", "0.5");
        g.base_style.set_property("fill", "blue");
        let g = doc.add_child(root, g);
        let mut rect = SvgNode::new(Tag::Rect, NodeKind::Group);
        rect.class_names.push(Atom::intern("hot"));
        let rect = doc.add_child(g, rect);
        doc.add_css_rules(CssParser::new(Source::Document).parse(css).unwrap());
        (doc, g, rect)
    }

    #[test]
    fn inherited_vs_non_inherited() {
        let (doc, g, rect) = doc_with("");
        let resolver = StyleResolver::new(&doc);
        let g_style = resolver.resolve(g);
        let rect_style = resolver.resolve(rect);
        assert_eq!(g_style.opacity, Some(0.5));
        assert_eq!(rect_style.opacity, Some(1.0));
        assert_eq!(rect_style.fill, Some(Paint::Color(Color(0xff0000ff))));
    }

    #[test]
    fn specificity_beats_order() {
        let (doc, _, rect) = doc_with(".hot { stroke: red } rect { stroke: green } g rect { stroke: blue }");
        let style = StyleResolver::new(&doc).resolve(rect);
        assert_eq!(style.stroke, Some(Paint::Color(Color(0xffff0000))));
    }

    #[test]
    fn later_rule_wins_on_equal_specificity() {
        let (doc, _, rect) = doc_with("rect { stroke: green } rect { stroke: blue }");
        let style = StyleResolver::new(&doc).resolve(rect);
        assert_eq!(style.stroke, Some(Paint::Color(Color(0xff0000ff))));
    }

    #[test]
    fn rules_override_presentation_attributes_and_inline_overrides_rules() {
        let (mut doc, g, _) = doc_with("#grp { fill: lime }");
        {
            let resolver = StyleResolver::new(&doc);
            assert_eq!(resolver.resolve(g).fill, Some(Paint::Color(Color(0xff00ff00))));
        }
        doc.node_mut(g).inline_style = parse_style_attribute("fill: yellow");
        let resolver = StyleResolver::new(&doc);
        assert_eq!(resolver.resolve(g).fill, Some(Paint::Color(Color(0xffffff00))));
    }

    #[test]
    fn resolve_all_agrees_with_resolve_and_is_idempotent() {
        let (doc, g, rect) = doc_with("g > .hot { font-size: 200% }");
        let resolver = StyleResolver::new(&doc);
        let first = resolver.resolve_all();
        let second = resolver.resolve_all();
        assert_eq!(first, second);
        assert_eq!(first[&g], resolver.resolve(g));
        assert_eq!(first[&rect], resolver.resolve(rect));
        assert_eq!(first[&rect].font_size, Some(Length::new(24.0, Unit::Pt)));
    }

    #[test]
    fn extra_rules_and_target() {
        let (doc, _, rect) = doc_with("");
        let extra = CssParser::new(Source::RenderOptions)
            .parse(":target { stroke-width: 3 }")
            .unwrap();
        let resolver = StyleResolver::new(&doc).with_rules(extra).with_target(Some(rect));
        let style = resolver.resolve(rect);
        assert_eq!(style.stroke_width, Some(Length::px(3.0)));
        assert!(resolver.specified_style(rect).is_specified(Specified::STROKE_WIDTH));
    }
}
