//! Selector matching against the document tree.
//!
//! A selector is matched right to left: the last simple selector against
//! the candidate element, then each combinator walks to the parent, any
//! ancestor, or the preceding sibling, recursing leftwards.

use petgraph::graph::NodeIndex;

use crate::css::{AttribOp, Combinator, PseudoClass, Selector, SimpleSelector};
use crate::model::Document;

/// Per-match state that does not come from the tree itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchContext {
    /// Element matched by `:target`.
    pub target: Option<NodeIndex>,
}

/// Whether `selector` matches element `node`.
pub fn matches(ctx: &MatchContext, doc: &Document, selector: &Selector, node: NodeIndex) -> bool {
    match selector.parts.len() {
        0 => false,
        n => match_from(ctx, doc, selector, n - 1, node),
    }
}

fn match_from(
    ctx: &MatchContext,
    doc: &Document,
    selector: &Selector,
    pos: usize,
    node: NodeIndex,
) -> bool {
    let part = &selector.parts[pos];
    if !simple_matches(ctx, doc, part, node) {
        return false;
    }
    if pos == 0 {
        return true;
    }
    match part.combinator {
        Combinator::Descendant => doc
            .ancestors(node)
            .into_iter()
            .any(|a| match_from(ctx, doc, selector, pos - 1, a)),
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|p| match_from(ctx, doc, selector, pos - 1, p)),
        Combinator::Follows => previous_sibling(doc, node)
            .is_some_and(|s| match_from(ctx, doc, selector, pos - 1, s)),
    }
}

fn previous_sibling(doc: &Document, node: NodeIndex) -> Option<NodeIndex> {
    let siblings = doc.element_children(doc.parent(node)?);
    let pos = siblings.iter().position(|&s| s == node)?;
    pos.checked_sub(1).map(|p| siblings[p])
}

fn simple_matches(ctx: &MatchContext, doc: &Document, sel: &SimpleSelector, node: NodeIndex) -> bool {
    let element = doc.node(node);
    if !element.is_element() {
        return false;
    }
    if let Some(tag) = &sel.tag
        && !tag.eq_ignore_ascii_case(element.name())
    {
        return false;
    }

    for attrib in &sel.attribs {
        let ok = match attrib.name.as_str() {
            "id" => op_matches(&attrib.op, element.id.as_ref().map(|id| id.as_str())),
            "class" => {
                let classes: Vec<&str> = element.class_names.iter().map(|c| c.as_str()).collect();
                let joined = classes.join(" ");
                op_matches(&attrib.op, (!classes.is_empty()).then_some(joined.as_str()))
            }
            // other attributes are not retained on the tree
            _ => false,
        };
        if !ok {
            return false;
        }
    }

    sel.pseudos
        .iter()
        .all(|pseudo| pseudo_matches(ctx, doc, pseudo, node))
}

fn op_matches(op: &AttribOp, value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    match op {
        AttribOp::Exists => true,
        AttribOp::Equals(v) => value == v,
        AttribOp::Includes(v) => value.split_ascii_whitespace().any(|w| w == v),
        AttribOp::DashMatch(v) => {
            value == v || (value.starts_with(v.as_str()) && value[v.len()..].starts_with('-'))
        }
    }
}

/// Position (0-based) of `node` among its element siblings that match
/// `type_name`, and the number of such siblings. The root counts as the
/// only child of the document.
fn sibling_position(doc: &Document, node: NodeIndex, type_name: Option<&str>) -> (usize, usize) {
    let Some(parent) = doc.parent(node) else {
        return (0, 1);
    };
    let mut pos = 0;
    let mut count = 0;
    for sibling in doc.element_children(parent) {
        if sibling == node {
            pos = count;
        }
        if type_name.is_none_or(|t| doc.node(sibling).name().eq_ignore_ascii_case(t)) {
            count += 1;
        }
    }
    (pos, count)
}

fn pseudo_matches(ctx: &MatchContext, doc: &Document, pseudo: &PseudoClass, node: NodeIndex) -> bool {
    let own_name = doc.node(node).name();
    match pseudo {
        PseudoClass::Nth {
            a,
            b,
            from_start,
            of_type,
            tag,
        } => {
            let type_name = of_type.then(|| tag.as_deref().unwrap_or(own_name));
            let (pos, count) = sibling_position(doc, node, type_name);
            let position = (if *from_start { pos + 1 } else { count - pos }) as i32;
            nth_matches(*a, *b, position)
        }
        PseudoClass::OnlyChild { of_type, tag } => {
            let type_name = of_type.then(|| tag.as_deref().unwrap_or(own_name));
            sibling_position(doc, node, type_name).1 == 1
        }
        PseudoClass::Root => doc.parent(node).is_none(),
        PseudoClass::Empty => doc.children(node).is_empty(),
        PseudoClass::Not(group) => !group.iter().any(|s| matches(ctx, doc, s, node)),
        PseudoClass::Target => ctx.target == Some(node),
        PseudoClass::Unsupported(_) => false,
    }
}

/// Whether `a*n + b == position` for some integer `n >= 0`.
fn nth_matches(a: i32, b: i32, position: i32) -> bool {
    let diff = position - b;
    if a == 0 {
        return diff == 0;
    }
    diff % a == 0 && (diff == 0 || diff.signum() == a.signum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Tag;
    use crate::css::{CssParser, Source};
    use crate::id::Atom;
    use crate::model::{NodeKind, SvgNode, Viewport};
    use pretty_assertions::assert_eq;

    fn element(tag: Tag, id: Option<&str>, classes: &[&str]) -> SvgNode {
        let mut node = SvgNode::new(tag, NodeKind::Group);
        node.id = id.map(Atom::intern);
        node.class_names = classes.iter().map(|c| Atom::intern(c)).collect();
        node
    }

    fn selector(text: &str) -> Selector {
        let rules = CssParser::new(Source::Document)
            .parse(&format!("{text} {{}}"))
            .unwrap();
        rules.rules()[0].selector.clone()
    }

    /// `<svg><g id="g1" class="x y"><rect/><rect/><circle/><rect/></g><rect id="after"/></svg>`
    fn fixture() -> (Document, Vec<NodeIndex>) {
        let mut doc = Document::new(SvgNode::new(Tag::Svg, NodeKind::Svg(Viewport::default())), 96.0);
        let root = doc.root();
        let g = doc.add_child(root, element(Tag::G, Some("g1"), &["x", "y"]));
        let r1 = doc.add_child(g, element(Tag::Rect, None, &[]));
        let r2 = doc.add_child(g, element(Tag::Rect, None, &["pre-a"]));
        let c = doc.add_child(g, element(Tag::Circle, None, &[]));
        let r3 = doc.add_child(g, element(Tag::Rect, None, &[]));
        let after = doc.add_child(root, element(Tag::Rect, Some("after"), &[]));
        (doc, vec![root, g, r1, r2, c, r3, after])
    }

    fn matching(doc: &Document, nodes: &[NodeIndex], sel: &str) -> Vec<usize> {
        let sel = selector(sel);
        let ctx = MatchContext::default();
        nodes
            .iter()
            .enumerate()
            .filter(|&(_, &n)| matches(&ctx, doc, &sel, n))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn type_id_and_class() {
        let (doc, n) = fixture();
        assert_eq!(matching(&doc, &n, "rect"), vec![2, 3, 5, 6]);
        assert_eq!(matching(&doc, &n, "#g1"), vec![1]);
        assert_eq!(matching(&doc, &n, ".y"), vec![1]);
        assert_eq!(matching(&doc, &n, "g.x.y"), vec![1]);
        assert_eq!(matching(&doc, &n, "*"), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn combinators() {
        let (doc, n) = fixture();
        assert_eq!(matching(&doc, &n, "svg rect"), vec![2, 3, 5, 6]);
        assert_eq!(matching(&doc, &n, "svg > rect"), vec![6]);
        assert_eq!(matching(&doc, &n, "g > rect"), vec![2, 3, 5]);
        assert_eq!(matching(&doc, &n, "circle + rect"), vec![5]);
        assert_eq!(matching(&doc, &n, "g + rect"), vec![6]);
        assert_eq!(matching(&doc, &n, "svg g rect + rect"), vec![3]);
    }

    #[test]
    fn nth_child_odd_positions() {
        let (doc, n) = fixture();
        // among the four children of g: r1, r2, c, r3
        assert_eq!(matching(&doc, &n, "rect:nth-child(2n+1)"), vec![2]);
        assert_eq!(matching(&doc, &n, "g > :nth-child(2n+1)"), vec![2, 4]);
        assert_eq!(matching(&doc, &n, "g > :nth-last-child(1)"), vec![5]);
        assert_eq!(matching(&doc, &n, "rect:nth-of-type(3)"), vec![5]);
        assert_eq!(matching(&doc, &n, "g > rect:last-of-type"), vec![5]);
        assert_eq!(matching(&doc, &n, "g > :first-child"), vec![2]);
        assert_eq!(matching(&doc, &n, ":only-of-type"), vec![0, 1, 4, 6]);
    }

    #[test]
    fn structural_and_negation() {
        let (doc, n) = fixture();
        assert_eq!(matching(&doc, &n, ":root"), vec![0]);
        assert_eq!(matching(&doc, &n, "rect:empty"), vec![2, 3, 5, 6]);
        assert_eq!(matching(&doc, &n, "rect:not(#after)"), vec![2, 3, 5]);
        assert_eq!(matching(&doc, &n, "rect:hover"), Vec::<usize>::new());
    }

    #[test]
    fn attribute_operators() {
        let (doc, n) = fixture();
        assert_eq!(matching(&doc, &n, "[id]"), vec![1, 6]);
        assert_eq!(matching(&doc, &n, "[class=\"x y\"]"), vec![1]);
        assert_eq!(matching(&doc, &n, "[class~=x]"), vec![1]);
        assert_eq!(matching(&doc, &n, "[class|=pre]"), vec![3]);
        assert_eq!(matching(&doc, &n, "[width]"), Vec::<usize>::new());
    }

    #[test]
    fn target_pseudo_class() {
        let (doc, n) = fixture();
        let sel = selector(":target");
        let ctx = MatchContext { target: Some(n[6]) };
        assert!(matches(&ctx, &doc, &sel, n[6]));
        assert!(!matches(&ctx, &doc, &sel, n[5]));
        assert!(!matches(&MatchContext::default(), &doc, &sel, n[6]));
    }

    #[test]
    fn an_plus_b_arithmetic() {
        assert!(nth_matches(2, 1, 1));
        assert!(nth_matches(2, 1, 3));
        assert!(!nth_matches(2, 1, 2));
        assert!(nth_matches(-1, 3, 1));
        assert!(nth_matches(-1, 3, 3));
        assert!(!nth_matches(-1, 3, 4));
        assert!(nth_matches(0, 2, 2));
        assert!(!nth_matches(0, 2, 3));
    }
}
