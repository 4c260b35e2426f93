//! CSS stylesheet parser and the specificity-ordered ruleset.
//!
//! Built on `winnow` 0.7 for the token-level grammars (identifiers,
//! strings, `url()`, `An+B`). Supports the practical subset SVG content
//! uses: type/class/id/attribute selectors, descendant, child and
//! adjacent-sibling combinators, the structural pseudo-classes, `:not()`,
//! `:target`, `@media` and `@import`. `!important` is accepted and ignored.

use std::fmt;

use smallvec::SmallVec;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::config::ExternalResolver;
use crate::error::{ParseError, Result};
use crate::style::{Style, strip_comments};

const SPECIFICITY_ID: u32 = 10_000;
const SPECIFICITY_ATTRIBUTE_OR_PSEUDO: u32 = 100;
const SPECIFICITY_ELEMENT: u32 = 1;

// ─── Selector model ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `E F`
    Descendant,
    /// `E > F`
    Child,
    /// `E + F`
    Follows,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttribOp {
    /// `[foo]`
    Exists,
    /// `[foo=bar]`
    Equals(String),
    /// `[foo~=bar]`, also what `.bar` means for `class`
    Includes(String),
    /// `[foo|=bar]`
    DashMatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attrib {
    pub name: String,
    pub op: AttribOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    /// `nth-child`, `nth-last-child`, `nth-of-type`, `nth-last-of-type` and
    /// the `first-*`/`last-*` forms, which are `An+B` with `a = 0, b = 1`.
    /// `tag` is the type to count when `of_type` is set; `None` means the
    /// element's own type.
    Nth {
        a: i32,
        b: i32,
        from_start: bool,
        of_type: bool,
        tag: Option<String>,
    },
    OnlyChild {
        of_type: bool,
        tag: Option<String>,
    },
    Root,
    Empty,
    Not(Vec<Selector>),
    Target,
    /// Recognised but never matches (`:hover`, `:lang()`, ...).
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSelector {
    /// Relationship to the simple selector on the left.
    pub combinator: Combinator,
    /// `None` means `*`.
    pub tag: Option<String>,
    pub attribs: SmallVec<[Attrib; 2]>,
    pub pseudos: Vec<PseudoClass>,
}

impl SimpleSelector {
    fn new(combinator: Combinator, tag: Option<String>) -> Self {
        Self {
            combinator,
            tag,
            attribs: SmallVec::new(),
            pseudos: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    pub parts: Vec<SimpleSelector>,
    pub specificity: u32,
}

impl Selector {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(match part.combinator {
                    Combinator::Descendant => " ",
                    Combinator::Child => " > ",
                    Combinator::Follows => " + ",
                })?;
            }
            f.write_str(part.tag.as_deref().unwrap_or("*"))?;
            for attrib in &part.attribs {
                match &attrib.op {
                    AttribOp::Exists => write!(f, "[{}]", attrib.name)?,
                    AttribOp::Equals(v) => write!(f, "[{}={v}]", attrib.name)?,
                    AttribOp::Includes(v) => write!(f, "[{}~={v}]", attrib.name)?,
                    AttribOp::DashMatch(v) => write!(f, "[{}|={v}]", attrib.name)?,
                }
            }
            for pseudo in &part.pseudos {
                match pseudo {
                    PseudoClass::Nth { a, b, from_start, of_type, .. } => {
                        let last = if *from_start { "" } else { "last-" };
                        let kind = if *of_type { "of-type" } else { "child" };
                        write!(f, ":nth-{last}{kind}({a}n{b:+})")?;
                    }
                    PseudoClass::OnlyChild { of_type: false, .. } => f.write_str(":only-child")?,
                    PseudoClass::OnlyChild { of_type: true, .. } => f.write_str(":only-of-type")?,
                    PseudoClass::Root => f.write_str(":root")?,
                    PseudoClass::Empty => f.write_str(":empty")?,
                    PseudoClass::Not(group) => {
                        f.write_str(":not(")?;
                        for (i, sel) in group.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{sel}")?;
                        }
                        f.write_str(")")?;
                    }
                    PseudoClass::Target => f.write_str(":target")?,
                    PseudoClass::Unsupported(name) => write!(f, ":{name}")?,
                }
            }
        }
        Ok(())
    }
}

// ─── Ruleset ─────────────────────────────────────────────────────────────

/// Where a rule came from, so per-render rules can be dropped again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Document,
    RenderOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: Selector,
    pub style: Style,
    pub source: Source,
}

/// Rules kept in ascending specificity order. Rules of equal specificity
/// keep their insertion order, so applying them front to back lets the
/// most specific, then the latest, declaration win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ruleset {
    rules: Vec<Rule>,
}

impl Ruleset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: Rule) {
        let spec = rule.selector.specificity;
        let pos = self
            .rules
            .iter()
            .position(|r| r.selector.specificity > spec)
            .unwrap_or(self.rules.len());
        self.rules.insert(pos, rule);
    }

    pub fn add_all(&mut self, other: Ruleset) {
        for rule in other.rules {
            self.add(rule);
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn remove_from_source(&mut self, source: Source) {
        self.rules.retain(|r| r.source != source);
    }
}

// ─── Media ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    All,
    Aural,
    Braille,
    Embossed,
    Handheld,
    Print,
    Projection,
    Screen,
    Speech,
    Tty,
    Tv,
}

impl MediaType {
    pub fn from_name(name: &str) -> Option<MediaType> {
        Some(match name {
            "all" => MediaType::All,
            "aural" => MediaType::Aural,
            "braille" => MediaType::Braille,
            "embossed" => MediaType::Embossed,
            "handheld" => MediaType::Handheld,
            "print" => MediaType::Print,
            "projection" => MediaType::Projection,
            "screen" => MediaType::Screen,
            "speech" => MediaType::Speech,
            "tty" => MediaType::Tty,
            "tv" => MediaType::Tv,
            _ => return None,
        })
    }
}

fn list_matches(list: &[MediaType], device: MediaType) -> bool {
    list.iter().any(|&m| m == MediaType::All || m == device)
}

/// Whether a comma-separated media list (as found in a `media` attribute)
/// applies to `device`.
pub fn media_matches(media_list: &str, device: MediaType) -> bool {
    let mut input = media_list.trim();
    list_matches(&media_list_of(&mut input), device)
}

fn media_list_of(input: &mut &str) -> Vec<MediaType> {
    let mut list = Vec::new();
    loop {
        skip_ws(input);
        let Ok(word) = identifier.parse_next(input) else {
            break;
        };
        // unknown media types are ignored
        if let Some(media) = MediaType::from_name(word) {
            list.push(media);
        }
        if !skip_comma(input) {
            break;
        }
    }
    list
}

// ─── Parser ──────────────────────────────────────────────────────────────

/// Stylesheet parser bound to a device media type and a rule source.
pub struct CssParser<'r> {
    device: MediaType,
    source: Source,
    resolver: Option<&'r dyn ExternalResolver>,
    in_media: bool,
}

impl<'r> CssParser<'r> {
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self {
            device: MediaType::Screen,
            source,
            resolver: None,
            in_media: false,
        }
    }

    /// Resolver consulted for `@import`.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Option<&'r dyn ExternalResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Parse a whole stylesheet. Any syntax error fails the whole sheet.
    #[must_use = "parsing result should be used"]
    pub fn parse(&mut self, sheet: &str) -> Result<Ruleset> {
        let cleaned = strip_comments(sheet);
        let mut input = cleaned.as_str();
        let ruleset = self.parse_ruleset(&mut input)?;
        skip_ws(&mut input);
        if !input.is_empty() {
            return Err(css_error(format!("unexpected input at {:?}", ahead(input))));
        }
        Ok(ruleset)
    }

    fn parse_ruleset(&mut self, input: &mut &str) -> Result<Ruleset> {
        let mut ruleset = Ruleset::new();
        loop {
            skip_ws(input);
            if input.is_empty() {
                break;
            }
            if let Some(rest) = input.strip_prefix("<!--").or_else(|| input.strip_prefix("-->")) {
                *input = rest;
                continue;
            }
            if let Some(rest) = input.strip_prefix('@') {
                *input = rest;
                self.parse_at_rule(&mut ruleset, input)?;
                continue;
            }
            if !self.parse_rule(&mut ruleset, input)? {
                // nothing recognisable; possibly the end of an @media block
                break;
            }
        }
        Ok(ruleset)
    }

    fn parse_at_rule(&mut self, ruleset: &mut Ruleset, input: &mut &str) -> Result<()> {
        let keyword = identifier
            .parse_next(input)
            .map_err(|_| css_error("invalid '@' rule"))?;
        skip_ws(input);

        match keyword {
            "media" if !self.in_media => {
                let media = media_list_of(input);
                skip_ws(input);
                if !eat(input, '{') {
                    return Err(css_error("invalid @media rule: missing rule set"));
                }
                let applies = list_matches(&media, self.device);
                self.in_media = true;
                let inner = self.parse_ruleset(input);
                self.in_media = false;
                if applies {
                    ruleset.add_all(inner?);
                } else {
                    inner?;
                }
                skip_ws(input);
                if !input.is_empty() && !eat(input, '}') {
                    return Err(css_error("invalid @media rule: expected '}' at end of rule set"));
                }
            }
            "import" if !self.in_media => {
                let start = *input;
                let file = match url.parse_next(input) {
                    Ok(file) => file,
                    Err(_) => {
                        *input = start;
                        css_string.parse_next(input).map_err(|_| {
                            css_error("invalid @import rule: expected string or url()")
                        })?
                    }
                };
                skip_ws(input);
                let media = media_list_of(input);
                skip_ws(input);
                if !input.is_empty() && !eat(input, ';') {
                    return Err(css_error("invalid @import rule: expected ';'"));
                }
                // an @import without a media list applies to all media
                if (media.is_empty() || list_matches(&media, self.device))
                    && let Some(resolver) = self.resolver
                {
                    match resolver.resolve_stylesheet(&file) {
                        Some(css) => {
                            let mut nested = CssParser::new(self.source).with_resolver(self.resolver);
                            ruleset.add_all(nested.parse(&css)?);
                        }
                        None => log::warn!("Stylesheet {file:?} could not be resolved"),
                    }
                }
            }
            other => {
                log::warn!("Ignoring @{other} rule");
                skip_at_rule(input);
            }
        }
        skip_ws(input);
        Ok(())
    }

    fn parse_rule(&mut self, ruleset: &mut Ruleset, input: &mut &str) -> Result<bool> {
        let selectors = selector_group(input)?;
        if selectors.is_empty() {
            return Ok(false);
        }
        if !eat(input, '{') {
            return Err(css_error(format!(
                "malformed rule block: expected '{{' at {:?}",
                ahead(input)
            )));
        }
        skip_ws(input);
        let style = parse_declarations(input)?;
        skip_ws(input);
        for selector in selectors {
            ruleset.add(Rule {
                selector,
                style: style.clone(),
                source: self.source,
            });
        }
        Ok(true)
    }
}

/// Parse `name: value [!important];` declarations up to and including the
/// closing `}`.
fn parse_declarations(input: &mut &str) -> Result<Style> {
    let mut style = Style::new();
    if eat(input, '}') {
        return Ok(style);
    }
    loop {
        let name = identifier
            .parse_next(input)
            .map_err(|_| css_error(format!("expected property name at {:?}", ahead(input))))?;
        skip_ws(input);
        if !eat(input, ':') {
            return Err(css_error(format!("expected ':' after {name:?}")));
        }
        skip_ws(input);
        let value = property_value(input)
            .ok_or_else(|| css_error(format!("expected a value for {name:?}")))?;
        skip_ws(input);
        if eat(input, '!') {
            skip_ws(input);
            if !eat_str(input, "important") {
                return Err(css_error("malformed rule set: found unexpected '!'"));
            }
            skip_ws(input);
        }
        eat(input, ';');
        style.set_property(name, value);
        skip_ws(input);
        if eat(input, '}') {
            break;
        }
        if input.is_empty() {
            return Err(css_error("malformed rule set: expected '}' at end of rule set"));
        }
    }
    Ok(style)
}

/// A property value runs up to `;`, `}`, `!` or the end of the line.
fn property_value<'a>(input: &mut &'a str) -> Option<&'a str> {
    let end = input
        .find(|c: char| matches!(c, ';' | '}' | '!' | '\n' | '\r'))
        .unwrap_or(input.len());
    let value = input[..end].trim_end();
    if value.is_empty() {
        return None;
    }
    *input = &input[end..];
    Some(value)
}

fn skip_at_rule(input: &mut &str) {
    let mut depth = 0usize;
    let mut end = input.len();
    for (i, c) in input.char_indices() {
        match c {
            ';' if depth == 0 => {
                end = i + 1;
                break;
            }
            '{' => depth += 1,
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    end = i + 1;
                    break;
                }
            }
            _ => {}
        }
    }
    *input = &input[end..];
}

// ─── Selectors ───────────────────────────────────────────────────────────

/// Parse a comma-separated group of selectors. Returns an empty group when
/// no selector starts at the cursor.
fn selector_group(input: &mut &str) -> Result<Vec<Selector>> {
    let mut group = Vec::new();
    let mut selector = Selector::default();
    while !input.is_empty() {
        if !simple_selector(input, &mut selector)? {
            break;
        }
        if skip_comma(input) {
            group.push(std::mem::take(&mut selector));
        }
    }
    if !selector.is_empty() {
        group.push(selector);
    }
    Ok(group)
}

/// Parse one simple selector (with its leading combinator) into
/// `selector`. Returns `false`, leaving the input untouched, when there is
/// none.
fn simple_selector(input: &mut &str, selector: &mut Selector) -> Result<bool> {
    let start = *input;
    let mut combinator = Combinator::Descendant;
    if !selector.is_empty() {
        if eat(input, '>') {
            combinator = Combinator::Child;
            skip_ws(input);
        } else if eat(input, '+') {
            combinator = Combinator::Follows;
            skip_ws(input);
        }
    }

    let mut part = if eat(input, '*') {
        Some(SimpleSelector::new(combinator, None))
    } else if let Ok(tag) = identifier.parse_next(input) {
        selector.specificity += SPECIFICITY_ELEMENT;
        Some(SimpleSelector::new(combinator, Some(tag.to_string())))
    } else {
        None
    };

    loop {
        if eat(input, '.') {
            let class = identifier
                .parse_next(input)
                .map_err(|_| css_error("invalid \".class\" selector"))?;
            part.get_or_insert_with(|| SimpleSelector::new(combinator, None))
                .attribs
                .push(Attrib {
                    name: "class".to_string(),
                    op: AttribOp::Includes(class.to_string()),
                });
            selector.specificity += SPECIFICITY_ATTRIBUTE_OR_PSEUDO;
        } else if eat(input, '#') {
            let id = identifier
                .parse_next(input)
                .map_err(|_| css_error("invalid \"#id\" selector"))?;
            part.get_or_insert_with(|| SimpleSelector::new(combinator, None))
                .attribs
                .push(Attrib {
                    name: "id".to_string(),
                    op: AttribOp::Equals(id.to_string()),
                });
            selector.specificity += SPECIFICITY_ID;
        } else if eat(input, '[') {
            let attrib = attribute_selector(input)?;
            part.get_or_insert_with(|| SimpleSelector::new(combinator, None))
                .attribs
                .push(attrib);
            selector.specificity += SPECIFICITY_ATTRIBUTE_OR_PSEUDO;
        } else if eat(input, ':') {
            let simple = part.get_or_insert_with(|| SimpleSelector::new(combinator, None));
            let (pseudo, specificity) = pseudo_class(input, simple.tag.as_deref())?;
            simple.pseudos.push(pseudo);
            selector.specificity += specificity;
        } else {
            break;
        }
    }

    match part {
        Some(part) => {
            selector.parts.push(part);
            Ok(true)
        }
        None => {
            *input = start;
            Ok(false)
        }
    }
}

fn attribute_selector(input: &mut &str) -> Result<Attrib> {
    let invalid = || css_error("invalid attribute selector");
    skip_ws(input);
    let name = identifier.parse_next(input).map_err(|_| invalid())?.to_string();
    skip_ws(input);
    let op: Option<fn(String) -> AttribOp> = if eat(input, '=') {
        Some(AttribOp::Equals)
    } else if eat_str(input, "~=") {
        Some(AttribOp::Includes)
    } else if eat_str(input, "|=") {
        Some(AttribOp::DashMatch)
    } else {
        None
    };
    let op = match op {
        Some(make) => {
            skip_ws(input);
            let value = match css_string.parse_next(input) {
                Ok(s) => s,
                Err(_) => identifier.parse_next(input).map_err(|_| invalid())?.to_string(),
            };
            skip_ws(input);
            make(value)
        }
        None => AttribOp::Exists,
    };
    if !eat(input, ']') {
        return Err(invalid());
    }
    Ok(Attrib { name, op })
}

/// Parse a pseudo-class after the `:`. Returns it with the specificity it
/// contributes.
fn pseudo_class(input: &mut &str, tag: Option<&str>) -> Result<(PseudoClass, u32)> {
    let ident = identifier
        .parse_next(input)
        .map_err(|_| css_error("invalid pseudo class"))?;
    let tag = tag.map(str::to_string);
    let nth = |a, b, from_start, of_type, tag| PseudoClass::Nth {
        a,
        b,
        from_start,
        of_type,
        tag,
    };
    let pseudo = match ident {
        "first-child" => nth(0, 1, true, false, None),
        "last-child" => nth(0, 1, false, false, None),
        "only-child" => PseudoClass::OnlyChild { of_type: false, tag: None },
        "first-of-type" => nth(0, 1, true, true, tag),
        "last-of-type" => nth(0, 1, false, true, tag),
        "only-of-type" => PseudoClass::OnlyChild { of_type: true, tag },
        "root" => PseudoClass::Root,
        "empty" => PseudoClass::Empty,
        "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
            let (a, b) = an_plus_b.parse_next(input).map_err(|_| {
                css_error(format!("invalid or missing parameter section for pseudo class: {ident}"))
            })?;
            let from_start = matches!(ident, "nth-child" | "nth-of-type");
            let of_type = matches!(ident, "nth-of-type" | "nth-last-of-type");
            nth(a, b, from_start, of_type, if of_type { tag } else { None })
        }
        "not" => {
            let group = not_argument(input)?;
            // specificity of the most specific argument
            let specificity = group.iter().map(|s| s.specificity).max().unwrap_or(0);
            return Ok((PseudoClass::Not(group), specificity));
        }
        "target" => PseudoClass::Target,
        "lang" => {
            ident_list_argument
                .parse_next(input)
                .map_err(|_| css_error("invalid or missing parameter section for pseudo class: lang"))?;
            PseudoClass::Unsupported(ident.to_string())
        }
        "link" | "visited" | "hover" | "active" | "focus" | "enabled" | "disabled"
        | "checked" | "indeterminate" => PseudoClass::Unsupported(ident.to_string()),
        other => return Err(css_error(format!("unsupported pseudo class: {other}"))),
    };
    Ok((pseudo, SPECIFICITY_ATTRIBUTE_OR_PSEUDO))
}

fn not_argument(input: &mut &str) -> Result<Vec<Selector>> {
    let invalid = || css_error("invalid or missing parameter section for pseudo class: not");
    let start = *input;
    if !eat(input, '(') {
        return Err(invalid());
    }
    skip_ws(input);
    let group = selector_group(input)?;
    skip_ws(input);
    if group.is_empty() || !eat(input, ')') {
        *input = start;
        return Err(invalid());
    }
    let nested = group
        .iter()
        .flat_map(|s| &s.parts)
        .flat_map(|p| &p.pseudos)
        .any(|p| matches!(p, PseudoClass::Not(_)));
    if nested {
        return Err(css_error(":not() cannot be nested"));
    }
    Ok(group)
}

// ─── Tokens ──────────────────────────────────────────────────────────────

fn css_error(message: impl Into<String>) -> ParseError {
    ParseError::Css(message.into())
}

fn ahead(input: &str) -> &str {
    let end = input.char_indices().nth(20).map_or(input.len(), |(i, _)| i);
    &input[..end]
}

fn skip_ws(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

/// `wsp* (',' wsp*)?`, returning whether a comma was found.
fn skip_comma(input: &mut &str) -> bool {
    skip_ws(input);
    if eat(input, ',') {
        skip_ws(input);
        true
    } else {
        false
    }
}

fn eat(input: &mut &str, c: char) -> bool {
    match input.strip_prefix(c) {
        Some(rest) => {
            *input = rest;
            true
        }
        None => false,
    }
}

fn eat_str(input: &mut &str, literal: &str) -> bool {
    match input.strip_prefix(literal) {
        Some(rest) => {
            *input = rest;
            true
        }
        None => false,
    }
}

/// A CSS `ident`: `-?[A-Za-z_][A-Za-z0-9_-]*`.
fn identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let start = *input;
    let ident = (
        opt('-'),
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
    )
        .take()
        .parse_next(input);
    if ident.is_err() {
        *input = start;
    }
    ident
}

/// A quoted CSS string with backslash escapes resolved.
fn css_string(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut out = String::new();
    let mut chars = input.char_indices().peekable();
    let mut end = input.len();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            end = i + c.len_utf8();
            break;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => {}
            Some((_, '\n' | '\r' | '\x0c')) => {}
            Some((_, h)) if h.is_ascii_hexdigit() => {
                let mut code = h.to_digit(16).unwrap_or(0);
                for _ in 1..6 {
                    match chars.peek() {
                        Some(&(_, d)) if d.is_ascii_hexdigit() => {
                            code = code * 16 + d.to_digit(16).unwrap_or(0);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some((_, other)) => out.push(other),
        }
    }
    *input = &input[end..];
    Ok(out)
}

/// `url( "..." )` or the legacy unquoted `url(...)`.
fn url(input: &mut &str) -> ModalResult<String> {
    let legacy = take_while(1.., |c: char| {
        !matches!(c, '\'' | '"' | '(' | ')') && !c.is_whitespace() && !c.is_control()
    })
    .map(str::to_string);
    delimited(
        ("url(", multispace0),
        alt((css_string, legacy)),
        (multispace0, ')'),
    )
    .parse_next(input)
}

/// The parenthesised argument of `:nth-*()`: `odd`, `even` or `An+B`.
fn an_plus_b(input: &mut &str) -> ModalResult<(i32, i32)> {
    delimited(
        ('(', multispace0),
        alt(("odd".value((2, 1)), "even".value((2, 0)), an_plus_b_expr)),
        (multispace0, ')'),
    )
    .parse_next(input)
}

fn an_plus_b_expr(input: &mut &str) -> ModalResult<(i32, i32)> {
    let sign = match opt(one_of(['+', '-'])).parse_next(input)? {
        Some('-') => -1,
        _ => 1,
    };
    let first: Option<i32> = opt(digit1.parse_to()).parse_next(input)?;
    if opt(one_of(['n', 'N'])).parse_next(input)?.is_none() {
        return match first {
            Some(b) => Ok((0, sign * b)),
            None => Err(ErrMode::Backtrack(ContextError::new())),
        };
    }
    let a = sign * first.unwrap_or(1);
    multispace0.parse_next(input)?;
    let b = match opt(one_of(['+', '-'])).parse_next(input)? {
        Some(b_sign) => {
            multispace0.parse_next(input)?;
            let b: i32 = digit1.parse_to().parse_next(input)?;
            if b_sign == '-' { -b } else { b }
        }
        None => 0,
    };
    Ok((a, b))
}

fn ident_list_argument(input: &mut &str) -> ModalResult<Vec<String>> {
    let _ = '('.parse_next(input)?;
    let mut list = Vec::new();
    loop {
        multispace0.parse_next(input)?;
        list.push(identifier.parse_next(input)?.to_string());
        multispace0.parse_next(input)?;
        if opt(',').parse_next(input)?.is_none() {
            break;
        }
    }
    let _ = ')'.parse_next(input)?;
    Ok(list)
}

/// Split a `class` attribute into its class names.
pub fn parse_class_attribute(value: &str) -> Vec<&str> {
    value.split_ascii_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Color, Paint};
    use pretty_assertions::assert_eq;

    fn parse(css: &str) -> Ruleset {
        CssParser::new(Source::Document).parse(css).unwrap()
    }

    fn selectors(rules: &Ruleset) -> Vec<String> {
        rules.rules().iter().map(|r| r.selector.to_string()).collect()
    }

    #[test]
    fn simple_rule() {
        let rules = parse("rect { fill: #0f0 }");
        assert_eq!(rules.len(), 1);
        let rule = &rules.rules()[0];
        assert_eq!(rule.selector.specificity, 1);
        assert_eq!(rule.style.fill, Some(Paint::Color(Color(0xff00ff00))));
    }

    #[test]
    fn rules_sorted_by_specificity_stably() {
        let rules = parse("#a { fill: red } .b { fill: blue } rect { fill: green } g { }");
        assert_eq!(selectors(&rules), vec!["rect", "g", "*[class~=b]", "*[id=a]"]);
        let specs: Vec<u32> = rules.rules().iter().map(|r| r.selector.specificity).collect();
        assert_eq!(specs, vec![1, 1, 100, 10_000]);
    }

    #[test]
    fn combinators_and_groups() {
        let rules = parse("svg > g rect, a + b { stroke: red }");
        // ascending specificity: 2 before 3
        assert_eq!(selectors(&rules), vec!["a + b", "svg > g rect"]);
        assert_eq!(rules.rules()[1].selector.specificity, 3);
    }

    #[test]
    fn attribute_selectors() {
        let rules = parse("[id] {} *[class~=x] {} g[id|=\"pre\"] {}");
        let ops: Vec<AttribOp> = rules
            .rules()
            .iter()
            .map(|r| r.selector.parts[0].attribs[0].op.clone())
            .collect();
        assert_eq!(
            ops,
            vec![
                AttribOp::Exists,
                AttribOp::Includes("x".into()),
                AttribOp::DashMatch("pre".into()),
            ]
        );
    }

    #[test]
    fn an_plus_b_forms() {
        let cases = [
            ("(odd)", (2, 1)),
            ("(even)", (2, 0)),
            ("(2n+1)", (2, 1)),
            ("( -n + 3 )", (-1, 3)),
            ("(n)", (1, 0)),
            ("(+5)", (0, 5)),
            ("(3n - 2)", (3, -2)),
            ("(-2)", (0, -2)),
        ];
        for (text, expected) in cases {
            let mut input = text;
            assert_eq!(an_plus_b.parse_next(&mut input).unwrap(), expected, "{text}");
        }
        let mut input = "(x)";
        assert!(an_plus_b.parse_next(&mut input).is_err());
    }

    #[test]
    fn pseudo_classes() {
        let rules = parse("rect:nth-child(2n+1) {} g:first-of-type {} :not(.a, #b) {}");
        let all = rules.rules();
        assert_eq!(
            all[0].selector.parts[0].pseudos[0],
            PseudoClass::Nth { a: 2, b: 1, from_start: true, of_type: false, tag: None }
        );
        assert_eq!(
            all[1].selector.parts[0].pseudos[0],
            PseudoClass::Nth { a: 0, b: 1, from_start: true, of_type: true, tag: Some("g".into()) }
        );
        assert_eq!(all[2].selector.specificity, 10_000);
    }

    #[test]
    fn unknown_pseudo_class_is_error() {
        assert!(CssParser::new(Source::Document).parse("a:frobnicate {}").is_err());
        assert!(CssParser::new(Source::Document).parse("a:not(:not(b)) {}").is_err());
    }

    #[test]
    fn lang_needs_an_argument_list() {
        let rules = parse("text:lang(en, fr) { fill: red }");
        assert_eq!(
            rules.rules()[0].selector.parts[0].pseudos[0],
            PseudoClass::Unsupported("lang".into())
        );
        assert!(CssParser::new(Source::Document).parse("text:lang( { fill: red }").is_err());
        assert!(CssParser::new(Source::Document).parse("text:lang { fill: red }").is_err());
    }

    #[test]
    fn media_blocks_flatten_or_discard() {
        let rules = parse("@media print { rect { fill: red } } @media screen, tv { g { fill: blue } }");
        assert_eq!(selectors(&rules), vec!["g"]);
    }

    #[test]
    fn unknown_at_rules_are_skipped() {
        let rules = parse("@charset \"utf-8\"; @font-face { src: x; } rect { fill: red }");
        assert_eq!(selectors(&rules), vec!["rect"]);
    }

    #[test]
    fn important_is_ignored_and_comments_stripped() {
        let rules = parse("/* c */ rect { fill: red !important; stroke: blue }");
        let style = &rules.rules()[0].style;
        assert_eq!(style.fill, Some(Paint::Color(Color(0xffff0000))));
        assert_eq!(style.stroke, Some(Paint::Color(Color(0xff0000ff))));
    }

    #[test]
    fn malformed_sheets_fail() {
        let mut parser = CssParser::new(Source::Document);
        assert!(parser.parse("rect fill: red }").is_err());
        assert!(parser.parse("rect { fill red }").is_err());
        assert!(parser.parse("rect { fill: red ! }").is_err());
        assert!(parser.parse("rect { fill: red } }").is_err());
        assert!(parser.parse("rect { fill: red").is_err());
        assert!(parser.parse("rect { fill: red;").is_err());
    }

    #[test]
    fn import_goes_through_resolver() {
        struct Sheets;
        impl ExternalResolver for Sheets {
            fn resolve_stylesheet(&self, uri: &str) -> Option<String> {
                (uri == "base.css").then(|| "circle { fill: red }".to_string())
            }
        }
        let resolver = Sheets;
        let rules = CssParser::new(Source::Document)
            .with_resolver(Some(&resolver))
            .parse("@import url(base.css); @import 'missing.css'; rect { fill: blue }")
            .unwrap();
        assert_eq!(selectors(&rules), vec!["circle", "rect"]);

        let printed = CssParser::new(Source::Document)
            .with_resolver(Some(&resolver))
            .parse("@import url(base.css) print; rect { fill: blue }")
            .unwrap();
        assert_eq!(selectors(&printed), vec!["rect"]);
    }

    #[test]
    fn media_attribute_matching() {
        assert!(media_matches("screen", MediaType::Screen));
        assert!(media_matches("print, all", MediaType::Screen));
        assert!(!media_matches("print", MediaType::Screen));
        assert!(!media_matches("", MediaType::Screen));
    }

    #[test]
    fn remove_rules_by_source() {
        let mut rules = parse("rect { fill: red }");
        rules.add_all(
            CssParser::new(Source::RenderOptions)
                .parse("g { fill: blue }")
                .unwrap(),
        );
        assert_eq!(rules.len(), 2);
        rules.remove_from_source(Source::RenderOptions);
        assert_eq!(selectors(&rules), vec!["rect"]);
    }

    #[test]
    fn class_attribute_tokens() {
        assert_eq!(parse_class_attribute("  a b\tc "), vec!["a", "b", "c"]);
    }
}
