//! The style property bag.
//!
//! Every property is optional. A parallel [`Specified`] bitset records which
//! properties were set explicitly; it is the only thing the cascade looks at
//! when deciding whether to copy a value. A property explicitly set to a
//! "none" value (no dashing, no clip path) has its bit set and a `None`
//! value.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::attr::Attr;
use crate::error::ValueError;
use crate::scanner::TextScanner;
use crate::values::{
    self, ClipRect, Color, Direction, FillRule, FontStyle, FontWeight, Length, LineCap, LineJoin,
    Paint, TextAnchor, TextDecoration, Unit, VectorEffect,
};

// ─── Specified flags ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specified(u64);

impl Specified {
    pub const NONE: Specified = Specified(0);
    pub const FILL: Specified = Specified(1 << 0);
    pub const FILL_RULE: Specified = Specified(1 << 1);
    pub const FILL_OPACITY: Specified = Specified(1 << 2);
    pub const STROKE: Specified = Specified(1 << 3);
    pub const STROKE_OPACITY: Specified = Specified(1 << 4);
    pub const STROKE_WIDTH: Specified = Specified(1 << 5);
    pub const STROKE_LINECAP: Specified = Specified(1 << 6);
    pub const STROKE_LINEJOIN: Specified = Specified(1 << 7);
    pub const STROKE_MITERLIMIT: Specified = Specified(1 << 8);
    pub const STROKE_DASHARRAY: Specified = Specified(1 << 9);
    pub const STROKE_DASHOFFSET: Specified = Specified(1 << 10);
    pub const OPACITY: Specified = Specified(1 << 11);
    pub const COLOR: Specified = Specified(1 << 12);
    pub const FONT_FAMILY: Specified = Specified(1 << 13);
    pub const FONT_SIZE: Specified = Specified(1 << 14);
    pub const FONT_WEIGHT: Specified = Specified(1 << 15);
    pub const FONT_STYLE: Specified = Specified(1 << 16);
    pub const TEXT_DECORATION: Specified = Specified(1 << 17);
    pub const TEXT_ANCHOR: Specified = Specified(1 << 18);
    pub const OVERFLOW: Specified = Specified(1 << 19);
    pub const CLIP: Specified = Specified(1 << 20);
    pub const MARKER_START: Specified = Specified(1 << 21);
    pub const MARKER_MID: Specified = Specified(1 << 22);
    pub const MARKER_END: Specified = Specified(1 << 23);
    pub const DISPLAY: Specified = Specified(1 << 24);
    pub const VISIBILITY: Specified = Specified(1 << 25);
    pub const STOP_COLOR: Specified = Specified(1 << 26);
    pub const STOP_OPACITY: Specified = Specified(1 << 27);
    pub const CLIP_PATH: Specified = Specified(1 << 28);
    pub const CLIP_RULE: Specified = Specified(1 << 29);
    pub const MASK: Specified = Specified(1 << 30);
    pub const SOLID_COLOR: Specified = Specified(1 << 31);
    pub const SOLID_OPACITY: Specified = Specified(1 << 32);
    pub const VIEWPORT_FILL: Specified = Specified(1 << 33);
    pub const VIEWPORT_FILL_OPACITY: Specified = Specified(1 << 34);
    pub const VECTOR_EFFECT: Specified = Specified(1 << 35);
    pub const DIRECTION: Specified = Specified(1 << 36);

    pub const ALL: Specified = Specified((1 << 37) - 1);

    /// Properties that are not inherited from the parent.
    pub const NON_INHERITING: Specified = Specified(
        Self::DISPLAY.0
            | Self::OVERFLOW.0
            | Self::CLIP.0
            | Self::CLIP_PATH.0
            | Self::OPACITY.0
            | Self::STOP_COLOR.0
            | Self::STOP_OPACITY.0
            | Self::MASK.0
            | Self::SOLID_COLOR.0
            | Self::SOLID_OPACITY.0
            | Self::VIEWPORT_FILL.0
            | Self::VIEWPORT_FILL_OPACITY.0
            | Self::VECTOR_EFFECT.0,
    );

    /// True if any of the bits in `other` are set.
    pub fn intersects(self, other: Specified) -> bool {
        self.0 & other.0 != 0
    }

    pub fn contains(self, other: Specified) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u64 {
        self.0
    }
}

impl BitOr for Specified {
    type Output = Specified;

    fn bitor(self, rhs: Specified) -> Specified {
        Specified(self.0 | rhs.0)
    }
}

impl BitOrAssign for Specified {
    fn bitor_assign(&mut self, rhs: Specified) {
        self.0 |= rhs.0;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub specified: Specified,

    pub fill: Option<Paint>,
    pub fill_rule: Option<FillRule>,
    pub fill_opacity: Option<f32>,
    pub stroke: Option<Paint>,
    pub stroke_opacity: Option<f32>,
    pub stroke_width: Option<Length>,
    pub stroke_line_cap: Option<LineCap>,
    pub stroke_line_join: Option<LineJoin>,
    pub stroke_miter_limit: Option<f32>,
    /// `None` with the flag set means no dashing.
    pub stroke_dash_array: Option<Vec<Length>>,
    pub stroke_dash_offset: Option<Length>,
    pub opacity: Option<f32>,
    pub color: Option<Color>,
    pub font_family: Option<Vec<String>>,
    pub font_size: Option<Length>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
    pub direction: Option<Direction>,
    pub text_anchor: Option<TextAnchor>,
    /// `true` when content outside the viewport is visible.
    pub overflow: Option<bool>,
    pub clip: Option<ClipRect>,
    pub marker_start: Option<String>,
    pub marker_mid: Option<String>,
    pub marker_end: Option<String>,
    pub display: Option<bool>,
    pub visibility: Option<bool>,
    pub stop_color: Option<Paint>,
    pub stop_opacity: Option<f32>,
    pub clip_path: Option<String>,
    pub clip_rule: Option<FillRule>,
    pub mask: Option<String>,
    pub solid_color: Option<Paint>,
    pub solid_opacity: Option<f32>,
    pub viewport_fill: Option<Paint>,
    pub viewport_fill_opacity: Option<f32>,
    pub vector_effect: Option<VectorEffect>,
}

/// The initial values of every property, with all flags set. Seeds the
/// cascade at the document root.
pub fn default_style() -> Style {
    Style {
        specified: Specified::ALL,
        fill: Some(Paint::Color(Color::BLACK)),
        fill_rule: Some(FillRule::NonZero),
        fill_opacity: Some(1.0),
        stroke: Some(Paint::None),
        stroke_opacity: Some(1.0),
        stroke_width: Some(Length::px(1.0)),
        stroke_line_cap: Some(LineCap::Butt),
        stroke_line_join: Some(LineJoin::Miter),
        stroke_miter_limit: Some(4.0),
        stroke_dash_array: None,
        stroke_dash_offset: Some(Length::ZERO),
        opacity: Some(1.0),
        color: Some(Color::BLACK),
        font_family: None,
        font_size: Some(Length::new(12.0, Unit::Pt)),
        font_weight: Some(FontWeight::NORMAL),
        font_style: Some(FontStyle::Normal),
        text_decoration: Some(TextDecoration::None),
        direction: Some(Direction::Ltr),
        text_anchor: Some(TextAnchor::Start),
        overflow: Some(true),
        clip: None,
        marker_start: None,
        marker_mid: None,
        marker_end: None,
        display: Some(true),
        visibility: Some(true),
        stop_color: Some(Paint::Color(Color::BLACK)),
        stop_opacity: Some(1.0),
        clip_path: None,
        clip_rule: Some(FillRule::NonZero),
        mask: None,
        solid_color: None,
        solid_opacity: Some(1.0),
        viewport_fill: None,
        viewport_fill_opacity: Some(1.0),
        vector_effect: Some(VectorEffect::None),
    }
}

macro_rules! copy_specified {
    ($dst:ident, $src:ident, $( $flag:ident => $field:ident ),+ $(,)?) => {
        $(
            if $src.specified.contains(Specified::$flag) {
                $dst.$field = $src.$field.clone();
            }
        )+
    };
}

impl Style {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_specified(&self, flag: Specified) -> bool {
        self.specified.contains(flag)
    }

    /// Reset the properties that do not inherit to their initial values.
    /// `overflow` is initially visible only on the root element.
    pub fn reset_non_inheriting(&mut self, is_root: bool) {
        self.display = Some(true);
        self.overflow = Some(is_root);
        self.clip = None;
        self.clip_path = None;
        self.opacity = Some(1.0);
        self.stop_color = Some(Paint::Color(Color::BLACK));
        self.stop_opacity = Some(1.0);
        self.mask = None;
        self.solid_color = None;
        self.solid_opacity = Some(1.0);
        self.viewport_fill = None;
        self.viewport_fill_opacity = Some(1.0);
        self.vector_effect = Some(VectorEffect::None);
    }

    /// Copy every property specified on `src`, overwriting. Flags are merged.
    pub fn apply(&mut self, src: &Style) {
        copy_specified!(self, src,
            FILL => fill,
            FILL_RULE => fill_rule,
            FILL_OPACITY => fill_opacity,
            STROKE => stroke,
            STROKE_OPACITY => stroke_opacity,
            STROKE_WIDTH => stroke_width,
            STROKE_LINECAP => stroke_line_cap,
            STROKE_LINEJOIN => stroke_line_join,
            STROKE_MITERLIMIT => stroke_miter_limit,
            STROKE_DASHARRAY => stroke_dash_array,
            STROKE_DASHOFFSET => stroke_dash_offset,
            OPACITY => opacity,
            COLOR => color,
            FONT_FAMILY => font_family,
            FONT_SIZE => font_size,
            FONT_WEIGHT => font_weight,
            FONT_STYLE => font_style,
            TEXT_DECORATION => text_decoration,
            DIRECTION => direction,
            TEXT_ANCHOR => text_anchor,
            OVERFLOW => overflow,
            CLIP => clip,
            MARKER_START => marker_start,
            MARKER_MID => marker_mid,
            MARKER_END => marker_end,
            DISPLAY => display,
            VISIBILITY => visibility,
            STOP_COLOR => stop_color,
            STOP_OPACITY => stop_opacity,
            CLIP_PATH => clip_path,
            CLIP_RULE => clip_rule,
            MASK => mask,
            SOLID_COLOR => solid_color,
            SOLID_OPACITY => solid_opacity,
            VIEWPORT_FILL => viewport_fill,
            VIEWPORT_FILL_OPACITY => viewport_fill_opacity,
            VECTOR_EFFECT => vector_effect,
        );
        self.specified |= src.specified;
    }

    /// Like [`apply`](Self::apply), but font sizes in `em`, `ex` or `%` and
    /// the `bolder`/`lighter` weights are resolved against the values
    /// already held by `self`, which must be the inherited style.
    pub fn apply_inherited(&mut self, src: &Style) {
        let parent_size = self.font_size;
        let parent_weight = self.font_weight;
        self.apply(src);

        if src.is_specified(Specified::FONT_SIZE) {
            if let (Some(parent), Some(own)) = (parent_size, src.font_size) {
                let factor = match own.unit {
                    Unit::Em => Some(own.value),
                    Unit::Ex => Some(own.value / 2.0),
                    Unit::Percent => Some(own.value / 100.0),
                    _ => None,
                };
                if let Some(factor) = factor {
                    self.font_size = Some(Length::new(parent.value * factor, parent.unit));
                }
            }
        }
        if src.is_specified(Specified::FONT_WEIGHT) {
            let parent = match parent_weight {
                Some(FontWeight::Absolute(w)) => w,
                _ => 400,
            };
            self.font_weight = src
                .font_weight
                .map(|w| FontWeight::Absolute(w.resolve(parent)));
        }
    }

    /// Apply one `name: value` declaration. `inherit` and empty values are
    /// ignored, as are unknown property names. Invalid values are dropped
    /// with a warning.
    pub fn set_property(&mut self, name: &str, value: &str) {
        let attr = Attr::from_name(name);
        if let Err(err) = self.set_attr(attr, value) {
            log::warn!("Ignoring {name} declaration: {err}");
        }
    }

    /// Apply a presentation attribute or property. Returns `Ok(false)` when
    /// `attr` is not a style property.
    pub fn set_attr(&mut self, attr: Attr, value: &str) -> Result<bool, ValueError> {
        let value = crate::scanner::trim(value);
        if value.is_empty() || value == "inherit" {
            return Ok(is_style_property(attr));
        }
        let flag = match attr {
            Attr::Fill => {
                self.fill = Some(values::parse_paint(value)?);
                Specified::FILL
            }
            Attr::FillRule => {
                self.fill_rule = Some(values::parse_fill_rule(value)?);
                Specified::FILL_RULE
            }
            Attr::FillOpacity => {
                self.fill_opacity = Some(values::parse_opacity(value)?);
                Specified::FILL_OPACITY
            }
            Attr::Stroke => {
                self.stroke = Some(values::parse_paint(value)?);
                Specified::STROKE
            }
            Attr::StrokeOpacity => {
                self.stroke_opacity = Some(values::parse_opacity(value)?);
                Specified::STROKE_OPACITY
            }
            Attr::StrokeWidth => {
                self.stroke_width = Some(values::parse_length(value)?);
                Specified::STROKE_WIDTH
            }
            Attr::StrokeLinecap => {
                self.stroke_line_cap = Some(values::parse_line_cap(value)?);
                Specified::STROKE_LINECAP
            }
            Attr::StrokeLinejoin => {
                self.stroke_line_join = Some(values::parse_line_join(value)?);
                Specified::STROKE_LINEJOIN
            }
            Attr::StrokeMiterlimit => {
                self.stroke_miter_limit = Some(values::parse_float(value)?);
                Specified::STROKE_MITERLIMIT
            }
            Attr::StrokeDasharray => {
                self.stroke_dash_array = values::parse_dash_array(value)?;
                Specified::STROKE_DASHARRAY
            }
            Attr::StrokeDashoffset => {
                self.stroke_dash_offset = Some(values::parse_length(value)?);
                Specified::STROKE_DASHOFFSET
            }
            Attr::Opacity => {
                self.opacity = Some(values::parse_opacity(value)?);
                Specified::OPACITY
            }
            Attr::Color => {
                self.color = Some(values::parse_color(value)?);
                Specified::COLOR
            }
            Attr::Font => {
                let Some(font) = values::parse_font(value)? else {
                    return Ok(true);
                };
                self.font_family = Some(font.family);
                self.font_size = Some(font.size);
                self.font_weight = Some(font.weight);
                self.font_style = Some(font.style);
                Specified::FONT_FAMILY
                    | Specified::FONT_SIZE
                    | Specified::FONT_WEIGHT
                    | Specified::FONT_STYLE
            }
            Attr::FontFamily => {
                self.font_family = Some(values::parse_font_family(value)?);
                Specified::FONT_FAMILY
            }
            Attr::FontSize => {
                self.font_size = Some(values::parse_font_size(value)?);
                Specified::FONT_SIZE
            }
            Attr::FontWeight => {
                self.font_weight = Some(values::parse_font_weight(value)?);
                Specified::FONT_WEIGHT
            }
            Attr::FontStyle => {
                self.font_style = Some(values::parse_font_style(value)?);
                Specified::FONT_STYLE
            }
            Attr::TextDecoration => {
                self.text_decoration = Some(values::parse_text_decoration(value)?);
                Specified::TEXT_DECORATION
            }
            Attr::Direction => {
                self.direction = Some(values::parse_direction(value)?);
                Specified::DIRECTION
            }
            Attr::TextAnchor => {
                self.text_anchor = Some(values::parse_text_anchor(value)?);
                Specified::TEXT_ANCHOR
            }
            Attr::Overflow => {
                self.overflow = Some(values::parse_overflow(value)?);
                Specified::OVERFLOW
            }
            Attr::Clip => {
                self.clip = values::parse_clip(value)?;
                Specified::CLIP
            }
            Attr::Marker => {
                let iri = values::parse_functional_iri(value)?;
                self.marker_start = iri.clone();
                self.marker_mid = iri.clone();
                self.marker_end = iri;
                Specified::MARKER_START | Specified::MARKER_MID | Specified::MARKER_END
            }
            Attr::MarkerStart => {
                self.marker_start = values::parse_functional_iri(value)?;
                Specified::MARKER_START
            }
            Attr::MarkerMid => {
                self.marker_mid = values::parse_functional_iri(value)?;
                Specified::MARKER_MID
            }
            Attr::MarkerEnd => {
                self.marker_end = values::parse_functional_iri(value)?;
                Specified::MARKER_END
            }
            Attr::Display => {
                self.display = Some(values::parse_display(value)?);
                Specified::DISPLAY
            }
            Attr::Visibility => {
                self.visibility = Some(values::parse_visibility(value)?);
                Specified::VISIBILITY
            }
            Attr::StopColor => {
                self.stop_color = Some(parse_color_or_current(value)?);
                Specified::STOP_COLOR
            }
            Attr::StopOpacity => {
                self.stop_opacity = Some(values::parse_opacity(value)?);
                Specified::STOP_OPACITY
            }
            Attr::ClipPath => {
                self.clip_path = values::parse_functional_iri(value)?;
                Specified::CLIP_PATH
            }
            Attr::ClipRule => {
                self.clip_rule = Some(values::parse_fill_rule(value)?);
                Specified::CLIP_RULE
            }
            Attr::Mask => {
                self.mask = values::parse_functional_iri(value)?;
                Specified::MASK
            }
            Attr::SolidColor => {
                self.solid_color = Some(parse_color_or_current(value)?);
                Specified::SOLID_COLOR
            }
            Attr::SolidOpacity => {
                self.solid_opacity = Some(values::parse_opacity(value)?);
                Specified::SOLID_OPACITY
            }
            Attr::ViewportFill => {
                self.viewport_fill = Some(parse_color_or_current(value)?);
                Specified::VIEWPORT_FILL
            }
            Attr::ViewportFillOpacity => {
                self.viewport_fill_opacity = Some(values::parse_opacity(value)?);
                Specified::VIEWPORT_FILL_OPACITY
            }
            Attr::VectorEffect => {
                self.vector_effect = Some(values::parse_vector_effect(value)?);
                Specified::VECTOR_EFFECT
            }
            _ => return Ok(false),
        };
        self.specified |= flag;
        Ok(true)
    }
}

fn parse_color_or_current(value: &str) -> Result<Paint, ValueError> {
    if value == "currentColor" {
        Ok(Paint::CurrentColor)
    } else {
        values::parse_color(value).map(Paint::Color)
    }
}

/// Whether `attr` names a style property (and therefore a presentation
/// attribute).
pub fn is_style_property(attr: Attr) -> bool {
    matches!(
        attr,
        Attr::Fill
            | Attr::FillRule
            | Attr::FillOpacity
            | Attr::Stroke
            | Attr::StrokeOpacity
            | Attr::StrokeWidth
            | Attr::StrokeLinecap
            | Attr::StrokeLinejoin
            | Attr::StrokeMiterlimit
            | Attr::StrokeDasharray
            | Attr::StrokeDashoffset
            | Attr::Opacity
            | Attr::Color
            | Attr::Font
            | Attr::FontFamily
            | Attr::FontSize
            | Attr::FontWeight
            | Attr::FontStyle
            | Attr::TextDecoration
            | Attr::Direction
            | Attr::TextAnchor
            | Attr::Overflow
            | Attr::Clip
            | Attr::Marker
            | Attr::MarkerStart
            | Attr::MarkerMid
            | Attr::MarkerEnd
            | Attr::Display
            | Attr::Visibility
            | Attr::StopColor
            | Attr::StopOpacity
            | Attr::ClipPath
            | Attr::ClipRule
            | Attr::Mask
            | Attr::SolidColor
            | Attr::SolidOpacity
            | Attr::ViewportFill
            | Attr::ViewportFillOpacity
            | Attr::VectorEffect
    )
}

/// Remove `/* ... */` comments. An unterminated comment runs to the end.
pub fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse an inline `style` attribute: `name: value; ...`.
///
/// Processing stops silently at the first syntax error; declarations read
/// up to that point are kept.
pub fn parse_style_attribute(value: &str) -> Style {
    let cleaned = strip_comments(value);
    let mut style = Style::new();
    let mut s = TextScanner::new(&cleaned);
    loop {
        s.skip_whitespace();
        let Some(name) = s.next_token(b':') else {
            break;
        };
        s.skip_whitespace();
        if !s.consume(b':') {
            break;
        }
        s.skip_whitespace();
        let Some(val) = declaration_value(&mut s) else {
            break;
        };
        s.skip_whitespace();
        if s.empty() || s.consume(b';') {
            style.set_property(name, val);
        } else {
            break;
        }
    }
    style
}

/// Scan a declaration value up to `;` or the end, allowing spaces inside.
fn declaration_value<'a>(s: &mut TextScanner<'a>) -> Option<&'a str> {
    let rest = s.remaining();
    let end = rest.find(';').unwrap_or(rest.len());
    let val = crate::scanner::trim(&rest[..end]);
    if val.is_empty() {
        return None;
    }
    s.reset(s.position() + end);
    Some(val)
}
