//! Typed SVG/CSS values and their grammars: lengths, boxes, colours,
//! paints, fonts, dash arrays, clip rects, viewBox and preserveAspectRatio,
//! plus the keyword-valued properties.
//!
//! Every parser takes an already-trimmed attribute or property value and
//! returns `Result<_, ValueError>`; the caller decides whether a failure is
//! fatal.

use std::fmt;

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::colors;
use crate::error::ValueError;
use crate::number;
use crate::scanner::TextScanner;

type ValueResult<T> = std::result::Result<T, ValueError>;

// ─── Length ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Px,
    Em,
    Ex,
    In,
    Cm,
    Mm,
    Pt,
    Pc,
    Percent,
}

impl Unit {
    /// Match a two-letter unit suffix, ignoring ASCII case.
    pub fn from_suffix(s: &str) -> Option<Unit> {
        let unit = match s.to_ascii_lowercase().as_str() {
            "px" => Unit::Px,
            "em" => Unit::Em,
            "ex" => Unit::Ex,
            "in" => Unit::In,
            "cm" => Unit::Cm,
            "mm" => Unit::Mm,
            "pt" => Unit::Pt,
            "pc" => Unit::Pc,
            _ => return None,
        };
        Some(unit)
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Ex => "ex",
            Unit::In => "in",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
            Unit::Percent => "%",
        }
    }
}

/// Everything needed to turn a [`Length`] into user-space pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    pub dpi: f32,
    /// Current font size in px. The x-height is taken as half of it.
    pub font_size: f32,
    /// Viewport that percentages refer to.
    pub viewport: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub const ZERO: Length = Length::px(0.0);

    #[must_use]
    pub const fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }

    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::new(value, Unit::Px)
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    pub fn is_negative(&self) -> bool {
        self.value < 0.0
    }

    /// Convert with any percentage taken relative to `reference`.
    pub fn to_px_of(&self, ctx: &LengthContext, reference: f32) -> f32 {
        match self.unit {
            Unit::Px => self.value,
            Unit::Em => self.value * ctx.font_size,
            Unit::Ex => self.value * ctx.font_size / 2.0,
            Unit::In => self.value * ctx.dpi,
            Unit::Cm => self.value * ctx.dpi / 2.54,
            Unit::Mm => self.value * ctx.dpi / 25.4,
            Unit::Pt => self.value * ctx.dpi / 72.0,
            Unit::Pc => self.value * ctx.dpi / 6.0,
            Unit::Percent => self.value * reference / 100.0,
        }
    }

    /// Horizontal length: percentages of the viewport width.
    pub fn to_px_x(&self, ctx: &LengthContext) -> f32 {
        self.to_px_of(ctx, ctx.viewport.width)
    }

    /// Vertical length: percentages of the viewport height.
    pub fn to_px_y(&self, ctx: &LengthContext) -> f32 {
        self.to_px_of(ctx, ctx.viewport.height)
    }

    /// Non-directional length (stroke width, radius): percentages of the
    /// normalised viewport diagonal `sqrt(w² + h²) / sqrt(2)`.
    pub fn to_px(&self, ctx: &LengthContext) -> f32 {
        let (w, h) = (ctx.viewport.width, ctx.viewport.height);
        let diagonal = if w == h {
            w
        } else {
            (w * w + h * h).sqrt() / std::f32::consts::SQRT_2
        };
        self.to_px_of(ctx, diagonal)
    }

    /// Value as a fraction for bounding-box units: `50%` and `0.5` both
    /// give 0.5.
    pub fn fraction(&self) -> f32 {
        match self.unit {
            Unit::Percent => self.value / 100.0,
            _ => self.value,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Parse a single length. A bare number is in px.
pub fn parse_length(val: &str) -> ValueResult<Length> {
    if val.is_empty() {
        return Err(ValueError::Empty { kind: "length" });
    }
    let mut s = TextScanner::new(val);
    match s.next_length() {
        Some(len) if s.empty() => Ok(len),
        _ => Err(ValueError::invalid("length", val)),
    }
}

/// Parse a length that must not be negative.
pub fn parse_positive_length(val: &str) -> ValueResult<Length> {
    let len = parse_length(val)?;
    if len.is_negative() {
        return Err(ValueError::negative("length", val));
    }
    Ok(len)
}

/// Parse a comma/whitespace separated list of lengths (text `x`, `dx`...).
pub fn parse_length_list(val: &str) -> ValueResult<Vec<Length>> {
    if val.is_empty() {
        return Err(ValueError::Empty { kind: "length list" });
    }
    let mut s = TextScanner::new(val);
    let mut out = Vec::new();
    while !s.empty() {
        let len = s
            .next_length()
            .ok_or_else(|| ValueError::invalid("length list", s.ahead()))?;
        out.push(len);
        s.skip_comma_whitespace();
    }
    Ok(out)
}

/// Parse a list of plain numbers (`points`). Stops at the first token that
/// is not a number and returns what was read.
pub fn parse_number_list(val: &str) -> Vec<f32> {
    let mut s = TextScanner::new(val);
    let mut out = Vec::new();
    while !s.empty() {
        let v = s.next_float();
        if v.is_nan() {
            log::warn!("Invalid number list value at {:?}", s.ahead());
            break;
        }
        out.push(v);
        s.skip_comma_whitespace();
    }
    out
}

pub fn parse_float(val: &str) -> ValueResult<f32> {
    if val.is_empty() {
        return Err(ValueError::Empty { kind: "number" });
    }
    number::parse_number(val).ok_or_else(|| ValueError::invalid("number", val))
}

/// Parse a float clamped to `[0, 1]`.
pub fn parse_opacity(val: &str) -> ValueResult<f32> {
    Ok(parse_float(val)?.clamp(0.0, 1.0))
}

/// `<stop offset>`: a number or percentage, clamped to `[0, 1]`.
pub fn parse_stop_offset(val: &str) -> ValueResult<f32> {
    let (num, percent) = match val.strip_suffix('%') {
        Some(n) => (n, true),
        None => (val, false),
    };
    let mut v = number::parse_number(num).ok_or_else(|| ValueError::invalid("offset", val))?;
    if percent {
        v /= 100.0;
    }
    Ok(v.clamp(0.0, 1.0))
}

// ─── Box ─────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in user units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    pub fn from_limits(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn max_x(&self) -> f32 {
        self.min_x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.min_y + self.height
    }

    #[must_use]
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::from_limits(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.min_x),
            f64::from(self.min_y),
            f64::from(self.max_x()),
            f64::from(self.max_y()),
        )
    }

    pub fn from_rect(r: Rect) -> Self {
        Bounds::from_limits(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32)
    }
}

/// `viewBox`: four numbers, width and height non-negative.
pub fn parse_view_box(val: &str) -> ValueResult<Bounds> {
    let mut s = TextScanner::new(val);
    let mut nums = [0.0f32; 4];
    for (i, slot) in nums.iter_mut().enumerate() {
        if i > 0 {
            s.skip_comma_whitespace();
        }
        *slot = s.next_float();
        if slot.is_nan() {
            return Err(ValueError::invalid("viewBox", val));
        }
    }
    let [x, y, w, h] = nums;
    if w < 0.0 || h < 0.0 {
        return Err(ValueError::negative("viewBox", val));
    }
    Ok(Bounds::new(x, y, w, h))
}

// ─── Colour and paint ────────────────────────────────────────────────────

/// Packed `0xAARRGGBB` colour.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xff00_0000);
    pub const TRANSPARENT: Color = Color(0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xff, r, g, b)
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Scale the alpha channel by `factor` in `[0, 1]`.
    #[must_use]
    pub fn with_opacity(self, factor: f32) -> Color {
        let a = (f32::from(self.alpha()) * factor.clamp(0.0, 1.0)).round() as u32;
        Color((self.0 & 0x00ff_ffff) | a << 24)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({self})")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    None,
    Color(Color),
    /// Resolved against the `color` property at use time.
    CurrentColor,
    /// `url(#id)` with an optional fallback used when `#id` does not resolve.
    Reference {
        href: String,
        fallback: Option<Box<Paint>>,
    },
}

/// Parse a colour: hex, `rgb[a]()`, `hsl[a]()` or a keyword.
pub fn parse_color(val: &str) -> ValueResult<Color> {
    if val.is_empty() {
        return Err(ValueError::Empty { kind: "colour" });
    }
    if let Some(hex) = val.strip_prefix('#') {
        return parse_hex_color(hex).ok_or_else(|| ValueError::invalid("colour", val));
    }
    let mut s = TextScanner::new(val);
    if let Some(func) = s.next_function() {
        let lower = func.to_ascii_lowercase();
        let color = match lower.as_str() {
            "rgb" | "rgba" => parse_rgb_args(&mut s, lower == "rgba"),
            "hsl" | "hsla" => parse_hsl_args(&mut s, lower == "hsla"),
            _ => None,
        };
        return color.ok_or_else(|| ValueError::invalid("colour", val));
    }
    colors::lookup(val)
        .map(|rgb| Color(0xff00_0000 | rgb))
        .ok_or_else(|| ValueError::invalid("colour", val))
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let v = number::parse_hex(hex)?;
    let expand = |n: u32| n << 4 | n;
    let argb = match hex.len() {
        3 => {
            0xff00_0000
                | expand(v >> 8 & 0xf) << 16
                | expand(v >> 4 & 0xf) << 8
                | expand(v & 0xf)
        }
        4 => {
            expand(v & 0xf) << 24
                | expand(v >> 12 & 0xf) << 16
                | expand(v >> 8 & 0xf) << 8
                | expand(v >> 4 & 0xf)
        }
        6 => 0xff00_0000 | v,
        8 => (v & 0xff) << 24 | v >> 8,
        _ => return None,
    };
    Some(Color(argb))
}

fn clamp_channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// `r, g, b [, a])` with integer or percentage channels.
fn parse_rgb_args(s: &mut TextScanner, with_alpha: bool) -> Option<Color> {
    let mut channels = [0u8; 3];
    for (i, slot) in channels.iter_mut().enumerate() {
        if i > 0 {
            s.skip_comma_whitespace();
        }
        let v = s.next_float();
        if v.is_nan() {
            return None;
        }
        *slot = if s.consume(b'%') {
            clamp_channel(v * 2.56)
        } else {
            clamp_channel(v)
        };
    }
    let alpha = alpha_arg(s, with_alpha)?;
    let [r, g, b] = channels;
    Some(Color::argb(alpha, r, g, b))
}

/// `h, s%, l% [, a])`
fn parse_hsl_args(s: &mut TextScanner, with_alpha: bool) -> Option<Color> {
    let hue = s.next_float();
    if hue.is_nan() {
        return None;
    }
    s.skip_comma_whitespace();
    let sat = s.next_float();
    if sat.is_nan() {
        return None;
    }
    s.consume(b'%');
    s.skip_comma_whitespace();
    let light = s.next_float();
    if light.is_nan() {
        return None;
    }
    s.consume(b'%');
    let alpha = alpha_arg(s, with_alpha)?;
    let (r, g, b) = hsl_to_rgb(hue, sat.clamp(0.0, 100.0) / 100.0, light.clamp(0.0, 100.0) / 100.0);
    Some(Color::argb(alpha, r, g, b))
}

/// Optional alpha argument followed by the closing bracket.
fn alpha_arg(s: &mut TextScanner, with_alpha: bool) -> Option<u8> {
    let mut alpha = 0xff;
    if with_alpha {
        s.skip_comma_whitespace();
        let a = s.next_float();
        if a.is_nan() {
            return None;
        }
        alpha = clamp_channel(a * 256.0);
    }
    s.skip_whitespace();
    (s.consume(b')') && s.empty()).then_some(alpha)
}

fn hsl_to_rgb(hue: f32, sat: f32, light: f32) -> (u8, u8, u8) {
    let h = hue.rem_euclid(360.0) / 360.0;
    if sat == 0.0 {
        let v = (light * 255.0).round() as u8;
        return (v, v, v);
    }
    let t2 = if light <= 0.5 {
        light * (sat + 1.0)
    } else {
        light + sat - light * sat
    };
    let t1 = light * 2.0 - t2;
    let channel = |h: f32| (hue_to_rgb(t1, t2, h) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

fn hue_to_rgb(t1: f32, t2: f32, mut h: f32) -> f32 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        t1 + (t2 - t1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        t2
    } else if h * 3.0 < 2.0 {
        t1 + (t2 - t1) * (2.0 / 3.0 - h) * 6.0
    } else {
        t1
    }
}

/// `none`, `currentColor`, or a colour.
pub fn parse_color_specifier(val: &str) -> ValueResult<Paint> {
    match val {
        "none" => Ok(Paint::None),
        "currentColor" => Ok(Paint::CurrentColor),
        _ => parse_color(val).map(Paint::Color),
    }
}

/// `fill`/`stroke` paint: a colour specifier or `url(ref) fallback?`.
pub fn parse_paint(val: &str) -> ValueResult<Paint> {
    let Some(rest) = val.strip_prefix("url(") else {
        return parse_color_specifier(val);
    };
    let close = rest
        .find(')')
        .ok_or_else(|| ValueError::invalid("paint", val))?;
    let href = unquote(rest[..close].trim()).to_string();
    let tail = rest[close + 1..].trim();
    let fallback = if tail.is_empty() {
        None
    } else {
        Some(Box::new(parse_color_specifier(tail)?))
    };
    Ok(Paint::Reference { href, fallback })
}

fn unquote(s: &str) -> &str {
    let b = s.as_bytes();
    if b.len() >= 2 && (b[0] == b'"' || b[0] == b'\'') && b[b.len() - 1] == b[0] {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// `none` or `url(ref)` (clip-path, mask, marker properties).
pub fn parse_functional_iri(val: &str) -> ValueResult<Option<String>> {
    if val == "none" {
        return Ok(None);
    }
    match val.strip_prefix("url(").and_then(|v| v.strip_suffix(')')) {
        Some(inner) => Ok(Some(unquote(inner.trim()).to_string())),
        None => Err(ValueError::invalid("IRI", val)),
    }
}

// ─── Fonts ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

/// A font weight as written. Relative weights are resolved against the
/// inherited weight during the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    Absolute(u16),
    Bolder,
    Lighter,
}

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight::Absolute(400);
    pub const BOLD: FontWeight = FontWeight::Absolute(700);

    /// Resolve against the parent's numeric weight.
    pub fn resolve(self, parent: u16) -> u16 {
        match self {
            FontWeight::Absolute(w) => w,
            FontWeight::Bolder => match parent {
                0..=300 => 400,
                301..=500 => 700,
                _ => 900,
            },
            FontWeight::Lighter => match parent {
                0..=500 => 100,
                501..=700 => 400,
                _ => 700,
            },
        }
    }
}

pub fn parse_font_weight(val: &str) -> ValueResult<FontWeight> {
    let w = match val {
        "normal" => FontWeight::NORMAL,
        "bold" => FontWeight::BOLD,
        "bolder" => FontWeight::Bolder,
        "lighter" => FontWeight::Lighter,
        "100" | "200" | "300" | "400" | "500" | "600" | "700" | "800" | "900" => {
            FontWeight::Absolute(val.parse().map_err(|_| ValueError::invalid("font-weight", val))?)
        }
        _ => return Err(ValueError::invalid("font-weight", val)),
    };
    Ok(w)
}

pub fn parse_font_style(val: &str) -> ValueResult<FontStyle> {
    match val {
        "normal" => Ok(FontStyle::Normal),
        "italic" => Ok(FontStyle::Italic),
        "oblique" => Ok(FontStyle::Oblique),
        _ => Err(ValueError::invalid("font-style", val)),
    }
}

/// A size keyword or a length.
pub fn parse_font_size(val: &str) -> ValueResult<Length> {
    let size = match val {
        "xx-small" => Length::new(0.694, Unit::Pt),
        "x-small" => Length::new(0.833, Unit::Pt),
        "small" => Length::new(10.0, Unit::Pt),
        "medium" => Length::new(12.0, Unit::Pt),
        "large" => Length::new(14.4, Unit::Pt),
        "x-large" => Length::new(17.3, Unit::Pt),
        "xx-large" => Length::new(20.7, Unit::Pt),
        "smaller" => Length::new(83.33, Unit::Percent),
        "larger" => Length::new(120.0, Unit::Percent),
        _ => parse_length(val)?,
    };
    Ok(size)
}

/// Comma separated list of quoted or bare family names.
pub fn parse_font_family(val: &str) -> ValueResult<Vec<String>> {
    let mut s = TextScanner::new(val);
    let mut families = Vec::new();
    while !s.empty() {
        let name = match s.next_quoted_string() {
            Some(q) => q.to_string(),
            None => {
                let end = s.remaining().find(',').unwrap_or(s.remaining().len());
                let raw = &s.remaining()[..end];
                s.reset(s.position() + end);
                crate::scanner::trim(raw).to_string()
            }
        };
        if !name.is_empty() {
            families.push(name);
        }
        s.skip_comma_whitespace();
    }
    if families.is_empty() {
        return Err(ValueError::Empty { kind: "font-family" });
    }
    Ok(families)
}

/// Result of the `font` shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct FontShorthand {
    pub family: Vec<String>,
    pub size: Length,
    pub weight: FontWeight,
    pub style: FontStyle,
}

/// `[style || variant || weight]? size [/line-height]? family`.
///
/// System font names (`caption`, `menu`...) are accepted and ignored,
/// returning `Ok(None)`.
pub fn parse_font(val: &str) -> ValueResult<Option<FontShorthand>> {
    const SYSTEM_FONTS: &[&str] = &[
        "caption",
        "icon",
        "menu",
        "message-box",
        "small-caption",
        "status-bar",
    ];
    if SYSTEM_FONTS.contains(&val) {
        return Ok(None);
    }

    let mut s = TextScanner::new(val);
    let mut weight = None;
    let mut style = None;
    let mut variant = false;
    let size_token = loop {
        let item = s
            .next_token(b'/')
            .ok_or(ValueError::invalid("font", val))?;
        s.skip_whitespace();
        if weight.is_some() && style.is_some() {
            break item;
        }
        if item == "normal" {
            continue;
        }
        if weight.is_none() {
            if let Ok(w) = parse_font_weight(item) {
                weight = Some(w);
                continue;
            }
        }
        if style.is_none() {
            if let Ok(st) = parse_font_style(item) {
                style = Some(st);
                continue;
            }
        }
        if !variant && item == "small-caps" {
            variant = true;
            continue;
        }
        break item;
    };

    let size = parse_font_size(size_token)?;
    if s.consume(b'/') {
        s.skip_whitespace();
        let line_height = s
            .next_word()
            .ok_or(ValueError::invalid("font", val))?;
        // line-height is validated but has no effect
        parse_length(line_height)?;
        s.skip_whitespace();
    }
    let family = parse_font_family(s.rest_of_text().unwrap_or(""))?;

    Ok(Some(FontShorthand {
        family,
        size,
        weight: weight.unwrap_or(FontWeight::NORMAL),
        style: style.unwrap_or(FontStyle::Normal),
    }))
}

// ─── Strokes ─────────────────────────────────────────────────────────────

/// `none` or a list of non-negative lengths. A list summing to zero means
/// no dashing, so both cases return `Ok(None)`.
pub fn parse_dash_array(val: &str) -> ValueResult<Option<Vec<Length>>> {
    if val == "none" {
        return Ok(None);
    }
    let mut s = TextScanner::new(val);
    let mut dashes = Vec::new();
    let mut sum = 0.0;
    while !s.empty() {
        let dash = s
            .next_length()
            .ok_or_else(|| ValueError::invalid("stroke-dasharray", val))?;
        if dash.is_negative() {
            return Err(ValueError::negative("stroke-dasharray", val));
        }
        sum += dash.value;
        dashes.push(dash);
        s.skip_comma_whitespace();
    }
    if dashes.is_empty() || sum == 0.0 {
        return Ok(None);
    }
    Ok(Some(dashes))
}

/// CSS `clip: rect(top, right, bottom, left)`; `auto` sides become zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

pub fn parse_clip(val: &str) -> ValueResult<Option<ClipRect>> {
    if val == "auto" {
        return Ok(None);
    }
    let mut s = TextScanner::new(val);
    if !matches!(s.next_function(), Some(f) if f.eq_ignore_ascii_case("rect")) {
        return Err(ValueError::invalid("clip", val));
    }
    let mut sides = [Length::ZERO; 4];
    for (i, side) in sides.iter_mut().enumerate() {
        s.skip_whitespace();
        if i > 0 {
            s.skip_comma_whitespace();
        }
        *side = if s.consume_str("auto") {
            Length::ZERO
        } else {
            s.next_length()
                .ok_or_else(|| ValueError::invalid("clip", val))?
        };
    }
    s.skip_whitespace();
    if !s.consume(b')') {
        return Err(ValueError::invalid("clip", val));
    }
    let [top, right, bottom, left] = sides;
    Ok(Some(ClipRect {
        top,
        right,
        bottom,
        left,
    }))
}

// ─── Aspect ratio ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Align {
    None,
    XMinYMin,
    XMidYMin,
    XMaxYMin,
    XMinYMid,
    XMidYMid,
    XMaxYMid,
    XMinYMax,
    XMidYMax,
    XMaxYMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeetOrSlice {
    Meet,
    Slice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreserveAspectRatio {
    pub align: Align,
    pub scale: MeetOrSlice,
}

impl PreserveAspectRatio {
    /// Stretch to fill, ignoring the aspect ratio.
    pub const STRETCH: Self = Self::new(Align::None, MeetOrSlice::Meet);
    pub const LETTERBOX: Self = Self::new(Align::XMidYMid, MeetOrSlice::Meet);
    pub const START: Self = Self::new(Align::XMinYMin, MeetOrSlice::Meet);
    pub const END: Self = Self::new(Align::XMaxYMax, MeetOrSlice::Meet);
    pub const FULL_SCREEN: Self = Self::new(Align::XMidYMid, MeetOrSlice::Slice);

    pub const fn new(align: Align, scale: MeetOrSlice) -> Self {
        Self { align, scale }
    }
}

impl Default for PreserveAspectRatio {
    fn default() -> Self {
        Self::LETTERBOX
    }
}

/// `defer? <align> [meet | slice]?`
pub fn parse_preserve_aspect_ratio(val: &str) -> ValueResult<PreserveAspectRatio> {
    let mut s = TextScanner::new(val);
    let mut word = s.next_word();
    if word == Some("defer") {
        s.skip_whitespace();
        word = s.next_word();
    }
    let align = match word {
        Some("none") => Align::None,
        Some("xMinYMin") => Align::XMinYMin,
        Some("xMidYMin") => Align::XMidYMin,
        Some("xMaxYMin") => Align::XMaxYMin,
        Some("xMinYMid") => Align::XMinYMid,
        Some("xMidYMid") => Align::XMidYMid,
        Some("xMaxYMid") => Align::XMaxYMid,
        Some("xMinYMax") => Align::XMinYMax,
        Some("xMidYMax") => Align::XMidYMax,
        Some("xMaxYMax") => Align::XMaxYMax,
        _ => return Err(ValueError::invalid("preserveAspectRatio", val)),
    };
    s.skip_whitespace();
    let scale = match s.next_word() {
        None | Some("meet") => MeetOrSlice::Meet,
        Some("slice") => MeetOrSlice::Slice,
        Some(_) => return Err(ValueError::invalid("preserveAspectRatio", val)),
    };
    s.skip_whitespace();
    if !s.empty() {
        return Err(ValueError::invalid("preserveAspectRatio", val));
    }
    Ok(PreserveAspectRatio::new(align, scale))
}

// ─── Keyword properties ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextDecoration {
    None,
    Underline,
    Overline,
    LineThrough,
    Blink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorEffect {
    None,
    NonScalingStroke,
}

pub fn parse_fill_rule(val: &str) -> ValueResult<FillRule> {
    match val {
        "nonzero" => Ok(FillRule::NonZero),
        "evenodd" => Ok(FillRule::EvenOdd),
        _ => Err(ValueError::invalid("fill-rule", val)),
    }
}

pub fn parse_line_cap(val: &str) -> ValueResult<LineCap> {
    match val {
        "butt" => Ok(LineCap::Butt),
        "round" => Ok(LineCap::Round),
        "square" => Ok(LineCap::Square),
        _ => Err(ValueError::invalid("stroke-linecap", val)),
    }
}

pub fn parse_line_join(val: &str) -> ValueResult<LineJoin> {
    match val {
        "miter" => Ok(LineJoin::Miter),
        "round" => Ok(LineJoin::Round),
        "bevel" => Ok(LineJoin::Bevel),
        _ => Err(ValueError::invalid("stroke-linejoin", val)),
    }
}

pub fn parse_text_anchor(val: &str) -> ValueResult<TextAnchor> {
    match val {
        "start" => Ok(TextAnchor::Start),
        "middle" => Ok(TextAnchor::Middle),
        "end" => Ok(TextAnchor::End),
        _ => Err(ValueError::invalid("text-anchor", val)),
    }
}

pub fn parse_text_decoration(val: &str) -> ValueResult<TextDecoration> {
    match val {
        "none" => Ok(TextDecoration::None),
        "underline" => Ok(TextDecoration::Underline),
        "overline" => Ok(TextDecoration::Overline),
        "line-through" => Ok(TextDecoration::LineThrough),
        "blink" => Ok(TextDecoration::Blink),
        _ => Err(ValueError::invalid("text-decoration", val)),
    }
}

pub fn parse_direction(val: &str) -> ValueResult<Direction> {
    match val {
        "ltr" => Ok(Direction::Ltr),
        "rtl" => Ok(Direction::Rtl),
        _ => Err(ValueError::invalid("direction", val)),
    }
}

pub fn parse_vector_effect(val: &str) -> ValueResult<VectorEffect> {
    match val {
        "none" => Ok(VectorEffect::None),
        "non-scaling-stroke" => Ok(VectorEffect::NonScalingStroke),
        _ => Err(ValueError::invalid("vector-effect", val)),
    }
}

/// `overflow`: returns whether content is visible outside the viewport.
pub fn parse_overflow(val: &str) -> ValueResult<bool> {
    match val {
        "visible" | "auto" => Ok(true),
        "hidden" | "scroll" => Ok(false),
        _ => Err(ValueError::invalid("overflow", val)),
    }
}

/// `display`: returns whether the element is displayed.
pub fn parse_display(val: &str) -> ValueResult<bool> {
    const DISPLAY: &[&str] = &[
        "inline",
        "block",
        "list-item",
        "run-in",
        "compact",
        "marker",
        "table",
        "inline-table",
        "table-row-group",
        "table-header-group",
        "table-footer-group",
        "table-row",
        "table-column-group",
        "table-column",
        "table-cell",
        "table-caption",
    ];
    match val {
        "none" => Ok(false),
        v if DISPLAY.contains(&v) => Ok(true),
        _ => Err(ValueError::invalid("display", val)),
    }
}

/// `visibility`: returns whether the element is visible.
pub fn parse_visibility(val: &str) -> ValueResult<bool> {
    match val {
        "visible" => Ok(true),
        "hidden" | "collapse" => Ok(false),
        _ => Err(ValueError::invalid("visibility", val)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_with_units() {
        assert_eq!(parse_length("10").unwrap(), Length::px(10.0));
        assert_eq!(parse_length("2.5EM").unwrap(), Length::new(2.5, Unit::Em));
        assert_eq!(parse_length("50%").unwrap(), Length::new(50.0, Unit::Percent));
        assert!(parse_length("10furlongs").is_err());
        assert!(parse_length("").is_err());
        assert!(matches!(parse_positive_length("-1"), Err(ValueError::Negative { .. })));
    }

    #[test]
    fn formatted_lengths_parse_back() {
        for unit in [Unit::Px, Unit::Em, Unit::Ex, Unit::In, Unit::Cm, Unit::Mm, Unit::Pt, Unit::Pc, Unit::Percent] {
            let len = Length::new(3.25, unit);
            assert_eq!(parse_length(&len.to_string()).unwrap(), len);
        }
    }

    #[test]
    fn length_conversion() {
        let ctx = LengthContext {
            dpi: 96.0,
            font_size: 16.0,
            viewport: Bounds::new(0.0, 0.0, 300.0, 400.0),
        };
        assert_eq!(Length::new(1.0, Unit::In).to_px(&ctx), 96.0);
        assert_eq!(Length::new(72.0, Unit::Pt).to_px(&ctx), 96.0);
        assert_eq!(Length::new(2.0, Unit::Em).to_px(&ctx), 32.0);
        assert_eq!(Length::new(2.0, Unit::Ex).to_px(&ctx), 16.0);
        assert_eq!(Length::new(10.0, Unit::Percent).to_px_x(&ctx), 30.0);
        assert_eq!(Length::new(10.0, Unit::Percent).to_px_y(&ctx), 40.0);
        // sqrt(300² + 400²) / sqrt(2) = 500 / 1.41421
        let diag = Length::new(100.0, Unit::Percent).to_px(&ctx);
        assert!((diag - 353.553).abs() < 0.01, "{diag}");
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_color("#0f0").unwrap(), Color(0xff00ff00));
        assert_eq!(parse_color("#123456").unwrap(), Color(0xff123456));
        assert_eq!(parse_color("#f008").unwrap(), Color(0x88ff0000));
        assert_eq!(parse_color("#11223344").unwrap(), Color(0x44112233));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#ggg").is_err());
        assert_eq!(parse_color("#0f0").unwrap().to_string(), "#ff00ff00");
    }

    #[test]
    fn functional_colors() {
        assert_eq!(parse_color("rgb(255, 0, 10)").unwrap(), Color(0xffff000a));
        assert_eq!(parse_color("RGB(100%,50%,0%)").unwrap(), Color(0xffff8000));
        assert_eq!(parse_color("rgba(0,0,255,0.5)").unwrap(), Color(0x800000ff));
        assert_eq!(parse_color("rgb(300,-5,0)").unwrap(), Color(0xffff0000));
        assert_eq!(parse_color("hsl(0, 100%, 50%)").unwrap(), Color(0xffff0000));
        assert_eq!(parse_color("hsl(120,100%,25%)").unwrap(), Color(0xff008000));
        assert_eq!(parse_color("hsla(240,100%,50%,0)").unwrap(), Color(0x000000ff));
        assert!(parse_color("rgb(1,2)").is_err());
        assert!(parse_color("rgb(1,2,3").is_err());
    }

    #[test]
    fn named_colors() {
        assert_eq!(parse_color("Red").unwrap(), Color(0xffff0000));
        assert!(parse_color("reddish").is_err());
    }

    #[test]
    fn paints() {
        assert_eq!(parse_paint("none").unwrap(), Paint::None);
        assert_eq!(parse_paint("currentColor").unwrap(), Paint::CurrentColor);
        assert_eq!(
            parse_paint("url(#grad) red").unwrap(),
            Paint::Reference {
                href: "#grad".into(),
                fallback: Some(Box::new(Paint::Color(Color(0xffff0000)))),
            }
        );
        assert_eq!(
            parse_paint("url(#g)").unwrap(),
            Paint::Reference {
                href: "#g".into(),
                fallback: None
            }
        );
        assert!(parse_paint("url(#g").is_err());
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(parse_opacity("1.5").unwrap(), 1.0);
        assert_eq!(parse_opacity("-2").unwrap(), 0.0);
        assert!(parse_opacity("half").is_err());
        assert_eq!(parse_stop_offset("50%").unwrap(), 0.5);
        assert_eq!(parse_stop_offset("3").unwrap(), 1.0);
    }

    #[test]
    fn font_shorthand() {
        let f = parse_font("italic bold 12px/30px Georgia, 'Times New Roman', serif")
            .unwrap()
            .unwrap();
        assert_eq!(f.style, FontStyle::Italic);
        assert_eq!(f.weight, FontWeight::BOLD);
        assert_eq!(f.size, Length::px(12.0));
        assert_eq!(f.family, vec!["Georgia", "Times New Roman", "serif"]);

        let f = parse_font("normal small-caps large sans-serif").unwrap().unwrap();
        assert_eq!(f.size, Length::new(14.4, Unit::Pt));
        assert_eq!(f.weight, FontWeight::NORMAL);

        assert_eq!(parse_font("menu").unwrap(), None);
        assert!(parse_font("bold").is_err());
        assert!(parse_font("12px").is_err());
    }

    #[test]
    fn relative_font_weights() {
        assert_eq!(FontWeight::Bolder.resolve(400), 700);
        assert_eq!(FontWeight::Bolder.resolve(700), 900);
        assert_eq!(FontWeight::Lighter.resolve(400), 100);
        assert_eq!(FontWeight::Lighter.resolve(900), 700);
        assert!(parse_font_weight("450").is_err());
    }

    #[test]
    fn dash_arrays() {
        assert_eq!(parse_dash_array("none").unwrap(), None);
        assert_eq!(parse_dash_array("0 0").unwrap(), None);
        assert_eq!(
            parse_dash_array("5, 2 1%").unwrap(),
            Some(vec![Length::px(5.0), Length::px(2.0), Length::new(1.0, Unit::Percent)])
        );
        assert!(parse_dash_array("5 -1").is_err());
        assert!(parse_dash_array("5 x").is_err());
    }

    #[test]
    fn clip_rects() {
        assert_eq!(parse_clip("auto").unwrap(), None);
        let r = parse_clip("rect(1px, auto, 3px, 4px)").unwrap().unwrap();
        assert_eq!(r.right, Length::ZERO);
        assert_eq!(r.left, Length::px(4.0));
        assert!(parse_clip("circle(1px)").is_err());
    }

    #[test]
    fn view_box_and_aspect() {
        assert_eq!(parse_view_box("0 0 100,50").unwrap(), Bounds::new(0.0, 0.0, 100.0, 50.0));
        assert!(parse_view_box("0 0 100").is_err());
        assert!(parse_view_box("0 0 -1 5").is_err());

        assert_eq!(
            parse_preserve_aspect_ratio("defer xMinYMax slice").unwrap(),
            PreserveAspectRatio::new(Align::XMinYMax, MeetOrSlice::Slice)
        );
        assert_eq!(parse_preserve_aspect_ratio("none").unwrap(), PreserveAspectRatio::STRETCH);
        assert!(parse_preserve_aspect_ratio("xMidYMid stretch").is_err());
        assert!(parse_preserve_aspect_ratio("middle").is_err());
    }

    #[test]
    fn keyword_properties() {
        assert_eq!(parse_overflow("auto").unwrap(), true);
        assert_eq!(parse_overflow("scroll").unwrap(), false);
        assert_eq!(parse_display("table-cell").unwrap(), true);
        assert_eq!(parse_display("none").unwrap(), false);
        assert!(parse_display("flex").is_err());
        assert_eq!(parse_visibility("collapse").unwrap(), false);
        assert_eq!(parse_functional_iri("url(#clip)").unwrap(), Some("#clip".into()));
        assert_eq!(parse_functional_iri("none").unwrap(), None);
        assert!(parse_functional_iri("#clip").is_err());
    }

    #[test]
    fn bounds_union() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, -5.0, 10.0, 5.0);
        assert_eq!(a.union(&b), Bounds::new(0.0, -5.0, 15.0, 15.0));
    }
}
