//! Element and attribute name dispatch.
//!
//! Names map to enums with a plain `match`; anything unrecognised becomes
//! `Unsupported` and is skipped by the builder.

/// SVG element names understood by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Svg,
    G,
    A,
    Defs,
    Use,
    Path,
    Rect,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
    Text,
    TSpan,
    TRef,
    TextPath,
    Switch,
    Symbol,
    Marker,
    LinearGradient,
    RadialGradient,
    Stop,
    ClipPath,
    Pattern,
    Image,
    View,
    Mask,
    Style,
    SolidColor,
    Title,
    Desc,
    Unsupported,
}

impl Tag {
    pub fn from_name(name: &str) -> Tag {
        match name {
            "svg" => Tag::Svg,
            "g" => Tag::G,
            "a" => Tag::A,
            "defs" => Tag::Defs,
            "use" => Tag::Use,
            "path" => Tag::Path,
            "rect" => Tag::Rect,
            "circle" => Tag::Circle,
            "ellipse" => Tag::Ellipse,
            "line" => Tag::Line,
            "polyline" => Tag::Polyline,
            "polygon" => Tag::Polygon,
            "text" => Tag::Text,
            "tspan" => Tag::TSpan,
            "tref" => Tag::TRef,
            "textPath" => Tag::TextPath,
            "switch" => Tag::Switch,
            "symbol" => Tag::Symbol,
            "marker" => Tag::Marker,
            "linearGradient" => Tag::LinearGradient,
            "radialGradient" => Tag::RadialGradient,
            "stop" => Tag::Stop,
            "clipPath" => Tag::ClipPath,
            "pattern" => Tag::Pattern,
            "image" => Tag::Image,
            "view" => Tag::View,
            "mask" => Tag::Mask,
            "style" => Tag::Style,
            "solidColor" => Tag::SolidColor,
            "title" => Tag::Title,
            "desc" => Tag::Desc,
            _ => Tag::Unsupported,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Svg => "svg",
            Tag::G => "g",
            Tag::A => "a",
            Tag::Defs => "defs",
            Tag::Use => "use",
            Tag::Path => "path",
            Tag::Rect => "rect",
            Tag::Circle => "circle",
            Tag::Ellipse => "ellipse",
            Tag::Line => "line",
            Tag::Polyline => "polyline",
            Tag::Polygon => "polygon",
            Tag::Text => "text",
            Tag::TSpan => "tspan",
            Tag::TRef => "tref",
            Tag::TextPath => "textPath",
            Tag::Switch => "switch",
            Tag::Symbol => "symbol",
            Tag::Marker => "marker",
            Tag::LinearGradient => "linearGradient",
            Tag::RadialGradient => "radialGradient",
            Tag::Stop => "stop",
            Tag::ClipPath => "clipPath",
            Tag::Pattern => "pattern",
            Tag::Image => "image",
            Tag::View => "view",
            Tag::Mask => "mask",
            Tag::Style => "style",
            Tag::SolidColor => "solidColor",
            Tag::Title => "title",
            Tag::Desc => "desc",
            Tag::Unsupported => "unsupported",
        }
    }
}

/// Attribute and style property names.
///
/// Presentation attributes and CSS properties share one namespace, so a
/// single enum serves both the attribute parser and declaration blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Class,
    Clip,
    ClipPath,
    ClipPathUnits,
    ClipRule,
    Color,
    Cx,
    Cy,
    D,
    Direction,
    Display,
    Dx,
    Dy,
    Fill,
    FillOpacity,
    FillRule,
    Font,
    FontFamily,
    FontSize,
    FontStyle,
    FontWeight,
    Fx,
    Fy,
    GradientTransform,
    GradientUnits,
    Height,
    Href,
    Id,
    Marker,
    MarkerEnd,
    MarkerHeight,
    MarkerMid,
    MarkerStart,
    MarkerUnits,
    MarkerWidth,
    Mask,
    MaskContentUnits,
    MaskUnits,
    Media,
    Offset,
    Opacity,
    Orient,
    Overflow,
    PathLength,
    PatternContentUnits,
    PatternTransform,
    PatternUnits,
    Points,
    PreserveAspectRatio,
    R,
    RefX,
    RefY,
    RequiredExtensions,
    RequiredFeatures,
    RequiredFonts,
    RequiredFormats,
    Rx,
    Ry,
    SolidColor,
    SolidOpacity,
    SpreadMethod,
    StartOffset,
    StopColor,
    StopOpacity,
    Stroke,
    StrokeDasharray,
    StrokeDashoffset,
    StrokeLinecap,
    StrokeLinejoin,
    StrokeMiterlimit,
    StrokeOpacity,
    StrokeWidth,
    Style,
    SystemLanguage,
    TextAnchor,
    TextDecoration,
    Transform,
    Type,
    VectorEffect,
    Version,
    ViewBox,
    ViewportFill,
    ViewportFillOpacity,
    Visibility,
    Width,
    X,
    X1,
    X2,
    Y,
    Y1,
    Y2,
    Unsupported,
}

impl Attr {
    pub fn from_name(name: &str) -> Attr {
        match name {
            "class" => Attr::Class,
            "clip" => Attr::Clip,
            "clip-path" => Attr::ClipPath,
            "clipPathUnits" => Attr::ClipPathUnits,
            "clip-rule" => Attr::ClipRule,
            "color" => Attr::Color,
            "cx" => Attr::Cx,
            "cy" => Attr::Cy,
            "d" => Attr::D,
            "direction" => Attr::Direction,
            "display" => Attr::Display,
            "dx" => Attr::Dx,
            "dy" => Attr::Dy,
            "fill" => Attr::Fill,
            "fill-opacity" => Attr::FillOpacity,
            "fill-rule" => Attr::FillRule,
            "font" => Attr::Font,
            "font-family" => Attr::FontFamily,
            "font-size" => Attr::FontSize,
            "font-style" => Attr::FontStyle,
            "font-weight" => Attr::FontWeight,
            "fx" => Attr::Fx,
            "fy" => Attr::Fy,
            "gradientTransform" => Attr::GradientTransform,
            "gradientUnits" => Attr::GradientUnits,
            "height" => Attr::Height,
            "href" => Attr::Href,
            "id" => Attr::Id,
            "marker" => Attr::Marker,
            "marker-end" => Attr::MarkerEnd,
            "markerHeight" => Attr::MarkerHeight,
            "marker-mid" => Attr::MarkerMid,
            "marker-start" => Attr::MarkerStart,
            "markerUnits" => Attr::MarkerUnits,
            "markerWidth" => Attr::MarkerWidth,
            "mask" => Attr::Mask,
            "maskContentUnits" => Attr::MaskContentUnits,
            "maskUnits" => Attr::MaskUnits,
            "media" => Attr::Media,
            "offset" => Attr::Offset,
            "opacity" => Attr::Opacity,
            "orient" => Attr::Orient,
            "overflow" => Attr::Overflow,
            "pathLength" => Attr::PathLength,
            "patternContentUnits" => Attr::PatternContentUnits,
            "patternTransform" => Attr::PatternTransform,
            "patternUnits" => Attr::PatternUnits,
            "points" => Attr::Points,
            "preserveAspectRatio" => Attr::PreserveAspectRatio,
            "r" => Attr::R,
            "refX" => Attr::RefX,
            "refY" => Attr::RefY,
            "requiredExtensions" => Attr::RequiredExtensions,
            "requiredFeatures" => Attr::RequiredFeatures,
            "requiredFonts" => Attr::RequiredFonts,
            "requiredFormats" => Attr::RequiredFormats,
            "rx" => Attr::Rx,
            "ry" => Attr::Ry,
            "solid-color" => Attr::SolidColor,
            "solid-opacity" => Attr::SolidOpacity,
            "spreadMethod" => Attr::SpreadMethod,
            "startOffset" => Attr::StartOffset,
            "stop-color" => Attr::StopColor,
            "stop-opacity" => Attr::StopOpacity,
            "stroke" => Attr::Stroke,
            "stroke-dasharray" => Attr::StrokeDasharray,
            "stroke-dashoffset" => Attr::StrokeDashoffset,
            "stroke-linecap" => Attr::StrokeLinecap,
            "stroke-linejoin" => Attr::StrokeLinejoin,
            "stroke-miterlimit" => Attr::StrokeMiterlimit,
            "stroke-opacity" => Attr::StrokeOpacity,
            "stroke-width" => Attr::StrokeWidth,
            "style" => Attr::Style,
            "systemLanguage" => Attr::SystemLanguage,
            "text-anchor" => Attr::TextAnchor,
            "text-decoration" => Attr::TextDecoration,
            "transform" => Attr::Transform,
            "type" => Attr::Type,
            "vector-effect" => Attr::VectorEffect,
            "version" => Attr::Version,
            "viewBox" => Attr::ViewBox,
            "viewport-fill" => Attr::ViewportFill,
            "viewport-fill-opacity" => Attr::ViewportFillOpacity,
            "visibility" => Attr::Visibility,
            "width" => Attr::Width,
            "x" => Attr::X,
            "x1" => Attr::X1,
            "x2" => Attr::X2,
            "y" => Attr::Y,
            "y1" => Attr::Y1,
            "y2" => Attr::Y2,
            _ => Attr::Unsupported,
        }
    }

    /// Attribute name as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Attr::Class => "class",
            Attr::Clip => "clip",
            Attr::ClipPath => "clip-path",
            Attr::ClipPathUnits => "clipPathUnits",
            Attr::ClipRule => "clip-rule",
            Attr::Color => "color",
            Attr::Cx => "cx",
            Attr::Cy => "cy",
            Attr::D => "d",
            Attr::Direction => "direction",
            Attr::Display => "display",
            Attr::Dx => "dx",
            Attr::Dy => "dy",
            Attr::Fill => "fill",
            Attr::FillOpacity => "fill-opacity",
            Attr::FillRule => "fill-rule",
            Attr::Font => "font",
            Attr::FontFamily => "font-family",
            Attr::FontSize => "font-size",
            Attr::FontStyle => "font-style",
            Attr::FontWeight => "font-weight",
            Attr::Fx => "fx",
            Attr::Fy => "fy",
            Attr::GradientTransform => "gradientTransform",
            Attr::GradientUnits => "gradientUnits",
            Attr::Height => "height",
            Attr::Href => "href",
            Attr::Id => "id",
            Attr::Marker => "marker",
            Attr::MarkerEnd => "marker-end",
            Attr::MarkerHeight => "markerHeight",
            Attr::MarkerMid => "marker-mid",
            Attr::MarkerStart => "marker-start",
            Attr::MarkerUnits => "markerUnits",
            Attr::MarkerWidth => "markerWidth",
            Attr::Mask => "mask",
            Attr::MaskContentUnits => "maskContentUnits",
            Attr::MaskUnits => "maskUnits",
            Attr::Media => "media",
            Attr::Offset => "offset",
            Attr::Opacity => "opacity",
            Attr::Orient => "orient",
            Attr::Overflow => "overflow",
            Attr::PathLength => "pathLength",
            Attr::PatternContentUnits => "patternContentUnits",
            Attr::PatternTransform => "patternTransform",
            Attr::PatternUnits => "patternUnits",
            Attr::Points => "points",
            Attr::PreserveAspectRatio => "preserveAspectRatio",
            Attr::R => "r",
            Attr::RefX => "refX",
            Attr::RefY => "refY",
            Attr::RequiredExtensions => "requiredExtensions",
            Attr::RequiredFeatures => "requiredFeatures",
            Attr::RequiredFonts => "requiredFonts",
            Attr::RequiredFormats => "requiredFormats",
            Attr::Rx => "rx",
            Attr::Ry => "ry",
            Attr::SolidColor => "solid-color",
            Attr::SolidOpacity => "solid-opacity",
            Attr::SpreadMethod => "spreadMethod",
            Attr::StartOffset => "startOffset",
            Attr::StopColor => "stop-color",
            Attr::StopOpacity => "stop-opacity",
            Attr::Stroke => "stroke",
            Attr::StrokeDasharray => "stroke-dasharray",
            Attr::StrokeDashoffset => "stroke-dashoffset",
            Attr::StrokeLinecap => "stroke-linecap",
            Attr::StrokeLinejoin => "stroke-linejoin",
            Attr::StrokeMiterlimit => "stroke-miterlimit",
            Attr::StrokeOpacity => "stroke-opacity",
            Attr::StrokeWidth => "stroke-width",
            Attr::Style => "style",
            Attr::SystemLanguage => "systemLanguage",
            Attr::TextAnchor => "text-anchor",
            Attr::TextDecoration => "text-decoration",
            Attr::Transform => "transform",
            Attr::Type => "type",
            Attr::VectorEffect => "vector-effect",
            Attr::Version => "version",
            Attr::ViewBox => "viewBox",
            Attr::ViewportFill => "viewport-fill",
            Attr::ViewportFillOpacity => "viewport-fill-opacity",
            Attr::Visibility => "visibility",
            Attr::Width => "width",
            Attr::X => "x",
            Attr::X1 => "x1",
            Attr::X2 => "x2",
            Attr::Y => "y",
            Attr::Y1 => "y1",
            Attr::Y2 => "y2",
            Attr::Unsupported => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_dispatch() {
        for tag in [Tag::LinearGradient, Tag::TextPath, Tag::SolidColor, Tag::G] {
            assert_eq!(Tag::from_name(tag.name()), tag);
        }
        for attr in [Attr::StrokeDasharray, Attr::ViewBox, Attr::Href, Attr::X2] {
            assert_eq!(Attr::from_name(attr.name()), attr);
        }
    }

    #[test]
    fn unknown_names_are_unsupported() {
        assert_eq!(Tag::from_name("foreignObject"), Tag::Unsupported);
        assert_eq!(Tag::from_name("SVG"), Tag::Unsupported);
        assert_eq!(Attr::from_name("onclick"), Attr::Unsupported);
    }
}
