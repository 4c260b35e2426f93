pub mod attr;
pub mod builder;
pub mod cascade;
pub mod colors;
pub mod config;
pub mod css;
pub mod error;
pub mod id;
pub mod model;
pub mod number;
pub mod path;
pub mod scanner;
pub mod selector;
pub mod style;
pub mod transform;
pub mod values;
pub mod xml;

pub use attr::{Attr, Tag};
pub use cascade::StyleResolver;
pub use config::{Config, ExternalResolver, FontHandle, ImageHandle};
pub use css::{CssParser, Ruleset, Source};
pub use error::{ParseError, Result, ValueError};
pub use id::Atom;
pub use model::*;
pub use path::{PathProgram, PathSegment, PathSink, parse_path};
pub use style::{Specified, Style, default_style};
pub use transform::parse_transform;
pub use values::{Bounds, Color, Length, LengthContext, Paint, PreserveAspectRatio, Unit};
pub use xml::{parse_bytes, parse_reader, parse_str};

// Re-export petgraph and kurbo types so downstream crates don't need a direct dependency
pub use kurbo::Affine;
pub use petgraph::graph::NodeIndex;
