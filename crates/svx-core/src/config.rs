//! Parse/render configuration and the pluggable resolver for external
//! resources (fonts, images, stylesheets).
//!
//! Nothing here is global: every parse and render call receives its own
//! [`Config`], so documents with different settings never interfere.

use std::fmt;
use std::sync::Arc;

use crate::values::FontStyle;

/// Opaque font handle returned by a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontHandle {
    pub id: u64,
    pub family: String,
}

/// Opaque image handle returned by a resolver, carrying its intrinsic size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    pub id: u64,
    pub width: f32,
    pub height: f32,
}

/// Resolves resources that live outside the document.
///
/// Every method returns an absence value when the resource is not
/// available; implementations must not panic.
pub trait ExternalResolver: Send + Sync {
    fn resolve_font(&self, _family: &str, _weight: u16, _style: FontStyle) -> Option<FontHandle> {
        None
    }

    fn resolve_image(&self, _uri: &str) -> Option<ImageHandle> {
        None
    }

    fn resolve_stylesheet(&self, _uri: &str) -> Option<String> {
        None
    }

    fn is_format_supported(&self, _mime_type: &str) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct Config {
    pub resolver: Option<Arc<dyn ExternalResolver>>,
    /// Honour `<!ENTITY>` declarations from the internal DTD subset.
    pub expand_entities: bool,
    pub dpi: f32,
    /// Primary language tag matched by `systemLanguage`.
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolver: None,
            expand_entities: true,
            dpi: 96.0,
            language: "en".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("resolver", &self.resolver.as_ref().map(|_| "<dyn ExternalResolver>"))
            .field("expand_entities", &self.expand_entities)
            .field("dpi", &self.dpi)
            .field("language", &self.language)
            .finish()
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ExternalResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_expand_entities(mut self, expand: bool) -> Self {
        self.expand_entities = expand;
        self
    }

    #[must_use]
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn resolver(&self) -> Option<&dyn ExternalResolver> {
        self.resolver.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sheets;

    impl ExternalResolver for Sheets {
        fn resolve_stylesheet(&self, uri: &str) -> Option<String> {
            (uri == "a.css").then(|| "rect { fill: red }".to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.resolver().is_none());
        assert!(config.expand_entities);
        assert_eq!(config.dpi, 96.0);
        assert_eq!(config.language, "en");
    }

    #[test]
    fn builder_and_resolver_defaults() {
        let config = Config::new()
            .with_dpi(72.0)
            .with_language("fr")
            .with_resolver(Arc::new(Sheets));
        let resolver = config.resolver().unwrap();
        assert_eq!(config.dpi, 72.0);
        assert!(resolver.resolve_stylesheet("a.css").is_some());
        assert!(resolver.resolve_stylesheet("b.css").is_none());
        assert!(resolver.resolve_image("x.png").is_none());
        assert!(!resolver.is_format_supported("image/png"));
    }
}
