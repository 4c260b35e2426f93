//! Per-call render settings.

use svx_core::{Bounds, PreserveAspectRatio};

/// Options for one render call. Nothing here is stored on the document,
/// so one document can be rendered with different options concurrently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Extra style sheet applied after the document's own rules.
    pub css: Option<String>,
    /// Overrides the root element's `preserveAspectRatio`.
    pub preserve_aspect_ratio: Option<PreserveAspectRatio>,
    /// Id of the element whose subtree is rendered instead of the whole
    /// document.
    pub target: Option<String>,
    /// Overrides the root element's `viewBox`.
    pub view_box: Option<Bounds>,
    /// Area of the surface to render into. Defaults to the document size.
    pub viewport: Option<Bounds>,
    /// Id of the element matched by the `:target` pseudo-class.
    pub target_element: Option<String>,
    /// Id of a `<view>` element supplying the viewBox and aspect ratio.
    pub view: Option<String>,
}

impl RenderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    #[must_use]
    pub fn preserve_aspect_ratio(mut self, aspect: PreserveAspectRatio) -> Self {
        self.preserve_aspect_ratio = Some(aspect);
        self
    }

    #[must_use]
    pub fn target(mut self, id: impl Into<String>) -> Self {
        self.target = Some(id.into());
        self
    }

    #[must_use]
    pub fn view_box(mut self, min_x: f32, min_y: f32, width: f32, height: f32) -> Self {
        self.view_box = Some(Bounds::new(min_x, min_y, width, height));
        self
    }

    #[must_use]
    pub fn viewport(mut self, min_x: f32, min_y: f32, width: f32, height: f32) -> Self {
        self.viewport = Some(Bounds::new(min_x, min_y, width, height));
        self
    }

    #[must_use]
    pub fn target_element(mut self, id: impl Into<String>) -> Self {
        self.target_element = Some(id.into());
        self
    }

    #[must_use]
    pub fn view(mut self, id: impl Into<String>) -> Self {
        self.view = Some(id.into());
        self
    }

    pub fn has_css(&self) -> bool {
        self.css.as_deref().is_some_and(|css| !css.trim().is_empty())
    }

    pub fn has_preserve_aspect_ratio(&self) -> bool {
        self.preserve_aspect_ratio.is_some()
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn has_view_box(&self) -> bool {
        self.view_box.is_some()
    }

    pub fn has_viewport(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn has_target_element(&self) -> bool {
        self.target_element.is_some()
    }

    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_and_reports() {
        let opts = RenderOptions::new()
            .css("rect { fill: red }")
            .view_box(0.0, 0.0, 10.0, 10.0)
            .target_element("a");
        assert!(opts.has_css());
        assert!(opts.has_view_box());
        assert!(opts.has_target_element());
        assert!(!opts.has_viewport());
        assert!(!opts.has_view());
        assert!(!opts.has_target());
        assert!(!opts.has_preserve_aspect_ratio());
        assert_eq!(opts.view_box, Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn blank_css_is_not_css() {
        assert!(!RenderOptions::new().css("  ").has_css());
    }
}
