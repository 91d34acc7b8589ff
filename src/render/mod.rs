//! Rich content rendering.
//!
//! Converts a stored editor document (a JSON node tree) into HTML for the
//! public blog pages. Every node type maps to a [`NodeRenderer`] looked up in
//! a [`RendererRegistry`]; callers extend or override the built-in set by
//! merging their own entries. A render is pure: it reads the document and
//! the registry and returns a string or an error, nothing else.

mod builtins;
pub mod document;
mod error;
pub mod escape;
mod registry;

pub use document::{Attrs, Mark, Node, excerpt, reading_time_minutes};
pub use error::RenderError;
pub use escape::{escape_text, safe_url};
pub use registry::{NodeRenderer, RendererRegistry};

/// ContentRenderer
///
/// Holds the effective registry (built-ins merged with any custom entries)
/// and walks documents against it. Built once at startup and shared through
/// `AppState`; it has no interior mutability.
#[derive(Debug, Clone)]
pub struct ContentRenderer {
    registry: RendererRegistry,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer {
    /// A renderer using only the built-in node types.
    pub fn new() -> Self {
        Self {
            registry: RendererRegistry::builtin().clone(),
        }
    }

    /// with_custom
    ///
    /// Built-ins extended by `custom`. Custom entries take precedence for tags
    /// that are also built in.
    pub fn with_custom(custom: &RendererRegistry) -> Self {
        Self {
            registry: RendererRegistry::builtin().merged_with(custom),
        }
    }

    /// Adds or replaces a single renderer.
    pub fn with_renderer<R>(mut self, tag: impl Into<String>, renderer: R) -> Self
    where
        R: NodeRenderer + 'static,
    {
        self.registry.register(tag, renderer);
        self
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// render
    ///
    /// Parses `input` and renders the whole tree. Fails with
    /// `MalformedDocument` when the input is not a node tree, and with
    /// `UnknownNodeType` when any node or mark lacks a renderer.
    pub fn render(&self, input: &str) -> Result<String, RenderError> {
        let document = Node::parse(input)?;
        self.render_node(&document)
    }

    /// validate
    ///
    /// Checks that `input` would render, returning the parsed document.
    /// Used on write paths so broken bodies are rejected before they are
    /// stored.
    pub fn validate(&self, input: &str) -> Result<Node, RenderError> {
        let document = Node::parse(input)?;
        self.render_node(&document)?;
        Ok(document)
    }

    /// render_node
    ///
    /// Depth-first walk: children are rendered first, in document order, and
    /// their joined markup is handed to the node's renderer.
    pub fn render_node(&self, node: &Node) -> Result<String, RenderError> {
        if node.is_text() {
            return self.render_text(node);
        }

        let renderer = self
            .registry
            .get(&node.kind)
            .ok_or_else(|| RenderError::UnknownNodeType(node.kind.clone()))?;

        let mut children = String::new();
        for child in &node.content {
            children.push_str(&self.render_node(child)?);
        }

        Ok(renderer.render(&node.attrs, &children))
    }

    /// Escaped text wrapped in its marks. The first mark is the outermost.
    fn render_text(&self, node: &Node) -> Result<String, RenderError> {
        let mut html = escape_text(node.text.as_deref().unwrap_or_default());

        for mark in node.marks.iter().rev() {
            let renderer = self
                .registry
                .get(&mark.kind)
                .ok_or_else(|| RenderError::UnknownNodeType(mark.kind.clone()))?;
            html = renderer.render(&mark.attrs, &html);
        }

        Ok(html)
    }
}

/// render_html
///
/// One-shot form: renders `input` with the built-ins overridden by `custom`.
pub fn render_html(input: &str, custom: &RendererRegistry) -> Result<String, RenderError> {
    ContentRenderer::with_custom(custom).render(input)
}
