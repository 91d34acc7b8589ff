use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use super::builtins;
use super::document::Attrs;

/// NodeRenderer
///
/// Turns one node into markup, given its attributes and the already-rendered
/// markup of its children. The returned string is emitted as-is, so an
/// implementation is responsible for escaping anything it interpolates.
///
/// Any `Fn(&Attrs, &str) -> String` closure is a renderer.
pub trait NodeRenderer: Send + Sync {
    fn render(&self, attrs: &Attrs, children: &str) -> String;
}

impl<F> NodeRenderer for F
where
    F: Fn(&Attrs, &str) -> String + Send + Sync,
{
    fn render(&self, attrs: &Attrs, children: &str) -> String {
        self(attrs, children)
    }
}

/// RendererRegistry
///
/// Mapping from node/mark type tag to its renderer. Registries are built up
/// front and only read during a render pass, so one registry can serve any
/// number of concurrent renders.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn NodeRenderer>>,
}

/// Built-in renderers, initialized once on first use.
static BUILTIN: LazyLock<RendererRegistry> = LazyLock::new(builtins::registry);

impl RendererRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The process-wide registry of built-in node and mark renderers.
    pub fn builtin() -> &'static RendererRegistry {
        &BUILTIN
    }

    /// Registers `renderer` for `tag`, replacing any previous entry.
    pub fn register<R>(&mut self, tag: impl Into<String>, renderer: R) -> &mut Self
    where
        R: NodeRenderer + 'static,
    {
        self.renderers.insert(tag.into(), Arc::new(renderer));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<R>(mut self, tag: impl Into<String>, renderer: R) -> Self
    where
        R: NodeRenderer + 'static,
    {
        self.register(tag, renderer);
        self
    }

    /// merged_with
    ///
    /// A new registry holding every entry of `self` plus every entry of
    /// `overrides`; for tags present in both, the override wins.
    pub fn merged_with(&self, overrides: &RendererRegistry) -> RendererRegistry {
        let mut renderers = self.renderers.clone();
        for (tag, renderer) in &overrides.renderers {
            renderers.insert(tag.clone(), Arc::clone(renderer));
        }
        RendererRegistry { renderers }
    }

    pub fn get(&self, tag: &str) -> Option<&dyn NodeRenderer> {
        self.renderers.get(tag).map(|renderer| renderer.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.renderers.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
