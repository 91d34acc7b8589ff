use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::RenderError;

/// Attribute map carried by nodes and marks.
pub type Attrs = Map<String, Value>;

/// Node
///
/// One node of a stored rich document, in the shape the editor serializes:
/// a `type` tag, an attribute map, child nodes and, for text leaves, the
/// text itself plus its inline marks.
///
/// The renderer only ever reads a `Node`; nothing in this crate mutates a
/// parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub attrs: Attrs,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

/// Mark
///
/// Inline formatting applied to a text node (bold, link, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub attrs: Attrs,
}

/// The editor writes `"attrs": null` for nodes without attributes.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Tags that only style their content; they do not separate words.
const INLINE_KINDS: &[&str] = &[
    "bold", "strong", "italic", "em", "underline", "strike", "code", "link",
];

pub const TEXT_KIND: &str = "text";

/// Built-in tags that render without their children.
const VOID_KINDS: &[&str] = &["horizontalRule", "hardBreak", "image", "rawHtml"];

impl Node {
    /// parse
    ///
    /// Deserializes a stored document body. Anything that is not a well-formed
    /// node tree is a `MalformedDocument`; there is no partial recovery.
    pub fn parse(input: &str) -> Result<Node, RenderError> {
        if input.trim().is_empty() {
            return Err(RenderError::MalformedDocument("empty document".to_string()));
        }

        let root: Node = serde_json::from_str(input)
            .map_err(|e| RenderError::MalformedDocument(e.to_string()))?;
        root.check_shape()?;
        Ok(root)
    }

    /// A text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TEXT_KIND.to_string(),
            attrs: Attrs::new(),
            content: Vec::new(),
            text: Some(text.into()),
            marks: Vec::new(),
        }
    }

    /// A container node with children.
    pub fn element(kind: impl Into<String>, content: Vec<Node>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
            content,
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_mark(mut self, kind: impl Into<String>) -> Self {
        self.marks.push(Mark {
            kind: kind.into(),
            attrs: Attrs::new(),
        });
        self
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT_KIND
    }

    /// Text leaves must carry text and nothing else; other nodes must not.
    /// Void tags take no children, and `rawHtml` must carry its `html`.
    fn check_shape(&self) -> Result<(), RenderError> {
        if self.is_text() {
            if self.text.is_none() {
                return Err(RenderError::MalformedDocument(
                    "text node without text".to_string(),
                ));
            }
            if !self.content.is_empty() {
                return Err(RenderError::MalformedDocument(
                    "text node with children".to_string(),
                ));
            }
            return Ok(());
        }

        if self.text.is_some() {
            return Err(RenderError::MalformedDocument(format!(
                "`{}` node carries text",
                self.kind
            )));
        }

        if VOID_KINDS.contains(&self.kind.as_str()) && !self.content.is_empty() {
            return Err(RenderError::MalformedDocument(format!(
                "`{}` node cannot have children",
                self.kind
            )));
        }

        if self.kind == "rawHtml" && !self.attrs.get("html").is_some_and(Value::is_string) {
            return Err(RenderError::MalformedDocument(
                "`rawHtml` node without an `html` string".to_string(),
            ));
        }

        self.content.iter().try_for_each(Node::check_shape)
    }

    /// plain_text
    ///
    /// Concatenated text content, with block boundaries turned into spaces.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
            return;
        }
        for child in &self.content {
            child.collect_text(out);
        }
        if !INLINE_KINDS.contains(&self.kind.as_str()) {
            out.push(' ');
        }
    }
}

const WORDS_PER_MINUTE: usize = 200;

/// reading_time_minutes
///
/// Estimated reading time at 200 words per minute, never less than one.
pub fn reading_time_minutes(document: &Node) -> u32 {
    let words = document.plain_text().split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// excerpt
///
/// The first `max_chars` characters of the document's text, whitespace
/// collapsed, with an ellipsis when truncated.
pub fn excerpt(document: &Node, max_chars: usize) -> String {
    let collapsed = document
        .plain_text()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
