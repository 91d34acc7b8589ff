//! Renderers for the standard editor node and mark types.

use serde_json::Value;

use super::document::Attrs;
use super::escape::{escape_text, safe_url};
use super::registry::RendererRegistry;

pub(crate) fn registry() -> RendererRegistry {
    RendererRegistry::empty()
        // Block nodes
        .with("doc", doc)
        .with("paragraph", paragraph)
        .with("heading", heading)
        .with("bulletList", bullet_list)
        .with("orderedList", ordered_list)
        .with("listItem", list_item)
        .with("blockquote", blockquote)
        .with("codeBlock", code_block)
        .with("horizontalRule", horizontal_rule)
        .with("hardBreak", hard_break)
        .with("image", image)
        .with("rawHtml", raw_html)
        // Marks, also accepted as inline container nodes
        .with("bold", strong)
        .with("strong", strong)
        .with("italic", emphasis)
        .with("em", emphasis)
        .with("underline", underline)
        .with("strike", strike)
        .with("code", inline_code)
        .with("link", link)
}

fn attr_str<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    attrs.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn attr_u64(attrs: &Attrs, key: &str) -> Option<u64> {
    attrs.get(key).and_then(|value| match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn doc(_: &Attrs, children: &str) -> String {
    children.to_string()
}

fn paragraph(_: &Attrs, children: &str) -> String {
    format!("<p>{children}</p>")
}

fn heading(attrs: &Attrs, children: &str) -> String {
    let level = attr_u64(attrs, "level").unwrap_or(1).clamp(1, 6);
    format!("<h{level}>{children}</h{level}>")
}

fn bullet_list(_: &Attrs, children: &str) -> String {
    format!("<ul>{children}</ul>")
}

fn ordered_list(attrs: &Attrs, children: &str) -> String {
    match attr_u64(attrs, "start") {
        Some(start) if start != 1 => format!("<ol start=\"{start}\">{children}</ol>"),
        _ => format!("<ol>{children}</ol>"),
    }
}

fn list_item(_: &Attrs, children: &str) -> String {
    format!("<li>{children}</li>")
}

fn blockquote(_: &Attrs, children: &str) -> String {
    format!("<blockquote>{children}</blockquote>")
}

fn code_block(attrs: &Attrs, children: &str) -> String {
    match attr_str(attrs, "language") {
        Some(language) => format!(
            "<pre><code class=\"language-{}\">{children}</code></pre>",
            escape_text(language)
        ),
        None => format!("<pre><code>{children}</code></pre>"),
    }
}

fn horizontal_rule(_: &Attrs, _: &str) -> String {
    "<hr>".to_string()
}

fn hard_break(_: &Attrs, _: &str) -> String {
    "<br>".to_string()
}

fn image(attrs: &Attrs, _: &str) -> String {
    let mut tag = String::from("<img");
    if let Some(src) = attr_str(attrs, "src").and_then(safe_url) {
        tag.push_str(&format!(" src=\"{}\"", escape_text(src)));
    }
    // alt is always present, empty when the author gave none
    tag.push_str(&format!(
        " alt=\"{}\"",
        escape_text(attr_str(attrs, "alt").unwrap_or_default())
    ));
    if let Some(title) = attr_str(attrs, "title") {
        tag.push_str(&format!(" title=\"{}\"", escape_text(title)));
    }
    tag.push('>');
    tag
}

/// Pre-sanitized markup stored by the editor's embed tools. Emitted verbatim.
fn raw_html(attrs: &Attrs, _: &str) -> String {
    attr_str(attrs, "html").unwrap_or_default().to_string()
}

fn strong(_: &Attrs, children: &str) -> String {
    format!("<strong>{children}</strong>")
}

fn emphasis(_: &Attrs, children: &str) -> String {
    format!("<em>{children}</em>")
}

fn underline(_: &Attrs, children: &str) -> String {
    format!("<u>{children}</u>")
}

fn strike(_: &Attrs, children: &str) -> String {
    format!("<s>{children}</s>")
}

fn inline_code(_: &Attrs, children: &str) -> String {
    format!("<code>{children}</code>")
}

fn link(attrs: &Attrs, children: &str) -> String {
    let mut tag = String::from("<a");
    if let Some(href) = attr_str(attrs, "href").and_then(safe_url) {
        tag.push_str(&format!(" href=\"{}\"", escape_text(href)));
    }
    if attr_str(attrs, "target") == Some("_blank") {
        tag.push_str(" target=\"_blank\" rel=\"noopener noreferrer nofollow\"");
    }
    tag.push('>');
    format!("{tag}{children}</a>")
}
