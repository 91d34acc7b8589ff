use marketing_site::render::{
    Attrs, ContentRenderer, Node, RenderError, RendererRegistry, escape_text, excerpt,
    reading_time_minutes, render_html, safe_url,
};
use serde_json::json;
use std::sync::Arc;

fn render(document: serde_json::Value) -> Result<String, RenderError> {
    ContentRenderer::new().render(&document.to_string())
}

fn doc(content: serde_json::Value) -> serde_json::Value {
    json!({ "type": "doc", "content": content })
}

fn callout(attrs: &Attrs, children: &str) -> String {
    let tone = attrs.get("tone").and_then(|v| v.as_str()).unwrap_or("info");
    format!("<aside class=\"callout callout-{}\">{children}</aside>", escape_text(tone))
}

#[test]
fn single_paragraph_renders_exactly() {
    let input = doc(json!([{ "type": "paragraph", "content": [{ "type": "text", "text": "Hello" }] }]));
    assert_eq!(render(input).unwrap(), "<p>Hello</p>");
}

#[test]
fn rendering_is_deterministic() {
    let renderer = ContentRenderer::new();
    let input = doc(json!([
        { "type": "heading", "attrs": { "level": 2 }, "content": [{ "type": "text", "text": "Title" }] },
        { "type": "paragraph", "content": [
            { "type": "text", "text": "a " },
            { "type": "text", "text": "b", "marks": [{ "type": "bold" }] }
        ]}
    ]))
    .to_string();

    let first = renderer.render(&input).unwrap();
    for _ in 0..10 {
        assert_eq!(renderer.render(&input).unwrap(), first);
    }
}

#[test]
fn text_is_escaped() {
    let input = doc(json!([{ "type": "paragraph", "content": [
        { "type": "text", "text": "<script>alert('x')</script> & \"more\"" }
    ]}]));
    let html = render(input).unwrap();
    assert!(!html.contains("<script>"));
    assert_eq!(
        html,
        "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;more&quot;</p>"
    );
}

#[test]
fn custom_renderer_handles_its_type_and_builtins_still_apply() {
    let custom = RendererRegistry::empty().with("callout", callout);
    let input = doc(json!([
        { "type": "callout", "attrs": { "tone": "warning" }, "content": [
            { "type": "paragraph", "content": [{ "type": "text", "text": "Careful" }] }
        ]},
        { "type": "paragraph", "content": [{ "type": "text", "text": "After" }] }
    ]))
    .to_string();

    assert!(matches!(
        ContentRenderer::new().render(&input),
        Err(RenderError::UnknownNodeType(kind)) if kind == "callout"
    ));

    let html = render_html(&input, &custom).unwrap();
    assert_eq!(
        html,
        "<aside class=\"callout callout-warning\"><p>Careful</p></aside><p>After</p>"
    );
}

#[test]
fn custom_renderer_overrides_a_builtin() {
    let renderer = ContentRenderer::new()
        .with_renderer("paragraph", |_: &Attrs, children: &str| format!("<p class=\"lead\">{children}</p>"));
    let html = renderer
        .render(&doc(json!([{ "type": "paragraph", "content": [{ "type": "text", "text": "Hi" }] }])).to_string())
        .unwrap();
    assert_eq!(html, "<p class=\"lead\">Hi</p>");

    // The shared built-in set is untouched.
    assert_eq!(
        ContentRenderer::new()
            .render(&doc(json!([{ "type": "paragraph", "content": [{ "type": "text", "text": "Hi" }] }])).to_string())
            .unwrap(),
        "<p>Hi</p>"
    );
}

#[test]
fn unknown_node_type_fails_the_whole_render() {
    let input = doc(json!([
        { "type": "paragraph", "content": [{ "type": "text", "text": "fine" }] },
        { "type": "blockquote", "content": [{ "type": "mystery", "content": [] }] }
    ]));
    assert_eq!(
        render(input),
        Err(RenderError::UnknownNodeType("mystery".to_string()))
    );
}

#[test]
fn unknown_mark_fails_the_whole_render() {
    let input = doc(json!([{ "type": "paragraph", "content": [
        { "type": "text", "text": "x", "marks": [{ "type": "sparkle" }] }
    ]}]));
    assert_eq!(render(input), Err(RenderError::UnknownNodeType("sparkle".to_string())));
}

#[test]
fn malformed_input_is_rejected() {
    let renderer = ContentRenderer::new();
    for input in [
        "",
        "   ",
        "not json",
        "[1, 2, 3]",
        r#"{"content": []}"#,
        r#"{"type": "text"}"#,
        r#"{"type": "paragraph", "text": "stray"}"#,
        r#"{"type": "text", "text": "x", "content": [{"type": "text", "text": "y"}]}"#,
    ] {
        assert!(
            matches!(renderer.render(input), Err(RenderError::MalformedDocument(_))),
            "accepted {input:?}"
        );
    }
}

#[test]
fn null_attrs_and_content_are_accepted() {
    let input = r#"{"type":"doc","attrs":null,"content":[{"type":"paragraph","attrs":null,"content":null}]}"#;
    assert_eq!(ContentRenderer::new().render(input).unwrap(), "<p></p>");
}

#[test]
fn marks_nest_first_outermost() {
    let input = doc(json!([{ "type": "paragraph", "content": [
        { "type": "text", "text": "x", "marks": [{ "type": "bold" }, { "type": "italic" }] }
    ]}]));
    assert_eq!(render(input).unwrap(), "<p><strong><em>x</em></strong></p>");
}

#[test]
fn links_are_sanitized() {
    let link = |href: &str, target: Option<&str>| {
        let mut attrs = json!({ "href": href });
        if let Some(target) = target {
            attrs["target"] = json!(target);
        }
        doc(json!([{ "type": "paragraph", "content": [
            { "type": "text", "text": "go", "marks": [{ "type": "link", "attrs": attrs }] }
        ]}]))
    };

    assert_eq!(
        render(link("https://example.com/?a=1&b=2", None)).unwrap(),
        "<p><a href=\"https://example.com/?a=1&amp;b=2\">go</a></p>"
    );
    assert_eq!(
        render(link("/blog/post", Some("_blank"))).unwrap(),
        "<p><a href=\"/blog/post\" target=\"_blank\" rel=\"noopener noreferrer nofollow\">go</a></p>"
    );
    assert_eq!(render(link("javascript:alert(1)", None)).unwrap(), "<p><a>go</a></p>");
    assert_eq!(render(link(" JaVa\tScript:alert(1)", None)).unwrap(), "<p><a>go</a></p>");
}

#[test]
fn safe_url_allow_list() {
    assert_eq!(safe_url("https://a.b"), Some("https://a.b"));
    assert_eq!(safe_url("mailto:hi@a.b"), Some("mailto:hi@a.b"));
    assert_eq!(safe_url("tel:+3531234"), Some("tel:+3531234"));
    assert_eq!(safe_url("images/a.png"), Some("images/a.png"));
    assert_eq!(safe_url("/a:b"), Some("/a:b"));
    assert_eq!(safe_url("#top"), Some("#top"));
    assert_eq!(safe_url("data:text/html,x"), None);
    assert_eq!(safe_url("vbscript:x"), None);
    assert_eq!(safe_url("  "), None);
}

#[test]
fn block_nodes() {
    let input = doc(json!([
        { "type": "heading", "attrs": { "level": 9 }, "content": [{ "type": "text", "text": "H" }] },
        { "type": "heading", "content": [{ "type": "text", "text": "D" }] },
        { "type": "bulletList", "content": [
            { "type": "listItem", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "one" }] }] }
        ]},
        { "type": "orderedList", "attrs": { "start": 3 }, "content": [
            { "type": "listItem", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "three" }] }] }
        ]},
        { "type": "orderedList", "attrs": { "start": 1 }, "content": [] },
        { "type": "blockquote", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "q" }] }] },
        { "type": "codeBlock", "attrs": { "language": "rust" }, "content": [{ "type": "text", "text": "fn a() -> i32 { 1 < 2 }" }] },
        { "type": "horizontalRule" },
        { "type": "paragraph", "content": [
            { "type": "text", "text": "a" }, { "type": "hardBreak" }, { "type": "text", "text": "b" }
        ]}
    ]));

    assert_eq!(
        render(input).unwrap(),
        concat!(
            "<h6>H</h6>",
            "<h1>D</h1>",
            "<ul><li><p>one</p></li></ul>",
            "<ol start=\"3\"><li><p>three</p></li></ol>",
            "<ol></ol>",
            "<blockquote><p>q</p></blockquote>",
            "<pre><code class=\"language-rust\">fn a() -&gt; i32 { 1 &lt; 2 }</code></pre>",
            "<hr>",
            "<p>a<br>b</p>",
        )
    );
}

#[test]
fn images_drop_unsafe_sources() {
    let input = doc(json!([
        { "type": "image", "attrs": { "src": "https://cdn.example.com/a.png", "alt": "A \"quoted\" alt", "title": "T" } },
        { "type": "image", "attrs": { "src": "javascript:alert(1)" } }
    ]));
    assert_eq!(
        render(input).unwrap(),
        "<img src=\"https://cdn.example.com/a.png\" alt=\"A &quot;quoted&quot; alt\" title=\"T\"><img alt=\"\">"
    );
}

#[test]
fn raw_html_is_emitted_verbatim() {
    let input = doc(json!([{ "type": "rawHtml", "attrs": { "html": "<iframe src=\"https://player.example\"></iframe>" } }]));
    assert_eq!(
        render(input).unwrap(),
        "<iframe src=\"https://player.example\"></iframe>"
    );
}

#[test]
fn void_tags_reject_children() {
    for tag in ["horizontalRule", "hardBreak", "image"] {
        let input = doc(json!([{ "type": tag, "content": [{ "type": "text", "text": "lost" }] }]));
        assert!(
            matches!(render(input), Err(RenderError::MalformedDocument(_))),
            "{tag}"
        );
    }

    let input = doc(json!([{
        "type": "rawHtml",
        "attrs": { "html": "<hr>" },
        "content": [{ "type": "text", "text": "lost" }]
    }]));
    assert!(matches!(render(input), Err(RenderError::MalformedDocument(_))));
}

#[test]
fn raw_html_requires_its_markup() {
    for node in [
        json!({ "type": "rawHtml" }),
        json!({ "type": "rawHtml", "attrs": { "html": 42 } }),
    ] {
        let result = render(doc(json!([node])));
        assert!(matches!(result, Err(RenderError::MalformedDocument(_))));
    }
}

#[test]
fn validate_returns_the_parsed_document() {
    let renderer = ContentRenderer::new();
    let input = doc(json!([{ "type": "paragraph", "content": [{ "type": "text", "text": "ok" }] }])).to_string();
    let document = renderer.validate(&input).unwrap();
    assert_eq!(document.kind, "doc");
    assert_eq!(document.content.len(), 1);

    assert!(renderer.validate(r#"{"type":"doc","content":[{"type":"gallery"}]}"#).is_err());
}

#[test]
fn builder_documents_render_like_parsed_ones() {
    let document = Node::element(
        "doc",
        vec![Node::element(
            "heading",
            vec![Node::text("Built").with_mark("italic")],
        )
        .with_attr("level", 3)],
    );
    assert_eq!(
        ContentRenderer::new().render_node(&document).unwrap(),
        "<h3><em>Built</em></h3>"
    );
}

#[test]
fn reading_time_and_excerpt() {
    let short = Node::element("doc", vec![Node::element("paragraph", vec![Node::text("just a few words")])]);
    assert_eq!(reading_time_minutes(&short), 1);
    assert_eq!(excerpt(&short, 160), "just a few words");

    let long_text = vec!["word"; 401].join(" ");
    let long = Node::element("doc", vec![Node::element("paragraph", vec![Node::text(long_text)])]);
    assert_eq!(reading_time_minutes(&long), 3);

    let cut = excerpt(&long, 12);
    assert_eq!(cut, "word word wo…");

    // Block boundaries separate words.
    let two = Node::element(
        "doc",
        vec![
            Node::element("paragraph", vec![Node::text("end")]),
            Node::element("paragraph", vec![Node::text("start")]),
        ],
    );
    assert_eq!(excerpt(&two, 160), "end start");
}

#[test]
fn registry_reports_builtin_tags() {
    let builtin = RendererRegistry::builtin();
    for tag in ["doc", "paragraph", "heading", "image", "link", "bold", "rawHtml"] {
        assert!(builtin.contains(tag), "{tag}");
    }
    assert!(!builtin.contains("callout"));

    let merged = builtin.merged_with(&RendererRegistry::empty().with("callout", callout));
    assert_eq!(merged.len(), builtin.len() + 1);
    assert!(merged.tags().contains(&"callout"));
}

#[tokio::test]
async fn concurrent_renders_share_one_renderer() {
    let renderer = Arc::new(ContentRenderer::new());
    let mut handles = Vec::new();
    for i in 0..16 {
        let renderer = renderer.clone();
        handles.push(tokio::spawn(async move {
            let input = doc(json!([{ "type": "paragraph", "content": [{ "type": "text", "text": format!("n{i}") }] }]));
            (i, renderer.render(&input.to_string()))
        }));
    }
    for handle in handles {
        let (i, result) = handle.await.unwrap();
        assert_eq!(result.unwrap(), format!("<p>n{i}</p>"));
    }
}
