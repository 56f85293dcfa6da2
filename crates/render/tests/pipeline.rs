use mdpost_render::{DocumentContext, Pipeline, PipelineOptions, RenderedPost};

const POST: &str = r#"---
icon: 🦀
title: Writing a parser
date: 2022-03-14
excerpt: Notes on recursive descent.
draft: true
---

{% toc %}

# Introduction

Some words with ![diagram](diagram.svg) and ![remote](https://example.com/x.png).

## Grammar

```rust
fn main() {
    println!("hi");
}
```

### Details

<video src="demo.mp4" controls></video>

<div class="note">untouched   markup</div>
"#;

fn render(source: &str, slug: &str) -> RenderedPost {
    Pipeline::default()
        .render(source, &DocumentContext::new(slug))
        .expect("post renders")
}

#[test]
fn full_post_renders_all_stages() {
    let post = render(POST, "writing-a-parser");

    assert_eq!(post.metadata.icon.as_deref(), Some("🦀"));
    assert_eq!(post.metadata.title, "Writing a parser");
    assert_eq!(post.metadata.full_title(), "🦀 Writing a parser");

    let html = &post.content;
    // TOC replaces the placeholder at the top of the body.
    assert!(html.starts_with("<ul>\n<li>\n<a href=\"#introduction\">Introduction</a>"), "{html}");
    assert!(html.contains("<a href=\"#grammar\">Grammar</a>"), "{html}");
    assert!(html.contains("<a href=\"#details\">Details</a>"), "{html}");
    assert!(!html.contains("{% toc %}"), "{html}");

    // Heading ids agree with TOC links.
    for id in ["introduction", "grammar", "details"] {
        assert!(html.contains(&format!("id=\"{id}\"")), "{id}: {html}");
        assert!(
            html.contains(&format!(
                "<a href=\"#{id}\" role=\"img\" aria-label=\"Link to heading\"></a>"
            )),
            "{id}: {html}"
        );
    }

    // Media URLs.
    assert!(html.contains("src=\"./writing-a-parser/diagram.svg\""), "{html}");
    assert!(html.contains("src=\"https://example.com/x.png\""), "{html}");
    assert!(html.contains("<video src=\"./writing-a-parser/demo.mp4\""), "{html}");
    assert!(html.contains("<div class=\"note\">untouched   markup</div>"), "{html}");

    // Highlighted code keeps its text.
    assert!(html.contains("<code class=\"language-rust hljs\">"), "{html}");
    assert!(html.contains("<span class=\"hljs-"), "{html}");
}

#[test]
fn unknown_language_renders_plain_code() {
    let source = "---\ntitle: T\ndate: 2020-01-01\nexcerpt: E\n---\n\n```klingon\nqapla'\n```\n";
    let post = render(source, "t");
    assert_eq!(
        post.content,
        "<pre><code class=\"language-klingon\">qapla'\n</code></pre>"
    );
}

#[test]
fn missing_frontmatter_yields_sentinel() {
    let post = render("# No metadata\n\n{% toc %}\n", "t");
    assert_eq!(post.metadata.title, "⚠️ Error!");
    assert_eq!(post.metadata.date, "2000-01-01");
    assert_eq!(post.metadata.excerpt, "Missing Frontmatter!");
    assert_eq!(post.metadata.icon, None);
    assert_eq!(post.content, "Missing Frontmatter!");
}

#[test]
fn output_serializes_for_collaborators() {
    let post = render("---\ntitle: T\ndate: 2020-01-01\nexcerpt: E\n---\n\nhi\n", "t");
    let json = serde_json::to_value(&post).expect("serializes");
    assert_eq!(json["metadata"]["title"], "T");
    assert_eq!(json["content"], "<p>hi</p>");
}

#[test]
fn pipeline_renders_concurrently() {
    let pipeline = Pipeline::new(PipelineOptions::default());
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pipeline = &pipeline;
                scope.spawn(move || {
                    let slug = format!("post-{i}");
                    pipeline
                        .render(
                            "---\ntitle: T\ndate: 2020-01-01\nexcerpt: E\n---\n\n![a](a.png)\n",
                            &DocumentContext::new(slug.clone()),
                        )
                        .map(|post| (slug, post.content))
                })
            })
            .collect();
        for handle in handles {
            let (slug, content) = handle
                .join()
                .expect("thread completes")
                .expect("post renders");
            assert!(content.contains(&format!("./{slug}/a.png")));
        }
    });
}

fn attribute_values<'a>(html: &'a str, prefix: &str) -> Vec<&'a str> {
    html.match_indices(prefix)
        .filter_map(|(start, _)| {
            let rest = &html[start + prefix.len()..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect()
}

#[test]
fn toc_links_match_heading_ids_with_inline_markup() {
    let source = "---\ntitle: T\ndate: 2020-01-01\nexcerpt: E\n---\n\n{% toc %}\n\n## Press <kbd>Ctrl</kbd> now\n\n## ![icon](i.png) Setup\n\n## Notes[^1]\n\n[^1]: A note.\n";
    let post = render(source, "t");
    let html = &post.content;

    let toc_end = html.find("<h2").expect("headings rendered");
    let toc_links = attribute_values(&html[..toc_end], "href=\"#");
    assert_eq!(toc_links, vec!["press-ctrl-now", "setup", "notes"], "{html}");

    let heading_ids = attribute_values(html, "<h2 id=\"");
    for link in &toc_links {
        assert!(heading_ids.contains(link), "{link} missing from {heading_ids:?}: {html}");
    }
    assert!(html.contains(">Press Ctrl now</a>"), "{html}");
    assert!(!html[..toc_end].contains("&lt;kbd"), "{html}");
    // The footnote section keeps the id its references point at.
    assert!(html.contains("id=\"footnote-label\""), "{html}");
}

#[test]
fn link_attributes_reach_raw_html_anchors() {
    let pipeline = Pipeline::new(PipelineOptions {
        highlight: false,
        link_attributes: [("rel".to_string(), "noopener".to_string())].into(),
        ..PipelineOptions::default()
    });
    let post = pipeline
        .render(
            "---\ntitle: T\ndate: 2020-01-01\nexcerpt: E\n---\n\n<p><a href=\"https://example.com\">raw</a></p>\n\n[md](https://example.com)\n",
            &DocumentContext::new("t"),
        )
        .expect("post renders");
    assert!(
        post.content
            .contains("<a href=\"https://example.com\" rel=\"noopener\">raw</a>"),
        "{}",
        post.content
    );
    assert!(
        post.content
            .contains("<a href=\"https://example.com\" rel=\"noopener\">md</a>"),
        "{}",
        post.content
    );
}
