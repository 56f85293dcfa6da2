//! Conversion from the markdown tree (mdast) to the rendered element tree.
//!
//! Output follows mdast-util-to-hast: block siblings are separated by
//! newline text nodes, tight list items unwrap their paragraphs, raw HTML is
//! kept as [`hast::Node::Raw`], and GFM footnotes are gathered into a trailing
//! section.

use crate::hast::{self, Element};
use markdown::mdast::{self, AlignKind, Node};
use std::collections::HashMap;

struct Definition {
    url: String,
    title: Option<String>,
}

/// Conversion state for one document.
struct Converter {
    definitions: HashMap<String, Definition>,
    footnote_definitions: HashMap<String, Vec<Node>>,
    /// Footnote identifiers in order of first reference.
    footnote_order: Vec<String>,
    /// Number of references seen per footnote identifier.
    footnote_counts: HashMap<String, usize>,
}

/// Converts a markdown root into a rendered element root.
pub fn to_hast(root: &Node) -> hast::Node {
    let mut converter = Converter {
        definitions: HashMap::new(),
        footnote_definitions: HashMap::new(),
        footnote_order: Vec::new(),
        footnote_counts: HashMap::new(),
    };
    converter.collect_definitions(root);

    let mut children = match root.children() {
        Some(children) => converter.blocks(children, false),
        None => converter.node(root),
    };

    if let Some(section) = converter.footnote_section() {
        if !children.is_empty() {
            children.push(newline());
        }
        children.push(section.into());
    }

    hast::Node::Root(children)
}

fn normalize_identifier(identifier: &str) -> String {
    identifier
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn newline() -> hast::Node {
    hast::Node::text("\n")
}

/// Joins nodes with newline separators; `loose` also pads both ends.
fn wrap(nodes: Vec<hast::Node>, loose: bool) -> Vec<hast::Node> {
    let mut result = Vec::with_capacity(nodes.len() * 2 + 1);
    if loose {
        result.push(newline());
    }
    let count = nodes.len();
    for (index, node) in nodes.into_iter().enumerate() {
        if index > 0 {
            result.push(newline());
        }
        result.push(node);
    }
    if loose && count > 0 {
        result.push(newline());
    }
    result
}

impl Converter {
    fn collect_definitions(&mut self, node: &Node) {
        match node {
            Node::Definition(definition) => {
                let key = normalize_identifier(&definition.identifier);
                // First definition wins, as in CommonMark.
                self.definitions.entry(key).or_insert_with(|| Definition {
                    url: definition.url.clone(),
                    title: definition.title.clone(),
                });
            }
            Node::FootnoteDefinition(definition) => {
                let key = normalize_identifier(&definition.identifier);
                self.footnote_definitions
                    .entry(key)
                    .or_insert_with(|| definition.children.clone());
            }
            _ => {}
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    /// Converts block children and separates them with newlines.
    fn blocks(&mut self, children: &[Node], loose: bool) -> Vec<hast::Node> {
        let converted: Vec<hast::Node> = children
            .iter()
            .flat_map(|child| self.node(child))
            .collect();
        wrap(converted, loose)
    }

    fn inline(&mut self, children: &[Node]) -> Vec<hast::Node> {
        children.iter().flat_map(|child| self.node(child)).collect()
    }

    fn element(&mut self, tag: &str, children: &[Node]) -> Vec<hast::Node> {
        let children = self.inline(children);
        vec![Element::new(tag).with_children(children).into()]
    }

    fn node(&mut self, node: &Node) -> Vec<hast::Node> {
        match node {
            Node::Root(root) => self.blocks(&root.children, false),
            Node::Paragraph(paragraph) => self.element("p", &paragraph.children),
            Node::Heading(heading) => {
                let tag = format!("h{}", heading.depth.clamp(1, 6));
                self.element(&tag, &heading.children)
            }
            Node::Text(text) => vec![hast::Node::text(text.value.clone())],
            Node::Emphasis(emphasis) => self.element("em", &emphasis.children),
            Node::Strong(strong) => self.element("strong", &strong.children),
            Node::Delete(delete) => self.element("del", &delete.children),
            Node::InlineCode(code) => vec![
                Element::new("code")
                    .with_children(vec![hast::Node::text(code.value.clone())])
                    .into(),
            ],
            Node::Break(_) => vec![Element::new("br").into(), newline()],
            Node::ThematicBreak(_) => vec![Element::new("hr").into()],
            Node::Blockquote(quote) => {
                let children = self.blocks(&quote.children, true);
                vec![Element::new("blockquote").with_children(children).into()]
            }
            Node::Code(code) => vec![self.code(code)],
            Node::Html(html) => vec![hast::Node::Raw(html.value.clone())],
            Node::Link(link) => {
                let mut element = Element::new("a").with_property("href", link.url.as_str());
                if let Some(title) = &link.title {
                    element.set_property("title", title.as_str());
                }
                element.children = self.inline(&link.children);
                vec![element.into()]
            }
            Node::Image(image) => vec![image_element(&image.url, &image.alt, image.title.as_deref()).into()],
            Node::LinkReference(reference) => self.link_reference(reference),
            Node::ImageReference(reference) => self.image_reference(reference),
            Node::List(list) => vec![self.list(list)],
            Node::ListItem(item) => vec![self.list_item(item, item.spread)],
            Node::Table(table) => vec![self.table(table)],
            Node::FootnoteReference(reference) => vec![self.footnote_reference(reference)],
            Node::Definition(_)
            | Node::FootnoteDefinition(_)
            | Node::Yaml(_)
            | Node::Toml(_) => Vec::new(),
            other => {
                log::warn!("Unhandled markdown node type: {:?}", other);
                match other.children() {
                    Some(children) => self.inline(children),
                    None => Vec::new(),
                }
            }
        }
    }

    fn code(&mut self, code: &mdast::Code) -> hast::Node {
        let mut inner = Element::new("code");
        if let Some(lang) = code.lang.as_deref().filter(|lang| !lang.is_empty()) {
            inner.set_property("class", vec![format!("language-{lang}")]);
        }
        if !code.value.is_empty() {
            inner.children = vec![hast::Node::text(format!("{}\n", code.value))];
        }
        Element::new("pre")
            .with_children(vec![inner.into()])
            .into()
    }

    fn list(&mut self, list: &mdast::List) -> hast::Node {
        let tag = if list.ordered { "ol" } else { "ul" };
        let mut element = Element::new(tag);
        if list.ordered
            && let Some(start) = list.start
            && start != 1
        {
            element.set_property("start", start.to_string());
        }

        let loose = list.spread
            || list
                .children
                .iter()
                .any(|child| matches!(child, Node::ListItem(item) if item.spread));

        let is_task_list = list
            .children
            .iter()
            .any(|child| matches!(child, Node::ListItem(item) if item.checked.is_some()));
        if is_task_list {
            element.set_property("class", vec!["contains-task-list".to_string()]);
        }

        let items: Vec<hast::Node> = list
            .children
            .iter()
            .map(|child| match child {
                Node::ListItem(item) => self.list_item(item, loose),
                other => Element::new("li").with_children(self.node(other)).into(),
            })
            .collect();
        element.children = wrap(items, true);
        element.into()
    }

    fn list_item(&mut self, item: &mdast::ListItem, loose: bool) -> hast::Node {
        let mut element = Element::new("li");
        let mut children: Vec<hast::Node> = Vec::new();

        for (index, child) in item.children.iter().enumerate() {
            let is_paragraph = matches!(child, Node::Paragraph(_));
            if loose || index != 0 || !is_paragraph {
                children.push(newline());
            }
            match child {
                Node::Paragraph(paragraph) if !loose => {
                    children.extend(self.inline(&paragraph.children));
                }
                other => children.extend(self.node(other)),
            }
        }

        if let Some(last) = item.children.last()
            && (loose || !matches!(last, Node::Paragraph(_)))
        {
            children.push(newline());
        }

        if let Some(checked) = item.checked {
            element.set_property("class", vec!["task-list-item".to_string()]);
            let checkbox = Element::new("input")
                .with_property("type", "checkbox")
                .with_property("checked", checked)
                .with_property("disabled", true);
            let insert_at = children
                .iter()
                .position(|node| !matches!(node, hast::Node::Text(text) if text == "\n"))
                .unwrap_or(children.len());
            // The checkbox goes inside the first paragraph when the item is loose.
            match children.get_mut(insert_at) {
                Some(hast::Node::Element(p)) if loose && p.tag == "p" => {
                    p.children.insert(0, hast::Node::text(" "));
                    p.children.insert(0, checkbox.into());
                }
                _ => {
                    children.insert(insert_at, hast::Node::text(" "));
                    children.insert(insert_at, checkbox.into());
                }
            }
        }

        element.children = children;
        element.into()
    }

    fn table(&mut self, table: &mdast::Table) -> hast::Node {
        let mut head = Vec::new();
        let mut body = Vec::new();

        for (row_index, row) in table.children.iter().enumerate() {
            let Node::TableRow(row) = row else {
                continue;
            };
            let cell_tag = if row_index == 0 { "th" } else { "td" };
            let cells: Vec<hast::Node> = row
                .children
                .iter()
                .enumerate()
                .map(|(cell_index, cell)| {
                    let mut element = Element::new(cell_tag);
                    if let Some(align) = table.align.get(cell_index).and_then(align_value) {
                        element.set_property("align", align);
                    }
                    if let Some(children) = cell.children() {
                        element.children = self.inline(children);
                    }
                    element.into()
                })
                .collect();
            let tr: hast::Node = Element::new("tr").with_children(wrap(cells, true)).into();
            if row_index == 0 {
                head.push(tr);
            } else {
                body.push(tr);
            }
        }

        let mut sections = vec![Element::new("thead").with_children(wrap(head, true)).into()];
        if !body.is_empty() {
            sections.push(Element::new("tbody").with_children(wrap(body, true)).into());
        }
        Element::new("table")
            .with_children(wrap(sections, true))
            .into()
    }

    fn link_reference(&mut self, reference: &mdast::LinkReference) -> Vec<hast::Node> {
        let key = normalize_identifier(&reference.identifier);
        let Some((url, title)) = self
            .definitions
            .get(&key)
            .map(|definition| (definition.url.clone(), definition.title.clone()))
        else {
            let mut nodes = vec![hast::Node::text("[")];
            nodes.extend(self.inline(&reference.children));
            nodes.push(hast::Node::text("]"));
            return nodes;
        };

        let mut element = Element::new("a").with_property("href", url);
        if let Some(title) = title {
            element.set_property("title", title);
        }
        element.children = self.inline(&reference.children);
        vec![element.into()]
    }

    fn image_reference(&mut self, reference: &mdast::ImageReference) -> Vec<hast::Node> {
        let key = normalize_identifier(&reference.identifier);
        match self.definitions.get(&key) {
            Some(definition) => vec![
                image_element(&definition.url, &reference.alt, definition.title.as_deref()).into(),
            ],
            None => vec![hast::Node::text(format!("![{}]", reference.alt))],
        }
    }

    fn footnote_reference(&mut self, reference: &mdast::FootnoteReference) -> hast::Node {
        let key = normalize_identifier(&reference.identifier);
        let number = match self.footnote_order.iter().position(|id| *id == key) {
            Some(index) => index + 1,
            None => {
                self.footnote_order.push(key.clone());
                self.footnote_order.len()
            }
        };
        let count = self.footnote_counts.entry(key.clone()).or_insert(0);
        *count += 1;
        let id_suffix = if *count > 1 {
            format!("{}-{}", key, count)
        } else {
            key.clone()
        };

        let link = Element::new("a")
            .with_property("href", format!("#user-content-fn-{key}"))
            .with_property("id", format!("user-content-fnref-{id_suffix}"))
            .with_property("data-footnote-ref", true)
            .with_property("aria-describedby", "footnote-label")
            .with_children(vec![hast::Node::text(number.to_string())]);
        Element::new("sup")
            .with_children(vec![link.into()])
            .into()
    }

    fn footnote_section(&mut self) -> Option<Element> {
        if self.footnote_order.is_empty() {
            return None;
        }

        let order = self.footnote_order.clone();
        let mut items = Vec::new();
        for key in order {
            let Some(definition) = self.footnote_definitions.get(&key).cloned() else {
                continue;
            };
            let mut children = self.blocks(&definition, true);
            let backref: hast::Node = Element::new("a")
                .with_property("href", format!("#user-content-fnref-{key}"))
                .with_property("data-footnote-backref", true)
                .with_property("aria-label", "Back to reference")
                .with_property("class", vec!["data-footnote-backref".to_string()])
                .with_children(vec![hast::Node::text("↩")])
                .into();

            let last_paragraph = children.iter_mut().rev().find_map(|node| match node {
                hast::Node::Element(element) if element.tag == "p" => Some(element),
                _ => None,
            });
            match last_paragraph {
                Some(paragraph) => {
                    paragraph.children.push(hast::Node::text(" "));
                    paragraph.children.push(backref);
                }
                None => children.push(backref),
            }

            items.push(
                Element::new("li")
                    .with_property("id", format!("user-content-fn-{key}"))
                    .with_children(children)
                    .into(),
            );
        }

        if items.is_empty() {
            return None;
        }

        let label = Element::new("h2")
            .with_property("class", vec!["sr-only".to_string()])
            .with_property("id", "footnote-label")
            .with_children(vec![hast::Node::text("Footnotes")]);
        let list = Element::new("ol").with_children(wrap(items, true));
        Some(
            Element::new("section")
                .with_property("data-footnotes", true)
                .with_property("class", vec!["footnotes".to_string()])
                .with_children(wrap(vec![label.into(), list.into()], true)),
        )
    }
}

fn image_element(url: &str, alt: &str, title: Option<&str>) -> Element {
    let mut element = Element::new("img")
        .with_property("src", url)
        .with_property("alt", alt);
    if let Some(title) = title {
        element.set_property("title", title);
    }
    element
}

fn align_value(align: &AlignKind) -> Option<&'static str> {
    match align {
        AlignKind::Left => Some("left"),
        AlignKind::Right => Some("right"),
        AlignKind::Center => Some("center"),
        AlignKind::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpost_core::{ParseOptions, parse_mdast};

    fn render(input: &str) -> String {
        let root = parse_mdast(input, &ParseOptions::post()).expect("markdown should parse");
        to_hast(&root).to_html()
    }

    #[test]
    fn paragraphs_and_headings() {
        assert_eq!(
            render("# Title\n\nSome *text* here.\n"),
            "<h1>Title</h1>\n<p>Some <em>text</em> here.</p>"
        );
    }

    #[test]
    fn tight_list_unwraps_paragraphs() {
        assert_eq!(
            render("- one\n- two\n"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>"
        );
    }

    #[test]
    fn loose_list_keeps_paragraphs() {
        assert_eq!(
            render("- one\n\n- two\n"),
            "<ul>\n<li>\n<p>one</p>\n</li>\n<li>\n<p>two</p>\n</li>\n</ul>"
        );
    }

    #[test]
    fn ordered_list_start() {
        assert_eq!(
            render("3. three\n4. four\n"),
            "<ol start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>"
        );
    }

    #[test]
    fn code_block_gets_language_class() {
        assert_eq!(
            render("```rust\nfn main() {}\n```\n"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
        assert_eq!(
            render("```\nplain\n```\n"),
            "<pre><code>plain\n</code></pre>"
        );
    }

    #[test]
    fn raw_html_passes_through() {
        assert_eq!(
            render("<video src=\"clip.mp4\"></video>\n"),
            "<video src=\"clip.mp4\"></video>"
        );
    }

    #[test]
    fn images_and_links() {
        assert_eq!(
            render("[a](https://x.dev \"T\") ![pic](p.png)\n"),
            "<p><a href=\"https://x.dev\" title=\"T\">a</a> <img src=\"p.png\" alt=\"pic\"></p>"
        );
    }

    #[test]
    fn references_resolve_through_definitions() {
        assert_eq!(
            render("[Site][S] and ![logo][l]\n\n[s]: https://s.dev\n[l]: logo.png\n"),
            "<p><a href=\"https://s.dev\">Site</a> and <img src=\"logo.png\" alt=\"logo\"></p>"
        );
    }

    #[test]
    fn table_with_alignment() {
        let html = render("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        assert!(html.starts_with("<table>\n<thead>\n<tr>\n<th align=\"left\">a</th>"), "{html}");
        assert!(html.contains("<td align=\"right\">2</td>"), "{html}");
        assert!(html.ends_with("</tbody>\n</table>"), "{html}");
    }

    #[test]
    fn task_list_items_render_checkbox() {
        let html = render("- [x] done\n- [ ] todo\n");
        assert!(html.starts_with("<ul class=\"contains-task-list\">"), "{html}");
        assert!(
            html.contains("<li class=\"task-list-item\"><input type=\"checkbox\" checked disabled> done</li>"),
            "{html}"
        );
        assert!(
            html.contains("<input type=\"checkbox\" disabled> todo"),
            "{html}"
        );
    }

    #[test]
    fn footnotes_collect_into_section() {
        let html = render("Text[^1].\n\n[^1]: The note.\n");
        assert!(
            html.contains("<sup><a href=\"#user-content-fn-1\" id=\"user-content-fnref-1\" data-footnote-ref aria-describedby=\"footnote-label\">1</a></sup>"),
            "{html}"
        );
        assert!(html.contains("<section data-footnotes class=\"footnotes\">"), "{html}");
        assert!(html.contains("<li id=\"user-content-fn-1\">"), "{html}");
        assert!(html.contains("The note. <a href=\"#user-content-fnref-1\""), "{html}");
    }

    #[test]
    fn frontmatter_is_not_rendered() {
        assert_eq!(render("---\ntitle: x\n---\n\nbody\n"), "<p>body</p>");
    }
}
