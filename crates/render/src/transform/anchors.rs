//! Heading ids and permalink anchors on the rendered tree.

use crate::hast::{self, Element, visit_elements_mut};
use mdpost_core::slugify;

/// Builds the empty permalink anchor placed at the start of a heading.
pub fn permalink(slug: &str) -> Element {
    Element::new("a")
        .with_property("href", format!("#{slug}"))
        .with_property("role", "img")
        .with_property("aria-label", "Link to heading")
}

/// Text a heading id is derived from.
///
/// Matches [`mdpost_core::heading_text`] on the markdown side: raw HTML and
/// images carry no text nodes, and footnote reference markers are skipped,
/// so ids agree with table of contents links.
pub fn heading_id_text(heading: &Element) -> String {
    let mut buffer = String::new();
    for child in &heading.children {
        push_id_text(child, &mut buffer);
    }
    buffer
}

fn push_id_text(node: &hast::Node, buffer: &mut String) {
    match node {
        hast::Node::Text(text) => buffer.push_str(text),
        hast::Node::Element(element) if is_footnote_reference(element) => {}
        hast::Node::Element(element) => {
            for child in &element.children {
                push_id_text(child, buffer);
            }
        }
        hast::Node::Root(children) => {
            for child in children {
                push_id_text(child, buffer);
            }
        }
        hast::Node::Raw(_) => {}
    }
}

fn is_footnote_reference(element: &Element) -> bool {
    element.tag == "sup"
        && element.children.iter().any(|child| {
            matches!(child, hast::Node::Element(link) if link.properties.contains_key("data-footnote-ref"))
        })
}

/// Gives every `h1`-`h6` an `id` slugified from its text and prepends a
/// permalink anchor pointing at it. Headings that already carry an `id` keep
/// it. Returns the number of decorated headings.
pub fn decorate_headings(tree: &mut hast::Node) -> usize {
    let mut decorated = 0;
    visit_elements_mut(tree, &mut |element: &mut Element| {
        if element.heading_rank().is_none() {
            return;
        }
        let slug = match element.property_str("id") {
            Some(id) => id.to_string(),
            None => {
                let slug = slugify(&heading_id_text(element));
                element.set_property("id", slug.as_str());
                slug
            }
        };
        element.children.insert(0, permalink(&slug).into());
        decorated += 1;
    });
    decorated
}
