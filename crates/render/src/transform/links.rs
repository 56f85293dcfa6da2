//! Extra attributes on every rendered link.

use crate::hast::{self, Element, visit_elements_mut, visit_raw_mut};
use lol_html::{RewriteStrSettings, element, rewrite_str};
use std::cell::Cell;
use std::collections::BTreeMap;

/// Sets each configured attribute on every `<a>` element, overwriting
/// existing values. Anchors written as raw HTML in the post are stamped too.
/// Returns the number of links touched.
pub fn apply_link_attributes(tree: &mut hast::Node, attributes: &BTreeMap<String, String>) -> usize {
    if attributes.is_empty() {
        return 0;
    }
    let mut touched = 0;
    visit_elements_mut(tree, &mut |element: &mut Element| {
        if element.tag != "a" {
            return;
        }
        for (name, value) in attributes {
            element.set_property(name, value.as_str());
        }
        touched += 1;
    });
    visit_raw_mut(tree, &mut |markup: &mut String| {
        if let Some((updated, links)) = stamp_raw_links(markup, attributes) {
            *markup = updated;
            touched += links;
        }
    });
    touched
}

/// Stamps the attributes on every `<a>` start tag inside a raw HTML fragment.
///
/// Returns the rewritten markup and the number of anchors, or `None` when the
/// fragment holds no anchor.
pub fn stamp_raw_links(
    html: &str,
    attributes: &BTreeMap<String, String>,
) -> Option<(String, usize)> {
    let links = Cell::new(0usize);
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a", |el| {
                for (name, value) in attributes {
                    el.set_attribute(name, value)?;
                }
                links.set(links.get() + 1);
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );

    match output {
        Ok(rewritten) if links.get() > 0 => Some((rewritten, links.get())),
        Ok(_) => None,
        Err(err) => {
            log::warn!("Leaving raw links untouched: {err}");
            None
        }
    }
}
