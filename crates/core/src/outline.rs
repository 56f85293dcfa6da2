//! Heading outline reconstruction.
//!
//! The outline nests headings by their depth relative to the shallowest
//! heading in the document. Skipped levels are filled with empty-text
//! placeholder entries so every child sits exactly one level below its parent.

use crate::parse::heading_text;
use crate::walk::walk;
use markdown::mdast::Node;
use serde::Serialize;

/// One entry of the heading outline. The root entry has empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OutlineNode {
    /// Flattened heading text; empty for the root and for placeholders.
    pub text: String,
    /// Nested entries one level deeper.
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Returns true when the outline has no entries below the root.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Builds the outline from headings given as `(depth, text)` in document order.
///
/// Single pass over the input with a stack of open entries: the stack height
/// always equals the outline level of the entry on top.
pub fn build_outline<I, S>(headings: I) -> OutlineNode
where
    I: IntoIterator<Item = (u8, S)>,
    S: Into<String>,
{
    let headings: Vec<(u8, String)> = headings
        .into_iter()
        .map(|(depth, text)| (depth, text.into()))
        .collect();

    let mut root = OutlineNode::default();
    let Some(min_depth) = headings.iter().map(|(depth, _)| *depth).min() else {
        return root;
    };

    // Indices into each level's children: `trail[k]` is the position of the
    // open entry at level k + 1 inside its parent.
    let mut trail: Vec<usize> = Vec::new();

    for (depth, text) in headings {
        let level = usize::from(depth - min_depth) + 1;

        while level - 1 > trail.len() {
            let parent = open_entry(&mut root, &trail);
            parent.children.push(OutlineNode::default());
            trail.push(parent.children.len() - 1);
        }
        trail.truncate(level - 1);

        let parent = open_entry(&mut root, &trail);
        parent.children.push(OutlineNode::with_text(text));
        trail.push(parent.children.len() - 1);
    }

    root
}

fn open_entry<'a>(root: &'a mut OutlineNode, trail: &[usize]) -> &'a mut OutlineNode {
    let mut current = root;
    for &index in trail {
        current = &mut current.children[index];
    }
    current
}

/// Collects `(depth, text)` for every heading in the tree, in document order.
pub fn collect_headings(root: &Node) -> Vec<(u8, String)> {
    let mut headings = Vec::new();
    walk(
        root,
        |node| matches!(node, Node::Heading(_)),
        |node, _| {
            if let Node::Heading(heading) = node {
                headings.push((heading.depth, heading_text(node).trim().to_string()));
            }
        },
    );
    headings
}

/// Convenience wrapper: collects the headings of `root` and builds their outline.
pub fn outline_of(root: &Node) -> OutlineNode {
    build_outline(collect_headings(root))
}
