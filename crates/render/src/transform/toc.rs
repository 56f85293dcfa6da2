//! Table of contents synthesis on the markdown tree.

use markdown::mdast::{Link, List, ListItem, Node, Text};
use mdpost_core::{OutlineNode, collect_paths, outline_of, plain_text, replace_at, slugify};

/// Returns true when `text` is a TOC placeholder: `{% toc %}` with any
/// surrounding or inner whitespace, case-insensitive.
pub fn is_toc_placeholder(text: &str) -> bool {
    text.trim()
        .strip_prefix("{%")
        .and_then(|rest| rest.strip_suffix("%}"))
        .is_some_and(|inner| inner.trim().eq_ignore_ascii_case("toc"))
}

/// Builds the nested list for an outline. The root entry itself is not
/// listed, only its children.
pub fn outline_to_list(outline: &OutlineNode) -> Node {
    let children = outline
        .children
        .iter()
        .map(|entry| {
            let mut item_children = vec![Node::Link(Link {
                children: vec![Node::Text(Text {
                    value: entry.text.clone(),
                    position: None,
                })],
                position: None,
                url: format!("#{}", slugify(&entry.text)),
                title: None,
            })];
            if !entry.children.is_empty() {
                item_children.push(outline_to_list(entry));
            }
            Node::ListItem(ListItem {
                children: item_children,
                position: None,
                spread: false,
                checked: None,
            })
        })
        .collect();

    Node::List(List {
        children,
        position: None,
        ordered: false,
        start: None,
        spread: false,
    })
}

/// Replaces every placeholder paragraph with the table of contents.
///
/// Returns the number of placeholders replaced.
pub fn insert_table_of_contents(root: &mut Node) -> usize {
    let placeholders = collect_paths(root, |node, _| {
        matches!(node, Node::Paragraph(_)) && is_toc_placeholder(&plain_text(node))
    });
    if placeholders.is_empty() {
        return 0;
    }

    let toc = outline_to_list(&outline_of(root));
    let mut replaced = 0;
    // One-for-one replacement keeps every recorded path valid.
    for path in &placeholders {
        if replace_at(root, path, toc.clone()).is_some() {
            replaced += 1;
        }
    }
    log::debug!("Inserted table of contents at {replaced} placeholder(s)");
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpost_core::{ParseOptions, parse_mdast};

    fn parse(input: &str) -> Node {
        parse_mdast(input, &ParseOptions::post()).expect("markdown should parse")
    }

    fn link_urls(node: &Node, out: &mut Vec<String>) {
        if let Node::Link(link) = node {
            out.push(link.url.clone());
        }
        if let Some(children) = node.children() {
            for child in children {
                link_urls(child, out);
            }
        }
    }

    #[test]
    fn placeholder_matching() {
        assert!(is_toc_placeholder("{% toc %}"));
        assert!(is_toc_placeholder("  {%toc%}  "));
        assert!(is_toc_placeholder("{%   TOC \t %}"));
        assert!(!is_toc_placeholder("{% toc %} and more"));
        assert!(!is_toc_placeholder("{% tocs %}"));
        assert!(!is_toc_placeholder("toc"));
    }

    #[test]
    fn replaces_placeholder_with_nested_list() {
        let mut root = parse("{% toc %}\n\n# Intro\n\n## Setup\n");
        assert_eq!(insert_table_of_contents(&mut root), 1);

        let children = root.children().expect("children");
        let Node::List(list) = &children[0] else {
            panic!("expected list, got {:?}", children[0]);
        };
        assert_eq!(list.children.len(), 1);
        let Node::ListItem(intro) = &list.children[0] else {
            panic!("expected list item");
        };
        let Node::Link(link) = &intro.children[0] else {
            panic!("expected link");
        };
        assert_eq!(link.url, "#intro");
        let Node::List(nested) = &intro.children[1] else {
            panic!("expected nested list");
        };
        let mut urls = Vec::new();
        link_urls(&nested.children[0], &mut urls);
        assert_eq!(urls, vec!["#setup"]);
    }

    #[test]
    fn placeholder_case_and_whitespace_tolerated() {
        let mut root = parse("   {%  TOC  %}   \n\n## Only\n");
        assert_eq!(insert_table_of_contents(&mut root), 1);
        assert!(matches!(root.children().expect("children")[0], Node::List(_)));
    }

    #[test]
    fn every_placeholder_is_replaced_in_place() {
        let mut root = parse("# A\n\n{% toc %}\n\ntext\n\n> {% toc %}\n");
        assert_eq!(insert_table_of_contents(&mut root), 2);
        let children = root.children().expect("children");
        assert!(matches!(children[0], Node::Heading(_)));
        assert!(matches!(children[1], Node::List(_)));
        assert!(matches!(children[2], Node::Paragraph(_)));
        let quoted = children[3].children().expect("blockquote children");
        assert!(matches!(quoted[0], Node::List(_)));
    }

    #[test]
    fn no_placeholder_leaves_tree_unchanged() {
        let mut root = parse("# A\n\ntext {% toc %}\n");
        let before = root.clone();
        assert_eq!(insert_table_of_contents(&mut root), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn placeholder_levels_are_not_listed_as_text() {
        let outline = mdpost_core::build_outline([(1, "Top"), (3, "Deep")]);
        let list = outline_to_list(&outline);
        let mut urls = Vec::new();
        link_urls(&list, &mut urls);
        // The synthesized level still gets an entry with an empty label.
        assert_eq!(urls, vec!["#top", "#", "#deep"]);
    }

    #[test]
    fn no_headings_gives_empty_list() {
        let mut root = parse("{% toc %}\n");
        insert_table_of_contents(&mut root);
        let Node::List(list) = &root.children().expect("children")[0] else {
            panic!("expected list");
        };
        assert!(list.children.is_empty());
    }
}
