//! Syntax highlighting of fenced code blocks.
//!
//! The stage looks for `<pre><code class="language-x">` in the rendered tree
//! and asks a [`Highlighter`] for replacement children. Highlighters are
//! swappable; languages they do not know are left as plain text.

use crate::hast::{self, Element, visit_elements_mut};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use syntect::easy::ScopeRegionIterator;
use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

/// Errors raised by a highlighter backend.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// The grammar failed while tokenizing.
    #[error("Highlighting failed: {0}")]
    Failed(String),
}

/// A syntax highlighting backend.
pub trait Highlighter: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &'static str;

    /// Highlights `code` as `language`.
    ///
    /// Returns `Ok(None)` when the language is unknown to the backend.
    fn highlight(
        &self,
        code: &str,
        language: &str,
    ) -> Result<Option<Vec<hast::Node>>, HighlightError>;
}

/// Highlighter backed by syntect's default grammars.
///
/// Tokens become flat `<span class="hljs-...">` elements named after the
/// first atom of the innermost meaningful scope (`keyword`, `string`, ...).
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    /// Creates the highlighter. Grammars load lazily on first use.
    pub fn new() -> Self {
        Self
    }

    fn syntax_set() -> &'static SyntaxSet {
        static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
        SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
    }

    fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
        let syntax_set = Self::syntax_set();
        syntax_set
            .find_syntax_by_token(language)
            .or_else(|| syntax_set.find_syntax_by_name(language))
    }
}

const STRUCTURAL_ATOMS: &[&str] = &["source", "text", "meta", "punctuation"];

/// First atom of the innermost scope worth styling.
fn token_class(stack: &ScopeStack) -> Option<String> {
    stack.as_slice().iter().rev().find_map(|scope: &Scope| {
        let name = scope.build_string();
        let atom = name.split('.').next()?.to_string();
        (!STRUCTURAL_ATOMS.contains(&atom.as_str())).then_some(atom)
    })
}

fn push_token(nodes: &mut Vec<hast::Node>, class: Option<String>, text: &str) {
    match class {
        Some(class) => nodes.push(
            Element::new("span")
                .with_property("class", vec![format!("hljs-{class}")])
                .with_children(vec![hast::Node::text(text)])
                .into(),
        ),
        None => match nodes.last_mut() {
            Some(hast::Node::Text(previous)) => previous.push_str(text),
            _ => nodes.push(hast::Node::text(text)),
        },
    }
}

impl Highlighter for SyntectHighlighter {
    fn name(&self) -> &'static str {
        "Syntect"
    }

    fn highlight(
        &self,
        code: &str,
        language: &str,
    ) -> Result<Option<Vec<hast::Node>>, HighlightError> {
        let Some(syntax) = Self::find_syntax(language) else {
            return Ok(None);
        };
        let syntax_set = Self::syntax_set();

        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut nodes = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ops = state
                .parse_line(line, syntax_set)
                .map_err(|err| HighlightError::Failed(err.to_string()))?;
            for (region, op) in ScopeRegionIterator::new(&ops, line) {
                stack
                    .apply(op)
                    .map_err(|err| HighlightError::Failed(format!("{err:?}")))?;
                if region.is_empty() {
                    continue;
                }
                push_token(&mut nodes, token_class(&stack), region);
            }
        }

        Ok(Some(nodes))
    }
}

/// Language hint from a `language-x` class.
fn code_language(code: &Element) -> Option<String> {
    code.classes()
        .into_iter()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_string)
}

/// Highlights every `<pre><code class="language-x">` below `tree`.
///
/// Aliases are resolved (case-insensitively) before the highlighter is asked.
/// Unknown languages and highlighter failures leave the block untouched.
pub fn highlight_code_blocks(
    tree: &mut hast::Node,
    highlighter: &dyn Highlighter,
    aliases: &BTreeMap<String, String>,
) {
    visit_elements_mut(tree, &mut |pre: &mut Element| {
        if pre.tag != "pre" {
            return;
        }
        for child in pre.children.iter_mut() {
            let hast::Node::Element(code) = child else {
                continue;
            };
            if code.tag != "code" {
                continue;
            }
            let Some(language) = code_language(code) else {
                continue;
            };
            let resolved = aliases
                .get(&language.to_lowercase())
                .cloned()
                .unwrap_or(language);

            match highlighter.highlight(&code.text_content(), &resolved) {
                Ok(Some(children)) => {
                    log::debug!("Highlighted {resolved} block with {}", highlighter.name());
                    code.children = children;
                    code.add_class("hljs");
                }
                Ok(None) => log::debug!("No grammar for language {resolved:?}"),
                Err(err) => log::warn!("Skipping {resolved} block: {err}"),
            }
        }
    });
}
