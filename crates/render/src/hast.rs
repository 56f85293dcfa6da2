//! Rendered element tree and its HTML serializer.
//!
//! The tree mirrors hast: elements carry a tag, an ordered property map and
//! children. `Raw` nodes hold embedded markup that is written out verbatim.

use indexmap::IndexMap;

/// A node of the rendered element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Document root; serializes as its children only.
    Root(Vec<Node>),
    /// An HTML element.
    Element(Element),
    /// Escaped text content.
    Text(String),
    /// Markup passed through without escaping.
    Raw(String),
}

/// A property value on an element.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Plain string attribute.
    String(String),
    /// Space-separated token list (e.g. `class`).
    List(Vec<String>),
    /// Boolean attribute; `false` is omitted on output.
    Bool(bool),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

/// An HTML element with ordered properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in insertion order.
    pub properties: IndexMap<String, PropertyValue>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no properties or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: sets a property.
    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Builder: replaces the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Sets or overwrites a property, keeping its original position.
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(name.to_string(), value.into());
    }

    /// Returns a string property.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        match self.properties.get(name) {
            Some(PropertyValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the class tokens of the element.
    pub fn classes(&self) -> Vec<&str> {
        match self.properties.get("class") {
            Some(PropertyValue::List(tokens)) => tokens.iter().map(String::as_str).collect(),
            Some(PropertyValue::String(value)) => value.split_ascii_whitespace().collect(),
            _ => Vec::new(),
        }
    }

    /// Appends a class token unless already present.
    pub fn add_class(&mut self, class: &str) {
        let mut tokens: Vec<String> = self.classes().into_iter().map(str::to_string).collect();
        if !tokens.iter().any(|token| token == class) {
            tokens.push(class.to_string());
        }
        self.set_property("class", tokens);
    }

    /// Heading rank (1-6) for `h1`..`h6`.
    pub fn heading_rank(&self) -> Option<u8> {
        match self.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        for child in &self.children {
            push_text(child, &mut buffer);
        }
        buffer
    }
}

fn push_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(text) => buffer.push_str(text),
        Node::Element(element) => {
            for child in &element.children {
                push_text(child, buffer);
            }
        }
        Node::Root(children) => {
            for child in children {
                push_text(child, buffer);
            }
        }
        Node::Raw(_) => {}
    }
}

impl Node {
    /// Shorthand for a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Children of roots and elements.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Root(children) => Some(children),
            Node::Element(element) => Some(&element.children),
            _ => None,
        }
    }

    /// Mutable children of roots and elements.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(children) => Some(children),
            Node::Element(element) => Some(&mut element.children),
            _ => None,
        }
    }

    /// Serializes the node to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_node(self, &mut out);
        out
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Visits every element below `node`, pre-order, allowing in-place edits.
///
/// Children added by the visitor are visited as well.
pub fn visit_elements_mut<F>(node: &mut Node, visit: &mut F)
where
    F: FnMut(&mut Element),
{
    if let Node::Element(element) = node {
        visit(element);
    }
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            visit_elements_mut(child, visit);
        }
    }
}

/// Visits every raw node below `node`, allowing its markup to be replaced.
pub fn visit_raw_mut<F>(node: &mut Node, visit: &mut F)
where
    F: FnMut(&mut String),
{
    match node {
        Node::Raw(markup) => visit(markup),
        other => {
            if let Some(children) = other.children_mut() {
                for child in children.iter_mut() {
                    visit_raw_mut(child, visit);
                }
            }
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Root(children) => {
            for child in children {
                write_node(child, out);
            }
        }
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
        Node::Raw(markup) => out.push_str(markup),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.properties {
        match value {
            PropertyValue::Bool(false) => continue,
            PropertyValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropertyValue::String(value) => write_attribute(name, value, out),
            PropertyValue::List(tokens) => write_attribute(name, &tokens.join(" "), out),
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}
