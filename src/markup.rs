//! Template and markup tree definitions.
//!
//! Dictionaries carry trees in a hiccup-like JSON form:
//!
//! ```json
//! [":p", {"class": "lead"}, "Hello ", [":strong", "%1"], "!"]
//! ```
//!
//! An array whose first element is a tag token (`":tag"`) is a node, an
//! object in second position is its attribute map, and any string that is
//! exactly a placeholder (`"%1"`) becomes an argument leaf.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::CompileError;
use crate::render::interpolate::{
    ArgPart,
    split_args,
};

/// Tag tokens: `:` followed by a letter, then letters, digits or `-`.
#[allow(clippy::unwrap_used)]
static TAG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:[A-Za-z][A-Za-z0-9-]*$").unwrap());

/// Attribute map of a node. Values are usually text or argument leaves.
pub type Attrs = BTreeMap<String, Markup>;

/// One element of a markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Text(String),
    /// Positional argument, 0-based (`%1` is `Arg(0)`).
    Arg(usize),
    Node(Node),
}

/// A tagged node with optional attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: String,
    pub attrs: Option<Attrs>,
    pub children: Vec<Markup>,
}

/// Top-level markup tree of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    /// The template named its own root tag.
    Tagged(Node),
    /// A bare sequence of children; receives the default tag when compiled.
    Untagged(Vec<Markup>),
}

/// A dictionary entry, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Text(String),
    Tree(Tree),
}

impl Markup {
    /// Shorthand for a text leaf.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Concatenated text of this element and its descendants.
    ///
    /// Argument leaves contribute nothing; attributes are ignored.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        push_text_content(self, &mut out);
        out
    }
}

/// Appends the text leaves under `markup` to `out`, in order.
fn push_text_content(markup: &Markup, out: &mut String) {
    match markup {
        Markup::Text(text) => out.push_str(text),
        Markup::Arg(_) => {}
        Markup::Node(node) => {
            for child in &node.children {
                push_text_content(child, out);
            }
        }
    }
}

impl Node {
    #[must_use]
    pub fn new(tag: impl Into<String>, children: Vec<Markup>) -> Self {
        Self { tag: tag.into(), attrs: None, children }
    }

    #[must_use]
    pub fn with_attrs(tag: impl Into<String>, attrs: Attrs, children: Vec<Markup>) -> Self {
        Self { tag: tag.into(), attrs: Some(attrs), children }
    }
}

impl From<Node> for Markup {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Tree> for Template {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

/// Checks whether `token` is a tag token such as `":strong"`.
#[must_use]
pub fn is_tag_token(token: &str) -> bool {
    TAG_TOKEN.is_match(token)
}

impl Template {
    /// Reads a dictionary leaf into a template.
    ///
    /// Strings stay text, numbers and booleans become their textual form and
    /// arrays are parsed as markup trees. `path` is only used for errors.
    pub fn from_json(value: &Value, path: &str) -> Result<Self, CompileError> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Number(_) | Value::Bool(_) => Ok(Self::Text(value.to_string())),
            Value::Array(items) => parse_tree(items, path).map(Self::Tree),
            Value::Null => Err(malformed(path, "null is not a template")),
            Value::Object(_) => Err(malformed(path, "objects are not templates")),
        }
    }
}

/// Builds a `MalformedTemplate` error.
fn malformed(path: &str, message: impl Into<String>) -> CompileError {
    CompileError::MalformedTemplate { path: path.to_string(), message: message.into() }
}

/// Parses a top-level array, tagged or not.
fn parse_tree(items: &[Value], path: &str) -> Result<Tree, CompileError> {
    match items.first() {
        Some(Value::String(first)) if is_tag_token(first) => {
            parse_node(items, path).map(Tree::Tagged)
        }
        _ => parse_children(items, path).map(Tree::Untagged),
    }
}

/// Parses `[":tag", {attrs}?, children...]`.
fn parse_node(items: &[Value], path: &str) -> Result<Node, CompileError> {
    let Some((Value::String(tag), rest)) = items.split_first() else {
        return Err(malformed(path, "nested arrays must start with a tag such as \":em\""));
    };
    if !is_tag_token(tag) {
        return Err(malformed(path, format!("'{tag}' is not a tag token")));
    }
    let tag = tag.trim_start_matches(':').to_string();

    match rest.split_first() {
        Some((Value::Object(map), children)) => {
            let mut attrs = Attrs::new();
            for (name, value) in map {
                attrs.insert(name.clone(), parse_leaf(value, path)?);
            }
            Ok(Node::with_attrs(tag, attrs, parse_children(children, path)?))
        }
        _ => Ok(Node::new(tag, parse_children(rest, path)?)),
    }
}

/// Parses the children of a node.
fn parse_children(items: &[Value], path: &str) -> Result<Vec<Markup>, CompileError> {
    items
        .iter()
        .map(|item| match item {
            Value::Array(nested) => parse_node(nested, path).map(Markup::Node),
            _ => parse_leaf(item, path),
        })
        .collect()
}

/// Parses a scalar child or attribute value.
fn parse_leaf(value: &Value, path: &str) -> Result<Markup, CompileError> {
    match value {
        Value::String(text) => standalone_placeholder(text),
        Value::Number(_) | Value::Bool(_) => Ok(Markup::Text(value.to_string())),
        Value::Null | Value::Object(_) | Value::Array(_) => {
            Err(malformed(path, format!("unexpected value in markup: {value}")))
        }
    }
}

/// Turns a string that is exactly one placeholder into an argument leaf.
fn standalone_placeholder(text: &str) -> Result<Markup, CompileError> {
    if text.starts_with('%')
        && let [ArgPart::Arg(index)] = split_args(text)?.as_slice()
    {
        return Ok(Markup::Arg(*index));
    }
    Ok(Markup::Text(text.to_string()))
}
