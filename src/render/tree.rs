//! Recursive markup tree transformations.
//!
//! Each operation walks text leaves in order and leaves the rest of the
//! tree's shape untouched.

use crate::error::CompileError;
use crate::markup::{
    Attrs,
    Markup,
    Node,
    Tree,
};
use crate::render::interpolate::{
    ArgPart,
    split_args,
};
use crate::render::style::Segment;

/// Replaces placeholders inside text leaves with argument leaves.
///
/// `["Hi %1!"]` becomes `["Hi ", Arg(0), "!"]`; the pieces are spliced into
/// the parent's children. Attribute values that are exactly one placeholder
/// become argument leaves and literal-only values have their escapes removed.
/// Values mixing text and placeholders are kept as written.
pub fn explode_args_in_strings(children: Vec<Markup>) -> Result<Vec<Markup>, CompileError> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Markup::Text(text) => {
                out.extend(split_args(&text)?.into_iter().map(|part| match part {
                    ArgPart::Text(text) => Markup::Text(text),
                    ArgPart::Arg(index) => Markup::Arg(index),
                }));
            }
            Markup::Arg(_) => out.push(child),
            Markup::Node(node) => out.push(Markup::Node(explode_args_in_node(node)?)),
        }
    }
    Ok(out)
}

/// Applies [`explode_args_in_strings`] to a node's attributes and children.
pub fn explode_args_in_node(node: Node) -> Result<Node, CompileError> {
    let attrs = node.attrs.map(explode_args_in_attrs).transpose()?;
    let children = explode_args_in_strings(node.children)?;
    Ok(Node { tag: node.tag, attrs, children })
}

/// See [`explode_args_in_strings`].
fn explode_args_in_attrs(attrs: Attrs) -> Result<Attrs, CompileError> {
    attrs
        .into_iter()
        .map(|(name, value)| -> Result<(String, Markup), CompileError> {
            let value = match value {
                Markup::Text(text) => {
                    let parts = split_args(&text)?;
                    match parts.as_slice() {
                        [ArgPart::Arg(index)] => Markup::Arg(*index),
                        _ if parts.iter().all(|part| matches!(part, ArgPart::Text(_))) => {
                            Markup::Text(
                                parts
                                    .into_iter()
                                    .filter_map(|part| match part {
                                        ArgPart::Text(text) => Some(text),
                                        ArgPart::Arg(_) => None,
                                    })
                                    .collect(),
                            )
                        }
                        _ => {
                            tracing::debug!("Attribute '{}' keeps its placeholders as text", name);
                            Markup::Text(text)
                        }
                    }
                }
                other => other,
            };
            Ok((name, value))
        })
        .collect()
}

/// Replaces every text leaf with the styled segments `splitter` finds in it.
///
/// Styled segments become child nodes; plain segments stay text.
#[must_use]
pub fn explode_styles_in_strings(
    children: Vec<Markup>,
    splitter: &dyn Fn(&str) -> Vec<Segment>,
) -> Vec<Markup> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Markup::Text(text) => out.extend(segments_to_markup(splitter(&text))),
            Markup::Arg(_) => out.push(child),
            Markup::Node(node) => {
                let children = explode_styles_in_strings(node.children, splitter);
                out.push(Markup::Node(Node { children, ..node }));
            }
        }
    }
    out
}

/// Converts splitter output into markup children.
pub fn segments_to_markup(segments: Vec<Segment>) -> impl Iterator<Item = Markup> {
    segments.into_iter().map(|segment| match segment {
        Segment::Plain(text) => Markup::Text(text),
        Segment::Styled(tag, content) => Markup::Node(tag.to_node(content)),
    })
}

/// Gives an untagged tree the default root tag.
#[must_use]
pub fn to_default_tagged(tree: Tree, default_tag: &str) -> Node {
    match tree {
        Tree::Tagged(node) => node,
        Tree::Untagged(children) => Node::new(default_tag, children),
    }
}

/// HTML-escapes every text leaf, including attribute values.
///
/// Not idempotent: escaping `&amp;` again yields `&amp;amp;`.
#[must_use]
pub fn escape_html(children: Vec<Markup>) -> Vec<Markup> {
    children.into_iter().map(escape_markup).collect()
}

/// Escapes a node's attributes and children.
#[must_use]
pub fn escape_html_node(node: Node) -> Node {
    let attrs = node
        .attrs
        .map(|attrs| attrs.into_iter().map(|(name, value)| (name, escape_markup(value))).collect());
    Node { tag: node.tag, attrs, children: escape_html(node.children) }
}

/// Escapes a single markup value. See [`escape_html`].
pub(crate) fn escape_markup(markup: Markup) -> Markup {
    match markup {
        Markup::Text(text) => Markup::Text(escape_html_str(&text)),
        Markup::Arg(_) => markup,
        Markup::Node(node) => Markup::Node(escape_html_node(node)),
    }
}

/// Escapes `&`, `<`, `>` and `"`.
///
/// Characters are mapped in a single pass, so entities produced here are
/// never escaped again within the same call.
#[must_use]
pub fn escape_html_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
