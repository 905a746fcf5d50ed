//! Positional argument interpolation.
//!
//! Placeholders are written `%1`..`%13`. A backtick escapes a literal
//! percent (`` `% ``). Templates are parsed once into renderers that are
//! reused for every render.

use crate::error::CompileError;
use crate::markup::{
    Attrs,
    Markup,
    Node,
};
use crate::render::args::{
    ArgTransform,
    ArgValue,
    arg_at,
};

/// Highest placeholder number accepted (`%13`).
pub const MAX_PLACEHOLDER: usize = 13;

/// A piece of a template string after placeholder parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgPart {
    Text(String),
    /// 0-based argument index.
    Arg(usize),
}

/// Splits a template string into literal text and placeholders.
///
/// Adjacent literal text is merged, so parts alternate between text and
/// arguments except for consecutive placeholders.
///
/// # Examples
/// ```
/// use i18n_render::render::interpolate::{ArgPart, split_args};
///
/// let parts = split_args("Hi %1, 100`% sure").unwrap();
/// assert_eq!(
///     parts,
///     vec![
///         ArgPart::Text("Hi ".to_string()),
///         ArgPart::Arg(0),
///         ArgPart::Text(", 100% sure".to_string()),
///     ]
/// );
/// ```
pub fn split_args(template: &str) -> Result<Vec<ArgPart>, CompileError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '`' if chars.peek() == Some(&'%') => {
                chars.next();
                literal.push('%');
            }
            '%' if chars.peek().is_some_and(char::is_ascii_digit) => {
                let mut digits = String::new();
                while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                    digits.push(digit);
                }
                let index = placeholder_index(template, &digits)?;
                if !literal.is_empty() {
                    parts.push(ArgPart::Text(std::mem::take(&mut literal)));
                }
                parts.push(ArgPart::Arg(index));
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        parts.push(ArgPart::Text(literal));
    }
    Ok(parts)
}

/// Validates the digits after `%` and returns the 0-based index.
fn placeholder_index(template: &str, digits: &str) -> Result<usize, CompileError> {
    if digits.starts_with('0') {
        return Err(CompileError::InvalidPlaceholder { template: template.to_string() });
    }
    let number = digits.parse::<usize>().unwrap_or(usize::MAX);
    if number > MAX_PLACEHOLDER {
        return Err(CompileError::PlaceholderOutOfRange {
            template: template.to_string(),
            index: number,
        });
    }
    Ok(number - 1)
}

/// Shape of a compiled string template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StringShape {
    /// No placeholders.
    Constant(String),
    /// The whole template is one placeholder.
    Single(usize),
    /// Literal text mixed with placeholders.
    Concat(Vec<ArgPart>),
}

/// A string template compiled for repeated rendering.
#[derive(Debug, Clone)]
pub struct StringRenderer {
    /// Parsed template.
    shape: StringShape,
    /// Applied to each argument before stringifying.
    transform: ArgTransform,
}

/// Compiles a template string.
///
/// Invalid placeholders are reported here, never at render time.
pub fn compile_string(
    template: &str,
    transform: ArgTransform,
) -> Result<StringRenderer, CompileError> {
    let parts = split_args(template)?;
    Ok(StringRenderer::from_parts(parts, transform))
}

impl StringRenderer {
    /// Picks the cheapest shape able to render `parts`.
    fn from_parts(parts: Vec<ArgPart>, transform: ArgTransform) -> Self {
        let shape = if parts.iter().all(|part| matches!(part, ArgPart::Text(_))) {
            StringShape::Constant(
                parts
                    .into_iter()
                    .filter_map(|part| match part {
                        ArgPart::Text(text) => Some(text),
                        ArgPart::Arg(_) => None,
                    })
                    .collect(),
            )
        } else if let [ArgPart::Arg(index)] = parts.as_slice() {
            StringShape::Single(*index)
        } else {
            StringShape::Concat(parts)
        };
        Self { shape, transform }
    }

    /// Renders with the given arguments. Missing arguments render empty.
    #[must_use]
    pub fn render(&self, args: &[ArgValue]) -> String {
        match &self.shape {
            StringShape::Constant(text) => text.clone(),
            StringShape::Single(index) => {
                self.transform.apply(arg_at(args, *index)).to_text().into_owned()
            }
            StringShape::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        ArgPart::Text(text) => out.push_str(text),
                        ArgPart::Arg(index) => {
                            out.push_str(&self.transform.apply(arg_at(args, *index)).to_text());
                        }
                    }
                }
                out
            }
        }
    }

    /// True when rendering ignores its arguments.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self.shape, StringShape::Constant(_))
    }
}

/// A markup tree compiled for repeated rendering.
#[derive(Debug, Clone)]
pub struct TreeRenderer {
    /// Tree with `Markup::Arg` leaves still in place.
    root: Node,
    /// Whether any argument leaf exists; otherwise rendering is a clone.
    has_args: bool,
    /// Applied to each argument before substitution.
    transform: ArgTransform,
}

/// Compiles a markup tree whose placeholders are already `Markup::Arg` leaves.
#[must_use]
pub fn compile_tree(root: Node, transform: ArgTransform) -> TreeRenderer {
    let has_args = node_has_args(&root);
    TreeRenderer { root, has_args, transform }
}

impl TreeRenderer {
    /// Rebuilds the tree with arguments substituted at their leaf positions.
    #[must_use]
    pub fn render(&self, args: &[ArgValue]) -> Node {
        if self.has_args {
            substitute_node(&self.root, args, &self.transform)
        } else {
            self.root.clone()
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }
}

/// Checks a node, its attributes and its descendants for argument leaves.
fn node_has_args(node: &Node) -> bool {
    node.attrs.as_ref().is_some_and(|attrs| attrs.values().any(markup_has_args))
        || node.children.iter().any(markup_has_args)
}

/// See [`node_has_args`].
fn markup_has_args(markup: &Markup) -> bool {
    match markup {
        Markup::Text(_) => false,
        Markup::Arg(_) => true,
        Markup::Node(node) => node_has_args(node),
    }
}

/// Copies `node`, replacing every argument leaf.
fn substitute_node(node: &Node, args: &[ArgValue], transform: &ArgTransform) -> Node {
    let attrs = node.attrs.as_ref().map(|attrs| {
        attrs
            .iter()
            .map(|(name, value)| (name.clone(), substitute(value, args, transform)))
            .collect::<Attrs>()
    });
    let children = node.children.iter().map(|child| substitute(child, args, transform)).collect();
    Node { tag: node.tag.clone(), attrs, children }
}

/// See [`substitute_node`].
fn substitute(markup: &Markup, args: &[ArgValue], transform: &ArgTransform) -> Markup {
    match markup {
        Markup::Text(text) => Markup::Text(text.clone()),
        Markup::Arg(index) => transform.apply(arg_at(args, *index)).to_markup(),
        Markup::Node(node) => Markup::Node(substitute_node(node, args, transform)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    fn args(values: &[&str]) -> Vec<ArgValue> {
        values.iter().map(|value| ArgValue::from(*value)).collect()
    }

    #[rstest]
    #[case::no_placeholder("Hello", vec![ArgPart::Text("Hello".to_string())])]
    #[case::only_placeholder("%1", vec![ArgPart::Arg(0)])]
    #[case::two_digits("%12!", vec![ArgPart::Arg(11), ArgPart::Text("!".to_string())])]
    #[case::highest("%13", vec![ArgPart::Arg(12)])]
    #[case::adjacent("%2%1", vec![ArgPart::Arg(1), ArgPart::Arg(0)])]
    #[case::escaped_percent("50`%", vec![ArgPart::Text("50%".to_string())])]
    #[case::escaped_before_digit("`%1", vec![ArgPart::Text("%1".to_string())])]
    #[case::bare_percent("100 % off", vec![ArgPart::Text("100 % off".to_string())])]
    #[case::backtick_alone("a`b", vec![ArgPart::Text("a`b".to_string())])]
    #[case::empty("", vec![])]
    fn test_split_args(#[case] template: &str, #[case] expected: Vec<ArgPart>) {
        assert_eq!(split_args(template).unwrap(), expected);
    }

    #[rstest]
    #[case::zero("Count: %0")]
    #[case::zero_led("%01")]
    fn split_args_rejects_zero(#[case] template: &str) {
        let result = split_args(template);

        assert!(matches!(
            result,
            Err(CompileError::InvalidPlaceholder { template: ref t }) if t == template
        ));
    }

    #[rstest]
    fn split_args_rejects_out_of_range() {
        let result = split_args("%14");

        assert!(matches!(result, Err(CompileError::PlaceholderOutOfRange { index: 14, .. })));
    }

    #[rstest]
    fn compile_string_zero_placeholders_is_constant() {
        let renderer = compile_string("Hello", ArgTransform::identity()).unwrap();

        assert_that!(renderer.is_constant(), eq(true));
        assert_that!(renderer.render(&args(&["ignored"])), eq("Hello"));
    }

    #[rstest]
    fn compile_string_single_placeholder_returns_argument() {
        let renderer = compile_string("%2", ArgTransform::identity()).unwrap();

        assert_that!(renderer.render(&args(&["a", "b"])), eq("b"));
    }

    #[rstest]
    fn compile_string_reproduces_literals_around_arguments() {
        let renderer =
            compile_string("Hi %1, you have %2 new %1 messages", ArgTransform::identity()).unwrap();

        assert_that!(
            renderer.render(&args(&["Ann", "3"])),
            eq("Hi Ann, you have 3 new Ann messages")
        );
    }

    #[rstest]
    fn compile_string_tolerates_missing_arguments() {
        let renderer = compile_string("[%1|%3]", ArgTransform::identity()).unwrap();

        assert_that!(renderer.render(&args(&["x"])), eq("[x|]"));
    }

    #[rstest]
    fn compile_string_applies_transform() {
        let transform = ArgTransform::new(|value| ArgValue::Text(format!("<{}>", value.to_text())));
        let renderer = compile_string("a %1 b", transform).unwrap();

        assert_that!(renderer.render(&args(&["x"])), eq("a <x> b"));
        assert_that!(renderer.render(&[]), eq("a <> b"));
    }

    #[rstest]
    fn compile_string_fails_at_compile_time_for_zero() {
        assert_that!(compile_string("%0", ArgTransform::identity()), err(anything()));
    }

    #[rstest]
    fn compile_tree_substitutes_children_and_attributes() {
        let mut attrs = Attrs::new();
        attrs.insert("title".to_string(), Markup::Arg(1));
        let root = Node::with_attrs(
            "p",
            attrs,
            vec![
                Markup::text("Hi "),
                Node::new("strong", vec![Markup::Arg(0)]).into(),
                Markup::text("!"),
            ],
        );

        let rendered = compile_tree(root, ArgTransform::identity()).render(&args(&["Ann", "t"]));

        let mut expected_attrs = Attrs::new();
        expected_attrs.insert("title".to_string(), Markup::text("t"));
        let expected = Node::with_attrs(
            "p",
            expected_attrs,
            vec![
                Markup::text("Hi "),
                Node::new("strong", vec![Markup::text("Ann")]).into(),
                Markup::text("!"),
            ],
        );
        assert_that!(rendered, eq(&expected));
    }

    #[rstest]
    fn compile_tree_splices_markup_arguments() {
        let root = Node::new("p", vec![Markup::text("See "), Markup::Arg(0)]);
        let link = Node::new("a", vec![Markup::text("docs")]);

        let rendered =
            compile_tree(root, ArgTransform::identity()).render(&[ArgValue::from(link.clone())]);

        assert_that!(
            rendered.children,
            elements_are![eq(&Markup::text("See ")), eq(&Markup::Node(link))]
        );
    }

    #[rstest]
    fn compile_tree_without_args_renders_constant() {
        let root = Node::new("p", vec![Markup::text("static")]);

        let renderer = compile_tree(root.clone(), ArgTransform::identity());

        assert_that!(renderer.render(&[]), eq(&root));
        assert_that!(renderer.root(), eq(&root));
    }
}
