//! Template compilation and rendering.
//!
//! A template is compiled once into a [`CompiledTemplate`] and rendered many
//! times. Compilation runs the whole pipeline up front:
//!
//! 1. inline styling (`**bold**`, `*em*`, …) becomes child nodes
//! 2. text leaves are HTML-escaped (optional; arguments are escaped when
//!    substituted)
//! 3. placeholders become argument leaves
//! 4. untagged trees get the default tag
//!
//! Text templates without styling stay strings and render to strings.

pub mod args;
pub mod interpolate;
pub mod style;
pub mod tree;

use crate::error::{
    ArgError,
    CompileError,
};
use crate::markup::{
    Markup,
    Node,
    Template,
};
use args::{
    ArgTransform,
    ArgValue,
    Args,
};
use interpolate::{
    StringRenderer,
    TreeRenderer,
    compile_string,
    compile_tree,
};
use style::{
    Segment,
    split_styles,
};

/// Default root tag for untagged trees and styled text.
pub const DEFAULT_TAG: &str = "span";

/// Options applied when compiling templates.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Root tag given to untagged trees and to styled text templates.
    pub default_tag: String,
    /// Escape `&`, `<`, `>` and `"` in template text and in every substituted
    /// argument, after `transform` has run.
    pub escape_html: bool,
    /// Parse inline markup in template text.
    pub styling: bool,
    pub transform: ArgTransform,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_tag: DEFAULT_TAG.to_string(),
            escape_html: false,
            styling: true,
            transform: ArgTransform::identity(),
        }
    }
}

/// Output of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    Markup(Node),
}

impl Rendered {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Markup(_) => None,
        }
    }

    #[must_use]
    pub const fn as_markup(&self) -> Option<&Node> {
        match self {
            Self::Text(_) => None,
            Self::Markup(node) => Some(node),
        }
    }

    /// Text with all markup stripped.
    #[must_use]
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Markup(node) => Markup::Node(node.clone()).text_content(),
        }
    }
}

/// A template ready to render.
#[derive(Debug, Clone)]
pub enum CompiledTemplate {
    Text(StringRenderer),
    Markup(TreeRenderer),
}

impl CompiledTemplate {
    /// Renders with 0-indexed arguments. Missing arguments render empty.
    #[must_use]
    pub fn render(&self, args: &[ArgValue]) -> Rendered {
        match self {
            Self::Text(renderer) => Rendered::Text(renderer.render(args)),
            Self::Markup(renderer) => Rendered::Markup(renderer.render(args)),
        }
    }

    /// Renders with either argument form.
    pub fn render_args(&self, args: impl Into<Args>) -> Result<Rendered, ArgError> {
        let list = args.into().into_list()?;
        Ok(self.render(&list))
    }
}

/// Compiles templates with a fixed set of [`RenderOptions`].
#[derive(Debug, Clone, Default)]
pub struct TemplateCompiler {
    /// Options shared by every compiled template.
    options: RenderOptions,
}

impl TemplateCompiler {
    #[must_use]
    pub const fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Compiles a template.
    ///
    /// Invalid placeholders fail here, never at render time.
    pub fn compile(&self, template: &Template) -> Result<CompiledTemplate, CompileError> {
        match template {
            Template::Text(text) => self.compile_text(text),
            Template::Tree(markup_tree) => {
                let root =
                    tree::to_default_tagged(markup_tree.clone(), &self.options.default_tag);
                self.compile_node(root, self.options.styling)
            }
        }
    }

    /// Compiles a text template, which only becomes markup when styled.
    fn compile_text(&self, text: &str) -> Result<CompiledTemplate, CompileError> {
        let segments = if self.options.styling {
            split_styles(text)
        } else {
            vec![Segment::Plain(text.to_string())]
        };

        if segments.iter().all(|segment| matches!(segment, Segment::Plain(_))) {
            let plain: String = segments
                .into_iter()
                .filter_map(|segment| match segment {
                    Segment::Plain(text) => Some(text),
                    Segment::Styled(..) => None,
                })
                .collect();
            let plain =
                if self.options.escape_html { tree::escape_html_str(&plain) } else { plain };
            return compile_string(&plain, self.arg_transform()).map(CompiledTemplate::Text);
        }

        let children = tree::segments_to_markup(segments).collect();
        self.compile_node(Node::new(self.options.default_tag.clone(), children), false)
    }

    /// Runs the tree pipeline on a rooted node.
    fn compile_node(&self, root: Node, style: bool) -> Result<CompiledTemplate, CompileError> {
        let root = if style {
            let children = tree::explode_styles_in_strings(root.children, &split_styles);
            Node { children, ..root }
        } else {
            root
        };
        let root = if self.options.escape_html { tree::escape_html_node(root) } else { root };
        let root = tree::explode_args_in_node(root)?;
        Ok(CompiledTemplate::Markup(compile_tree(root, self.arg_transform())))
    }

    /// The caller's transform, followed by escaping when enabled.
    fn arg_transform(&self) -> ArgTransform {
        if !self.options.escape_html {
            return self.options.transform.clone();
        }
        let transform = self.options.transform.clone();
        ArgTransform::new(move |value| match transform.apply(value).into_owned() {
            ArgValue::Absent => ArgValue::Absent,
            ArgValue::Text(text) => ArgValue::Text(tree::escape_html_str(&text)),
            ArgValue::Markup(markup) => ArgValue::Markup(tree::escape_markup(markup)),
        })
    }
}
