//! Render arguments: values, the two accepted external forms and the
//! caller-supplied transform.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::interpolate::MAX_PLACEHOLDER;
use crate::error::ArgError;
use crate::markup::{
    Markup,
    Node,
};

/// A single render argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ArgValue {
    /// Missing argument. Renders as the empty string.
    #[default]
    Absent,
    Text(String),
    Markup(Markup),
}

/// Shared fallback for placeholders beyond the supplied arguments.
static ABSENT: ArgValue = ArgValue::Absent;

impl ArgValue {
    /// String form used by string templates.
    ///
    /// Markup values contribute their text content.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Absent => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Markup(markup) => Cow::Owned(markup.text_content()),
        }
    }

    /// Tree form used when substituting into markup.
    #[must_use]
    pub fn to_markup(&self) -> Markup {
        match self {
            Self::Absent => Markup::Text(String::new()),
            Self::Text(text) => Markup::Text(text.clone()),
            Self::Markup(markup) => markup.clone(),
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<&str> for ArgValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Markup> for ArgValue {
    fn from(markup: Markup) -> Self {
        Self::Markup(markup)
    }
}

impl From<Node> for ArgValue {
    fn from(node: Node) -> Self {
        Self::Markup(Markup::Node(node))
    }
}

/// Returns the argument at a 0-based index, or [`ArgValue::Absent`].
#[must_use]
pub fn arg_at(args: &[ArgValue], index: usize) -> &ArgValue {
    args.get(index).unwrap_or(&ABSENT)
}

/// The two argument forms accepted by render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    /// Ordered, 0-indexed values.
    List(Vec<ArgValue>),
    /// 1-based keys, as written in placeholders.
    Map(BTreeMap<i64, ArgValue>),
}

impl Args {
    /// Normalizes either form into a dense list.
    pub fn into_list(self) -> Result<Vec<ArgValue>, ArgError> {
        match self {
            Self::List(list) => Ok(list),
            Self::Map(map) => normalize_arg_map(map),
        }
    }
}

impl From<Vec<ArgValue>> for Args {
    fn from(list: Vec<ArgValue>) -> Self {
        Self::List(list)
    }
}

impl From<BTreeMap<i64, ArgValue>> for Args {
    fn from(map: BTreeMap<i64, ArgValue>) -> Self {
        Self::Map(map)
    }
}

/// Builds a dense argument list from a 1-based map.
///
/// The list is sized to the largest key; gaps become [`ArgValue::Absent`].
/// Keys above [`MAX_PLACEHOLDER`] can never be referenced and are dropped.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use i18n_render::render::args::{ArgValue, normalize_arg_map};
///
/// let map = BTreeMap::from([(1, ArgValue::from("a")), (3, ArgValue::from("c"))]);
/// let list = normalize_arg_map(map).unwrap();
/// assert_eq!(list, vec![ArgValue::from("a"), ArgValue::Absent, ArgValue::from("c")]);
/// ```
pub fn normalize_arg_map(map: BTreeMap<i64, ArgValue>) -> Result<Vec<ArgValue>, ArgError> {
    if let Some(&smallest) = map.keys().next()
        && smallest < 1
    {
        return Err(ArgError::NonPositiveKey(smallest));
    }

    let Some(&largest) = map.keys().next_back() else {
        return Ok(Vec::new());
    };
    let largest = usize::try_from(largest).unwrap_or(usize::MAX);
    if largest > MAX_PLACEHOLDER {
        tracing::debug!("Ignoring argument keys above {} (largest: {})", MAX_PLACEHOLDER, largest);
    }
    let len = largest.min(MAX_PLACEHOLDER);

    let mut list = vec![ArgValue::Absent; len];
    for (key, value) in map {
        let slot = usize::try_from(key - 1).ok().and_then(|index| list.get_mut(index));
        if let Some(slot) = slot {
            *slot = value;
        }
    }
    Ok(list)
}

/// Caller-supplied mapping applied to every argument before it is rendered.
///
/// The default is the identity.
#[derive(Clone, Default)]
pub struct ArgTransform(Option<Arc<dyn Fn(&ArgValue) -> ArgValue + Send + Sync>>);

impl ArgTransform {
    #[must_use]
    pub fn new(transform: impl Fn(&ArgValue) -> ArgValue + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(transform)))
    }

    #[must_use]
    pub const fn identity() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn apply<'a>(&self, value: &'a ArgValue) -> Cow<'a, ArgValue> {
        self.0.as_ref().map_or(Cow::Borrowed(value), |transform| Cow::Owned(transform(value)))
    }
}

impl fmt::Debug for ArgTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.0.is_some() { "custom" } else { "identity" };
        write!(f, "ArgTransform({kind})")
    }
}
