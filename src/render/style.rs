//! Conservative inline markup.
//!
//! | Markup       | Tag                              |
//! |--------------|----------------------------------|
//! | `**x**`      | `strong`                         |
//! | `__x__`      | `b`                              |
//! | `*x*`        | `em`                             |
//! | `_x_`        | `i`                              |
//! | `~~x~~`      | `mark`                           |
//! | `~1~x~1~`    | `span` with class `l10n-custom-1` |
//! | `~2~x~2~`    | `span` with class `l10n-custom-2` |
//!
//! Matches are non-greedy, never span a line break and are not nested.
//! A backtick before a delimiter character (`` `* ``, `` `_ ``, `` `~ ``)
//! keeps it literal.

use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};

use crate::markup::{
    Attrs,
    Markup,
    Node,
};

/// Escaped delimiters and the private-use characters that stand in for them
/// while matching.
const PROTECTIONS: [(&str, char, char); 3] =
    [("`*", '\u{E001}', '*'), ("`_", '\u{E002}', '_'), ("`~", '\u{E003}', '~')];

/// Surrounds the index of an extracted match.
const TOKEN_FENCE: char = '\u{E000}';

/// Style rules in precedence order.
#[allow(clippy::unwrap_used)]
static RULES: LazyLock<Vec<(Regex, StyleTag)>> = LazyLock::new(|| {
    [
        (r"\*\*(.+?)\*\*", StyleTag::Strong),
        (r"__(.+?)__", StyleTag::Bold),
        (r"\*(.+?)\*", StyleTag::Emphasis),
        (r"_(.+?)_", StyleTag::Italic),
        (r"~~(.+?)~~", StyleTag::Mark),
        (r"~1~(.+?)~1~", StyleTag::Custom1),
        (r"~2~(.+?)~2~", StyleTag::Custom2),
    ]
    .into_iter()
    .map(|(pattern, tag)| (Regex::new(pattern).unwrap(), tag))
    .collect()
});

/// Placeholder left in the text for each extracted match.
#[allow(clippy::unwrap_used)]
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\x{E000}").unwrap());

/// Kind of styling applied to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Strong,
    Bold,
    Emphasis,
    Italic,
    Mark,
    Custom1,
    Custom2,
}

impl StyleTag {
    /// Element name of the node this style produces.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Bold => "b",
            Self::Emphasis => "em",
            Self::Italic => "i",
            Self::Mark => "mark",
            Self::Custom1 | Self::Custom2 => "span",
        }
    }

    /// Class attribute of the custom spans.
    #[must_use]
    pub const fn class(self) -> Option<&'static str> {
        match self {
            Self::Custom1 => Some("l10n-custom-1"),
            Self::Custom2 => Some("l10n-custom-2"),
            _ => None,
        }
    }

    /// Wraps `content` in the node for this style.
    #[must_use]
    pub fn to_node(self, content: String) -> Node {
        let children = vec![Markup::Text(content)];
        match self.class() {
            Some(class) => {
                let attrs = Attrs::from([("class".to_string(), Markup::text(class))]);
                Node::with_attrs(self.tag(), attrs, children)
            }
            None => Node::new(self.tag(), children),
        }
    }
}

/// A piece of styled text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Styled(StyleTag, String),
}

/// A match replaced by a token during splitting.
#[derive(Debug)]
struct Extracted {
    /// Style the delimiters stand for.
    tag: StyleTag,
    /// The matched text, delimiters included.
    raw: String,
    /// The text between the delimiters.
    content: String,
}

/// Splits `text` into plain and styled segments in original order.
///
/// Empty plain pieces are omitted, so an empty input yields no segments.
///
/// # Examples
/// ```
/// use i18n_render::render::style::{Segment, StyleTag, split_styles};
///
/// assert_eq!(
///     split_styles("a *b* c"),
///     vec![
///         Segment::Plain("a ".to_string()),
///         Segment::Styled(StyleTag::Emphasis, "b".to_string()),
///         Segment::Plain(" c".to_string()),
///     ]
/// );
/// ```
#[must_use]
pub fn split_styles(text: &str) -> Vec<Segment> {
    if !text.contains(['*', '_', '~']) {
        return plain_segment(text.to_string()).into_iter().collect();
    }

    let mut working = protect(text);
    let mut extracted: Vec<Extracted> = Vec::new();
    for (regex, tag) in RULES.iter() {
        working = regex
            .replace_all(&working, |caps: &Captures<'_>| {
                let index = extracted.len();
                extracted.push(Extracted {
                    tag: *tag,
                    raw: caps.get(0).map_or_else(String::new, |m| m.as_str().to_string()),
                    content: caps.get(1).map_or_else(String::new, |m| m.as_str().to_string()),
                });
                format!("{TOKEN_FENCE}{index}{TOKEN_FENCE}")
            })
            .into_owned();
    }

    let mut segments = Vec::new();
    let mut last = 0;
    for caps in TOKEN.captures_iter(&working) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if let Some(before) = working.get(last..whole.start()) {
            segments.extend(plain_segment(unprotect(before)));
        }
        let found = caps
            .get(1)
            .and_then(|digits| digits.as_str().parse::<usize>().ok())
            .and_then(|index| extracted.get(index));
        if let Some(found) = found {
            let content = unprotect(&expand_tokens(&found.content, &extracted));
            segments.push(Segment::Styled(found.tag, content));
        }
        last = whole.end();
    }
    if let Some(rest) = working.get(last..) {
        segments.extend(plain_segment(unprotect(rest)));
    }
    segments
}

/// A plain segment, unless `text` is empty.
fn plain_segment(text: String) -> Option<Segment> {
    (!text.is_empty()).then_some(Segment::Plain(text))
}

/// Swaps escaped delimiters for their stand-ins.
fn protect(text: &str) -> String {
    PROTECTIONS.iter().fold(text.to_string(), |acc, (escaped, marker, _)| {
        acc.replace(escaped, &marker.to_string())
    })
}

/// Turns stand-ins back into literal delimiters.
fn unprotect(text: &str) -> String {
    text.chars()
        .map(|ch| {
            PROTECTIONS
                .iter()
                .find(|(_, marker, _)| *marker == ch)
                .map_or(ch, |(_, _, literal)| *literal)
        })
        .collect()
}

/// Replaces tokens inside matched content with the original matched text.
///
/// Content of a later rule may hold tokens of earlier rules; styling is not
/// applied to it, so it gets the raw text back.
fn expand_tokens(text: &str, extracted: &[Extracted]) -> String {
    TOKEN
        .replace_all(text, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|digits| digits.as_str().parse::<usize>().ok())
                .and_then(|index| extracted.get(index))
                .map_or_else(String::new, |inner| expand_tokens(&inner.raw, extracted))
        })
        .into_owned()
}
