//! Flattening a preprocessed dictionary into composite-key entries.

use std::collections::HashMap;

use serde_json::{
    Map,
    Value,
};

use super::key::{
    encode_key,
    split_key,
};
use crate::error::CompileError;
use crate::markup::Template;

/// Flattens `locale → nested maps → template` into one entry per template.
///
/// Nested maps and keys containing `separator` both extend the path, so
/// `{"a": {"b": x}}` and `{"a.b": x}` produce the same key. When two entries
/// end up with the same key, the one visited last wins.
///
/// # Errors
/// Returns [`CompileError::MalformedDictionary`] if the root or a locale value
/// is not an object, or if a key has no path segments, and
/// [`CompileError::MalformedTemplate`] for leaves that are not templates.
pub fn flatten(
    dictionary: &Value,
    separator: &str,
) -> Result<HashMap<String, Template>, CompileError> {
    let Value::Object(locales) = dictionary else {
        return Err(malformed("", "the dictionary must be an object keyed by locale"));
    };

    let mut result = HashMap::new();
    for (locale, entries) in locales {
        let Value::Object(entries) = entries else {
            return Err(malformed(locale, "locale entries must be an object"));
        };
        let mut flattener =
            Flattener { locale, separator, prefix: Vec::new(), result: &mut result };
        flattener.flatten_map(entries)?;
    }
    Ok(result)
}

/// Builds a `MalformedDictionary` error.
fn malformed(path: &str, message: &str) -> CompileError {
    CompileError::MalformedDictionary { path: path.to_string(), message: message.to_string() }
}

/// Walks the entries of one locale.
struct Flattener<'a> {
    /// Locale key as written in the dictionary.
    locale: &'a str,
    /// Separator that splits keys into path segments.
    separator: &'a str,
    /// Path segments of the map being visited.
    prefix: Vec<&'a str>,
    /// Entries collected so far, across locales.
    result: &'a mut HashMap<String, Template>,
}

impl<'a> Flattener<'a> {
    /// Visits every entry of `map`, recursing into nested maps.
    fn flatten_map(&mut self, map: &'a Map<String, Value>) -> Result<(), CompileError> {
        for (key, value) in map {
            let depth = self.prefix.len();
            self.prefix.extend(split_key(key, self.separator));
            if self.prefix.len() == depth {
                return Err(malformed(&self.display_path(key), "empty key"));
            }

            match value {
                Value::Object(nested) => self.flatten_map(nested)?,
                _ => self.insert_leaf(value)?,
            }
            self.prefix.truncate(depth);
        }
        Ok(())
    }

    /// Parses the leaf at the current path and stores it.
    fn insert_leaf(&mut self, value: &Value) -> Result<(), CompileError> {
        let path = self.display_path("");
        let template = Template::from_json(value, &path)?;
        let key = encode_key(self.locale, self.prefix.iter().copied());
        if self.result.insert(key, template).is_some() {
            tracing::warn!("Duplicate dictionary entry '{}'; the later one wins", path);
        }
        Ok(())
    }

    /// Human-readable path for messages, e.g. `en.menu.open`.
    fn display_path(&self, last: &str) -> String {
        std::iter::once(self.locale)
            .chain(self.prefix.iter().copied())
            .chain((!last.is_empty()).then_some(last))
            .collect::<Vec<_>>()
            .join(self.separator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;
    use crate::dictionary::key::merge_key;
    use crate::markup::{
        Markup,
        Node,
        Tree,
    };

    fn text(template: &str) -> Template {
        Template::Text(template.to_string())
    }

    #[rstest]
    fn flatten_nested_maps() {
        let dict = json!({
            "en": {"menu": {"open": "Open", "recent": {"clear": "Clear"}}, "title": "App"},
            "fr": {"title": "Appli"}
        });

        let entries = flatten(&dict, ".").unwrap();

        assert_that!(entries.len(), eq(4));
        assert_that!(
            entries.get(&merge_key("en", Some("menu"), "open", ".")),
            some(eq(&text("Open")))
        );
        assert_that!(
            entries.get(&merge_key("en", Some("menu.recent"), "clear", ".")),
            some(eq(&text("Clear")))
        );
        assert_that!(entries.get(&merge_key("fr", None, "title", ".")), some(eq(&text("Appli"))));
    }

    #[rstest]
    fn flatten_splits_keys_on_separator() {
        let dict = json!({"en": {"menu.open": "Open", "a/b": "AB"}});

        let entries = flatten(&dict, ".").unwrap();

        assert_that!(
            entries.get(&merge_key("en", Some("menu"), "open", ".")),
            some(eq(&text("Open")))
        );
        assert_that!(entries.get(&merge_key("en", None, "a/b", ".")), some(eq(&text("AB"))));
    }

    #[rstest]
    fn flatten_uses_configured_separator() {
        let dict = json!({"en": {"menu": {"open": "Open"}, "a.b": "AB"}});

        let entries = flatten(&dict, "/").unwrap();

        assert_that!(
            entries.get(&merge_key("en", Some("menu"), "open", "/")),
            some(eq(&text("Open")))
        );
        assert_that!(entries.get(&merge_key("en", None, "a.b", "/")), some(eq(&text("AB"))));
    }

    #[rstest]
    fn flatten_parses_tree_leaves() {
        let dict = json!({"en": {"link": [":a", {"href": "%1"}, "%2"]}});

        let entries = flatten(&dict, ".").unwrap();

        let attrs = [("href".to_string(), Markup::Arg(0))].into();
        let expected: Template =
            Tree::Tagged(Node::with_attrs("a", attrs, vec![Markup::Arg(1)])).into();
        assert_that!(entries.get(&merge_key("en", None, "link", ".")), some(eq(&expected)));
    }

    #[rstest]
    fn flatten_stringifies_numbers_and_booleans() {
        let dict = json!({"en": {"count": 3, "flag": true}});

        let entries = flatten(&dict, ".").unwrap();

        assert_that!(entries.get(&merge_key("en", None, "count", ".")), some(eq(&text("3"))));
        assert_that!(entries.get(&merge_key("en", None, "flag", ".")), some(eq(&text("true"))));
    }

    #[rstest]
    #[case::root_not_object(json!(["en"]), "")]
    #[case::locale_not_object(json!({"en": "Hello"}), "en")]
    #[case::empty_key(json!({"en": {"menu": {"..": "x"}}}), "en.menu..")]
    fn flatten_rejects_malformed_shapes(#[case] dict: Value, #[case] expected_path: &str) {
        let result = flatten(&dict, ".");

        assert!(
            matches!(
                result,
                Err(CompileError::MalformedDictionary { ref path, .. }) if path == expected_path
            ),
            "unexpected result: {result:?}"
        );
    }

    #[rstest]
    fn flatten_rejects_null_leaf_with_path() {
        let dict = json!({"en": {"menu": {"open": null}}});

        let result = flatten(&dict, ".");

        assert!(matches!(
            result,
            Err(CompileError::MalformedTemplate { ref path, .. }) if path == "en.menu.open"
        ));
    }

    #[rstest]
    fn flatten_accepts_empty_locale() {
        let entries = flatten(&json!({"en": {}}), ".").unwrap();

        assert_that!(entries.is_empty(), eq(true));
    }
}
