//! Composite lookup keys.
//!
//! A key is the normalized locale followed by the resource path segments.
//! Every segment is written as `<byte length>:<segment>`, so segment
//! boundaries are unambiguous and two different paths never encode to the
//! same key.

/// Separator between nested key segments used when none is configured.
pub const DEFAULT_KEY_SEPARATOR: &str = ".";

/// Normalize a locale for lookup (trim, lowercase and replace `-` with `_`).
#[must_use]
pub fn normalize_locale(locale: &str) -> String {
    locale.trim().to_lowercase().replace('-', "_")
}

/// Splits a dictionary key, scope or resource id into path segments.
///
/// Empty segments are dropped, so `"a..b"` and `"a.b"` are the same path.
pub fn split_key<'a>(key: &'a str, separator: &'a str) -> impl Iterator<Item = &'a str> {
    key.split(separator).filter(|segment| !segment.is_empty())
}

/// Encodes a locale and path segments into a composite key.
#[must_use]
pub fn encode_key<'a>(locale: &str, segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut key = String::new();
    push_segment(&mut key, &normalize_locale(locale));
    for segment in segments {
        push_segment(&mut key, segment);
    }
    key
}

/// Appends one length-prefixed segment.
fn push_segment(key: &mut String, segment: &str) {
    key.push_str(&segment.len().to_string());
    key.push(':');
    key.push_str(segment);
}

/// Merges `(locale, scope, resid)` into a composite key.
///
/// The scope is a path prefix: `("en", Some("menu"), "open")` and
/// `("en", None, "menu.open")` address the same entry.
///
/// # Examples
/// ```
/// use i18n_render::dictionary::key::merge_key;
///
/// assert_eq!(merge_key("en-GB", Some("menu"), "open", "."), "5:en_gb4:menu4:open");
/// assert_eq!(merge_key("en-GB", None, "menu.open", "."), "5:en_gb4:menu4:open");
/// ```
#[must_use]
pub fn merge_key(locale: &str, scope: Option<&str>, resid: &str, separator: &str) -> String {
    let scope_segments = scope.into_iter().flat_map(|scope| split_key(scope, separator));
    encode_key(locale, scope_segments.chain(split_key(resid, separator)))
}
