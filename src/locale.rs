//! Locale fallback chains.

use std::collections::HashSet;

use crate::dictionary::key::normalize_locale;

/// Locale variants from most specific to most general,
/// e.g. `["en-GB-var1", "en-GB", "en"]`.
pub type LocaleChain = Vec<String>;

/// Separators between locale subtags.
const SUBTAG_SEPARATORS: [char; 2] = ['-', '_'];

/// Expands a locale into its fallback chain.
///
/// Each variant is a prefix of the input (original spelling kept) ending at a
/// subtag boundary. An empty or blank locale yields an empty chain.
///
/// # Examples
/// ```
/// use i18n_render::locale::expand_locale;
///
/// assert_eq!(expand_locale("en-GB-var1"), vec!["en-GB-var1", "en-GB", "en"]);
/// assert_eq!(expand_locale("pt_BR"), vec!["pt_BR", "pt"]);
/// assert_eq!(expand_locale("en"), vec!["en"]);
/// ```
#[must_use]
pub fn expand_locale(locale: &str) -> LocaleChain {
    let locale = locale.trim().trim_matches(SUBTAG_SEPARATORS);
    if locale.is_empty() {
        return Vec::new();
    }

    let mut chain: LocaleChain = locale
        .match_indices(SUBTAG_SEPARATORS)
        .filter_map(|(index, _)| locale.get(..index))
        .filter(|prefix| !prefix.ends_with(SUBTAG_SEPARATORS))
        .map(str::to_string)
        .collect();
    chain.push(locale.to_string());
    chain.reverse();
    chain
}

/// Expands several locales into chains, in input order.
///
/// A locale whose chain head (its most specific variant) already appears in
/// an earlier chain is dropped: `["fr-FR", "fr"]` yields only
/// `[["fr-FR", "fr"]]`, while `["en-US", "en-GB"]` keeps both chains.
/// Comparison ignores case and `-`/`_` differences.
#[must_use]
pub fn expand_locales<S: AsRef<str>>(locales: &[S]) -> Vec<LocaleChain> {
    let mut covered: HashSet<String> = HashSet::new();
    let mut chains = Vec::with_capacity(locales.len());

    for locale in locales {
        let chain = expand_locale(locale.as_ref());
        let Some(head) = chain.first() else {
            continue;
        };
        if covered.contains(&normalize_locale(head)) {
            tracing::debug!("Skipping locale '{}' already covered by an earlier chain", head);
            continue;
        }
        covered.extend(chain.iter().map(|variant| normalize_locale(variant)));
        chains.push(chain);
    }
    chains
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("en-GB-var1", vec!["en-GB-var1", "en-GB", "en"])]
    #[case("en", vec!["en"])]
    #[case("zh_Hant-TW", vec!["zh_Hant-TW", "zh_Hant", "zh"])]
    #[case(" de-DE ", vec!["de-DE", "de"])]
    #[case("en--GB", vec!["en--GB", "en"])]
    #[case("-fr-", vec!["fr"])]
    #[case("", vec![])]
    #[case("  ", vec![])]
    fn test_expand_locale(#[case] locale: &str, #[case] expected: Vec<&str>) {
        assert_eq!(expand_locale(locale), expected);
    }

    #[rstest]
    fn expand_locales_drops_chains_already_covered() {
        let chains = expand_locales(&["en-US-var1", "fr-FR", "fr", "en-GB", "de-DE"]);

        assert_that!(
            chains,
            elements_are![
                elements_are![eq("en-US-var1"), eq("en-US"), eq("en")],
                elements_are![eq("fr-FR"), eq("fr")],
                elements_are![eq("en-GB"), eq("en")],
                elements_are![eq("de-DE"), eq("de")],
            ]
        );
    }

    #[rstest]
    fn expand_locales_compares_heads_loosely() {
        let chains = expand_locales(&["en-GB", "EN_gb", "en"]);

        assert_that!(chains, elements_are![elements_are![eq("en-GB"), eq("en")]]);
    }

    #[rstest]
    fn expand_locales_keeps_general_locale_listed_first() {
        let chains = expand_locales(&["en", "en-GB"]);

        assert_that!(chains.len(), eq(2));
        assert_that!(chains[1], elements_are![eq("en-GB"), eq("en")]);
    }

    #[rstest]
    fn expand_locales_skips_blank_entries() {
        let chains = expand_locales(&["", "it"]);

        assert_that!(chains, elements_are![elements_are![eq("it")]]);
    }
}
