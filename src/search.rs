//! Template lookup along locale fallback chains.

use crate::dictionary::CompiledDictionary;
use crate::locale::LocaleChain;
use crate::markup::Template;

/// One lookup the search tries, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Position of the chain in the caller's list.
    pub chain: usize,
    pub resid: &'a str,
    /// Locale variant within the chain.
    pub locale: &'a str,
}

/// A template found by [`search`] and where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit<'a> {
    pub chain: usize,
    pub locale: &'a str,
    pub resid: &'a str,
    pub template: &'a Template,
}

/// Lookups in priority order: chains in caller order, then resource ids in
/// caller order, then locale variants most specific first.
pub fn candidates<'a, R: AsRef<str>>(
    chains: &'a [LocaleChain],
    resids: &'a [R],
) -> impl Iterator<Item = Candidate<'a>> {
    chains.iter().enumerate().flat_map(move |(chain, variants)| {
        resids.iter().flat_map(move |resid| {
            variants.iter().map(move |locale| Candidate {
                chain,
                resid: resid.as_ref(),
                locale: locale.as_str(),
            })
        })
    })
}

/// Returns the first template found in priority order (see [`candidates`]).
///
/// `None` means no chain has any of the resource ids; fallback policy is up
/// to the caller.
#[must_use]
pub fn search<'a, R: AsRef<str>>(
    table: &'a CompiledDictionary,
    chains: &'a [LocaleChain],
    scope: Option<&str>,
    resids: &'a [R],
) -> Option<SearchHit<'a>> {
    let hit = candidates(chains, resids).find_map(|candidate| {
        table.get(candidate.locale, scope, candidate.resid).map(|template| SearchHit {
            chain: candidate.chain,
            locale: candidate.locale,
            resid: candidate.resid,
            template,
        })
    });
    if hit.is_none() {
        let resids: Vec<&str> = resids.iter().map(AsRef::as_ref).collect();
        tracing::debug!("No template for {:?} in scope {:?}", resids, scope);
    }
    hit
}
