//! Dictionary compilation.
//!
//! A raw dictionary is a JSON object keyed by locale whose values are nested
//! maps ending in templates:
//!
//! ```json
//! {
//!   "en": {"menu": {"open": "Open %1"}},
//!   "en-GB": {"menu": {"open": ":en.menu.open"}},
//!   "fr": {"__load-resource": "fr.json"}
//! }
//! ```
//!
//! Compiling resolves pointers, splices external resources and flattens the
//! result into a table keyed by composite keys (see [`key`]).

pub mod cache;
pub mod flatten;
pub mod key;
pub mod preprocess;
pub mod resource;

use std::collections::HashMap;

use serde_json::Value;

use crate::error::CompileError;
use crate::markup::Template;
use key::{
    DEFAULT_KEY_SEPARATOR,
    merge_key,
};
use resource::ResourceLoader;

/// Flat table of templates keyed by composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDictionary {
    /// Templates by composite key.
    entries: HashMap<String, Template>,
    /// Separator the entries were flattened with; lookups split on it too.
    key_separator: String,
}

impl CompiledDictionary {
    /// Builds a table from already-flattened entries.
    #[allow(clippy::implicit_hasher)]
    #[must_use]
    pub fn from_entries(entries: HashMap<String, Template>, key_separator: &str) -> Self {
        Self { entries, key_separator: key_separator.to_string() }
    }

    /// Composite key of `(locale, scope, resid)` in this table.
    #[must_use]
    pub fn key_for(&self, locale: &str, scope: Option<&str>, resid: &str) -> String {
        merge_key(locale, scope, resid, &self.key_separator)
    }

    /// Template at `(locale, scope, resid)`.
    #[must_use]
    pub fn get(&self, locale: &str, scope: Option<&str>, resid: &str) -> Option<&Template> {
        self.entries.get(&self.key_for(locale, scope, resid))
    }

    /// Template at a composite key.
    #[must_use]
    pub fn get_by_key(&self, key: &str) -> Option<&Template> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn key_separator(&self) -> &str {
        &self.key_separator
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.entries.iter().map(|(key, template)| (key.as_str(), template))
    }
}

/// Compiles raw dictionaries, loading external resources through `L`.
#[derive(Debug, Clone)]
pub struct DictionaryCompiler<L> {
    /// Source of spliced resources.
    loader: L,
    /// Separator dictionary keys are split on.
    key_separator: String,
}

impl<L: ResourceLoader + Default> Default for DictionaryCompiler<L> {
    fn default() -> Self {
        Self::new(L::default())
    }
}

impl<L: ResourceLoader> DictionaryCompiler<L> {
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self { loader, key_separator: DEFAULT_KEY_SEPARATOR.to_string() }
    }

    /// Sets the separator splitting dictionary keys, scopes and resource ids.
    #[must_use]
    pub fn with_key_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_separator = separator.into();
        self
    }

    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    #[must_use]
    pub fn key_separator(&self) -> &str {
        &self.key_separator
    }

    /// Compiles `dictionary` into a lookup table.
    ///
    /// The input is not modified. Fails without partial output if any
    /// pointer, resource or template is invalid.
    pub fn compile(&self, dictionary: &Value) -> Result<CompiledDictionary, CompileError> {
        let resolved = preprocess::preprocess(dictionary, &self.loader)?;
        let entries = flatten::flatten(&resolved, &self.key_separator)?;
        tracing::debug!("Compiled dictionary with {} entries", entries.len());
        Ok(CompiledDictionary::from_entries(entries, &self.key_separator))
    }
}
