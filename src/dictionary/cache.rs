//! Memoization of compiled dictionaries.
//!
//! Dictionaries are keyed by content: an FNV-1a fingerprint of their canonical
//! JSON text, checked against the stored source on every hit.

use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
};

use serde_json::Value;

use super::resource::ResourceLoader;
use super::{
    CompiledDictionary,
    DictionaryCompiler,
};
use crate::error::CompileError;

/// 64-bit FNV-1a.
struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    const fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }
}

/// Content fingerprint of a dictionary compiled with `separator`.
#[must_use]
pub fn fingerprint(dictionary: &Value, separator: &str) -> u64 {
    let mut hasher = Fnv1aHasher::new();
    hasher.write(separator.as_bytes());
    hasher.write_u8(0xff);
    hasher.write(dictionary.to_string().as_bytes());
    hasher.finish()
}

/// A compiled dictionary and what it was compiled from.
#[derive(Debug)]
struct CacheEntry {
    /// Source the entry was compiled from, to rule out fingerprint clashes.
    source: Value,
    /// Key separator of the compiler that built the entry.
    separator: String,
    /// Shared compiled table.
    compiled: Arc<CompiledDictionary>,
}

/// Cache of compiled dictionaries shared across threads.
///
/// Entries are never evicted on their own. Neither the resource loader nor the
/// resources themselves are part of the fingerprint:
///
/// - a cache must only be used with compilers sharing one resource source;
///   give each loader its own cache.
/// - [`Self::invalidate`] or [`Self::clear`] must be called when a resource a
///   cached dictionary splices has changed.
#[derive(Debug, Default)]
pub struct DictionaryCache {
    /// Entries by fingerprint.
    entries: Mutex<HashMap<u64, CacheEntry>>,
}

impl DictionaryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled form of `dictionary`, compiling it on a miss.
    ///
    /// A hit is returned whichever loader `compiler` has; see the type docs.
    /// Failed compilations are not cached.
    pub fn get_or_compile<L: ResourceLoader>(
        &self,
        compiler: &DictionaryCompiler<L>,
        dictionary: &Value,
    ) -> Result<Arc<CompiledDictionary>, CompileError> {
        let separator = compiler.key_separator();
        let key = fingerprint(dictionary, separator);
        if let Some(entry) = self.lock().get(&key)
            && entry.separator == separator
            && entry.source == *dictionary
        {
            tracing::debug!("Dictionary cache hit: {:016x}", key);
            return Ok(Arc::clone(&entry.compiled));
        }

        let compiled = Arc::new(compiler.compile(dictionary)?);
        self.lock().insert(
            key,
            CacheEntry {
                source: dictionary.clone(),
                separator: separator.to_string(),
                compiled: Arc::clone(&compiled),
            },
        );
        Ok(compiled)
    }

    /// Drops every entry compiled from `dictionary`. Returns whether one existed.
    pub fn invalidate(&self, dictionary: &Value) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.source != *dictionary);
        entries.len() != before
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Locks the entries, recovering from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, HashMap<u64, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Dictionary cache lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;
    use crate::dictionary::resource::MemoryResourceLoader;
    use crate::test_utils::CountingLoader;

    #[rstest]
    #[case::empty("", 0xcbf2_9ce4_8422_2325)]
    #[case::a("a", 0xaf63_dc4c_8601_ec8c)]
    #[case::foobar("foobar", 0x8594_4171_f739_67e8)]
    fn fnv1a_reference_values(#[case] input: &str, #[case] expected: u64) {
        let mut hasher = Fnv1aHasher::new();
        hasher.write(input.as_bytes());

        assert_that!(hasher.finish(), eq(expected));
    }

    #[rstest]
    fn fingerprint_depends_on_content_and_separator() {
        let dict = json!({"en": {"a": "A"}});
        let changed = json!({"en": {"a": "B"}});

        assert_that!(fingerprint(&dict, "."), eq(fingerprint(&dict.clone(), ".")));
        assert_that!(fingerprint(&dict, "."), not(eq(fingerprint(&dict, "/"))));
        assert_that!(fingerprint(&dict, "."), not(eq(fingerprint(&changed, "."))));
    }

    #[rstest]
    fn equal_dictionaries_share_one_compilation() {
        let cache = DictionaryCache::new();
        let compiler = DictionaryCompiler::<MemoryResourceLoader>::default();

        let first = cache.get_or_compile(&compiler, &json!({"en": {"a": "A"}})).unwrap();
        let second = cache.get_or_compile(&compiler, &json!({"en": {"a": "A"}})).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_that!(cache.len(), eq(1));
    }

    #[rstest]
    fn cached_dictionary_skips_resource_loading() {
        let cache = DictionaryCache::new();
        let compiler = DictionaryCompiler::new(CountingLoader::new(
            MemoryResourceLoader::new().with("en", json!({"a": "A"})),
        ));
        let dict = json!({"en": {"__load-resource": "en"}});

        cache.get_or_compile(&compiler, &dict).unwrap();
        cache.get_or_compile(&compiler, &dict).unwrap();

        assert_that!(compiler.loader().calls(), eq(1));
    }

    #[rstest]
    fn hits_ignore_which_loader_the_compiler_has() {
        let cache = DictionaryCache::new();
        let dict = json!({"en": {"__load-resource": "en"}});
        let first = DictionaryCompiler::new(
            MemoryResourceLoader::new().with("en", json!({"a": "first"})),
        );
        let second = DictionaryCompiler::new(CountingLoader::new(
            MemoryResourceLoader::new().with("en", json!({"a": "second"})),
        ));

        let compiled = cache.get_or_compile(&first, &dict).unwrap();
        let reused = cache.get_or_compile(&second, &dict).unwrap();

        assert!(Arc::ptr_eq(&compiled, &reused));
        assert_that!(second.loader().calls(), eq(0));
    }

    #[rstest]
    fn invalidate_forces_recompilation() {
        let cache = DictionaryCache::new();
        let compiler = DictionaryCompiler::<MemoryResourceLoader>::default();
        let dict = json!({"en": {"a": "A"}});

        let first = cache.get_or_compile(&compiler, &dict).unwrap();
        assert_that!(cache.invalidate(&dict), eq(true));
        assert_that!(cache.invalidate(&dict), eq(false));
        let second = cache.get_or_compile(&compiler, &dict).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_that!(first.as_ref(), eq(second.as_ref()));
    }

    #[rstest]
    fn failures_are_not_cached() {
        let cache = DictionaryCache::new();
        let compiler = DictionaryCompiler::<MemoryResourceLoader>::default();

        let result = cache.get_or_compile(&compiler, &json!({"en": {"a": ":en.b"}}));

        assert!(matches!(result, Err(CompileError::DanglingPointer { .. })));
        assert_that!(cache.is_empty(), eq(true));
    }

    #[rstest]
    fn clear_empties_the_cache() {
        let cache = DictionaryCache::new();
        let compiler = DictionaryCompiler::<MemoryResourceLoader>::default();
        cache.get_or_compile(&compiler, &json!({"en": {}})).unwrap();

        cache.clear();

        assert_that!(cache.is_empty(), eq(true));
    }
}
