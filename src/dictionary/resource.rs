//! External dictionary fragments.
//!
//! A dictionary sub-map of the form `{"__load-resource": "<name>"}` is
//! replaced by the fragment a [`ResourceLoader`] returns for `<name>`.

use std::collections::HashMap;
use std::path::{
    Component,
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
};

use serde_json::Value;

use crate::error::CompileError;

/// Key marking a sub-map as an external resource to splice in.
pub const LOAD_RESOURCE_KEY: &str = "__load-resource";

/// Loads dictionary fragments by name.
pub trait ResourceLoader {
    /// Returns the named fragment, which must be a JSON object.
    fn load(&self, name: &str) -> Result<Arc<Value>, CompileError>;
}

impl<L: ResourceLoader + ?Sized> ResourceLoader for &L {
    fn load(&self, name: &str) -> Result<Arc<Value>, CompileError> {
        (**self).load(name)
    }
}

impl<L: ResourceLoader + ?Sized> ResourceLoader for Arc<L> {
    fn load(&self, name: &str) -> Result<Arc<Value>, CompileError> {
        (**self).load(name)
    }
}

/// Rejects fragments that are not objects.
fn ensure_fragment(name: &str, value: Value) -> Result<Arc<Value>, CompileError> {
    if value.is_object() {
        Ok(Arc::new(value))
    } else {
        Err(CompileError::MalformedResource { name: name.to_string() })
    }
}

/// Loads JSON fragments from files under a root directory.
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
    /// Directory resource names are resolved against.
    root: PathBuf,
}

impl FsResourceLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, name: &str) -> Result<Arc<Value>, CompileError> {
        // Names are relative paths that stay inside the root.
        let relative = Path::new(name);
        if name.is_empty()
            || relative.components().any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(CompileError::ResourceNotFound { name: name.to_string() });
        }

        let path = self.root.join(relative);
        tracing::debug!("Loading resource '{}' from {:?}", name, path);

        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CompileError::ResourceNotFound { name: name.to_string() }
            } else {
                CompileError::ResourceUnreadable { name: name.to_string(), source }
            }
        })?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|source| CompileError::ResourceParse { name: name.to_string(), source })?;

        ensure_fragment(name, value)
    }
}

/// Serves fragments registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceLoader {
    /// Registered fragments by name.
    resources: HashMap<String, Arc<Value>>,
}

impl MemoryResourceLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fragment, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, fragment: Value) {
        self.resources.insert(name.into(), Arc::new(fragment));
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, fragment: Value) -> Self {
        self.insert(name, fragment);
        self
    }
}

impl ResourceLoader for MemoryResourceLoader {
    fn load(&self, name: &str) -> Result<Arc<Value>, CompileError> {
        let fragment = self
            .resources
            .get(name)
            .ok_or_else(|| CompileError::ResourceNotFound { name: name.to_string() })?;
        if fragment.is_object() {
            Ok(Arc::clone(fragment))
        } else {
            Err(CompileError::MalformedResource { name: name.to_string() })
        }
    }
}

/// Memoizes another loader by resource name.
///
/// Resource content is assumed not to change while cached; call
/// [`Self::invalidate`] or [`Self::clear`] when it does. Failed loads are not
/// cached.
#[derive(Debug)]
pub struct CachingLoader<L> {
    /// Loader consulted on cache misses.
    inner: L,
    /// Loaded fragments by name.
    cache: Mutex<HashMap<String, Arc<Value>>>,
}

impl<L: ResourceLoader> CachingLoader<L> {
    #[must_use]
    pub fn new(inner: L) -> Self {
        Self { inner, cache: Mutex::new(HashMap::new()) }
    }

    #[must_use]
    pub const fn inner(&self) -> &L {
        &self.inner
    }

    /// Drops the cached fragment for `name`. Returns whether one was cached.
    pub fn invalidate(&self, name: &str) -> bool {
        self.lock().remove(name).is_some()
    }

    /// Drops every cached fragment.
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

    /// Locks the cache, recovering from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Value>>> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Resource cache lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

impl<L: ResourceLoader> ResourceLoader for CachingLoader<L> {
    fn load(&self, name: &str) -> Result<Arc<Value>, CompileError> {
        if let Some(fragment) = self.lock().get(name) {
            tracing::debug!("Resource cache hit: {}", name);
            return Ok(Arc::clone(fragment));
        }

        let fragment = self.inner.load(name)?;
        self.lock().insert(name.to_string(), Arc::clone(&fragment));
        Ok(fragment)
    }
}
