//! Pointer resolution and resource splicing.
//!
//! A pointer is a string leaf such as `":en.menu.open"` standing for the value
//! at that path from the dictionary root. The first segment is a locale and is
//! matched case-insensitively; later segments must match exactly. Segments are
//! separated by `.`, `:` or `/`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{
    Map,
    Value,
};

use super::key::normalize_locale;
use super::resource::{
    LOAD_RESOURCE_KEY,
    ResourceLoader,
};
use crate::error::CompileError;

/// Shape of a pointer leaf.
#[allow(clippy::unwrap_used)]
static POINTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:[\w-]+(?:[.:/][\w-]+)*$").unwrap());

/// Whether a string leaf is a pointer.
#[must_use]
pub fn is_pointer(text: &str) -> bool {
    POINTER.is_match(text)
}

/// Path segments of a pointer.
fn pointer_segments(pointer: &str) -> impl Iterator<Item = &str> {
    pointer.strip_prefix(':').unwrap_or(pointer).split(['.', ':', '/'])
}

/// Resolves every pointer and splices every resource marker in `root`.
///
/// The result contains neither; its shape is otherwise the same.
pub fn preprocess<L: ResourceLoader + ?Sized>(
    root: &Value,
    loader: &L,
) -> Result<Value, CompileError> {
    Preprocessor { root, loader, pointers: Vec::new(), resources: Vec::new() }.resolve(root, "")
}

/// State of one preprocessing pass.
struct Preprocessor<'a, L: ?Sized> {
    /// Unresolved dictionary that pointers are looked up in.
    root: &'a Value,
    /// Source of spliced resources.
    loader: &'a L,
    /// Pointers being followed, outermost first.
    pointers: Vec<String>,
    /// Resources being spliced, outermost first.
    resources: Vec<String>,
}

impl<'a, L: ResourceLoader + ?Sized> Preprocessor<'a, L> {
    /// Returns `value` with its pointers resolved and resources spliced.
    fn resolve(&mut self, value: &Value, path: &str) -> Result<Value, CompileError> {
        match value {
            Value::String(text) if is_pointer(text) => self.follow_pointer(text, path),
            Value::Object(map) => {
                if let Some(name) = map.get(LOAD_RESOURCE_KEY) {
                    return self.splice(map, name, path);
                }
                let mut resolved = Map::new();
                for (key, child) in map {
                    let child_path =
                        if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                    resolved.insert(key.clone(), self.resolve(child, &child_path)?);
                }
                Ok(Value::Object(resolved))
            }
            _ => Ok(value.clone()),
        }
    }

    /// Replaces a resource marker with its resolved fragment.
    fn splice(
        &mut self,
        map: &Map<String, Value>,
        name: &Value,
        path: &str,
    ) -> Result<Value, CompileError> {
        let Value::String(name) = name else {
            return Err(CompileError::MalformedDictionary {
                path: path.to_string(),
                message: format!("'{LOAD_RESOURCE_KEY}' must name a resource"),
            });
        };
        if map.len() > 1 {
            tracing::warn!(
                "Keys next to '{}' at '{}' are ignored (resource '{}')",
                LOAD_RESOURCE_KEY,
                path,
                name
            );
        }
        if self.resources.contains(name) {
            return Err(CompileError::ResourceCycle { name: name.clone() });
        }

        let fragment = self.loader.load(name)?;
        self.resources.push(name.clone());
        let resolved = self.resolve(fragment.as_ref(), path);
        self.resources.pop();
        resolved
    }

    /// Replaces a pointer with the resolved value it points at.
    fn follow_pointer(&mut self, pointer: &str, path: &str) -> Result<Value, CompileError> {
        if self.pointers.iter().any(|seen| seen == pointer) {
            return Err(CompileError::PointerCycle { pointer: pointer.to_string() });
        }

        self.pointers.push(pointer.to_string());
        let resolved = self.lookup(pointer).and_then(|target| {
            tracing::debug!("Resolved pointer '{}' at '{}'", pointer, path);
            self.resolve(&target, path)
        });
        self.pointers.pop();
        resolved
    }

    /// Walks the unresolved root along a pointer's path.
    ///
    /// Resource markers and pointers met on the way are followed, so a path
    /// may pass through spliced fragments and aliased sub-maps.
    fn lookup(&mut self, pointer: &str) -> Result<Cow<'a, Value>, CompileError> {
        let dangling = || CompileError::DanglingPointer { pointer: pointer.to_string() };

        let mut current: Cow<'a, Value> = Cow::Borrowed(self.root);
        for (depth, segment) in pointer_segments(pointer).enumerate() {
            current = self.expand(current)?;
            current = match current {
                Cow::Borrowed(value) => {
                    Cow::Borrowed(child(value, segment, depth).ok_or_else(dangling)?)
                }
                Cow::Owned(value) => {
                    Cow::Owned(child(&value, segment, depth).ok_or_else(dangling)?.clone())
                }
            };
        }
        Ok(current)
    }

    /// Follows resource markers and pointers until `value` is neither.
    fn expand(&mut self, mut value: Cow<'a, Value>) -> Result<Cow<'a, Value>, CompileError> {
        let mut loaded: Vec<String> = Vec::new();
        let mut followed: Vec<String> = Vec::new();
        loop {
            if let Some(name) = value.get(LOAD_RESOURCE_KEY).and_then(Value::as_str) {
                let name = name.to_string();
                if loaded.contains(&name) {
                    return Err(CompileError::ResourceCycle { name });
                }
                let fragment = self.loader.load(&name)?;
                loaded.push(name);
                value = Cow::Owned(fragment.as_ref().clone());
            } else if let Some(inner) = value.as_str().filter(|text| is_pointer(text)) {
                let inner = inner.to_string();
                if followed.contains(&inner) || self.pointers.contains(&inner) {
                    return Err(CompileError::PointerCycle { pointer: inner });
                }
                self.pointers.push(inner.clone());
                let target = self.lookup(&inner);
                self.pointers.pop();
                followed.push(inner);
                value = target?;
            } else {
                return Ok(value);
            }
        }
    }
}

/// The child of `value` named `segment`; locale keys (depth 0) ignore case.
fn child<'v>(value: &'v Value, segment: &str, depth: usize) -> Option<&'v Value> {
    let map = value.as_object()?;
    if depth > 0 {
        return map.get(segment);
    }
    map.get(segment).or_else(|| {
        let wanted = normalize_locale(segment);
        map.iter().find(|(key, _)| normalize_locale(key) == wanted).map(|(_, value)| value)
    })
}
