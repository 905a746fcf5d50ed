//! Error types shared by the dictionary compiler and the template renderer.

use thiserror::Error;

/// Errors raised while compiling a dictionary or a template.
///
/// Compilation never returns partial output; every variant carries the
/// offending path, resource name or template text.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The dictionary does not have the locale → scope → resid shape.
    #[error("Malformed dictionary at '{path}': {message}")]
    MalformedDictionary { path: String, message: String },

    /// A template leaf could not be read as a string or markup tree.
    #[error("Malformed template at '{path}': {message}")]
    MalformedTemplate { path: String, message: String },

    /// A pointer names a path that does not exist.
    #[error("Pointer '{pointer}' does not resolve to any dictionary entry")]
    DanglingPointer { pointer: String },

    /// Following a pointer leads back to itself.
    #[error("Pointer '{pointer}' is part of a reference cycle")]
    PointerCycle { pointer: String },

    /// The named external resource does not exist.
    #[error("Resource '{name}' not found")]
    ResourceNotFound { name: String },

    /// The named external resource exists but could not be read.
    #[error("Failed to read resource '{name}': {source}")]
    ResourceUnreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The named external resource is not valid JSON.
    #[error("Failed to parse resource '{name}': {source}")]
    ResourceParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The loaded fragment is not a dictionary object.
    #[error("Resource '{name}' is not a dictionary fragment")]
    MalformedResource { name: String },

    /// A fragment (transitively) splices itself.
    #[error("Resource '{name}' includes itself")]
    ResourceCycle { name: String },

    /// `%0` (or a zero-led index) appears in a template.
    #[error("Invalid placeholder '%0' in template: {template:?}")]
    InvalidPlaceholder { template: String },

    /// A placeholder index above the supported maximum.
    #[error("Placeholder '%{index}' exceeds the maximum of %13 in template: {template:?}")]
    PlaceholderOutOfRange { template: String, index: usize },
}

/// Errors raised while normalizing caller-supplied arguments.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgError {
    /// Argument maps are 1-based; zero and negative keys are rejected.
    #[error("Argument key must be a positive integer, got {0}")]
    NonPositiveKey(i64),
}
