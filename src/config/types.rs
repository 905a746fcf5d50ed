use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::dictionary::key::DEFAULT_KEY_SEPARATOR;
use crate::dictionary::resource::{
    CachingLoader,
    FsResourceLoader,
};
use crate::locale::{
    LocaleChain,
    expand_locales,
};
use crate::markup::is_tag_token;
use crate::render::{
    DEFAULT_TAG,
    RenderOptions,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "fallbackLocales[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Separator between nested dictionary key segments.
    pub key_separator: String,
    /// Root tag of untagged trees and styled text.
    pub default_tag: String,
    pub escape_html: bool,
    pub styling: bool,

    /// Directory external dictionary fragments are loaded from.
    /// Relative paths are resolved against the settings file's directory.
    pub resource_root: Option<PathBuf>,

    /// Locales tried after the requested ones, in order.
    pub fallback_locales: Option<Vec<String>>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            key_separator: DEFAULT_KEY_SEPARATOR.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
            escape_html: false,
            styling: true,
            resource_root: None,
            fallback_locales: None,
        }
    }
}

impl RenderSettings {
    /// # Errors
    /// - Empty or pointer-like separator
    /// - Invalid default tag
    /// - Empty fallback locale
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        } else if self.key_separator.contains(':') {
            errors.push(ValidationError::new(
                "keySeparator",
                format!(
                    "The separator '{}' cannot contain ':', which starts a pointer",
                    self.key_separator
                ),
            ));
        }

        if self.default_tag.is_empty() {
            errors.push(ValidationError::new(
                "defaultTag",
                "The tag cannot be empty. Example: \"span\"",
            ));
        } else if !is_tag_token(&format!(":{}", self.default_tag)) {
            errors.push(ValidationError::new(
                "defaultTag",
                format!(
                    "Invalid tag '{}': use a letter followed by letters, digits or '-'",
                    self.default_tag
                ),
            ));
        }

        if let Some(locales) = &self.fallback_locales {
            for (index, locale) in locales.iter().enumerate() {
                if locale.trim().is_empty() {
                    errors.push(ValidationError::new(
                        format!("fallbackLocales[{index}]"),
                        "The locale cannot be empty. Example: \"en\"",
                    ));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Template compilation options for these settings (identity transform).
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            default_tag: self.default_tag.clone(),
            escape_html: self.escape_html,
            styling: self.styling,
            ..RenderOptions::default()
        }
    }

    /// Memoizing loader rooted at `resource_root`, resolved against `base_dir`.
    ///
    /// Without a `resource_root`, fragments are loaded from `base_dir` itself.
    #[must_use]
    pub fn resource_loader(&self, base_dir: &Path) -> CachingLoader<FsResourceLoader> {
        let root = self
            .resource_root
            .as_ref()
            .map_or_else(|| base_dir.to_path_buf(), |root| base_dir.join(root));
        CachingLoader::new(FsResourceLoader::new(root))
    }

    /// Fallback chains for `requested`, followed by the configured fallbacks.
    #[must_use]
    pub fn locale_chains<S: AsRef<str>>(&self, requested: &[S]) -> Vec<LocaleChain> {
        let fallbacks = self.fallback_locales.as_deref().unwrap_or_default();
        let locales: Vec<&str> = requested
            .iter()
            .map(AsRef::as_ref)
            .chain(fallbacks.iter().map(String::as_str))
            .collect();
        expand_locales(&locales)
    }
}
