//! i18n-render
//!
//! ロケールのフォールバックに沿って翻訳テンプレートを解決し、文字列または軽量なマークアップツリーに描画する
//!
//! ```
//! use i18n_render::{
//!     DictionaryCompiler,
//!     MemoryResourceLoader,
//!     TemplateCompiler,
//!     expand_locales,
//!     search,
//! };
//! use serde_json::json;
//!
//! let dictionary = json!({
//!     "en": {"greeting": "Hello, %1!"},
//!     "en-GB": {"greeting": ":en.greeting"},
//! });
//! let table = DictionaryCompiler::new(MemoryResourceLoader::new()).compile(&dictionary)?;
//! let chains = expand_locales(&["en-GB-oxendict"]);
//!
//! let hit = search(&table, &chains, None, &["greeting"]).ok_or("missing")?;
//! let rendered = TemplateCompiler::default().compile(hit.template)?.render(&["Ada".into()]);
//!
//! assert_eq!(rendered.as_text(), Some("Hello, Ada!"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod locale;
pub mod markup;
pub mod render;
pub mod search;
mod test_utils;

pub use dictionary::cache::DictionaryCache;
pub use dictionary::resource::{
    CachingLoader,
    FsResourceLoader,
    MemoryResourceLoader,
    ResourceLoader,
};
pub use dictionary::{
    CompiledDictionary,
    DictionaryCompiler,
};
pub use error::{
    ArgError,
    CompileError,
};
pub use locale::{
    LocaleChain,
    expand_locale,
    expand_locales,
};
pub use markup::{
    Markup,
    Node,
    Template,
    Tree,
};
pub use render::args::{
    ArgTransform,
    ArgValue,
    Args,
};
pub use render::{
    CompiledTemplate,
    RenderOptions,
    Rendered,
    TemplateCompiler,
};
pub use search::{
    SearchHit,
    search,
};
