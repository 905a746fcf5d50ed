//! 辞書の読み込みから描画までの一連の流れに関するテスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(missing_docs)]

use std::fs;

use googletest::prelude::*;
use i18n_render::config::{
    ConfigManager,
    SETTINGS_FILE_NAME,
};
use i18n_render::render::style::StyleTag;
use i18n_render::{
    ArgValue,
    CompileError,
    DictionaryCache,
    DictionaryCompiler,
    Markup,
    MemoryResourceLoader,
    Node,
    Rendered,
    TemplateCompiler,
    expand_locales,
    search,
};
use serde_json::{
    Value,
    json,
};
use tempfile::TempDir;

/// 設定ファイルと外部リソースを持つディレクトリを作成する
fn create_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(SETTINGS_FILE_NAME),
        r#"{"resourceRoot": "l10n", "escapeHtml": true, "fallbackLocales": ["en"]}"#,
    )
    .unwrap();
    fs::create_dir(temp_dir.path().join("l10n")).unwrap();
    fs::write(
        temp_dir.path().join("l10n/fr.json"),
        r#"{"inbox": {"unread": "%1 messages **non lus**"}}"#,
    )
    .unwrap();
    temp_dir
}

fn dictionary() -> Value {
    json!({
        "en": {
            "inbox": {"unread": "%1 **unread** messages", "title": "Inbox & more"},
            "link": [":a", {"href": "%1"}, "Open %2"]
        },
        "en-GB": {"inbox": {"title": ":en.inbox.title"}},
        "fr": {"__load-resource": "fr.json"}
    })
}

#[test]
fn renders_through_settings_dictionary_and_fallbacks() {
    let project = create_project();
    let mut manager = ConfigManager::new();
    manager.load_settings(Some(project.path().to_path_buf())).unwrap();
    let settings = manager.get_settings();

    let compiler = DictionaryCompiler::new(manager.resource_loader())
        .with_key_separator(settings.key_separator.clone());
    let table = DictionaryCache::new().get_or_compile(&compiler, &dictionary()).unwrap();
    let templates = TemplateCompiler::new(settings.render_options());

    // fr は外部リソースから読み込まれる
    let chains = settings.locale_chains(&["fr-CA"]);
    let hit = search(&table, &chains, Some("inbox"), &["unread"]).unwrap();
    let rendered = templates.compile(hit.template).unwrap().render(&[ArgValue::from("3")]);
    assert_that!(hit.locale, eq("fr"));
    assert_that!(
        rendered,
        eq(&Rendered::Markup(Node::new(
            "span",
            vec![
                Markup::text("3"),
                Markup::text(" messages "),
                StyleTag::Strong.to_node("non lus".to_string()).into(),
            ]
        )))
    );

    // fr に無いキーは設定のフォールバック en で見つかる
    let hit = search(&table, &chains, None, &["link"]).unwrap();
    assert_that!(hit.chain, eq(1));
    let rendered = templates
        .compile(hit.template)
        .unwrap()
        .render(&[ArgValue::from("/inbox"), ArgValue::from("<b>")]);
    let Rendered::Markup(link) = rendered else {
        panic!("expected markup, got {rendered:?}");
    };
    assert_that!(link.tag.as_str(), eq("a"));
    assert_that!(
        link.attrs.as_ref().and_then(|attrs| attrs.get("href")),
        some(eq(&Markup::text("/inbox")))
    );
    assert_that!(Markup::Node(link).text_content(), eq("Open &lt;b&gt;"));

    // ポインタ経由のテンプレートもエスケープされる
    let chains = settings.locale_chains(&["en-GB"]);
    let hit = search(&table, &chains, Some("inbox"), &["title"]).unwrap();
    assert_that!(hit.locale, eq("en-GB"));
    assert_that!(
        templates.compile(hit.template).unwrap().render(&[]).as_text(),
        some(eq("Inbox &amp; more"))
    );
}

#[test]
fn missing_resource_fails_with_its_name() {
    let project = create_project();
    fs::remove_file(project.path().join("l10n/fr.json")).unwrap();
    let mut manager = ConfigManager::new();
    manager.load_settings(Some(project.path().to_path_buf())).unwrap();

    let result = DictionaryCompiler::new(manager.resource_loader()).compile(&dictionary());

    assert!(
        matches!(result, Err(CompileError::ResourceNotFound { ref name }) if name == "fr.json")
    );
}

#[test]
fn invalid_placeholder_fails_before_rendering() {
    let table = DictionaryCompiler::new(MemoryResourceLoader::new())
        .compile(&json!({"en": {"broken": "Value: %0"}}))
        .unwrap();
    let chains = expand_locales(&["en"]);

    let hit = search(&table, &chains, None, &["broken"]).unwrap();
    let result = TemplateCompiler::default().compile(hit.template);

    assert!(matches!(result, Err(CompileError::InvalidPlaceholder { .. })));
}

#[test]
fn compiled_template_renders_many_times() {
    let table = DictionaryCompiler::new(MemoryResourceLoader::new())
        .compile(&json!({"de": {"hello": "Hallo %1, du hast %2 neue Nachrichten"}}))
        .unwrap();
    let chains = expand_locales(&["de-AT"]);
    let hit = search(&table, &chains, None, &["hello"]).unwrap();
    let compiled = TemplateCompiler::default().compile(hit.template).unwrap();

    let first = compiled.render(&[ArgValue::from("Ada"), ArgValue::from("2")]);
    let second = compiled.render(&[ArgValue::from("Bob")]);

    assert_that!(first.as_text(), some(eq("Hallo Ada, du hast 2 neue Nachrichten")));
    assert_that!(second.as_text(), some(eq("Hallo Bob, du hast  neue Nachrichten")));
}
