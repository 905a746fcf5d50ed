//! テスト用ユーティリティ
//!
//! 複数のテストモジュールで使用される共通のヘルパーを提供します。
#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use serde_json::{
    Value,
    json,
};

use crate::dictionary::resource::ResourceLoader;
use crate::error::CompileError;

/// テスト用の辞書を作成する
///
/// - `en`: 通常のテンプレート
/// - `en-GB`: `en` へのポインタ
/// - `fr`: 外部リソース `fr` の読み込み
pub(crate) fn sample_dictionary() -> Value {
    json!({
        "en": {"menu": {"open": "Open %1"}},
        "en-GB": {"menu": {"open": ":en.menu.open"}},
        "fr": {"__load-resource": "fr"}
    })
}

/// 読み込み回数を数えるローダー
#[derive(Debug)]
pub(crate) struct CountingLoader<L> {
    /// 実際の読み込みを行うローダー
    inner: L,
    /// `load` の呼び出し回数
    calls: AtomicUsize,
}

impl<L> CountingLoader<L> {
    pub(crate) const fn new(inner: L) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    /// これまでの `load` の呼び出し回数
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<L: ResourceLoader> ResourceLoader for CountingLoader<L> {
    fn load(&self, name: &str) -> Result<Arc<Value>, CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(name)
    }
}
