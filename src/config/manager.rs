//! 描画設定と、その設定ファイルのディレクトリを保持する

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    RenderSettings,
    loader,
};
use crate::dictionary::resource::{
    CachingLoader,
    FsResourceLoader,
};

/// 検証済みの描画設定
///
/// 無効な設定は保持しない。読み込みや更新に失敗した場合は以前の設定が残る。
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: RenderSettings,

    /// 設定ファイルを読み込んだディレクトリ
    root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: RenderSettings::default(), root: None }
    }

    /// `root` の `.i18n-render.json` を読み込む
    ///
    /// ファイルが無ければデフォルト値。`root` は `resourceRoot` の基準にもなる。
    ///
    /// # Errors
    /// 読み込み、パース、検証のいずれかに失敗した場合
    pub fn load_settings(&mut self, root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for root: {:?}", root);

        let settings = if let Some(dir) = &root {
            loader::load_from_dir(dir)?.map_or_else(RenderSettings::default, |loaded| {
                tracing::debug!("Loaded settings: {:?}", loaded);
                loaded
            })
        } else {
            RenderSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;
        self.current_settings = settings;
        self.root = root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// 設定ファイルを介さずに設定を差し替える。ディレクトリはそのまま
    ///
    /// # Errors
    /// 検証に失敗した場合
    pub fn update_settings(&mut self, new_settings: RenderSettings) -> Result<(), ConfigError> {
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;
        tracing::debug!("Render settings replaced: {:?}", new_settings);
        self.current_settings = new_settings;
        Ok(())
    }

    /// 同じディレクトリから設定ファイルを読み直す
    ///
    /// # Errors
    /// [`Self::load_settings`] と同じ
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.load_settings(self.root.clone())
    }

    /// 現在の設定
    #[must_use]
    pub const fn get_settings(&self) -> &RenderSettings {
        &self.current_settings
    }

    /// 最後に読み込みに成功したディレクトリ
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// `resourceRoot` を設定ファイルのディレクトリ基準で解決したローダー
    ///
    /// ディレクトリが無ければカレントディレクトリ基準
    #[must_use]
    pub fn resource_loader(&self) -> CachingLoader<FsResourceLoader> {
        self.current_settings.resource_loader(self.root().unwrap_or_else(|| Path::new(".")))
    }
}
