use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 入力フォルダを上書きする環境変数
pub const INPUT_DIR_ENV: &str = "LISTING_INPUT_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 物件テキストのフォルダ
    pub input_dir: PathBuf,
    /// 出力台帳（.xlsx）
    pub table_path: PathBuf,
    /// 処理済みファイル一覧
    pub processed_path: PathBuf,
    /// 対象拡張子（ドットなし）
    pub input_extension: String,
    pub poll_interval_secs: u64,
    pub lock_retry_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("listings"),
            table_path: PathBuf::from("property_info.xlsx"),
            processed_path: PathBuf::from("processed_files.txt"),
            input_extension: "txt".into(),
            poll_interval_secs: 60,
            lock_retry_secs: 60,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み（環境変数を優先）
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;

        if let Ok(dir) = std::env::var(INPUT_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.input_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    /// 指定パスから読み込み（なければデフォルト）
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| HarvestError::Config("設定ディレクトリが見つかりません".into()))?;
        Ok(base.join("listing-harvester").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_extension.trim().is_empty() {
            return Err(HarvestError::Config("input_extension が空です".into()));
        }
        if self.poll_interval_secs == 0 || self.lock_retry_secs == 0 {
            return Err(HarvestError::Config("待機間隔は1秒以上にしてください".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn lock_retry(&self) -> Duration {
        Duration::from_secs(self.lock_retry_secs)
    }

    /// 対象ファイル名の接尾辞（例: ".txt"）
    pub fn input_suffix(&self) -> String {
        format!(".{}", self.input_extension.trim_start_matches('.'))
    }

    pub fn set_input_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.input_dir = dir;
        self.save()
    }
}
