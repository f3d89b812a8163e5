use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ファイル読み込みエラー: {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("台帳ファイルが不正: {0}")]
    Store(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Excel読み込みエラー: {0}")]
    Calamine(#[from] calamine::XlsxError),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
