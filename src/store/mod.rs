//! 台帳（表）モジュール
//!
//! - ListingTable: メモリ上の台帳（ヘッダ + 追記のみの行）
//! - TableStore: 台帳の永続化先
//! - LockProbe: 台帳ファイルが他プロセスで開かれているかの判定

pub mod excel;
pub mod lock;

use crate::error::Result;
use listing_harvester_common::{ListingRecord, TABLE_HEADERS};
use std::path::Path;

pub use excel::XlsxStore;
pub use lock::{FileLockProbe, LockProbe, LockState};

/// 台帳の1行（ファイル名 + 抽出結果）
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub file_name: String,
    pub record: ListingRecord,
    /// 13列目より右にある利用者の追加列（書き戻し用）
    pub extra: Vec<Option<String>>,
}

impl TableRow {
    /// 列順のセル値
    pub fn cells(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        std::iter::once(Some(self.file_name.as_str()))
            .chain(self.record.values())
            .chain(self.extra.iter().map(|v| v.as_deref()))
    }
}

/// メモリ上の台帳
///
/// 行は発見順に追記するだけで、更新・削除はしない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    extra_headers: Vec<String>,
    rows: Vec<TableRow>,
}

impl ListingTable {
    /// ヘッダのみの台帳
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み戻した行から台帳を復元
    pub fn from_parts(extra_headers: Vec<String>, rows: Vec<TableRow>) -> Self {
        Self { extra_headers, rows }
    }

    /// 1行追記
    pub fn append(&mut self, file_name: impl Into<String>, record: &ListingRecord) {
        self.rows.push(TableRow {
            file_name: file_name.into(),
            record: record.clone(),
            extra: Vec::new(),
        });
    }

    /// ヘッダ行（固定13列 + 追加列）
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        TABLE_HEADERS
            .iter()
            .copied()
            .chain(self.extra_headers.iter().map(String::as_str))
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// データ行数（ヘッダを除く）
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 台帳に載っているファイル名
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(|r| r.file_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// 台帳の永続化先
pub trait TableStore {
    /// 既存の台帳を読み込む（なければヘッダのみで作成して保存）
    fn load_or_init(&self) -> Result<ListingTable>;

    /// 台帳全体を書き出す
    fn save(&self, table: &ListingTable) -> Result<()>;

    /// 台帳ファイルの場所
    fn location(&self) -> &Path;
}
