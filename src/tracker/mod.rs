//! 処理済みファイル管理モジュール
//!
//! 台帳に取り込んだファイル名を改行区切りで保存し、
//! 再起動後も同じファイルを二度処理しないようにする。

use crate::error::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// 処理済みファイル名の集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedSet {
    names: BTreeSet<String>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 一覧ファイルを読み込み（なければ空）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let names = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { names })
    }

    /// 一覧ファイルを丸ごと書き換える
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut content = self
            .names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// 追加（新規なら true）
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// 台帳に既にあるファイル名を取り込む（追加件数を返す）
    pub fn extend_from<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.names.len();
        self.names.extend(names.into_iter().map(Into::into));
        self.names.len() - before
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
