use crate::error::{HarvestError, Result};
use crate::tracker::ProcessedSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl ListingFile {
    /// 全文を読み込む（UTF-8でない部分は置換）
    pub fn read_text(&self) -> Result<String> {
        let bytes = std::fs::read(&self.path).map_err(|source| HarvestError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// フォルダ直下の対象ファイルを列挙（ファイル名順）
pub fn scan_folder(folder: &Path, suffix: &str) -> Result<Vec<ListingFile>> {
    if !folder.is_dir() {
        return Err(HarvestError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)  // 直下のみ（再帰しない）
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if has_suffix(&file_name, suffix) {
            files.push(ListingFile {
                path: path.to_path_buf(),
                file_name,
            });
        }
    }

    Ok(files)
}

/// 未処理の対象ファイルだけを列挙
pub fn scan_unprocessed(
    folder: &Path,
    suffix: &str,
    processed: &ProcessedSet,
) -> Result<Vec<ListingFile>> {
    Ok(scan_folder(folder, suffix)?
        .into_iter()
        .filter(|f| !processed.contains(&f.file_name))
        .collect())
}

fn has_suffix(file_name: &str, suffix: &str) -> bool {
    file_name.ends_with(suffix)
}
