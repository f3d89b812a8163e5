//! 台帳ファイルのロック判定
//!
//! Excel等が開いている間は書き込まない。判定は助言的なもので、
//! 排他制御は行わない。

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked)
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockState::Unlocked => write!(f, "unlocked"),
            LockState::Locked => write!(f, "locked"),
        }
    }
}

/// ロック判定のトレイト
pub trait LockProbe {
    fn state(&self, path: &Path) -> LockState;
}

/// ファイルシステムによる判定
///
/// - Officeの所有者ファイル `~$<名前>` が隣にあれば Locked
/// - 読み書きで開けなければ Locked（ファイルがない場合は Unlocked）
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLockProbe;

impl LockProbe for FileLockProbe {
    fn state(&self, path: &Path) -> LockState {
        if owner_file_path(path).is_some_and(|p| p.exists()) {
            return LockState::Locked;
        }

        match OpenOptions::new().read(true).write(true).open(path) {
            Ok(_) => LockState::Unlocked,
            Err(e) if e.kind() == ErrorKind::NotFound => LockState::Unlocked,
            Err(e) => {
                tracing::debug!("lock probe failed for {}: {}", path.display(), e);
                LockState::Locked
            }
        }
    }
}

/// Officeが作る所有者ファイルのパス
pub fn owner_file_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(format!("~${}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_file_path() {
        let owner = owner_file_path(Path::new("out/property_info.xlsx")).unwrap();
        assert_eq!(owner, PathBuf::from("out/~$property_info.xlsx"));
    }

    #[test]
    fn test_missing_file_is_unlocked() {
        let path = std::env::temp_dir().join("listing-harvester-no-such-table.xlsx");
        std::fs::remove_file(&path).ok();
        assert_eq!(FileLockProbe.state(&path), LockState::Unlocked);
    }

    #[test]
    fn test_owner_file_means_locked() {
        let dir = std::env::temp_dir().join("listing-harvester-lock-owner");
        std::fs::create_dir_all(&dir).unwrap();
        let table = dir.join("book.xlsx");
        std::fs::write(&table, b"x").unwrap();
        assert_eq!(FileLockProbe.state(&table), LockState::Unlocked);

        std::fs::write(dir.join("~$book.xlsx"), b"owner").unwrap();
        assert!(FileLockProbe.state(&table).is_locked());

        std::fs::remove_dir_all(&dir).ok();
    }
}
