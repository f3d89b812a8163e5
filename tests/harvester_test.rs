//! 監視ループの統合テスト
//!
//! 走査・追記・保存の1サイクルと、ロック待ち・保存失敗時の挙動を検証

use listing_harvester::config::Config;
use listing_harvester::error::{HarvestError, Result};
use listing_harvester::store::{
    FileLockProbe, ListingTable, LockProbe, LockState, TableStore, XlsxStore,
};
use listing_harvester::tracker::ProcessedSet;
use listing_harvester::Harvester;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn test_config(dir: &TempDir) -> Config {
    let input_dir = dir.path().join("listings");
    std::fs::create_dir_all(&input_dir).unwrap();
    Config {
        input_dir,
        table_path: dir.path().join("property_info.xlsx"),
        processed_path: dir.path().join("processed_files.txt"),
        poll_interval_secs: 1,
        lock_retry_secs: 1,
        ..Default::default()
    }
}

fn write_listing(config: &Config, name: &str, text: &str) {
    std::fs::write(config.input_dir.join(name), text).unwrap();
}

/// 1ファイルを1サイクルで取り込む
#[tokio::test]
async fn test_single_cycle_appends_row_and_marks_processed() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(
        &config,
        "listing1.txt",
        "https://example.com/home/1\n$699,000\n$725,000 Zestimate\n2 beds 1 bath\n",
    );

    let mut harvester = Harvester::from_config(config.clone()).unwrap();
    let report = harvester.run_cycle().await;

    assert_eq!(report.appended, vec!["listing1.txt".to_string()]);
    assert!(report.persisted);

    let table = XlsxStore::new(&config.table_path).read().unwrap();
    assert_eq!(table.len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.file_name, "listing1.txt");
    assert_eq!(row.record.market_value.as_deref(), Some("725,000"));
    assert_eq!(row.record.price.as_deref(), Some("699,000"));
    assert_eq!(row.record.bedrooms.as_deref(), Some("2"));
    assert_eq!(row.record.url.as_deref(), Some("https://example.com/home/1"));
    assert_eq!(row.record.description.as_deref(), Some("N/A"));
    assert_eq!(row.record.hoa_fee, None);

    let processed = ProcessedSet::load(&config.processed_path).unwrap();
    assert!(processed.contains("listing1.txt"));
}

/// 処理済みファイルは内容が変わっても再処理しない
#[tokio::test]
async fn test_processed_file_is_never_reprocessed() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, "a.txt", "$100,000");

    let mut harvester = Harvester::from_config(config.clone()).unwrap();
    harvester.run_cycle().await;

    write_listing(&config, "a.txt", "$200,000 changed");
    let report = harvester.run_cycle().await;
    assert!(report.appended.is_empty());

    // 再起動後も同じ
    let mut restarted = Harvester::from_config(config.clone()).unwrap();
    let report = restarted.run_cycle().await;
    assert!(report.appended.is_empty());
    assert_eq!(restarted.table().len(), 1);
    assert_eq!(
        restarted.table().rows()[0].record.price.as_deref(),
        Some("100,000")
    );
}

/// 対象拡張子以外は無視し、ファイル名順に追記
#[tokio::test]
async fn test_scan_order_and_suffix_filter() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, "b.txt", "$2");
    write_listing(&config, "a.txt", "$1");
    write_listing(&config, "notes.md", "$3");

    let mut harvester = Harvester::from_config(config).unwrap();
    let report = harvester.run_cycle().await;

    assert_eq!(report.appended, vec!["a.txt".to_string(), "b.txt".to_string()]);
    assert_eq!(
        harvester.table().file_names().collect::<Vec<_>>(),
        vec!["a.txt", "b.txt"]
    );
}

/// 拡張子だけの名前 `.txt` も取り込み対象
#[tokio::test]
async fn test_bare_extension_file_is_ingested() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, ".txt", "$1");

    let mut harvester = Harvester::from_config(config.clone()).unwrap();
    let report = harvester.run_cycle().await;

    assert_eq!(report.appended, vec![".txt".to_string()]);
    let table = XlsxStore::new(&config.table_path).read().unwrap();
    assert_eq!(table.rows()[0].record.price.as_deref(), Some("1"));
    assert!(ProcessedSet::load(&config.processed_path).unwrap().contains(".txt"));
}

/// 入力フォルダがなくてもループは止まらない
#[tokio::test]
async fn test_missing_input_folder_is_not_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut config = test_config(&dir);
    config.input_dir = dir.path().join("does-not-exist");

    let mut harvester = Harvester::from_config(config).unwrap();
    let report = harvester.run_cycle().await;

    assert!(report.scan_error.is_some());
    assert!(report.appended.is_empty());
    assert!(report.persisted);
}

/// 読めないファイルは飛ばして次回に回す
#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_file_is_skipped_and_retried() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, "good.txt", "$1");
    // 権限を落として読めなくする
    write_listing(&config, "locked.txt", "$2");
    let locked = config.input_dir.join("locked.txt");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // root 実行時は権限に関係なく読めるため検証しない
    if std::fs::read(&locked).is_ok() {
        return;
    }

    let mut harvester = Harvester::from_config(config).unwrap();
    let report = harvester.run_cycle().await;
    assert_eq!(report.appended, vec!["good.txt".to_string()]);
    assert_eq!(report.skipped, vec!["locked.txt".to_string()]);
    assert!(!harvester.processed().contains("locked.txt"));

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
    let report = harvester.run_cycle().await;
    assert_eq!(report.appended, vec!["locked.txt".to_string()]);
}

/// 台帳にあるのに一覧にないファイル名は起動時に補完
#[tokio::test]
async fn test_startup_reconciles_processed_set_with_table() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, "a.txt", "$1");

    let mut harvester = Harvester::from_config(config.clone()).unwrap();
    harvester.run_cycle().await;

    // 台帳保存後・一覧保存前に落ちた状態を再現
    std::fs::remove_file(&config.processed_path).unwrap();

    let mut restarted = Harvester::from_config(config).unwrap();
    assert!(restarted.processed().contains("a.txt"));
    let report = restarted.run_cycle().await;
    assert!(report.appended.is_empty());
    assert_eq!(restarted.table().len(), 1);
}

/// 保存に失敗する台帳（メモリ上）
struct FlakyStore {
    path: PathBuf,
    fail: Cell<bool>,
    saved: RefCell<Option<ListingTable>>,
}

impl TableStore for FlakyStore {
    fn load_or_init(&self) -> Result<ListingTable> {
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, table: &ListingTable) -> Result<()> {
        if self.fail.get() {
            return Err(HarvestError::Store(format!("disk full: {}", self.path.display())));
        }
        *self.saved.borrow_mut() = Some(table.clone());
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// 保存失敗時は一覧を書き換えず、次のサイクルで再保存する
#[tokio::test]
async fn test_persist_failure_keeps_rows_for_next_cycle() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, "a.txt", "$1");

    let store = FlakyStore {
        path: config.table_path.clone(),
        fail: Cell::new(true),
        saved: RefCell::new(None),
    };
    let mut harvester = Harvester::startup(config.clone(), store, FileLockProbe).unwrap();

    let report = harvester.run_cycle().await;
    assert!(!report.persisted);
    assert_eq!(report.appended, vec!["a.txt".to_string()]);
    assert!(!config.processed_path.exists(), "台帳保存前に一覧が書かれている");

    harvester.store().fail.set(false);
    write_listing(&config, "b.txt", "$2");
    let report = harvester.run_cycle().await;
    assert!(report.persisted);

    let saved = harvester.store().saved.borrow().clone().unwrap();
    assert_eq!(saved.file_names().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);
    let processed = ProcessedSet::load(&config.processed_path).unwrap();
    assert_eq!(processed.len(), 2);
}

/// 指定回数だけ Locked を返す判定
struct CountdownProbe {
    remaining: Cell<u32>,
    checks: Cell<u32>,
}

impl LockProbe for CountdownProbe {
    fn state(&self, _path: &Path) -> LockState {
        self.checks.set(self.checks.get() + 1);
        if self.remaining.get() > 0 {
            self.remaining.set(self.remaining.get() - 1);
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }
}

/// 台帳が開かれている間は待機してから処理する
#[tokio::test(start_paused = true)]
async fn test_waits_while_store_is_locked() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, "a.txt", "$1");

    let probe = CountdownProbe {
        remaining: Cell::new(3),
        checks: Cell::new(0),
    };
    let store = XlsxStore::new(&config.table_path);
    let mut harvester = Harvester::startup(config, store, probe).unwrap();

    let started = tokio::time::Instant::now();
    let report = harvester.run_cycle().await;

    assert_eq!(report.appended, vec!["a.txt".to_string()]);
    assert!(started.elapsed() >= std::time::Duration::from_secs(3));
    assert_eq!(harvester.probe().checks.get(), 4);
}

/// shutdown で最終保存してループを抜ける
#[tokio::test(start_paused = true)]
async fn test_run_until_shutdown_persists() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);
    write_listing(&config, "a.txt", "$1");

    let mut harvester = Harvester::from_config(config.clone()).unwrap();
    let shutdown = tokio::time::sleep(std::time::Duration::from_millis(2500));
    harvester.run_until(shutdown).await;

    let table = XlsxStore::new(&config.table_path).read().unwrap();
    assert_eq!(table.file_names().collect::<Vec<_>>(), vec!["a.txt"]);
    assert!(ProcessedSet::load(&config.processed_path).unwrap().contains("a.txt"));
}
