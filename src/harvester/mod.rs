//! 監視ループ
//!
//! ## 状態遷移
//! 1. Startup: 処理済み一覧と台帳を読み込み、台帳側のファイル名で一覧を補完
//! 2. WaitForStoreUnlocked: 台帳が開かれている間は待機
//! 3. ScanAndProcess: 未処理ファイルを抽出して台帳に追記
//! 4. PersistAndSleep: 台帳 → 処理済み一覧の順に保存して待機し、2へ戻る
//!
//! 保存の失敗はループを止めない。メモリ上の台帳は次のサイクルで再保存される。

use crate::config::Config;
use crate::error::Result;
use crate::scanner::{self, ListingFile};
use crate::store::{FileLockProbe, ListingTable, LockProbe, LockState, TableStore, XlsxStore};
use crate::tracker::ProcessedSet;
use listing_harvester_common::extract;
use std::future::Future;

/// 1サイクルの処理結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// 台帳に追記したファイル名
    pub appended: Vec<String>,
    /// 読み込めずに次回へ回したファイル名
    pub skipped: Vec<String>,
    /// フォルダを走査できなかった理由
    pub scan_error: Option<String>,
    /// 保存に成功したか
    pub persisted: bool,
}

/// 監視ループの状態
pub struct Harvester<S, P> {
    config: Config,
    store: S,
    probe: P,
    table: ListingTable,
    processed: ProcessedSet,
}

impl Harvester<XlsxStore, FileLockProbe> {
    /// 設定どおりのExcel台帳で起動
    pub fn from_config(config: Config) -> Result<Self> {
        let store = XlsxStore::new(config.table_path.clone());
        Self::startup(config, store, FileLockProbe)
    }
}

impl<S: TableStore, P: LockProbe> Harvester<S, P> {
    /// Startup: 処理済み一覧と台帳を読み込む
    pub fn startup(config: Config, store: S, probe: P) -> Result<Self> {
        let mut processed = ProcessedSet::load(&config.processed_path)?;
        let table = store.load_or_init()?;

        // 台帳保存後・一覧保存前に落ちた場合の取りこぼしを補完
        let reconciled = processed.extend_from(table.file_names().map(str::to_string));
        if reconciled > 0 {
            tracing::info!("{} file(s) found in the table but not in the processed list", reconciled);
        }

        tracing::debug!(
            "startup: {} row(s) in {}, {} processed file(s)",
            table.len(),
            store.location().display(),
            processed.len()
        );

        Ok(Self {
            config,
            store,
            probe,
            table,
            processed,
        })
    }

    pub fn table(&self) -> &ListingTable {
        &self.table
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn lock_state(&self) -> LockState {
        self.probe.state(self.store.location())
    }

    /// WaitForStoreUnlocked: 台帳が閉じられるまで待つ
    pub async fn wait_for_unlock(&self) {
        while self.lock_state().is_locked() {
            println!("Spreadsheet is open. Pausing until it is closed.");
            tokio::time::sleep(self.config.lock_retry()).await;
        }
    }

    /// ScanAndProcess: 未処理ファイルを台帳に追記
    pub fn scan_and_process(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        println!("[{}] Checking for new text files...", timestamp());

        let suffix = self.config.input_suffix();
        let files = match scanner::scan_unprocessed(&self.config.input_dir, &suffix, &self.processed) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("scan skipped: {}", e);
                report.scan_error = Some(e.to_string());
                return report;
            }
        };

        for file in files {
            println!("Found new file: {}", file.file_name);
            match self.process_file(&file) {
                Ok(()) => report.appended.push(file.file_name),
                Err(e) => {
                    tracing::warn!("{} skipped until next cycle: {}", file.file_name, e);
                    report.skipped.push(file.file_name);
                }
            }
        }

        report
    }

    fn process_file(&mut self, file: &ListingFile) -> Result<()> {
        let text = file.read_text()?;
        let record = extract(&text);
        self.table.append(file.file_name.clone(), &record);
        self.processed.insert(file.file_name.clone());
        Ok(())
    }

    /// 台帳 → 処理済み一覧の順に保存
    ///
    /// 台帳の保存に失敗した場合は一覧を書き換えない。
    pub fn persist(&self) -> Result<()> {
        self.store.save(&self.table)?;
        self.processed.save(&self.config.processed_path)?;
        Ok(())
    }

    /// 保存を試み、失敗はログに残して続行
    fn persist_or_report(&self) -> bool {
        match self.persist() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving spreadsheet: {}", e);
                println!("Error saving spreadsheet: {}", e);
                false
            }
        }
    }

    /// 1サイクル（待機 → 走査 → 保存）
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.wait_for_unlock().await;
        let mut report = self.scan_and_process();
        report.persisted = self.persist_or_report();
        report
    }

    /// shutdown が完了するまでループし、最後に一度保存を試みる
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = self.wait_for_unlock() => {}
                _ = &mut shutdown => break,
            }

            let report = self.scan_and_process();
            let persisted = self.persist_or_report();
            tracing::debug!(
                "cycle done: {} appended, {} skipped, persisted={}",
                report.appended.len(),
                report.skipped.len(),
                persisted
            );

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
                _ = &mut shutdown => break,
            }
        }

        if self.lock_state().is_locked() {
            tracing::warn!("spreadsheet is locked; skipping final save");
        } else {
            self.persist_or_report();
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
