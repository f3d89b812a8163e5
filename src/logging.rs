//! tracing の初期化
//!
//! 進捗表示は println!、診断ログは tracing（stderr）に分ける。

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// RUST_LOG を優先し、未指定なら warn（--verbose で debug）
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("listing_harvester={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
