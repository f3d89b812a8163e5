use clap::Parser;
use listing_harvester::{cli, config, error, harvester, logging, scanner, store, tracker};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use harvester::Harvester;
use store::{FileLockProbe, LockProbe, TableStore, XlsxStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(table) = &cli.table {
        config.table_path = table.clone();
    }
    if let Some(processed) = &cli.processed {
        config.processed_path = processed.clone();
    }

    match cli.command() {
        Commands::Watch => {
            println!("listing-harvester - watching {}\n", config.input_dir.display());
            let mut harvester = Harvester::from_config(config)?;
            println!(
                "✔ {} row(s) in {}, {} file(s) already processed\n",
                harvester.table().len(),
                harvester.config().table_path.display(),
                harvester.processed().len()
            );

            harvester.run_until(shutdown_signal()).await;
            println!("\n✅ stopped");
        }

        Commands::Once => {
            let mut harvester = Harvester::from_config(config)?;
            let report = harvester.run_cycle().await;

            println!("✔ {} file(s) appended", report.appended.len());
            if !report.skipped.is_empty() {
                println!("  skipped (retry next run): {}", report.skipped.join(", "));
            }
            if let Some(reason) = &report.scan_error {
                println!("  scan failed: {}", reason);
            }
            if !report.persisted {
                println!("✖ spreadsheet was not saved");
            }
        }

        Commands::Extract { file } => {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let listing = scanner::ListingFile { path: file, file_name };
            let record = listing_harvester::extract(&listing.read_text()?);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Status => {
            let store = XlsxStore::new(config.table_path.clone());
            let processed = tracker::ProcessedSet::load(&config.processed_path)?;

            println!("Status:");
            println!("  input folder: {}", config.input_dir.display());
            if store.location().exists() {
                let table = store.read()?;
                println!("  spreadsheet: {} ({} rows)", store.location().display(), table.len());
            } else {
                println!("  spreadsheet: {} (not created yet)", store.location().display());
            }
            println!("  lock: {}", FileLockProbe.state(store.location()));
            println!(
                "  processed list: {} ({} files)",
                config.processed_path.display(),
                processed.len()
            );
        }

        Commands::Config { set_input_dir, show } => {
            if let Some(dir) = set_input_dir {
                // CLI・環境変数の上書き分は保存しない
                let mut stored = Config::load_from(&Config::config_path()?)?;
                stored.set_input_dir(dir.clone())?;
                config.input_dir = dir;
                println!("✔ input folder saved to {}", Config::config_path()?.display());
            }

            if show {
                println!("Config:");
                println!("  input folder: {}", config.input_dir.display());
                println!("  spreadsheet: {}", config.table_path.display());
                println!("  processed list: {}", config.processed_path.display());
                println!("  extension: {}", config.input_suffix());
                println!("  poll interval: {}s", config.poll_interval_secs);
                println!("  lock retry: {}s", config.lock_retry_secs);
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
