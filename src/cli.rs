use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "listing-harvester")]
#[command(about = "物件テキストから項目を抽出してExcel台帳に追記するツール", long_about = None)]
pub struct Cli {
    /// 省略時は監視ループ（watch）
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 物件テキストのフォルダ（設定ファイルより優先）
    #[arg(long, global = true)]
    pub input_dir: Option<PathBuf>,

    /// 出力台帳（.xlsx）
    #[arg(long, global = true)]
    pub table: Option<PathBuf>,

    /// 処理済みファイル一覧
    #[arg(long, global = true)]
    pub processed: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Commands {
    /// フォルダを監視して新しいファイルを台帳に追記（終了しない）
    Watch,

    /// 1サイクルだけ処理して終了
    Once,

    /// 1ファイルの抽出結果をJSONで表示
    Extract {
        /// 物件テキストファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 台帳・処理済み一覧の状態を表示
    Status,

    /// 設定を表示/編集
    Config {
        /// 入力フォルダを設定
        #[arg(long)]
        set_input_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

impl Cli {
    /// 実行するコマンド（省略時は Watch）
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Watch)
    }
}
