use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "swipecards")]
#[command(about = "スワイプカード評価ツール（画像・表データ行の like/pass 判定）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 入力JSONを検証（カード構築・データセット解決まで行う）
    Validate {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 端末で対話的にスワイプ
    Play {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 結果の保存先JSON
        #[arg(short, long)]
        results_out: Option<PathBuf>,
    },

    /// 記録済みの操作スクリプトを再生
    Replay {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 操作スクリプト（イベントのJSON配列）
        #[arg(required = true)]
        script: PathBuf,

        /// 最終結果の保存先JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 結果JSONからレポートを生成
    Export {
        /// 結果JSONファイル
        #[arg(required = true)]
        results: PathBuf,

        /// カードのタイトル・データセット参照用の入力JSON
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力ファイル名（拡張子なし）
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Web版に渡すバンドル（データセット・画像同梱）を作成
    Bundle {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル
        #[arg(short, long, default_value = "bundle.json")]
        output: PathBuf,
    },

    /// データセットキャッシュの状況を表示
    Cache {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 確定しきい値 (px)
        #[arg(long)]
        set_threshold: Option<f64>,

        /// フリック速度しきい値 (px/ms)
        #[arg(long)]
        set_fling_velocity: Option<f64>,

        /// 奥に見せるカード枚数
        #[arg(long)]
        set_peek_count: Option<usize>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum ExportFormat {
    Json,
    Excel,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_parse() {
        assert!(matches!("JSON".parse::<ExportFormat>(), Ok(ExportFormat::Json)));
        assert!(matches!("xlsx".parse::<ExportFormat>(), Ok(ExportFormat::Excel)));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_cli_parses_play() {
        let cli = Cli::try_parse_from(["swipecards", "-v", "play", "cards.json", "-r", "out.json"])
            .expect("引数解析失敗");
        assert!(cli.verbose);
        match cli.command {
            Commands::Play { input, results_out } => {
                assert_eq!(input, PathBuf::from("cards.json"));
                assert_eq!(results_out, Some(PathBuf::from("out.json")));
            }
            _ => panic!("play として解析されていない"),
        }
    }
}
