use anyhow::Context;
use clap::Parser;
use swipecards::{cards, cli, config, dataset, export, session};
use cli::{Cli, Commands};
use config::Config;
use swipecards_common::{DatasetResolver, SwipeResults, SwipeStack};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Validate { input } => {
            println!("🔍 swipecards - 入力検証\n");

            let loaded = cards::load_input(&input)?;
            let mut cache = loaded.cache();
            let built = cards::build_from_input(&loaded, &mut cache)?;

            let tables = built.iter().filter(|c| c.table().is_some()).count();
            println!("✔ {}枚のカード（画像 {} / 表 {}）", built.len(), built.len() - tables, tables);
            for reference in cache.references() {
                if let Some(table) = cache.get(reference) {
                    println!("  - {}: {}行 × {}列", reference, table.row_count(), table.column_count());
                }
            }
            let mode = loaded.input.display_mode;
            let options = if loaded.input.options == Default::default() {
                &config.render
            } else {
                &loaded.input.options
            };
            println!("  表示モード: {:?} (高さ {}px)", mode, options.viewport_height(mode));
            println!("\n✅ 検証完了");
        }

        Commands::Play { input, results_out } => {
            let stack = mount(&input, &config)?;
            let results_out = results_out.or_else(|| {
                config
                    .results_dir
                    .as_ref()
                    .map(|dir| dir.join(format!("{}.json", export::default_title())))
            });
            session::run_interactive(stack, results_out.as_deref())?;
        }

        Commands::Replay { input, script, output } => {
            println!("⏯ swipecards - 操作スクリプト再生\n");

            let mut stack = mount(&input, &config)?;
            let events = session::load_script(&script)?;
            println!("✔ {}件のイベント", events.len());

            let report = session::replay(&mut stack, &events);
            for (i, notice) in &report.notices {
                println!("⚠ イベント{}: {}", i + 1, notice.message());
            }
            println!("✔ 結果取得 {}回", report.delivered.len());
            println!("  {}", stack.counter_text());
            println!("  like: {:?}", report.final_results.liked);
            println!("  pass: {:?}", report.final_results.passed);

            if let Some(path) = output {
                let json = swipecards_common::export::results_json(&report.final_results)?;
                std::fs::write(&path, json)?;
                println!("✔ 結果を保存: {}", path.display());
            }
        }

        Commands::Export { results, input, format, output, title } => {
            println!("📄 swipecards - エクスポート\n");

            let content = std::fs::read_to_string(&results)
                .with_context(|| format!("結果ファイルを読めません: {}", results.display()))?;
            let snapshot: SwipeResults = serde_json::from_str(&content)?;

            let built = match input {
                Some(path) => {
                    let loaded = cards::load_input(&path)?;
                    let mut cache = loaded.cache();
                    cards::build_from_input(&loaded, &mut cache)?
                }
                None => Vec::new(),
            };

            let output_dir = output.unwrap_or_else(|| config.results_dir());
            let title = title.unwrap_or_else(export::default_title);
            export::export_results(&snapshot, &built, &format, &output_dir, &title)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Bundle { input, output } => {
            println!("📦 swipecards - バンドル作成\n");

            let loaded = cards::load_input(&input)?;
            let (bundle, inlined) = cards::make_bundle(&loaded)?;
            std::fs::write(&output, serde_json::to_string(&bundle)?)?;

            println!("✔ データセット {}件 / 画像 {}枚を同梱", bundle.datasets.len(), inlined);
            println!("✔ 出力: {}", output.display());
        }

        Commands::Cache { input } => {
            let loaded = cards::load_input(&input)?;
            let mut cache = loaded.cache();

            let mut references: Vec<&str> = loaded
                .input
                .cards
                .iter()
                .filter_map(|c| c.dataset.as_deref())
                .collect();
            references.extend(loaded.input.dataset.as_deref());

            println!("データセットキャッシュ:");
            for reference in &references {
                if let Err(e) = cache.resolve(reference) {
                    println!("  ⚠ {}: {}", reference, e);
                }
            }
            let stats = cache.stats();
            println!("  参照数: {}", references.len());
            println!("  読み込み: {}件", stats.misses);
            println!("  キャッシュヒット: {}件", stats.hits);
            for reference in cache.references() {
                println!("  - {} ({})", reference, cache.resolve_path(reference).display());
            }
        }

        Commands::Config { set_threshold, set_fling_velocity, set_peek_count, show } => {
            let mut config = config;
            let changed = set_threshold.is_some() || set_fling_velocity.is_some() || set_peek_count.is_some();

            if let Some(threshold) = set_threshold {
                config.swipe.distance_threshold = threshold;
            }
            if let Some(velocity) = set_fling_velocity {
                config.swipe.fling_velocity = velocity;
            }
            if let Some(count) = set_peek_count {
                config.swipe.peek_count = count;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  確定しきい値: {}px", config.swipe.distance_threshold);
                println!("  フリック速度: {}px/ms", config.swipe.fling_velocity);
                println!("  回転係数: {}deg/px", config.swipe.rotation_factor);
                println!("  アニメーション: {}ms / 戻り {}ms / 戻す {}ms",
                    config.swipe.fling_out_ms, config.swipe.return_ms, config.swipe.undo_ms);
                println!("  奥のカード: {}枚", config.swipe.peek_count);
                println!("  結果保存先: {}", config.results_dir().display());
            }
        }
    }

    Ok(())
}

/// 入力JSONからスタックを組み立てる
fn mount(input: &std::path::Path, config: &Config) -> anyhow::Result<SwipeStack> {
    let loaded = cards::load_input(input)?;
    let mut cache: dataset::DatasetCache = loaded.cache();
    let built = cards::build_from_input(&loaded, &mut cache)?;

    let options = if loaded.input.options == Default::default() {
        config.render.clone()
    } else {
        loaded.input.options.clone()
    };
    let stack = SwipeStack::new(built, config.swipe.clone())?
        .with_display(loaded.input.display_mode, options);
    Ok(stack)
}
