use anyhow::Result;
use clap::{Parser, Subcommand};
use pagefreq_core::{validate_url, ChartKind};
use pagefreq_local::chart::build_chart;
use pagefreq_local::{
    analyze_url, ChartConfig, FetchConfig, LocalFetcher, PipelineConfig, Tokenizer,
    WordCloudConfig, WordCloudRenderer,
};
use std::path::PathBuf;
use std::process::ExitCode;
mod report;

#[derive(Parser, Debug)]
#[command(name = "pagefreq")]
#[command(about = "Rank the words of a web page and chart them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a page, print its top words, and write chart.json / wordcloud.png / report.json.
    Run(RunCmd),
    /// List the accepted chart selectors.
    ChartKinds(ChartKindsCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct RunCmd {
    /// Page to analyze. Must start with http:// or https://.
    url: String,
    /// Chart kind: bar, line, pie, scatter, area, donut, radar (or the Chinese labels).
    #[arg(long, default_value = "bar")]
    chart: String,
    /// Output directory (default: .generated/pagefreq-<epoch>)
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Font file used for the word cloud (.ttf/.otf/.ttc).
    #[arg(long, env = "PAGEFREQ_FONT")]
    font: Option<PathBuf>,
    /// Number of ranked rows to keep.
    #[arg(long)]
    top_n: Option<usize>,
    /// Render wordcloud.png. Disable when no CJK-capable font is available.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    wordcloud: bool,
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
    /// Override "now" for deterministic output paths.
    #[arg(long)]
    now_epoch_s: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct ChartKindsCmd {
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

/// `PAGEFREQ_LOG`, then `RUST_LOG`, then `warn`. Logs go to stderr.
fn init_tracing() {
    let directives = ["PAGEFREQ_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "warn".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(args: RunCmd) -> Result<()> {
    // Checked before any network traffic.
    let kind: ChartKind = args.chart.parse()?;
    validate_url(&args.url)?;

    let mut pipeline_cfg = PipelineConfig::from_env();
    if let Some(n) = args.top_n {
        pipeline_cfg.top_n = n;
    }
    let tokenizer = Tokenizer::from_config(&pipeline_cfg)?;

    let mut cloud_cfg = WordCloudConfig::from_env();
    if let Some(p) = args.font.clone() {
        cloud_cfg.font_path = p;
    }
    // Load the font up front so a missing font fails before the fetch.
    let renderer = if args.wordcloud {
        Some(WordCloudRenderer::from_config(cloud_cfg)?)
    } else {
        None
    };

    let fetcher = LocalFetcher::new(FetchConfig::from_env())?;
    let req = fetcher.request(&args.url);
    let page = analyze_url(&fetcher, &req, &tokenizer, &pipeline_cfg).await?;
    if page.truncated {
        tracing::warn!(url = %page.url, "response body was truncated; counts cover the prefix only");
    }

    let chart = build_chart(kind, &page.analysis.table, &ChartConfig::from_env());

    let now = args.now_epoch_s.unwrap_or_else(report::now_epoch_s);
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| report::default_out_dir(now));
    std::fs::create_dir_all(&out_dir)?;

    let mut artifacts = report::Artifacts::default();
    let chart_path = out_dir.join("chart.json");
    report::write_json(&chart_path, &serde_json::to_value(&chart)?)?;
    artifacts.chart = Some(chart_path);

    if let Some(r) = &renderer {
        let cloud = r.render(&page.analysis.table);
        let png_path = out_dir.join("wordcloud.png");
        cloud.save_png(&png_path)?;
        tracing::debug!(placed = cloud.words.len(), path = %png_path.display(), "wrote word cloud");
        artifacts.wordcloud = Some(png_path);
    }

    let report_path = out_dir.join("report.json");
    let report_v = report::report_json(&page, &chart, &artifacts, now);
    report::write_json(&report_path, &report_v)?;

    match args.output.to_ascii_lowercase().as_str() {
        "json" => {
            let v = serde_json::json!({
                "schema_version": report::REPORT_SCHEMA_VERSION,
                "kind": "run",
                "ok": true,
                "url": page.url,
                "chart_kind": kind.as_str(),
                "out_dir": out_dir.display().to_string(),
                "table": page.analysis.table,
            });
            println!("{v}");
        }
        _ => {
            print!("{}", report::render_table_text(&page.analysis.table));
            println!("wrote {}", out_dir.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => match run(args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => match e.downcast_ref::<pagefreq_core::Error>() {
                Some(pe) if pe.is_user_facing_warning() => {
                    eprintln!("warning: {pe}");
                    ExitCode::from(2)
                }
                _ => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            },
        },
        Commands::ChartKinds(args) => {
            match args.output.to_ascii_lowercase().as_str() {
                "json" => {
                    let kinds: Vec<serde_json::Value> = ChartKind::ALL
                        .iter()
                        .map(|k| serde_json::json!({"name": k.as_str(), "label": k.label_zh()}))
                        .collect();
                    println!("{}", serde_json::json!({"schema_version": 1, "kinds": kinds}));
                }
                _ => {
                    for k in ChartKind::ALL {
                        println!("{}\t{}", k.as_str(), k.label_zh());
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "pagefreq",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("pagefreq {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
            ExitCode::SUCCESS
        }
    }
}
