// ABOUTME: CLI binary for the clipcrawl hashtag crawler.
// ABOUTME: Merges config file and flags, runs the crawl, and writes timestamped CSV/JSON outputs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use clipcrawl::{output, Browser, Crawler, CrawlerBuilder, FileConfig, OutputPaths, RenderBackend};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clipcrawl")]
#[command(about = "Crawl hashtag feeds and export video and comment tables")]
struct Args {
    /// Hashtags to crawl (leading # optional)
    #[arg()]
    hashtags: Vec<String>,

    /// TOML config file; flags override its values
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Maximum videos visited per hashtag
    #[arg(long = "max-videos")]
    max_videos: Option<usize>,

    /// Scroll rounds on each feed page
    #[arg(long = "scroll-rounds")]
    scroll_rounds: Option<usize>,

    /// Maximum comments kept per video
    #[arg(long = "comment-cap")]
    comment_cap: Option<usize>,

    /// Lower bound of the pause between videos, in ms
    #[arg(long = "min-delay-ms")]
    min_delay_ms: Option<u64>,

    /// Upper bound of the pause between videos, in ms
    #[arg(long = "max-delay-ms")]
    max_delay_ms: Option<u64>,

    /// Per-page navigation timeout in seconds
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// Site root used to build feed URLs
    #[arg(long = "base-url")]
    base_url: Option<String>,

    /// Render pages through a Browserless service at this URL
    #[arg(long = "browserless-url")]
    browserless_url: Option<String>,

    /// Browserless API token
    #[arg(long = "browserless-token", env = "BROWSERLESS_TOKEN", hide_env_values = true)]
    browserless_token: Option<String>,

    /// Render pages in a local headless Chrome (scrolls the live page)
    #[cfg(feature = "chrome")]
    #[arg(long = "chrome", conflicts_with = "browserless_url")]
    chrome: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Directory for the output files
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Print the run summary as JSON to stdout
    #[arg(long = "json")]
    json_output: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "clipcrawl=debug,clipcrawl_extract=debug"
    } else {
        "clipcrawl=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file first, then flags.
fn builder_from(args: &Args) -> Result<CrawlerBuilder> {
    let mut builder = CrawlerBuilder::new();

    if let Some(path) = &args.config {
        let file = FileConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        builder = file.apply(builder);
    }

    builder = builder.hashtags(&args.hashtags);
    if let Some(v) = args.max_videos {
        builder = builder.max_videos_per_hashtag(v);
    }
    if let Some(v) = args.scroll_rounds {
        builder = builder.scroll_rounds(v);
    }
    if let Some(v) = args.comment_cap {
        builder = builder.comment_cap(v);
    }
    if args.min_delay_ms.is_some() || args.max_delay_ms.is_some() {
        let current = builder.clone().options();
        builder = builder.delay_range(
            args.min_delay_ms.map_or(current.min_delay, Duration::from_millis),
            args.max_delay_ms.map_or(current.max_delay, Duration::from_millis),
        );
    }
    if let Some(v) = args.timeout_secs {
        if v == 0 {
            bail!("--timeout-secs must be positive");
        }
        builder = builder.navigation_timeout(Duration::from_secs(v));
    }
    if let Some(v) = &args.base_url {
        builder = builder.base_url(v.clone());
    }
    if let Some(endpoint) = &args.browserless_url {
        builder = builder.backend(RenderBackend::Browserless {
            endpoint: endpoint.clone(),
            token: args.browserless_token.clone(),
        });
    }
    if args.allow_private_networks {
        builder = builder.allow_private_networks(true);
    }

    let opts = builder.clone().options();
    if opts.hashtags.is_empty() {
        bail!("at least one hashtag is required (as an argument or in --config)");
    }
    url::Url::parse(&opts.base_url)
        .with_context(|| format!("invalid base URL {}", opts.base_url))?;

    Ok(builder)
}

/// Runs the crawl, writes outputs, and reports the summary.
async fn crawl_and_write<B: Browser>(mut crawler: Crawler<B>, args: &Args) {
    let results = crawler.run().await;
    let summary = results.summary();

    for report in &results.reports {
        info!(
            hashtag = %report.hashtag,
            state = %report.state,
            discovered = report.discovered,
            visited = report.visited,
            skipped = report.skipped,
            "hashtag report"
        );
    }

    let paths = OutputPaths::timestamped(&args.output_dir, chrono::Utc::now());
    let persisted = output::persist(&results, &paths);
    if !persisted.is_ok() {
        error!(failures = persisted.errors.len(), "some outputs were not written");
    }

    info!(
        videos = summary.total_videos,
        comments = summary.total_comments,
        avg_comments = format!("{:.2}", summary.avg_comments_per_video),
        total_views = summary.total_views,
        total_likes = summary.total_likes,
        unique_users = summary.unique_users,
        "run summary"
    );

    if args.json_output {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: could not encode summary: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let builder = match builder_from(&args) {
        Ok(builder) => builder,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    #[cfg(feature = "chrome")]
    if args.chrome {
        return match builder.build_chrome() {
            Ok(crawler) => {
                crawl_and_write(crawler, &args).await;
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::from(1)
            }
        };
    }

    match builder.build() {
        Ok(crawler) => {
            crawl_and_write(crawler, &args).await;
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
