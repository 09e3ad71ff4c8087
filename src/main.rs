//! Linkscout main entry point
//!
//! This is the command-line interface for the Linkscout relevancy crawler.

use anyhow::Context;
use clap::Parser;
use linkscout::classify::PriorityTier;
use linkscout::config::{load_config_with_hash, parse_keywords, Config, CrawlSettings, Overrides};
use linkscout::crawler::run_crawl;
use linkscout::output::{
    load_statistics, print_links, print_pages, print_statistics, print_summary, SettingsReport,
};
use linkscout::storage::{PageFilter, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Configuration file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_PATH: &str = "linkscout.toml";

/// Linkscout: a relevancy-tiered web crawler
///
/// Linkscout crawls seed sites depth-first, records every page it fetches and
/// every link it finds, and tags each link HIGH, MEDIUM, LOW or NONE by
/// keyword match and an optional LLM relevancy score.
#[derive(Parser, Debug)]
#[command(name = "linkscout")]
#[command(version)]
#[command(about = "A relevancy-tiered web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults to ./linkscout.toml when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Comma-separated high-priority keywords, replacing the configured set
    #[arg(long, value_name = "KEYWORDS")]
    high_priority: Option<String>,

    /// Comma-separated medium-priority keywords, replacing the configured set
    #[arg(long, value_name = "KEYWORDS")]
    medium_priority: Option<String>,

    /// Crawl the small test-mode seed set with its tight limits
    #[arg(long)]
    test: bool,

    /// Override the maximum crawl depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Override the maximum number of pages written
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Clear stored pages and links before crawling
    #[arg(long)]
    fresh: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_links", "list_pages"])]
    stats: bool,

    /// List stored links of one tier (high, medium, low, none) and exit
    #[arg(long, value_name = "TIER", conflicts_with_all = ["dry_run", "list_pages"])]
    list_links: Option<PriorityTier>,

    /// Maximum number of links listed
    #[arg(long, value_name = "N", requires = "list_links")]
    limit: Option<usize>,

    /// List stored pages and exit
    #[arg(long, conflicts_with = "dry_run")]
    list_pages: bool,

    /// Only list pages at this depth
    #[arg(long, value_name = "N", requires = "list_pages")]
    depth: Option<u32>,

    /// Only list pages whose URL contains this text
    #[arg(long, value_name = "TEXT", requires = "list_pages")]
    url_contains: Option<String>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;
    let settings = config.resolve(&overrides_from(&cli));

    if cli.dry_run {
        handle_dry_run(&settings);
    } else if cli.stats {
        handle_stats(&settings.database_path)?;
    } else if let Some(tier) = cli.list_links {
        handle_list_links(&settings.database_path, tier, cli.limit)?;
    } else if cli.list_pages {
        let filter = PageFilter {
            depth: cli.depth,
            url_contains: cli.url_contains.clone(),
        };
        handle_list_pages(&settings.database_path, &filter)?;
    } else {
        handle_crawl(settings, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkscout=info,warn"),
            1 => EnvFilter::new("linkscout=debug,info"),
            2 => EnvFilter::new("linkscout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the explicit config, else `./linkscout.toml`, else built-in defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => PathBuf::from(DEFAULT_CONFIG_PATH),
        None => {
            tracing::info!("No configuration file; using built-in defaults");
            return Ok(Config::default());
        }
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

fn overrides_from(cli: &Cli) -> Overrides {
    Overrides {
        high_priority: cli
            .high_priority
            .as_deref()
            .map(parse_keywords)
            .unwrap_or_default(),
        medium_priority: cli
            .medium_priority
            .as_deref()
            .map(parse_keywords)
            .unwrap_or_default(),
        test_mode: cli.test,
        max_depth: cli.max_depth,
        max_pages: cli.max_pages,
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(settings: &CrawlSettings) {
    println!("=== Linkscout Dry Run ===\n");
    print!("{}", SettingsReport(settings));
    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        settings.seeds.len()
    );
}

fn open_database(path: &Path) -> anyhow::Result<SqliteStorage> {
    SqliteStorage::new(path).with_context(|| format!("failed to open database {}", path.display()))
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(database_path: &Path) -> anyhow::Result<()> {
    println!("Database: {}\n", database_path.display());

    let storage = open_database(database_path)?;
    let stats = load_statistics(&storage).context("failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}

fn handle_list_links(
    database_path: &Path,
    tier: PriorityTier,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let storage = open_database(database_path)?;
    let links = storage
        .links_by_tier(tier, limit)
        .context("failed to query links")?;
    print_links(tier, &links);
    Ok(())
}

fn handle_list_pages(database_path: &Path, filter: &PageFilter) -> anyhow::Result<()> {
    let storage = open_database(database_path)?;
    let pages = storage.list_pages(filter).context("failed to query pages")?;
    print_pages(&pages);
    Ok(())
}

/// Handles the main crawl operation
///
/// Ctrl-C cancels the crawl after the page in flight; the partial summary is
/// still printed.
async fn handle_crawl(settings: CrawlSettings, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (clearing stored pages and links)");
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current page");
            interrupt.cancel();
        }
    });

    let database_path = settings.database_path.clone();
    let summary = run_crawl(settings, fresh, cancel)
        .await
        .context("crawl failed")?;

    print_summary(&summary);
    println!("\nResults stored in {}", database_path.display());

    Ok(())
}
