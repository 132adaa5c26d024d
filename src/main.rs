//! crawl-probe main entry point
//!
//! This is the command-line interface for the crawl-probe test runner.

use clap::Parser;
use crawl_probe::checks::build_context;
use crawl_probe::config::{load_config_with_hash, Config};
use crawl_probe::crawler::crawl;
use crawl_probe::output::{report_crawl, ConsoleReporter, JUnitReporter, JsonReporter, Reporter};
use crawl_probe::transport::HttpTransport;
use crawl_probe::ProbeError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// crawl-probe: crawls a defined set of URLs and runs tests against the
/// received responses
#[derive(Parser, Debug)]
#[command(name = "crawl-probe")]
#[command(version)]
#[command(about = "Crawls a defined set of URLs and tests the responses", long_about = None)]
struct Cli {
    /// Path to the TOML crawl file
    #[arg(value_name = "CRAWL_FILE")]
    crawl_file: PathBuf,

    /// Number of requests allowed in flight at once (overrides the crawl file)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=100))]
    concurrency: Option<u16>,

    /// Silence console output
    #[arg(short = 'n', long)]
    silent: bool,

    /// File to write a JSON report to
    #[arg(short, long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// File to write a JUnit report to
    #[arg(short = 'u', long, value_name = "PATH")]
    junit: Option<PathBuf>,

    /// Validate the crawl file and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), ProbeError> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading crawl file from: {}", cli.crawl_file.display());
    let (config, config_hash) = match load_config_with_hash(&cli.crawl_file) {
        Ok((cfg, hash)) => {
            tracing::info!("Crawl file loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load crawl file: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match handle_crawl(&cli, config, config_hash).await {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_probe=warn,error"),
            1 => EnvFilter::new("crawl_probe=info,warn"),
            2 => EnvFilter::new("crawl_probe=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows the crawl plan without fetching anything
fn handle_dry_run(config: &Config) {
    println!("=== crawl-probe Dry Run ===\n");

    println!("Crawler:");
    println!("  Concurrency: {}", config.crawler.concurrency);

    println!("\nTransport:");
    println!("  User agent: {}", config.transport.user_agent);
    match config.transport.timeout_ms {
        Some(ms) => println!("  Timeout: {}ms", ms),
        None => println!("  Timeout: none"),
    }
    println!("  Keep-alive: {}", config.transport.keep_alive);
    println!("  Follow redirects: {}", config.transport.follow_redirects);
    for (name, value) in &config.transport.headers {
        println!("  Header: {}: {}", name, value);
    }

    println!("\nResources ({}):", config.resources.len());
    for resource in &config.resources {
        if resource.groups.is_empty() {
            println!("  - {}", resource.url);
        } else {
            let groups: Vec<_> = resource.groups.iter().map(String::as_str).collect();
            println!("  - {} [{}]", resource.url, groups.join(", "));
        }
    }

    println!("\nChecks ({}):", config.checks.len());
    for check in &config.checks {
        match &check.group {
            Some(group) => println!("  - {:?} {} (group {})", check.scope, check.description, group),
            None => println!("  - {:?} {}", check.scope, check.description),
        }
    }

    println!("\n✓ Crawl file is valid");
}

/// Builds the reporters requested on the command line
fn get_reporters(cli: &Cli, config_hash: &str) -> Vec<Box<dyn Reporter>> {
    let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();
    if !cli.silent {
        reporters.push(Box::new(ConsoleReporter::stdout()));
    }
    if let Some(path) = &cli.junit {
        reporters.push(Box::new(JUnitReporter::new(path)));
    }
    if let Some(path) = &cli.json {
        reporters.push(Box::new(JsonReporter::new(path).with_config_hash(config_hash)));
    }
    reporters
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: Config, config_hash: String) -> crawl_probe::Result<()> {
    let concurrency = cli
        .concurrency
        .map(usize::from)
        .unwrap_or(config.crawler.concurrency);

    if config.checks.is_empty() {
        tracing::warn!("No checks configured, every resource will pass");
    }

    tracing::info!(
        "Resources: {}, Checks: {}, Concurrency: {}",
        config.resources.len(),
        config.checks.len(),
        concurrency
    );

    let context = Arc::new(build_context(&config.checks));
    let transport = Arc::new(HttpTransport::new(&config.transport)?);

    let stream = crawl(context, transport, config.resources, concurrency)?;

    let mut reporters = get_reporters(cli, &config_hash);
    let summary = report_crawl(stream, &mut reporters).await?;

    tracing::info!(
        "{} units, {} tests, {} passed",
        summary.units,
        summary.tests,
        summary.passed
    );

    Ok(())
}
