//! ETD Harvester main entry point
//!
//! This is the command-line interface for the catalog harvester.

use clap::Parser;
use etd_harvester::config::{load_config_with_hash, validate, Config, ConfigOverrides};
use etd_harvester::crawler::run_crawl;
use etd_harvester::output::print_statistics;
use etd_harvester::state::CancellationFlag;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// ETD Harvester: fetch theses and their metadata from a paginated catalog
///
/// Walks the catalog's listing pages, stores every document's metadata as
/// `<id>.json` in the output directory and downloads its attachment.
/// Documents already present in the output directory are skipped, so an
/// interrupted harvest can simply be started again.
#[derive(Parser, Debug)]
#[command(name = "etd-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A paginated thesis catalog harvester", long_about = None)]
struct Cli {
    /// Directory for records and attachments
    #[arg(short, long, value_name = "DIR")]
    outdir: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Embargo filter for listing pages
    #[arg(long)]
    embargo: Option<u32>,

    /// Category filter for listing pages
    #[arg(long)]
    category: Option<String>,

    /// First listing page
    #[arg(short, long)]
    page: Option<u32>,

    /// Last listing page
    #[arg(long)]
    maxpage: Option<u32>,

    /// Lowest document identifier (recorded, not enforced)
    #[arg(long)]
    min: Option<u32>,

    /// Highest document identifier (recorded, not enforced)
    #[arg(long)]
    max: Option<u32>,

    /// Download attachments
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pdf: Option<bool>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    ignore_cert: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.outdir.clone(),
            embargo: self.embargo,
            category: self.category.clone(),
            start_page: self.page,
            max_page: self.maxpage,
            min_id: self.min,
            max_id: self.max,
            fetch_attachments: self.pdf,
            ignore_certificates: self.ignore_cert.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    let config = config.with_overrides(cli.overrides());
    if let Err(e) = validate(&config) {
        eprintln!("{}", startup_error(&e));
        std::process::exit(1);
    }

    handle_crawl(config).await
}

/// The one line printed when the configuration is unusable
fn startup_error(err: &dyn std::error::Error) -> String {
    format!("etd-harvester: {}", err)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("etd_harvester=info,warn"),
            1 => EnvFilter::new("etd_harvester=debug,info"),
            2 => EnvFilter::new("etd_harvester=trace,debug"),
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

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Harvesting {} (embargo {}, pages {}..={})",
        config.catalog.base_url,
        config.catalog.embargo,
        config.crawl.start_page,
        config.crawl.max_page
    );
    if !config.crawl.fetch_attachments {
        tracing::info!("Attachment download disabled");
    }

    let cancel = CancellationFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Caught interrupt, finishing in-flight documents");
        signal_flag.cancel();
    });

    match run_crawl(config, cancel).await {
        Ok(stats) => {
            print_statistics(&stats);
            println!("\nDone, {} documents fetched", stats.documents_saved);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
