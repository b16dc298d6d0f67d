//! Help Mirror CLI
//!
//! Mirrors a documentation site into an offline HTML Help project.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use help_mirror::{paths::listing_url, Blacklist, Mirror, MirrorConfig, MirrorOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Help Mirror - build an HTML Help project from a documentation site
#[derive(Parser)]
#[command(name = "help-mirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Cache request responses in a database
    #[arg(long)]
    cache: bool,

    /// Output directory for downloaded files (created if missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Blacklisted package prefixes, separated by '/'
    #[arg(long)]
    blacklist: Option<String>,

    /// Run the help compiler on the saved project
    #[arg(long)]
    compile: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root URL of the documentation site, e.g. http://localhost:6060/
    url: Option<String>,
}

/// Initialize tracing with output to stderr
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "help_mirror=info".into()),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(url) = cli.url.as_deref() else {
        let mut stderr = std::io::stderr();
        Cli::command().write_help(&mut stderr)?;
        writeln!(stderr)?;
        std::process::exit(1);
    };

    init_tracing();

    // read before changing directory so relative paths resolve as typed
    let config = MirrorConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if let Some(output) = &cli.output {
        std::fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory '{}'", output.display()))?;
        std::env::set_current_dir(output)
            .with_context(|| format!("Failed to enter output directory '{}'", output.display()))?;
    }

    let listing = listing_url(url);
    let options = MirrorOptions {
        output_dir: PathBuf::from("."),
        blacklist: cli.blacklist.as_deref().map(Blacklist::parse).unwrap_or_default(),
        use_cache: cli.cache,
        compile: cli.compile,
    };

    info!(url = %listing, project = %config.project.name, "mirroring");
    let start = Instant::now();

    let summary = Mirror::new(config, options)
        .context("Failed to set up mirror")?
        .run(&listing)
        .await
        .context("Mirroring failed")?;

    info!(
        pages = summary.pages,
        assets = summary.assets,
        downloads = summary.downloads,
        outline_nodes = summary.outline_nodes,
        index_keywords = summary.index_keywords,
        skipped = summary.skipped_packages.len(),
        files = summary.written.len(),
        compiled = summary.compiled,
        elapsed = ?start.elapsed(),
        "done"
    );

    Ok(())
}
