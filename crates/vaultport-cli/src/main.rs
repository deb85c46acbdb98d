use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vaultport_engine::Resolver;
use vaultport_engine::io::validate_vault_dir;
use vaultport_engine::store::{BlobStore, NoTitles, PageId, PageStore, TitleFetcher};
use vaultport_notion::{HtmlTitleFetcher, NotionClient, NotionUploader, extract_page_id};

mod migrate;
mod report;
mod stores;

use migrate::Migrator;
use stores::{DryRunBlobs, DryRunPages, SkipBlobs};

#[derive(Parser)]
#[command(name = "vaultport")]
#[command(about = "Migrate an Obsidian vault to Notion", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the Obsidian vault directory (or a subfolder of it)
    source: PathBuf,

    /// Notion page URL the vault is migrated under
    /// (e.g. https://www.notion.so/teamspace/Page-Title-abc123def456)
    destination: String,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", default_value = "", hide_env_values = true)]
    token: String,

    /// Preview the migration without making changes
    #[arg(long)]
    dry_run: bool,

    /// Skip file uploads (migrate notes only)
    #[arg(long)]
    skip_files: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    validate_vault_dir(&cli.source)?;

    if cli.token.is_empty() && !cli.dry_run {
        bail!(
            "Notion token required. Set NOTION_TOKEN env var or use --token flag \
             (get one at https://www.notion.so/my-integrations)"
        );
    }

    let destination = PageId(extract_page_id(&cli.destination)?);

    let rule = "=".repeat(60);
    info!("{rule}");
    info!("Obsidian to Notion Migration");
    info!("{rule}");
    info!("Source: {}", cli.source.display());
    info!("Destination page: {}", destination.as_str());
    if cli.dry_run {
        info!("MODE: Dry run (no changes will be made)");
    }
    info!("{}", "-".repeat(60));

    let mut live_pages;
    let mut dry_pages;
    let pages: &mut dyn PageStore = if cli.dry_run {
        dry_pages = DryRunPages::new();
        &mut dry_pages
    } else {
        live_pages = NotionClient::new(cli.token.clone());
        &mut live_pages
    };

    let mut live_blobs;
    let mut dry_blobs;
    let mut skip_blobs;
    let blobs: &mut dyn BlobStore = if cli.skip_files {
        skip_blobs = SkipBlobs;
        &mut skip_blobs
    } else if cli.dry_run {
        dry_blobs = DryRunBlobs;
        &mut dry_blobs
    } else {
        live_blobs = NotionUploader::new(cli.token.clone());
        &mut live_blobs
    };

    let html_titles;
    let fetcher: &dyn TitleFetcher = if cli.dry_run {
        &NoTitles
    } else {
        html_titles = HtmlTitleFetcher::new();
        &html_titles
    };

    let mut migrator = Migrator::new(pages, blobs, fetcher, Resolver::new(&cli.source));
    migrator.run(&cli.source, &destination)?;

    let stats = migrator.stats().clone();
    info!("{rule}");
    info!("Migration Complete!");
    info!("{}", "-".repeat(60));
    info!("Directories:  {}", stats.directories);
    info!("Notes:        {}", stats.notes);
    info!("Files:        {}", stats.files);
    if stats.errors > 0 {
        warn!("Errors:       {}", stats.errors);
    }
    info!("{rule}");

    let (upload_report, unresolved) = migrator.into_outcome();
    report::write_reports(&std::env::current_dir()?, &upload_report, &unresolved)
        .context("failed to write migration reports")?;

    Ok(())
}
