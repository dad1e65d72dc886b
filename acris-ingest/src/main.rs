//! acris-ingest - Track ingest command
//!
//! Reads audio files, extracts and normalizes their metadata and stores the
//! resulting tracks in the collection's SQLite library.

use std::path::PathBuf;
use std::sync::Arc;

use acris_common::config::{load_config, RootFolderInitializer, RootFolderResolver};
use acris_ingest::db::SqliteLibraryStore;
use acris_ingest::thumbnail::ThumbnailSettings;
use acris_ingest::types::CollectionId;
use acris_ingest::{IngestError, IngestOutcome, TrackIngestor};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const MODULE_NAME: &str = "acris-ingest";

#[derive(Debug, Parser)]
#[command(name = "acris-ingest", version, about = "Ingest audio files into an Acris collection")]
struct Args {
    /// Collection the tracks belong to
    #[arg(long)]
    collection: i64,

    /// Root folder holding acris.db
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON object per track instead of a summary line
    #[arg(long)]
    json: bool,

    /// Audio files to ingest
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Per-track output for `--json`
#[derive(Debug, Serialize)]
struct TrackSummary<'a> {
    track_id: String,
    file: &'a str,
    name: &'a str,
    audio_format: Option<&'a str>,
    length_seconds: f64,
    artists: usize,
    genres: usize,
    album: bool,
    thumbnail: Option<&'a str>,
    issues: Vec<String>,
}

impl<'a> From<&'a IngestOutcome> for TrackSummary<'a> {
    fn from(outcome: &'a IngestOutcome) -> Self {
        let track = &outcome.track;
        Self {
            track_id: track.id.to_string(),
            file: &track.file_name,
            name: &track.name,
            audio_format: track.audio_format,
            length_seconds: track.length.as_secs_f64(),
            artists: track.artists.len(),
            genres: track.genres.len(),
            album: track.album.is_some(),
            thumbnail: track.thumbnail.as_ref().map(|t| t.reference.0.as_str()),
            issues: outcome
                .issues
                .iter()
                .map(|issue| format!("{}: {}", issue.stage, issue.message))
                .collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Step 1: Load config (never fatal) and initialize tracing
    let config = load_config(args.config.as_deref(), MODULE_NAME);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting acris-ingest");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("ACRIS_GIT_HASH"),
        env!("ACRIS_BUILD_TIMESTAMP"),
        env!("ACRIS_BUILD_PROFILE")
    );

    // Step 2: Resolve root folder (CLI → ENV → TOML → default)
    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    // Step 3: Open or create database
    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = acris_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let store = Arc::new(SqliteLibraryStore::new(pool));
    let ingestor = TrackIngestor::new(store)
        .with_thumbnail_settings(ThumbnailSettings::from(&config.thumbnail))
        .with_max_upload_bytes(config.ingest.max_upload_bytes);

    // Step 4: Ingest every file as one run
    let collection = CollectionId(args.collection);
    let mut run = ingestor.start_run();
    let mut unreadable = 0usize;
    let mut ingested = 0usize;

    for path in &args.files {
        let upload = match ingestor.read_upload(collection, path).await {
            Ok(upload) => upload,
            Err(e @ (IngestError::Io(_) | IngestError::TooLarge { .. })) => {
                error!(file = %path.display(), error = %e, "Cannot read file");
                unreadable += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = run
            .ingest(upload)
            .await
            .with_context(|| format!("Failed to store {}", path.display()))?;
        ingested += 1;

        if args.json {
            println!("{}", serde_json::to_string(&TrackSummary::from(&outcome))?);
        } else {
            println!(
                "{}\t{}\t{}\t{} issue(s)",
                outcome.track.id,
                outcome.track.audio_format.unwrap_or("unknown"),
                outcome.track.name,
                outcome.issues.len()
            );
        }
    }

    info!(ingested, unreadable, collection = collection.0, "Ingest finished");

    if unreadable > 0 {
        anyhow::bail!("{} file(s) could not be read", unreadable);
    }
    Ok(())
}
