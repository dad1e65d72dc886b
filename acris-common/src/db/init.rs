//! Database initialization
//!
//! Creates the SQLite pool and the library schema. Every `create_*` function
//! is idempotent (`CREATE TABLE IF NOT EXISTS`), so opening an existing
//! database is safe.
//!
//! Entity tables carry `UNIQUE(collection_id, name)`: that constraint is what
//! makes find-or-create atomic per (collection, name) under concurrent uploads.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL: concurrent readers alongside the single writer of an ingest
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_library_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the library schema
///
/// Limited to one connection: every `sqlite::memory:` connection is a
/// separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    create_library_schema(&pool).await?;

    Ok(pool)
}

/// Create every library table (idempotent)
pub async fn create_library_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;

    // Collection-scoped entities
    create_artists_table(pool).await?;
    create_albums_table(pool).await?;
    create_genres_table(pool).await?;

    create_tracks_table(pool).await?;

    // Linking tables
    create_track_artists_table(pool).await?;
    create_track_genres_table(pool).await?;
    create_track_thumbnails_table(pool).await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the artists table
pub async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            guid TEXT PRIMARY KEY,
            collection_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(collection_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the albums table
pub async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            guid TEXT PRIMARY KEY,
            collection_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(collection_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the genres table
pub async fn create_genres_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS genres (
            guid TEXT PRIMARY KEY,
            collection_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(collection_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the tracks table
///
/// `audio_format` is NULL when the container could not be parsed.
pub async fn create_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            guid TEXT PRIMARY KEY,
            collection_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            file_name TEXT NOT NULL,
            length_seconds REAL NOT NULL DEFAULT 0.0,
            audio_format TEXT,
            album_artist TEXT NOT NULL DEFAULT '',
            album_id TEXT REFERENCES albums(guid) ON DELETE SET NULL,
            album_track_number INTEGER,
            lyrics TEXT NOT NULL DEFAULT '',
            year TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_collection ON tracks(collection_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the track_artists linking table
pub async fn create_track_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_artists (
            track_id TEXT NOT NULL REFERENCES tracks(guid) ON DELETE CASCADE,
            artist_id TEXT NOT NULL REFERENCES artists(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (track_id, artist_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the track_genres linking table
pub async fn create_track_genres_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_genres (
            track_id TEXT NOT NULL REFERENCES tracks(guid) ON DELETE CASCADE,
            genre_id TEXT NOT NULL REFERENCES genres(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (track_id, genre_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the track_thumbnails table
///
/// Thumbnails can be stored before the track row exists (the pipeline stores
/// them during normalization), so there is no foreign key to `tracks`.
pub async fn create_track_thumbnails_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_thumbnails (
            track_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            data BLOB NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
