//! Thumbnail database operations

use acris_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Stored thumbnail blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredThumbnail {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Save (or replace) a track's thumbnail
pub async fn save_thumbnail(
    pool: &SqlitePool,
    track_id: Uuid,
    name: &str,
    mime_type: &str,
    data: &[u8],
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO track_thumbnails (track_id, name, mime_type, data, created_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(track_id) DO UPDATE SET
            name = excluded.name,
            mime_type = excluded.mime_type,
            data = excluded.data
        "#,
    )
    .bind(track_id.to_string())
    .bind(name)
    .bind(mime_type)
    .bind(data)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a track's thumbnail
pub async fn load_thumbnail(pool: &SqlitePool, track_id: Uuid) -> Result<Option<StoredThumbnail>> {
    let row = sqlx::query("SELECT name, mime_type, data FROM track_thumbnails WHERE track_id = ?")
        .bind(track_id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| StoredThumbnail {
        name: row.get("name"),
        mime_type: row.get("mime_type"),
        data: row.get("data"),
    }))
}
