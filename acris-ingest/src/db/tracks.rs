//! Track database operations

use acris_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::entities::parse_guid;
use crate::types::NormalizedTrack;

/// Track row as stored, with its link tables resolved to GUID lists
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTrack {
    pub guid: Uuid,
    pub collection_id: i64,
    pub name: String,
    pub file_name: String,
    pub length_seconds: f64,
    pub audio_format: Option<String>,
    pub album_artist: String,
    pub album_id: Option<Uuid>,
    pub album_track_number: Option<i64>,
    pub lyrics: String,
    pub year: Option<String>,
    pub artist_ids: Vec<Uuid>,
    pub genre_ids: Vec<Uuid>,
    pub thumbnail_name: Option<String>,
}

/// Insert or replace a track and its artist/genre links in one transaction
pub async fn save_track(pool: &SqlitePool, track: &NormalizedTrack) -> Result<()> {
    let guid = track.id.to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO tracks (
            guid, collection_id, name, file_name, length_seconds, audio_format,
            album_artist, album_id, album_track_number, lyrics, year,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(guid) DO UPDATE SET
            collection_id = excluded.collection_id,
            name = excluded.name,
            file_name = excluded.file_name,
            length_seconds = excluded.length_seconds,
            audio_format = excluded.audio_format,
            album_artist = excluded.album_artist,
            album_id = excluded.album_id,
            album_track_number = excluded.album_track_number,
            lyrics = excluded.lyrics,
            year = excluded.year,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&guid)
    .bind(track.collection.0)
    .bind(&track.name)
    .bind(&track.file_name)
    .bind(track.length.as_secs_f64())
    .bind(track.audio_format)
    .bind(&track.album_artist)
    .bind(track.album.map(|album| album.0.to_string()))
    .bind(track.album_track_number.map(i64::from))
    .bind(&track.lyrics)
    .bind(&track.year)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM track_artists WHERE track_id = ?")
        .bind(&guid)
        .execute(&mut *tx)
        .await?;
    for (position, artist) in track.artists.iter().enumerate() {
        sqlx::query("INSERT INTO track_artists (track_id, artist_id, position) VALUES (?, ?, ?)")
            .bind(&guid)
            .bind(artist.0.to_string())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM track_genres WHERE track_id = ?")
        .bind(&guid)
        .execute(&mut *tx)
        .await?;
    for (position, genre) in track.genres.iter().enumerate() {
        sqlx::query("INSERT INTO track_genres (track_id, genre_id, position) VALUES (?, ?, ?)")
            .bind(&guid)
            .bind(genre.0.to_string())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Load a track by GUID
pub async fn load_track(pool: &SqlitePool, guid: Uuid) -> Result<Option<StoredTrack>> {
    let row = sqlx::query(
        r#"
        SELECT t.guid, t.collection_id, t.name, t.file_name, t.length_seconds,
               t.audio_format, t.album_artist, t.album_id, t.album_track_number,
               t.lyrics, t.year, th.name AS thumbnail_name
        FROM tracks t
        LEFT JOIN track_thumbnails th ON th.track_id = t.guid
        WHERE t.guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let guid_str: String = row.get("guid");
    let album_id: Option<String> = row.get("album_id");

    let artist_ids = load_links(
        pool,
        "SELECT artist_id FROM track_artists WHERE track_id = ? ORDER BY position",
        &guid_str,
    )
    .await?;
    let genre_ids = load_links(
        pool,
        "SELECT genre_id FROM track_genres WHERE track_id = ? ORDER BY position",
        &guid_str,
    )
    .await?;

    Ok(Some(StoredTrack {
        guid: parse_guid("tracks", &guid_str)?,
        collection_id: row.get("collection_id"),
        name: row.get("name"),
        file_name: row.get("file_name"),
        length_seconds: row.get("length_seconds"),
        audio_format: row.get("audio_format"),
        album_artist: row.get("album_artist"),
        album_id: album_id
            .as_deref()
            .map(|id| parse_guid("tracks", id))
            .transpose()?,
        album_track_number: row.get("album_track_number"),
        lyrics: row.get("lyrics"),
        year: row.get("year"),
        artist_ids,
        genre_ids,
        thumbnail_name: row.get("thumbnail_name"),
    }))
}

async fn load_links(pool: &SqlitePool, query: &str, track_id: &str) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = sqlx::query_scalar(query)
        .bind(track_id)
        .fetch_all(pool)
        .await?;

    ids.iter().map(|id| parse_guid("track links", id)).collect()
}
