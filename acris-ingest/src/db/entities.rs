//! Artist, album and genre database operations
//!
//! The three entity tables share one shape: a GUID, a collection and a name
//! unique within that collection. Names match exactly (case-sensitive, no
//! trimming).

use acris_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::types::{AlbumRef, ArtistRef, CollectionId, GenreRef};

/// Which collection-scoped entity table to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Album,
    Genre,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Artist => "artists",
            EntityKind::Album => "albums",
            EntityKind::Genre => "genres",
        }
    }
}

/// Return the entity named `name` in `collection`, creating it if needed
///
/// The insert is a no-op when the name already exists, so concurrent callers
/// always read back the same row.
pub async fn find_or_create(
    pool: &SqlitePool,
    kind: EntityKind,
    collection: CollectionId,
    name: &str,
) -> Result<Uuid> {
    if name.is_empty() {
        return Err(Error::InvalidInput(format!(
            "{} name must not be empty",
            kind.table()
        )));
    }

    let insert = format!(
        "INSERT INTO {} (guid, collection_id, name) VALUES (?, ?, ?) \
         ON CONFLICT(collection_id, name) DO NOTHING",
        kind.table()
    );
    let inserted = sqlx::query(&insert)
        .bind(Uuid::new_v4().to_string())
        .bind(collection.0)
        .bind(name)
        .execute(pool)
        .await?
        .rows_affected();

    let select = format!(
        "SELECT guid FROM {} WHERE collection_id = ? AND name = ?",
        kind.table()
    );
    let guid: String = sqlx::query_scalar(&select)
        .bind(collection.0)
        .bind(name)
        .fetch_one(pool)
        .await?;

    if inserted > 0 {
        debug!(table = kind.table(), collection = collection.0, name, guid = %guid, "Created entity");
    }

    parse_guid(kind.table(), &guid)
}

pub async fn find_or_create_artist(pool: &SqlitePool, collection: CollectionId, name: &str) -> Result<ArtistRef> {
    find_or_create(pool, EntityKind::Artist, collection, name)
        .await
        .map(ArtistRef)
}

pub async fn find_or_create_album(pool: &SqlitePool, collection: CollectionId, name: &str) -> Result<AlbumRef> {
    find_or_create(pool, EntityKind::Album, collection, name)
        .await
        .map(AlbumRef)
}

pub async fn find_or_create_genre(pool: &SqlitePool, collection: CollectionId, name: &str) -> Result<GenreRef> {
    find_or_create(pool, EntityKind::Genre, collection, name)
        .await
        .map(GenreRef)
}

/// Load an entity's name by GUID
pub async fn load_entity_name(pool: &SqlitePool, kind: EntityKind, guid: Uuid) -> Result<Option<String>> {
    let select = format!("SELECT name FROM {} WHERE guid = ?", kind.table());
    let name = sqlx::query_scalar(&select)
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(name)
}

/// Number of entities of one kind in a collection
pub async fn count_entities(pool: &SqlitePool, kind: EntityKind, collection: CollectionId) -> Result<i64> {
    let select = format!("SELECT COUNT(*) FROM {} WHERE collection_id = ?", kind.table());
    let count = sqlx::query_scalar(&select)
        .bind(collection.0)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub(crate) fn parse_guid(table: &'static str, guid: &str) -> Result<Uuid> {
    Uuid::parse_str(guid).map_err(|e| Error::CorruptRecord {
        table,
        reason: format!("invalid guid {:?}: {}", guid, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use acris_common::db::init_memory_database;

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let pool = init_memory_database().await.expect("Failed to create database");
        let collection = CollectionId(1);

        let first = find_or_create_artist(&pool, collection, "Nina Simone").await.unwrap();
        let second = find_or_create_artist(&pool, collection, "Nina Simone").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(count_entities(&pool, EntityKind::Artist, collection).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let pool = init_memory_database().await.expect("Failed to create database");

        let in_one = find_or_create_genre(&pool, CollectionId(1), "Jazz").await.unwrap();
        let in_two = find_or_create_genre(&pool, CollectionId(2), "Jazz").await.unwrap();

        assert_ne!(in_one, in_two);
    }

    #[tokio::test]
    async fn test_names_match_exactly() {
        let pool = init_memory_database().await.expect("Failed to create database");
        let collection = CollectionId(1);

        let lower = find_or_create_album(&pool, collection, "blue").await.unwrap();
        let upper = find_or_create_album(&pool, collection, "Blue").await.unwrap();
        let padded = find_or_create_album(&pool, collection, "Blue ").await.unwrap();

        assert_ne!(lower, upper);
        assert_ne!(upper, padded);
        assert_eq!(count_entities(&pool, EntityKind::Album, collection).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let pool = init_memory_database().await.expect("Failed to create database");

        let result = find_or_create_artist(&pool, CollectionId(1), "").await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_load_entity_name() {
        let pool = init_memory_database().await.expect("Failed to create database");

        let genre = find_or_create_genre(&pool, CollectionId(4), "Dub").await.unwrap();
        let name = load_entity_name(&pool, EntityKind::Genre, genre.0).await.unwrap();

        assert_eq!(name.as_deref(), Some("Dub"));
        assert_eq!(
            load_entity_name(&pool, EntityKind::Genre, Uuid::new_v4()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_concurrent_find_or_create_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let pool = acris_common::db::init_database(&dir.path().join("acris.db"))
            .await
            .unwrap();
        let collection = CollectionId(9);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { find_or_create_artist(&pool, collection, "Sun Ra").await })
            })
            .collect();

        let mut refs = Vec::new();
        for task in tasks {
            refs.push(task.await.unwrap().unwrap());
        }

        assert!(refs.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(count_entities(&pool, EntityKind::Artist, collection).await.unwrap(), 1);
    }
}
