//! Database helpers for integration tests

#![allow(dead_code)]

use acris_common::db::init_memory_database;
use acris_ingest::db::SqliteLibraryStore;
use acris_ingest::TrackIngestor;
use std::sync::Arc;

/// Fresh in-memory library store
pub async fn memory_store() -> Arc<SqliteLibraryStore> {
    let pool = init_memory_database()
        .await
        .expect("Failed to create in-memory database");
    Arc::new(SqliteLibraryStore::new(pool))
}

/// Ingestor over a fresh in-memory store, plus the store for assertions
pub async fn memory_ingestor() -> (TrackIngestor, Arc<SqliteLibraryStore>) {
    let store = memory_store().await;
    let ingestor = TrackIngestor::new(store.clone());
    (ingestor, store)
}
