use thiserror::Error;

/// Failures reported by a [`Storage`](crate::store::Storage) backend.
///
/// The manager never hands these to its callers; they are logged and the
/// operation degrades to a no-op.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}
