use thiserror::Error;

/// Errors that can occur in the reminder store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No reminder with the given id exists.
    #[error("Reminder not found: {id}")]
    NotFound { id: i64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
