//! Settings error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Storage error: {0}")]
    Storage(#[from] kestrel_storage::StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed value: {0}")]
    Malformed(String),
}
