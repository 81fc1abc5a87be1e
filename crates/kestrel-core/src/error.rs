//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] kestrel_storage::StorageError),

    #[error("Settings error: {0}")]
    Settings(#[from] kestrel_settings::SettingsError),

    #[error("Privacy error: {0}")]
    Privacy(#[from] kestrel_privacy::PrivacyError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] kestrel_navigation::NavigationError),
}
