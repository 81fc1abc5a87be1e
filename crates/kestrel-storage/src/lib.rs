//! Kestrel Storage Layer
//!
//! Everything the browser persists lives under one profile directory:
//! a line-oriented `kbconfiguration` text file and two SQLite databases,
//! `kbsettings.db` and `kbhistory.db`.

mod config;
mod database;
mod error;
mod profile;
mod schema;

pub use config::{ConfigFile, CONFIG_FILE_NAME};
pub use database::Database;
pub use error::StorageError;
pub use profile::{ProfileDirs, PROFILE_NAME_PREFIX};
pub use schema::{Column, SettingsDefaults, Table, PERMISSION_KINDS};

/// Settings database file name inside a profile directory.
pub const SETTINGS_DB_NAME: &str = "kbsettings.db";
/// History database file name inside a profile directory.
pub const HISTORY_DB_NAME: &str = "kbhistory.db";

pub type Result<T> = std::result::Result<T, StorageError>;
