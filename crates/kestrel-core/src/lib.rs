//! Kestrel Core
//!
//! Central coordination layer for the Kestrel browser shell. One `Shell`
//! instance owns the profile, both databases and every manager; UI views
//! receive it by reference and observe changes through the event bus
//! instead of opening their own store handles.

mod error;
mod events;
mod shell;

pub use error::CoreError;
pub use events::{EventBus, ShellEvent, Subscription};
pub use shell::Shell;

// Re-export the collaborator-facing types
pub use kestrel_navigation::{
    DownloadRecord, DownloadStatus, HistoryRecorder, InputResolver, NavigationError, Resolution,
    Suggestion, VisitRecord,
};
pub use kestrel_privacy::{
    Decision, Permission, PermissionPolicy, PermissionRule, PrivacyError, Verdict,
};
pub use kestrel_settings::{
    BasicSettings, Catalog, SearchEngine, SearchEngines, SettingItem, SettingsError,
    WindowGeometry, WindowSettings,
};
pub use kestrel_storage::{ConfigFile, Database, ProfileDirs, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
