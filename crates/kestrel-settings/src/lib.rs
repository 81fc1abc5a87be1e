//! Kestrel Settings
//!
//! Typed access to the persisted browser settings: the `basic` key/value
//! rows, the search-engine table, window geometry in the config file, and
//! UI localization.

mod basic;
mod error;
mod locale;
mod search;
mod window;

pub use basic::{BasicSettings, SettingItem};
pub use error::SettingsError;
pub use locale::{
    available_translations, default_language_settings, display_name, http_to_locale,
    locale_for_name, locale_to_http, system_locale, Catalog, FALLBACK_LOCALE,
};
pub use search::{SearchEngine, SearchEngines};
pub use window::{WindowGeometry, WindowSettings, DEFAULT_HEIGHT, DEFAULT_WIDTH};

pub type Result<T> = std::result::Result<T, SettingsError>;
