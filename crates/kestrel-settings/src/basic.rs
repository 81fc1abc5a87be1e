//! Basic settings
//!
//! The `basic` table holds exactly one row per item; rows are seeded at
//! first database initialization, so reads address rows that always exist.

use std::path::PathBuf;

use kestrel_storage::{Column, Database, Table};

use crate::error::SettingsError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingItem {
    DownloadFolder,
    PrivateBrowsing,
    HttpsMode,
    UiTranslation,
    PreferredLanguage,
}

impl SettingItem {
    pub const ALL: [SettingItem; 5] = [
        SettingItem::DownloadFolder,
        SettingItem::PrivateBrowsing,
        SettingItem::HttpsMode,
        SettingItem::UiTranslation,
        SettingItem::PreferredLanguage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingItem::DownloadFolder => "download_folder",
            SettingItem::PrivateBrowsing => "private_browsing",
            SettingItem::HttpsMode => "https_mode",
            SettingItem::UiTranslation => "ui_translation",
            SettingItem::PreferredLanguage => "preferred_language",
        }
    }
}

impl std::str::FromStr for SettingItem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "download_folder" => Ok(SettingItem::DownloadFolder),
            "private_browsing" => Ok(SettingItem::PrivateBrowsing),
            "https_mode" => Ok(SettingItem::HttpsMode),
            "ui_translation" => Ok(SettingItem::UiTranslation),
            "preferred_language" => Ok(SettingItem::PreferredLanguage),
            _ => Err(format!("Unknown setting item: {s}")),
        }
    }
}

pub struct BasicSettings {
    db: Database,
}

impl BasicSettings {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Read the stored value for `item`.
    pub fn read(&self, item: SettingItem) -> Result<String> {
        let rows = self
            .db
            .read_where(Table::Basic, Column::Item, item.as_str())?;
        rows.into_iter()
            .next()
            .and_then(|row| row.into_iter().nth(2))
            .ok_or_else(|| SettingsError::NotFound(format!("setting {}", item.as_str())))
    }

    /// Overwrite the stored value for `item`.
    pub fn write(&self, item: SettingItem, value: &str) -> Result<()> {
        let changed = self.db.update_where(
            Table::Basic,
            Column::Item,
            item.as_str(),
            Column::Value,
            value,
        )?;
        if changed == 0 {
            return Err(SettingsError::NotFound(format!("setting {}", item.as_str())));
        }
        tracing::debug!(item = item.as_str(), value, "setting updated");
        Ok(())
    }

    pub fn download_folder(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(self.read(SettingItem::DownloadFolder)?))
    }

    pub fn set_download_folder(&self, path: &std::path::Path) -> Result<()> {
        self.write(SettingItem::DownloadFolder, &path.to_string_lossy())
    }

    pub fn private_browsing(&self) -> Result<bool> {
        Ok(self.read(SettingItem::PrivateBrowsing)? == "1")
    }

    pub fn set_private_browsing(&self, enabled: bool) -> Result<()> {
        self.write(SettingItem::PrivateBrowsing, flag(enabled))
    }

    pub fn https_mode(&self) -> Result<bool> {
        Ok(self.read(SettingItem::HttpsMode)? == "1")
    }

    pub fn set_https_mode(&self, enabled: bool) -> Result<()> {
        self.write(SettingItem::HttpsMode, flag(enabled))
    }

    /// Locale code of the active UI translation, e.g. `en_US`.
    pub fn ui_translation(&self) -> Result<String> {
        self.read(SettingItem::UiTranslation)
    }

    pub fn set_ui_translation(&self, locale_code: &str) -> Result<()> {
        self.write(SettingItem::UiTranslation, locale_code)
    }

    /// HTTP Accept-Language code sent to websites, e.g. `en-US`.
    pub fn preferred_language(&self) -> Result<String> {
        self.read(SettingItem::PreferredLanguage)
    }

    pub fn set_preferred_language(&self, http_language_code: &str) -> Result<()> {
        self.write(SettingItem::PreferredLanguage, http_language_code)
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "1"
    } else {
        "0"
    }
}
