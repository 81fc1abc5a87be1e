//! Localization
//!
//! UI strings live in per-locale message tables embedded as JSON. A
//! `Catalog` looks keys up in the active locale's table first and falls
//! back to `en_US`, the fallback locale; a key missing from both tables
//! resolves to the key itself so a mistranslation never panics the UI.

use std::collections::HashMap;

use crate::error::SettingsError;
use crate::Result;

/// Locale every lookup ultimately falls back to.
pub const FALLBACK_LOCALE: &str = "en_US";

const EN_US_TABLE: &str = include_str!("../locales/en_US.json");
const ZH_CN_TABLE: &str = include_str!("../locales/zh_CN.json");

/// Shipped translations, as (locale code, English display name).
const LANGUAGES: [(&str, &str); 2] = [
    ("en_US", "English (US)"),
    ("zh_CN", "Chinese (Simplified)"),
];

/// Locale codes with a shipped message table.
pub fn available_translations() -> Vec<&'static str> {
    LANGUAGES.iter().map(|(code, _)| *code).collect()
}

/// Convert a locale code to an HTTP language code: `en_US` -> `en-US`.
pub fn locale_to_http(locale_code: &str) -> String {
    match locale_code.split_once('_') {
        Some((lang, region)) => format!("{lang}-{region}"),
        None => locale_code.to_string(),
    }
}

/// Convert an HTTP language code to a locale code: `en-US` -> `en_US`.
pub fn http_to_locale(http_language_code: &str) -> String {
    match http_language_code.split_once('-') {
        Some((lang, region)) => format!("{lang}_{region}"),
        None => http_language_code.to_string(),
    }
}

/// Display name for a language, accepting either code form.
pub fn display_name(code: &str) -> Option<&'static str> {
    let locale = http_to_locale(code);
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == locale)
        .map(|(_, name)| *name)
}

/// Locale and HTTP codes for a language display name.
pub fn locale_for_name(name: &str) -> Option<(String, String)> {
    LANGUAGES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| (code.to_string(), locale_to_http(code)))
}

/// Locale code detected from the process environment, `LC_ALL` over
/// `LC_MESSAGES` over `LANG`, stripped of any encoding suffix.
pub fn system_locale() -> String {
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            let code = value.split('.').next().unwrap_or("").trim();
            if !code.is_empty() && code != "C" && code != "POSIX" {
                return code.to_string();
            }
        }
    }
    FALLBACK_LOCALE.to_string()
}

/// Initial (ui_translation, preferred_language) pair for a fresh profile.
/// The UI falls back to `en_US` when the system locale has no shipped
/// translation; the HTTP language keeps following the system locale.
pub fn default_language_settings() -> (String, String) {
    let system = system_locale();
    let http = locale_to_http(&system);
    let ui = if available_translations().contains(&system.as_str()) {
        system
    } else {
        FALLBACK_LOCALE.to_string()
    };
    (ui, http)
}

/// Message table for one active locale, with the fallback table behind it.
pub struct Catalog {
    locale: String,
    table: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Catalog {
    /// Load the catalog for `locale_code` (either code form). Unknown
    /// locales get an empty primary table, so every lookup falls back.
    pub fn load(locale_code: &str) -> Result<Self> {
        let locale = http_to_locale(locale_code);
        let table = match locale.as_str() {
            "en_US" => parse_table(EN_US_TABLE)?,
            "zh_CN" => parse_table(ZH_CN_TABLE)?,
            _ => HashMap::new(),
        };
        Ok(Self {
            locale,
            table,
            fallback: parse_table(EN_US_TABLE)?,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Localized string for `key`; falls back to `en_US`, then to the key
    /// itself.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.table
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }
}

fn parse_table(json: &str) -> Result<HashMap<String, String>> {
    serde_json::from_str(json).map_err(|e| SettingsError::Malformed(format!("locale table: {e}")))
}
