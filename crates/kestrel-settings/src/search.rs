//! Search engine table
//!
//! At most one engine is enabled at a time; `set_enabled` switches the
//! selection inside a single transaction so the invariant holds even when a
//! caller races two toggles.

use kestrel_storage::{Column, Database, StorageError, Table};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEngine {
    pub id: i64,
    pub provider: String,
    pub url: String,
    pub enabled: bool,
}

pub struct SearchEngines {
    db: Database,
}

impl SearchEngines {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All engines in insertion order.
    pub fn list(&self) -> Result<Vec<SearchEngine>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, provider, url, enable FROM search_engines ORDER BY id")?;
            let engines = stmt
                .query_map([], |row| {
                    let enable: String = row.get(3)?;
                    Ok(SearchEngine {
                        id: row.get(0)?,
                        provider: row.get(1)?,
                        url: row.get(2)?,
                        enabled: enable == "1",
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(engines)
        })?)
    }

    pub fn providers(&self) -> Result<Vec<String>> {
        Ok(self.list()?.into_iter().map(|e| e.provider).collect())
    }

    /// The currently enabled engine.
    pub fn enabled(&self) -> Result<SearchEngine> {
        self.list()?
            .into_iter()
            .find(|e| e.enabled)
            .ok_or_else(|| SettingsError::NotFound("enabled search engine".to_string()))
    }

    /// Make `provider` the enabled engine, disabling every other one.
    /// Rolls back without touching the selection when `provider` is
    /// unknown.
    pub fn set_enabled(&self, provider: &str) -> Result<()> {
        self.db.transaction(|conn| {
            let known: i64 = conn.query_row(
                "SELECT COUNT(*) FROM search_engines WHERE provider = ?1",
                [provider],
                |row| row.get(0),
            )?;
            if known == 0 {
                return Err(StorageError::NotFound(format!("search engine {provider}")));
            }
            conn.execute("UPDATE search_engines SET enable = '0'", [])?;
            conn.execute(
                "UPDATE search_engines SET enable = '1' WHERE provider = ?1",
                [provider],
            )?;
            Ok(())
        })?;
        tracing::info!(provider, "search engine enabled");
        Ok(())
    }

    /// Register a new engine, initially disabled. The URL is a template the
    /// query text gets appended to.
    pub fn add(&self, provider: &str, url: &str) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO search_engines (provider, url, enable) VALUES (?1, ?2, '0')",
                [provider, url],
            )?;
            Ok(())
        })?;
        Ok(())
    }

    /// Remove an engine. Removing the enabled engine leaves no engine
    /// enabled; callers should re-select afterwards.
    pub fn remove(&self, provider: &str) -> Result<()> {
        let deleted = self
            .db
            .delete_where(Table::SearchEngines, Column::Provider, provider)?;
        if deleted == 0 {
            return Err(SettingsError::NotFound(format!("search engine {provider}")));
        }
        Ok(())
    }
}
