//! History recording
//!
//! Append-only writer over the visits and downloads tables. Visit rows are
//! filtered against placeholder title-change events; download rows are
//! written unconditionally — the caller gates on privacy mode.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use kestrel_storage::{Database, Table};

use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub url: String,
    pub page_title: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// Requested but not yet started
    Requested,
    /// Transfer running
    InProgress,
    /// Finished successfully
    Completed,
    /// Cancelled by the user
    Cancelled,
    /// Aborted by the engine or the network
    Interrupted,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Requested => "requested",
            DownloadStatus::InProgress => "in_progress",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Cancelled => "cancelled",
            DownloadStatus::Interrupted => "interrupted",
        }
    }
}

impl std::str::FromStr for DownloadStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "requested" => Ok(DownloadStatus::Requested),
            "in_progress" => Ok(DownloadStatus::InProgress),
            "completed" => Ok(DownloadStatus::Completed),
            "cancelled" => Ok(DownloadStatus::Cancelled),
            "interrupted" => Ok(DownloadStatus::Interrupted),
            _ => Err(format!("Unknown download status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub id: i64,
    pub url: String,
    pub file_name: String,
    pub status: DownloadStatus,
    pub reference_url: String,
    pub time: String,
}

/// One address-bar suggestion: a distinct URL with its most recent title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub url: String,
    pub page_title: String,
}

pub struct HistoryRecorder {
    db: Database,
}

impl HistoryRecorder {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a visit row, unless the event is a placeholder: empty URL,
    /// `about:blank`, or a URL equal to the page title (with or without a
    /// trailing slash) — those are title changes for pages that never
    /// resolved to real content.
    pub fn record_visit(&self, url: &str, page_title: &str) -> Result<()> {
        let placeholder = url.is_empty()
            || url == "about:blank"
            || url == page_title
            || url == format!("{page_title}/");
        if placeholder {
            tracing::debug!(url, "visit not recorded");
            return Ok(());
        }

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO visits (url, page_title, time) VALUES (?1, ?2, ?3)",
                [url, page_title, &Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })?;
        Ok(())
    }

    /// Append a download row.
    pub fn record_download(
        &self,
        url: &str,
        file_name: &str,
        status: DownloadStatus,
        reference_url: &str,
    ) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO downloads (url, file_name, status, reference_url, time)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                [
                    url,
                    file_name,
                    status.as_str(),
                    reference_url,
                    &Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;
        Ok(())
    }

    /// All visits, most recent first.
    pub fn visits(&self) -> Result<Vec<VisitRecord>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, url, page_title, time FROM visits ORDER BY id DESC")?;
            let visits = stmt
                .query_map([], |row| {
                    Ok(VisitRecord {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        page_title: row.get(2)?,
                        time: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(visits)
        })?)
    }

    /// All downloads, most recent first.
    pub fn downloads(&self) -> Result<Vec<DownloadRecord>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, file_name, status, reference_url, time
                 FROM downloads ORDER BY id DESC",
            )?;
            let downloads = stmt
                .query_map([], |row| {
                    let status: String = row.get(3)?;
                    Ok(DownloadRecord {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        file_name: row.get(2)?,
                        status: status.parse().unwrap_or(DownloadStatus::Interrupted),
                        reference_url: row.get(4)?,
                        time: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(downloads)
        })?)
    }

    /// One row per distinct visited URL, carrying the title of its most
    /// recent visit. Seeds the address-bar completer without duplicates.
    pub fn suggestions(&self) -> Result<Vec<Suggestion>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn
                .prepare("SELECT url, page_title, MAX(id) FROM visits GROUP BY url")?;
            let suggestions = stmt
                .query_map([], |row| {
                    Ok(Suggestion {
                        url: row.get(0)?,
                        page_title: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(suggestions)
        })?)
    }

    /// Drop and recreate the visits table.
    pub fn clear_visits(&self) -> Result<()> {
        Ok(self.db.reset_table(Table::Visits)?)
    }

    /// Drop and recreate the downloads table.
    pub fn clear_downloads(&self) -> Result<()> {
        Ok(self.db.reset_table(Table::Downloads)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> HistoryRecorder {
        HistoryRecorder::new(Database::history_in_memory().unwrap())
    }

    #[test]
    fn test_record_visit() {
        let recorder = recorder();
        recorder
            .record_visit("https://example.com/page", "Example Page")
            .unwrap();

        let visits = recorder.visits().unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].url, "https://example.com/page");
        assert_eq!(visits[0].page_title, "Example Page");
    }

    #[test]
    fn test_placeholder_visits_not_recorded() {
        let recorder = recorder();
        recorder.record_visit("", "Title").unwrap();
        recorder.record_visit("about:blank", "Title").unwrap();
        recorder
            .record_visit("https://example.com", "https://example.com")
            .unwrap();
        recorder
            .record_visit("https://example.com/", "https://example.com")
            .unwrap();

        assert!(recorder.visits().unwrap().is_empty());
    }

    #[test]
    fn test_visits_most_recent_first() {
        let recorder = recorder();
        recorder.record_visit("https://a.example", "A").unwrap();
        recorder.record_visit("https://b.example", "B").unwrap();

        let visits = recorder.visits().unwrap();
        assert_eq!(visits[0].url, "https://b.example");
        assert_eq!(visits[1].url, "https://a.example");
    }

    #[test]
    fn test_suggestions_deduplicate_with_latest_title() {
        let recorder = recorder();
        recorder
            .record_visit("https://example.com", "Old Title")
            .unwrap();
        recorder.record_visit("https://other.example", "Other").unwrap();
        recorder
            .record_visit("https://example.com", "New Title")
            .unwrap();

        let mut suggestions = recorder.suggestions().unwrap();
        suggestions.sort_by(|a, b| a.url.cmp(&b.url));
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].url, "https://example.com");
        assert_eq!(suggestions[0].page_title, "New Title");
    }

    #[test]
    fn test_record_download() {
        let recorder = recorder();
        recorder
            .record_download(
                "https://example.com/file.zip",
                "file.zip",
                DownloadStatus::InProgress,
                "https://example.com/downloads",
            )
            .unwrap();

        let downloads = recorder.downloads().unwrap();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].file_name, "file.zip");
        assert_eq!(downloads[0].status, DownloadStatus::InProgress);
        assert_eq!(downloads[0].reference_url, "https://example.com/downloads");
    }

    #[test]
    fn test_clear_leaves_tables_usable() {
        let recorder = recorder();
        recorder.record_visit("https://a.example", "A").unwrap();
        recorder
            .record_download("https://f.example/x", "x", DownloadStatus::Completed, "")
            .unwrap();

        recorder.clear_visits().unwrap();
        recorder.clear_downloads().unwrap();
        assert!(recorder.visits().unwrap().is_empty());
        assert!(recorder.downloads().unwrap().is_empty());

        recorder.record_visit("https://b.example", "B").unwrap();
        assert_eq!(recorder.visits().unwrap().len(), 1);
    }
}
