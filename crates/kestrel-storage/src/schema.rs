//! Table schemas and default rows
//!
//! Table and column names form a fixed, closed enumeration. Callers address
//! them only through these enums, so no user-supplied string can ever reach
//! a structural position in a SQL statement; values are always bound as
//! parameters.

use rusqlite::Connection;

use crate::Result;

/// The closed set of capability categories a site can request. Seeded into
/// `permission_rules` at first initialization and never removed.
pub const PERMISSION_KINDS: [&str; 9] = [
    "Certificates",
    "Notifications",
    "Geolocation",
    "MediaAudioCapture",
    "MediaVideoCapture",
    "MediaAudioVideoCapture",
    "MouseLock",
    "DesktopVideoCapture",
    "DesktopAudioVideoCapture",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    // kbsettings.db
    Basic,
    PermissionRules,
    PermissionOrigins,
    SearchEngines,
    // kbhistory.db
    Visits,
    Downloads,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Basic => "basic",
            Table::PermissionRules => "permission_rules",
            Table::PermissionOrigins => "permission_origins",
            Table::SearchEngines => "search_engines",
            Table::Visits => "visits",
            Table::Downloads => "downloads",
        }
    }

    pub(crate) fn create_sql(self) -> &'static str {
        match self {
            Table::Basic => {
                "CREATE TABLE IF NOT EXISTS basic (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    item TEXT NOT NULL,
                    value TEXT NOT NULL
                )"
            }
            Table::PermissionRules => {
                "CREATE TABLE IF NOT EXISTS permission_rules (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    permission TEXT NOT NULL UNIQUE,
                    ask INTEGER NOT NULL DEFAULT 1
                )"
            }
            Table::PermissionOrigins => {
                "CREATE TABLE IF NOT EXISTS permission_origins (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    permission TEXT NOT NULL,
                    origin TEXT NOT NULL,
                    verdict TEXT NOT NULL,
                    UNIQUE (permission, origin)
                )"
            }
            Table::SearchEngines => {
                "CREATE TABLE IF NOT EXISTS search_engines (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    provider TEXT NOT NULL UNIQUE,
                    url TEXT NOT NULL,
                    enable TEXT NOT NULL DEFAULT '0'
                )"
            }
            Table::Visits => {
                "CREATE TABLE IF NOT EXISTS visits (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL,
                    page_title TEXT NOT NULL,
                    time TEXT NOT NULL
                )"
            }
            Table::Downloads => {
                "CREATE TABLE IF NOT EXISTS downloads (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL,
                    file_name TEXT NOT NULL,
                    status TEXT NOT NULL,
                    reference_url TEXT NOT NULL,
                    time TEXT NOT NULL
                )"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Item,
    Value,
    Permission,
    Ask,
    Origin,
    Verdict,
    Provider,
    Url,
    Enable,
    PageTitle,
    FileName,
    Status,
    ReferenceUrl,
    Time,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Item => "item",
            Column::Value => "value",
            Column::Permission => "permission",
            Column::Ask => "ask",
            Column::Origin => "origin",
            Column::Verdict => "verdict",
            Column::Provider => "provider",
            Column::Url => "url",
            Column::Enable => "enable",
            Column::PageTitle => "page_title",
            Column::FileName => "file_name",
            Column::Status => "status",
            Column::ReferenceUrl => "reference_url",
            Column::Time => "time",
        }
    }
}

/// Environment-derived values seeded into the `basic` table when it is
/// first created.
#[derive(Debug, Clone)]
pub struct SettingsDefaults {
    pub download_folder: String,
    pub ui_translation: String,
    pub preferred_language: String,
}

fn table_is_empty(conn: &Connection, table: Table) -> Result<bool> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", table.name()),
        [],
        |row| row.get(0),
    )?;
    Ok(count == 0)
}

/// Create the settings tables and seed default rows. Idempotent: tables are
/// created with `IF NOT EXISTS` and defaults are inserted only when the
/// table was freshly created (detected by an empty-table probe).
pub fn init_settings(conn: &Connection, defaults: &SettingsDefaults) -> Result<()> {
    conn.execute(Table::Basic.create_sql(), [])?;
    if table_is_empty(conn, Table::Basic)? {
        tracing::info!("seeding basic settings");
        let mut stmt = conn.prepare("INSERT INTO basic (item, value) VALUES (?1, ?2)")?;
        for (item, value) in [
            ("download_folder", defaults.download_folder.as_str()),
            ("private_browsing", "0"),
            ("https_mode", "1"),
            ("ui_translation", defaults.ui_translation.as_str()),
            ("preferred_language", defaults.preferred_language.as_str()),
        ] {
            stmt.execute([item, value])?;
        }
    }

    conn.execute(Table::PermissionRules.create_sql(), [])?;
    conn.execute(Table::PermissionOrigins.create_sql(), [])?;
    if table_is_empty(conn, Table::PermissionRules)? {
        tracing::info!("seeding permission rules");
        let mut stmt =
            conn.prepare("INSERT INTO permission_rules (permission, ask) VALUES (?1, 1)")?;
        for kind in PERMISSION_KINDS {
            stmt.execute([kind])?;
        }
    }

    conn.execute(Table::SearchEngines.create_sql(), [])?;
    if table_is_empty(conn, Table::SearchEngines)? {
        tracing::info!("seeding search engines");
        let mut stmt =
            conn.prepare("INSERT INTO search_engines (provider, url, enable) VALUES (?1, ?2, ?3)")?;
        for (provider, url, enable) in [
            ("Bing", "https://www.bing.com/search?q=", "1"),
            ("Google", "https://www.google.com/search?q=", "0"),
            ("Baidu", "https://www.baidu.com/s?wd=", "0"),
        ] {
            stmt.execute([provider, url, enable])?;
        }
    }

    Ok(())
}

/// Create the history tables. Idempotent; history tables carry no default
/// rows.
pub fn init_history(conn: &Connection) -> Result<()> {
    conn.execute(Table::Visits.create_sql(), [])?;
    conn.execute(Table::Downloads.create_sql(), [])?;
    Ok(())
}
