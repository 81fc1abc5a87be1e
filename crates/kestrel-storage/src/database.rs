//! Database connection and generic operations

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

use crate::schema::{self, Column, SettingsDefaults, Table};
use crate::Result;

/// One logical database (settings or history) behind a shared handle.
/// Cloning shares the underlying connection; each operation is a
/// self-contained unit of work guarded by the mutex.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the settings database, creating and seeding its schema.
    pub fn open_settings<P: AsRef<Path>>(path: P, defaults: &SettingsDefaults) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::init_settings(&conn, defaults)?;
        Ok(Self::wrap(conn))
    }

    /// Open the history database, creating its schema.
    pub fn open_history<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::init_history(&conn)?;
        Ok(Self::wrap(conn))
    }

    pub fn settings_in_memory(defaults: &SettingsDefaults) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_settings(&conn, defaults)?;
        Ok(Self::wrap(conn))
    }

    pub fn history_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_history(&conn)?;
        Ok(Self::wrap(conn))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// All rows of `table`, in insertion order, every column rendered as
    /// text.
    pub fn read_table(&self, table: Table) -> Result<Vec<Vec<String>>> {
        self.with_connection(|conn| {
            let sql = format!("SELECT * FROM {} ORDER BY id", table.name());
            collect_rows(conn, &sql, [])
        })
    }

    /// Rows of `table` where `column` equals `value`.
    pub fn read_where(&self, table: Table, column: Column, value: &str) -> Result<Vec<Vec<String>>> {
        self.with_connection(|conn| {
            let sql = format!(
                "SELECT * FROM {} WHERE {} = ?1",
                table.name(),
                column.name()
            );
            collect_rows(conn, &sql, [value])
        })
    }

    /// Set `target_column` on every row where `match_column` equals
    /// `match_value`; returns the number of rows changed.
    pub fn update_where(
        &self,
        table: Table,
        match_column: Column,
        match_value: &str,
        target_column: Column,
        target_value: &str,
    ) -> Result<usize> {
        self.with_connection(|conn| {
            let sql = format!(
                "UPDATE {} SET {} = ?1 WHERE {} = ?2",
                table.name(),
                target_column.name(),
                match_column.name()
            );
            Ok(conn.execute(&sql, [target_value, match_value])?)
        })
    }

    /// Delete every row where `column` equals `value`; returns the number
    /// of rows deleted.
    pub fn delete_where(&self, table: Table, column: Column, value: &str) -> Result<usize> {
        self.with_connection(|conn| {
            let sql = format!(
                "DELETE FROM {} WHERE {} = ?1",
                table.name(),
                column.name()
            );
            Ok(conn.execute(&sql, [value])?)
        })
    }

    /// Drop `table` and recreate it empty. Used by "clear history".
    pub fn reset_table(&self, table: Table) -> Result<()> {
        self.transaction(|conn| {
            conn.execute(&format!("DROP TABLE IF EXISTS {}", table.name()), [])?;
            conn.execute(table.create_sql(), [])?;
            tracing::info!(table = table.name(), "reset table");
            Ok(())
        })
    }
}

fn collect_rows<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Vec<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();
    let rows = stmt
        .query_map(params, |row| {
            let mut values = Vec::with_capacity(column_count);
            for n in 0..column_count {
                values.push(match row.get_ref(n)? {
                    ValueRef::Null => String::new(),
                    ValueRef::Integer(v) => v.to_string(),
                    ValueRef::Real(v) => v.to_string(),
                    ValueRef::Text(v) => String::from_utf8_lossy(v).into_owned(),
                    ValueRef::Blob(_) => String::new(),
                });
            }
            Ok(values)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PERMISSION_KINDS;

    fn defaults() -> SettingsDefaults {
        SettingsDefaults {
            download_folder: "/tmp/Downloads".to_string(),
            ui_translation: "en_US".to_string(),
            preferred_language: "en-US".to_string(),
        }
    }

    #[test]
    fn test_settings_seeded_once() {
        let db = Database::settings_in_memory(&defaults()).unwrap();

        assert_eq!(db.read_table(Table::Basic).unwrap().len(), 5);
        assert_eq!(
            db.read_table(Table::PermissionRules).unwrap().len(),
            PERMISSION_KINDS.len()
        );
        assert_eq!(db.read_table(Table::SearchEngines).unwrap().len(), 3);
        assert!(db.read_table(Table::PermissionOrigins).unwrap().is_empty());
    }

    #[test]
    fn test_init_idempotent_on_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kbsettings.db");

        let db = Database::open_settings(&path, &defaults()).unwrap();
        db.update_where(Table::Basic, Column::Item, "https_mode", Column::Value, "0")
            .unwrap();
        drop(db);

        // Re-opening must neither duplicate nor overwrite existing rows.
        let db = Database::open_settings(&path, &defaults()).unwrap();
        assert_eq!(db.read_table(Table::Basic).unwrap().len(), 5);
        let rows = db
            .read_where(Table::Basic, Column::Item, "https_mode")
            .unwrap();
        assert_eq!(rows[0][2], "0");
    }

    #[test]
    fn test_read_where_and_update_where() {
        let db = Database::settings_in_memory(&defaults()).unwrap();

        let rows = db
            .read_where(Table::Basic, Column::Item, "download_folder")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "download_folder");
        assert_eq!(rows[0][2], "/tmp/Downloads");

        let changed = db
            .update_where(
                Table::Basic,
                Column::Item,
                "download_folder",
                Column::Value,
                "/data",
            )
            .unwrap();
        assert_eq!(changed, 1);
        let rows = db
            .read_where(Table::Basic, Column::Item, "download_folder")
            .unwrap();
        assert_eq!(rows[0][2], "/data");
    }

    #[test]
    fn test_delete_where_reports_missing() {
        let db = Database::settings_in_memory(&defaults()).unwrap();
        let deleted = db
            .delete_where(Table::SearchEngines, Column::Provider, "AltaVista")
            .unwrap();
        assert_eq!(deleted, 0);
    }

    #[test]
    fn test_reset_table_leaves_empty_queryable_schema() {
        let db = Database::history_in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO visits (url, page_title, time) VALUES ('https://a', 'A', 't')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        assert_eq!(db.read_table(Table::Visits).unwrap().len(), 1);

        db.reset_table(Table::Visits).unwrap();
        assert!(db.read_table(Table::Visits).unwrap().is_empty());

        // Schema intact: inserts still work immediately after.
        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO visits (url, page_title, time) VALUES ('https://b', 'B', 't')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        assert_eq!(db.read_table(Table::Visits).unwrap().len(), 1);
    }
}
