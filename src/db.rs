use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::Result;

/// Persistence handle owning the SQLite connection
///
/// The stores borrow this handle; nothing in the crate keeps a connection
/// anywhere else. Call [`Database::close`] to release it and surface close
/// errors; dropping the handle also releases it.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and bring the schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let db = Self::from_connection(conn)?;
        info!(path = %path.display(), "Database opened");
        Ok(db)
    }

    /// Open a private in-memory database, mostly useful for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // SQLite leaves foreign keys off per connection unless asked
        conn.pragma_update(None, "foreign_keys", true)?;
        Self::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!(
            "../migrations/2026-10-19-000000_create_tables/up.sql"
        ))?;
        debug!("Migrations applied");
        Ok(())
    }

    /// Borrow the underlying connection
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, reporting any error SQLite raises while doing so
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err)?;
        info!("Database connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::open_in_memory().unwrap();
        let enabled: bool = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert!(enabled);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(Database::run_migrations(db.connection()).is_ok());
    }
}
