//! Database layer: the entity store and its unit of work.
//!
//! Every lookup excludes soft-deleted rows. Mutating workflow operations run
//! inside [`Database::run_in_transaction`].

mod schema;
mod cases;
mod contacts;
mod invites;
mod medications;
mod notifications;
mod patients;
mod users;

pub use schema::*;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl DbError {
    /// Classify a write failure, separating constraint violations from other
    /// SQLite errors.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => DbError::Sqlite(err),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Open the database described by a loaded configuration.
    pub fn open_with_config(config: &DatabaseConfig) -> DbResult<Self> {
        let db = if config.in_memory {
            Self::open_in_memory()?
        } else {
            Self::open(&config.path)?
        };
        db.conn
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        debug!(
            path = %config.path,
            in_memory = config.in_memory,
            busy_timeout_ms = config.busy_timeout_ms,
            "database opened"
        );
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` as one unit of work.
    ///
    /// Commits when `f` returns `Ok`; rolls back every write made inside `f`
    /// when it returns `Err` (or unwinds). Units of work do not nest.
    pub fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Database) -> Result<T, E>,
        E: From<DbError>,
    {
        let tx = self.conn.unchecked_transaction().map_err(DbError::from)?;
        match f(self) {
            Ok(value) => {
                tx.commit().map_err(DbError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in [
            "users",
            "patients",
            "cases",
            "medications",
            "notification_preferences",
            "emergency_contacts",
            "invited_users",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    fn count_users(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap()
    }

    fn insert_raw_user(db: &Database, email: &str) -> DbResult<()> {
        db.conn().execute(
            "INSERT INTO users (first_name, last_name, email) VALUES ('A', 'B', ?1)",
            [email],
        )?;
        Ok(())
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = Database::open_in_memory().unwrap();
        let result: DbResult<()> = db.run_in_transaction(|db| insert_raw_user(db, "a@example.com"));
        assert!(result.is_ok());
        assert_eq!(count_users(&db), 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let db = Database::open_in_memory().unwrap();
        let result: DbResult<()> = db.run_in_transaction(|db| {
            insert_raw_user(db, "a@example.com")?;
            insert_raw_user(db, "b@example.com")?;
            Err(DbError::Constraint("forced".into()))
        });
        assert!(result.is_err());
        assert_eq!(count_users(&db), 0);

        // Connection is usable again afterwards
        let result: DbResult<()> = db.run_in_transaction(|db| insert_raw_user(db, "c@example.com"));
        assert!(result.is_ok());
        assert_eq!(count_users(&db), 1);
    }

    #[test]
    fn test_constraint_errors_are_classified() {
        let db = Database::open_in_memory().unwrap();
        insert_raw_user(&db, "dup@example.com").unwrap();
        let err = db
            .conn()
            .execute(
                "INSERT INTO users (first_name, last_name, email) VALUES ('A', 'B', 'dup@example.com')",
                [],
            )
            .map_err(DbError::from_write)
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }

    #[test]
    fn test_open_with_config_in_memory() {
        let config = DatabaseConfig {
            path: "unused.db".into(),
            in_memory: true,
            busy_timeout_ms: 250,
        };
        assert!(Database::open_with_config(&config).is_ok());
    }
}
