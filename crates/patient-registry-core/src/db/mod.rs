//! Database layer for the patient registry.

mod schema;
mod patients;

pub use schema::*;

use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
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

    /// Apply the schema and seed an empty table. Safe to run on every start.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.seed_if_empty()?;
        Ok(())
    }

    /// Insert the fixed sample rows, only when the table holds no patients.
    /// The inserts share one transaction so an interrupted seed leaves the
    /// table empty and the next start re-seeds in full.
    fn seed_if_empty(&self) -> DbResult<()> {
        if self.count_patients()? > 0 {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        for (i, (name, age, gender, phone_number)) in SEED_ROWS.iter().enumerate() {
            tx.execute(
                "INSERT INTO patient (id, name, age, gender, phone_number) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![i as i64 + 1, name, age, gender, phone_number],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Get raw connection (for interpreter-built queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
