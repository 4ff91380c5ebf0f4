//! Patient Registry Core Library
//!
//! Local-first patient registration: an embedded SQLite store, a file-backed
//! fallback mirror, and an interpreter for a small closed set of SQL SELECT
//! shapes. The UI (form, table, query panel) lives on the other side of the
//! FFI boundary and only exchanges intents and result sets with this crate.
//!
//! # Architecture
//!
//! ```text
//! UI intents (register / delete / list / run query)
//!                      │
//!                      ▼
//!              PatientRepository ── mode machine ──► FallbackStore
//!                │           │                        (JSON mirror)
//!      DbBacked  │           │ FallbackOnly                ▲
//!                ▼           └──────────────────────────────┘
//!         Database (SQLite) ◄── Interpreter (allow-listed shapes,
//!                │                bound parameters only)
//!                └── RefreshPoller (1 s full-snapshot re-read,
//!                    single-flight, skips busy ticks)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite wrapper with idempotent schema + seed initialization
//! - [`fallback`]: file-backed mirror of the full patient list
//! - [`models`]: domain types (Patient, NewPatient)
//! - [`repo`]: dual-store repository and background refresh
//! - [`query`]: free-text query classification and execution

pub mod db;
pub mod fallback;
pub mod models;
pub mod query;
pub mod repo;

// Re-export commonly used types
pub use db::Database;
pub use fallback::FallbackStore;
pub use models::{NewPatient, Patient};
pub use query::{classify, Cell, Interpreter, QueryError, QueryShape, ResultSet};
pub use repo::{PatientRepository, RefreshPoller, RepoError, StoreMode};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};
use std::time::Duration;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RegistryError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Store operation failed: {0}")]
    StoreFailed(String),
}

impl From<RepoError> for RegistryError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Validation { .. } => RegistryError::Validation(e.to_string()),
            RepoError::Mirror(_) => RegistryError::StoreFailed(e.to_string()),
        }
    }
}

impl From<QueryError> for RegistryError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Unsupported(_) => RegistryError::UnsupportedQuery(e.to_string()),
            QueryError::InvalidColumn { .. } => RegistryError::InvalidColumn(e.to_string()),
            QueryError::Sqlite(_) => RegistryError::StoreFailed(e.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for RegistryError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RegistryError::StoreFailed(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the registry with an embedded database at `db_path` and a fallback
/// mirror blob at `mirror_path`. A database that cannot initialize is fatal.
#[uniffi::export]
pub fn open_registry(
    db_path: String,
    mirror_path: String,
) -> Result<Arc<PatientRegistry>, RegistryError> {
    let db =
        Database::open(&db_path).map_err(|e| RegistryError::StoreUnavailable(e.to_string()))?;
    Ok(PatientRegistry::build(
        Some(db),
        FallbackStore::new(&mirror_path),
    ))
}

/// Open the registry without an embedded database; the fallback mirror is
/// the only store for the whole session.
#[uniffi::export]
pub fn open_registry_fallback_only(
    mirror_path: String,
) -> Result<Arc<PatientRegistry>, RegistryError> {
    Ok(PatientRegistry::build(
        None,
        FallbackStore::new(&mirror_path),
    ))
}

/// Open the registry over an in-memory database (for testing).
#[uniffi::export]
pub fn open_registry_in_memory(
    mirror_path: String,
) -> Result<Arc<PatientRegistry>, RegistryError> {
    let db = Database::open_in_memory()
        .map_err(|e| RegistryError::StoreUnavailable(e.to_string()))?;
    Ok(PatientRegistry::build(
        Some(db),
        FallbackStore::new(&mirror_path),
    ))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe registry wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PatientRegistry {
    repo: Arc<Mutex<PatientRepository>>,
    poller: Mutex<Option<RefreshPoller>>,
}

impl PatientRegistry {
    fn build(db: Option<Database>, fallback: FallbackStore) -> Arc<Self> {
        Arc::new(Self {
            repo: Arc::new(Mutex::new(PatientRepository::new(db, fallback))),
            poller: Mutex::new(None),
        })
    }
}

#[uniffi::export]
impl PatientRegistry {
    /// List all patients, id ascending.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, RegistryError> {
        let mut repo = self.repo.lock()?;
        Ok(repo.list().into_iter().map(Into::into).collect())
    }

    /// Register a new patient from form fields.
    pub fn register_patient(
        &self,
        name: String,
        age: i64,
        gender: String,
        phone_number: String,
    ) -> Result<FfiPatient, RegistryError> {
        let mut repo = self.repo.lock()?;
        let patient = repo.add(NewPatient {
            name,
            age,
            gender,
            phone_number,
        })?;
        Ok(patient.into())
    }

    /// Delete a patient by id.
    pub fn delete_patient(&self, id: i64) -> Result<(), RegistryError> {
        let mut repo = self.repo.lock()?;
        repo.remove(id)?;
        Ok(())
    }

    /// Interpret and execute free-text query input from the query panel.
    pub fn run_query(&self, sql: String) -> Result<FfiQueryResult, RegistryError> {
        let repo = self.repo.lock()?;
        let db = repo.database().ok_or_else(|| {
            RegistryError::StoreFailed(
                "embedded database unavailable; custom queries require the database".to_string(),
            )
        })?;
        let result = Interpreter::new(db).run(&sql)?;
        Ok(result.into())
    }

    /// Whether this session has degraded to the fallback store.
    pub fn using_fallback(&self) -> Result<bool, RegistryError> {
        Ok(self.repo.lock()?.mode() == StoreMode::FallbackOnly)
    }

    /// Start background refresh polling. Idempotent while running; an
    /// interval of 0 means the default 1 s tick.
    pub fn start_refresh(&self, interval_ms: u64) -> Result<(), RegistryError> {
        let interval = if interval_ms == 0 {
            repo::DEFAULT_REFRESH_INTERVAL
        } else {
            Duration::from_millis(interval_ms)
        };
        let mut slot = self.poller.lock()?;
        if slot.is_none() {
            *slot = Some(RefreshPoller::start(Arc::clone(&self.repo), interval));
        }
        Ok(())
    }

    /// Stop background refresh polling, if running.
    pub fn stop_refresh(&self) -> Result<(), RegistryError> {
        if let Some(mut poller) = self.poller.lock()?.take() {
            poller.stop();
        }
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub phone_number: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            phone_number: patient.phone_number,
        }
    }
}

/// One result row; cells align with the result's column list, `None` is NULL.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueryRow {
    pub cells: Vec<Option<String>>,
}

/// FFI-safe query result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<FfiQueryRow>,
}

impl From<ResultSet> for FfiQueryResult {
    fn from(result: ResultSet) -> Self {
        Self {
            columns: result.columns,
            rows: result
                .rows
                .into_iter()
                .map(|row| FfiQueryRow {
                    cells: row.iter().map(Cell::render).collect(),
                })
                .collect(),
        }
    }
}
