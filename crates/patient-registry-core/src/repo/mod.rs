//! Patient repository: reconciles the embedded store and the fallback mirror.
//!
//! A two-state mode machine decides which store is authoritative. `DbBacked`
//! reads and writes go to SQLite, with every successful read mirrored to the
//! fallback blob (write-through). Any store failure demotes the session to
//! `FallbackOnly`; there is no automatic promotion back.

mod poller;

pub use poller::*;

use log::warn;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::fallback::{FallbackError, FallbackStore};
use crate::models::{NewPatient, Patient};

/// Repository errors.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Please fill in all fields (missing: {})", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Fallback store write failed: {0}")]
    Mirror(#[from] FallbackError),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Which store is authoritative for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    DbBacked,
    FallbackOnly,
}

/// Reconciling view over the embedded database and the fallback mirror.
pub struct PatientRepository {
    db: Option<Database>,
    fallback: FallbackStore,
    mode: StoreMode,
    patients: Vec<Patient>,
}

impl PatientRepository {
    /// Build a repository. Mode starts `DbBacked` iff a database is
    /// supplied; the initial list is read from whichever store is active.
    pub fn new(db: Option<Database>, fallback: FallbackStore) -> Self {
        let mode = if db.is_some() {
            StoreMode::DbBacked
        } else {
            StoreMode::FallbackOnly
        };
        let mut repo = Self {
            db,
            fallback,
            mode,
            patients: Vec::new(),
        };
        match repo.mode {
            StoreMode::DbBacked => {
                repo.reload_from_db();
            }
            StoreMode::FallbackOnly => {
                repo.patients = repo.fallback.load();
                repo.patients.sort_by_key(|p| p.id);
            }
        }
        repo
    }

    /// Active store mode.
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// Embedded database handle, if one was supplied at construction.
    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    /// Current in-memory list without touching either store.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// List all patients, id ascending. `DbBacked` reads are authoritative
    /// and refresh the mirror as a side effect.
    pub fn list(&mut self) -> Vec<Patient> {
        match self.mode {
            StoreMode::DbBacked => {
                self.reload_from_db();
            }
            StoreMode::FallbackOnly => {
                self.patients = self.fallback.load();
                self.patients.sort_by_key(|p| p.id);
            }
        }
        self.patients.clone()
    }

    /// Register a new patient, assigning the next sequential id from the
    /// current in-memory list.
    pub fn add(&mut self, new: NewPatient) -> RepoResult<Patient> {
        new.validate()
            .map_err(|missing| RepoError::Validation { missing })?;

        let id = Patient::next_id(&self.patients);
        let patient = new.into_patient(id);

        if self.mode == StoreMode::DbBacked {
            if let Some(db) = &self.db {
                // insert, then trust a full re-read over the local guess
                match db
                    .insert_patient(&patient)
                    .and_then(|_| db.list_patients())
                {
                    Ok(list) => {
                        self.patients = list;
                        self.mirror();
                        return Ok(patient);
                    }
                    Err(e) => self.demote("add", &e),
                }
            }
        }

        self.patients.push(patient.clone());
        self.patients.sort_by_key(|p| p.id);
        self.fallback.save(&self.patients)?;
        Ok(patient)
    }

    /// Delete a patient by id.
    pub fn remove(&mut self, id: i64) -> RepoResult<()> {
        if self.mode == StoreMode::DbBacked {
            if let Some(db) = &self.db {
                match db.delete_patient(id).and_then(|_| db.list_patients()) {
                    Ok(list) => {
                        self.patients = list;
                        self.mirror();
                        return Ok(());
                    }
                    Err(e) => self.demote("remove", &e),
                }
            }
        }

        self.patients.retain(|p| p.id != id);
        self.fallback.save(&self.patients)?;
        Ok(())
    }

    /// Full-snapshot re-read from the database; no-op in fallback mode.
    /// Called by the background poller in place of change notifications.
    pub fn refresh(&mut self) {
        if self.mode == StoreMode::DbBacked {
            self.reload_from_db();
        }
    }

    /// Authoritative read from the database, mirrored on success. Returns
    /// false after demoting on failure.
    fn reload_from_db(&mut self) -> bool {
        let Some(db) = &self.db else {
            return false;
        };
        match db.list_patients() {
            Ok(list) => {
                self.patients = list;
                self.mirror();
                true
            }
            Err(e) => {
                self.demote("list", &e);
                false
            }
        }
    }

    /// One-way transition to fallback-only mode; the mirror becomes the
    /// working copy.
    fn demote(&mut self, op: &str, err: &DbError) {
        warn!("store operation '{}' failed, switching to fallback store: {}", op, err);
        self.mode = StoreMode::FallbackOnly;
        self.patients = self.fallback.load();
        self.patients.sort_by_key(|p| p.id);
    }

    /// Write-through mirror update. Failures here are logged, not surfaced:
    /// while the database is healthy the mirror is only a cache.
    fn mirror(&self) {
        if let Err(e) = self.fallback.save(&self.patients) {
            warn!("fallback mirror write failed: {}", e);
        }
    }
}
