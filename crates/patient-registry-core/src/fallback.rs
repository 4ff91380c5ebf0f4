//! Local fallback store: a file-backed mirror of the full patient list.
//!
//! One serialized blob per registry, rewritten whole on every save. Used as
//! a write-through cache while the embedded database is healthy, and as the
//! only persistence after a fallback transition.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Patient;

/// Fallback store errors.
#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FallbackResult<T> = Result<T, FallbackError>;

/// The serialized blob: full patient list plus a save timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct MirrorSnapshot {
    saved_at: String,
    patients: Vec<Patient>,
}

/// File-backed mirror of the patient list.
pub struct FallbackStore {
    path: PathBuf,
}

impl FallbackStore {
    /// Create a store rooted at the given blob path. The file is created on
    /// first save, not here.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the mirrored patient list. A missing or unreadable blob yields
    /// an empty list; read failures are logged, never surfaced.
    pub fn load(&self) -> Vec<Patient> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("failed to read fallback store {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<MirrorSnapshot>(&raw) {
            Ok(snapshot) => snapshot.patients,
            Err(e) => {
                warn!("discarding corrupt fallback blob {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Save the full patient list, replacing any previous snapshot. Writes
    /// to a temp file first so a crash never leaves a half-written blob.
    pub fn save(&self, patients: &[Patient]) -> FallbackResult<()> {
        let snapshot = MirrorSnapshot {
            saved_at: Utc::now().to_rfc3339(),
            patients: patients.to_vec(),
        };
        let raw = serde_json::to_string(&snapshot)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Path of the blob file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
