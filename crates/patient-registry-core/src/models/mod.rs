//! Domain models for the patient registry.

mod patient;

pub use patient::*;
