//! SQLite schema definition.

/// Complete database schema for the patient registry.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS patient (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL,
    phone_number TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patient_name ON patient(name);
"#;

/// Fixed sample rows, inserted exactly once into an empty table.
pub const SEED_ROWS: [(&str, i64, &str, &str); 3] = [
    ("John Doe", 45, "Male", "555-123-4567"),
    ("Jane Smith", 32, "Female", "555-987-6543"),
    ("Robert Johnson", 56, "Male", "555-456-7890"),
];
