//! Patient table operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::Patient;

impl Database {
    /// Insert a new patient with its pre-assigned id.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patient (id, name, age, gender, phone_number)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                patient.id,
                patient.name,
                patient.age,
                patient.gender,
                patient.phone_number,
            ],
        )?;
        Ok(())
    }

    /// List all patients, ordered by id ascending.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, age, gender, phone_number
            FROM patient
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Patient {
                id: row.get(0)?,
                name: row.get(1)?,
                age: row.get(2)?,
                gender: row.get(3)?,
                phone_number: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a patient by id.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patient WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Count registered patients.
    pub fn count_patients(&self) -> DbResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM patient", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
