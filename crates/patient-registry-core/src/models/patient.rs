//! Patient models.

use serde::{Deserialize, Serialize};

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Sequential id (1, 2, 3...), assigned client-side from the current
    /// in-memory list, never by the store. Not safe under concurrent writers.
    pub id: i64,
    /// Patient name
    pub name: String,
    /// Age in years (0-150 by UI convention, not enforced at storage)
    pub age: i64,
    /// Gender (free text; the UI offers Male/Female/Other)
    pub gender: String,
    /// Contact phone number
    pub phone_number: String,
}

impl Patient {
    /// Next sequential id: `max(existing) + 1`, or `1` for an empty list.
    pub fn next_id(existing: &[Patient]) -> i64 {
        existing.iter().map(|p| p.id).max().map_or(1, |max| max + 1)
    }
}

/// Registration form input: a patient without an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub phone_number: String,
}

impl NewPatient {
    /// Check required fields, returning the names of every blank one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name".to_string());
        }
        if self.gender.trim().is_empty() {
            missing.push("gender".to_string());
        }
        if self.phone_number.trim().is_empty() {
            missing.push("phone_number".to_string());
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// Build the patient record, trimming free-text fields.
    pub fn into_patient(self, id: i64) -> Patient {
        Patient {
            id,
            name: self.name.trim().to_string(),
            age: self.age,
            gender: self.gender,
            phone_number: self.phone_number.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: i64) -> Patient {
        Patient {
            id,
            name: format!("Patient {}", id),
            age: 30,
            gender: "Other".into(),
            phone_number: "555-000-0000".into(),
        }
    }

    #[test]
    fn test_next_id_empty_list() {
        assert_eq!(Patient::next_id(&[]), 1);
    }

    #[test]
    fn test_next_id_is_max_plus_one() {
        let patients = vec![patient(1), patient(7), patient(3)];
        assert_eq!(Patient::next_id(&patients), 8);
    }

    #[test]
    fn test_validate_all_present() {
        let new = NewPatient {
            name: "Max".into(),
            age: 4,
            gender: "Male".into(),
            phone_number: "555-123-4567".into(),
        };
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_blank_fields() {
        let new = NewPatient {
            name: "  ".into(),
            age: 4,
            gender: "Male".into(),
            phone_number: "".into(),
        };
        let missing = new.validate().unwrap_err();
        assert_eq!(missing, vec!["name".to_string(), "phone_number".to_string()]);
    }

    #[test]
    fn test_into_patient_trims_text() {
        let new = NewPatient {
            name: "  Jane Smith ".into(),
            age: 32,
            gender: "Female".into(),
            phone_number: " 555-987-6543 ".into(),
        };
        let patient = new.into_patient(4);
        assert_eq!(patient.id, 4);
        assert_eq!(patient.name, "Jane Smith");
        assert_eq!(patient.phone_number, "555-987-6543");
    }
}
