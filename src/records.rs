//! Diagnosis record persistence, scoped by the owning user.

use std::sync::Arc;

use crate::models::{NewPatientRecord, PatientRecord};
use crate::store::{StorageError, Store};

pub const DEFAULT_RECENT_LIMIT: i64 = 5;

/// Everything a saved diagnosis needs besides its owner.
#[derive(Debug, Clone)]
pub struct RecordEntry {
    pub patient_name: String,
    pub age: i32,
    pub gender: String,
    pub symptoms: Vec<String>,
    pub disease: String,
    pub result: String,
    pub confidence: f64,
}

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn Store>,
}

impl RecordService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Append one immutable record owned by `user_id`.
    pub fn save(&self, user_id: i32, entry: RecordEntry) -> Result<PatientRecord, StorageError> {
        let patient_name = match entry.patient_name.trim() {
            "" => "Unknown".to_string(),
            name => name.to_string(),
        };

        let record = self.store.insert_record(NewPatientRecord {
            user_id,
            patient_name,
            age: entry.age,
            gender: entry.gender,
            symptoms: entry.symptoms.join(", "),
            disease: entry.disease,
            diagnosis_result: entry.result,
            confidence_score: entry.confidence,
        })?;

        tracing::info!(user_id, record_id = record.id, disease = %record.disease, "Patient record saved");
        Ok(record)
    }

    /// Most recent records first; empty when the user has none.
    pub fn list_recent(&self, user_id: i32, limit: i64) -> Result<Vec<PatientRecord>, StorageError> {
        self.store.recent_records(user_id, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::MemoryStore;

    fn entry(name: &str) -> RecordEntry {
        RecordEntry {
            patient_name: name.to_string(),
            age: 55,
            gender: "female".to_string(),
            symptoms: vec!["HbA1c: 8.2".to_string(), "Glucose: 180".to_string()],
            disease: "Diabetes".to_string(),
            result: "High Risk".to_string(),
            confidence: 91.5,
        }
    }

    fn setup() -> (RecordService, i32) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                name: "Alice".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .unwrap();
        (RecordService::new(store), user.id)
    }

    #[test]
    fn test_save_then_latest_is_first() {
        let (records, user_id) = setup();
        records.save(user_id, entry("Older")).unwrap();
        let saved = records.save(user_id, entry("Jane Doe")).unwrap();

        let recent = records.list_recent(user_id, 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0], saved);
        assert_eq!(recent[0].symptoms, "HbA1c: 8.2, Glucose: 180");
    }

    #[test]
    fn test_no_records_is_empty_not_error() {
        let (records, user_id) = setup();
        assert!(records.list_recent(user_id, DEFAULT_RECENT_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn test_blank_name_stored_as_unknown() {
        let (records, user_id) = setup();
        let saved = records.save(user_id, entry("  ")).unwrap();
        assert_eq!(saved.patient_name, "Unknown");
    }

    #[test]
    fn test_limit_caps_results() {
        let (records, user_id) = setup();
        for i in 0..7 {
            records.save(user_id, entry(&format!("p{i}"))).unwrap();
        }
        let recent = records.list_recent(user_id, DEFAULT_RECENT_LIMIT).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].patient_name, "p6");
    }

    #[test]
    fn test_unknown_owner_fails() {
        let (records, _) = setup();
        let err = records.save(999, entry("Ghost")).unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation(_)));
    }
}
