use std::sync::Mutex;

use chrono::Utc;

use super::{StorageError, Store, limits};
use crate::models::{NewPatientRecord, NewUser, PatientRecord, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    records: Vec<PatientRecord>,
}

/// In-process store with the same constraints as the SQL schema:
/// unique emails, record owners must exist, serial ids.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-written row
        // behind, so the data is still consistent.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Postgres rejects values longer than the column's VARCHAR limit
fn check_len(column: &'static str, value: &str, max: usize) -> Result<(), StorageError> {
    if value.chars().count() > max {
        return Err(StorageError::ValueTooLong { column, max });
    }
    Ok(())
}

impl Store for MemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<User, StorageError> {
        check_len("users.name", &user.name, limits::USER_NAME)?;
        check_len("users.email", &user.email, limits::USER_EMAIL)?;
        check_len("users.password", &user.password_hash, limits::PASSWORD_HASH)?;

        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StorageError::UniqueViolation("users_email_key".to_string()));
        }

        let row = User {
            id: tables.users.len() as i32 + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let tables = self.lock();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    fn count_users(&self) -> Result<i64, StorageError> {
        Ok(self.lock().users.len() as i64)
    }

    fn insert_record(&self, record: NewPatientRecord) -> Result<PatientRecord, StorageError> {
        check_len("patient_records.patient_name", &record.patient_name, limits::PATIENT_NAME)?;
        check_len("patient_records.gender", &record.gender, limits::GENDER)?;
        check_len("patient_records.disease", &record.disease, limits::DISEASE)?;
        check_len(
            "patient_records.diagnosis_result",
            &record.diagnosis_result,
            limits::DIAGNOSIS_RESULT,
        )?;

        let mut tables = self.lock();
        if !tables.users.iter().any(|u| u.id == record.user_id) {
            return Err(StorageError::ForeignKeyViolation(
                "patient_records_user_id_fkey".to_string(),
            ));
        }

        let row = PatientRecord {
            id: tables.records.len() as i32 + 1,
            user_id: record.user_id,
            patient_name: record.patient_name,
            age: record.age,
            gender: record.gender,
            symptoms: record.symptoms,
            disease: record.disease,
            diagnosis_result: record.diagnosis_result,
            confidence_score: record.confidence_score,
            created_at: Utc::now().naive_utc(),
        };
        tables.records.push(row.clone());
        Ok(row)
    }

    fn recent_records(&self, user_id: i32, limit: i64) -> Result<Vec<PatientRecord>, StorageError> {
        let tables = self.lock();
        let mut rows: Vec<PatientRecord> = tables
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_record(user_id: i32, name: &str) -> NewPatientRecord {
        NewPatientRecord {
            user_id,
            patient_name: name.to_string(),
            age: 40,
            gender: "female".to_string(),
            symptoms: String::new(),
            disease: "Diabetes".to_string(),
            diagnosis_result: "Low Risk".to_string(),
            confidence_score: 80.0,
        }
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@x.com")).expect("first insert");

        let err = store.insert_user(new_user("a@x.com")).unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation(_)));
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn test_record_requires_existing_user() {
        let store = MemoryStore::new();
        let err = store.insert_record(new_record(42, "Bob")).unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation(_)));
    }

    #[test]
    fn test_varchar_limits_enforced() {
        let store = MemoryStore::new();
        let mut long_name = new_user("a@x.com");
        long_name.name = "n".repeat(101);
        assert!(matches!(
            store.insert_user(long_name),
            Err(StorageError::ValueTooLong { column: "users.name", max: 100 })
        ));
        assert_eq!(store.count_users().unwrap(), 0);

        let alice = store.insert_user(new_user("a@x.com")).unwrap();
        let err = store.insert_record(new_record(alice.id, &"p".repeat(101))).unwrap_err();
        assert!(matches!(err, StorageError::ValueTooLong { column: "patient_records.patient_name", .. }));
        // the limit counts characters, not bytes
        assert!(store.insert_record(new_record(alice.id, &"é".repeat(100))).is_ok());
    }

    #[test]
    fn test_recent_records_newest_first_and_scoped() {
        let store = MemoryStore::new();
        let alice = store.insert_user(new_user("a@x.com")).unwrap();
        let bob = store.insert_user(new_user("b@x.com")).unwrap();

        for name in ["first", "second", "third"] {
            store.insert_record(new_record(alice.id, name)).unwrap();
        }
        store.insert_record(new_record(bob.id, "other")).unwrap();

        let rows = store.recent_records(alice.id, 2).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.patient_name.as_str()).collect();
        assert_eq!(names, ["third", "second"]);
    }
}
