//! Persistence port for users and diagnosis records.
//!
//! `PgStore` is the production backend (diesel over an r2d2 pool).
//! `MemoryStore` keeps the same constraints in process and backs the tests
//! and database-less local runs.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use crate::models::{NewPatientRecord, NewUser, PatientRecord, User};

/// Character limits of the `VARCHAR` columns.
pub mod limits {
    pub const USER_NAME: usize = 100;
    pub const USER_EMAIL: usize = 100;
    pub const PASSWORD_HASH: usize = 200;
    pub const PATIENT_NAME: usize = 100;
    pub const GENDER: usize = 10;
    pub const DISEASE: usize = 50;
    pub const DIAGNOSIS_RESULT: usize = 50;
}

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Value too long for {column} (max {max} characters)")]
    ValueTooLong { column: &'static str, max: usize },

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Storage backend for the `users` and `patient_records` tables.
///
/// Every call is a single synchronous statement; callers on the async side
/// run them through `web::block`.
pub trait Store: Send + Sync {
    /// Insert a user. A duplicate email yields `StorageError::UniqueViolation`.
    fn insert_user(&self, user: NewUser) -> Result<User, StorageError>;

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    fn count_users(&self) -> Result<i64, StorageError>;

    /// Append a record. An unknown `user_id` yields
    /// `StorageError::ForeignKeyViolation`.
    fn insert_record(&self, record: NewPatientRecord) -> Result<PatientRecord, StorageError>;

    /// Records owned by `user_id`, newest first, at most `limit` of them.
    fn recent_records(&self, user_id: i32, limit: i64) -> Result<Vec<PatientRecord>, StorageError>;
}
