use diesel::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::{StorageError, Store};
use crate::models::{NewPatientRecord, NewUser, PatientRecord, User};
use crate::schema::{patient_records, users};

// Database connection pool type
pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

// Applied in one transaction at start-up
const SCHEMA: [&str; 4] = [
    r"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        password VARCHAR(200) NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS patients (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id),
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        phone VARCHAR(15) NOT NULL,
        age INTEGER NOT NULL,
        gender VARCHAR(10) NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS patient_records (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id),
        patient_name VARCHAR(100) NOT NULL,
        age INTEGER NOT NULL,
        gender VARCHAR(10) NOT NULL,
        symptoms TEXT NOT NULL,
        disease VARCHAR(50) NOT NULL,
        diagnosis_result VARCHAR(50) NOT NULL,
        confidence_score DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_patient_records_user_created
        ON patient_records (user_id, created_at DESC)
    ",
];

/// PostgreSQL store. Each call checks a connection out of the pool; the
/// checkout is returned when the `PooledConnection` drops.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    /// Build the pool and make sure the schema exists.
    pub fn connect(database_url: &str, max_size: u32) -> Result<Self, StorageError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder().max_size(max_size).build(manager)?;
        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, StorageError> {
        Ok(self.pool.get()?)
    }

    pub fn init_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DieselError, _>(|conn| {
            for statement in SCHEMA {
                diesel::sql_query(statement).execute(conn)?;
            }
            Ok(())
        })?;
        tracing::info!("Database schema ready");
        Ok(())
    }
}

// Lift constraint violations out of the generic diesel error
fn classify(err: DieselError) -> StorageError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StorageError::UniqueViolation(info.constraint_name().unwrap_or("unique").to_string())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StorageError::ForeignKeyViolation(
                info.constraint_name().unwrap_or("foreign key").to_string(),
            )
        }
        other => StorageError::Database(other),
    }
}

impl Store for PgStore {
    fn insert_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut conn = self.conn()?;
        diesel::insert_into(users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(classify)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let mut conn = self.conn()?;
        users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()
            .map_err(classify)
    }

    fn count_users(&self) -> Result<i64, StorageError> {
        let mut conn = self.conn()?;
        users::table.count().get_result(&mut conn).map_err(classify)
    }

    fn insert_record(&self, record: NewPatientRecord) -> Result<PatientRecord, StorageError> {
        let mut conn = self.conn()?;
        diesel::insert_into(patient_records::table)
            .values(&record)
            .returning(PatientRecord::as_returning())
            .get_result(&mut conn)
            .map_err(classify)
    }

    fn recent_records(&self, user_id: i32, limit: i64) -> Result<Vec<PatientRecord>, StorageError> {
        let mut conn = self.conn()?;
        patient_records::table
            .filter(patient_records::user_id.eq(user_id))
            .order((patient_records::created_at.desc(), patient_records::id.desc()))
            .limit(limit)
            .select(PatientRecord::as_select())
            .load(&mut conn)
            .map_err(classify)
    }
}
