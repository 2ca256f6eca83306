use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{patient_records, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[diesel(column_name = password)]
    pub password_hash: String,
}

impl User {
    // Strip the hash before a user leaves the service layer
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[diesel(column_name = password)]
    pub password_hash: String,
}

/// User data that is safe to hand to clients and to keep in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = patient_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PatientRecord {
    pub id: i32,
    pub user_id: i32,
    pub patient_name: String,
    pub age: i32,
    pub gender: String,
    pub symptoms: String,
    pub disease: String,
    pub diagnosis_result: String,
    pub confidence_score: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patient_records)]
pub struct NewPatientRecord {
    pub user_id: i32,
    pub patient_name: String,
    pub age: i32,
    pub gender: String,
    pub symptoms: String,
    pub disease: String,
    pub diagnosis_result: String,
    pub confidence_score: f64,
}
