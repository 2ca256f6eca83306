//! # MediRisk
//!
//! Disease-risk screening service: accounts, per-user diagnosis history,
//! model inference for diabetes, blood pressure and lung cancer, and a
//! training quiz, served over actix-web.

pub mod audit;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod inference;
pub mod models;
pub mod quiz;
pub mod records;
pub mod schema;
pub mod session;
pub mod store;

use std::sync::Arc;

use crate::audit::AuditLog;
use crate::auth::AuthService;
use crate::inference::InferenceDispatcher;
use crate::records::RecordService;
use crate::session::SessionStore;

/// Shared state handed to every handler through `web::Data`.
pub struct AppState {
    pub auth: AuthService,
    pub records: RecordService,
    pub dispatcher: Arc<InferenceDispatcher>,
    pub audit: AuditLog,
    pub sessions: Arc<SessionStore>,
    pub recent_limit: i64,
}
