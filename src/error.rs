use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::auth::AuthError;
use crate::forms::FormError;
use crate::inference::InferenceError;
use crate::quiz::QuizError;
use crate::session::Mode;
use crate::store::StorageError;

/// Everything a request handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error("Missing or expired session")]
    Unauthorized,

    #[error("Select {0:?} mode first")]
    WrongMode(Mode),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Audit log write failed: {0}")]
    Audit(#[source] std::io::Error),

    #[error("Blocking task failed")]
    Blocking(#[from] BlockingError),
}

impl AppError {
    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::MissingFields | AuthError::FieldTooLong { .. }) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::DuplicateEmail) => StatusCode::CONFLICT,
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::Hashing(_) | AuthError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Inference(InferenceError::ModelUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Quiz(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::WrongMode(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Audit(_) | Self::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details go to the log, not to the client
        let message = if self.is_internal() {
            tracing::error!("Request failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
