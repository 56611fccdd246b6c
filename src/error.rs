use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds of the AI generation adapter.
#[derive(Debug, thiserror::Error)]
pub enum ExternalServiceError {
    #[error("AI credential is missing or was rejected")]
    CredentialInvalid,

    #[error("AI service unavailable: {0}")]
    Transient(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("The share link is invalid or corrupted: {0}")]
    CorruptShareLink(String),

    #[error("An account with email {0} already exists")]
    DuplicateAccount(String),

    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error(transparent)]
    ExternalService(#[from] ExternalServiceError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Machine-readable kind the front end switches on to pick its message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound(_) => "not_found",
            Error::CorruptShareLink(_) => "corrupt_share_link",
            Error::DuplicateAccount(_) => "duplicate_account",
            Error::InvalidCredential => "invalid_credential",
            Error::InvalidTransition(_) => "invalid_transition",
            Error::ExternalService(ExternalServiceError::CredentialInvalid) => {
                "ai_credential_invalid"
            }
            Error::ExternalService(ExternalServiceError::Transient(_)) => "ai_unavailable",
            _ => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_)
            | Error::Validation(_)
            | Error::Json(_)
            | Error::CorruptShareLink(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) | Error::InvalidCredential => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateAccount(_) | Error::InvalidTransition(_) => StatusCode::CONFLICT,
            Error::ExternalService(ExternalServiceError::CredentialInvalid) => {
                StatusCode::BAD_GATEWAY
            }
            Error::ExternalService(ExternalServiceError::Transient(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = match &self {
            Error::Config(_)
            | Error::Database(_)
            | Error::Migrate(_)
            | Error::Anyhow(_)
            | Error::Internal(_)
            | Error::Io(_) => {
                tracing::error!(error = %self, "request failed");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "error": error_message, "code": self.code() }));
        (status, body).into_response()
    }
}
