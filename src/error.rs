use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Failures surfaced by the account and auth services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Unknown username and wrong password share this variant and message.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("username already in use")]
    DuplicateUsername,

    #[error("email already in use")]
    DuplicateEmail,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::DuplicateUsername
            | ServiceError::DuplicateEmail
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unreadable or mistyped request bodies are validation failures.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ServiceError::Internal(e) => {
                error!(error = %e, "internal error");
                (status, "internal server error".to_string()).into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
