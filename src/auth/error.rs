use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::dto::OpResponse;
use crate::auth::repo::StoreError;

/// Domain failures of the three auth operations. The OTP path answers
/// unknown email, wrong code and expired code with one message; login keeps
/// unknown email and wrong password distinct.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already registered.")]
    DuplicateEmail,
    #[error("Invalid or expired OTP.")]
    InvalidOtp,
    #[error("Email not registered.")]
    UnknownEmail,
    #[error("Incorrect password.")]
    WrongPassword,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password too short")]
    PasswordTooShort,
    #[error("Server Error")]
    Notifier(#[source] anyhow::Error),
    #[error("Server Error")]
    Store(#[source] anyhow::Error),
    #[error("Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::Other(e) => Self::Store(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::InvalidOtp | Self::InvalidEmail | Self::PasswordTooShort => {
                StatusCode::BAD_REQUEST
            }
            Self::UnknownEmail | Self::WrongPassword => StatusCode::UNAUTHORIZED,
            Self::Notifier(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // 4xx are expected client outcomes, already logged at the call site.
        // 500s carry a source chain that must be logged here and never reach
        // the client.
        match &self {
            Self::Notifier(e) => tracing::error!(error = %e, "notifier failure"),
            Self::Store(e) => tracing::error!(error = %e, "store failure"),
            Self::Internal(e) => tracing::error!(error = %e, "internal error"),
            _ => {}
        }
        (status, Json(OpResponse::err(self.to_string()))).into_response()
    }
}
