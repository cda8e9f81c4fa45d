use axum::http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use axum::response::{IntoResponse, Response};

use crate::usecase::credential::CredentialError;

/// Store service domain error variants.
///
/// `InvalidToken` covers unknown, expired and wrong-scope tokens alike;
/// callers must not be able to tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum StoreServiceError {
    #[error("{0}")]
    Credential(#[from] CredentialError),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("unauthorized")]
    NoCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("account is not activated")]
    InactiveAccount,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("item not found")]
    ItemNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("purchase could not be completed")]
    Settlement(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credential(_) => "INVALID_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NoCredentials => "UNAUTHORIZED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InactiveAccount => "INACTIVE_ACCOUNT",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::Settlement(_) => "SETTLEMENT_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Credential(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::NoCredentials | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::InactiveAccount | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::ItemNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists | Self::InsufficientFunds => StatusCode::CONFLICT,
            Self::Settlement(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and already visible in the TraceLayer span.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error")
            }
            Self::Settlement(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "SETTLEMENT_FAILED", "settlement failed")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
