use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::serde::to_rfc3339_secs;

use crate::error::StoreServiceError;
use crate::handlers::guard::AuthenticatedUser;
use crate::state::AppState;
use crate::usecase::user::{
    LoginInput, LoginUseCase, LogoutUseCase, RequestActivationTokenUseCase,
    RequestPasswordResetUseCase,
};

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(serialize_with = "to_rfc3339_secs")]
    pub expiry: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

// ── POST /v1/tokens/authentication ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAuthenticationTokenRequest {
    pub email: String,
    pub password: String,
}

pub async fn create_authentication_token(
    State(state): State<AppState>,
    Json(body): Json<CreateAuthenticationTokenRequest>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        issuer: state.issuer(),
        auth_ttl: state.policy.auth_ttl,
    };
    let issued = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "authentication_token": TokenResponse {
                token: issued.plaintext,
                expiry: issued.record.expiry,
            },
        })),
    ))
}

// ── DELETE /v1/tokens/authentication ─────────────────────────────────────────

pub async fn delete_authentication_tokens(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = LogoutUseCase {
        issuer: state.issuer(),
    };
    usecase.execute(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /v1/tokens/activation ───────────────────────────────────────────────

pub async fn create_activation_token(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = RequestActivationTokenUseCase {
        users: state.user_repo(),
        issuer: state.issuer(),
        mailer: state.mailer.clone(),
        activation_ttl: state.policy.activation_ttl,
    };
    usecase.execute(&body.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "an email will be sent to you containing activation instructions",
        })),
    ))
}

// ── POST /v1/tokens/password-reset ───────────────────────────────────────────

pub async fn create_password_reset_token(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = RequestPasswordResetUseCase {
        users: state.user_repo(),
        issuer: state.issuer(),
        mailer: state.mailer.clone(),
        reset_ttl: state.policy.password_reset_ttl,
    };
    usecase.execute(&body.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "an email will be sent to you containing password reset instructions",
        })),
    ))
}
