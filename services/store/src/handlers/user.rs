use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::serde::to_rfc3339_secs;
use atelier_domain::id::UserId;
use atelier_domain::user::Role;

use crate::domain::types::User;
use crate::error::StoreServiceError;
use crate::handlers::guard::AuthenticatedUser;
use crate::state::AppState;
use crate::usecase::user::{
    ActivateUserUseCase, DeleteUserUseCase, RegisterUserInput, RegisterUserUseCase,
    ResetPasswordInput, ResetPasswordUseCase,
};

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub activated: bool,
    pub role: Role,
    #[serde(serialize_with = "to_rfc3339_secs")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            activated: user.activated,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

// ── POST /v1/users ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = RegisterUserUseCase {
        users: state.user_repo(),
        issuer: state.issuer(),
        mailer: state.mailer.clone(),
        initial_balance: state.policy.initial_balance,
        activation_ttl: state.policy.activation_ttl,
    };
    let user = usecase
        .execute(RegisterUserInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope { user: user.into() }),
    ))
}

// ── PUT /v1/users/activated ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ActivateUserRequest {
    pub token: String,
}

pub async fn activate_user(
    State(state): State<AppState>,
    Json(body): Json<ActivateUserRequest>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = ActivateUserUseCase {
        authenticator: state.authenticator(),
        users: state.user_repo(),
        issuer: state.issuer(),
    };
    let user = usecase.execute(&body.token).await?;
    Ok(Json(UserEnvelope { user: user.into() }))
}

// ── PUT /v1/users/password ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub token: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = ResetPasswordUseCase {
        authenticator: state.authenticator(),
        users: state.user_repo(),
    };
    usecase
        .execute(ResetPasswordInput {
            token: body.token,
            password: body.password,
        })
        .await?;
    Ok(Json(serde_json::json!({
        "message": "your password was successfully reset",
    })))
}

// ── DELETE /v1/users/{id} ────────────────────────────────────────────────────

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(UserId(id)).await?;
    tracing::info!(admin_id = %admin.id, user_id = id, "user removed by admin");
    Ok(StatusCode::NO_CONTENT)
}
