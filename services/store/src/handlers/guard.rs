//! Authorization Gate wiring for axum routes.
//!
//! Each `require_*` function is a `middleware::from_fn_with_state` layer. On
//! success the user is stored in request extensions as [`AuthenticatedUser`];
//! on denial the wrapped handler never runs.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use atelier_auth_types::bearer::authorization_value;
use atelier_domain::access::Permission;
use atelier_domain::user::Role;

use crate::domain::types::User;
use crate::error::StoreServiceError;
use crate::state::AppState;
use crate::usecase::gate::{GateOutcome, RequestContext, Requirement};

/// The caller, as resolved by the gate for this request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let authorization = authorization_value(&parts.headers);
        async move { Ok(Self { authorization }) }
    }
}

async fn enforce(
    state: &AppState,
    ctx: RequestContext,
    requirement: Requirement,
    mut req: Request,
    next: Next,
) -> Result<Response, StoreServiceError> {
    match state.gate().check(&ctx, &requirement).await? {
        GateOutcome::Allowed(user) => {
            req.extensions_mut().insert(AuthenticatedUser(user));
            Ok(next.run(req).await)
        }
        GateOutcome::Denied(denial) => Err(denial.into()),
    }
}

pub async fn require_authenticated(
    State(state): State<AppState>,
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Result<Response, StoreServiceError> {
    enforce(&state, ctx, Requirement::Authenticated, req, next).await
}

pub async fn require_activated(
    State(state): State<AppState>,
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Result<Response, StoreServiceError> {
    enforce(&state, ctx, Requirement::Activated, req, next).await
}

pub async fn require_admin(
    State(state): State<AppState>,
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Result<Response, StoreServiceError> {
    enforce(&state, ctx, Requirement::Role(Role::Admin), req, next).await
}

pub async fn require_carts_read(
    State(state): State<AppState>,
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Result<Response, StoreServiceError> {
    let requirement = Requirement::Permission(Permission::new(Permission::CARTS_READ));
    enforce(&state, ctx, requirement, req, next).await
}
