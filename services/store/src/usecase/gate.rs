//! Authorization Gate: bearer header → authenticated user → role/permission check.
//!
//! Denials come back as `GateOutcome::Denied`. Only storage failures surface
//! as `Err`.

use atelier_auth_types::bearer::parse_bearer;
use atelier_domain::access::{Permission, Scope};
use atelier_domain::user::Role;

use crate::domain::repository::{AccessRepository, TokenRepository, UserRepository};
use crate::domain::types::User;
use crate::error::StoreServiceError;
use crate::usecase::authenticate::Authenticator;
use crate::usecase::permission::PermissionResolver;

/// Request-scoped input to the gate, extracted by the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Raw `Authorization` header value, if any.
    pub authorization: Option<String>,
}

/// What a protected operation demands of its caller.
///
/// `Role` and `Permission` imply `Activated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Activated,
    Role(Role),
    Permission(Permission),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Header missing or not `Bearer <token>`.
    NoCredentials,
    /// Token unknown, expired, wrong scope, or its user is gone.
    InvalidToken,
    /// Authenticated, but the account is not activated.
    Inactive,
    /// Authenticated and activated, but lacking the role or permission.
    Forbidden,
}

#[derive(Debug, Clone)]
pub enum GateOutcome {
    Allowed(User),
    Denied(Denial),
}

impl From<Denial> for StoreServiceError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::NoCredentials => Self::NoCredentials,
            Denial::InvalidToken => Self::InvalidToken,
            Denial::Inactive => Self::InactiveAccount,
            Denial::Forbidden => Self::Forbidden,
        }
    }
}

pub struct AuthorizationGate<T: TokenRepository, U: UserRepository, A: AccessRepository> {
    pub authenticator: Authenticator<T, U>,
    pub resolver: PermissionResolver<A>,
}

impl<T: TokenRepository, U: UserRepository, A: AccessRepository> AuthorizationGate<T, U, A> {
    pub async fn check(
        &self,
        ctx: &RequestContext,
        requirement: &Requirement,
    ) -> Result<GateOutcome, StoreServiceError> {
        let Ok(token) = parse_bearer(ctx.authorization.as_deref()) else {
            return Ok(GateOutcome::Denied(Denial::NoCredentials));
        };

        let user = match self
            .authenticator
            .authenticate(token, Scope::Authentication)
            .await
        {
            Ok(user) => user,
            Err(StoreServiceError::InvalidToken) => {
                return Ok(GateOutcome::Denied(Denial::InvalidToken));
            }
            Err(e) => return Err(e),
        };

        if *requirement == Requirement::Authenticated {
            return Ok(GateOutcome::Allowed(user));
        }

        if !user.activated {
            return Ok(GateOutcome::Denied(Denial::Inactive));
        }

        let granted = match requirement {
            Requirement::Authenticated | Requirement::Activated => true,
            Requirement::Role(role) => self.resolver.has_role(&user, *role).await,
            Requirement::Permission(permission) => {
                self.resolver.has_permission(&user, permission).await
            }
        };

        if granted {
            Ok(GateOutcome::Allowed(user))
        } else {
            tracing::debug!(user_id = %user.id, requirement = ?requirement, "access denied");
            Ok(GateOutcome::Denied(Denial::Forbidden))
        }
    }
}
