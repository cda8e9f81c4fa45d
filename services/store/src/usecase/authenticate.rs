use chrono::Utc;

use atelier_auth_types::token::{TokenDigest, validate_plaintext};
use atelier_domain::access::Scope;

use crate::domain::repository::{TokenRepository, UserRepository};
use crate::domain::types::User;
use crate::error::StoreServiceError;

/// Resolves a presented bearer plaintext to a live user.
///
/// Malformed, unknown, expired and wrong-scope tokens all yield
/// `StoreServiceError::InvalidToken`. So does a token whose user has since
/// been deleted. Storage failures propagate as-is and deny the request.
pub struct Authenticator<T: TokenRepository, U: UserRepository> {
    pub tokens: T,
    pub users: U,
}

impl<T: TokenRepository, U: UserRepository> Authenticator<T, U> {
    pub async fn authenticate(
        &self,
        presented: &str,
        scope: Scope,
    ) -> Result<User, StoreServiceError> {
        validate_plaintext(presented).map_err(|_| StoreServiceError::InvalidToken)?;

        let digest = TokenDigest::of(presented);
        let record = self
            .tokens
            .find_live(&digest, scope, Utc::now())
            .await?
            .ok_or(StoreServiceError::InvalidToken)?;

        self.users
            .find_by_id(record.user_id)
            .await?
            .ok_or(StoreServiceError::InvalidToken)
    }
}
