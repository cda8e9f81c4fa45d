use chrono::{Duration, Utc};
use rand::RngExt;

use atelier_auth_types::token::{TOKEN_ALPHABET, TOKEN_LENGTH, TokenDigest};
use atelier_domain::access::Scope;
use atelier_domain::id::UserId;

use crate::domain::repository::TokenRepository;
use crate::domain::types::{IssuedToken, TokenRecord};
use crate::error::StoreServiceError;

/// Draw a fresh plaintext from the thread-local CSPRNG.
pub fn generate_plaintext() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

// ── Token Issuer ─────────────────────────────────────────────────────────────

pub struct TokenIssuer<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> TokenIssuer<T> {
    /// Mint a token for `user_id` valid for `ttl`. Only the digest is persisted.
    pub async fn issue(
        &self,
        user_id: UserId,
        scope: Scope,
        ttl: Duration,
    ) -> Result<IssuedToken, StoreServiceError> {
        let plaintext = generate_plaintext();
        let record = TokenRecord {
            digest: TokenDigest::of(&plaintext),
            user_id,
            scope,
            expiry: Utc::now() + ttl,
        };
        self.tokens.insert(&record).await?;
        tracing::debug!(user_id = %user_id, scope = %scope, "token issued");
        Ok(IssuedToken { plaintext, record })
    }

    /// Remove every `scope` token of a user. Succeeds when there are none.
    pub async fn revoke_all(&self, user_id: UserId, scope: Scope) -> Result<(), StoreServiceError> {
        let removed = self.tokens.delete_all_for_user(user_id, scope).await?;
        tracing::debug!(user_id = %user_id, scope = %scope, removed, "tokens revoked");
        Ok(())
    }
}

// ── Expiry sweep ─────────────────────────────────────────────────────────────

pub struct SweepExpiredTokensUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> SweepExpiredTokensUseCase<T> {
    pub async fn execute(&self) -> Result<u64, StoreServiceError> {
        let removed = self.tokens.delete_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::info!(removed, "expired tokens swept");
        }
        Ok(removed)
    }
}
