#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use atelier_auth_types::token::TokenDigest;
use atelier_domain::access::{Permission, Scope};
use atelier_domain::id::{ItemId, UserId};
use atelier_domain::user::Role;

use crate::domain::types::{
    Cart, NewUser, OutgoingMail, Purchase, Receipt, StoredCredential, TokenRecord, User,
};
use crate::error::StoreServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreServiceError>;

    /// Insert a user. Fails with `UserAlreadyExists` when the email is taken.
    async fn create(&self, user: &NewUser) -> Result<User, StoreServiceError>;

    async fn activate(&self, id: UserId) -> Result<(), StoreServiceError>;

    /// Store a new credential and delete the user's `password-reset` and
    /// `authentication` tokens, all in one transaction.
    async fn reset_credential(
        &self,
        id: UserId,
        credential: &StoredCredential,
    ) -> Result<(), StoreServiceError>;

    /// Delete a user together with their tokens and cart lines.
    /// Returns `false` if no such user existed.
    async fn delete(&self, id: UserId) -> Result<bool, StoreServiceError>;
}

/// Repository for token digests. Only the Token Issuer writes through this.
pub trait TokenRepository: Send + Sync {
    async fn insert(&self, record: &TokenRecord) -> Result<(), StoreServiceError>;

    /// Find a token with this digest and scope whose expiry is after `now`.
    async fn find_live(
        &self,
        digest: &TokenDigest,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenRecord>, StoreServiceError>;

    /// Remove every token of `scope` for a user. Returns the number removed.
    async fn delete_all_for_user(
        &self,
        user_id: UserId,
        scope: Scope,
    ) -> Result<u64, StoreServiceError>;

    /// Remove tokens whose expiry is at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreServiceError>;
}

/// Read-only access to role assignments and the role→permission table.
pub trait AccessRepository: Send + Sync {
    /// The role currently stored for a user, `None` if the user is gone.
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, StoreServiceError>;

    async fn permissions_for_role(&self, role: Role)
    -> Result<Vec<Permission>, StoreServiceError>;
}

/// Authoritative item prices.
pub trait CatalogPort: Send + Sync {
    async fn price_of(&self, item_id: ItemId) -> Result<Option<i64>, StoreServiceError>;
}

/// The only write path for balances and cart lines.
pub trait SettlementRepository: Send + Sync {
    /// Debit `purchase.price` and append one cart line in a single transaction.
    ///
    /// Fails with `UserNotFound` if the user is gone, `InsufficientFunds` if the
    /// debit would go below zero and `allow_overdraft` is false, and
    /// `Settlement` on any storage failure. Nothing is written on failure.
    async fn settle(
        &self,
        purchase: &Purchase,
        allow_overdraft: bool,
    ) -> Result<Receipt, StoreServiceError>;
}

pub trait CartRepository: Send + Sync {
    /// Name, balance and purchased item ids (oldest first) read from a single
    /// snapshot, so the balance always accounts for exactly the listed items.
    /// `None` if the user does not exist.
    async fn cart_of(&self, user_id: UserId) -> Result<Option<Cart>, StoreServiceError>;
}

/// Outbound mail collaborator. Delivery happens out of band.
pub trait Mailer: Send + Sync {
    fn enqueue(&self, mail: OutgoingMail);
}
