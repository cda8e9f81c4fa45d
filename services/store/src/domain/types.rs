use std::fmt;

use chrono::{DateTime, Utc};

use atelier_auth_types::token::TokenDigest;
use atelier_domain::access::Scope;
use atelier_domain::id::{ItemId, UserId};
use atelier_domain::user::Role;

/// Argon2 PHC string. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential(pub String);

impl StoredCredential {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoredCredential(..)")
    }
}

/// Store customer as loaded from the database.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub credential: StoredCredential,
    pub activated: bool,
    pub balance: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Fields for a user row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub credential: StoredCredential,
    pub balance: i64,
    pub role: Role,
}

/// Persisted form of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub digest: TokenDigest,
    pub user_id: UserId,
    pub scope: Scope,
    pub expiry: DateTime<Utc>,
}

/// A freshly minted token. `plaintext` is handed to the caller once and never stored.
#[derive(Clone)]
pub struct IssuedToken {
    pub plaintext: String,
    pub record: TokenRecord,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("plaintext", &"..")
            .field("record", &self.record)
            .finish()
    }
}

/// A purchase request with the catalog price already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub price: i64,
}

/// Result of a committed settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub balance: i64,
}

/// Owner summary plus purchased item ids, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub name: String,
    pub balance: i64,
    pub items: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    Welcome,
    Activation,
    PasswordReset,
}

impl MailTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "user_welcome",
            Self::Activation => "token_activation",
            Self::PasswordReset => "token_password_reset",
        }
    }
}

/// Message handed to the mail collaborator. Carries a token plaintext.
#[derive(Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub template: MailTemplate,
    pub user_id: UserId,
    pub token: String,
}

impl fmt::Debug for OutgoingMail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutgoingMail")
            .field("to", &self.to)
            .field("template", &self.template)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
