use std::sync::Arc;

use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::config::StoreConfig;
use crate::domain::repository::Mailer;
use crate::infra::db::{
    DbAccessRepository, DbCartRepository, DbCatalogRepository, DbSettlementRepository,
    DbTokenRepository, DbUserRepository,
};
use crate::usecase::authenticate::Authenticator;
use crate::usecase::gate::AuthorizationGate;
use crate::usecase::permission::PermissionResolver;
use crate::usecase::token::TokenIssuer;

/// Lifetimes and money rules derived from `StoreConfig`.
#[derive(Debug, Clone, Copy)]
pub struct StorePolicy {
    pub auth_ttl: Duration,
    pub activation_ttl: Duration,
    pub password_reset_ttl: Duration,
    pub initial_balance: i64,
    pub allow_overdraft: bool,
}

impl From<&StoreConfig> for StorePolicy {
    fn from(config: &StoreConfig) -> Self {
        Self {
            auth_ttl: Duration::seconds(config.auth_token_ttl_secs),
            activation_ttl: Duration::seconds(config.activation_token_ttl_secs),
            password_reset_ttl: Duration::seconds(config.password_reset_token_ttl_secs),
            initial_balance: config.initial_balance,
            allow_overdraft: config.allow_overdraft,
        }
    }
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            auth_ttl: Duration::hours(24),
            activation_ttl: Duration::days(3),
            password_reset_ttl: Duration::minutes(45),
            initial_balance: 100_000,
            allow_overdraft: false,
        }
    }
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: Arc<dyn Mailer>,
    pub policy: StorePolicy,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn access_repo(&self) -> DbAccessRepository {
        DbAccessRepository {
            db: self.db.clone(),
        }
    }

    pub fn catalog_repo(&self) -> DbCatalogRepository {
        DbCatalogRepository {
            db: self.db.clone(),
        }
    }

    pub fn settlement_repo(&self) -> DbSettlementRepository {
        DbSettlementRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbCartRepository {
        DbCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn issuer(&self) -> TokenIssuer<DbTokenRepository> {
        TokenIssuer {
            tokens: self.token_repo(),
        }
    }

    pub fn authenticator(&self) -> Authenticator<DbTokenRepository, DbUserRepository> {
        Authenticator {
            tokens: self.token_repo(),
            users: self.user_repo(),
        }
    }

    pub fn gate(&self) -> AuthorizationGate<DbTokenRepository, DbUserRepository, DbAccessRepository> {
        AuthorizationGate {
            authenticator: self.authenticator(),
            resolver: PermissionResolver {
                access: self.access_repo(),
            },
        }
    }
}
