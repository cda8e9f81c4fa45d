use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
    sea_query::Expr,
};

use atelier_auth_types::token::TokenDigest;
use atelier_domain::access::{Permission, Scope};
use atelier_domain::id::{ItemId, UserId};
use atelier_domain::user::Role;
use atelier_store_schema::{cart_lines, clothes, roles_permissions, tokens, users};

use crate::domain::repository::{
    AccessRepository, CartRepository, CatalogPort, SettlementRepository, TokenRepository,
    UserRepository,
};
use crate::domain::types::{
    Cart, NewUser, Purchase, Receipt, StoredCredential, TokenRecord, User,
};
use crate::error::StoreServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn create(&self, user: &NewUser) -> Result<User, StoreServiceError> {
        let model = users::ActiveModel {
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.credential.as_str().to_owned()),
            activated: Set(false),
            balance: Set(user.balance),
            role: Set(user.role.as_str().to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreServiceError::UserAlreadyExists,
            _ => anyhow::Error::new(e).context("insert user").into(),
        })?;
        Ok(user_from_model(model)?)
    }

    async fn activate(&self, id: UserId) -> Result<(), StoreServiceError> {
        users::Entity::update_many()
            .col_expr(users::Column::Activated, Expr::value(true))
            .filter(users::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("activate user")?;
        Ok(())
    }

    async fn reset_credential(
        &self,
        id: UserId,
        credential: &StoredCredential,
    ) -> Result<(), StoreServiceError> {
        let id = id.0;
        let hash = credential.as_str().to_owned();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    users::Entity::update_many()
                        .col_expr(users::Column::PasswordHash, Expr::value(hash))
                        .filter(users::Column::Id.eq(id))
                        .exec(txn)
                        .await?;
                    tokens::Entity::delete_many()
                        .filter(tokens::Column::UserId.eq(id))
                        .filter(tokens::Column::Scope.is_in([
                            Scope::PasswordReset.as_str(),
                            Scope::Authentication.as_str(),
                        ]))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .context("reset user credential")?;
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreServiceError> {
        let id = id.0;
        let deleted = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    tokens::Entity::delete_many()
                        .filter(tokens::Column::UserId.eq(id))
                        .exec(txn)
                        .await?;
                    cart_lines::Entity::delete_many()
                        .filter(cart_lines::Column::UserId.eq(id))
                        .exec(txn)
                        .await?;
                    let res = users::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(res.rows_affected > 0)
                })
            })
            .await
            .context("delete user")?;
        Ok(deleted)
    }
}

fn user_from_model(model: users::Model) -> anyhow::Result<User> {
    let role = model
        .role
        .parse::<Role>()
        .with_context(|| format!("decode role of user {}", model.id))?;
    Ok(User {
        id: UserId(model.id),
        name: model.name,
        email: model.email,
        credential: StoredCredential(model.password_hash),
        activated: model.activated,
        balance: model.balance,
        role,
        created_at: model.created_at,
    })
}

// ── Token repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

impl TokenRepository for DbTokenRepository {
    async fn insert(&self, record: &TokenRecord) -> Result<(), StoreServiceError> {
        let model = tokens::ActiveModel {
            digest: Set(record.digest.to_vec()),
            user_id: Set(record.user_id.0),
            scope: Set(record.scope.as_str().to_owned()),
            expiry: Set(record.expiry),
        };
        tokens::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .context("insert token")?;
        Ok(())
    }

    async fn find_live(
        &self,
        digest: &TokenDigest,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenRecord>, StoreServiceError> {
        let model = tokens::Entity::find()
            .filter(tokens::Column::Digest.eq(digest.to_vec()))
            .filter(tokens::Column::Scope.eq(scope.as_str()))
            .filter(tokens::Column::Expiry.gt(now))
            .one(&self.db)
            .await
            .context("find live token")?;
        Ok(model.map(token_from_model).transpose()?)
    }

    async fn delete_all_for_user(
        &self,
        user_id: UserId,
        scope: Scope,
    ) -> Result<u64, StoreServiceError> {
        let res = tokens::Entity::delete_many()
            .filter(tokens::Column::UserId.eq(user_id.0))
            .filter(tokens::Column::Scope.eq(scope.as_str()))
            .exec(&self.db)
            .await
            .context("delete tokens for user")?;
        Ok(res.rows_affected)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreServiceError> {
        let res = tokens::Entity::delete_many()
            .filter(tokens::Column::Expiry.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired tokens")?;
        Ok(res.rows_affected)
    }
}

fn token_from_model(model: tokens::Model) -> anyhow::Result<TokenRecord> {
    let digest = TokenDigest::from_slice(&model.digest).context("decode token digest")?;
    let scope = model.scope.parse::<Scope>().context("decode token scope")?;
    Ok(TokenRecord {
        digest,
        user_id: UserId(model.user_id),
        scope,
        expiry: model.expiry,
    })
}

// ── Access repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccessRepository {
    pub db: DatabaseConnection,
}

impl AccessRepository for DbAccessRepository {
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, StoreServiceError> {
        let role: Option<String> = users::Entity::find_by_id(user_id.0)
            .select_only()
            .column(users::Column::Role)
            .into_tuple()
            .one(&self.db)
            .await
            .context("find user role")?;
        let role = role
            .map(|r| r.parse::<Role>())
            .transpose()
            .context("decode user role")?;
        Ok(role)
    }

    async fn permissions_for_role(
        &self,
        role: Role,
    ) -> Result<Vec<Permission>, StoreServiceError> {
        let rows = roles_permissions::Entity::find()
            .filter(roles_permissions::Column::Role.eq(role.as_str()))
            .all(&self.db)
            .await
            .context("list role permissions")?;
        Ok(rows
            .into_iter()
            .map(|row| Permission::new(row.permission_code))
            .collect())
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCatalogRepository {
    pub db: DatabaseConnection,
}

impl CatalogPort for DbCatalogRepository {
    async fn price_of(&self, item_id: ItemId) -> Result<Option<i64>, StoreServiceError> {
        let price: Option<i64> = clothes::Entity::find_by_id(item_id.0)
            .select_only()
            .column(clothes::Column::Price)
            .into_tuple()
            .one(&self.db)
            .await
            .context("find item price")?;
        Ok(price)
    }
}

// ── Settlement repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSettlementRepository {
    pub db: DatabaseConnection,
}

enum SettleOutcome {
    Settled(i64),
    UserNotFound,
    InsufficientFunds,
}

impl SettlementRepository for DbSettlementRepository {
    async fn settle(
        &self,
        purchase: &Purchase,
        allow_overdraft: bool,
    ) -> Result<Receipt, StoreServiceError> {
        let purchase = *purchase;
        let outcome = self
            .db
            .transaction::<_, SettleOutcome, DbErr>(|txn| {
                Box::pin(async move { settle_in(txn, &purchase, allow_overdraft).await })
            })
            .await
            .map_err(|e| {
                StoreServiceError::Settlement(anyhow::Error::new(e).context("settle purchase"))
            })?;

        match outcome {
            SettleOutcome::Settled(balance) => Ok(Receipt {
                user_id: purchase.user_id,
                item_id: purchase.item_id,
                balance,
            }),
            SettleOutcome::UserNotFound => Err(StoreServiceError::UserNotFound),
            SettleOutcome::InsufficientFunds => Err(StoreServiceError::InsufficientFunds),
        }
    }
}

/// Debit in place, then append the cart line, on one transaction.
///
/// `balance = balance - price` is evaluated by the database under the row
/// lock, so concurrent purchases by the same user serialize without a
/// read-modify-write in the application. Rejections write nothing.
async fn settle_in(
    txn: &DatabaseTransaction,
    purchase: &Purchase,
    allow_overdraft: bool,
) -> Result<SettleOutcome, DbErr> {
    let user_id = purchase.user_id.0;

    let mut debit = users::Entity::update_many()
        .col_expr(
            users::Column::Balance,
            Expr::col(users::Column::Balance).sub(purchase.price),
        )
        .filter(users::Column::Id.eq(user_id));
    if !allow_overdraft {
        debit = debit.filter(users::Column::Balance.gte(purchase.price));
    }
    let debited = debit.exec(txn).await?;

    if debited.rows_affected == 0 {
        let exists = users::Entity::find_by_id(user_id).one(txn).await?.is_some();
        return Ok(if exists {
            SettleOutcome::InsufficientFunds
        } else {
            SettleOutcome::UserNotFound
        });
    }

    let line = cart_lines::ActiveModel {
        user_id: Set(user_id),
        item_id: Set(purchase.item_id.0),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    cart_lines::Entity::insert(line)
        .exec_without_returning(txn)
        .await?;

    let balance: Option<i64> = users::Entity::find_by_id(user_id)
        .select_only()
        .column(users::Column::Balance)
        .into_tuple()
        .one(txn)
        .await?;
    balance
        .map(SettleOutcome::Settled)
        .ok_or_else(|| DbErr::RecordNotFound(format!("user {user_id} during settlement")))
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

impl CartRepository for DbCartRepository {
    async fn cart_of(&self, user_id: UserId) -> Result<Option<Cart>, StoreServiceError> {
        // One statement, one snapshot: a concurrent settlement is either
        // fully visible or not at all.
        let rows: Vec<(String, i64, Option<i64>)> = users::Entity::find_by_id(user_id.0)
            .select_only()
            .column(users::Column::Name)
            .column(users::Column::Balance)
            .column(cart_lines::Column::ItemId)
            .left_join(cart_lines::Entity)
            .order_by_asc(cart_lines::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .context("read cart")?;

        let Some((name, balance, _)) = rows.first().cloned() else {
            return Ok(None);
        };
        let items = rows
            .into_iter()
            .filter_map(|(_, _, item)| item.map(ItemId))
            .collect();
        Ok(Some(Cart {
            name,
            balance,
            items,
        }))
    }
}
