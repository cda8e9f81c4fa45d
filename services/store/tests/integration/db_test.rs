use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

use atelier_auth_types::token::TokenDigest;
use atelier_domain::access::{Permission, Scope};
use atelier_domain::id::{ItemId, UserId};
use atelier_domain::user::Role;
use atelier_store::domain::repository::{
    AccessRepository, CartRepository, CatalogPort, SettlementRepository, TokenRepository,
    UserRepository,
};
use atelier_store::domain::types::{NewUser, Purchase, StoredCredential, TokenRecord};
use atelier_store::error::StoreServiceError;
use atelier_store::infra::db::{
    DbAccessRepository, DbCartRepository, DbCatalogRepository, DbSettlementRepository,
    DbTokenRepository, DbUserRepository,
};
use atelier_store_schema::{cart_lines, clothes, tokens, users};
use atelier_testing::db::{SeedUser, SharedDb, memory_db, seed_item, seed_user};

use crate::helpers::production_grants;

fn settlements(db: &DatabaseConnection) -> DbSettlementRepository {
    DbSettlementRepository { db: db.clone() }
}

async fn cart_items(db: &DatabaseConnection, id: i64) -> Vec<ItemId> {
    DbCartRepository { db: db.clone() }
        .cart_of(UserId(id))
        .await
        .unwrap()
        .map(|cart| cart.items)
        .unwrap_or_default()
}

fn token_repo(db: &DatabaseConnection) -> DbTokenRepository {
    DbTokenRepository { db: db.clone() }
}

async fn balance_of(db: &DatabaseConnection, id: i64) -> i64 {
    DbUserRepository { db: db.clone() }
        .find_by_id(UserId(id))
        .await
        .unwrap()
        .unwrap()
        .balance
}

fn record(seed: &str, user_id: i64, scope: Scope, expiry: chrono::DateTime<Utc>) -> TokenRecord {
    TokenRecord {
        digest: TokenDigest::of(seed),
        user_id: UserId(user_id),
        scope,
        expiry,
    }
}

// ── Settlement ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_settle_purchase_in_one_transaction() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 500, ..Default::default() }).await;
    let item = seed_item(&db, "coat", 120).await;

    let receipt = settlements(&db)
        .settle(
            &Purchase {
                user_id: UserId(user),
                item_id: ItemId(item),
                price: 120,
            },
            false,
        )
        .await
        .unwrap();

    assert_eq!(receipt.balance, 380);
    assert_eq!(balance_of(&db, user).await, 380);
    assert_eq!(cart_items(&db, user).await, vec![ItemId(item)]);
}

#[tokio::test]
async fn should_apply_concurrent_settlements_for_same_user() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 500, ..Default::default() }).await;
    let item = seed_item(&db, "coat", 120).await;
    let purchase = Purchase {
        user_id: UserId(user),
        item_id: ItemId(item),
        price: 120,
    };
    let repo = settlements(&db);

    let (a, b) = tokio::join!(repo.settle(&purchase, false), repo.settle(&purchase, false));
    a.unwrap();
    b.unwrap();

    assert_eq!(balance_of(&db, user).await, 260);
    assert_eq!(cart_items(&db, user).await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_apply_every_parallel_settlement_across_connections() {
    const N: i64 = 12;
    let shared = SharedDb::open(6).await;
    let user = seed_user(&shared.db, SeedUser { balance: 10_000, ..Default::default() }).await;
    let item = seed_item(&shared.db, "coat", 120).await;
    let purchase = Purchase {
        user_id: UserId(user),
        item_id: ItemId(item),
        price: 120,
    };

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let repo = settlements(&shared.db);
            tokio::spawn(async move { repo.settle(&purchase, false).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(balance_of(&shared.db, user).await, 10_000 - N * 120);
    assert_eq!(cart_items(&shared.db, user).await.len(), N as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_stop_parallel_settlements_at_zero_balance() {
    let shared = SharedDb::open(6).await;
    let user = seed_user(&shared.db, SeedUser { balance: 500, ..Default::default() }).await;
    let item = seed_item(&shared.db, "coat", 120).await;
    let purchase = Purchase {
        user_id: UserId(user),
        item_id: ItemId(item),
        price: 120,
    };

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = settlements(&shared.db);
            tokio::spawn(async move { repo.settle(&purchase, false).await })
        })
        .collect();
    let mut settled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => settled += 1,
            Err(StoreServiceError::InsufficientFunds) => {}
            Err(e) => panic!("unexpected settlement error: {e:?}"),
        }
    }

    assert_eq!(settled, 4);
    assert_eq!(balance_of(&shared.db, user).await, 20);
    assert_eq!(cart_items(&shared.db, user).await.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_show_cart_consistent_with_balance_during_purchases() {
    let shared = SharedDb::open(6).await;
    let user = seed_user(&shared.db, SeedUser { balance: 10_000, ..Default::default() }).await;
    let item = seed_item(&shared.db, "coat", 120).await;
    let purchase = Purchase {
        user_id: UserId(user),
        item_id: ItemId(item),
        price: 120,
    };

    let writers: Vec<_> = (0..8)
        .map(|_| {
            let repo = settlements(&shared.db);
            tokio::spawn(async move { repo.settle(&purchase, false).await })
        })
        .collect();
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let carts = DbCartRepository {
                db: shared.db.clone(),
            };
            tokio::spawn(async move { carts.cart_of(UserId(user)).await })
        })
        .collect();

    for reader in readers {
        let cart = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(cart.balance + 120 * cart.items.len() as i64, 10_000);
    }
    for writer in writers {
        writer.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn should_write_nothing_when_funds_are_insufficient() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 100, ..Default::default() }).await;
    let item = seed_item(&db, "coat", 120).await;

    let result = settlements(&db)
        .settle(
            &Purchase {
                user_id: UserId(user),
                item_id: ItemId(item),
                price: 120,
            },
            false,
        )
        .await;

    assert!(matches!(result, Err(StoreServiceError::InsufficientFunds)));
    assert_eq!(balance_of(&db, user).await, 100);
    assert!(cart_items(&db, user).await.is_empty());
}

#[tokio::test]
async fn should_go_negative_when_overdraft_allowed() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 100, ..Default::default() }).await;
    let item = seed_item(&db, "coat", 120).await;

    let receipt = settlements(&db)
        .settle(
            &Purchase {
                user_id: UserId(user),
                item_id: ItemId(item),
                price: 120,
            },
            true,
        )
        .await
        .unwrap();

    assert_eq!(receipt.balance, -20);
}

#[tokio::test]
async fn should_report_missing_user_on_settlement() {
    let db = memory_db().await;
    let item = seed_item(&db, "coat", 120).await;

    let result = settlements(&db)
        .settle(
            &Purchase {
                user_id: UserId(404),
                item_id: ItemId(item),
                price: 120,
            },
            false,
        )
        .await;

    assert!(matches!(result, Err(StoreServiceError::UserNotFound)));
}

// ── Tokens ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_find_only_live_tokens_of_matching_scope() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser::default()).await;
    let repo = token_repo(&db);
    let now = Utc::now();
    repo.insert(&record("live", user, Scope::Authentication, now + Duration::hours(1)))
        .await
        .unwrap();
    repo.insert(&record("stale", user, Scope::Authentication, now - Duration::hours(1)))
        .await
        .unwrap();

    let found = repo
        .find_live(&TokenDigest::of("live"), Scope::Authentication, now)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user_id, UserId(user));
    assert_eq!(found.digest, TokenDigest::of("live"));

    let wrong_scope = repo
        .find_live(&TokenDigest::of("live"), Scope::Activation, now)
        .await
        .unwrap();
    assert!(wrong_scope.is_none());

    let expired = repo
        .find_live(&TokenDigest::of("stale"), Scope::Authentication, now)
        .await
        .unwrap();
    assert!(expired.is_none());
}

#[tokio::test]
async fn should_sweep_expired_tokens_only() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser::default()).await;
    let repo = token_repo(&db);
    let now = Utc::now();
    repo.insert(&record("a", user, Scope::Authentication, now - Duration::hours(2)))
        .await
        .unwrap();
    repo.insert(&record("b", user, Scope::Activation, now - Duration::minutes(1)))
        .await
        .unwrap();
    repo.insert(&record("c", user, Scope::Authentication, now + Duration::hours(2)))
        .await
        .unwrap();

    assert_eq!(repo.delete_expired(now).await.unwrap(), 2);
    assert!(
        repo.find_live(&TokenDigest::of("c"), Scope::Authentication, now)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn should_delete_tokens_by_user_and_scope() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser::default()).await;
    let repo = token_repo(&db);
    let expiry = Utc::now() + Duration::hours(1);
    repo.insert(&record("a", user, Scope::Authentication, expiry))
        .await
        .unwrap();
    repo.insert(&record("b", user, Scope::Authentication, expiry))
        .await
        .unwrap();
    repo.insert(&record("c", user, Scope::PasswordReset, expiry))
        .await
        .unwrap();

    let removed = repo
        .delete_all_for_user(UserId(user), Scope::Authentication)
        .await
        .unwrap();

    assert_eq!(removed, 2);
    assert!(
        repo.find_live(&TokenDigest::of("c"), Scope::PasswordReset, Utc::now())
            .await
            .unwrap()
            .is_some()
    );
}

// ── Access ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_read_role_and_seeded_grants() {
    let db = memory_db().await;
    let admin = seed_user(
        &db,
        SeedUser {
            email: "admin@example.com",
            role: Role::Admin,
            ..Default::default()
        },
    )
    .await;
    let repo = DbAccessRepository { db: db.clone() };

    assert_eq!(repo.role_of(UserId(admin)).await.unwrap(), Some(Role::Admin));
    assert_eq!(repo.role_of(UserId(999)).await.unwrap(), None);

    let admin_grants = repo.permissions_for_role(Role::Admin).await.unwrap();
    assert_eq!(admin_grants.len(), 5);
    assert!(admin_grants.contains(&Permission::new(Permission::CARTS_READ)));

    let user_grants = repo.permissions_for_role(Role::User).await.unwrap();
    assert_eq!(user_grants.len(), 2);
    assert!(!user_grants.contains(&Permission::new(Permission::CARTS_READ)));
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_map_duplicate_email_to_user_already_exists() {
    let db = memory_db().await;
    let repo = DbUserRepository { db: db.clone() };
    let new_user = NewUser {
        name: "Alice".to_owned(),
        email: "alice@example.com".to_owned(),
        credential: StoredCredential("hash".to_owned()),
        balance: 100_000,
        role: Role::User,
    };

    let created = repo.create(&new_user).await.unwrap();
    assert!(!created.activated);
    assert_eq!(created.balance, 100_000);

    let duplicate = repo.create(&new_user).await;
    assert!(matches!(duplicate, Err(StoreServiceError::UserAlreadyExists)));
}

#[tokio::test]
async fn should_activate_user() {
    let db = memory_db().await;
    let id = seed_user(&db, SeedUser { activated: false, ..Default::default() }).await;
    let repo = DbUserRepository { db: db.clone() };

    repo.activate(UserId(id)).await.unwrap();

    let user = repo.find_by_email("tester@example.com").await.unwrap().unwrap();
    assert!(user.activated);
}

#[tokio::test]
async fn should_reset_credential_and_revoke_sessions_together() {
    let db = memory_db().await;
    let id = seed_user(&db, SeedUser::default()).await;
    let tokens = token_repo(&db);
    let now = Utc::now();
    let expiry = now + Duration::hours(1);
    tokens
        .insert(&record("session", id, Scope::Authentication, expiry))
        .await
        .unwrap();
    tokens
        .insert(&record("reset", id, Scope::PasswordReset, expiry))
        .await
        .unwrap();
    tokens
        .insert(&record("activate", id, Scope::Activation, expiry))
        .await
        .unwrap();
    let repo = DbUserRepository { db: db.clone() };

    repo.reset_credential(UserId(id), &StoredCredential("rotated".to_owned()))
        .await
        .unwrap();

    let user = repo.find_by_id(UserId(id)).await.unwrap().unwrap();
    assert_eq!(user.credential.as_str(), "rotated");
    for (seed, scope) in [
        ("session", Scope::Authentication),
        ("reset", Scope::PasswordReset),
    ] {
        assert!(
            tokens
                .find_live(&TokenDigest::of(seed), scope, now)
                .await
                .unwrap()
                .is_none()
        );
    }
    assert!(
        tokens
            .find_live(&TokenDigest::of("activate"), Scope::Activation, now)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn should_delete_user_with_tokens_and_cart_lines() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 500, ..Default::default() }).await;
    let item = seed_item(&db, "coat", 120).await;
    let now = Utc::now();
    token_repo(&db)
        .insert(&record("t", user, Scope::Authentication, now + Duration::hours(1)))
        .await
        .unwrap();
    settlements(&db)
        .settle(
            &Purchase {
                user_id: UserId(user),
                item_id: ItemId(item),
                price: 120,
            },
            false,
        )
        .await
        .unwrap();
    let repo = DbUserRepository { db: db.clone() };

    assert!(repo.delete(UserId(user)).await.unwrap());
    assert!(!repo.delete(UserId(user)).await.unwrap());
    assert!(repo.find_by_id(UserId(user)).await.unwrap().is_none());
    assert!(cart_items(&db, user).await.is_empty());
    assert!(
        token_repo(&db)
            .find_live(&TokenDigest::of("t"), Scope::Authentication, now)
            .await
            .unwrap()
            .is_none()
    );
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_read_item_price() {
    let db = memory_db().await;
    let item = seed_item(&db, "scarf", 35).await;
    let catalog = DbCatalogRepository { db: db.clone() };

    assert_eq!(catalog.price_of(ItemId(item)).await.unwrap(), Some(35));
    assert_eq!(catalog.price_of(ItemId(item + 1)).await.unwrap(), None);
}

#[tokio::test]
async fn should_reject_negative_price_at_schema_level() {
    let db = memory_db().await;

    let result = clothes::ActiveModel {
        name: Set("refund".to_owned()),
        brand: Set("atelier".to_owned()),
        price: Set(-1),
        ..Default::default()
    }
    .insert(&db)
    .await;

    assert!(result.is_err());
}

// ── Cart ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_read_cart_with_items_in_purchase_order() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 500, ..Default::default() }).await;
    let coat = seed_item(&db, "coat", 120).await;
    let scarf = seed_item(&db, "scarf", 35).await;
    for (item, price) in [(scarf, 35), (coat, 120), (scarf, 35)] {
        settlements(&db)
            .settle(
                &Purchase {
                    user_id: UserId(user),
                    item_id: ItemId(item),
                    price,
                },
                false,
            )
            .await
            .unwrap();
    }
    let carts = DbCartRepository { db: db.clone() };

    let cart = carts.cart_of(UserId(user)).await.unwrap().unwrap();
    assert_eq!(cart.name, "tester");
    assert_eq!(cart.balance, 500 - 190);
    assert_eq!(cart.items, vec![ItemId(scarf), ItemId(coat), ItemId(scarf)]);

    assert!(carts.cart_of(UserId(user + 1)).await.unwrap().is_none());
}

#[tokio::test]
async fn should_read_empty_cart_for_user_without_purchases() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 70, ..Default::default() }).await;

    let cart = DbCartRepository { db: db.clone() }
        .cart_of(UserId(user))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(cart.balance, 70);
    assert!(cart.items.is_empty());
}

// ── Migrations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_seed_the_same_grants_the_mocks_use() {
    let db = memory_db().await;
    let repo = DbAccessRepository { db: db.clone() };

    for role in [Role::Admin, Role::User] {
        let mut seeded: Vec<String> = repo
            .permissions_for_role(role)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.as_str().to_owned())
            .collect();
        let mut expected: Vec<String> = production_grants()
            .into_iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, p)| p.as_str().to_owned())
            .collect();
        seeded.sort();
        expected.sort();
        assert_eq!(seeded, expected, "grants of {role:?}");
    }
}

#[tokio::test]
async fn should_cascade_user_removal_to_tokens_and_cart_lines() {
    let db = memory_db().await;
    let user = seed_user(&db, SeedUser { balance: 500, ..Default::default() }).await;
    let item = seed_item(&db, "coat", 120).await;
    let now = Utc::now();
    token_repo(&db)
        .insert(&record("t", user, Scope::Authentication, now + Duration::hours(1)))
        .await
        .unwrap();
    settlements(&db)
        .settle(
            &Purchase {
                user_id: UserId(user),
                item_id: ItemId(item),
                price: 120,
            },
            false,
        )
        .await
        .unwrap();

    users::Entity::delete_by_id(user).exec(&db).await.unwrap();

    assert_eq!(tokens::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(cart_lines::Entity::find().count(&db).await.unwrap(), 0);
}
