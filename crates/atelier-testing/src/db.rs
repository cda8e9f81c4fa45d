//! SQLite stores for repository and router tests.
//!
//! Both fixtures are built by running the production migrations, so tables,
//! cascades, checks and the seeded role grants are the ones PostgreSQL gets.

use std::path::PathBuf;

use atelier_domain::user::Role;
use atelier_store_migration::Migrator;
use atelier_store_schema::{clothes, users};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Set,
};
use sea_orm_migration::MigratorTrait;

/// Open a fresh in-memory database with the store schema.
///
/// The pool holds exactly one connection so every query sees the same
/// in-memory database; concurrent transactions queue on it.
pub async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// A file-backed database in WAL mode served by several pooled connections.
///
/// Transactions on different connections really overlap, so concurrent
/// writers contend on the database the way independent service instances
/// do. The files are removed on drop.
pub struct SharedDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl SharedDb {
    pub async fn open(connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("atelier-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let mut setup = ConnectOptions::new(url.clone());
        setup.max_connections(1).sqlx_logging(false);
        let setup = Database::connect(setup).await.unwrap();
        setup
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await
            .unwrap();
        Migrator::up(&setup, None).await.unwrap();
        setup.close().await.unwrap();

        let mut opts = ConnectOptions::new(url);
        opts.max_connections(connections)
            .min_connections(connections)
            .sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Self { db, path }
    }
}

impl Drop for SharedDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// A user row to seed.
pub struct SeedUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub activated: bool,
    pub balance: i64,
    pub role: Role,
}

impl Default for SeedUser<'_> {
    fn default() -> Self {
        Self {
            name: "tester",
            email: "tester@example.com",
            password_hash: "not-a-real-hash",
            activated: true,
            balance: 0,
            role: Role::User,
        }
    }
}

/// Insert a user row directly and return its id.
pub async fn seed_user(db: &DatabaseConnection, user: SeedUser<'_>) -> i64 {
    let model = users::ActiveModel {
        name: Set(user.name.to_owned()),
        email: Set(user.email.to_owned()),
        password_hash: Set(user.password_hash.to_owned()),
        activated: Set(user.activated),
        balance: Set(user.balance),
        role: Set(user.role.as_str().to_owned()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    model.id
}

/// Insert a catalog item and return its id.
pub async fn seed_item(db: &DatabaseConnection, name: &str, price: i64) -> i64 {
    let model = clothes::ActiveModel {
        name: Set(name.to_owned()),
        brand: Set("atelier".to_owned()),
        price: Set(price),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    model.id
}
