use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_tokens;
mod m20261001_000003_create_roles_permissions;
mod m20261001_000004_create_clothes;
mod m20261001_000005_create_cart_lines;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_tokens::Migration),
            Box::new(m20261001_000003_create_roles_permissions::Migration),
            Box::new(m20261001_000004_create_clothes::Migration),
            Box::new(m20261001_000005_create_cart_lines::Migration),
        ]
    }
}
