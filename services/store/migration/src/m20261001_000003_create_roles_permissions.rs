use atelier_domain::access::Permission;
use atelier_domain::user::Role;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const GRANTS: &[(Role, &str)] = &[
    (Role::Admin, Permission::BRANDS_READ),
    (Role::Admin, Permission::BRANDS_WRITE),
    (Role::Admin, Permission::CLOTHES_READ),
    (Role::Admin, Permission::CLOTHES_WRITE),
    (Role::Admin, Permission::CARTS_READ),
    (Role::User, Permission::BRANDS_READ),
    (Role::User, Permission::CLOTHES_READ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RolesPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RolesPermissions::Role)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RolesPermissions::PermissionCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(RolesPermissions::Role)
                            .col(RolesPermissions::PermissionCode),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(RolesPermissions::Table)
            .columns([RolesPermissions::Role, RolesPermissions::PermissionCode]);
        for (role, code) in GRANTS {
            seed.values_panic([role.as_str().into(), (*code).into()]);
        }
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RolesPermissions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RolesPermissions {
    Table,
    Role,
    PermissionCode,
}
