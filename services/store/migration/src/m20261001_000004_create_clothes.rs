use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clothes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clothes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clothes::Name).string().not_null())
                    .col(ColumnDef::new(Clothes::Brand).string().not_null())
                    .col(ColumnDef::new(Clothes::Price).big_integer().not_null())
                    .check(Expr::col(Clothes::Price).gte(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clothes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Clothes {
    Table,
    Id,
    Name,
    Brand,
    Price,
}
