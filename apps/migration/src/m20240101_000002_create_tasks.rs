use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(tasks_table()).await?;

        // Every task query filters by owner
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_owner")
                    .table(Tasks::Table)
                    .col(Tasks::Owner)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

/// Title and description are stored escaped, which can make them longer
/// than the input limits, so both are unbounded `text`.
fn tasks_table() -> TableCreateStatement {
    Table::create()
        .table(Tasks::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Tasks::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Tasks::Owner).string_len(64).not_null())
        .col(ColumnDef::new(Tasks::Title).text().not_null())
        .col(ColumnDef::new(Tasks::Description).text().null())
        .col(
            ColumnDef::new(Tasks::Completed)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Tasks::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Tasks::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Owner,
    Title,
    Description,
    Completed,
    CreatedAt,
    UpdatedAt,
}
