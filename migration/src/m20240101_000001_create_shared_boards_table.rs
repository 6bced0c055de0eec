use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SharedBoards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SharedBoards::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SharedBoards::Payload).text().not_null())
                    .col(
                        ColumnDef::new(SharedBoards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on recency for stale-record sweeps
        manager
            .create_index(
                Index::create()
                    .name("idx_shared_boards_updated_at")
                    .table(SharedBoards::Table)
                    .col(SharedBoards::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SharedBoards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SharedBoards {
    Table,
    Key,
    Payload,
    UpdatedAt,
}
