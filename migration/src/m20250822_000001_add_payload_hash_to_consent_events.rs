use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ConsentEvents::Table)
                    .add_column(ColumnDef::new(ConsentEvents::PayloadHash).string_len(64))
                    .to_owned(),
            )
            .await?;

        // 同一ハッシュの行は挿入時に黙って無視される
        manager
            .create_index(
                Index::create()
                    .name("idx_consent_events_payload_hash_unique")
                    .table(ConsentEvents::Table)
                    .col(ConsentEvents::PayloadHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_consent_events_payload_hash_unique")
                    .table(ConsentEvents::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(ConsentEvents::Table)
                    .drop_column(ConsentEvents::PayloadHash)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum ConsentEvents {
    Table,
    PayloadHash,
}
