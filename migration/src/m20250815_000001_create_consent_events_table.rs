use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConsentEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConsentEvents::Domain)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentEvents::Action)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentEvents::Consent).json().not_null())
                    .col(ColumnDef::new(ConsentEvents::Version).string_len(50))
                    .col(ColumnDef::new(ConsentEvents::Region).string_len(50))
                    .col(ColumnDef::new(ConsentEvents::Language).string_len(35))
                    .col(ColumnDef::new(ConsentEvents::ConsentUid).string_len(255))
                    .col(
                        ColumnDef::new(ConsentEvents::Gpc)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ConsentEvents::Source).string_len(100))
                    .col(
                        ColumnDef::new(ConsentEvents::EventTs)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_consent_events_domain")
                    .table(ConsentEvents::Table)
                    .col(ConsentEvents::Domain)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_consent_events_event_ts")
                    .table(ConsentEvents::Table)
                    .col(ConsentEvents::EventTs)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConsentEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ConsentEvents {
    Table,
    Id,
    Domain,
    Action,
    Consent,
    Version,
    Region,
    Language,
    ConsentUid,
    Gpc,
    Source,
    EventTs,
    CreatedAt,
}
