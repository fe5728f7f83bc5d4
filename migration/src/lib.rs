// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// マイグレーションモジュール
mod m20250815_000001_create_consent_events_table;
mod m20250822_000001_add_payload_hash_to_consent_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250815_000001_create_consent_events_table::Migration),
            // 重複抑止カラムは後付け（古いスキーマでも動作する）
            Box::new(m20250822_000001_add_payload_hash_to_consent_events::Migration),
        ]
    }
}
