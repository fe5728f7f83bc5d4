// src/repository/consent_event_repository.rs
use crate::db::DbPool;
use crate::domain::consent_event_model::{
    self, ActiveModel as ConsentEventActiveModel, ConsentEvent, Entity as ConsentEventEntity,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::NotSet, ActiveValue::Set, DbErr, EntityTrait};
use serde_json::json;
use uuid::Uuid;

#[derive(Clone)]
pub struct ConsentEventRepository {
    db: DbPool,
}

impl ConsentEventRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Insert a normalized event together with its dedup hash.
    ///
    /// The unique index on `payload_hash` silently drops near-duplicate
    /// submissions; a suppressed duplicate still counts as success. If the
    /// target schema predates the `payload_hash` column, the insert is
    /// retried once without it so a schema migration does not need a
    /// coordinated deploy. Any other failure is surfaced as-is.
    pub async fn store(&self, event: &ConsentEvent, payload_hash: &str) -> Result<(), DbErr> {
        let insert = ConsentEventEntity::insert(self.active_model(event, Some(payload_hash)))
            .on_conflict(
                OnConflict::column(consent_event_model::Column::PayloadHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match insert {
            Ok(_) => Ok(()),
            // 重複行はユニーク制約側で黙って無視される
            Err(DbErr::RecordNotInserted) => Ok(()),
            Err(err) if is_missing_hash_column(&err) => {
                tracing::warn!(
                    "payload_hash column missing in consent_events; storing without dedup hash"
                );
                ConsentEventEntity::insert(self.active_model(event, None))
                    .exec(&self.db)
                    .await?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn active_model(
        &self,
        event: &ConsentEvent,
        payload_hash: Option<&str>,
    ) -> ConsentEventActiveModel {
        ConsentEventActiveModel {
            id: Set(Uuid::new_v4()),
            domain: Set(event.domain.clone()),
            action: Set(event.action.as_str().to_string()),
            consent: Set(json!({
                "essential": event.consent.essential,
                "analytics": event.consent.analytics,
                "functional": event.consent.functional,
                "marketing": event.consent.marketing,
            })),
            version: Set(event.version.clone()),
            region: Set(event.region.clone()),
            language: Set(event.language.clone()),
            consent_uid: Set(event.consent_uid.clone()),
            gpc: Set(event.gpc),
            source: Set(event.source.clone()),
            // NotSet のカラムは INSERT 文に含まれない
            payload_hash: match payload_hash {
                Some(hash) => Set(Some(hash.to_string())),
                None => NotSet,
            },
            event_ts: Set(event.event_time()),
            created_at: Set(Utc::now()),
        }
    }
}

/// Detect the one storage error the adapter is allowed to recover from: the
/// dedup column not existing in the target schema. sea-orm does not expose a
/// structured column-not-found variant, so this matches the Postgres error
/// text (undefined_column, SQLSTATE 42703).
fn is_missing_hash_column(err: &DbErr) -> bool {
    let text = err.to_string();
    text.contains("payload_hash") && (text.contains("does not exist") || text.contains("42703"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn test_detects_missing_column_error() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "column \"payload_hash\" of relation \"consent_events\" does not exist".to_string(),
        ));
        assert!(is_missing_hash_column(&err));

        let err = DbErr::Query(RuntimeErr::Internal(
            "error returned from database: 42703: column \"payload_hash\" not found".to_string(),
        ));
        assert!(is_missing_hash_column(&err));
    }

    #[test]
    fn test_other_errors_are_not_recoverable() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "relation \"consent_events\" does not exist".to_string(),
        ));
        assert!(!is_missing_hash_column(&err));

        let err = DbErr::Conn(RuntimeErr::Internal("connection refused".to_string()));
        assert!(!is_missing_hash_column(&err));
    }
}
