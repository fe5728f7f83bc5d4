// consent-backend/src/api/mod.rs
use crate::db::DbPool;
use crate::service::consent_service::ConsentService;
use crate::utils::allowlist::DomainAllowlist;
use std::sync::Arc;

pub mod handlers;

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub consent_service: Arc<ConsentService>,
    pub allowlist: Arc<DomainAllowlist>,
}

impl AppState {
    /// `db` is `None` when the backend secrets are absent; submissions then
    /// answer with a generic 500 instead of the process refusing to start.
    pub fn new(db: Option<DbPool>, allowlist: DomainAllowlist) -> Self {
        let allowlist = Arc::new(allowlist);
        Self {
            consent_service: Arc::new(ConsentService::new(db, allowlist.clone())),
            allowlist,
        }
    }
}
