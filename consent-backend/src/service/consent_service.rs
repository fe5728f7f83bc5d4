// src/service/consent_service.rs
use crate::db::DbPool;
use crate::domain::consent_event_model::{
    coerce_bool, ConsentAction, ConsentChoices, ConsentEvent,
};
use crate::error::{AppError, AppResult};
use crate::repository::consent_event_repository::ConsentEventRepository;
use crate::utils::allowlist::{normalize_host, DomainAllowlist};
use crate::utils::origin::RequestContext;
use crate::utils::payload_hash::compute_payload_hash;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;
use url::Url;

pub struct ConsentService {
    repository: Option<ConsentEventRepository>,
    allowlist: Arc<DomainAllowlist>,
}

impl ConsentService {
    pub fn new(db: Option<DbPool>, allowlist: Arc<DomainAllowlist>) -> Self {
        Self {
            repository: db.map(ConsentEventRepository::new),
            allowlist,
        }
    }

    /// Validate, normalize, hash and persist one raw submission.
    pub async fn submit(&self, raw: &Value, ctx: &RequestContext) -> AppResult<()> {
        let event = self.normalize(raw, ctx)?;
        let payload_hash = compute_payload_hash(&event);

        let Some(repository) = &self.repository else {
            return Err(AppError::Configuration);
        };
        repository.store(&event, &payload_hash).await?;

        // 同意内容そのものはログに出さない
        info!(
            domain = %event.domain,
            action = %event.action.as_str(),
            "Consent event stored"
        );
        Ok(())
    }

    /// Total function from an untrusted JSON value to a validated event.
    /// Nothing unvalidated gets past this boundary.
    pub fn normalize(&self, raw: &Value, ctx: &RequestContext) -> AppResult<ConsentEvent> {
        let body = raw.as_object().ok_or_else(|| {
            AppError::InvalidPayload("Request body must be a JSON object".to_string())
        })?;

        let consent = body
            .get("consent")
            .filter(|value| value.is_object())
            .map(ConsentChoices::from_value)
            .ok_or_else(|| {
                AppError::InvalidPayload("Payload must carry a consent object".to_string())
            })?;

        let domain = self.resolve_domain(body, ctx)?;

        // クライアントの ts は有限の数値のときだけ信用する
        let ts = body
            .get("ts")
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
            .map(|value| value as i64)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Ok(ConsentEvent {
            ts,
            action: ConsentAction::from_value(body.get("action")),
            consent,
            version: opt_string(body.get("version")),
            region: opt_string(body.get("region")),
            language: opt_string(body.get("language")),
            consent_uid: opt_string(body.get("consent_uid")),
            gpc: coerce_bool(body.get("gpc")),
            source: opt_string(body.get("source")),
            domain,
        })
    }

    /// Resolve the subject domain of the event.
    ///
    /// A client that claims an unauthorized domain is never silently
    /// corrected from headers: the whole request is rejected. This is kept
    /// separate from CORS origin resolution on purpose (who may call vs.
    /// what domain the event is about).
    fn resolve_domain(&self, body: &Map<String, Value>, ctx: &RequestContext) -> AppResult<String> {
        match body.get("domain") {
            Some(Value::String(claimed)) if !claimed.is_empty() => {
                return if self.allowlist.is_host_allowed(claimed) {
                    Ok(normalize_host(claimed))
                } else {
                    Err(AppError::DomainNotAllowed(claimed.clone()))
                };
            }
            // 文字列以外の domain 指定は許可リストに一致しようがない
            Some(value) if !value.is_null() => {
                return Err(AppError::DomainNotAllowed(value.to_string()));
            }
            _ => {}
        }

        for header_url in [&ctx.origin, &ctx.referer].into_iter().flatten() {
            if let Ok(url) = Url::parse(header_url) {
                if let Some(host) = url.host_str() {
                    if self.allowlist.is_host_allowed(host) {
                        return Ok(normalize_host(host));
                    }
                }
            }
        }

        // API がサイトと同一オリジンで動いている場合は Host で解決できる
        if let Some(host) = &ctx.host {
            if self.allowlist.is_host_allowed(host) {
                return Ok(normalize_host(host));
            }
        }

        Err(AppError::DomainUnresolvable)
    }
}

fn opt_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(|text| text.to_string())
}
