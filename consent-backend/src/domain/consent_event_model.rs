// consent-backend/src/domain/consent_event_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Consent action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsentAction {
    AcceptAll,
    RejectAll,
    SaveSelection,
    Unknown,
}

// Conversion implementations for ConsentAction
impl From<ConsentAction> for String {
    fn from(action: ConsentAction) -> Self {
        action.as_str().to_string()
    }
}

impl ConsentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentAction::AcceptAll => "accept_all",
            ConsentAction::RejectAll => "reject_all",
            ConsentAction::SaveSelection => "save_selection",
            ConsentAction::Unknown => "unknown",
        }
    }

    /// Coerce an untrusted JSON value into the closed enumeration. Anything
    /// that is not one of the known action strings becomes `Unknown`.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("accept_all") => ConsentAction::AcceptAll,
            Some("reject_all") => ConsentAction::RejectAll,
            Some("save_selection") => ConsentAction::SaveSelection,
            _ => ConsentAction::Unknown,
        }
    }
}

/// The four independent consent flags. No combination is invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentChoices {
    pub essential: bool,
    pub analytics: bool,
    pub functional: bool,
    pub marketing: bool,
}

impl ConsentChoices {
    /// 同意オブジェクトの各フラグを個別に bool へ変換する
    pub fn from_value(value: &Value) -> Self {
        Self {
            essential: coerce_bool(value.get("essential")),
            analytics: coerce_bool(value.get("analytics")),
            functional: coerce_bool(value.get("functional")),
            marketing: coerce_bool(value.get("marketing")),
        }
    }
}

/// Boolean coercion for untrusted client values: JSON booleans, the literal
/// strings `"true"`/`"false"`, and the numbers `1`/`0` are recognized;
/// anything else is `false`.
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text == "true",
        Some(Value::Number(number)) => number.as_f64() == Some(1.0),
        _ => false,
    }
}

/// A fully validated consent event. Only ever constructed by the
/// normalization pipeline; no partially-valid state leaks out of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentEvent {
    /// Epoch milliseconds as claimed by the client (or server time when the
    /// claim was not a finite number).
    pub ts: i64,
    pub action: ConsentAction,
    pub consent: ConsentChoices,
    pub version: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub consent_uid: Option<String>,
    pub gpc: bool,
    pub source: Option<String>,
    /// Always present in, or a subdomain of, the configured allowlist.
    pub domain: String,
}

impl ConsentEvent {
    pub fn event_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.ts).unwrap_or_else(Utc::now)
    }
}

/// Consent event row model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub domain: String,
    pub action: String,
    pub consent: Json,
    pub version: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub consent_uid: Option<String>,
    pub gpc: bool,
    pub source: Option<String>,
    pub payload_hash: Option<String>,
    pub event_ts: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
