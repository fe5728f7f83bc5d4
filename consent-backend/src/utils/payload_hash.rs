// src/utils/payload_hash.rs

use crate::domain::consent_event_model::ConsentEvent;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Width of the dedup window. Near-simultaneous duplicate submissions
/// (client-side retry logic firing twice) land in the same bucket and
/// therefore produce the same hash.
const BUCKET_MS: i64 = 10_000;

/// Compute the deduplication fingerprint of a normalized event.
///
/// SHA-256 over a canonical JSON serialization of the identifying fields
/// plus the time-bucketed timestamp. serde_json keeps object keys in a
/// BTreeMap, so the serialization has a stable key order and the digest is
/// deterministic.
pub fn compute_payload_hash(event: &ConsentEvent) -> String {
    let bucket = (event.ts / BUCKET_MS) * BUCKET_MS;

    let canonical = json!({
        "action": event.action.as_str(),
        "bucket": bucket,
        "consent": {
            "analytics": event.consent.analytics,
            "essential": event.consent.essential,
            "functional": event.consent.functional,
            "marketing": event.consent.marketing,
        },
        "consent_uid": event.consent_uid,
        "domain": event.domain,
        "version": event.version,
    });

    let digest = Sha256::digest(canonical.to_string().as_bytes());
    hex::encode(digest)
}
