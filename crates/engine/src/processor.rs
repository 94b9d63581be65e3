//! Payment processor boundary.
//!
//! The engine never talks to a processor's wire API directly. It asks a
//! [`PaymentProcessor`] for an intent when a member starts a contribution,
//! and later consumes settlement outcomes delivered out of band (usually a
//! signed webhook handled by the server crate).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Signature age accepted on webhook deliveries, in seconds either way.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Intent freshly created on the processor side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIntent {
    pub intent_id: String,
    pub client_secret: String,
}

/// Correlation data attached to an intent so settlement events can be
/// traced back to a pool and payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub pool_id: Uuid,
    pub user_id: String,
}

/// Terminal result reported by the processor for an intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentOutcome {
    Succeeded,
    Failed,
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Creates a payment intent for `amount` in the given ISO currency.
    async fn create_intent(
        &self,
        amount: MoneyCents,
        currency: &str,
        metadata: IntentMetadata,
    ) -> ResultEngine<CreatedIntent>;
}

/// Checks a `Processor-Signature` header against the raw request body.
///
/// The header carries a unix timestamp and a hex digest:
/// `t=<unix>,v1=<hex sha256("{secret}.{t}.{body}")>`. Deliveries older or
/// newer than the tolerance window are rejected even when the digest
/// matches, which caps how long a captured delivery can be replayed.
pub fn verify_signature(
    secret: &str,
    header: &str,
    body: &str,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let mut timestamp = None;
    let mut digest = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => digest = Some(value),
            _ => {}
        }
    }

    let (Some(timestamp), Some(digest)) = (timestamp, digest) else {
        return Err(EngineError::Unauthorized(
            "malformed webhook signature".to_string(),
        ));
    };
    let Ok(issued_at) = timestamp.parse::<i64>() else {
        return Err(EngineError::Unauthorized(
            "malformed webhook signature".to_string(),
        ));
    };

    if (now.timestamp() - issued_at).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(EngineError::Unauthorized(
            "webhook signature outside tolerance".to_string(),
        ));
    }

    let expected = sign(secret, timestamp, body);
    if digest != expected {
        return Err(EngineError::Unauthorized(
            "webhook signature mismatch".to_string(),
        ));
    }

    Ok(())
}

fn sign(secret: &str, timestamp: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(timestamp.as_bytes());
    hasher.update(b".");
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_for(secret: &str, body: &str, at: DateTime<Utc>) -> String {
        let timestamp = at.timestamp().to_string();
        format!("t={timestamp},v1={}", sign(secret, &timestamp, body))
    }

    #[test]
    fn accepts_a_fresh_signed_delivery() {
        let now = Utc::now();
        let header = header_for("whsec_test", "{}", now);

        assert!(verify_signature("whsec_test", &header, "{}", now).is_ok());
    }

    #[test]
    fn rejects_a_tampered_body() {
        let now = Utc::now();
        let header = header_for("whsec_test", "{}", now);

        let result = verify_signature("whsec_test", &header, r#"{"evil":1}"#, now);
        assert!(matches!(result, Err(EngineError::Unauthorized(_))));
    }

    #[test]
    fn rejects_a_stale_timestamp() {
        let now = Utc::now();
        let header = header_for("whsec_test", "{}", now - chrono::Duration::seconds(301));

        let result = verify_signature("whsec_test", &header, "{}", now);
        assert!(matches!(result, Err(EngineError::Unauthorized(_))));
    }

    #[test]
    fn rejects_a_header_without_digest() {
        let now = Utc::now();
        let header = format!("t={}", now.timestamp());

        let result = verify_signature("whsec_test", &header, "{}", now);
        assert!(matches!(result, Err(EngineError::Unauthorized(_))));
    }
}
