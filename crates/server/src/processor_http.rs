//! HTTP payment processor client

use async_trait::async_trait;
use serde::Deserialize;

use engine::processor::{CreatedIntent, IntentMetadata, PaymentProcessor};
use engine::{EngineError, MoneyCents, ResultEngine};

/// A [`PaymentProcessor`] speaking the Stripe payment-intents wire
/// format over HTTP.
#[derive(Clone, Debug)]
pub struct HttpProcessor {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct IntentCreated {
    id: String,
    client_secret: String,
}

impl HttpProcessor {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        HttpProcessor {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl PaymentProcessor for HttpProcessor {
    async fn create_intent(
        &self,
        amount: MoneyCents,
        currency: &str,
        metadata: IntentMetadata,
    ) -> ResultEngine<CreatedIntent> {
        let params = [
            ("amount", amount.cents().to_string()),
            ("currency", currency.to_string()),
            ("metadata[pool_id]", metadata.pool_id.to_string()),
            ("metadata[user_id]", metadata.user_id),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|err| {
                EngineError::Processor(format!("payment intent request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Processor(format!(
                "payment intent request returned {status}: {body}"
            )));
        }

        let intent: IntentCreated = response.json().await.map_err(|err| {
            EngineError::Processor(format!("malformed payment intent response: {err}"))
        })?;

        Ok(CreatedIntent {
            intent_id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}
