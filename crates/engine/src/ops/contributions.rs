use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::processor::{CreatedIntent, IntentMetadata, IntentOutcome};
use crate::{EngineError, Message, Payment, PaymentStatus, ResultEngine};

use super::Engine;

const CONTRIBUTION_CURRENCY: &str = "usd";

impl Engine {
    /// Start a monthly contribution: ask the processor for a payment
    /// intent, then record the pending payment carrying its id.
    pub async fn record_contribution(
        &self,
        pool_id: Uuid,
        for_month: DateTime<Utc>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<(Payment, CreatedIntent)> {
        let pool = self.require_pool(pool_id).await?;
        self.require_member(pool_id, user_id).await?;

        let processor = self.processor.as_ref().ok_or_else(|| {
            EngineError::InvalidState("payment processor not configured".to_string())
        })?;
        let intent = processor
            .create_intent(
                pool.monthly_amount,
                CONTRIBUTION_CURRENCY,
                IntentMetadata {
                    pool_id,
                    user_id: user_id.to_string(),
                },
            )
            .await?;

        let payment = Payment::new(
            pool_id,
            user_id.to_string(),
            pool.monthly_amount,
            for_month,
            Some(intent.intent_id.clone()),
            now,
        );
        self.store.insert_payment(&payment).await?;
        Ok((payment, intent))
    }

    /// Apply a processor outcome to the matching pending payment. Unknown
    /// intents and repeated deliveries are silent no-ops, so replayed
    /// webhooks cannot change settled state.
    pub async fn settle_contribution(
        &self,
        intent_id: &str,
        outcome: IntentOutcome,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let Some(mut payment) = self.store.payment_by_intent(intent_id).await? else {
            return Ok(());
        };
        if payment.status != PaymentStatus::Pending {
            return Ok(());
        }

        match outcome {
            IntentOutcome::Succeeded => {
                payment.status = PaymentStatus::Completed;
                payment.completed_at = Some(now);
                self.store.update_payment(&payment).await?;

                let note = Message::system(
                    payment.pool_id,
                    payment.user_id.clone(),
                    "Payment received successfully".to_string(),
                    now,
                );
                self.store.insert_message(&note).await?;
            }
            IntentOutcome::Failed => {
                payment.status = PaymentStatus::Failed;
                self.store.update_payment(&payment).await?;
            }
        }
        Ok(())
    }

    /// Payment history of a pool, newest first. Member only.
    pub async fn pool_payments(&self, pool_id: Uuid, user_id: &str) -> ResultEngine<Vec<Payment>> {
        self.require_pool(pool_id).await?;
        self.require_member(pool_id, user_id).await?;
        self.store.pool_payments(pool_id).await
    }

    /// The caller's own payments across every pool, newest first.
    pub async fn my_payments(&self, user_id: &str) -> ResultEngine<Vec<Payment>> {
        self.store.user_payments(user_id).await
    }
}
