//! Contribution payment API endpoints

use api_types::payment::{
    PaymentIntentResponse, PaymentListResponse, PaymentStatus as ApiStatus, PaymentView,
    WebhookAck, WebhookEvent,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use chrono::Utc;
use engine::processor::IntentOutcome;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

static SIGNATURE_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("processor-signature");

/// `TypedHeader` for the processor's webhook signature
///
/// Webhook deliveries must contain a "processor-signature" entry in the
/// header.
#[derive(Debug)]
pub(crate) struct SignatureHeader(String);

impl Header for SignatureHeader {
    fn name() -> &'static axum::http::HeaderName {
        &SIGNATURE_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };

        Ok(SignatureHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode processor-signature header"),
        }
    }
}

fn map_status(status: engine::PaymentStatus) -> ApiStatus {
    match status {
        engine::PaymentStatus::Pending => ApiStatus::Pending,
        engine::PaymentStatus::Completed => ApiStatus::Completed,
        engine::PaymentStatus::Failed => ApiStatus::Failed,
    }
}

fn payment_view(payment: engine::Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        pool_id: payment.pool_id,
        user_id: payment.user_id,
        amount_minor: payment.amount.cents(),
        status: map_status(payment.status),
        for_month: payment.for_month,
        completed_at: payment.completed_at,
        created_at: payment.created_at,
    }
}

/// Handle requests for starting a monthly contribution. The payment is
/// recorded against the month it is made in.
pub async fn create_intent(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PaymentIntentResponse>, ServerError> {
    let now = Utc::now();
    let (payment, intent) = state
        .engine
        .record_contribution(pool_id, now, &user.id, now)
        .await?;

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
        payment: payment_view(payment),
    }))
}

/// Handle requests for a pool's payment history. Member only.
pub async fn pool_history(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PaymentListResponse>, ServerError> {
    let payments = state.engine.pool_payments(pool_id, &user.id).await?;

    Ok(Json(PaymentListResponse {
        payments: payments.into_iter().map(payment_view).collect(),
    }))
}

/// Handle requests for the caller's payments across every pool.
pub async fn history(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<PaymentListResponse>, ServerError> {
    let payments = state.engine.my_payments(&user.id).await?;

    Ok(Json(PaymentListResponse {
        payments: payments.into_iter().map(payment_view).collect(),
    }))
}

/// Handle signed settlement deliveries from the payment processor.
/// Unrecognized event types are acknowledged and dropped.
pub async fn webhook(
    State(state): State<ServerState>,
    TypedHeader(SignatureHeader(signature)): TypedHeader<SignatureHeader>,
    body: String,
) -> Result<Json<WebhookAck>, ServerError> {
    // The route is only mounted when the secret is configured.
    let Some(secret) = state.webhook_secret.as_deref() else {
        return Err(ServerError::Generic("webhook not configured".to_string()));
    };
    engine::processor::verify_signature(secret, &signature, &body, Utc::now())?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|err| ServerError::Generic(format!("malformed webhook payload: {err}")))?;

    match event.kind.as_str() {
        "payment_intent.succeeded" => {
            state
                .engine
                .settle_contribution(&event.data.object.id, IntentOutcome::Succeeded, Utc::now())
                .await?;
        }
        "payment_intent.payment_failed" => {
            state
                .engine
                .settle_contribution(&event.data.object.id, IntentOutcome::Failed, Utc::now())
                .await?;
        }
        _ => {}
    }

    Ok(Json(WebhookAck { received: true }))
}
