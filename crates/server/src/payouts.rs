//! Payout API endpoints

use api_types::payout::{PayoutNew, PayoutStatus as ApiStatus, PayoutUpdate, PayoutView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_status(status: engine::PayoutStatus) -> ApiStatus {
    match status {
        engine::PayoutStatus::Pending => ApiStatus::Pending,
        engine::PayoutStatus::Completed => ApiStatus::Completed,
        engine::PayoutStatus::Failed => ApiStatus::Failed,
    }
}

pub(crate) fn payout_view(payout: engine::Payout) -> PayoutView {
    PayoutView {
        id: payout.id,
        pool_id: payout.pool_id,
        recipient_id: payout.recipient_id,
        amount_minor: payout.amount.cents(),
        round: payout.round,
        status: map_status(payout.status),
        scheduled_for: payout.scheduled_for,
        completed_at: payout.completed_at,
        created_at: payout.created_at,
    }
}

/// Handle requests for recording a round's payout. Admin only.
pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
    Json(payload): Json<PayoutNew>,
) -> Result<Json<PayoutView>, ServerError> {
    let payout = state
        .engine
        .record_payout(
            pool_id,
            &payload.recipient_id,
            payload.round,
            payload.scheduled_for,
            &user.id,
            Utc::now(),
        )
        .await?;

    Ok(Json(payout_view(payout)))
}

/// Handle requests for settling a payout as completed or failed.
/// Admin only.
pub async fn settle(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(payout_id): Path<Uuid>,
    Json(payload): Json<PayoutUpdate>,
) -> Result<Json<PayoutView>, ServerError> {
    let status = match payload.status {
        ApiStatus::Pending => engine::PayoutStatus::Pending,
        ApiStatus::Completed => engine::PayoutStatus::Completed,
        ApiStatus::Failed => engine::PayoutStatus::Failed,
    };
    let payout = state
        .engine
        .settle_payout(payout_id, status, &user.id, Utc::now())
        .await?;

    Ok(Json(payout_view(payout)))
}
