//! Pool API endpoints

use api_types::pool::{PoolListResponse, PoolNew, PoolOverviewResponse, PoolUpdate, PoolView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, members, messages, payouts, server::ServerState};

pub(crate) fn pool_view(pool: engine::Pool) -> PoolView {
    PoolView {
        id: pool.id,
        name: pool.name,
        description: pool.description,
        monthly_amount_minor: pool.monthly_amount.cents(),
        admin_id: pool.admin_id,
        is_active: pool.is_active,
        current_round: pool.current_round,
        start_date: pool.start_date,
        created_at: pool.created_at,
    }
}

/// Handle requests for creating a new pool.
pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<PoolNew>,
) -> Result<Json<PoolView>, ServerError> {
    let pool = state
        .engine
        .create_pool(
            &payload.name,
            payload.description.as_deref(),
            payload.monthly_amount_minor.into(),
            payload.start_date,
            &user.id,
            Utc::now(),
        )
        .await?;

    Ok(Json(pool_view(pool)))
}

/// Handle requests for listing the caller's pools.
pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<PoolListResponse>, ServerError> {
    let pools = state.engine.user_pools(&user.id).await?;

    Ok(Json(PoolListResponse {
        pools: pools.into_iter().map(pool_view).collect(),
    }))
}

/// Handle requests for the pool detail view.
pub async fn overview(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolOverviewResponse>, ServerError> {
    let overview = state.engine.pool_overview(pool_id, &user.id).await?;

    Ok(Json(PoolOverviewResponse {
        pool: pool_view(overview.pool),
        members: overview
            .members
            .into_iter()
            .map(members::member_view)
            .collect(),
        messages: overview
            .messages
            .into_iter()
            .map(messages::message_view)
            .collect(),
        payouts: overview
            .payouts
            .into_iter()
            .map(payouts::payout_view)
            .collect(),
    }))
}

/// Handle pool updates. Admin only.
pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
    Json(payload): Json<PoolUpdate>,
) -> Result<Json<PoolView>, ServerError> {
    let pool = state
        .engine
        .update_pool(
            pool_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.is_active,
            &user.id,
            Utc::now(),
        )
        .await?;

    Ok(Json(pool_view(pool)))
}
