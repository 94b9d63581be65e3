//! Membership and rotation API endpoints

use api_types::member::MemberView;
use api_types::pool::PoolView;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, pools, server::ServerState};

pub(crate) fn member_view((member, user): (engine::PoolMember, engine::User)) -> MemberView {
    MemberView {
        user_id: member.user_id,
        email: user.email,
        display_name: user.display_name,
        position: member.position,
        has_received: member.has_received,
        joined_at: member.joined_at,
    }
}

/// Handle requests for joining a pool directly.
pub async fn join(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state
        .engine
        .add_member(pool_id, &user.id, Utc::now())
        .await?;

    Ok(Json(member_view((member, user))))
}

/// Handle requests for removing a member. The admin removes anyone,
/// everyone else only themself.
pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path((pool_id, member_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_member(pool_id, &member_id, &user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for advancing the rotation to the next recipient.
/// Admin only.
pub async fn advance(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolView>, ServerError> {
    let pool = state
        .engine
        .advance_round(pool_id, &user.id, Utc::now())
        .await?;

    Ok(Json(pools::pool_view(pool)))
}
