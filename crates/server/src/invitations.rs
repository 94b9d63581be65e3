//! Invitation API endpoints

use api_types::invitation::{
    InvitationListResponse, InvitationNew, InvitationStatus as ApiStatus, InvitationView,
};
use api_types::member::MemberView;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, members, server::ServerState};

fn map_status(status: engine::InvitationStatus) -> ApiStatus {
    match status {
        engine::InvitationStatus::Pending => ApiStatus::Pending,
        engine::InvitationStatus::Accepted => ApiStatus::Accepted,
        engine::InvitationStatus::Expired => ApiStatus::Expired,
    }
}

fn invitation_view(invitation: engine::Invitation) -> InvitationView {
    InvitationView {
        id: invitation.id,
        pool_id: invitation.pool_id,
        email: invitation.email,
        token: invitation.token,
        status: map_status(invitation.status),
        expires_at: invitation.expires_at,
        created_at: invitation.created_at,
    }
}

/// Handle requests for inviting an email address to a pool.
pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
    Json(payload): Json<InvitationNew>,
) -> Result<Json<InvitationView>, ServerError> {
    let invitation = state
        .engine
        .invite(pool_id, &payload.email, &user.id, Utc::now())
        .await?;

    Ok(Json(invitation_view(invitation)))
}

/// Handle requests for listing a pool's invitations. Admin only.
pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<InvitationListResponse>, ServerError> {
    let invitations = state.engine.pool_invitations(pool_id, &user.id).await?;

    Ok(Json(InvitationListResponse {
        invitations: invitations.into_iter().map(invitation_view).collect(),
    }))
}

/// Handle requests for redeeming an invitation token. The caller joins
/// the pool at the tail of the rotation.
pub async fn accept(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state
        .engine
        .accept_invitation(&token, &user.id, Utc::now())
        .await?;

    Ok(Json(members::member_view((member, user))))
}
