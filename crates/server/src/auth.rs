//! Authentication and profile API endpoints

use api_types::auth::{LoginRequest, LoginResponse, ProfileUpdate, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;

use crate::{ServerError, server::ServerState};

pub(crate) fn user_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        phone: user.phone,
        created_at: user.created_at,
    }
}

/// Handle login requests. Unknown emails get an account on the spot.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let (user, session) = state
        .engine
        .login(&payload.email, payload.display_name.as_deref(), Utc::now())
        .await?;

    Ok(Json(LoginResponse {
        token: session.token,
        user: user_view(user),
    }))
}

/// Handle logout requests, revoking the presented bearer token.
pub async fn logout(
    auth_header: TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.logout(auth_header.token()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for the caller's own profile.
pub async fn profile(Extension(user): Extension<engine::User>) -> Json<UserView> {
    Json(user_view(user))
}

/// Handle profile updates.
pub async fn update_profile(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .update_profile(
            &user.id,
            payload.display_name.as_deref(),
            payload.phone.as_deref(),
            Utc::now(),
        )
        .await?;

    Ok(Json(user_view(user)))
}
