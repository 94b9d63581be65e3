//! Pool invitations.
//!
//! An invitation carries a single-use random token and expires a week after
//! issuance. Accepting one registers the invitee as a member and consumes
//! the token; an expired token is marked as such on first use.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, token};

/// Days an invitation token stays valid.
pub const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
        }
    }
}

impl TryFrom<&str> for InvitationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "expired" => Ok(Self::Expired),
            other => Err(EngineError::InvalidInput(format!(
                "invalid invitation status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub email: String,
    pub token: String,
    pub status: InvitationStatus,
    pub invited_by: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(pool_id: Uuid, email: String, invited_by: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool_id,
            email,
            token: token::generate(),
            status: InvitationStatus::Pending,
            invited_by,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            created_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invitations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pool_id: String,
    pub email: String,
    #[sea_orm(unique)]
    pub token: String,
    pub status: String,
    pub invited_by: String,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Invitation> for ActiveModel {
    fn from(invitation: &Invitation) -> Self {
        Self {
            id: ActiveValue::Set(invitation.id.to_string()),
            pool_id: ActiveValue::Set(invitation.pool_id.to_string()),
            email: ActiveValue::Set(invitation.email.clone()),
            token: ActiveValue::Set(invitation.token.clone()),
            status: ActiveValue::Set(invitation.status.as_str().to_string()),
            invited_by: ActiveValue::Set(invitation.invited_by.clone()),
            expires_at: ActiveValue::Set(invitation.expires_at),
            created_at: ActiveValue::Set(invitation.created_at),
        }
    }
}

impl TryFrom<Model> for Invitation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("invitation not exists".to_string()))?,
            pool_id: Uuid::parse_str(&model.pool_id)
                .map_err(|_| EngineError::NotFound("pool not exists".to_string()))?,
            email: model.email,
            token: model.token,
            status: InvitationStatus::try_from(model.status.as_str())?,
            invited_by: model.invited_by,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_invitation_expires_a_week_out() {
        let now = Utc::now();
        let invitation = Invitation::new(
            Uuid::new_v4(),
            "zia@example.com".to_string(),
            "admin".to_string(),
            now,
        );

        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.expires_at, now + Duration::days(7));
        assert!(!invitation.token.is_empty());
    }
}
