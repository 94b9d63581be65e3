//! Login sessions.
//!
//! A session maps a bearer token to a user for a week. Expired rows are
//! removed lazily the next time the token shows up.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::token;

/// Days a session token stays valid.
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: String, now: DateTime<Utc>) -> Self {
        Self {
            token: token::generate(),
            user_id,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Session> for ActiveModel {
    fn from(session: &Session) -> Self {
        Self {
            token: ActiveValue::Set(session.token.clone()),
            user_id: ActiveValue::Set(session.user_id.clone()),
            expires_at: ActiveValue::Set(session.expires_at),
            created_at: ActiveValue::Set(session.created_at),
        }
    }
}

impl From<Model> for Session {
    fn from(model: Model) -> Self {
        Self {
            token: model.token,
            user_id: model.user_id,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expiry_is_a_strict_bound() {
        let now = Utc::now();
        let session = Session::new("user".to_string(), now);

        assert!(!session.is_expired(session.expires_at));
        assert!(session.is_expired(session.expires_at + Duration::seconds(1)));
    }
}
