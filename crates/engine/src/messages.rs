//! Pool message board.
//!
//! Members post free-form text; the engine also drops `system` entries on
//! notable events such as a cleared contribution.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    System,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl TryFrom<&str> for MessageKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "system" => Ok(Self::System),
            other => Err(EngineError::InvalidInput(format!(
                "invalid message kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub sender_id: String,
    pub content: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(pool_id: Uuid, sender_id: String, content: String, now: DateTime<Utc>) -> Self {
        Self::with_kind(pool_id, sender_id, content, MessageKind::User, now)
    }

    pub fn system(pool_id: Uuid, sender_id: String, content: String, now: DateTime<Utc>) -> Self {
        Self::with_kind(pool_id, sender_id, content, MessageKind::System, now)
    }

    fn with_kind(
        pool_id: Uuid,
        sender_id: String,
        content: String,
        kind: MessageKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool_id,
            sender_id,
            content,
            kind,
            created_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pool_id: String,
    pub sender_id: String,
    pub content: String,
    pub kind: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Message> for ActiveModel {
    fn from(message: &Message) -> Self {
        Self {
            id: ActiveValue::Set(message.id.to_string()),
            pool_id: ActiveValue::Set(message.pool_id.to_string()),
            sender_id: ActiveValue::Set(message.sender_id.clone()),
            content: ActiveValue::Set(message.content.clone()),
            kind: ActiveValue::Set(message.kind.as_str().to_string()),
            created_at: ActiveValue::Set(message.created_at),
        }
    }
}

impl TryFrom<Model> for Message {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("message not exists".to_string()))?,
            pool_id: Uuid::parse_str(&model.pool_id)
                .map_err(|_| EngineError::NotFound("pool not exists".to_string()))?,
            sender_id: model.sender_id,
            content: model.content,
            kind: MessageKind::try_from(model.kind.as_str())?,
            created_at: model.created_at,
        })
    }
}
