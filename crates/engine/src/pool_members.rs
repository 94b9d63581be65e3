//! Pool membership rows.
//!
//! `position` fixes the member's slot in the rotation and is immutable after
//! joining. Removing a member leaves a hole in the sequence; survivors keep
//! their positions.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMember {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub user_id: String,
    pub position: i32,
    pub has_received: bool,
    pub joined_at: DateTime<Utc>,
}

impl PoolMember {
    pub fn new(pool_id: Uuid, user_id: String, position: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool_id,
            user_id,
            position,
            has_received: false,
            joined_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pool_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pool_id: String,
    pub user_id: String,
    pub position: i32,
    pub has_received: bool,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PoolMember> for ActiveModel {
    fn from(member: &PoolMember) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            pool_id: ActiveValue::Set(member.pool_id.to_string()),
            user_id: ActiveValue::Set(member.user_id.clone()),
            position: ActiveValue::Set(member.position),
            has_received: ActiveValue::Set(member.has_received),
            joined_at: ActiveValue::Set(member.joined_at),
        }
    }
}

impl TryFrom<Model> for PoolMember {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("member not exists".to_string()))?,
            pool_id: Uuid::parse_str(&model.pool_id)
                .map_err(|_| EngineError::NotFound("pool not exists".to_string()))?,
            user_id: model.user_id,
            position: model.position,
            has_received: model.has_received,
            joined_at: model.joined_at,
        })
    }
}
