//! Pools (rotating savings groups).
//!
//! A pool collects a fixed monthly contribution from every member and pays
//! the whole pot to one member per round. `current_round` is the position of
//! the next member in line; it only ever moves forward, via an explicit
//! admin action.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub monthly_amount: MoneyCents,
    pub admin_id: String,
    pub is_active: bool,
    pub current_round: i32,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pool {
    pub fn new(
        name: String,
        description: Option<String>,
        monthly_amount: MoneyCents,
        admin_id: String,
        start_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !monthly_amount.is_positive() {
            return Err(EngineError::InvalidInput(
                "monthly amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            monthly_amount,
            admin_id,
            is_active: true,
            current_round: 1,
            start_date,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub monthly_amount: i64,
    pub admin_id: String,
    pub is_active: bool,
    pub current_round: i32,
    pub start_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Pool> for ActiveModel {
    fn from(pool: &Pool) -> Self {
        Self {
            id: ActiveValue::Set(pool.id.to_string()),
            name: ActiveValue::Set(pool.name.clone()),
            description: ActiveValue::Set(pool.description.clone()),
            monthly_amount: ActiveValue::Set(pool.monthly_amount.cents()),
            admin_id: ActiveValue::Set(pool.admin_id.clone()),
            is_active: ActiveValue::Set(pool.is_active),
            current_round: ActiveValue::Set(pool.current_round),
            start_date: ActiveValue::Set(pool.start_date),
            created_at: ActiveValue::Set(pool.created_at),
            updated_at: ActiveValue::Set(pool.updated_at),
        }
    }
}

impl TryFrom<Model> for Pool {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("pool not exists".to_string()))?,
            name: model.name,
            description: model.description,
            monthly_amount: MoneyCents::new(model.monthly_amount),
            admin_id: model.admin_id,
            is_active: model.is_active,
            current_round: model.current_round,
            start_date: model.start_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
