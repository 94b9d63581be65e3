//! Pot payouts.
//!
//! A payout is recorded by the admin for a round's recipient. It stays
//! `pending` until everyone's contribution for the round's month has
//! cleared, then the admin settles it to `completed`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Completed,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for PayoutStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid payout status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub recipient_id: String,
    pub amount: MoneyCents,
    pub round: i32,
    pub status: PayoutStatus,
    pub scheduled_for: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payout {
    pub fn new(
        pool_id: Uuid,
        recipient_id: String,
        amount: MoneyCents,
        round: i32,
        scheduled_for: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool_id,
            recipient_id,
            amount,
            round,
            status: PayoutStatus::Pending,
            scheduled_for,
            completed_at: None,
            created_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payouts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pool_id: String,
    pub recipient_id: String,
    pub amount: i64,
    pub round: i32,
    pub status: String,
    pub scheduled_for: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payout> for ActiveModel {
    fn from(payout: &Payout) -> Self {
        Self {
            id: ActiveValue::Set(payout.id.to_string()),
            pool_id: ActiveValue::Set(payout.pool_id.to_string()),
            recipient_id: ActiveValue::Set(payout.recipient_id.clone()),
            amount: ActiveValue::Set(payout.amount.cents()),
            round: ActiveValue::Set(payout.round),
            status: ActiveValue::Set(payout.status.as_str().to_string()),
            scheduled_for: ActiveValue::Set(payout.scheduled_for),
            completed_at: ActiveValue::Set(payout.completed_at),
            created_at: ActiveValue::Set(payout.created_at),
        }
    }
}

impl TryFrom<Model> for Payout {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("payout not exists".to_string()))?,
            pool_id: Uuid::parse_str(&model.pool_id)
                .map_err(|_| EngineError::NotFound("pool not exists".to_string()))?,
            recipient_id: model.recipient_id,
            amount: MoneyCents::new(model.amount),
            round: model.round,
            status: PayoutStatus::try_from(model.status.as_str())?,
            scheduled_for: model.scheduled_for,
            completed_at: model.completed_at,
            created_at: model.created_at,
        })
    }
}
