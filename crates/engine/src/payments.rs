//! Contribution payments.
//!
//! A payment starts `pending` with an external intent reference and is
//! settled once by a processor callback. Settlement is the only transition;
//! rows are never deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid payment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub user_id: String,
    pub amount: MoneyCents,
    pub status: PaymentStatus,
    pub for_month: DateTime<Utc>,
    pub intent_id: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        pool_id: Uuid,
        user_id: String,
        amount: MoneyCents,
        for_month: DateTime<Utc>,
        intent_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool_id,
            user_id,
            amount,
            status: PaymentStatus::Pending,
            for_month,
            intent_id,
            completed_at: None,
            created_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pool_id: String,
    pub user_id: String,
    pub amount: i64,
    pub status: String,
    pub for_month: DateTimeUtc,
    pub intent_id: Option<String>,
    pub completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            pool_id: ActiveValue::Set(payment.pool_id.to_string()),
            user_id: ActiveValue::Set(payment.user_id.clone()),
            amount: ActiveValue::Set(payment.amount.cents()),
            status: ActiveValue::Set(payment.status.as_str().to_string()),
            for_month: ActiveValue::Set(payment.for_month),
            intent_id: ActiveValue::Set(payment.intent_id.clone()),
            completed_at: ActiveValue::Set(payment.completed_at),
            created_at: ActiveValue::Set(payment.created_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("payment not exists".to_string()))?,
            pool_id: Uuid::parse_str(&model.pool_id)
                .map_err(|_| EngineError::NotFound("pool not exists".to_string()))?,
            user_id: model.user_id,
            amount: MoneyCents::new(model.amount),
            status: PaymentStatus::try_from(model.status.as_str())?,
            for_month: model.for_month,
            intent_id: model.intent_id,
            completed_at: model.completed_at,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
        ] {
            assert_eq!(PaymentStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(PaymentStatus::try_from("refunded").is_err());
    }
}
