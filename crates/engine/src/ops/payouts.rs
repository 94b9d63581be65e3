use chrono::{DateTime, Datelike, Months, Utc};
use uuid::Uuid;

use crate::{EngineError, PaymentStatus, Payout, PayoutStatus, Pool, ResultEngine};

use super::Engine;

impl Engine {
    /// Record the pot payout for a round. The amount is the monthly
    /// contribution times the current member count. Admin only.
    pub async fn record_payout(
        &self,
        pool_id: Uuid,
        recipient_id: &str,
        round: Option<i32>,
        scheduled_for: DateTime<Utc>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Payout> {
        let pool = self.require_pool(pool_id).await?;
        self.require_admin(&pool, user_id).await?;

        self.store
            .member(pool_id, recipient_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("member not exists".to_string()))?;

        let members = self.store.members(pool_id).await?;
        let amount = pool
            .monthly_amount
            .checked_mul(members.len() as i64)
            .ok_or_else(|| EngineError::InvalidInput("pot amount overflows".to_string()))?;

        let round = round.unwrap_or(pool.current_round);
        round_month(&pool, round)?;

        let payout = Payout::new(
            pool_id,
            recipient_id.to_string(),
            amount,
            round,
            scheduled_for,
            now,
        );
        self.store.insert_payout(&payout).await?;
        Ok(payout)
    }

    /// Move a payout to `completed` or `failed`. Completion is refused
    /// until every current member has a completed contribution for the
    /// round's month. Admin only.
    pub async fn settle_payout(
        &self,
        payout_id: Uuid,
        status: PayoutStatus,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Payout> {
        let mut payout = self
            .store
            .payout(payout_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("payout not exists".to_string()))?;
        let pool = self.require_pool(payout.pool_id).await?;
        self.require_admin(&pool, user_id).await?;

        if payout.status != PayoutStatus::Pending {
            return Err(EngineError::InvalidState(
                "payout already settled".to_string(),
            ));
        }

        match status {
            PayoutStatus::Pending => {
                return Err(EngineError::InvalidInput(
                    "payout status must be completed or failed".to_string(),
                ));
            }
            PayoutStatus::Completed => {
                self.require_round_funded(&pool, payout.round).await?;
                payout.status = PayoutStatus::Completed;
                payout.completed_at = Some(now);
            }
            PayoutStatus::Failed => {
                payout.status = PayoutStatus::Failed;
            }
        }
        self.store.update_payout(&payout).await?;
        Ok(payout)
    }

    /// Every pending payout across all pools, soonest first. Operator
    /// surface for the admin CLI; no caller identity involved.
    pub async fn upcoming_payouts(&self) -> ResultEngine<Vec<Payout>> {
        self.store.pending_payouts().await
    }

    /// A payout may complete only once each current member has a
    /// completed payment for the round's contribution month.
    async fn require_round_funded(&self, pool: &Pool, round: i32) -> ResultEngine<()> {
        let due_month = round_month(pool, round)?;
        let members = self.store.members(pool.id).await?;
        let payments = self.store.pool_payments(pool.id).await?;

        let unpaid = members.iter().find(|member| {
            !payments.iter().any(|p| {
                p.user_id == member.user_id
                    && p.status == PaymentStatus::Completed
                    && same_month(p.for_month, due_month)
            })
        });
        if unpaid.is_some() {
            return Err(EngineError::InvalidState(
                "waiting on member contributions for this month".to_string(),
            ));
        }
        Ok(())
    }
}

/// The contribution month for a round: `start_date` plus one month per
/// completed round before it.
fn round_month(pool: &Pool, round: i32) -> ResultEngine<DateTime<Utc>> {
    let offset = u32::try_from(round - 1)
        .map_err(|_| EngineError::InvalidInput("round must be >= 1".to_string()))?;
    pool.start_date
        .checked_add_months(Months::new(offset))
        .ok_or_else(|| EngineError::InvalidInput("round does not map to a month".to_string()))
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::MoneyCents;

    use super::*;

    fn pool_starting(start: DateTime<Utc>) -> Pool {
        Pool::new(
            "Condominio".to_string(),
            None,
            MoneyCents::new(10_000),
            "admin".to_string(),
            start,
            start,
        )
        .unwrap()
    }

    #[test]
    fn round_month_counts_from_the_start_date() {
        let start = Utc.with_ymd_and_hms(2025, 11, 15, 9, 0, 0).unwrap();
        let pool = pool_starting(start);

        let third = round_month(&pool, 3).unwrap();
        assert_eq!((third.year(), third.month()), (2026, 1));
    }

    #[test]
    fn round_month_rejects_round_zero() {
        let start = Utc.with_ymd_and_hms(2025, 11, 15, 9, 0, 0).unwrap();
        let pool = pool_starting(start);

        assert!(round_month(&pool, 0).is_err());
    }

    #[test]
    fn same_month_ignores_the_day() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        assert!(same_month(a, b));
        assert!(!same_month(b, c));
    }
}
