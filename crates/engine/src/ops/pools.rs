use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Message, MoneyCents, Payout, Pool, PoolMember, ResultEngine, User};

use super::messages::RECENT_MESSAGES;
use super::{Engine, normalize_optional_text, normalize_required_text};

/// The pool detail view: the pool itself, its members joined with their
/// profiles (ascending by rotation position), the recent chat and every
/// payout recorded so far.
#[derive(Clone, Debug)]
pub struct PoolOverview {
    pub pool: Pool,
    pub members: Vec<(PoolMember, User)>,
    pub messages: Vec<Message>,
    pub payouts: Vec<Payout>,
}

impl Engine {
    /// Create a pool. The creator becomes its admin and the first member
    /// of the rotation.
    pub async fn create_pool(
        &self,
        name: &str,
        description: Option<&str>,
        monthly_amount: MoneyCents,
        start_date: DateTime<Utc>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Pool> {
        let name = normalize_required_text(name, "pool name")?;
        let description = normalize_optional_text(description);

        let pool = Pool::new(
            name,
            description,
            monthly_amount,
            user_id.to_string(),
            start_date,
            now,
        )?;
        let admin = PoolMember::new(pool.id, user_id.to_string(), 1, now);
        self.store.insert_pool_with_admin(&pool, &admin).await?;
        Ok(pool)
    }

    /// Pools the caller belongs to, newest first.
    pub async fn user_pools(&self, user_id: &str) -> ResultEngine<Vec<Pool>> {
        self.store.pools_for_user(user_id).await
    }

    /// The member-facing detail view of one pool.
    pub async fn pool_overview(&self, pool_id: Uuid, user_id: &str) -> ResultEngine<PoolOverview> {
        let pool = self.require_pool(pool_id).await?;
        self.require_member(pool_id, user_id).await?;

        let members = self.members_with_users(pool_id).await?;
        let messages = self.store.pool_messages(pool_id, RECENT_MESSAGES).await?;
        let payouts = self.store.pool_payouts(pool_id).await?;
        Ok(PoolOverview {
            pool,
            members,
            messages,
            payouts,
        })
    }

    /// Edit name or description, or toggle `is_active`. Admin only.
    pub async fn update_pool(
        &self,
        pool_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        is_active: Option<bool>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Pool> {
        let mut pool = self.require_pool(pool_id).await?;
        self.require_admin(&pool, user_id).await?;

        if let Some(name) = name {
            pool.name = normalize_required_text(name, "pool name")?;
        }
        if let Some(description) = description {
            pool.description = normalize_optional_text(Some(description));
        }
        if let Some(is_active) = is_active {
            pool.is_active = is_active;
        }
        pool.updated_at = now;
        self.store.update_pool(&pool).await?;
        Ok(pool)
    }
}
