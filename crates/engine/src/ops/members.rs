use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, Pool, PoolMember, ResultEngine, User};

use super::Engine;

impl Engine {
    /// Join a pool at the tail of the rotation.
    pub async fn add_member(
        &self,
        pool_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<PoolMember> {
        let pool = self.require_pool(pool_id).await?;
        let _guard = self.pool_locks.acquire(pool_id).await;
        self.insert_member_at_tail(&pool, user_id, now).await
    }

    /// Append a membership at `max(position) + 1`. The caller must hold
    /// the pool's lock.
    pub(super) async fn insert_member_at_tail(
        &self,
        pool: &Pool,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<PoolMember> {
        if self.store.member(pool.id, user_id).await?.is_some() {
            return Err(EngineError::Conflict(
                "already a member of this pool".to_string(),
            ));
        }

        let members = self.store.members(pool.id).await?;
        let position = members.iter().map(|m| m.position).max().unwrap_or(0) + 1;
        let member = PoolMember::new(pool.id, user_id.to_string(), position, now);
        self.store.insert_member(&member).await?;
        Ok(member)
    }

    /// Members of a pool joined with their profiles, ascending by position.
    pub async fn list_members(
        &self,
        pool_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<(PoolMember, User)>> {
        self.require_pool(pool_id).await?;
        self.require_member(pool_id, user_id).await?;
        self.members_with_users(pool_id).await
    }

    pub(super) async fn members_with_users(
        &self,
        pool_id: Uuid,
    ) -> ResultEngine<Vec<(PoolMember, User)>> {
        let members = self.store.members(pool_id).await?;
        let mut result = Vec::with_capacity(members.len());
        for member in members {
            let user = self.require_user(&member.user_id).await?;
            result.push((member, user));
        }
        Ok(result)
    }

    /// Remove a member: the admin removes anyone, a member removes
    /// themself. The departed position is left as a gap; nobody is
    /// renumbered and `current_round` stays put.
    pub async fn remove_member(
        &self,
        pool_id: Uuid,
        member_user_id: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let pool = self.require_pool(pool_id).await?;
        if member_user_id == user_id {
            self.require_member(pool_id, user_id).await?;
        } else {
            self.require_admin(&pool, user_id).await?;
        }
        if member_user_id == pool.admin_id {
            return Err(EngineError::InvalidState(
                "the pool admin cannot be removed".to_string(),
            ));
        }

        let member = self
            .store
            .member(pool_id, member_user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("member not exists".to_string()))?;
        self.store.delete_member(member.id).await
    }

    /// Hand the pot to the next member in line and move the rotation on.
    /// Positions vacated by removed members are skipped. Admin only.
    pub async fn advance_round(
        &self,
        pool_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Pool> {
        let pool = self.require_pool(pool_id).await?;
        self.require_admin(&pool, user_id).await?;

        let _guard = self.pool_locks.acquire(pool_id).await;
        // Re-read under the lock; a concurrent call may have advanced
        // the round since the admin check.
        let mut pool = self.require_pool(pool_id).await?;
        let members = self.store.members(pool_id).await?;
        let Some(mut recipient) = members
            .into_iter()
            .find(|m| m.position >= pool.current_round)
        else {
            return Err(EngineError::InvalidState(
                "rotation already completed".to_string(),
            ));
        };

        recipient.has_received = true;
        pool.current_round = recipient.position + 1;
        pool.updated_at = now;
        self.store.advance_rotation(&pool, &recipient).await?;
        Ok(pool)
    }
}
