use uuid::Uuid;

use crate::{EngineError, Pool, PoolMember, ResultEngine, User};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(&self, user_id: &str) -> ResultEngine<User> {
        self.store
            .user(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))
    }

    pub(super) async fn require_pool(&self, pool_id: Uuid) -> ResultEngine<Pool> {
        self.store
            .pool(pool_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("pool not exists".to_string()))
    }

    pub(super) async fn require_member(
        &self,
        pool_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<PoolMember> {
        self.store
            .member(pool_id, user_id)
            .await?
            .ok_or_else(|| EngineError::Unauthorized("not a member of this pool".to_string()))
    }

    pub(super) async fn require_admin(
        &self,
        pool: &Pool,
        user_id: &str,
    ) -> ResultEngine<PoolMember> {
        let member = self.require_member(pool.id, user_id).await?;
        if pool.admin_id != user_id {
            return Err(EngineError::Unauthorized("pool admin required".to_string()));
        }
        Ok(member)
    }
}
