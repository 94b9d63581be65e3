use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, Invitation, InvitationStatus, PoolMember, ResultEngine};

use super::{Engine, normalize_email};

impl Engine {
    /// Issue an invitation to an email address. Any member may invite.
    pub async fn invite(
        &self,
        pool_id: Uuid,
        email: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Invitation> {
        self.require_pool(pool_id).await?;
        self.require_member(pool_id, user_id).await?;
        let email = normalize_email(email)?;

        let invitation = Invitation::new(pool_id, email, user_id.to_string(), now);
        self.store.insert_invitation(&invitation).await?;
        Ok(invitation)
    }

    /// Redeem an invitation token, joining the caller to the pool at the
    /// tail of the rotation. Tokens are single-use; an expired one is
    /// marked `expired` the first time somebody tries it.
    pub async fn accept_invitation(
        &self,
        token: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<PoolMember> {
        let invitation = self
            .store
            .invitation_by_token(token)
            .await?
            .ok_or_else(|| EngineError::NotFound("invitation not exists".to_string()))?;
        let pool = self.require_pool(invitation.pool_id).await?;

        let _guard = self.pool_locks.acquire(pool.id).await;
        // Re-read under the lock; a racing accept may have consumed the
        // token since the first fetch.
        let mut invitation = self
            .store
            .invitation_by_token(token)
            .await?
            .ok_or_else(|| EngineError::NotFound("invitation not exists".to_string()))?;
        if invitation.status != InvitationStatus::Pending {
            return Err(EngineError::InvalidState(
                "invitation no longer pending".to_string(),
            ));
        }
        if now > invitation.expires_at {
            invitation.status = InvitationStatus::Expired;
            self.store.update_invitation(&invitation).await?;
            return Err(EngineError::Expired("invitation expired".to_string()));
        }

        // The membership lands before the token flips; retrying after a
        // crash in between hits the duplicate-member check instead of
        // losing the seat.
        let member = self.insert_member_at_tail(&pool, user_id, now).await?;
        invitation.status = InvitationStatus::Accepted;
        self.store.update_invitation(&invitation).await?;
        Ok(member)
    }

    /// Invitations issued for a pool, newest first. Admin only.
    pub async fn pool_invitations(
        &self,
        pool_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Invitation>> {
        let pool = self.require_pool(pool_id).await?;
        self.require_admin(&pool, user_id).await?;
        self.store.pool_invitations(pool_id).await
    }
}
