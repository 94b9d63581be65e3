//! Storage backends.
//!
//! [`Store`] is the persistence seam: every engine read and write goes
//! through it, so the same operations run unchanged against the in-memory
//! backend ([`MemStore`]) and the SQLite one ([`DbStore`]). Stores hold no
//! business rules; they persist what the operations hand them. The two
//! compound writes ([`Store::insert_pool_with_admin`] and
//! [`Store::advance_rotation`]) exist because those pairs must land
//! together or not at all.

mod db;
mod mem;

use async_trait::async_trait;
use uuid::Uuid;

pub use db::DbStore;
pub use mem::MemStore;

use crate::{
    Invitation, Message, Payment, Payout, Pool, PoolMember, ResultEngine, Session, User,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: &User) -> ResultEngine<()>;
    async fn user(&self, id: &str) -> ResultEngine<Option<User>>;
    async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>>;
    async fn update_user(&self, user: &User) -> ResultEngine<()>;

    async fn insert_session(&self, session: &Session) -> ResultEngine<()>;
    async fn session(&self, token: &str) -> ResultEngine<Option<Session>>;
    async fn delete_session(&self, token: &str) -> ResultEngine<()>;

    /// Persists a pool together with its admin membership.
    async fn insert_pool_with_admin(&self, pool: &Pool, admin: &PoolMember) -> ResultEngine<()>;
    async fn pool(&self, id: Uuid) -> ResultEngine<Option<Pool>>;
    async fn update_pool(&self, pool: &Pool) -> ResultEngine<()>;
    /// Pools the user belongs to, newest first.
    async fn pools_for_user(&self, user_id: &str) -> ResultEngine<Vec<Pool>>;

    async fn insert_member(&self, member: &PoolMember) -> ResultEngine<()>;
    async fn member(&self, pool_id: Uuid, user_id: &str) -> ResultEngine<Option<PoolMember>>;
    /// Members of a pool ordered by rotation position.
    async fn members(&self, pool_id: Uuid) -> ResultEngine<Vec<PoolMember>>;
    async fn delete_member(&self, id: Uuid) -> ResultEngine<()>;
    /// Persists a round advancement: the pool's new `current_round` and the
    /// receiving member's `has_received` flag land in one write.
    async fn advance_rotation(&self, pool: &Pool, member: &PoolMember) -> ResultEngine<()>;

    async fn insert_payment(&self, payment: &Payment) -> ResultEngine<()>;
    async fn payment_by_intent(&self, intent_id: &str) -> ResultEngine<Option<Payment>>;
    async fn update_payment(&self, payment: &Payment) -> ResultEngine<()>;
    /// All payments of a pool, newest first.
    async fn pool_payments(&self, pool_id: Uuid) -> ResultEngine<Vec<Payment>>;
    /// One user's payments across every pool, newest first.
    async fn user_payments(&self, user_id: &str) -> ResultEngine<Vec<Payment>>;

    async fn insert_payout(&self, payout: &Payout) -> ResultEngine<()>;
    async fn payout(&self, id: Uuid) -> ResultEngine<Option<Payout>>;
    async fn update_payout(&self, payout: &Payout) -> ResultEngine<()>;
    /// Payouts of a pool ordered by round.
    async fn pool_payouts(&self, pool_id: Uuid) -> ResultEngine<Vec<Payout>>;
    /// Scheduled payouts across all pools, soonest first.
    async fn pending_payouts(&self) -> ResultEngine<Vec<Payout>>;

    async fn insert_message(&self, message: &Message) -> ResultEngine<()>;
    /// The latest `limit` messages of a pool in chronological order.
    async fn pool_messages(&self, pool_id: Uuid, limit: u64) -> ResultEngine<Vec<Message>>;

    async fn insert_invitation(&self, invitation: &Invitation) -> ResultEngine<()>;
    async fn invitation_by_token(&self, token: &str) -> ResultEngine<Option<Invitation>>;
    async fn update_invitation(&self, invitation: &Invitation) -> ResultEngine<()>;
    /// Invitations issued for a pool, newest first.
    async fn pool_invitations(&self, pool_id: Uuid) -> ResultEngine<Vec<Invitation>>;
}
