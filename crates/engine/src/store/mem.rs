//! In-memory backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Invitation, Message, Payment, Payout, PayoutStatus, Pool, PoolMember, ResultEngine, Session,
    User,
};

use super::Store;

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, User>,
    sessions: HashMap<String, Session>,
    pools: HashMap<Uuid, Pool>,
    members: HashMap<Uuid, PoolMember>,
    payments: HashMap<Uuid, Payment>,
    payouts: HashMap<Uuid, Payout>,
    messages: HashMap<Uuid, Message>,
    invitations: HashMap<Uuid, Invitation>,
}

/// Keeps everything in process memory. Data is gone on restart; meant for
/// tests and local tinkering.
#[derive(Debug, Default)]
pub struct MemStore {
    state: RwLock<State>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert_user(&self, user: &User) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn user(&self, id: &str) -> ResultEngine<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state
            .sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn session(&self, token: &str) -> ResultEngine<Option<Session>> {
        let state = self.state.read().await;
        Ok(state.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.sessions.remove(token);
        Ok(())
    }

    async fn insert_pool_with_admin(&self, pool: &Pool, admin: &PoolMember) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.pools.insert(pool.id, pool.clone());
        state.members.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn pool(&self, id: Uuid) -> ResultEngine<Option<Pool>> {
        let state = self.state.read().await;
        Ok(state.pools.get(&id).cloned())
    }

    async fn update_pool(&self, pool: &Pool) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.pools.insert(pool.id, pool.clone());
        Ok(())
    }

    async fn pools_for_user(&self, user_id: &str) -> ResultEngine<Vec<Pool>> {
        let state = self.state.read().await;
        let mut pools: Vec<Pool> = state
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| state.pools.get(&m.pool_id).cloned())
            .collect();
        pools.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(pools)
    }

    async fn insert_member(&self, member: &PoolMember) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn member(&self, pool_id: Uuid, user_id: &str) -> ResultEngine<Option<PoolMember>> {
        let state = self.state.read().await;
        Ok(state
            .members
            .values()
            .find(|m| m.pool_id == pool_id && m.user_id == user_id)
            .cloned())
    }

    async fn members(&self, pool_id: Uuid) -> ResultEngine<Vec<PoolMember>> {
        let state = self.state.read().await;
        let mut members: Vec<PoolMember> = state
            .members
            .values()
            .filter(|m| m.pool_id == pool_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.position);
        Ok(members)
    }

    async fn delete_member(&self, id: Uuid) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.members.remove(&id);
        Ok(())
    }

    async fn advance_rotation(&self, pool: &Pool, member: &PoolMember) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.pools.insert(pool.id, pool.clone());
        state.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn insert_payment(&self, payment: &Payment) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn payment_by_intent(&self, intent_id: &str) -> ResultEngine<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state
            .payments
            .values()
            .find(|p| p.intent_id.as_deref() == Some(intent_id))
            .cloned())
    }

    async fn update_payment(&self, payment: &Payment) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn pool_payments(&self, pool_id: Uuid) -> ResultEngine<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| p.pool_id == pool_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(payments)
    }

    async fn user_payments(&self, user_id: &str) -> ResultEngine<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(payments)
    }

    async fn insert_payout(&self, payout: &Payout) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.payouts.insert(payout.id, payout.clone());
        Ok(())
    }

    async fn payout(&self, id: Uuid) -> ResultEngine<Option<Payout>> {
        let state = self.state.read().await;
        Ok(state.payouts.get(&id).cloned())
    }

    async fn update_payout(&self, payout: &Payout) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.payouts.insert(payout.id, payout.clone());
        Ok(())
    }

    async fn pool_payouts(&self, pool_id: Uuid) -> ResultEngine<Vec<Payout>> {
        let state = self.state.read().await;
        let mut payouts: Vec<Payout> = state
            .payouts
            .values()
            .filter(|p| p.pool_id == pool_id)
            .cloned()
            .collect();
        payouts.sort_by_key(|p| p.round);
        Ok(payouts)
    }

    async fn pending_payouts(&self) -> ResultEngine<Vec<Payout>> {
        let state = self.state.read().await;
        let mut payouts: Vec<Payout> = state
            .payouts
            .values()
            .filter(|p| p.status == PayoutStatus::Pending)
            .cloned()
            .collect();
        payouts.sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for).then(a.id.cmp(&b.id)));
        Ok(payouts)
    }

    async fn insert_message(&self, message: &Message) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn pool_messages(&self, pool_id: Uuid, limit: u64) -> ResultEngine<Vec<Message>> {
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .values()
            .filter(|m| m.pool_id == pool_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let skip = messages.len().saturating_sub(limit as usize);
        Ok(messages.split_off(skip))
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn invitation_by_token(&self, token: &str) -> ResultEngine<Option<Invitation>> {
        let state = self.state.read().await;
        Ok(state
            .invitations
            .values()
            .find(|i| i.token == token)
            .cloned())
    }

    async fn update_invitation(&self, invitation: &Invitation) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn pool_invitations(&self, pool_id: Uuid) -> ResultEngine<Vec<Invitation>> {
        let state = self.state.read().await;
        let mut invitations: Vec<Invitation> = state
            .invitations
            .values()
            .filter(|i| i.pool_id == pool_id)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(invitations)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[tokio::test]
    async fn members_come_back_in_rotation_order() {
        let store = MemStore::new();
        let pool_id = Uuid::new_v4();
        let now = Utc::now();

        for position in [3, 1, 2] {
            let member = PoolMember::new(pool_id, format!("user-{position}"), position, now);
            store.insert_member(&member).await.unwrap();
        }

        let members = store.members(pool_id).await.unwrap();
        let positions: Vec<i32> = members.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn message_limit_keeps_the_latest_entries() {
        let store = MemStore::new();
        let pool_id = Uuid::new_v4();
        let start = Utc::now();

        for i in 0..5 {
            let message = Message::user(
                pool_id,
                "sender".to_string(),
                format!("msg {i}"),
                start + Duration::minutes(i),
            );
            store.insert_message(&message).await.unwrap();
        }

        let messages = store.pool_messages(pool_id, 2).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["msg 3", "msg 4"]);
    }
}
