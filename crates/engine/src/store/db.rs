//! SQLite backend through sea-orm.

use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Invitation, Message, Payment, Payout, PayoutStatus, Pool, PoolMember, ResultEngine, Session,
    User, invitations, messages, payments, payouts, pool_members, pools, sessions, users,
};

use super::Store;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Persists through a sea-orm connection. Pair with the `migration` crate
/// to bring the schema up before first use.
#[derive(Clone, Debug)]
pub struct DbStore {
    database: DatabaseConnection,
}

impl DbStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Store for DbStore {
    async fn insert_user(&self, user: &User) -> ResultEngine<()> {
        users::ActiveModel::from(user).insert(&self.database).await?;
        Ok(())
    }

    async fn user(&self, id: &str) -> ResultEngine<Option<User>> {
        let model = users::Entity::find_by_id(id).one(&self.database).await?;
        Ok(model.map(User::from))
    }

    async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?;
        Ok(model.map(User::from))
    }

    async fn update_user(&self, user: &User) -> ResultEngine<()> {
        users::ActiveModel::from(user).update(&self.database).await?;
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> ResultEngine<()> {
        sessions::ActiveModel::from(session)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    async fn session(&self, token: &str) -> ResultEngine<Option<Session>> {
        let model = sessions::Entity::find_by_id(token).one(&self.database).await?;
        Ok(model.map(Session::from))
    }

    async fn delete_session(&self, token: &str) -> ResultEngine<()> {
        sessions::Entity::delete_by_id(token)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn insert_pool_with_admin(&self, pool: &Pool, admin: &PoolMember) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            pools::ActiveModel::from(pool).insert(&db_tx).await?;
            pool_members::ActiveModel::from(admin).insert(&db_tx).await?;
            Ok(())
        })
    }

    async fn pool(&self, id: Uuid) -> ResultEngine<Option<Pool>> {
        let model = pools::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?;
        model.map(Pool::try_from).transpose()
    }

    async fn update_pool(&self, pool: &Pool) -> ResultEngine<()> {
        pools::ActiveModel::from(pool).update(&self.database).await?;
        Ok(())
    }

    async fn pools_for_user(&self, user_id: &str) -> ResultEngine<Vec<Pool>> {
        let pool_ids: Vec<String> = pool_members::Entity::find()
            .filter(pool_members::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| m.pool_id)
            .collect();

        let models = pools::Entity::find()
            .filter(pools::Column::Id.is_in(pool_ids))
            .order_by_desc(pools::Column::CreatedAt)
            .order_by_desc(pools::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Pool::try_from).collect()
    }

    async fn insert_member(&self, member: &PoolMember) -> ResultEngine<()> {
        pool_members::ActiveModel::from(member)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    async fn member(&self, pool_id: Uuid, user_id: &str) -> ResultEngine<Option<PoolMember>> {
        let model = pool_members::Entity::find()
            .filter(pool_members::Column::PoolId.eq(pool_id.to_string()))
            .filter(pool_members::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;
        model.map(PoolMember::try_from).transpose()
    }

    async fn members(&self, pool_id: Uuid) -> ResultEngine<Vec<PoolMember>> {
        let models = pool_members::Entity::find()
            .filter(pool_members::Column::PoolId.eq(pool_id.to_string()))
            .order_by_asc(pool_members::Column::Position)
            .all(&self.database)
            .await?;
        models.into_iter().map(PoolMember::try_from).collect()
    }

    async fn delete_member(&self, id: Uuid) -> ResultEngine<()> {
        pool_members::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn advance_rotation(&self, pool: &Pool, member: &PoolMember) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            pools::ActiveModel::from(pool).update(&db_tx).await?;
            pool_members::ActiveModel::from(member).update(&db_tx).await?;
            Ok(())
        })
    }

    async fn insert_payment(&self, payment: &Payment) -> ResultEngine<()> {
        payments::ActiveModel::from(payment)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    async fn payment_by_intent(&self, intent_id: &str) -> ResultEngine<Option<Payment>> {
        let model = payments::Entity::find()
            .filter(payments::Column::IntentId.eq(intent_id))
            .one(&self.database)
            .await?;
        model.map(Payment::try_from).transpose()
    }

    async fn update_payment(&self, payment: &Payment) -> ResultEngine<()> {
        payments::ActiveModel::from(payment)
            .update(&self.database)
            .await?;
        Ok(())
    }

    async fn pool_payments(&self, pool_id: Uuid) -> ResultEngine<Vec<Payment>> {
        let models = payments::Entity::find()
            .filter(payments::Column::PoolId.eq(pool_id.to_string()))
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Payment::try_from).collect()
    }

    async fn user_payments(&self, user_id: &str) -> ResultEngine<Vec<Payment>> {
        let models = payments::Entity::find()
            .filter(payments::Column::UserId.eq(user_id))
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Payment::try_from).collect()
    }

    async fn insert_payout(&self, payout: &Payout) -> ResultEngine<()> {
        payouts::ActiveModel::from(payout)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    async fn payout(&self, id: Uuid) -> ResultEngine<Option<Payout>> {
        let model = payouts::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?;
        model.map(Payout::try_from).transpose()
    }

    async fn update_payout(&self, payout: &Payout) -> ResultEngine<()> {
        payouts::ActiveModel::from(payout)
            .update(&self.database)
            .await?;
        Ok(())
    }

    async fn pool_payouts(&self, pool_id: Uuid) -> ResultEngine<Vec<Payout>> {
        let models = payouts::Entity::find()
            .filter(payouts::Column::PoolId.eq(pool_id.to_string()))
            .order_by_asc(payouts::Column::Round)
            .all(&self.database)
            .await?;
        models.into_iter().map(Payout::try_from).collect()
    }

    async fn pending_payouts(&self) -> ResultEngine<Vec<Payout>> {
        let models = payouts::Entity::find()
            .filter(payouts::Column::Status.eq(PayoutStatus::Pending.as_str()))
            .order_by_asc(payouts::Column::ScheduledFor)
            .order_by_asc(payouts::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Payout::try_from).collect()
    }

    async fn insert_message(&self, message: &Message) -> ResultEngine<()> {
        messages::ActiveModel::from(message)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    async fn pool_messages(&self, pool_id: Uuid, limit: u64) -> ResultEngine<Vec<Message>> {
        let models = messages::Entity::find()
            .filter(messages::Column::PoolId.eq(pool_id.to_string()))
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;
        let mut result: Vec<Message> = models
            .into_iter()
            .map(Message::try_from)
            .collect::<ResultEngine<_>>()?;
        result.reverse();
        Ok(result)
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> ResultEngine<()> {
        invitations::ActiveModel::from(invitation)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    async fn invitation_by_token(&self, token: &str) -> ResultEngine<Option<Invitation>> {
        let model = invitations::Entity::find()
            .filter(invitations::Column::Token.eq(token))
            .one(&self.database)
            .await?;
        model.map(Invitation::try_from).transpose()
    }

    async fn update_invitation(&self, invitation: &Invitation) -> ResultEngine<()> {
        invitations::ActiveModel::from(invitation)
            .update(&self.database)
            .await?;
        Ok(())
    }

    async fn pool_invitations(&self, pool_id: Uuid) -> ResultEngine<Vec<Invitation>> {
        let models = invitations::Entity::find()
            .filter(invitations::Column::PoolId.eq(pool_id.to_string()))
            .order_by_desc(invitations::Column::CreatedAt)
            .order_by_desc(invitations::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Invitation::try_from).collect()
    }
}
