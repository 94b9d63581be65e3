use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Message, ResultEngine};

use super::{Engine, normalize_required_text};

/// How many messages the board shows by default.
pub(super) const RECENT_MESSAGES: u64 = 50;

impl Engine {
    /// Post a message to the pool board. Member only.
    pub async fn post_message(
        &self,
        pool_id: Uuid,
        content: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Message> {
        self.require_pool(pool_id).await?;
        self.require_member(pool_id, user_id).await?;
        let content = normalize_required_text(content, "message content")?;

        let message = Message::user(pool_id, user_id.to_string(), content, now);
        self.store.insert_message(&message).await?;
        Ok(message)
    }

    /// The latest messages of a pool in chronological order. Member only.
    pub async fn pool_messages(
        &self,
        pool_id: Uuid,
        limit: Option<u64>,
        user_id: &str,
    ) -> ResultEngine<Vec<Message>> {
        self.require_pool(pool_id).await?;
        self.require_member(pool_id, user_id).await?;
        self.store
            .pool_messages(pool_id, limit.unwrap_or(RECENT_MESSAGES))
            .await
    }
}
