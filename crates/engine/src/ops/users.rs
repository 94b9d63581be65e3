use chrono::{DateTime, Utc};

use crate::{EngineError, ResultEngine, Session, User};

use super::{Engine, normalize_email, normalize_optional_text};

impl Engine {
    /// Log a user in by email, creating the account on first sight, and
    /// issue a fresh session token.
    pub async fn login(
        &self,
        email: &str,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<(User, Session)> {
        let email = normalize_email(email)?;
        let display_name = normalize_optional_text(display_name);

        let user = match self.store.user_by_email(&email).await? {
            Some(mut user) => {
                if let Some(name) = display_name {
                    user.display_name = name;
                }
                user.updated_at = now;
                self.store.update_user(&user).await?;
                user
            }
            None => {
                let local_part = email.split('@').next().unwrap_or_default().to_string();
                let user = User::new(email, display_name.unwrap_or(local_part), now);
                self.store.insert_user(&user).await?;
                user
            }
        };

        let session = Session::new(user.id.clone(), now);
        self.store.insert_session(&session).await?;
        Ok((user, session))
    }

    /// Resolve a session token to its user. Expired sessions are deleted
    /// on the way out.
    pub async fn authenticate(&self, token: &str, now: DateTime<Utc>) -> ResultEngine<User> {
        let session = self
            .store
            .session(token)
            .await?
            .ok_or_else(|| EngineError::Unauthorized("invalid session token".to_string()))?;
        if session.is_expired(now) {
            self.store.delete_session(&session.token).await?;
            return Err(EngineError::Unauthorized("session expired".to_string()));
        }
        self.store
            .user(&session.user_id)
            .await?
            .ok_or_else(|| EngineError::Unauthorized("invalid session token".to_string()))
    }

    /// End a session. Unknown tokens are fine; logout is idempotent.
    pub async fn logout(&self, token: &str) -> ResultEngine<()> {
        self.store.delete_session(token).await
    }

    /// Edit the caller's own profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        phone: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<User> {
        let mut user = self.require_user(user_id).await?;
        if let Some(name) = normalize_optional_text(display_name) {
            user.display_name = name;
        }
        if let Some(phone) = normalize_optional_text(phone) {
            user.phone = Some(phone);
        }
        user.updated_at = now;
        self.store.update_user(&user).await?;
        Ok(user)
    }
}
