use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::processor::PaymentProcessor;
use crate::store::Store;
use crate::{EngineError, ResultEngine};

mod access;
mod contributions;
mod invitations;
mod members;
mod messages;
mod payouts;
mod pools;
mod users;

pub use pools::PoolOverview;

pub struct Engine {
    store: Arc<dyn Store>,
    processor: Option<Arc<dyn PaymentProcessor>>,
    pool_locks: PoolLocks,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("has_processor", &self.processor.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Whether a payment processor was configured at build time.
    pub fn has_processor(&self) -> bool {
        self.processor.is_some()
    }
}

/// One async mutex per pool, created on first use. Operations that read
/// and then rewrite rotation state (member positions, `current_round`)
/// hold the pool's lock across the whole sequence, so concurrent joins and
/// advances against the same pool are serialized on every backend.
#[derive(Default)]
struct PoolLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl PoolLocks {
    async fn acquire(&self, pool_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(pool_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(EngineError::InvalidInput(
            "a valid email is required".to_string(),
        ));
    }
    Ok(trimmed)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn Store>>,
    processor: Option<Arc<dyn PaymentProcessor>>,
}

impl EngineBuilder {
    /// Pass the required storage backend
    pub fn store(mut self, store: Arc<dyn Store>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Pass the payment processor, when one is configured
    pub fn processor(mut self, processor: Arc<dyn PaymentProcessor>) -> EngineBuilder {
        self.processor = Some(processor);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let store = self.store.ok_or_else(|| {
            EngineError::InvalidInput("a storage backend is required".to_string())
        })?;
        Ok(Engine {
            store,
            processor: self.processor,
            pool_locks: PoolLocks::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_a_store() {
        assert!(Engine::builder().build().is_err());
    }

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(
            normalize_email("  Zio.Peppe@Example.COM ").unwrap(),
            "zio.peppe@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
    }
}
