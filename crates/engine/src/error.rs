//! The module contains the error the engine can throw.
//!
//! Most operations classify their failures into one of:
//!
//! - [`NotFound`] when a referenced pool, member or invitation does not exist.
//! - [`InvalidState`] when an operation is valid in general but not for the
//!   current state of the entity (completed rotation, settled payout, ...).
//! - [`Expired`] when a time-bounded artifact is past its deadline.
//! - [`Unauthorized`] when the caller has no valid identity for the operation.
//! - [`Conflict`] when a uniqueness rule would be violated.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`Expired`]: EngineError::Expired
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("expired: {0}")]
    Expired(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("payment processor error: {0}")]
    Processor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::Expired(a), Self::Expired(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Processor(a), Self::Processor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
