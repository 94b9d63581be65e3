pub use error::EngineError;
pub use invitations::{INVITATION_TTL_DAYS, Invitation, InvitationStatus};
pub use messages::{Message, MessageKind};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, PoolOverview};
pub use payments::{Payment, PaymentStatus};
pub use payouts::{Payout, PayoutStatus};
pub use pool_members::PoolMember;
pub use pools::Pool;
pub use sessions::{SESSION_TTL_DAYS, Session};
pub use users::User;

pub mod processor;
pub mod store;

mod error;
mod invitations;
mod messages;
mod money;
mod ops;
mod payments;
mod payouts;
mod pool_members;
mod pools;
mod sessions;
mod token;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
