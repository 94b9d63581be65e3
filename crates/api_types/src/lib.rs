use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub display_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        /// Bearer token for the `Authorization` header.
        pub token: String,
        pub user: UserView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub email: String,
        pub display_name: String,
        pub phone: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// Request body for editing the caller's profile.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub display_name: Option<String>,
        pub phone: Option<String>,
    }
}

pub mod pool {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolNew {
        pub name: String,
        pub description: Option<String>,
        /// Monthly contribution in minor units (cents).
        pub monthly_amount_minor: i64,
        pub start_date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub monthly_amount_minor: i64,
        pub admin_id: String,
        pub is_active: bool,
        /// Position of the next member in line for the pot.
        pub current_round: i32,
        pub start_date: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }

    /// Request body for editing a pool. Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolListResponse {
        pub pools: Vec<PoolView>,
    }

    /// The pool detail view.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolOverviewResponse {
        pub pool: PoolView,
        pub members: Vec<super::member::MemberView>,
        pub messages: Vec<super::message::MessageView>,
        pub payouts: Vec<super::payout::PayoutView>,
    }
}

pub mod member {
    use super::*;

    /// A rotation slot joined with the member's profile.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: String,
        pub email: String,
        pub display_name: String,
        pub position: i32,
        pub has_received: bool,
        pub joined_at: DateTime<Utc>,
    }
}

pub mod message {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MessageKind {
        User,
        System,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageNew {
        pub content: String,
    }

    /// Query parameters for the message listing.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageList {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageView {
        pub id: Uuid,
        pub sender_id: String,
        pub content: String,
        pub kind: MessageKind,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageListResponse {
        pub messages: Vec<MessageView>,
    }
}

pub mod invitation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InvitationStatus {
        Pending,
        Accepted,
        Expired,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationNew {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationView {
        pub id: Uuid,
        pub pool_id: Uuid,
        pub email: String,
        /// Single-use token the invitee redeems on the accept endpoint.
        pub token: String,
        pub status: InvitationStatus,
        pub expires_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationListResponse {
        pub invitations: Vec<InvitationView>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentStatus {
        Pending,
        Completed,
        Failed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub pool_id: Uuid,
        pub user_id: String,
        pub amount_minor: i64,
        pub status: PaymentStatus,
        /// The contribution period this payment covers.
        pub for_month: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentListResponse {
        pub payments: Vec<PaymentView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentIntentResponse {
        /// Handed to the client-side processor SDK to collect the charge.
        pub client_secret: String,
        pub payment: PaymentView,
    }

    /// Settlement callback delivered by the processor.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WebhookEvent {
        #[serde(rename = "type")]
        pub kind: String,
        pub data: WebhookData,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WebhookData {
        pub object: WebhookObject,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WebhookObject {
        /// The payment intent id the event refers to.
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WebhookAck {
        pub received: bool,
    }
}

pub mod payout {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PayoutStatus {
        Pending,
        Completed,
        Failed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayoutNew {
        pub recipient_id: String,
        /// Defaults to the pool's current round.
        pub round: Option<i32>,
        pub scheduled_for: DateTime<Utc>,
    }

    /// Request body for settling a payout.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayoutUpdate {
        pub status: PayoutStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayoutView {
        pub id: Uuid,
        pub pool_id: Uuid,
        pub recipient_id: String,
        pub amount_minor: i64,
        pub round: i32,
        pub status: PayoutStatus,
        pub scheduled_for: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }
}
