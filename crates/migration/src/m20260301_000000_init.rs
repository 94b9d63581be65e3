//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for Tontine:
//!
//! - `users`: one account per login email
//! - `pools`: rotating savings groups
//! - `pool_members`: rotation slots, one position per member
//! - `payments`: monthly contributions and their processor state
//! - `payouts`: pot disbursements, one per round
//! - `messages`: pool chat, user posts and system notes
//! - `invitations`: tokened invites with an expiry
//! - `sessions`: bearer login sessions

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    ProcessorCustomerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Pools {
    Table,
    Id,
    Name,
    Description,
    MonthlyAmount,
    AdminId,
    IsActive,
    CurrentRound,
    StartDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PoolMembers {
    Table,
    Id,
    PoolId,
    UserId,
    Position,
    HasReceived,
    JoinedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    PoolId,
    UserId,
    Amount,
    Status,
    ForMonth,
    IntentId,
    CompletedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Payouts {
    Table,
    Id,
    PoolId,
    RecipientId,
    Amount,
    Round,
    Status,
    ScheduledFor,
    CompletedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Messages {
    Table,
    Id,
    PoolId,
    SenderId,
    Content,
    Kind,
    CreatedAt,
}

#[derive(Iden)]
enum Invitations {
    Table,
    Id,
    PoolId,
    Email,
    Token,
    Status,
    InvitedBy,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Token,
    UserId,
    ExpiresAt,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::ProcessorCustomerId).string())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Pools
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Pools::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pools::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Pools::Name).string().not_null())
                    .col(ColumnDef::new(Pools::Description).string())
                    .col(
                        ColumnDef::new(Pools::MonthlyAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Pools::AdminId).string().not_null())
                    .col(ColumnDef::new(Pools::IsActive).boolean().not_null())
                    .col(ColumnDef::new(Pools::CurrentRound).integer().not_null())
                    .col(ColumnDef::new(Pools::StartDate).timestamp().not_null())
                    .col(ColumnDef::new(Pools::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Pools::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pools-admin_id")
                            .from(Pools::Table, Pools::AdminId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Pool Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PoolMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PoolMembers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PoolMembers::PoolId).string().not_null())
                    .col(ColumnDef::new(PoolMembers::UserId).string().not_null())
                    .col(ColumnDef::new(PoolMembers::Position).integer().not_null())
                    .col(
                        ColumnDef::new(PoolMembers::HasReceived)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PoolMembers::JoinedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pool_members-pool_id")
                            .from(PoolMembers::Table, PoolMembers::PoolId)
                            .to(Pools::Table, Pools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pool_members-user_id")
                            .from(PoolMembers::Table, PoolMembers::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pool_members-pool_id-user_id-unique")
                    .table(PoolMembers::Table)
                    .col(PoolMembers::PoolId)
                    .col(PoolMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pool_members-pool_id-position-unique")
                    .table(PoolMembers::Table)
                    .col(PoolMembers::PoolId)
                    .col(PoolMembers::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::PoolId).string().not_null())
                    .col(ColumnDef::new(Payments::UserId).string().not_null())
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Status).string().not_null())
                    .col(ColumnDef::new(Payments::ForMonth).timestamp().not_null())
                    .col(ColumnDef::new(Payments::IntentId).string())
                    .col(ColumnDef::new(Payments::CompletedAt).timestamp())
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-pool_id")
                            .from(Payments::Table, Payments::PoolId)
                            .to(Pools::Table, Pools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-user_id")
                            .from(Payments::Table, Payments::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-pool_id")
                    .table(Payments::Table)
                    .col(Payments::PoolId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-intent_id-unique")
                    .table(Payments::Table)
                    .col(Payments::IntentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Payouts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payouts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payouts::PoolId).string().not_null())
                    .col(ColumnDef::new(Payouts::RecipientId).string().not_null())
                    .col(ColumnDef::new(Payouts::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Payouts::Round).integer().not_null())
                    .col(ColumnDef::new(Payouts::Status).string().not_null())
                    .col(ColumnDef::new(Payouts::ScheduledFor).timestamp().not_null())
                    .col(ColumnDef::new(Payouts::CompletedAt).timestamp())
                    .col(ColumnDef::new(Payouts::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payouts-pool_id")
                            .from(Payouts::Table, Payouts::PoolId)
                            .to(Pools::Table, Pools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payouts-recipient_id")
                            .from(Payouts::Table, Payouts::RecipientId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payouts-pool_id")
                    .table(Payouts::Table)
                    .col(Payouts::PoolId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Messages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::PoolId).string().not_null())
                    .col(ColumnDef::new(Messages::SenderId).string().not_null())
                    .col(ColumnDef::new(Messages::Content).string().not_null())
                    .col(ColumnDef::new(Messages::Kind).string().not_null())
                    .col(ColumnDef::new(Messages::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-messages-pool_id")
                            .from(Messages::Table, Messages::PoolId)
                            .to(Pools::Table, Pools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-messages-sender_id")
                            .from(Messages::Table, Messages::SenderId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-messages-pool_id-created_at")
                    .table(Messages::Table)
                    .col(Messages::PoolId)
                    .col(Messages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Invitations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invitations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invitations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invitations::PoolId).string().not_null())
                    .col(ColumnDef::new(Invitations::Email).string().not_null())
                    .col(ColumnDef::new(Invitations::Token).string().not_null())
                    .col(ColumnDef::new(Invitations::Status).string().not_null())
                    .col(ColumnDef::new(Invitations::InvitedBy).string().not_null())
                    .col(
                        ColumnDef::new(Invitations::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invitations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invitations-pool_id")
                            .from(Invitations::Table, Invitations::PoolId)
                            .to(Pools::Table, Pools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invitations-invited_by")
                            .from(Invitations::Table, Invitations::InvitedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invitations-token-unique")
                    .table(Invitations::Table)
                    .col(Invitations::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Sessions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::UserId).string().not_null())
                    .col(ColumnDef::new(Sessions::ExpiresAt).timestamp().not_null())
                    .col(ColumnDef::new(Sessions::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sessions-user_id")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sessions-user_id")
                    .table(Sessions::Table)
                    .col(Sessions::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invitations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payouts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PoolMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
