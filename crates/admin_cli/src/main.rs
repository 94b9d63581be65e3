use std::{error::Error, sync::Arc};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::store::{DbStore, Store};
use engine::{Engine, MoneyCents, PayoutStatus};
use migration::MigratorTrait;
use sea_orm::{
    ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub email: String,
        pub display_name: String,
        pub phone: Option<String>,
        pub processor_customer_id: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod pools {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "pools")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub description: Option<String>,
        pub monthly_amount: i64,
        pub admin_id: String,
        pub is_active: bool,
        pub current_round: i32,
        pub start_date: DateTimeUtc,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "tontine_admin")]
#[command(about = "Admin utilities for Tontine (bootstrap users, inspect pools, settle payouts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tontine.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Pool(Pool),
    Payout(Payout),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    display_name: Option<String>,
}

#[derive(Args, Debug)]
struct Pool {
    #[command(subcommand)]
    command: PoolCommand,
}

#[derive(Subcommand, Debug)]
enum PoolCommand {
    List,
}

#[derive(Args, Debug)]
struct Payout {
    #[command(subcommand)]
    command: PayoutCommand,
}

#[derive(Subcommand, Debug)]
enum PayoutCommand {
    Upcoming,
    Settle(PayoutSettleArgs),
}

#[derive(Args, Debug)]
struct PayoutSettleArgs {
    #[arg(long)]
    payout_id: Uuid,
    /// Either "completed" or "failed".
    #[arg(long)]
    status: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let email = args.email.trim().to_lowercase();
            if users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {email}");
                std::process::exit(1);
            }

            let display_name = args
                .display_name
                .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
            let now = Utc::now();
            let user = users::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                email: Set(email.clone()),
                display_name: Set(display_name),
                phone: Set(None),
                processor_customer_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {email}");
        }
        Command::Pool(Pool {
            command: PoolCommand::List,
        }) => {
            let pools = pools::Entity::find()
                .order_by_asc(pools::Column::CreatedAt)
                .all(&db)
                .await?;
            for pool in pools {
                println!(
                    "{}  {}  round {}  {}/month  {}",
                    pool.id,
                    pool.name,
                    pool.current_round,
                    MoneyCents::new(pool.monthly_amount),
                    if pool.is_active { "active" } else { "inactive" }
                );
            }
        }
        Command::Payout(Payout {
            command: PayoutCommand::Upcoming,
        }) => {
            let store = DbStore::new(db.clone());
            let engine = Engine::builder().store(Arc::new(store)).build()?;
            for payout in engine.upcoming_payouts().await? {
                println!(
                    "{}  pool {}  round {}  {} to {}  due {}",
                    payout.id,
                    payout.pool_id,
                    payout.round,
                    payout.amount,
                    payout.recipient_id,
                    payout.scheduled_for.date_naive()
                );
            }
        }
        Command::Payout(Payout {
            command: PayoutCommand::Settle(args),
        }) => {
            let status = match PayoutStatus::try_from(args.status.as_str()) {
                Ok(status) => status,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let store = DbStore::new(db.clone());
            let Some(payout) = store.payout(args.payout_id).await? else {
                eprintln!("payout not found: {}", args.payout_id);
                std::process::exit(1);
            };
            let Some(pool) = store.pool(payout.pool_id).await? else {
                eprintln!("pool not found: {}", payout.pool_id);
                std::process::exit(1);
            };

            // Settlement runs with the pool admin's authority.
            let engine = Engine::builder().store(Arc::new(store)).build()?;
            let settled = engine
                .settle_payout(args.payout_id, status, &pool.admin_id, Utc::now())
                .await?;
            println!("payout {} -> {}", settled.id, settled.status.as_str());
        }
    }

    Ok(())
}
