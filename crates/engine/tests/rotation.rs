use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use sea_orm::Database;

use engine::store::{DbStore, MemStore};
use engine::{Engine, EngineError, InvitationStatus, MoneyCents};
use migration::MigratorTrait;

const MONTHLY: MoneyCents = MoneyCents::new(10_000);

fn mem_engine() -> Engine {
    Engine::builder()
        .store(Arc::new(MemStore::new()))
        .build()
        .unwrap()
}

async fn db_engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .store(Arc::new(DbStore::new(db)))
        .build()
        .unwrap()
}

async fn user_id(engine: &Engine, email: &str) -> String {
    let (user, _session) = engine.login(email, None, Utc::now()).await.unwrap();
    user.id
}

async fn pool_with_admin(engine: &Engine, admin: &str) -> engine::Pool {
    engine
        .create_pool(
            "Family Circle",
            None,
            MONTHLY,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            admin,
            Utc::now(),
        )
        .await
        .unwrap()
}

async fn rotation_scenario(engine: Engine) {
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    assert_eq!(pool.current_round, 1);

    let invitation = engine
        .invite(pool.id, "bea@example.com", &ana, Utc::now())
        .await
        .unwrap();
    let member = engine
        .accept_invitation(&invitation.token, &bea, Utc::now())
        .await
        .unwrap();
    assert_eq!(member.position, 2);

    let members = engine.list_members(pool.id, &ana).await.unwrap();
    let positions: Vec<i32> = members.iter().map(|(m, _)| m.position).collect();
    assert_eq!(positions, vec![1, 2]);
    assert!(members.iter().all(|(m, _)| !m.has_received));

    let pool_state = engine
        .advance_round(pool.id, &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(pool_state.current_round, 2);
    let members = engine.list_members(pool.id, &ana).await.unwrap();
    assert!(members[0].0.has_received);
    assert!(!members[1].0.has_received);

    let pool_state = engine
        .advance_round(pool.id, &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(pool_state.current_round, 3);
    let members = engine.list_members(pool.id, &ana).await.unwrap();
    assert!(members[1].0.has_received);

    let err = engine
        .advance_round(pool.id, &ana, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn rotation_runs_in_member_order_in_memory() {
    rotation_scenario(mem_engine()).await;
}

#[tokio::test]
async fn rotation_runs_in_member_order_on_sqlite() {
    rotation_scenario(db_engine().await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_never_share_a_position() {
    let engine = Arc::new(mem_engine());
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let mut joiners = Vec::new();
    for i in 0..4 {
        joiners.push(user_id(&engine, &format!("member{i}@example.com")).await);
    }

    let mut handles = Vec::new();
    for joiner in joiners {
        let engine = Arc::clone(&engine);
        let pool_id = pool.id;
        handles.push(tokio::spawn(async move {
            engine.add_member(pool_id, &joiner, Utc::now()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let members = engine.list_members(pool.id, &ana).await.unwrap();
    let positions: Vec<i32> = members.iter().map(|(m, _)| m.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn advancing_skips_positions_vacated_by_removed_members() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let carla = user_id(&engine, "carla@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    engine.add_member(pool.id, &bea, Utc::now()).await.unwrap();
    engine.add_member(pool.id, &carla, Utc::now()).await.unwrap();

    engine.remove_member(pool.id, &bea, &ana).await.unwrap();

    let pool_state = engine
        .advance_round(pool.id, &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(pool_state.current_round, 2);

    // Position 2 is a gap now; the pot moves straight to position 3.
    let pool_state = engine
        .advance_round(pool.id, &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(pool_state.current_round, 4);

    let err = engine
        .advance_round(pool.id, &ana, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn joining_the_same_pool_twice_is_a_conflict() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    engine.add_member(pool.id, &bea, Utc::now()).await.unwrap();
    let err = engine
        .add_member(pool.id, &bea, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn an_invitation_token_is_single_use() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let carla = user_id(&engine, "carla@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    let invitation = engine
        .invite(pool.id, "bea@example.com", &ana, Utc::now())
        .await
        .unwrap();

    engine
        .accept_invitation(&invitation.token, &bea, Utc::now())
        .await
        .unwrap();

    let err = engine
        .accept_invitation(&invitation.token, &carla, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn an_expired_invitation_is_rejected_while_still_pending() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    let invitation = engine
        .invite(pool.id, "bea@example.com", &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);

    let later = Utc::now() + Duration::days(8);
    let err = engine
        .accept_invitation(&invitation.token, &bea, later)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Expired(_)));

    // The failed attempt flips the row, so later tries see a dead token.
    let err = engine
        .accept_invitation(&invitation.token, &bea, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn only_the_admin_advances_the_rotation() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    engine.add_member(pool.id, &bea, Utc::now()).await.unwrap();

    let err = engine
        .advance_round(pool.id, &bea, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn the_admin_seat_cannot_be_removed() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let err = engine.remove_member(pool.id, &ana, &ana).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn outsiders_cannot_read_a_pool() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let carla = user_id(&engine, "carla@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let err = engine.pool_overview(pool.id, &carla).await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn the_overview_gathers_members_and_board_messages() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    engine
        .post_message(pool.id, "welcome to the circle", &ana, Utc::now())
        .await
        .unwrap();

    let overview = engine.pool_overview(pool.id, &ana).await.unwrap();
    assert_eq!(overview.members.len(), 1);
    assert_eq!(overview.messages.len(), 1);
    assert_eq!(overview.messages[0].content, "welcome to the circle");
    assert!(overview.payouts.is_empty());
}
