use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{TimeZone, Utc};
use sea_orm::Database;

use engine::processor::{CreatedIntent, IntentMetadata, IntentOutcome, PaymentProcessor};
use engine::store::{DbStore, MemStore};
use engine::{
    Engine, EngineError, MessageKind, MoneyCents, PaymentStatus, PayoutStatus, ResultEngine,
};
use migration::MigratorTrait;

const MONTHLY: MoneyCents = MoneyCents::new(100);

#[derive(Default)]
struct StubProcessor {
    counter: AtomicU64,
}

#[async_trait::async_trait]
impl PaymentProcessor for StubProcessor {
    async fn create_intent(
        &self,
        _amount: MoneyCents,
        _currency: &str,
        _metadata: IntentMetadata,
    ) -> ResultEngine<CreatedIntent> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(CreatedIntent {
            intent_id: format!("pi_{n}"),
            client_secret: format!("cs_{n}"),
        })
    }
}

fn mem_engine() -> Engine {
    Engine::builder()
        .store(Arc::new(MemStore::new()))
        .processor(Arc::new(StubProcessor::default()))
        .build()
        .unwrap()
}

async fn db_engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .store(Arc::new(DbStore::new(db)))
        .processor(Arc::new(StubProcessor::default()))
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

fn mid_january() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
}

async fn contribution_scenario(engine: Engine) {
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let (payment, intent) = engine
        .record_contribution(pool.id, mid_january(), &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, MONTHLY);
    assert!(payment.completed_at.is_none());

    engine
        .settle_contribution(&intent.intent_id, IntentOutcome::Succeeded, Utc::now())
        .await
        .unwrap();
    let settled = engine.pool_payments(pool.id, &ana).await.unwrap().remove(0);
    assert_eq!(settled.status, PaymentStatus::Completed);
    let completed_at = settled.completed_at.expect("completion timestamp");

    // A replayed delivery must not touch the settled row.
    engine
        .settle_contribution(&intent.intent_id, IntentOutcome::Failed, Utc::now())
        .await
        .unwrap();
    let replayed = engine.pool_payments(pool.id, &ana).await.unwrap().remove(0);
    assert_eq!(replayed.status, PaymentStatus::Completed);
    assert_eq!(replayed.completed_at, Some(completed_at));
}

#[tokio::test]
async fn a_contribution_settles_once_in_memory() {
    contribution_scenario(mem_engine()).await;
}

#[tokio::test]
async fn a_contribution_settles_once_on_sqlite() {
    contribution_scenario(db_engine().await).await;
}

#[tokio::test]
async fn a_failed_intent_marks_the_payment_failed() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let (_payment, intent) = engine
        .record_contribution(pool.id, mid_january(), &ana, Utc::now())
        .await
        .unwrap();
    engine
        .settle_contribution(&intent.intent_id, IntentOutcome::Failed, Utc::now())
        .await
        .unwrap();

    let payment = engine.my_payments(&ana).await.unwrap().remove(0);
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert!(payment.completed_at.is_none());
}

#[tokio::test]
async fn settling_an_unknown_intent_is_a_no_op() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    pool_with_admin(&engine, &ana).await;

    engine
        .settle_contribution("pi_missing", IntentOutcome::Succeeded, Utc::now())
        .await
        .unwrap();
    assert!(engine.my_payments(&ana).await.unwrap().is_empty());
}

#[tokio::test]
async fn a_successful_contribution_posts_a_system_note() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let (_payment, intent) = engine
        .record_contribution(pool.id, mid_january(), &ana, Utc::now())
        .await
        .unwrap();
    engine
        .settle_contribution(&intent.intent_id, IntentOutcome::Succeeded, Utc::now())
        .await
        .unwrap();

    let messages = engine.pool_messages(pool.id, None, &ana).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::System);
    assert_eq!(messages[0].content, "Payment received successfully");
}

#[tokio::test]
async fn contributions_need_a_configured_processor() {
    let engine = Engine::builder()
        .store(Arc::new(MemStore::new()))
        .build()
        .unwrap();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let err = engine
        .record_contribution(pool.id, mid_january(), &ana, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

async fn payout_release_scenario(engine: Engine) {
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    engine.add_member(pool.id, &bea, Utc::now()).await.unwrap();

    let payout = engine
        .record_payout(pool.id, &ana, None, mid_january(), &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(payout.round, 1);
    assert_eq!(payout.amount.cents(), 200);
    assert_eq!(payout.status, PayoutStatus::Pending);

    // Nobody has paid January yet, so the pot stays locked.
    let err = engine
        .settle_payout(payout.id, PayoutStatus::Completed, &ana, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    for member in [&ana, &bea] {
        let (_payment, intent) = engine
            .record_contribution(pool.id, mid_january(), member, Utc::now())
            .await
            .unwrap();
        engine
            .settle_contribution(&intent.intent_id, IntentOutcome::Succeeded, Utc::now())
            .await
            .unwrap();
    }

    let settled = engine
        .settle_payout(payout.id, PayoutStatus::Completed, &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(settled.status, PayoutStatus::Completed);
    assert!(settled.completed_at.is_some());
}

#[tokio::test]
async fn a_payout_completes_only_when_the_month_is_funded_in_memory() {
    payout_release_scenario(mem_engine()).await;
}

#[tokio::test]
async fn a_payout_completes_only_when_the_month_is_funded_on_sqlite() {
    payout_release_scenario(db_engine().await).await;
}

#[tokio::test]
async fn a_settled_payout_stays_settled() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let payout = engine
        .record_payout(pool.id, &ana, None, mid_january(), &ana, Utc::now())
        .await
        .unwrap();
    let failed = engine
        .settle_payout(payout.id, PayoutStatus::Failed, &ana, Utc::now())
        .await
        .unwrap();
    assert_eq!(failed.status, PayoutStatus::Failed);
    assert!(failed.completed_at.is_none());

    let err = engine
        .settle_payout(payout.id, PayoutStatus::Completed, &ana, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn a_payout_cannot_be_settled_back_to_pending() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let payout = engine
        .record_payout(pool.id, &ana, None, mid_january(), &ana, Utc::now())
        .await
        .unwrap();
    let err = engine
        .settle_payout(payout.id, PayoutStatus::Pending, &ana, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn only_the_admin_records_payouts() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let bea = user_id(&engine, "bea@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;
    engine.add_member(pool.id, &bea, Utc::now()).await.unwrap();

    let err = engine
        .record_payout(pool.id, &bea, None, mid_january(), &bea, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn payouts_to_outsiders_are_refused() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let carla = user_id(&engine, "carla@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let err = engine
        .record_payout(pool.id, &carla, None, mid_january(), &ana, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn upcoming_payouts_come_back_soonest_first() {
    let engine = mem_engine();
    let ana = user_id(&engine, "ana@example.com").await;
    let pool = pool_with_admin(&engine, &ana).await;

    let far = engine
        .record_payout(
            pool.id,
            &ana,
            Some(2),
            Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap(),
            &ana,
            Utc::now(),
        )
        .await
        .unwrap();
    let near = engine
        .record_payout(
            pool.id,
            &ana,
            Some(1),
            Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap(),
            &ana,
            Utc::now(),
        )
        .await
        .unwrap();

    let upcoming = engine.upcoming_payouts().await.unwrap();
    let ids: Vec<_> = upcoming.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![near.id, far.id]);

    engine
        .settle_payout(near.id, PayoutStatus::Failed, &ana, Utc::now())
        .await
        .unwrap();
    let upcoming = engine.upcoming_payouts().await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, far.id);
}
