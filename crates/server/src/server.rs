use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;

use std::sync::Arc;

use crate::{auth as auth_api, invitations, members, messages, payments, payouts, pools};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub webhook_secret: Option<String>,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = state
        .engine
        .authenticate(auth_header.token(), Utc::now())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let mut protected = Router::new()
        .route("/auth/logout", post(auth_api::logout))
        .route(
            "/auth/user",
            get(auth_api::profile).patch(auth_api::update_profile),
        )
        .route("/pools", post(pools::create).get(pools::list))
        .route("/pools/{pool_id}", get(pools::overview).patch(pools::update))
        .route("/pools/{pool_id}/join", post(members::join))
        .route(
            "/pools/{pool_id}/members/{user_id}",
            axum::routing::delete(members::remove),
        )
        .route("/pools/{pool_id}/advance", post(members::advance))
        .route(
            "/pools/{pool_id}/messages",
            get(messages::list).post(messages::send),
        )
        .route(
            "/pools/{pool_id}/invitations",
            get(invitations::list).post(invitations::create),
        )
        .route("/invitations/{token}/accept", post(invitations::accept))
        .route("/pools/{pool_id}/payments", get(payments::pool_history))
        .route("/payments", get(payments::history))
        .route("/pools/{pool_id}/payouts", post(payouts::create))
        .route("/payouts/{payout_id}", axum::routing::patch(payouts::settle));

    if state.engine.has_processor() {
        protected = protected.route(
            "/pools/{pool_id}/payment-intent",
            post(payments::create_intent),
        );
    }

    let mut public = Router::new().route("/auth/login", post(auth_api::login));
    if state.webhook_secret.is_some() {
        public = public.route("/payments/webhook", post(payments::webhook));
    }

    protected
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .merge(public)
        .with_state(state)
}

pub async fn run(engine: Engine, webhook_secret: Option<String>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, webhook_secret, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    webhook_secret: Option<String>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        webhook_secret,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    webhook_secret: Option<String>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, webhook_secret, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use api_types::auth::LoginResponse;
    use api_types::payment::{PaymentIntentResponse, PaymentListResponse, PaymentStatus};
    use api_types::pool::{PoolListResponse, PoolView};
    use axum::body::Body;
    use axum::http::Request;
    use engine::processor::{CreatedIntent, IntentMetadata, PaymentProcessor};
    use engine::store::MemStore;
    use engine::{MoneyCents, ResultEngine};
    use http_body_util::BodyExt;
    use sha2::{Digest, Sha256};
    use tower::ServiceExt;

    const WEBHOOK_SECRET: &str = "whsec_test";

    struct StubProcessor;

    #[async_trait::async_trait]
    impl PaymentProcessor for StubProcessor {
        async fn create_intent(
            &self,
            _amount: MoneyCents,
            _currency: &str,
            _metadata: IntentMetadata,
        ) -> ResultEngine<CreatedIntent> {
            Ok(CreatedIntent {
                intent_id: "pi_stub_1".to_string(),
                client_secret: "cs_stub_1".to_string(),
            })
        }
    }

    fn app(with_processor: bool, webhook_secret: Option<String>) -> Router {
        let mut builder = Engine::builder().store(Arc::new(MemStore::new()));
        if with_processor {
            builder = builder.processor(Arc::new(StubProcessor));
        }
        let engine = builder.build().unwrap();
        router(ServerState {
            engine: Arc::new(engine),
            webhook_secret,
        })
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router, email: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post("/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(r#"{{"email":"{email}"}}"#)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let login: LoginResponse = body_json(response).await;
        login.token
    }

    async fn create_pool(app: &Router, token: &str, name: &str) -> PoolView {
        let body = format!(
            r#"{{"name":"{name}","monthly_amount_minor":10000,"start_date":"2026-01-01T00:00:00Z"}}"#
        );
        let response = app
            .clone()
            .oneshot(
                Request::post("/pools")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        body_json(response).await
    }

    fn signature_for(secret: &str, body: &str) -> String {
        let timestamp = Utc::now().timestamp().to_string();
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.update(b".");
        hasher.update(timestamp.as_bytes());
        hasher.update(b".");
        hasher.update(body.as_bytes());
        format!("t={timestamp},v1={}", hex::encode(hasher.finalize()))
    }

    #[tokio::test]
    async fn login_issues_a_usable_token() {
        let app = app(false, None);
        let token = login(&app, "ana@example.com").await;

        let response = app
            .clone()
            .oneshot(
                Request::get("/auth/user")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let profile: api_types::auth::UserView = body_json(response).await;
        assert_eq!(profile.email, "ana@example.com");
    }

    #[tokio::test]
    async fn unknown_tokens_are_rejected() {
        let app = app(false, None);

        let response = app
            .oneshot(
                Request::get("/pools")
                    .header("authorization", "Bearer not-a-session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn created_pools_show_up_in_the_listing() {
        let app = app(false, None);
        let token = login(&app, "ana@example.com").await;
        let pool = create_pool(&app, &token, "Family Circle").await;
        assert_eq!(pool.current_round, 1);

        let response = app
            .clone()
            .oneshot(
                Request::get("/pools")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listing: PoolListResponse = body_json(response).await;
        assert_eq!(listing.pools.len(), 1);
        assert_eq!(listing.pools[0].name, "Family Circle");
    }

    #[tokio::test]
    async fn payment_routes_stay_unmounted_without_a_processor() {
        let app = app(false, None);
        let token = login(&app, "ana@example.com").await;
        let pool = create_pool(&app, &token, "Family Circle").await;

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/pools/{}/payment-intent", pool.id))
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::post("/payments/webhook")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn contribution_settles_through_the_signed_webhook() {
        let app = app(true, Some(WEBHOOK_SECRET.to_string()));
        let token = login(&app, "ana@example.com").await;
        let pool = create_pool(&app, &token, "Family Circle").await;

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/pools/{}/payment-intent", pool.id))
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let intent: PaymentIntentResponse = body_json(response).await;
        assert_eq!(intent.client_secret, "cs_stub_1");
        assert_eq!(intent.payment.status, PaymentStatus::Pending);

        let event = r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_stub_1"}}}"#;
        let response = app
            .clone()
            .oneshot(
                Request::post("/payments/webhook")
                    .header("processor-signature", signature_for(WEBHOOK_SECRET, event))
                    .body(Body::from(event))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::get("/payments")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let history: PaymentListResponse = body_json(response).await;
        assert_eq!(history.payments.len(), 1);
        assert_eq!(history.payments[0].status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn webhooks_with_a_bad_signature_are_rejected() {
        let app = app(true, Some(WEBHOOK_SECRET.to_string()));

        let event = r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_stub_1"}}}"#;
        let response = app
            .oneshot(
                Request::post("/payments/webhook")
                    .header("processor-signature", signature_for("whsec_wrong", event))
                    .body(Body::from(event))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
