use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Storage;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tontine={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let store = match parse_storage(&server.storage).await {
                Ok(store) => store,
                Err(err) => {
                    tracing::error!("failed to initialize storage: {err}");
                    return;
                }
            };

            let mut builder = engine::Engine::builder().store(store);
            let mut webhook_secret = None;
            if let Some(processor) = server.processor {
                builder = builder.processor(Arc::new(server::HttpProcessor::new(
                    processor.base_url,
                    processor.secret_key,
                )));
                webhook_secret = Some(processor.webhook_secret);
            }
            let engine = match builder.build() {
                Ok(engine) => engine,
                Err(err) => {
                    tracing::error!("failed to build engine: {err}");
                    return;
                }
            };

            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(engine, webhook_secret, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_storage(
    config: &settings::Storage,
) -> Result<Arc<dyn engine::store::Store>, Box<dyn std::error::Error + Send + Sync>> {
    match config {
        Storage::Memory => Ok(Arc::new(engine::store::MemStore::new())),
        Storage::Sqlite(path) => {
            let url = format!("sqlite:{}?mode=rwc", path);
            let database = sea_orm::Database::connect(url).await?;
            Migrator::up(&database, None).await?;
            Ok(Arc::new(engine::store::DbStore::new(database)))
        }
    }
}
