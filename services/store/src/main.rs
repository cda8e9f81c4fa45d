use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use atelier_core::config::Config;
use atelier_core::tracing::init_tracing;
use atelier_store::config::StoreConfig;
use atelier_store::infra::mailer::LogMailer;
use atelier_store::router::build_router;
use atelier_store::state::{AppState, StorePolicy};
use atelier_store::usecase::token::SweepExpiredTokensUseCase;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = StoreConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        mailer: Arc::new(LogMailer),
        policy: StorePolicy::from(&config),
    };

    spawn_token_sweep(state.clone(), config.token_sweep_interval_secs);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.store_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("store service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}

/// Periodically delete expired tokens. Failures are logged and retried next tick.
fn spawn_token_sweep(state: AppState, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let usecase = SweepExpiredTokensUseCase {
                tokens: state.token_repo(),
            };
            if let Err(e) = usecase.execute().await {
                tracing::warn!(error = %e, "token sweep failed");
            }
        }
    });
}
