use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use swingdesk_broker::config::BrokerConfig;
use swingdesk_broker::infra::fyers::FyersAuthClient;
use swingdesk_broker::router::build_router;
use swingdesk_broker::state::AppState;
use swingdesk_broker::sweeper;
use swingdesk_broker::usecase::lifecycle::RefreshGate;
use swingdesk_broker_migration::Migrator;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = BrokerConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");

    let state = AppState {
        db,
        fyers: FyersAuthClient::new(&config.fyers_base_url),
        jwt_secret: config.jwt_secret,
        tenant_user_id: config.tenant_user_id,
        refresh_gate: RefreshGate::new(),
    };

    let shutdown = CancellationToken::new();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for shutdown signal");
        info!("shutdown signal received");
        signal_shutdown.cancel();
    });

    let sweeper_handle = tokio::spawn(sweeper::run(state.clone(), shutdown.clone()));

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.broker_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("broker listening on {addr}");
    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await
        .expect("server error");

    let _ = sweeper_handle.await;
}
