//! API server entry point.

use std::sync::Arc;

use api::auth::JwtIdentity;
use api::config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::{InMemoryRecordStore, PostgresRecordStore};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve(app: axum::Router, config: &Config) {
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

async fn build_app(
    config: &Config,
    identity: JwtIdentity,
    metrics_handle: PrometheusHandle,
) -> axum::Router {
    let registry = Arc::new(domain::collection_registry());

    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to Postgres");
            let store = PostgresRecordStore::new(pool, registry);
            store.run_migrations().await.expect("migrations failed");
            store.ensure_indexes().await.expect("index setup failed");
            tracing::info!("using Postgres record store");

            api::create_app(api::create_default_state(store, identity), metrics_handle)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory record store");
            let store = InMemoryRecordStore::new(registry);

            api::create_app(api::create_default_state(store, identity), metrics_handle)
        }
    }
}

#[tokio::main]
async fn main() {
    // 1. Load configuration (including .env)
    let config = Config::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 3. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Select the record store and build the application
    let identity = JwtIdentity::new(&config.jwt_secret, config.token_ttl_secs);
    let app = build_app(&config, identity, metrics_handle).await;

    // 5. Start server
    serve(app, &config).await;
}
