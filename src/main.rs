use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gear_rental_booking::booking::payment::HttpPaymentGateway;
use gear_rental_booking::booking::store::PgBookingStore;
use gear_rental_booking::cache::AppCache;
use gear_rental_booking::config::Config;
use gear_rental_booking::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gear_rental_booking=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;
    info!("Database pool ready");

    let state = AppState {
        store: Arc::new(PgBookingStore::new(pool)),
        payments: Arc::new(HttpPaymentGateway::new(
            config.payment_intent_url.clone(),
            config.payment_api_key.clone(),
        )),
        cache: AppCache::new(),
        config: Arc::new(config.clone()),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
