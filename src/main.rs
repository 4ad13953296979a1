use actboard::{
    cache::InMemoryCache, config::AppConfig, db, routes, services, AppState,
};

use services::HttpActivitySource;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "actboard=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(environment = %config.environment, "configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let source = Arc::new(HttpActivitySource::new(config.source.clone()));
    let email_service = services::create_email_service();
    let cache = Arc::new(InMemoryCache::new());

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));

    let state = AppState::new(config, pool, email_service, source, cache);
    let app = routes::router(state);

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
