//! Footprint - household carbon footprint calculation and analytics.
//!
//! # API Endpoints
//!
//! - `POST /users/:user_id/footprints` - Calculate a monthly footprint
//! - `GET /users/:user_id/footprints` - List a user's records
//! - `DELETE /users/:user_id/footprints` - Delete a user's records
//! - `GET /users/:user_id/analytics/monthly` - Monthly analytics
//! - `PUT /users/:user_id` - Set a user's display metadata
//! - `GET /admin/summary` - Population summary and rankings
//! - `GET /factors` - Active emission factors
//! - `GET /health` - Health check

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use footprint::api::{AppState, router};
use footprint::config::Config;
use footprint::defaults::starter_factors;
use footprint::engine::FootprintEngine;
use footprint::storage::Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("footprint=info".parse()?))
        .init();

    let config = Config::from_env();

    info!(
        port = config.port,
        db_url = %config.database_url,
        ranking_size = config.ranking_size,
        "Starting Footprint server"
    );

    let storage = Storage::new(&config.database_url).await?;
    info!("Database initialized");

    if config.seed_default_factors {
        let inserted = storage.seed_factors(&starter_factors()).await?;
        info!(inserted, "Starter emission factors seeded");
    }

    let state = AppState {
        engine: FootprintEngine::new(storage),
        ranking_size: config.ranking_size,
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Footprint is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
