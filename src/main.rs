use anyhow::Result;
use energy_demand_predictor::{api, config::Config, state::AppState, telemetry};
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    if cfg.weather.access_key.is_empty() {
        warn!(
            "weather provider access key is empty - set EDP__WEATHER__ACCESS_KEY or every \
            upstream call will be rejected"
        );
    }

    let state = AppState::new(cfg.clone());

    if state.predictor.is_degraded() {
        warn!("model artifacts missing or unreadable - every prediction will report failure");
    }

    let app = api::router(state, &cfg);

    let addr = cfg.server.socket_addr()?;
    info!(%addr, "starting energy demand predictor");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
