use swap_analyzer::api::router::create_router;
use swap_analyzer::config::AppConfig;
use swap_analyzer::metrics::init_metrics;
use swap_analyzer::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    config.log_credential_status();
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = init_metrics()?;
    let state = AppState::from_config(config, metrics_handle)?;
    let shutdown = state.shutdown.clone();

    tracing::info!(
        dune_query_id = state.config.dune_query_id,
        chain_id = state.config.chain_id,
        "Swap analyzer configured"
    );

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown requested, cancelling in-flight requests");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

/// `LOG_FORMAT=json` switches to structured JSON lines.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}
