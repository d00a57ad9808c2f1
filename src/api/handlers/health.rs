use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Liveness plus which upstream credentials are configured. Providers are not
/// contacted.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "duneConfigured": state.config.dune_api_key.is_some(),
        "oneinchAuthenticated": state.config.oneinch_api_key.is_some(),
    }))
}
