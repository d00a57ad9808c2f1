use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::api::dispatch::dispatch;
use crate::errors::AppError;
use crate::AppState;

/// `POST /api/tools/:name`. The body is the tool's argument object; an empty
/// body means no arguments.
pub async fn call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let arguments: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::InvalidInput(format!("request body is not valid JSON: {e}")))?
    };

    let cancel = state.request_token();
    let output = dispatch(&state, &name, arguments, &cancel)
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(output.payload).into_response())
}
