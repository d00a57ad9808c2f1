use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::providers::dune_client::DuneClientError;
use crate::providers::oneinch_client::QuoteClientError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("{provider} timed out after {attempts} attempts")]
    UpstreamTimeout { provider: String, attempts: u32 },

    #[error("{provider} request failed: {message}")]
    UpstreamFailure { provider: String, message: String },

    #[error("{provider} rate limit exceeded")]
    RateLimited { provider: String },

    #[error("Unresolved token symbol: {0}")]
    UnresolvedToken(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::MissingCredential(_) => "MissingCredential",
            AppError::UpstreamTimeout { .. } => "UpstreamTimeout",
            AppError::UpstreamFailure { .. } => "UpstreamFailure",
            AppError::RateLimited { .. } => "RateLimited",
            AppError::UnresolvedToken(_) => "UnresolvedToken",
            AppError::Cancelled => "Cancelled",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::UnresolvedToken(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingCredential(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
            AppError::Cancelled | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    error_kind: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
                error_kind: self.kind(),
            }),
        )
            .into_response()
    }
}

impl From<DuneClientError> for AppError {
    fn from(e: DuneClientError) -> Self {
        match e {
            DuneClientError::MissingApiKey => {
                AppError::MissingCredential("DUNE_API_KEY is required to fetch transactions".into())
            }
            DuneClientError::Timeout { attempts } => AppError::UpstreamTimeout {
                provider: "Dune".into(),
                attempts,
            },
            DuneClientError::Cancelled => AppError::Cancelled,
            other => AppError::UpstreamFailure {
                provider: "Dune".into(),
                message: other.to_string(),
            },
        }
    }
}

impl From<QuoteClientError> for AppError {
    fn from(e: QuoteClientError) -> Self {
        match e {
            QuoteClientError::RateLimited => AppError::RateLimited {
                provider: "1inch".into(),
            },
            QuoteClientError::UnresolvedToken(symbol) => AppError::UnresolvedToken(symbol),
            other => AppError::UpstreamFailure {
                provider: "1inch".into(),
                message: other.to_string(),
            },
        }
    }
}
