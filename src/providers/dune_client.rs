use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::types::{DuneExecuteResponse, DuneResultsResponse, ExecutionState};
use super::TradeHistorySource;
use crate::config::AppConfig;
use crate::models::SwapTransaction;

const API_KEY_HEADER: &str = "X-Dune-API-Key";

#[derive(Debug, Error)]
pub enum DuneClientError {
    #[error("Dune API key is not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("query execution {execution_id} failed: {reason}")]
    ExecutionFailed {
        execution_id: String,
        reason: String,
    },

    #[error("query did not complete after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("polling cancelled")]
    Cancelled,
}

/// Fixed-interval completion poll settings.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// Client for Dune's asynchronous query-execution API.
///
/// A saved, parameterized swap-history query is executed for the wallet and
/// the execution is polled until it completes, fails, or the poll budget
/// runs out.
#[derive(Debug, Clone)]
pub struct DuneClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    query_id: u64,
    poll: PollSettings,
}

impl DuneClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        query_id: u64,
        poll: PollSettings,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            query_id,
            poll,
        }
    }

    pub fn from_config(http: Client, config: &AppConfig) -> Self {
        Self::new(
            http,
            config.dune_api_base.clone(),
            config.dune_api_key.clone(),
            config.dune_query_id,
            PollSettings {
                interval: config.poll_interval(),
                max_attempts: config.dune_max_poll_attempts,
            },
        )
    }

    /// Submit the swap-history query and return the execution id.
    async fn execute(&self, api_key: &str, wallet: &str, limit: u32) -> Result<String, DuneClientError> {
        let url = format!("{}/query/{}/execute", self.base_url, self.query_id);
        let body = json!({
            "query_parameters": {
                "wallet_address": wallet.to_lowercase(),
                "limit": limit,
            }
        });

        let resp: DuneExecuteResponse = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.execution_id)
    }

    async fn get_results(
        &self,
        api_key: &str,
        execution_id: &str,
    ) -> Result<DuneResultsResponse, DuneClientError> {
        let url = format!("{}/execution/{}/results", self.base_url, execution_id);
        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    /// Fetch swaps for `wallet`, in the order the provider returns them.
    pub async fn get_swaps(
        &self,
        wallet: &str,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<SwapTransaction>, DuneClientError> {
        let api_key = self.api_key.as_deref().ok_or(DuneClientError::MissingApiKey)?;
        if cancel.is_cancelled() {
            return Err(DuneClientError::Cancelled);
        }

        let execution_id =
            until_cancelled(cancel, self.execute(api_key, wallet, limit)).await?;
        tracing::debug!(wallet, execution_id = %execution_id, "Dune query submitted");

        for attempt in 1..=self.poll.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(execution_id = %execution_id, attempt, "Dune poll cancelled");
                    return Err(DuneClientError::Cancelled);
                }
                _ = tokio::time::sleep(self.poll.interval) => {}
            }

            counter!("dune_poll_attempts_total").increment(1);
            let resp = until_cancelled(cancel, self.get_results(api_key, &execution_id)).await?;

            match ExecutionState::from_api_str(&resp.state) {
                ExecutionState::Completed => {
                    let now = Utc::now();
                    let rows = resp.result.map(|r| r.rows).unwrap_or_default();
                    tracing::info!(
                        wallet,
                        execution_id = %execution_id,
                        attempt,
                        rows = rows.len(),
                        "Dune query completed"
                    );
                    return Ok(rows.into_iter().map(|row| row.into_transaction(now)).collect());
                }
                ExecutionState::Failed => {
                    let reason = resp
                        .error
                        .and_then(|e| e.message)
                        .unwrap_or_else(|| resp.state.clone());
                    return Err(DuneClientError::ExecutionFailed {
                        execution_id,
                        reason,
                    });
                }
                state => {
                    tracing::debug!(execution_id = %execution_id, attempt, ?state, "Dune query still running");
                }
            }
        }

        tracing::warn!(
            execution_id = %execution_id,
            attempts = self.poll.max_attempts,
            "Dune query timed out"
        );
        Err(DuneClientError::Timeout {
            attempts: self.poll.max_attempts,
        })
    }
}

/// Race an upstream call against `cancel`; the call is dropped on cancel.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    call: impl std::future::Future<Output = Result<T, DuneClientError>>,
) -> Result<T, DuneClientError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DuneClientError::Cancelled),
        result = call => result,
    }
}

#[async_trait]
impl TradeHistorySource for DuneClient {
    async fn fetch_swaps(
        &self,
        wallet: &str,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<SwapTransaction>, DuneClientError> {
        self.get_swaps(wallet, limit, cancel).await
    }
}
