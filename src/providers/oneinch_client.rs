use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use super::tokens;
use super::types::value_to_decimal;
use super::QuoteSource;
use crate::config::AppConfig;
use crate::models::{QuoteRequest, QuoteResult};

/// Gas estimate used when the quote omits one.
pub const DEFAULT_ESTIMATED_GAS: u64 = 150_000;

/// Venue label used when the quote carries no routing detail.
pub const DEFAULT_PROTOCOL: &str = "1INCH";

#[derive(Debug, Error)]
pub enum QuoteClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unresolved token symbol: {0}")]
    UnresolvedToken(String),

    #[error("amount {0} cannot be represented in base units")]
    AmountOverflow(Decimal),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Build a quote request from token identifiers (address or symbol) and a
/// human-readable amount, scaling by the source token's decimals.
pub fn build_quote_request(
    src: &str,
    dst: &str,
    amount: Decimal,
) -> Result<QuoteRequest, QuoteClientError> {
    let src = tokens::resolve(src).ok_or_else(|| QuoteClientError::UnresolvedToken(src.into()))?;
    let dst = tokens::resolve(dst).ok_or_else(|| QuoteClientError::UnresolvedToken(dst.into()))?;
    let base_amount =
        tokens::to_base_units(amount, src.decimals).ok_or(QuoteClientError::AmountOverflow(amount))?;

    Ok(QuoteRequest {
        src,
        dst,
        amount: base_amount,
    })
}

#[derive(Debug, Clone)]
pub struct OneInchClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    chain_id: u64,
}

impl OneInchClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        chain_id: u64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            chain_id,
        }
    }

    pub fn from_config(http: Client, config: &AppConfig) -> Self {
        Self::new(
            http,
            config.oneinch_api_base.clone(),
            config.oneinch_api_key.clone(),
            config.chain_id,
        )
    }

    /// Fetch the best-route quote for `request`.
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResult, QuoteClientError> {
        let url = format!("{}/swap/v6.0/{}/quote", self.base_url, self.chain_id);
        counter!("quote_requests_total").increment(1);

        let mut req = self.http.get(&url).query(&[
            ("src", request.src.address.clone()),
            ("dst", request.dst.address.clone()),
            ("amount", request.amount.to_string()),
            ("includeProtocols", "true".into()),
            ("includeGas", "true".into()),
        ]);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.inspect_err(|_| {
            counter!("quote_failures_total").increment(1);
        })?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            counter!("quote_failures_total").increment(1);
            tracing::warn!(src = %request.src.address, dst = %request.dst.address, "1inch rate limit hit");
            return Err(QuoteClientError::RateLimited);
        }
        if !status.is_success() {
            counter!("quote_failures_total").increment(1);
            let body = resp.text().await.unwrap_or_default();
            return Err(QuoteClientError::Status { status, body });
        }

        let body: Value = resp.json().await?;
        parse_quote(&body, request.amount)
    }
}

/// Parse a v6 (`dstAmount`/`gas`) or legacy v5 (`toAmount`/`estimatedGas`)
/// quote body.
pub fn parse_quote(body: &Value, from_amount: Decimal) -> Result<QuoteResult, QuoteClientError> {
    let to_amount = body
        .get("dstAmount")
        .or_else(|| body.get("toAmount"))
        .and_then(value_to_decimal)
        .ok_or_else(|| QuoteClientError::Unexpected("missing dstAmount".into()))?;

    let estimated_gas = body
        .get("gas")
        .or_else(|| body.get("estimatedGas"))
        .and_then(|g| g.as_u64().or_else(|| g.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or(DEFAULT_ESTIMATED_GAS);

    let mut protocols = body.get("protocols").map(parse_protocols).unwrap_or_default();
    if protocols.is_empty() {
        protocols = vec![vec![DEFAULT_PROTOCOL.to_string()]];
    }

    Ok(QuoteResult {
        to_amount,
        estimated_gas,
        protocols,
        from_amount,
    })
}

/// Flatten 1inch's `routes → hops → parts` nesting into one name list per
/// hop. Flat `[[name, ...], ...]` input is accepted as-is.
fn parse_protocols(value: &Value) -> Vec<Vec<String>> {
    let mut hops = Vec::new();
    let Some(outer) = value.as_array() else {
        return hops;
    };

    for entry in outer {
        let Some(items) = entry.as_array() else {
            continue;
        };
        if !items.is_empty() && items.iter().all(Value::is_array) {
            hops.extend(items.iter().map(hop_names).filter(|n| !n.is_empty()));
        } else {
            let names = hop_names(entry);
            if !names.is_empty() {
                hops.push(names);
            }
        }
    }

    hops
}

fn hop_names(hop: &Value) -> Vec<String> {
    hop.as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.as_str().or_else(|| p.get("name").and_then(Value::as_str)))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl QuoteSource for OneInchClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, QuoteClientError> {
        self.get_quote(request).await
    }
}
