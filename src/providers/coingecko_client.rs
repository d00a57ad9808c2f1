use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::counter;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use super::tokens;
use super::types::value_to_decimal;
use super::PriceSource;
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum PriceClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no price id for symbol {0}")]
    UnknownSymbol(String),

    #[error("price missing from response")]
    MissingPrice,
}

/// CoinGecko spot and historical USD prices.
///
/// Public lookups never fail: errors are logged and reported as a zero price,
/// since prices only feed best-effort volume estimates.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(http: Client, config: &AppConfig) -> Self {
        Self::new(http, config.coingecko_api_base.clone())
    }

    async fn fetch_spot(&self, symbol: &str) -> Result<Decimal, PriceClientError> {
        let id = tokens::coingecko_id(symbol)
            .ok_or_else(|| PriceClientError::UnknownSymbol(symbol.into()))?;
        let url = format!("{}/simple/price", self.base_url);

        let body: Value = self
            .http
            .get(&url)
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.get(id)
            .and_then(|p| p.get("usd"))
            .and_then(value_to_decimal)
            .ok_or(PriceClientError::MissingPrice)
    }

    async fn fetch_historical(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<Decimal, PriceClientError> {
        let id = tokens::coingecko_id(symbol)
            .ok_or_else(|| PriceClientError::UnknownSymbol(symbol.into()))?;
        let url = format!("{}/coins/{}/history", self.base_url, id);
        let date = date.format("%d-%m-%Y").to_string();

        let body: Value = self
            .http
            .get(&url)
            .query(&[("date", date.as_str()), ("localization", "false")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.pointer("/market_data/current_price/usd")
            .and_then(value_to_decimal)
            .ok_or(PriceClientError::MissingPrice)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn spot_price(&self, symbol: &str) -> Decimal {
        match self.fetch_spot(symbol).await {
            Ok(price) if price >= Decimal::ZERO => price,
            Ok(price) => {
                tracing::warn!(symbol, price = %price, "Negative spot price ignored");
                Decimal::ZERO
            }
            Err(e) => {
                counter!("price_lookup_failures_total").increment(1);
                tracing::warn!(symbol, error = %e, "Spot price lookup failed");
                Decimal::ZERO
            }
        }
    }

    async fn historical_price(&self, symbol: &str, date: NaiveDate) -> Decimal {
        match self.fetch_historical(symbol, date).await {
            Ok(price) if price >= Decimal::ZERO => price,
            Ok(_) => Decimal::ZERO,
            Err(e) => {
                counter!("price_lookup_failures_total").increment(1);
                tracing::warn!(symbol, %date, error = %e, "Historical price lookup failed");
                Decimal::ZERO
            }
        }
    }
}
