pub mod coingecko_client;
pub mod dune_client;
pub mod oneinch_client;
pub mod tokens;
pub mod types;

pub use coingecko_client::CoinGeckoClient;
pub use dune_client::{DuneClient, PollSettings};
pub use oneinch_client::OneInchClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::models::{QuoteRequest, QuoteResult, SwapTransaction};
use dune_client::DuneClientError;
use oneinch_client::QuoteClientError;

/// Historical swap data for a wallet.
#[async_trait]
pub trait TradeHistorySource: Send + Sync {
    async fn fetch_swaps(
        &self,
        wallet: &str,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<SwapTransaction>, DuneClientError>;
}

/// Aggregator best-route quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, QuoteClientError>;
}

/// USD prices. Implementations return zero instead of failing.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn spot_price(&self, symbol: &str) -> Decimal;

    async fn historical_price(&self, symbol: &str, date: NaiveDate) -> Decimal;
}
