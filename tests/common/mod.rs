use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use swap_analyzer::config::AppConfig;
use swap_analyzer::models::{QuoteRequest, QuoteResult, SwapTransaction};
use swap_analyzer::providers::dune_client::DuneClientError;
use swap_analyzer::providers::oneinch_client::QuoteClientError;
use swap_analyzer::providers::tokens::lookup_symbol;
use swap_analyzer::providers::{PriceSource, QuoteSource, TradeHistorySource};
use swap_analyzer::AppState;

#[allow(dead_code)]
pub const WALLET: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

/// Swap history served from memory.
#[derive(Default)]
pub struct FakeHistory {
    pub swaps: Vec<SwapTransaction>,
    pub missing_key: bool,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeHistory {
    pub fn with_swaps(swaps: Vec<SwapTransaction>) -> Self {
        Self {
            swaps,
            ..Default::default()
        }
    }

    pub fn without_key() -> Self {
        Self {
            missing_key: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TradeHistorySource for FakeHistory {
    async fn fetch_swaps(
        &self,
        _wallet: &str,
        limit: u32,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SwapTransaction>, DuneClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing_key {
            return Err(DuneClientError::MissingApiKey);
        }
        Ok(self.swaps.iter().take(limit as usize).cloned().collect())
    }
}

/// Fixed quote for every request; optionally rate-limits one call (1-based).
pub struct FakeQuotes {
    pub estimated_gas: u64,
    /// Destination amount in base units.
    pub to_amount: Decimal,
    pub protocol: String,
    pub fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeQuotes {
    pub fn new(estimated_gas: u64) -> Self {
        Self {
            estimated_gas,
            to_amount: Decimal::from(3_000_000_000u64),
            protocol: "UNISWAP_V3".into(),
            fail_on_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FakeQuotes {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, QuoteClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(QuoteClientError::RateLimited);
        }
        Ok(QuoteResult {
            to_amount: self.to_amount,
            estimated_gas: self.estimated_gas,
            protocols: vec![vec![self.protocol.clone()]],
            from_amount: request.amount,
        })
    }
}

/// Prices from a fixed table; unknown symbols are zero.
#[derive(Default)]
pub struct FakePrices {
    pub spot: HashMap<String, Decimal>,
    pub historical: HashMap<(String, NaiveDate), Decimal>,
    spot_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakePrices {
    pub fn with_spot(entries: &[(&str, i64)]) -> Self {
        Self {
            spot: entries
                .iter()
                .map(|(s, p)| (s.to_string(), Decimal::from(*p)))
                .collect(),
            ..Default::default()
        }
    }

    pub fn spot_calls(&self) -> usize {
        self.spot_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn spot_price(&self, symbol: &str) -> Decimal {
        self.spot_calls.fetch_add(1, Ordering::SeqCst);
        self.spot.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    async fn historical_price(&self, symbol: &str, date: NaiveDate) -> Decimal {
        self.historical
            .get(&(symbol.to_string(), date))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// A complete WETH → USDC swap `minutes_ago` in the past.
#[allow(dead_code)]
pub fn make_swap(hash: &str, minutes_ago: i64, dex: &str, gas_used: u64, gas_price: i64) -> SwapTransaction {
    let weth = lookup_symbol("WETH").expect("WETH is registered");
    let usdc = lookup_symbol("USDC").expect("USDC is registered");
    SwapTransaction {
        hash: hash.into(),
        timestamp: Utc::now() - Duration::minutes(minutes_ago),
        from_token: "WETH".into(),
        to_token: "USDC".into(),
        from_token_address: Some(weth.address.to_string()),
        to_token_address: Some(usdc.address.to_string()),
        from_amount: Decimal::ONE,
        to_amount: Decimal::from(2_990),
        gas_used,
        gas_price: Decimal::from(gas_price),
        dex: dex.into(),
        value_usd: None,
        slippage: None,
    }
}

/// Config with no throttling, so service tests run instantly.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        quote_spacing_ms: 0,
        ..AppConfig::default()
    }
}

#[allow(dead_code)]
pub fn build_state(
    config: AppConfig,
    history: Arc<FakeHistory>,
    quotes: Arc<FakeQuotes>,
    prices: Arc<FakePrices>,
) -> AppState {
    AppState::new(
        config,
        swap_analyzer::metrics::detached_handle(),
        history,
        quotes,
        prices,
    )
}
