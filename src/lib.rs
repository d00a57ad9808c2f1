pub mod api;
pub mod config;
pub mod errors;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::providers::{
    CoinGeckoClient, DuneClient, OneInchClient, PriceSource, QuoteSource, TradeHistorySource,
};
use crate::services::{ComparisonConfig, ComparisonEngine, ReportGenerator, TransactionService};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub metrics_handle: PrometheusHandle,
    pub transactions: TransactionService,
    pub comparison: ComparisonEngine,
    pub reports: ReportGenerator,
    pub prices: Arc<dyn PriceSource>,
    /// Parent of every per-request token. Cancelled on shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the services on top of the given data sources.
    pub fn new(
        config: AppConfig,
        metrics_handle: PrometheusHandle,
        history: Arc<dyn TradeHistorySource>,
        quotes: Arc<dyn QuoteSource>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        let transactions = TransactionService::new(history);
        let comparison = ComparisonEngine::new(
            transactions.clone(),
            quotes,
            ComparisonConfig {
                quote_spacing: config.quote_spacing(),
                ..ComparisonConfig::default()
            },
        );
        let reports = ReportGenerator::new(transactions.clone(), comparison.clone(), prices.clone());

        Self {
            config,
            metrics_handle,
            transactions,
            comparison,
            reports,
            prices,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the production provider clients from config, sharing one HTTP
    /// connection pool.
    pub fn from_config(
        config: AppConfig,
        metrics_handle: PrometheusHandle,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        let history = Arc::new(DuneClient::from_config(http.clone(), &config));
        let quotes = Arc::new(OneInchClient::from_config(http.clone(), &config));
        let prices = Arc::new(CoinGeckoClient::from_config(http, &config));

        Ok(Self::new(config, metrics_handle, history, quotes, prices))
    }

    /// Token for a single request; cancelled together with the server.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
