use std::env;
use std::time::Duration;

const DEFAULT_DUNE_API_BASE: &str = "https://api.dune.com/api/v1";
const DEFAULT_DUNE_QUERY_ID: u64 = 3_945_000;
const DEFAULT_ONEINCH_API_BASE: &str = "https://api.1inch.dev";
const DEFAULT_COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token guarding the tool routes. Unset disables auth.
    pub api_token: Option<String>,

    // Dune Analytics (required for any transaction-dependent tool)
    pub dune_api_key: Option<String>,
    pub dune_api_base: String,
    pub dune_query_id: u64,
    pub dune_poll_interval_secs: u64,
    pub dune_max_poll_attempts: u32,

    // 1inch (key optional, unauthenticated tier otherwise)
    pub oneinch_api_key: Option<String>,
    pub oneinch_api_base: String,
    pub chain_id: u64,

    // CoinGecko
    pub coingecko_api_base: String,

    pub quote_spacing_ms: u64,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            api_token: None,
            dune_api_key: None,
            dune_api_base: DEFAULT_DUNE_API_BASE.into(),
            dune_query_id: DEFAULT_DUNE_QUERY_ID,
            dune_poll_interval_secs: 2,
            dune_max_poll_attempts: 30,
            oneinch_api_key: None,
            oneinch_api_base: DEFAULT_ONEINCH_API_BASE.into(),
            chain_id: 1,
            coingecko_api_base: DEFAULT_COINGECKO_API_BASE.into(),
            quote_spacing_ms: 100,
            http_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            api_token: non_empty_var("API_TOKEN"),

            dune_api_key: non_empty_var("DUNE_API_KEY"),
            dune_api_base: env::var("DUNE_API_BASE").unwrap_or(defaults.dune_api_base),
            dune_query_id: parse_var("DUNE_QUERY_ID", defaults.dune_query_id)?,
            dune_poll_interval_secs: parse_var(
                "DUNE_POLL_INTERVAL_SECS",
                defaults.dune_poll_interval_secs,
            )?,
            dune_max_poll_attempts: parse_var(
                "DUNE_MAX_POLL_ATTEMPTS",
                defaults.dune_max_poll_attempts,
            )?,

            oneinch_api_key: non_empty_var("ONEINCH_API_KEY"),
            oneinch_api_base: env::var("ONEINCH_API_BASE").unwrap_or(defaults.oneinch_api_base),
            chain_id: parse_var("CHAIN_ID", defaults.chain_id)?,

            coingecko_api_base: env::var("COINGECKO_API_BASE")
                .unwrap_or(defaults.coingecko_api_base),

            quote_spacing_ms: parse_var("QUOTE_SPACING_MS", defaults.quote_spacing_ms)?,
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
        })
    }

    /// Log which credentials are present. Called once at startup.
    pub fn log_credential_status(&self) {
        if self.dune_api_key.is_none() {
            tracing::warn!(
                "DUNE_API_KEY is not set; transaction tools will fail with a missing-credential error"
            );
        }
        if self.oneinch_api_key.is_none() {
            tracing::warn!("ONEINCH_API_KEY is not set, using the unauthenticated 1inch tier");
        }
        if self.api_token.is_none() {
            tracing::warn!("API_TOKEN is not set, tool routes are unauthenticated");
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.dune_poll_interval_secs)
    }

    pub fn quote_spacing(&self) -> Duration {
        Duration::from_millis(self.quote_spacing_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        _ => Ok(default),
    }
}
