use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::SwapTransaction;

const UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// Dune execution API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DuneExecuteResponse {
    pub execution_id: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DuneError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DuneResultSet {
    #[serde(default)]
    pub rows: Vec<DuneSwapRow>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DuneResultsResponse {
    #[serde(default)]
    pub execution_id: Option<String>,
    pub state: String,
    #[serde(default)]
    pub result: Option<DuneResultSet>,
    #[serde(default)]
    pub error: Option<DuneError>,
}

/// Lifecycle state of a Dune query execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Pending,
    Executing,
    Completed,
    Failed,
}

impl ExecutionState {
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "QUERY_STATE_COMPLETED" | "QUERY_STATE_COMPLETED_PARTIAL" => ExecutionState::Completed,
            "QUERY_STATE_FAILED" | "QUERY_STATE_CANCELLED" | "QUERY_STATE_EXPIRED" => {
                ExecutionState::Failed
            }
            "QUERY_STATE_EXECUTING" => ExecutionState::Executing,
            _ => ExecutionState::Pending,
        }
    }
}

/// One row of the swap-history query. Every column is optional; numeric
/// columns may arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DuneSwapRow {
    #[serde(default, alias = "hash")]
    pub tx_hash: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub block_time: Option<Value>,
    #[serde(default, alias = "from_token")]
    pub token_sold_symbol: Option<String>,
    #[serde(default, alias = "to_token")]
    pub token_bought_symbol: Option<String>,
    #[serde(default, alias = "from_token_address")]
    pub token_sold_address: Option<String>,
    #[serde(default, alias = "to_token_address")]
    pub token_bought_address: Option<String>,
    #[serde(default, alias = "from_amount")]
    pub token_sold_amount: Option<Value>,
    #[serde(default, alias = "to_amount")]
    pub token_bought_amount: Option<Value>,
    #[serde(default)]
    pub gas_used: Option<Value>,
    #[serde(default)]
    pub gas_price: Option<Value>,
    #[serde(default, alias = "dex_name")]
    pub dex: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default, alias = "value_usd")]
    pub amount_usd: Option<Value>,
    #[serde(default)]
    pub slippage: Option<Value>,
}

impl DuneSwapRow {
    /// Map a raw row into a `SwapTransaction`, substituting `"unknown"`, zero
    /// and `fallback_time` for missing columns.
    pub fn into_transaction(self, fallback_time: DateTime<Utc>) -> SwapTransaction {
        let dex = venue_name(
            self.dex.as_deref(),
            self.project.as_deref(),
            self.version.as_ref(),
        );

        SwapTransaction {
            hash: non_empty(self.tx_hash).unwrap_or_else(|| UNKNOWN.into()),
            timestamp: self
                .block_time
                .as_ref()
                .and_then(value_to_datetime)
                .unwrap_or(fallback_time),
            from_token: non_empty(self.token_sold_symbol).unwrap_or_else(|| UNKNOWN.into()),
            to_token: non_empty(self.token_bought_symbol).unwrap_or_else(|| UNKNOWN.into()),
            from_token_address: non_empty(self.token_sold_address),
            to_token_address: non_empty(self.token_bought_address),
            from_amount: decimal_or_zero(self.token_sold_amount.as_ref()),
            to_amount: decimal_or_zero(self.token_bought_amount.as_ref()),
            gas_used: self
                .gas_used
                .as_ref()
                .and_then(value_to_decimal)
                .and_then(|d| d.trunc().to_u64())
                .unwrap_or(0),
            gas_price: decimal_or_zero(self.gas_price.as_ref()),
            dex,
            value_usd: self.amount_usd.as_ref().and_then(value_to_decimal),
            slippage: self.slippage.as_ref().and_then(value_to_decimal),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn decimal_or_zero(value: Option<&Value>) -> Decimal {
    value.and_then(value_to_decimal).unwrap_or(Decimal::ZERO)
}

/// Parse a JSON number or numeric string into a `Decimal`.
pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

/// Unix seconds (number or string), RFC 3339, or Dune's
/// `2024-01-15 12:34:56.000 UTC` format.
pub fn value_to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(secs) = s.parse::<i64>() {
                return DateTime::from_timestamp(secs, 0);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            let naive = s.trim_end_matches("UTC").trim();
            NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|dt| dt.and_utc())
        }
        _ => None,
    }
}

/// Display name for a venue: an explicit `dex` column wins, otherwise
/// `project` and `version` are combined (`uniswap` + `2` → `Uniswap V2`).
pub fn venue_name(dex: Option<&str>, project: Option<&str>, version: Option<&Value>) -> String {
    if let Some(dex) = dex.map(str::trim).filter(|d| !d.is_empty()) {
        return dex.to_string();
    }

    let Some(project) = project.map(str::trim).filter(|p| !p.is_empty()) else {
        return UNKNOWN.into();
    };

    let name = match project.to_lowercase().as_str() {
        "uniswap" => "Uniswap".to_string(),
        "sushiswap" => "SushiSwap".to_string(),
        "pancakeswap" => "PancakeSwap".to_string(),
        "curve" => "Curve".to_string(),
        "balancer" => "Balancer".to_string(),
        "1inch" => "1inch".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    };

    let version = version.and_then(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    match version {
        Some(v) => format!("{name} V{}", v.trim_start_matches(['v', 'V'])),
        None => name,
    }
}
