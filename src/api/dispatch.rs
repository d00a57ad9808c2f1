use chrono::NaiveDate;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::errors::AppError;
use crate::models::TokenPrice;
use crate::providers::tokens;
use crate::services::transactions::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::AppState;

/// Remote-callable tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetUserTransactions,
    CompareWith1inch,
    GenerateSwapReport,
    GetTokenPrice,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::GetUserTransactions,
        Tool::CompareWith1inch,
        Tool::GenerateSwapReport,
        Tool::GetTokenPrice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::GetUserTransactions => "get_user_transactions",
            Tool::CompareWith1inch => "compare_with_1inch",
            Tool::GenerateSwapReport => "generate_swap_report",
            Tool::GetTokenPrice => "get_token_price",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            Tool::GetUserTransactions => "Fetch recent DEX swap transactions for a wallet address",
            Tool::CompareWith1inch => {
                "Compare a wallet's historical swaps with 1inch optimal routes and gas estimates"
            }
            Tool::GenerateSwapReport => {
                "Generate a swap efficiency report with scoring, gas analysis and recommendations"
            }
            Tool::GetTokenPrice => "Look up the current or historical USD price of a token",
        }
    }

    fn input_schema(&self) -> Value {
        let wallet = json!({
            "type": "string",
            "description": "Ethereum wallet address (0x followed by 40 hex characters)"
        });
        match self {
            Tool::GetUserTransactions => json!({
                "type": "object",
                "properties": {
                    "walletAddress": wallet,
                    "limit": {
                        "type": "integer",
                        "description": "Number of transactions to fetch",
                        "default": DEFAULT_LIMIT,
                        "minimum": 1,
                        "maximum": MAX_LIMIT
                    }
                },
                "required": ["walletAddress"]
            }),
            Tool::CompareWith1inch | Tool::GenerateSwapReport => json!({
                "type": "object",
                "properties": { "walletAddress": wallet },
                "required": ["walletAddress"]
            }),
            Tool::GetTokenPrice => json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Token symbol, e.g. ETH" },
                    "date": {
                        "type": "string",
                        "description": "Historical date (YYYY-MM-DD); omit for the spot price"
                    }
                },
                "required": ["symbol"]
            }),
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Tool::GetUserTransactions => "Failed to fetch user transactions",
            Tool::CompareWith1inch => "Failed to compare transactions with 1inch",
            Tool::GenerateSwapReport => "Failed to generate swap report",
            Tool::GetTokenPrice => "Failed to fetch token price",
        }
    }
}

/// Tool listing in the `tools/list` shape.
pub fn tool_definitions() -> Vec<Value> {
    Tool::ALL
        .iter()
        .map(|tool| {
            json!({
                "name": tool.as_str(),
                "description": tool.description(),
                "inputSchema": tool.input_schema(),
            })
        })
        .collect()
}

/// Protocol-level dispatch failures. Everything else, malformed arguments
/// included, is reported inside the payload.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// A tool's JSON payload plus whether it reports a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub payload: Value,
    pub is_error: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsArgs {
    wallet_address: String,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletArgs {
    wallet_address: String,
}

#[derive(Debug, Deserialize)]
struct PriceArgs {
    symbol: String,
    #[serde(default)]
    date: Option<String>,
}

/// Run tool `name` with `arguments`.
pub async fn dispatch(
    state: &AppState,
    name: &str,
    arguments: Value,
    cancel: &CancellationToken,
) -> Result<ToolOutput, DispatchError> {
    let tool = Tool::from_name(name).ok_or_else(|| DispatchError::UnknownTool(name.into()))?;
    counter!("tool_calls_total", "tool" => tool.as_str()).increment(1);

    Ok(match run_tool(state, tool, arguments, cancel).await {
        Ok(payload) => ToolOutput {
            payload,
            is_error: false,
        },
        Err(e) => {
            counter!("tool_failures_total", "tool" => tool.as_str()).increment(1);
            tracing::warn!(tool = tool.as_str(), kind = e.kind(), error = %e, "Tool call failed");
            ToolOutput {
                payload: failure_payload(tool, &e),
                is_error: true,
            }
        }
    })
}

async fn run_tool(
    state: &AppState,
    tool: Tool,
    arguments: Value,
    cancel: &CancellationToken,
) -> Result<Value, AppError> {
    match tool {
        Tool::GetUserTransactions => {
            let args: TransactionsArgs = parse_args(tool, arguments)?;
            let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
            run_get_user_transactions(state, &args.wallet_address, limit, cancel).await
        }
        Tool::CompareWith1inch => {
            let args: WalletArgs = parse_args(tool, arguments)?;
            run_compare(state, &args.wallet_address, cancel).await
        }
        Tool::GenerateSwapReport => {
            let args: WalletArgs = parse_args(tool, arguments)?;
            run_report(state, &args.wallet_address, cancel).await
        }
        Tool::GetTokenPrice => {
            let args: PriceArgs = parse_args(tool, arguments)?;
            run_token_price(state, &args.symbol, args.date.as_deref()).await
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: Tool, arguments: Value) -> Result<T, AppError> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| {
        AppError::InvalidInput(format!("invalid arguments for {}: {e}", tool.as_str()))
    })
}

fn success_payload<T: Serialize>(data: &T, message: String) -> Result<Value, AppError> {
    let data = serde_json::to_value(data).map_err(|e| AppError::Internal(e.into()))?;
    Ok(json!({
        "success": true,
        "data": data,
        "message": message,
    }))
}

fn failure_payload(tool: Tool, error: &AppError) -> Value {
    json!({
        "success": false,
        "error": error.to_string(),
        "errorKind": error.kind(),
        "message": tool.failure_message(),
    })
}

async fn run_get_user_transactions(
    state: &AppState,
    wallet: &str,
    limit: u32,
    cancel: &CancellationToken,
) -> Result<Value, AppError> {
    let transactions = state
        .transactions
        .get_user_transactions(wallet, limit, cancel)
        .await?;
    let message = format!("Found {} swap transactions", transactions.len());
    success_payload(&transactions, message)
}

async fn run_compare(
    state: &AppState,
    wallet: &str,
    cancel: &CancellationToken,
) -> Result<Value, AppError> {
    let result = state.comparison.compare(wallet, cancel).await?;
    let message = format!(
        "Compared {} of {} swaps with 1inch routes",
        result.detailed_comparisons.len(),
        result.total_transactions
    );
    success_payload(&result, message)
}

async fn run_report(
    state: &AppState,
    wallet: &str,
    cancel: &CancellationToken,
) -> Result<Value, AppError> {
    let report = state.reports.generate(wallet, cancel).await?;
    let message = format!(
        "Swap report generated for {} swaps",
        report.summary.total_swaps
    );
    success_payload(&report, message)
}

async fn run_token_price(
    state: &AppState,
    symbol: &str,
    date: Option<&str>,
) -> Result<Value, AppError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("symbol must not be empty".into()));
    }
    if tokens::coingecko_id(&symbol).is_none() {
        return Err(AppError::NotFound(format!("no price feed for {symbol}")));
    }

    let date = date
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| AppError::InvalidInput(format!("date must be YYYY-MM-DD, got {raw}")))
        })
        .transpose()?;

    let price_usd = match date {
        Some(day) => state.prices.historical_price(&symbol, day).await,
        None => state.prices.spot_price(&symbol).await,
    };

    let message = match date {
        Some(day) => format!("{symbol} price on {day}"),
        None => format!("Current {symbol} price"),
    };
    success_payload(
        &TokenPrice {
            symbol,
            price_usd,
            date,
        },
        message,
    )
}
