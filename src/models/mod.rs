pub mod comparison;
pub mod quote;
pub mod report;

pub use comparison::{ComparisonRecord, ComparisonResult};
pub use quote::{QuoteRequest, QuoteResult, ResolvedToken, TokenPrice};
pub use report::{GasAnalysis, ReportSummary, RoutingAnalysis, SwapReportData, TimeRange};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SwapTransaction: one historical swap as returned by the history provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub from_token: String,
    pub to_token: String,
    pub from_token_address: Option<String>,
    pub to_token_address: Option<String>,
    pub from_amount: Decimal,
    pub to_amount: Decimal,
    pub gas_used: u64,
    /// Wei per unit of gas.
    pub gas_price: Decimal,
    pub dex: String,
    pub value_usd: Option<Decimal>,
    /// Percent, as reported by the provider.
    pub slippage: Option<Decimal>,
}

impl SwapTransaction {
    /// Gas cost of the swap in wei.
    pub fn gas_cost(&self) -> Decimal {
        Decimal::from(self.gas_used).saturating_mul(self.gas_price)
    }
}

impl fmt::Display for SwapTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Swap: hash={} dex={} {} {} -> {} {} gas_used={}",
            self.hash.get(..10).unwrap_or(&self.hash),
            self.dex,
            self.from_amount,
            self.from_token,
            self.to_amount,
            self.to_token,
            self.gas_used,
        )
    }
}
