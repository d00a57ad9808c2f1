use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Delta between one executed swap and the aggregator's quote for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub tx_hash: String,
    pub actual_dex: String,
    pub optimal_dex: String,
    /// Actual gas cost minus quoted gas cost, in wei. Negative when the
    /// executed route was cheaper.
    pub gas_difference: Decimal,
    pub slippage: Option<Decimal>,
    pub actual_amount: Decimal,
    pub optimal_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub total_transactions: usize,
    pub total_actual_gas_cost: Decimal,
    pub total_optimal_gas_cost: Decimal,
    pub gas_savings_potential: Decimal,
    pub average_slippage: Decimal,
    pub recommendations: Vec<String>,
    pub detailed_comparisons: Vec<ComparisonRecord>,
}

impl ComparisonResult {
    /// Result for a wallet with no swap history.
    pub fn empty(advisory: impl Into<String>) -> Self {
        Self {
            total_transactions: 0,
            total_actual_gas_cost: Decimal::ZERO,
            total_optimal_gas_cost: Decimal::ZERO,
            gas_savings_potential: Decimal::ZERO,
            average_slippage: Decimal::ZERO,
            recommendations: vec![advisory.into()],
            detailed_comparisons: Vec::new(),
        }
    }
}
