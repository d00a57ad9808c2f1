use rust_decimal::Decimal;

use super::scorer::{distinct_venues, most_used_venue};
use crate::models::{ComparisonRecord, SwapTransaction};

const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;
const WEI_PER_GWEI: u64 = 1_000_000_000;

pub const NO_HISTORY_ADVICE: &str =
    "No swap transactions found for this wallet. Start trading on a DEX to build a history we can analyze.";

/// Aggregates the comparison recommendations are derived from.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonSummary<'a> {
    pub gas_savings_potential: Decimal,
    pub average_slippage: Decimal,
    pub records: &'a [ComparisonRecord],
    pub transactions: &'a [SwapTransaction],
}

/// Rule-based advice for the comparison result. Pure and order-independent
/// apart from the first-seen tie break on the favourite venue.
pub fn comparison_recommendations(summary: ComparisonSummary<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if summary.gas_savings_potential > Decimal::ZERO {
        out.push(
            "Use a DEX aggregator such as 1inch to route swaps across multiple venues.".to_string(),
        );
        out.push(format!(
            "Optimal routing could have saved about {} ETH ({} wei) in gas across {} swaps.",
            wei_to_eth(summary.gas_savings_potential),
            summary.gas_savings_potential.round_dp(0),
            summary.records.len()
        ));
    } else {
        out.push("Your swaps already use gas-efficient routes compared to aggregator quotes.".to_string());
    }

    let favourite = most_used_venue(summary.transactions.iter().map(|tx| tx.dex.as_str()));
    if favourite.as_deref() == Some("Uniswap V2") {
        out.push(
            "Most of your swaps go through Uniswap V2. Uniswap V3 concentrated liquidity usually gives better execution."
                .to_string(),
        );
    }

    let slippage = summary.average_slippage;
    if slippage > Decimal::ONE {
        out.push(format!(
            "Average slippage is high ({}%). Use limit orders or split large trades into smaller ones.",
            slippage.round_dp(2).normalize()
        ));
    } else if slippage > Decimal::new(5, 1) {
        out.push(format!(
            "Average slippage is moderate ({}%). Tighten your slippage tolerance or trade in calmer market conditions.",
            slippage.round_dp(2).normalize()
        ));
    }

    if !summary.records.is_empty() {
        let costlier = summary
            .records
            .iter()
            .filter(|r| r.gas_difference > Decimal::ZERO)
            .count();
        let share = Decimal::from(costlier as u64) / Decimal::from(summary.records.len() as u64);
        if share > Decimal::new(3, 1) {
            out.push(format!(
                "{costlier} of {} swaps paid more gas than the aggregator route. Routing through an aggregator would cut these costs.",
                summary.records.len()
            ));
        }
    }

    let large_trades = summary
        .transactions
        .iter()
        .any(|tx| tx.value_usd.is_some_and(|v| v > Decimal::from(1_000)));
    if large_trades {
        out.push(
            "You make large trades. Professional trading interfaces with MEV protection and advanced order types can improve execution."
                .to_string(),
        );
    }

    out
}

/// Report-level inputs for the extra commentary appended to the comparison
/// advice.
#[derive(Debug, Clone, Copy)]
pub struct ReportSummaryInputs<'a> {
    pub efficiency_score: Decimal,
    /// Wei per unit of gas.
    pub average_gas_price: Decimal,
    pub total_volume_usd: Decimal,
    pub transactions: &'a [SwapTransaction],
}

/// Independent threshold rules; any number of them may fire.
pub fn report_recommendations(inputs: ReportSummaryInputs<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if inputs.efficiency_score < Decimal::from(60) {
        out.push(format!(
            "Your efficiency score is {}/100, below average. Focus on routing and slippage improvements first.",
            inputs.efficiency_score.round_dp(0)
        ));
    } else if inputs.efficiency_score >= Decimal::from(85) {
        out.push(format!(
            "Excellent efficiency score of {}/100. Keep using your current trading approach.",
            inputs.efficiency_score.round_dp(0)
        ));
    }

    let gwei = inputs.average_gas_price / Decimal::from(WEI_PER_GWEI);
    if gwei > Decimal::from(100) {
        out.push(format!(
            "Your average gas price is high ({} gwei). Schedule non-urgent swaps for off-peak hours.",
            gwei.round_dp(2).normalize()
        ));
    } else if gwei > Decimal::ZERO && gwei < Decimal::from(20) {
        out.push(format!(
            "Good gas timing: your average gas price is {} gwei.",
            gwei.round_dp(2).normalize()
        ));
    }

    if inputs.total_volume_usd > Decimal::from(100_000) {
        out.push(
            "With over $100,000 in swap volume, consider OTC desks or RFQ-based aggregators for large orders."
                .to_string(),
        );
    } else if inputs.total_volume_usd < Decimal::from(1_000) {
        out.push(
            "Your swap volume is small, so gas can be a large share of each trade. Batch swaps or use a Layer 2 network."
                .to_string(),
        );
    }

    if distinct_venues(inputs.transactions) == 1 {
        if let Some(tx) = inputs.transactions.first() {
            out.push(format!(
                "All of your swaps use {}. Comparing prices across venues could improve execution.",
                tx.dex
            ));
        }
    }

    if inputs.transactions.len() > 20 {
        out.push(
            "You trade frequently. Gas-optimized strategies such as batching or Layer 2 networks would compound savings."
                .to_string(),
        );
    }

    out
}

fn wei_to_eth(wei: Decimal) -> Decimal {
    (wei / Decimal::from(WEI_PER_ETH)).round_dp(6).normalize()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
