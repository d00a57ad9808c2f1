use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::models::{ComparisonRecord, RoutingAnalysis, SwapTransaction, TimeRange};

/// Missed-opportunity notes kept per report.
const MAX_MISSED_NOTES: usize = 5;

/// Gas-cost delta (wei) above which a swap counts as a missed opportunity.
const MISSED_GAS_THRESHOLD: i64 = 50_000;

/// Aggregate gas statistics over a set of swaps.
#[derive(Debug, Clone, PartialEq)]
pub struct GasStats {
    /// Σ gas_used × gas_price, in wei.
    pub total_gas_spent: Decimal,
    pub total_gas_used: Decimal,
    /// Wei per unit of gas; zero when no gas was used.
    pub average_gas_price: Decimal,
    pub average_gas_used: Decimal,
}

pub fn gas_stats(transactions: &[SwapTransaction]) -> GasStats {
    let total_gas_spent = transactions
        .iter()
        .fold(Decimal::ZERO, |acc, tx| acc.saturating_add(tx.gas_cost()));
    let total_gas_used = transactions
        .iter()
        .fold(Decimal::ZERO, |acc, tx| acc.saturating_add(Decimal::from(tx.gas_used)));

    let average_gas_price = if total_gas_used.is_zero() {
        Decimal::ZERO
    } else {
        total_gas_spent / total_gas_used
    };

    let average_gas_used = if transactions.is_empty() {
        Decimal::ZERO
    } else {
        total_gas_used / Decimal::from(transactions.len() as u64)
    };

    GasStats {
        total_gas_spent,
        total_gas_used,
        average_gas_price: average_gas_price.round_dp(2),
        average_gas_used: average_gas_used.round_dp(2),
    }
}

/// `potential / spent × 100`, or zero when nothing was spent.
pub fn savings_percentage(potential_savings: Decimal, total_gas_spent: Decimal) -> Decimal {
    if total_gas_spent <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    potential_savings
        .checked_div(total_gas_spent)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

/// Older-generation or thin-liquidity venues penalised by the score.
pub fn is_inefficient_venue(venue: &str) -> bool {
    venue.contains("V1") || venue == "SushiSwap"
}

pub fn distinct_venues(transactions: &[SwapTransaction]) -> usize {
    transactions
        .iter()
        .map(|tx| tx.dex.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Most frequent venue; ties go to the venue seen first.
pub fn most_used_venue<'a>(venues: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for venue in venues {
        match tally.iter_mut().find(|(v, _)| *v == venue) {
            Some((_, count)) => *count += 1,
            None => tally.push((venue, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (venue, count) in tally {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((venue, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}

/// Efficiency score in `[0, 100]`.
///
/// Starts at 100 and subtracts up to 50 points for gas left on the table,
/// up to 30 for slippage and up to 20 for the share of swaps on inefficient
/// venues. Focused wallets (≤3 venues across >5 swaps) get a 5 point bonus.
pub fn efficiency_score(
    transactions: &[SwapTransaction],
    gas_savings_potential: Decimal,
    total_gas_spent: Decimal,
    average_slippage: Decimal,
) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    let mut score = hundred;

    if total_gas_spent > Decimal::ZERO {
        let ratio = gas_savings_potential
            .checked_div(total_gas_spent)
            .unwrap_or(Decimal::ONE);
        score = score.saturating_sub(ratio.saturating_mul(Decimal::from(50)));
    }

    let slippage_penalty = average_slippage
        .saturating_mul(Decimal::TEN)
        .min(Decimal::from(30));
    score = score.saturating_sub(slippage_penalty);

    if !transactions.is_empty() {
        let inefficient = transactions
            .iter()
            .filter(|tx| is_inefficient_venue(&tx.dex))
            .count();
        let share = Decimal::from(inefficient as u64) / Decimal::from(transactions.len() as u64);
        score = score.saturating_sub(share * Decimal::from(20));
    }

    if transactions.len() > 5 && distinct_venues(transactions) <= 3 {
        score = score.saturating_add(Decimal::from(5));
    }

    score.max(Decimal::ZERO).min(hundred).round_dp(2)
}

/// Split comparisons into optimal (`gasDifference <= 0`) and suboptimal, and
/// note the swaps that clearly left value behind.
pub fn routing_analysis(records: &[ComparisonRecord]) -> RoutingAnalysis {
    let optimal_routes = records
        .iter()
        .filter(|r| r.gas_difference <= Decimal::ZERO)
        .count();

    let gas_threshold = Decimal::from(MISSED_GAS_THRESHOLD);
    let output_threshold = Decimal::new(101, 2);

    let mut missed_opportunities: Vec<String> = records
        .iter()
        .filter_map(|r| {
            let short = short_hash(&r.tx_hash);
            if r.gas_difference > gas_threshold {
                Some(format!(
                    "Swap {short} on {} cost {} wei more gas than the {} route",
                    r.actual_dex,
                    r.gas_difference.round_dp(0),
                    r.optimal_dex
                ))
            } else if r.actual_amount > Decimal::ZERO
                && r.optimal_amount > r.actual_amount.saturating_mul(output_threshold)
            {
                let extra = (r.optimal_amount - r.actual_amount)
                    .checked_div(r.actual_amount)?
                    .checked_mul(Decimal::ONE_HUNDRED)?;
                Some(format!(
                    "Swap {short} on {} could have returned {}% more output via {}",
                    r.actual_dex,
                    extra.round_dp(2).normalize(),
                    r.optimal_dex
                ))
            } else {
                None
            }
        })
        .take(MAX_MISSED_NOTES)
        .collect();

    if missed_opportunities.is_empty() {
        missed_opportunities
            .push("No significant missed routing opportunities detected".to_string());
    }

    RoutingAnalysis {
        optimal_routes,
        suboptimal_routes: records.len() - optimal_routes,
        missed_opportunities,
    }
}

pub fn time_range(transactions: &[SwapTransaction]) -> TimeRange {
    TimeRange {
        from: transactions.iter().map(|tx| tx.timestamp).min(),
        to: transactions.iter().map(|tx| tx.timestamp).max(),
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..10).unwrap_or(hash)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
