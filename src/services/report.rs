use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::histogram;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use super::comparison::ComparisonEngine;
use super::transactions::{validate_wallet, TransactionService};
use crate::errors::AppError;
use crate::intelligence::advisor::{report_recommendations, ReportSummaryInputs, NO_HISTORY_ADVICE};
use crate::intelligence::scorer;
use crate::models::{
    GasAnalysis, ReportSummary, RoutingAnalysis, SwapReportData, SwapTransaction, TimeRange,
};
use crate::providers::PriceSource;

/// History depth used for report statistics.
pub const REPORT_LIMIT: u32 = 50;

/// Builds the composite efficiency report for a wallet.
#[derive(Clone)]
pub struct ReportGenerator {
    transactions: TransactionService,
    comparison: ComparisonEngine,
    prices: Arc<dyn PriceSource>,
}

impl ReportGenerator {
    pub fn new(
        transactions: TransactionService,
        comparison: ComparisonEngine,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            transactions,
            comparison,
            prices,
        }
    }

    pub async fn generate(
        &self,
        wallet: &str,
        cancel: &CancellationToken,
    ) -> Result<SwapReportData, AppError> {
        validate_wallet(wallet)?;
        let started = Instant::now();

        // Two independent reads of the same upstream history; their sets may
        // differ slightly if the provider updates in between. The first error
        // drops the other branch.
        let (transactions, comparison) = tokio::try_join!(
            self.transactions
                .get_user_transactions(wallet, REPORT_LIMIT, cancel),
            self.comparison.compare(wallet, cancel),
        )?;

        if transactions.is_empty() {
            tracing::info!(wallet, "No swaps found, returning empty report");
            return Ok(empty_report());
        }

        let total_volume_usd = self.total_volume(&transactions).await;
        let gas = scorer::gas_stats(&transactions);
        let potential_savings = comparison.gas_savings_potential;

        let efficiency_score = scorer::efficiency_score(
            &transactions,
            potential_savings,
            gas.total_gas_spent,
            comparison.average_slippage,
        );

        let most_used_dex = scorer::most_used_venue(transactions.iter().map(|tx| tx.dex.as_str()))
            .unwrap_or_else(|| "unknown".into());

        let mut recommendations = comparison.recommendations.clone();
        recommendations.extend(report_recommendations(ReportSummaryInputs {
            efficiency_score,
            average_gas_price: gas.average_gas_price,
            total_volume_usd,
            transactions: &transactions,
        }));

        let report = SwapReportData {
            summary: ReportSummary {
                total_swaps: transactions.len(),
                total_volume_usd,
                average_gas_used: gas.average_gas_used,
                most_used_dex,
                efficiency_score,
            },
            gas_analysis: GasAnalysis {
                total_gas_spent: gas.total_gas_spent,
                average_gas_price: gas.average_gas_price,
                potential_savings,
                savings_percentage: scorer::savings_percentage(
                    potential_savings,
                    gas.total_gas_spent,
                ),
            },
            routing_analysis: scorer::routing_analysis(&comparison.detailed_comparisons),
            recommendations,
            time_range: scorer::time_range(&transactions),
            generated_at: Utc::now(),
        };

        histogram!("report_latency_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            wallet,
            swaps = report.summary.total_swaps,
            score = %report.summary.efficiency_score,
            volume_usd = %report.summary.total_volume_usd,
            "Swap report generated"
        );

        Ok(report)
    }

    /// Σ provider USD value, falling back to spot price × amount. Each symbol
    /// is priced at most once per report.
    async fn total_volume(&self, transactions: &[SwapTransaction]) -> Decimal {
        let mut prices: HashMap<String, Decimal> = HashMap::new();
        let mut total = Decimal::ZERO;

        for tx in transactions {
            let value = match tx.value_usd {
                Some(v) if v > Decimal::ZERO => v,
                _ => {
                    let symbol = tx.from_token.to_uppercase();
                    let price = match prices.get(&symbol) {
                        Some(p) => *p,
                        None => {
                            let p = self.prices.spot_price(&symbol).await;
                            prices.insert(symbol, p);
                            p
                        }
                    };
                    price.saturating_mul(tx.from_amount)
                }
            };
            total = total.saturating_add(value);
        }

        total.round_dp(2)
    }
}

fn empty_report() -> SwapReportData {
    SwapReportData {
        summary: ReportSummary {
            total_swaps: 0,
            total_volume_usd: Decimal::ZERO,
            average_gas_used: Decimal::ZERO,
            most_used_dex: "none".into(),
            efficiency_score: Decimal::ZERO,
        },
        gas_analysis: GasAnalysis {
            total_gas_spent: Decimal::ZERO,
            average_gas_price: Decimal::ZERO,
            potential_savings: Decimal::ZERO,
            savings_percentage: Decimal::ZERO,
        },
        routing_analysis: RoutingAnalysis {
            optimal_routes: 0,
            suboptimal_routes: 0,
            missed_opportunities: Vec::new(),
        },
        recommendations: vec![NO_HISTORY_ADVICE.to_string()],
        time_range: TimeRange {
            from: None,
            to: None,
        },
        generated_at: Utc::now(),
    }
}
