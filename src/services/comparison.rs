use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use super::transactions::{validate_wallet, TransactionService, DEFAULT_LIMIT};
use crate::errors::AppError;
use crate::intelligence::advisor::{comparison_recommendations, ComparisonSummary, NO_HISTORY_ADVICE};
use crate::models::{ComparisonRecord, ComparisonResult, SwapTransaction};
use crate::providers::oneinch_client::build_quote_request;
use crate::providers::tokens::from_base_units;
use crate::providers::QuoteSource;

/// Venue label when the quote lists no hops.
const FALLBACK_OPTIMAL_VENUE: &str = "1inch";

#[derive(Debug, Clone, Copy)]
pub struct ComparisonConfig {
    /// Pause after each successful quote.
    pub quote_spacing: Duration,
    /// History depth compared per wallet.
    pub limit: u32,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            quote_spacing: Duration::from_millis(100),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One paired observation: the record plus the gas costs it was built from.
struct PairedQuote {
    record: ComparisonRecord,
    actual_gas: Decimal,
    optimal_gas: Decimal,
}

/// Compares each historical swap with the aggregator's best route for the
/// same trade.
#[derive(Clone)]
pub struct ComparisonEngine {
    transactions: TransactionService,
    quotes: Arc<dyn QuoteSource>,
    config: ComparisonConfig,
}

impl ComparisonEngine {
    pub fn new(
        transactions: TransactionService,
        quotes: Arc<dyn QuoteSource>,
        config: ComparisonConfig,
    ) -> Self {
        Self {
            transactions,
            quotes,
            config,
        }
    }

    pub async fn compare(
        &self,
        wallet: &str,
        cancel: &CancellationToken,
    ) -> Result<ComparisonResult, AppError> {
        validate_wallet(wallet)?;
        let transactions = self
            .transactions
            .get_user_transactions(wallet, self.config.limit, cancel)
            .await?;

        if transactions.is_empty() {
            tracing::info!(wallet, "No swaps to compare");
            return Ok(ComparisonResult::empty(NO_HISTORY_ADVICE));
        }

        let mut total_actual = Decimal::ZERO;
        let mut total_optimal = Decimal::ZERO;
        let mut records = Vec::with_capacity(transactions.len());

        for tx in &transactions {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let (Some(src), Some(dst)) = (&tx.from_token_address, &tx.to_token_address) else {
                tracing::warn!(swap = %tx, "Skipping swap without token addresses");
                continue;
            };

            match self.pair_with_quote(tx, src, dst).await {
                Ok(paired) => {
                    total_actual = total_actual.saturating_add(paired.actual_gas);
                    total_optimal = total_optimal.saturating_add(paired.optimal_gas);
                    records.push(paired.record);

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(AppError::Cancelled),
                        _ = tokio::time::sleep(self.config.quote_spacing) => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        tx_hash = %tx.hash,
                        error = %e,
                        kind = e.kind(),
                        "Comparison failed for swap, continuing"
                    );
                }
            }
        }

        let gas_savings_potential = total_actual.saturating_sub(total_optimal).max(Decimal::ZERO);
        let average_slippage = average_slippage(&records);

        let recommendations = comparison_recommendations(ComparisonSummary {
            gas_savings_potential,
            average_slippage,
            records: &records,
            transactions: &transactions,
        });

        tracing::info!(
            wallet,
            transactions = transactions.len(),
            compared = records.len(),
            gas_savings_potential = %gas_savings_potential,
            "Comparison complete"
        );

        Ok(ComparisonResult {
            total_transactions: transactions.len(),
            total_actual_gas_cost: total_actual,
            total_optimal_gas_cost: total_optimal,
            gas_savings_potential,
            average_slippage,
            recommendations,
            detailed_comparisons: records,
        })
    }

    async fn pair_with_quote(
        &self,
        tx: &SwapTransaction,
        src: &str,
        dst: &str,
    ) -> Result<PairedQuote, AppError> {
        let request = build_quote_request(src, dst, tx.from_amount)?;
        let quote = self.quotes.quote(&request).await?;

        let actual_gas = tx.gas_cost();
        let optimal_gas = Decimal::from(quote.estimated_gas).saturating_mul(tx.gas_price);
        let optimal_amount =
            from_base_units(quote.to_amount, request.dst.decimals).unwrap_or(Decimal::ZERO);

        Ok(PairedQuote {
            record: ComparisonRecord {
                tx_hash: tx.hash.clone(),
                actual_dex: tx.dex.clone(),
                optimal_dex: quote
                    .primary_venue()
                    .unwrap_or(FALLBACK_OPTIMAL_VENUE)
                    .to_string(),
                gas_difference: actual_gas.saturating_sub(optimal_gas),
                slippage: tx.slippage,
                actual_amount: tx.to_amount,
                optimal_amount,
            },
            actual_gas,
            optimal_gas,
        })
    }
}

/// Mean over compared swaps; swaps without a slippage figure count as zero.
fn average_slippage(records: &[ComparisonRecord]) -> Decimal {
    if records.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = records
        .iter()
        .map(|r| r.slippage.unwrap_or(Decimal::ZERO))
        .sum();
    (total / Decimal::from(records.len() as u64)).round_dp(4)
}
