use std::sync::Arc;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::errors::AppError;
use crate::models::SwapTransaction;
use crate::providers::tokens::is_hex_address;
use crate::providers::TradeHistorySource;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Wallets must be `0x` followed by 40 hex digits.
pub fn validate_wallet(wallet: &str) -> Result<(), AppError> {
    if is_hex_address(wallet) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "invalid wallet address {wallet:?}: expected 0x followed by 40 hex characters"
        )))
    }
}

/// Empty and the `"unknown"` placeholder both count as missing.
fn is_present(field: &str) -> bool {
    let field = field.trim();
    !field.is_empty() && field != "unknown"
}

/// A usable swap has a hash, both symbols, and positive amounts and gas.
pub fn is_complete(tx: &SwapTransaction) -> bool {
    is_present(&tx.hash)
        && is_present(&tx.from_token)
        && is_present(&tx.to_token)
        && tx.from_amount > Decimal::ZERO
        && tx.to_amount > Decimal::ZERO
        && tx.gas_used > 0
}

/// Drop incomplete swaps and order the rest most recent first. The sort is
/// stable so equal timestamps keep provider order.
pub fn filter_and_sort(transactions: Vec<SwapTransaction>) -> Vec<SwapTransaction> {
    let mut kept: Vec<SwapTransaction> = transactions.into_iter().filter(is_complete).collect();
    kept.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    kept
}

/// Validated, cleaned access to a wallet's swap history.
#[derive(Clone)]
pub struct TransactionService {
    history: Arc<dyn TradeHistorySource>,
}

impl TransactionService {
    pub fn new(history: Arc<dyn TradeHistorySource>) -> Self {
        Self { history }
    }

    pub async fn get_user_transactions(
        &self,
        wallet: &str,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<SwapTransaction>, AppError> {
        validate_wallet(wallet)?;
        if limit == 0 || limit > MAX_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }

        let raw = self.history.fetch_swaps(wallet, limit, cancel).await?;
        let fetched = raw.len();
        let transactions = filter_and_sort(raw);

        tracing::info!(
            wallet,
            fetched,
            kept = transactions.len(),
            "Retrieved swap history"
        );
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_tx(hash: &str, minutes: i64) -> SwapTransaction {
        SwapTransaction {
            hash: hash.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
            from_token: "WETH".into(),
            to_token: "USDC".into(),
            from_token_address: None,
            to_token_address: None,
            from_amount: Decimal::ONE,
            to_amount: Decimal::from(3000),
            gas_used: 120_000,
            gas_price: Decimal::from(20),
            dex: "Uniswap V3".into(),
            value_usd: None,
            slippage: None,
        }
    }

    #[test]
    fn test_validate_wallet() {
        assert!(validate_wallet("0x1111111111111111111111111111111111111111").is_ok());
        for bad in [
            "",
            "0x",
            "1111111111111111111111111111111111111111",
            "0x11111111111111111111111111111111111111111",
            "0xZZ11111111111111111111111111111111111111",
        ] {
            assert!(matches!(validate_wallet(bad), Err(AppError::InvalidInput(_))), "{bad}");
        }
    }

    #[test]
    fn test_incomplete_records_dropped() {
        let mut zero_from = make_tx("0x1", 0);
        zero_from.from_amount = Decimal::ZERO;
        let mut zero_to = make_tx("0x2", 0);
        zero_to.to_amount = Decimal::ZERO;
        let mut no_gas = make_tx("0x3", 0);
        no_gas.gas_used = 0;
        let mut no_symbol = make_tx("0x4", 0);
        no_symbol.to_token = String::new();
        let unknown_hash = make_tx("unknown", 0);
        let good = make_tx("0x5", 0);

        let kept = filter_and_sort(vec![zero_from, zero_to, no_gas, no_symbol, unknown_hash, good]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].hash, "0x5");
    }

    #[test]
    fn test_row_without_symbols_is_dropped() {
        use crate::providers::types::DuneSwapRow;
        use serde_json::json;

        let row: DuneSwapRow = serde_json::from_value(json!({
            "tx_hash": "0xabc",
            "token_sold_amount": "1.5",
            "token_bought_amount": "3000",
            "gas_used": 150000,
            "gas_price": "20000000000"
        }))
        .unwrap();
        let mapped = row.into_transaction(Utc::now());
        assert_eq!(mapped.from_token, "unknown");

        let mut one_symbol = make_tx("0x6", 0);
        one_symbol.from_token = "unknown".into();

        let kept = filter_and_sort(vec![mapped, one_symbol, make_tx("0x7", 0)]);
        let hashes: Vec<_> = kept.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["0x7"]);
    }

    #[test]
    fn test_sorted_newest_first_stable_on_ties() {
        let kept = filter_and_sort(vec![
            make_tx("0xold", 0),
            make_tx("0xtie_a", 10),
            make_tx("0xnew", 20),
            make_tx("0xtie_b", 10),
        ]);
        let hashes: Vec<_> = kept.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["0xnew", "0xtie_a", "0xtie_b", "0xold"]);
        assert!(kept.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }
}
