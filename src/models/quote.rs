use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A token resolved to its on-chain address and decimal count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub address: String,
    pub decimals: u32,
}

/// Input to the aggregator quote endpoint. `amount` is in smallest units.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub src: ResolvedToken,
    pub dst: ResolvedToken,
    pub amount: Decimal,
}

/// Best-route estimate returned by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    /// Destination amount in smallest units.
    pub to_amount: Decimal,
    pub estimated_gas: u64,
    /// One entry per hop, each listing the venues used for that hop.
    pub protocols: Vec<Vec<String>>,
    pub from_amount: Decimal,
}

impl QuoteResult {
    /// Venue used for the first hop of the route, if any.
    pub fn primary_venue(&self) -> Option<&str> {
        self.protocols
            .first()
            .and_then(|hop| hop.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub symbol: String,
    pub price_usd: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}
