use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_swaps: usize,
    pub total_volume_usd: Decimal,
    pub average_gas_used: Decimal,
    pub most_used_dex: String,
    /// Always within 0..=100.
    pub efficiency_score: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasAnalysis {
    pub total_gas_spent: Decimal,
    pub average_gas_price: Decimal,
    pub potential_savings: Decimal,
    pub savings_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingAnalysis {
    pub optimal_routes: usize,
    pub suboptimal_routes: usize,
    pub missed_opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Composite efficiency report for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReportData {
    pub summary: ReportSummary,
    pub gas_analysis: GasAnalysis,
    pub routing_analysis: RoutingAnalysis,
    pub recommendations: Vec<String>,
    pub time_range: TimeRange,
    pub generated_at: DateTime<Utc>,
}
