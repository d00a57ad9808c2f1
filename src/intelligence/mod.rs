pub mod advisor;
pub mod scorer;

pub use advisor::{comparison_recommendations, report_recommendations, NO_HISTORY_ADVICE};
pub use scorer::{efficiency_score, gas_stats, routing_analysis, GasStats};
