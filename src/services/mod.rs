pub mod comparison;
pub mod report;
pub mod transactions;

pub use comparison::{ComparisonConfig, ComparisonEngine};
pub use report::ReportGenerator;
pub use transactions::TransactionService;
