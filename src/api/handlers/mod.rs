pub mod health;
pub mod mcp;
pub mod metrics;
pub mod tools;
