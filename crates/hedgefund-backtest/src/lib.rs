pub mod engine;
pub mod error;
pub mod metrics;
pub mod simulator;

pub use engine::BacktestEngine;
pub use error::BacktestError;
pub use simulator::{empty_result, simulate};
