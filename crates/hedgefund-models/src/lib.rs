pub mod agent_message;
pub mod analysis;
pub mod backtest;
pub mod cache_schema;
pub mod config;
pub mod decision;
pub mod market;
pub mod signal;

pub use agent_message::{DecisionRequest, StrategyRequest};
pub use analysis::{AnalysisReport, DataUnavailable, Outcome, QuickSignalReport, Sentiment};
pub use backtest::{
    BacktestResult, EquityPoint, ExitReason, TimelineAction, TimelineSignal, Trade, TradeSide,
};
pub use cache_schema::{CacheCategory, CacheRow};
pub use config::{AgentsConfig, AnalysisMode, BacktestConfig, CacheConfig, FundConfig};
pub use decision::{Conviction, Decision, DecisionAction, ExecutionPlan};
pub use market::{AnalysisContext, Candle, Snapshot};
pub use signal::{Signal, SignalAction, SignalView};
