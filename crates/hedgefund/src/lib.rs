//! Multi-strategy signal aggregation for crypto assets.
//!
//! A roster of Claude-backed strategies is run concurrently against a cached
//! market snapshot. Their signals are aggregated into a sentiment, reviewed by
//! a risk assessor and synthesized into one decision. Signal timelines can be
//! replayed against cached price history with the backtest engine.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! # async fn run() -> anyhow::Result<()> {
//! let config = hedgefund::load_config("config/hedgefund.toml")?;
//! let cache = hedgefund::open_cache(&config)?;
//! let orchestrator = hedgefund::build_orchestrator(&config, cache);
//!
//! let report = orchestrator.analyze("BONK", Some("solana"), None).await;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub use hedgefund_agents as agents;
pub use hedgefund_backtest as backtest;
pub use hedgefund_cache as cache;
pub use hedgefund_models as models;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use hedgefund_agents::{Orchestrator, StrategySet};
use hedgefund_backtest::BacktestEngine;
use hedgefund_cache::{CacheReader, SqliteReader};
use hedgefund_models::config::FundConfig;

/// Parse a TOML configuration. Missing sections and fields take their defaults.
pub fn parse_config(text: &str) -> Result<FundConfig, anyhow::Error> {
    toml::from_str(text).context("Failed to parse config")
}

pub fn load_config(path: impl AsRef<Path>) -> Result<FundConfig, anyhow::Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&text)
}

/// Open the shared market-data cache read-only.
pub fn open_cache(config: &FundConfig) -> Result<Arc<CacheReader>, anyhow::Error> {
    let sqlite = SqliteReader::open(&config.cache.sqlite_path)
        .with_context(|| format!("Failed to open cache: {}", config.cache.sqlite_path))?;
    Ok(Arc::new(CacheReader::new(
        sqlite,
        config.cache.memory_max_capacity,
        Duration::from_secs(config.cache.memory_ttl_seconds),
    )))
}

/// Build an Orchestrator whose strategies call the local `claude` CLI.
pub fn build_orchestrator(config: &FundConfig, cache: Arc<CacheReader>) -> Orchestrator {
    Orchestrator::new(
        cache,
        StrategySet::claude(&config.agents),
        config.agents.clone(),
    )
}

pub fn build_backtest(config: &FundConfig, cache: Arc<CacheReader>) -> BacktestEngine {
    BacktestEngine::new(cache, config.backtest.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedgefund_models::config::{AnalysisMode, CacheConfig};

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            [agents]
            mode = "degen"

            [backtest]
            stop_loss_pct = 8.0
            "#,
        )
        .unwrap();

        assert_eq!(config.agents.mode, AnalysisMode::Degen);
        assert_eq!(config.agents.batch_limit, 10);
        assert_eq!(config.backtest.stop_loss_pct, 8.0);
        assert_eq!(config.backtest.take_profit_pct, 15.0);
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(parse_config("[agents]\nmode = \"yolo\"").is_err());
    }

    #[test]
    fn missing_cache_file_is_an_error() {
        let mut config = FundConfig::default();
        config.cache.sqlite_path = "/nonexistent/market_cache.db".to_string();
        assert!(open_cache(&config).is_err());
    }

    #[test]
    fn shipped_config_parses() {
        let text = include_str!("../../../config/hedgefund.toml");
        let config = parse_config(text).unwrap();
        assert_eq!(config.agents.default_chain, "solana");
    }
}
