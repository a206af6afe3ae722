use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FundConfig {
    pub cache: CacheConfig,
    pub agents: AgentsConfig,
    pub backtest: BacktestConfig,
}

/// Configuration for the market-data cache layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Path to the shared SQLite cache file (written by the market-data pipeline).
    pub sqlite_path: String,
    /// Maximum number of entries in the in-memory moka cache.
    pub memory_max_capacity: u64,
    /// How long a read stays in memory, in seconds.
    pub memory_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/market_cache.db".to_string(),
            memory_max_capacity: 10_000,
            memory_ttl_seconds: 60,
        }
    }
}

/// Which strategy roster the full pipeline runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// All personas and crypto strategies.
    #[default]
    Full,
    /// Minimal roster for screening.
    Fast,
    /// Tuned for memecoins and fresh launches.
    Degen,
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(AnalysisMode::Full),
            "fast" => Ok(AnalysisMode::Fast),
            "degen" => Ok(AnalysisMode::Degen),
            other => Err(format!("unknown mode '{other}' (expected full, fast or degen)")),
        }
    }
}

/// Configuration for the strategy orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentsConfig {
    pub mode: AnalysisMode,
    /// Chain assumed when the caller does not name one.
    pub default_chain: String,
    /// Model used by persona, crypto and risk strategies.
    pub strategy_model: String,
    /// Model used by the decision synthesizer.
    pub decision_model: String,
    /// Timeout of a single completion call in seconds.
    pub completion_timeout_seconds: u64,
    /// Maximum number of tokens accepted by one batch quick-signal run.
    pub batch_limit: usize,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Full,
            default_chain: "solana".to_string(),
            strategy_model: "claude-3-5-haiku-latest".to_string(),
            decision_model: "claude-sonnet-4-5-20250929".to_string(),
            completion_timeout_seconds: 45,
            batch_limit: 10,
        }
    }
}

/// Parameters of the backtest simulator. Percentages are expressed 0 to 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub position_size_pct: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    /// Minimum signal confidence that opens a position.
    pub min_confidence: f64,
    /// Look-back window used when the caller does not pass one.
    pub default_days: u32,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            position_size_pct: 10.0,
            stop_loss_pct: 5.0,
            take_profit_pct: 15.0,
            min_confidence: 60.0,
            default_days: 30,
        }
    }
}
