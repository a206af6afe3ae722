use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hedgefund_models::agent_message::StrategyRequest;
use hedgefund_models::market::{AnalysisContext, Snapshot};
use hedgefund_models::signal::Signal;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::completion::CompletionService;
use crate::error::AgentError;
use crate::parser::parse_signal;
use crate::prompts::strategy_system_prompt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
    Extreme,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    Short,
    Medium,
    Long,
}

/// Descriptive metadata of a strategy. Has no effect on pipeline behavior.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StrategyProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub risk_tolerance: RiskTolerance,
    pub time_horizon: TimeHorizon,
    pub focus_areas: &'static [&'static str],
}

/// Every strategy the fund knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    WarrenBuffett,
    MichaelBurry,
    CharlieMunger,
    CathieWood,
    BillAckman,
    Degen,
    SolanaSpecialist,
    WhaleWatcher,
    PumpTrader,
    OnChainAnalyst,
    RiskManager,
    PortfolioManager,
}

impl StrategyKind {
    /// Catalogue order: personas, crypto-native, management.
    pub const ALL: [StrategyKind; 12] = [
        StrategyKind::WarrenBuffett,
        StrategyKind::MichaelBurry,
        StrategyKind::CharlieMunger,
        StrategyKind::CathieWood,
        StrategyKind::BillAckman,
        StrategyKind::Degen,
        StrategyKind::SolanaSpecialist,
        StrategyKind::WhaleWatcher,
        StrategyKind::PumpTrader,
        StrategyKind::OnChainAnalyst,
        StrategyKind::RiskManager,
        StrategyKind::PortfolioManager,
    ];

    pub fn profile(&self) -> &'static StrategyProfile {
        match self {
            StrategyKind::WarrenBuffett => &BUFFETT,
            StrategyKind::MichaelBurry => &BURRY,
            StrategyKind::CharlieMunger => &MUNGER,
            StrategyKind::CathieWood => &WOOD,
            StrategyKind::BillAckman => &ACKMAN,
            StrategyKind::Degen => &DEGEN,
            StrategyKind::SolanaSpecialist => &SOLANA,
            StrategyKind::WhaleWatcher => &WHALE,
            StrategyKind::PumpTrader => &PUMP,
            StrategyKind::OnChainAnalyst => &ONCHAIN,
            StrategyKind::RiskManager => &RISK_MANAGER,
            StrategyKind::PortfolioManager => &PORTFOLIO_MANAGER,
        }
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }
}

/// Profiles of every strategy, in catalogue order.
pub fn catalogue() -> Vec<&'static StrategyProfile> {
    StrategyKind::ALL.iter().map(StrategyKind::profile).collect()
}

static BUFFETT: StrategyProfile = StrategyProfile {
    name: "Warren Buffett",
    description: "Value investor. Durable moats, real utility and a margin of safety.",
    risk_tolerance: RiskTolerance::Low,
    time_horizon: TimeHorizon::Long,
    focus_areas: &[
        "Sustainable competitive advantage",
        "Real-world utility and revenue",
        "Team track record",
        "Valuation versus intrinsic value",
    ],
};

static BURRY: StrategyProfile = StrategyProfile {
    name: "Michael Burry",
    description: "Contrarian. Hunts for bubbles, hidden leverage and mispriced downside.",
    risk_tolerance: RiskTolerance::Medium,
    time_horizon: TimeHorizon::Medium,
    focus_areas: &[
        "Bubble and euphoria indicators",
        "Token unlocks and dilution",
        "Leverage in the system",
        "Crowded trades",
    ],
};

static MUNGER: StrategyProfile = StrategyProfile {
    name: "Charlie Munger",
    description: "Mental-models generalist. Inverts the thesis and avoids stupidity.",
    risk_tolerance: RiskTolerance::Low,
    time_horizon: TimeHorizon::Long,
    focus_areas: &[
        "Incentive structures",
        "Inversion: how does this fail",
        "Quality of the business model",
        "Simplicity of the thesis",
    ],
};

static WOOD: StrategyProfile = StrategyProfile {
    name: "Cathie Wood",
    description: "Disruptive-innovation investor. Exponential adoption curves.",
    risk_tolerance: RiskTolerance::High,
    time_horizon: TimeHorizon::Long,
    focus_areas: &[
        "Technology adoption curve",
        "Network effects",
        "Total addressable market",
        "Developer activity",
    ],
};

static ACKMAN: StrategyProfile = StrategyProfile {
    name: "Bill Ackman",
    description: "Activist investor. Concentrated bets with a clear catalyst.",
    risk_tolerance: RiskTolerance::Medium,
    time_horizon: TimeHorizon::Medium,
    focus_areas: &[
        "Identifiable catalysts",
        "Governance and treasury management",
        "Asymmetric payoff",
        "Free cash flow equivalents",
    ],
};

static DEGEN: StrategyProfile = StrategyProfile {
    name: "Degen Trader",
    description: "Momentum and narrative trader for fast-moving tokens.",
    risk_tolerance: RiskTolerance::Extreme,
    time_horizon: TimeHorizon::Short,
    focus_areas: &[
        "Short-term momentum",
        "Narrative and social buzz",
        "Volume spikes",
        "Entry and exit timing",
    ],
};

static SOLANA: StrategyProfile = StrategyProfile {
    name: "Solana Specialist",
    description: "Chain specialist. Ecosystem flows, DEX liquidity and launchpads.",
    risk_tolerance: RiskTolerance::High,
    time_horizon: TimeHorizon::Short,
    focus_areas: &[
        "DEX liquidity depth",
        "Ecosystem capital rotation",
        "Launchpad and listing dynamics",
        "Chain-level activity",
    ],
};

static WHALE: StrategyProfile = StrategyProfile {
    name: "Whale Watcher",
    description: "Tracks large holders and smart-money wallet flows.",
    risk_tolerance: RiskTolerance::Medium,
    time_horizon: TimeHorizon::Short,
    focus_areas: &[
        "Holder concentration",
        "Large wallet accumulation or distribution",
        "Exchange inflows and outflows",
        "Smart-money positioning",
    ],
};

static PUMP: StrategyProfile = StrategyProfile {
    name: "Pump Trader",
    description: "Fresh-launch specialist. Bonding curves, graduations and rug risk.",
    risk_tolerance: RiskTolerance::Extreme,
    time_horizon: TimeHorizon::Short,
    focus_areas: &[
        "Launch age and bonding curve progress",
        "Developer wallet behavior",
        "Rug-pull indicators",
        "Early holder distribution",
    ],
};

static ONCHAIN: StrategyProfile = StrategyProfile {
    name: "On-Chain Analyst",
    description: "Reads holder growth, transaction flow and liquidity health.",
    risk_tolerance: RiskTolerance::Medium,
    time_horizon: TimeHorizon::Medium,
    focus_areas: &[
        "Holder growth",
        "Transaction counts and unique wallets",
        "Liquidity to market cap ratio",
        "Buy versus sell pressure",
    ],
};

static RISK_MANAGER: StrategyProfile = StrategyProfile {
    name: "Risk Manager",
    description: "Portfolio risk controller. Position sizing, correlation analysis, and risk limits.",
    risk_tolerance: RiskTolerance::Low,
    time_horizon: TimeHorizon::Medium,
    focus_areas: &[
        "Position sizing recommendations",
        "Portfolio concentration analysis",
        "Volatility assessment",
        "Liquidity risk evaluation",
        "Correlation with existing positions",
        "Stop loss and take profit levels",
    ],
};

static PORTFOLIO_MANAGER: StrategyProfile = StrategyProfile {
    name: "Portfolio Manager",
    description: "Final decision maker. Weighs every signal and the risk assessment.",
    risk_tolerance: RiskTolerance::Medium,
    time_horizon: TimeHorizon::Medium,
    focus_areas: &[
        "Signal consensus and disagreement",
        "Conviction weighting",
        "Execution planning",
        "Portfolio fit",
    ],
};

/// A pluggable analysis strategy producing one signal per invocation.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn profile(&self) -> &StrategyProfile;

    fn name(&self) -> &str {
        self.profile().name
    }

    async fn analyze(
        &self,
        token: &str,
        snapshot: &Snapshot,
        context: Option<&AnalysisContext>,
    ) -> Result<Signal, AgentError>;
}

/// Strategy that asks the completion service and parses the answer.
pub struct LlmStrategy {
    kind: StrategyKind,
    completion: Arc<dyn CompletionService>,
}

impl LlmStrategy {
    pub fn new(kind: StrategyKind, completion: Arc<dyn CompletionService>) -> Self {
        Self { kind, completion }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }
}

#[async_trait]
impl Strategy for LlmStrategy {
    fn profile(&self) -> &StrategyProfile {
        self.kind.profile()
    }

    async fn analyze(
        &self,
        token: &str,
        snapshot: &Snapshot,
        context: Option<&AnalysisContext>,
    ) -> Result<Signal, AgentError> {
        let start = Instant::now();
        let request = StrategyRequest {
            request_id: Uuid::new_v4(),
            token: token.to_string(),
            market_data: snapshot.clone(),
            context: context.cloned(),
        };

        let system_prompt = strategy_system_prompt(self.kind);
        let user_prompt = serde_json::to_string_pretty(&request)?;

        let raw = self.completion.complete(&system_prompt, &user_prompt).await?;
        if raw.trim().is_empty() {
            return Err(AgentError::Cli(format!("{} received an empty response", self.name())));
        }
        debug!(
            agent = %self.name(),
            elapsed_ms = start.elapsed().as_millis(),
            response_len = raw.len(),
            "Strategy completion received"
        );

        Ok(parse_signal(&raw, self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedCompletion;
    use hedgefund_models::signal::SignalAction;
    use std::collections::HashSet;

    #[test]
    fn catalogue_names_are_unique() {
        let names: HashSet<_> = StrategyKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn catalogue_lists_management_last() {
        let names: Vec<_> = catalogue().iter().map(|p| p.name).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "Warren Buffett");
        assert_eq!(names[10..], ["Risk Manager", "Portfolio Manager"]);
    }

    #[test]
    fn profile_serializes_lowercase_enums() {
        let json = serde_json::to_value(StrategyKind::Degen.profile()).unwrap();
        assert_eq!(json["name"], "Degen Trader");
        assert_eq!(json["risk_tolerance"], "extreme");
        assert_eq!(json["time_horizon"], "short");
        assert!(json["focus_areas"].as_array().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn llm_strategy_parses_completion() {
        let completion = Arc::new(ScriptedCompletion::new(
            r#"{"action": "bearish", "confidence": 64, "reasoning": "Unlock next week"}"#,
        ));
        let strategy = LlmStrategy::new(StrategyKind::MichaelBurry, completion.clone());
        let snapshot = Snapshot::new("JUP", "solana").with_price(0.92);

        let signal = strategy.analyze("JUP", &snapshot, None).await.unwrap();
        assert_eq!(signal.agent_name, "Michael Burry");
        assert_eq!(signal.action, SignalAction::Bearish);
        assert_eq!(signal.confidence, 64.0);

        let prompts = completion.calls();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.contains("Michael Burry"));
        assert!(prompts[0].1.contains("\"token\": \"JUP\""));
    }

    #[tokio::test]
    async fn llm_strategy_propagates_completion_failure() {
        let completion = Arc::new(ScriptedCompletion::failing("claude exited 1"));
        let strategy = LlmStrategy::new(StrategyKind::Degen, completion);
        let snapshot = Snapshot::new("WIF", "solana").with_price(2.1);

        let result = strategy.analyze("WIF", &snapshot, None).await;
        assert!(matches!(result, Err(AgentError::Cli(_))));
    }

    #[tokio::test]
    async fn blank_completion_is_a_failure_not_a_neutral_signal() {
        let completion = Arc::new(ScriptedCompletion::new(" \n\t "));
        let strategy = LlmStrategy::new(StrategyKind::WhaleWatcher, completion);
        let snapshot = Snapshot::new("WIF", "solana").with_price(2.1);

        let result = strategy.analyze("WIF", &snapshot, None).await;
        assert!(matches!(result, Err(AgentError::Cli(_))));
    }
}
