use std::sync::Arc;
use std::time::{Duration, Instant};

use hedgefund_cache::SnapshotSource;
use hedgefund_models::agent_message::DecisionRequest;
use hedgefund_models::analysis::{AnalysisReport, DataUnavailable, Outcome, QuickSignalReport};
use hedgefund_models::config::{AgentsConfig, AnalysisMode};
use hedgefund_models::decision::Decision;
use hedgefund_models::market::{AnalysisContext, Snapshot};
use hedgefund_models::signal::{Signal, SignalView};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::aggregate::{average_confidence, quick_take, summarize, Tally};
use crate::claude_cli::ClaudeCli;
use crate::completion::CompletionService;
use crate::roster::{roster_for, QUICK_ROSTER};
use crate::strategy::{LlmStrategy, Strategy, StrategyKind};
use crate::synthesizer::{DecisionSynthesizer, LlmDecisionSynthesizer};

/// The strategies one orchestrator drives.
pub struct StrategySet {
    /// Signal stage, in roster order.
    pub roster: Vec<Arc<dyn Strategy>>,
    pub risk: Arc<dyn Strategy>,
    pub synthesizer: Arc<dyn DecisionSynthesizer>,
    /// Quick-signal roster.
    pub quick: Vec<Arc<dyn Strategy>>,
}

impl StrategySet {
    /// Completion-backed strategies for `mode`. Signal strategies and the risk
    /// assessor share `strategy_completion`; the synthesizer uses `decision_completion`.
    pub fn for_mode(
        mode: AnalysisMode,
        strategy_completion: Arc<dyn CompletionService>,
        decision_completion: Arc<dyn CompletionService>,
    ) -> Self {
        let build = |kind: StrategyKind| -> Arc<dyn Strategy> {
            Arc::new(LlmStrategy::new(kind, Arc::clone(&strategy_completion)))
        };

        Self {
            roster: roster_for(mode).into_iter().map(build).collect(),
            risk: build(StrategyKind::RiskManager),
            synthesizer: Arc::new(LlmDecisionSynthesizer::new(decision_completion)),
            quick: QUICK_ROSTER.into_iter().map(build).collect(),
        }
    }

    /// Strategies backed by the local `claude` CLI, models and timeout from config.
    pub fn claude(config: &AgentsConfig) -> Self {
        let timeout = Duration::from_secs(config.completion_timeout_seconds);
        Self::for_mode(
            config.mode,
            Arc::new(ClaudeCli::new(&config.strategy_model, timeout)),
            Arc::new(ClaudeCli::new(&config.decision_model, timeout)),
        )
    }
}

/// Coordinates strategies, aggregates their signals and drives the decision stage.
pub struct Orchestrator {
    market: Arc<dyn SnapshotSource>,
    strategies: StrategySet,
    config: AgentsConfig,
}

impl Orchestrator {
    pub fn new(
        market: Arc<dyn SnapshotSource>,
        strategies: StrategySet,
        config: AgentsConfig,
    ) -> Self {
        Self {
            market,
            strategies,
            config,
        }
    }

    pub fn config(&self) -> &AgentsConfig {
        &self.config
    }

    fn chain_or_default<'a>(&'a self, chain: Option<&'a str>) -> &'a str {
        chain.unwrap_or(&self.config.default_chain)
    }

    /// Full pipeline: signals, risk assessment, decision and summary.
    pub async fn analyze(
        &self,
        token: &str,
        chain: Option<&str>,
        context: Option<AnalysisContext>,
    ) -> Outcome<AnalysisReport> {
        let start = Instant::now();
        let chain = self.chain_or_default(chain);
        info!(token = %token, chain = %chain, strategies = self.strategies.roster.len(), "Starting analysis");

        let snapshot = match self.fetch_snapshot(token, chain).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(unavailable) => return Outcome::Unavailable(unavailable),
        };
        let context = context.map(Arc::new);

        let signals = run_strategies(
            &self.strategies.roster,
            token,
            Arc::clone(&snapshot),
            context.clone(),
        )
        .await;

        let tally = Tally::of(&signals);
        let avg_confidence = average_confidence(&signals);
        let risk_context =
            AnalysisContext::with_aggregate(context.as_deref(), tally.sentiment(), avg_confidence);

        let risk_assessment = match self
            .strategies
            .risk
            .analyze(token, &snapshot, Some(&risk_context))
            .await
        {
            Ok(signal) => Some(signal),
            Err(e) => {
                warn!(agent = %self.strategies.risk.name(), error = %e, "Risk assessment failed");
                None
            }
        };

        let request = DecisionRequest {
            request_id: Uuid::new_v4(),
            token: token.to_string(),
            market_data: (*snapshot).clone(),
            agent_signals: signals,
            risk_assessment,
            context: context.as_deref().cloned(),
        };

        let decision = match self.strategies.synthesizer.synthesize(&request).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(token = %token, error = %e, "Decision synthesis failed, holding");
                Decision::fallback_hold(format!("Decision synthesis failed: {e}"))
            }
        };

        let summary = summarize(&request.agent_signals, &decision);
        info!(
            token = %token,
            signals = request.agent_signals.len(),
            bullish = tally.bullish,
            bearish = tally.bearish,
            action = %decision.action.as_str(),
            elapsed_ms = start.elapsed().as_millis(),
            "Analysis complete"
        );

        let DecisionRequest {
            market_data,
            agent_signals,
            risk_assessment,
            ..
        } = request;

        Outcome::Ready(AnalysisReport {
            token: token.to_string(),
            chain: chain.to_string(),
            market_data,
            agent_signals: agent_signals.iter().map(SignalView::from).collect(),
            risk_assessment: risk_assessment.as_ref().map(SignalView::from),
            final_decision: decision,
            summary,
        })
    }

    /// Single-stage screening pipeline: sentiment and quick take, no decision.
    pub async fn quick_signal(&self, token: &str, chain: Option<&str>) -> Outcome<QuickSignalReport> {
        let start = Instant::now();
        let chain = self.chain_or_default(chain);

        let snapshot = match self.fetch_snapshot(token, chain).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(unavailable) => return Outcome::Unavailable(unavailable),
        };

        let signals =
            run_strategies(&self.strategies.quick, token, Arc::clone(&snapshot), None).await;
        let sentiment = Tally::of(&signals).sentiment();
        let confidence = average_confidence(&signals);

        info!(
            token = %token,
            signals = signals.len(),
            sentiment = ?sentiment,
            elapsed_ms = start.elapsed().as_millis(),
            "Quick signal complete"
        );

        Outcome::Ready(QuickSignalReport {
            token: token.to_string(),
            price: snapshot.price,
            change_24h: snapshot.change_24h,
            sentiment,
            confidence,
            signals: signals.iter().map(SignalView::from).collect(),
            quick_take: quick_take(sentiment, confidence),
        })
    }

    /// Quick signals for up to `batch_limit` tokens, one outcome per token, in input order.
    pub async fn quick_batch(
        &self,
        tokens: &[String],
        chain: Option<&str>,
    ) -> Vec<Outcome<QuickSignalReport>> {
        let limit = self.config.batch_limit;
        if tokens.len() > limit {
            warn!(requested = tokens.len(), limit, "Batch truncated");
        }

        let mut outcomes = Vec::with_capacity(tokens.len().min(limit));
        for token in tokens.iter().take(limit) {
            outcomes.push(self.quick_signal(token, chain).await);
        }
        outcomes
    }

    async fn fetch_snapshot(&self, token: &str, chain: &str) -> Result<Snapshot, DataUnavailable> {
        let unavailable = || DataUnavailable {
            error: format!("Could not fetch market data for {token}"),
            token: token.to_string(),
            chain: chain.to_string(),
        };

        match self.market.get_snapshot(token, chain).await {
            Ok(Some(snapshot)) if snapshot.has_price() => Ok(snapshot),
            Ok(_) => {
                warn!(token = %token, chain = %chain, "No price in market snapshot");
                Err(unavailable())
            }
            Err(e) => {
                warn!(token = %token, chain = %chain, error = %e, "Market data fetch failed");
                Err(unavailable())
            }
        }
    }
}

/// Run every strategy on its own task and collect the survivors in roster order.
async fn run_strategies(
    strategies: &[Arc<dyn Strategy>],
    token: &str,
    snapshot: Arc<Snapshot>,
    context: Option<Arc<AnalysisContext>>,
) -> Vec<Signal> {
    let handles: Vec<_> = strategies
        .iter()
        .map(|strategy| {
            let strategy = Arc::clone(strategy);
            let token = token.to_string();
            let snapshot = Arc::clone(&snapshot);
            let context = context.clone();

            tokio::spawn(async move {
                let agent_start = Instant::now();
                let result = strategy
                    .analyze(&token, &snapshot, context.as_deref())
                    .await;
                (strategy.name().to_string(), result, agent_start.elapsed())
            })
        })
        .collect();

    let mut signals = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok((name, Ok(signal), elapsed)) => {
                info!(
                    agent = %name,
                    action = %signal.action,
                    confidence = signal.confidence,
                    elapsed_ms = elapsed.as_millis(),
                    "Agent succeeded"
                );
                signals.push(signal);
            }
            Ok((name, Err(e), elapsed)) => {
                warn!(agent = %name, error = %e, elapsed_ms = elapsed.as_millis(), "Agent failed");
            }
            Err(e) => {
                error!(error = %e, "Agent task panicked");
            }
        }
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        CannedStrategy, CannedSynthesizer, FailingStrategy, PanickingStrategy, ScriptedCompletion,
        StaticSnapshots,
    };
    use hedgefund_models::analysis::Sentiment;
    use hedgefund_models::decision::{Conviction, DecisionAction};
    use hedgefund_models::signal::SignalAction;

    fn market() -> Arc<dyn SnapshotSource> {
        Arc::new(StaticSnapshots::new().with(Snapshot::new("SOL", "solana").with_price(148.2)))
    }

    fn arc<S: Strategy + 'static>(strategy: S) -> Arc<dyn Strategy> {
        Arc::new(strategy)
    }

    fn hold() -> Decision {
        Decision::new(DecisionAction::Hold, Conviction::Medium, 55.0, "wait", None)
    }

    #[test]
    fn strategy_set_for_mode_matches_roster() {
        let completion: Arc<dyn CompletionService> = Arc::new(ScriptedCompletion::new("{}"));
        let set = StrategySet::for_mode(AnalysisMode::Fast, completion.clone(), completion);
        assert_eq!(set.roster.len(), 6);
        assert_eq!(set.roster[0].name(), "Warren Buffett");
        assert_eq!(set.risk.name(), "Risk Manager");
        let quick: Vec<_> = set.quick.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(quick, ["Degen Trader", "On-Chain Analyst", "Risk Manager"]);
    }

    #[tokio::test]
    async fn failures_and_panics_are_dropped_in_order() {
        let set = StrategySet {
            roster: vec![
                arc(CannedStrategy::bullish(StrategyKind::WarrenBuffett, 70.0)),
                arc(FailingStrategy::new(StrategyKind::MichaelBurry)),
                arc(PanickingStrategy::new(StrategyKind::CharlieMunger)),
                arc(CannedStrategy::bearish(StrategyKind::Degen, 50.0)),
            ],
            risk: arc(CannedStrategy::neutral(StrategyKind::RiskManager, 60.0)),
            synthesizer: Arc::new(CannedSynthesizer::new(hold())),
            quick: Vec::new(),
        };
        let orchestrator = Orchestrator::new(market(), set, AgentsConfig::default());

        let report = orchestrator.analyze("SOL", None, None).await.ready().unwrap();
        let agents: Vec<_> = report.agent_signals.iter().map(|s| s.agent.as_str()).collect();
        assert_eq!(agents, ["Warren Buffett", "Degen Trader"]);
        assert_eq!(report.chain, "solana");
    }

    #[tokio::test]
    async fn risk_sees_aggregate_context() {
        let risk = Arc::new(CannedStrategy::neutral(StrategyKind::RiskManager, 60.0));
        let set = StrategySet {
            roster: vec![
                arc(CannedStrategy::bullish(StrategyKind::WarrenBuffett, 90.0)),
                arc(CannedStrategy::bullish(StrategyKind::CathieWood, 70.0)),
                arc(CannedStrategy::bearish(StrategyKind::MichaelBurry, 50.0)),
            ],
            risk: risk.clone(),
            synthesizer: Arc::new(CannedSynthesizer::new(hold())),
            quick: Vec::new(),
        };
        let orchestrator = Orchestrator::new(market(), set, AgentsConfig::default());

        let caller = AnalysisContext {
            notes: Some("small account".to_string()),
            ..Default::default()
        };
        orchestrator.analyze("SOL", None, Some(caller)).await;

        let seen = risk.seen_context().unwrap();
        assert_eq!(seen.aggregate_sentiment, Some(Sentiment::Bullish));
        assert_eq!(seen.avg_confidence, Some(70.0));
        assert_eq!(seen.notes.as_deref(), Some("small account"));
    }

    #[tokio::test]
    async fn failed_risk_and_synthesis_degrade() {
        let set = StrategySet {
            roster: vec![arc(CannedStrategy::bullish(StrategyKind::Degen, 80.0))],
            risk: arc(FailingStrategy::new(StrategyKind::RiskManager)),
            synthesizer: Arc::new(CannedSynthesizer::failing()),
            quick: Vec::new(),
        };
        let orchestrator = Orchestrator::new(market(), set, AgentsConfig::default());

        let report = orchestrator.analyze("SOL", None, None).await.ready().unwrap();
        assert!(report.risk_assessment.is_none());
        assert_eq!(report.final_decision.action, DecisionAction::Hold);
        assert_eq!(report.final_decision.conviction, Conviction::Low);
        assert_eq!(report.final_decision.confidence, 0.0);
        assert!(report.final_decision.reasoning.starts_with("Decision synthesis failed"));
    }

    #[tokio::test]
    async fn quick_signal_reports_sentiment() {
        let set = StrategySet {
            roster: Vec::new(),
            risk: arc(CannedStrategy::neutral(StrategyKind::RiskManager, 60.0)),
            synthesizer: Arc::new(CannedSynthesizer::new(hold())),
            quick: vec![
                arc(CannedStrategy::bullish(StrategyKind::Degen, 80.0)),
                arc(CannedStrategy::bullish(StrategyKind::OnChainAnalyst, 70.0)),
                arc(CannedStrategy::neutral(StrategyKind::RiskManager, 60.0)),
            ],
        };
        let orchestrator = Orchestrator::new(market(), set, AgentsConfig::default());

        let report = orchestrator.quick_signal("sol", None).await.ready().unwrap();
        assert_eq!(report.price, Some(148.2));
        assert_eq!(report.sentiment, Sentiment::VeryBullish);
        assert_eq!(report.confidence, 70.0);
        assert_eq!(report.signals.len(), 3);
        assert_eq!(report.quick_take, "Strong buy signal (70% avg confidence)");
        assert_eq!(report.signals[0].action, SignalAction::Bullish);
    }
}
