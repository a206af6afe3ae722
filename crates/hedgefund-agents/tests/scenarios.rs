//! End-to-end pipeline scenarios.
//!
//! Each test seeds an in-memory SQLite cache with market snapshots, wires the
//! orchestrator to completion-backed strategies whose replies are scripted per
//! persona, and checks the report a caller would receive.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use hedgefund_agents::roster::roster_for;
use hedgefund_agents::{AgentError, CompletionService, Orchestrator, StrategySet};
use hedgefund_cache::{CacheReader, SqliteReader};
use hedgefund_models::cache_schema::{key_patterns, CacheCategory, CacheRow};
use hedgefund_models::config::{AgentsConfig, AnalysisMode};
use hedgefund_models::decision::{Conviction, DecisionAction};
use hedgefund_models::signal::SignalAction;
use hedgefund_models::Sentiment;
use rust_decimal_macros::dec;

/// Completion service answering by persona: the first scripted name found in
/// the system prompt selects the reply.
struct DeskCompletion {
    replies: Vec<(&'static str, String)>,
    default: Option<String>,
    calls: AtomicUsize,
}

impl DeskCompletion {
    fn new(default: Option<&str>) -> Self {
        Self {
            replies: Vec::new(),
            default: default.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    fn reply(mut self, persona: &'static str, text: &str) -> Self {
        self.replies.push((persona, text.to_string()));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for DeskCompletion {
    async fn complete(&self, system_prompt: &str, _user_prompt: &str) -> Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .iter()
            .find(|(persona, _)| system_prompt.contains(persona))
            .map(|(_, reply)| reply.clone())
            .or_else(|| self.default.clone())
            .ok_or_else(|| AgentError::Cli("claude exited 1: overloaded".to_string()))
    }
}

fn seed(sqlite: &SqliteReader, token: &str, snapshot: serde_json::Value) {
    sqlite
        .put_json(
            &key_patterns::snapshot("solana", token),
            CacheCategory::Snapshot,
            Some(&token.to_lowercase()),
            &snapshot,
            ChronoDuration::hours(1),
        )
        .unwrap();
}

fn setup_market() -> Arc<CacheReader> {
    let sqlite = SqliteReader::open_in_memory().unwrap();
    seed(
        &sqlite,
        "WIF",
        serde_json::json!({
            "price": 2.14,
            "market_cap": 2140000000.0,
            "volume_24h": 412000000.0,
            "liquidity": 38000000.0,
            "change_24h": 11.8,
            "holders": 187000,
            "dex": "raydium"
        }),
    );
    seed(&sqlite, "GHOST", serde_json::json!({"market_cap": 12000.0}));

    let now = Utc::now();
    sqlite
        .insert(&CacheRow {
            key: key_patterns::snapshot("solana", "STALE"),
            category: "snapshot".to_string(),
            value_json: r#"{"price": 0.5}"#.to_string(),
            source: "test".to_string(),
            symbol: Some("stale".to_string()),
            created_at: (now - ChronoDuration::hours(2)).to_rfc3339(),
            expires_at: (now - ChronoDuration::hours(1)).to_rfc3339(),
            updated_at: (now - ChronoDuration::hours(2)).to_rfc3339(),
        })
        .unwrap();

    Arc::new(CacheReader::new(sqlite, 100, Duration::from_secs(60)))
}

fn orchestrator(mode: AnalysisMode, desk: Arc<DeskCompletion>) -> Orchestrator {
    let config = AgentsConfig {
        mode,
        ..AgentsConfig::default()
    };
    let strategies = StrategySet::for_mode(mode, desk.clone(), desk);
    Orchestrator::new(setup_market(), strategies, config)
}

const BUY_DECISION: &str = r#"Here is my decision:
```json
{
  "action": "buy",
  "conviction": "medium",
  "confidence": 68,
  "reasoning": "Momentum and on-chain growth outweigh valuation concerns",
  "execution_plan": {
    "entry_price": "2.14",
    "position_size_pct": "4",
    "stop_loss": "1.92",
    "take_profit": ["2.60", "3.10"]
  }
}
```"#;

#[tokio::test]
async fn full_mode_produces_complete_report() {
    let desk = Arc::new(
        DeskCompletion::new(Some(
            r#"{"action": "bullish", "confidence": 70, "reasoning": "Trend intact"}"#,
        ))
        .reply("Portfolio Manager", BUY_DECISION)
        .reply(
            "Michael Burry",
            r#"{"action": "bearish", "confidence": 75, "reasoning": "Crowded trade", "risks": ["euphoria"]}"#,
        )
        .reply("Charlie Munger", "I remain neutral: no moat, but no obvious failure either.")
        .reply(
            "Risk Manager",
            r#"{"action": "neutral", "confidence": 60, "reasoning": "Size small",
                "position_size": "4%", "take_profit_levels": ["2.6"]}"#,
        ),
    );
    let orchestrator = orchestrator(AnalysisMode::Full, desk.clone());

    let report = orchestrator.analyze("WIF", None, None).await.ready().unwrap();

    let expected: Vec<_> = roster_for(AnalysisMode::Full)
        .iter()
        .map(|k| k.name().to_string())
        .collect();
    let agents: Vec<_> = report.agent_signals.iter().map(|s| s.agent.clone()).collect();
    assert_eq!(agents, expected);
    assert_eq!(desk.calls(), 12);

    let burry = &report.agent_signals[1];
    assert_eq!(burry.action, SignalAction::Bearish);
    assert_eq!(burry.risks, vec!["euphoria"]);

    let munger = &report.agent_signals[2];
    assert_eq!(munger.action, SignalAction::Neutral);
    assert_eq!(munger.confidence, 50.0);
    assert!(munger.reasoning.starts_with("I remain neutral"));

    let risk = report.risk_assessment.as_ref().unwrap();
    assert_eq!(risk.agent, "Risk Manager");

    let decision = &report.final_decision;
    assert_eq!(decision.action, DecisionAction::Buy);
    assert_eq!(decision.conviction, Conviction::Medium);
    let plan = decision.execution_plan.as_ref().unwrap();
    assert_eq!(plan.stop_loss, Some(dec!(1.92)));
    assert_eq!(plan.take_profit, vec![dec!(2.60), dec!(3.10)]);

    assert!(report.summary.contains("- 8 agents bullish, 1 bearish\n"));
    assert!(report.summary.contains("- Final action: buy\n"));
    assert!(report.summary.contains("- Stop: 1.92\n"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["token"], "WIF");
    assert_eq!(json["chain"], "solana");
    assert_eq!(json["market_data"]["dex"], "raydium");
    assert_eq!(json["agent_signals"][0]["agent"], "Warren Buffett");
    assert!(json["agent_signals"][0].get("data_used").is_none());
}

#[tokio::test]
async fn all_strategies_failing_still_yields_decision() {
    let desk = Arc::new(DeskCompletion::new(None).reply(
        "Portfolio Manager",
        r#"{"action": "hold", "conviction": "low", "confidence": 20, "reasoning": "No signals"}"#,
    ));
    let orchestrator = orchestrator(AnalysisMode::Fast, desk.clone());

    let report = orchestrator.analyze("wif", None, None).await.ready().unwrap();

    assert!(report.agent_signals.is_empty());
    assert!(report.risk_assessment.is_none());
    assert_eq!(report.final_decision.action, DecisionAction::Hold);
    assert!(report.final_decision.execution_plan.is_none());
    assert!(report.summary.contains("- 0 agents bullish, 0 bearish\n"));
    assert_eq!(desk.calls(), 8);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["risk_assessment"].is_null());
}

#[tokio::test]
async fn missing_price_fails_fast() {
    let desk = Arc::new(DeskCompletion::new(Some(r#"{"action": "bullish"}"#)));
    let orchestrator = orchestrator(AnalysisMode::Degen, desk.clone());

    for token in ["GHOST", "STALE", "NOT_LISTED"] {
        let outcome = orchestrator.analyze(token, Some("solana"), None).await;
        assert!(outcome.is_unavailable(), "{token} should be unavailable");

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": format!("Could not fetch market data for {token}"),
                "token": token,
                "chain": "solana",
            })
        );
    }
    assert_eq!(desk.calls(), 0);
}

#[tokio::test]
async fn degen_mode_runs_seven_strategies() {
    let desk = Arc::new(
        DeskCompletion::new(Some(r#"{"action": "bearish", "confidence": 40}"#))
            .reply("Portfolio Manager", r#"{"action": "avoid", "conviction": "high"}"#),
    );
    let orchestrator = orchestrator(AnalysisMode::Degen, desk.clone());

    let report = orchestrator.analyze("WIF", None, None).await.ready().unwrap();
    assert_eq!(report.agent_signals.len(), 5);
    assert_eq!(report.agent_signals[3].agent, "Pump Trader");
    assert_eq!(report.final_decision.action, DecisionAction::Avoid);
    assert_eq!(desk.calls(), 7);
}

#[tokio::test]
async fn quick_batch_caps_and_keeps_order() {
    let desk = Arc::new(
        DeskCompletion::new(Some(r#"{"action": "bullish", "confidence": 66}"#))
            .reply("Risk Manager", "Bearish. Liquidity is fine but volatility is extreme."),
    );
    let orchestrator = orchestrator(AnalysisMode::Fast, desk);

    let mut tokens = vec!["WIF".to_string(), "GHOST".to_string()];
    tokens.extend((0..10).map(|i| format!("T{i}")));

    let outcomes = orchestrator.quick_batch(&tokens, None).await;
    assert_eq!(outcomes.len(), 10);
    assert!(outcomes[1].is_unavailable());
    assert!(outcomes[2..].iter().all(|o| o.is_unavailable()));

    let wif = outcomes.into_iter().next().unwrap().ready().unwrap();
    assert_eq!(wif.price, Some(2.14));
    assert_eq!(wif.change_24h, Some(11.8));
    assert_eq!(wif.signals.len(), 3);
    assert_eq!(wif.sentiment, Sentiment::Bullish);
    assert!(wif.quick_take.starts_with("Bullish lean"));
}
