//! Deterministic stand-ins for the completion service, strategies, the
//! decision synthesizer and the market-data source.
//!
//! Used by this crate's unit tests, its `tests/` suites and by downstream
//! crates that need an orchestrator without the Claude CLI.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use hedgefund_cache::{CacheError, SnapshotSource};
use hedgefund_models::agent_message::DecisionRequest;
use hedgefund_models::decision::Decision;
use hedgefund_models::market::{AnalysisContext, Snapshot};
use hedgefund_models::signal::{Signal, SignalAction};

use crate::completion::CompletionService;
use crate::error::AgentError;
use crate::strategy::{Strategy, StrategyKind, StrategyProfile};
use crate::synthesizer::DecisionSynthesizer;

/// Completion service returning a fixed reply and recording every prompt pair.
pub struct ScriptedCompletion {
    reply: Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with [`AgentError::Cli`].
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (system prompt, user prompt) of each call so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AgentError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((system_prompt.to_string(), user_prompt.to_string()));
        }
        self.reply.clone().map_err(AgentError::Cli)
    }
}

/// Strategy that always returns the same signal and records the context it saw.
pub struct CannedStrategy {
    kind: StrategyKind,
    action: SignalAction,
    confidence: f64,
    seen_context: Mutex<Option<AnalysisContext>>,
}

impl CannedStrategy {
    pub fn new(kind: StrategyKind, action: SignalAction, confidence: f64) -> Self {
        Self {
            kind,
            action,
            confidence,
            seen_context: Mutex::new(None),
        }
    }

    pub fn bullish(kind: StrategyKind, confidence: f64) -> Self {
        Self::new(kind, SignalAction::Bullish, confidence)
    }

    pub fn bearish(kind: StrategyKind, confidence: f64) -> Self {
        Self::new(kind, SignalAction::Bearish, confidence)
    }

    pub fn neutral(kind: StrategyKind, confidence: f64) -> Self {
        Self::new(kind, SignalAction::Neutral, confidence)
    }

    /// Context passed to the most recent `analyze` call.
    pub fn seen_context(&self) -> Option<AnalysisContext> {
        self.seen_context.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl Strategy for CannedStrategy {
    fn profile(&self) -> &StrategyProfile {
        self.kind.profile()
    }

    async fn analyze(
        &self,
        token: &str,
        _snapshot: &Snapshot,
        context: Option<&AnalysisContext>,
    ) -> Result<Signal, AgentError> {
        if let Ok(mut seen) = self.seen_context.lock() {
            *seen = context.cloned();
        }
        Ok(Signal::new(
            self.name(),
            self.action,
            self.confidence,
            format!("{} is {} on {token}", self.name(), self.action),
        ))
    }
}

/// Strategy whose completion always fails.
pub struct FailingStrategy {
    kind: StrategyKind,
}

impl FailingStrategy {
    pub fn new(kind: StrategyKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Strategy for FailingStrategy {
    fn profile(&self) -> &StrategyProfile {
        self.kind.profile()
    }

    async fn analyze(
        &self,
        _token: &str,
        _snapshot: &Snapshot,
        _context: Option<&AnalysisContext>,
    ) -> Result<Signal, AgentError> {
        Err(AgentError::Timeout(45))
    }
}

/// Strategy whose task panics, surfacing as a join error.
pub struct PanickingStrategy {
    kind: StrategyKind,
}

impl PanickingStrategy {
    pub fn new(kind: StrategyKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Strategy for PanickingStrategy {
    fn profile(&self) -> &StrategyProfile {
        self.kind.profile()
    }

    async fn analyze(
        &self,
        _token: &str,
        _snapshot: &Snapshot,
        _context: Option<&AnalysisContext>,
    ) -> Result<Signal, AgentError> {
        panic!("{} blew up", self.name())
    }
}

/// Synthesizer returning a fixed decision, or failing when built with `failing`.
pub struct CannedSynthesizer {
    decision: Option<Decision>,
    requests: Mutex<Vec<DecisionRequest>>,
}

impl CannedSynthesizer {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision: Some(decision),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            decision: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DecisionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DecisionSynthesizer for CannedSynthesizer {
    async fn synthesize(&self, request: &DecisionRequest) -> Result<Decision, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.decision
            .clone()
            .ok_or_else(|| AgentError::Cli("synthesizer unavailable".to_string()))
    }
}

/// In-memory snapshot source keyed by lowercased token.
#[derive(Default)]
pub struct StaticSnapshots {
    snapshots: HashMap<String, Snapshot>,
}

impl StaticSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, snapshot: Snapshot) -> Self {
        self.snapshots
            .insert(snapshot.token.to_ascii_lowercase(), snapshot);
        self
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshots {
    async fn get_snapshot(&self, token: &str, _chain: &str) -> Result<Option<Snapshot>, CacheError> {
        if token.eq_ignore_ascii_case("offline") {
            return Err(CacheError::Unavailable("provider offline".to_string()));
        }
        Ok(self.snapshots.get(&token.to_ascii_lowercase()).cloned())
    }
}
