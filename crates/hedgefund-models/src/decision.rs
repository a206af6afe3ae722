use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Buy,
    Sell,
    Hold,
    Avoid,
}

impl DecisionAction {
    /// Whether this action may carry an execution plan.
    pub fn is_executable(&self) -> bool {
        matches!(self, DecisionAction::Buy | DecisionAction::Sell)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Buy => "buy",
            DecisionAction::Sell => "sell",
            DecisionAction::Hold => "hold",
            DecisionAction::Avoid => "avoid",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Conviction {
    Low,
    Medium,
    High,
}

impl Conviction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conviction::Low => "low",
            Conviction::Medium => "medium",
            Conviction::High => "high",
        }
    }
}

/// How to enter a position the decision recommends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionPlan {
    pub entry_price: Option<Decimal>,
    /// Percentage of portfolio, 0 to 100.
    pub position_size_pct: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Vec<Decimal>,
}

/// Final synthesized decision for a token.
///
/// Deserialization goes through [`Decision::new`], so decoded values obey the
/// same rules as constructed ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "DecisionFields")]
pub struct Decision {
    pub action: DecisionAction,
    pub conviction: Conviction,
    /// 0 to 100.
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_plan: Option<ExecutionPlan>,
}

#[derive(Deserialize)]
struct DecisionFields {
    action: DecisionAction,
    conviction: Conviction,
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    execution_plan: Option<ExecutionPlan>,
}

impl From<DecisionFields> for Decision {
    fn from(fields: DecisionFields) -> Self {
        Decision::new(
            fields.action,
            fields.conviction,
            fields.confidence,
            fields.reasoning,
            fields.execution_plan,
        )
    }
}

impl Decision {
    /// Build a decision that satisfies the domain rules: confidence is clamped
    /// and the execution plan is dropped unless the action is buy or sell.
    pub fn new(
        action: DecisionAction,
        conviction: Conviction,
        confidence: f64,
        reasoning: impl Into<String>,
        execution_plan: Option<ExecutionPlan>,
    ) -> Self {
        Self {
            action,
            conviction,
            confidence: crate::signal::clamp_confidence(confidence),
            reasoning: reasoning.into(),
            execution_plan: execution_plan.filter(|_| action.is_executable()),
        }
    }

    /// Conservative decision used when synthesis could not run.
    pub fn fallback_hold(reasoning: impl Into<String>) -> Self {
        Self::new(DecisionAction::Hold, Conviction::Low, 0.0, reasoning, None)
    }
}
