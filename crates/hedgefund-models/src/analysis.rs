use serde::{Deserialize, Serialize};

use crate::decision::Decision;
use crate::market::Snapshot;
use crate::signal::SignalView;

/// Aggregate direction of a set of signals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    VeryBearish,
}

impl Sentiment {
    /// Short human phrase used in quick takes.
    pub fn headline(&self) -> &'static str {
        match self {
            Sentiment::VeryBullish => "Strong buy signal",
            Sentiment::Bullish => "Bullish lean",
            Sentiment::Neutral => "Mixed signals",
            Sentiment::Bearish => "Bearish lean",
            Sentiment::VeryBearish => "Strong sell/avoid signal",
        }
    }
}

/// Output bundle of the full analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub token: String,
    pub chain: String,
    pub market_data: Snapshot,
    pub agent_signals: Vec<SignalView>,
    pub risk_assessment: Option<SignalView>,
    pub final_decision: Decision,
    pub summary: String,
}

/// Output of the single-stage quick-signal pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickSignalReport {
    pub token: String,
    pub price: Option<f64>,
    pub change_24h: Option<f64>,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub signals: Vec<SignalView>,
    pub quick_take: String,
}

/// Returned instead of a report when no price could be obtained for the token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataUnavailable {
    pub error: String,
    pub token: String,
    pub chain: String,
}

/// A pipeline result: either the report or a structured data-unavailable error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Outcome<T> {
    Ready(T),
    Unavailable(DataUnavailable),
}

impl<T> Outcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(report) => Some(report),
            Outcome::Unavailable(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Outcome::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_serialization() {
        assert_eq!(
            serde_json::to_string(&Sentiment::VeryBullish).unwrap(),
            "\"very_bullish\""
        );
        assert_eq!(
            serde_json::to_string(&Sentiment::VeryBearish).unwrap(),
            "\"very_bearish\""
        );
    }

    #[test]
    fn unavailable_outcome_serializes_flat() {
        let outcome: Outcome<QuickSignalReport> = Outcome::Unavailable(DataUnavailable {
            error: "Could not fetch market data for NOPE".to_string(),
            token: "NOPE".to_string(),
            chain: "solana".to_string(),
        });

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["token"], "NOPE");
        assert_eq!(json["chain"], "solana");
        assert!(json["error"].as_str().unwrap().contains("NOPE"));
        assert!(outcome.is_unavailable());
    }

    #[test]
    fn ready_outcome_serializes_as_report() {
        let outcome = Outcome::Ready(QuickSignalReport {
            token: "SOL".to_string(),
            price: Some(142.0),
            change_24h: Some(-1.2),
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
            signals: vec![],
            quick_take: "Mixed signals (0% avg confidence)".to_string(),
        });

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["sentiment"], "neutral");
        assert!(json.get("error").is_none());
        assert_eq!(outcome.ready().unwrap().token, "SOL");
    }
}
