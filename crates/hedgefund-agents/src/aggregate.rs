//! Sentiment aggregation and the human-readable texts derived from it.

use std::fmt::Display;

use hedgefund_models::analysis::Sentiment;
use hedgefund_models::decision::Decision;
use hedgefund_models::signal::{Signal, SignalAction};

/// Bullish and bearish vote counts of a signal set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub bullish: usize,
    pub bearish: usize,
}

impl Tally {
    pub fn of(signals: &[Signal]) -> Self {
        signals.iter().fold(Self::default(), |mut tally, signal| {
            match signal.action {
                SignalAction::Bullish => tally.bullish += 1,
                SignalAction::Bearish => tally.bearish += 1,
                SignalAction::Neutral => {}
            }
            tally
        })
    }

    pub fn sentiment(&self) -> Sentiment {
        classify(self.bullish, self.bearish)
    }
}

/// Classify `b` bullish against `r` bearish votes. Neutral votes do not count.
pub fn classify(b: usize, r: usize) -> Sentiment {
    if b > 2 * r {
        Sentiment::VeryBullish
    } else if b > r {
        Sentiment::Bullish
    } else if r > 2 * b {
        Sentiment::VeryBearish
    } else if r > b {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Mean confidence, 0 for an empty set.
pub fn average_confidence(signals: &[Signal]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    signals.iter().map(|s| s.confidence).sum::<f64>() / signals.len() as f64
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Markdown summary of a full analysis run.
pub fn summarize(signals: &[Signal], decision: &Decision) -> String {
    let tally = Tally::of(signals);
    let mut summary = format!(
        "**Analysis Complete**\n\
         - {} agents bullish, {} bearish\n\
         - Final action: {}\n\
         - Conviction: {}\n",
        tally.bullish,
        tally.bearish,
        decision.action.as_str(),
        decision.conviction.as_str(),
    );

    if let Some(plan) = &decision.execution_plan {
        summary.push_str(&format!(
            "\n**Execution Plan:**\n\
             - Entry: {}\n\
             - Size: {}%\n\
             - Stop: {}\n",
            or_na(plan.entry_price),
            or_na(plan.position_size_pct),
            or_na(plan.stop_loss),
        ));
    }

    summary
}

/// One-line verdict of the quick-signal pipeline.
pub fn quick_take(sentiment: Sentiment, avg_confidence: f64) -> String {
    format!("{} ({avg_confidence:.0}% avg confidence)", sentiment.headline())
}
