use hedgefund_models::config::AnalysisMode;

use crate::strategy::StrategyKind;

/// Risk assessor and decision synthesizer, run after the signal stage.
pub const MANAGEMENT: [StrategyKind; 2] = [StrategyKind::RiskManager, StrategyKind::PortfolioManager];

/// Fixed roster of the quick-signal pipeline.
pub const QUICK_ROSTER: [StrategyKind; 3] = [
    StrategyKind::Degen,
    StrategyKind::OnChainAnalyst,
    StrategyKind::RiskManager,
];

const ALL_PERSONAS: [StrategyKind; 5] = [
    StrategyKind::WarrenBuffett,
    StrategyKind::MichaelBurry,
    StrategyKind::CharlieMunger,
    StrategyKind::CathieWood,
    StrategyKind::BillAckman,
];

const CORE_PERSONAS: [StrategyKind; 2] = [StrategyKind::WarrenBuffett, StrategyKind::MichaelBurry];

/// Signal-stage roster for a mode: personas first, then crypto strategies.
pub fn roster_for(mode: AnalysisMode) -> Vec<StrategyKind> {
    let (personas, crypto): (&[StrategyKind], &[StrategyKind]) = match mode {
        AnalysisMode::Full => (
            &ALL_PERSONAS,
            &[
                StrategyKind::Degen,
                StrategyKind::SolanaSpecialist,
                StrategyKind::WhaleWatcher,
                StrategyKind::OnChainAnalyst,
                StrategyKind::PumpTrader,
            ],
        ),
        AnalysisMode::Fast => (
            &CORE_PERSONAS,
            &[
                StrategyKind::Degen,
                StrategyKind::SolanaSpecialist,
                StrategyKind::WhaleWatcher,
                StrategyKind::OnChainAnalyst,
            ],
        ),
        AnalysisMode::Degen => (
            &CORE_PERSONAS,
            &[
                StrategyKind::Degen,
                StrategyKind::PumpTrader,
                StrategyKind::SolanaSpecialist,
            ],
        ),
    };

    personas.iter().chain(crypto).copied().collect()
}

/// Strategies a full pipeline run touches, management included.
pub fn total_strategies(mode: AnalysisMode) -> usize {
    roster_for(mode).len() + MANAGEMENT.len()
}
