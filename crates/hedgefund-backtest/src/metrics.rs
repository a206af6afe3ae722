use hedgefund_models::backtest::{EquityPoint, Trade};

/// Annualization factor applied to the per-bar Sharpe ratio.
///
/// Bars are not necessarily daily; the constant is kept fixed regardless of
/// bar spacing, so the result is an approximation.
pub const ANNUALIZATION_PERIODS: f64 = 252.0;

/// Share of winning trades, in percent. 0 when there are no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Largest peak-to-trough decline of the equity curve, in percent.
///
/// The running peak starts at `initial_balance`.
pub fn max_drawdown(equity_curve: &[EquityPoint], initial_balance: f64) -> f64 {
    let mut peak = initial_balance;
    let mut max_dd = 0.0f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak * 100.0);
        }
    }

    max_dd
}

/// Annualized Sharpe ratio of per-bar equity returns (population stddev).
pub fn sharpe_ratio(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
        .collect();

    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return 0.0;
    }

    mean / std_dev * ANNUALIZATION_PERIODS.sqrt()
}
