//! Summary statistics for a completed backtest run.

use super::position::{EquityPoint, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub profitable_trades: usize,
    pub win_rate: f64,
    /// Mean of realized trade return fractions.
    pub avg_return: f64,
    /// Peak-to-trough fraction over the equity curve.
    pub max_drawdown: f64,
    pub final_capital: f64,
    pub total_return: f64,
}

impl Summary {
    /// Computed once at the end of a run. "No trades yet" is a valid
    /// state: the ratio fields are 0 rather than an error.
    pub fn compute(initial_capital: f64, trades: &[Trade], equity_curve: &[EquityPoint]) -> Self {
        let total_trades = trades.len();
        let profitable_trades = trades.iter().filter(|t| t.return_pct > 0.0).count();

        let win_rate = if total_trades > 0 {
            profitable_trades as f64 / total_trades as f64
        } else {
            0.0
        };

        let avg_return = if total_trades > 0 {
            trades.iter().map(|t| t.return_pct).sum::<f64>() / total_trades as f64
        } else {
            0.0
        };

        let final_capital = equity_curve
            .last()
            .map(|p| p.capital)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_capital - initial_capital) / initial_capital
        } else {
            0.0
        };

        Summary {
            total_trades,
            profitable_trades,
            win_rate,
            avg_return,
            max_drawdown: max_drawdown(equity_curve),
            final_capital,
            total_return,
        }
    }
}

/// Largest peak-to-trough decline, one scan tracking the running peak.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.capital;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.capital > peak {
            peak = point.capital;
        } else if peak > 0.0 {
            let dd = (peak - point.capital) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
