//! Backtest simulator: turns a directional signal into realized trades,
//! an equity curve, and summary statistics.
//!
//! The run is single-threaded and deterministic, and all per-run state is
//! instance-scoped; independent runs can be parallelized by the caller
//! with no coordination.

use super::error::SignalsimError;
use super::metrics::Summary;
use super::ohlcv::{Bar, BarSeries};
use super::position::{EquityPoint, Position, Trade};
use super::risk::{RiskManager, Sizing};

/// What to do with a trade still open when the series ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Drop the trade: not logged, capital untouched. The original
    /// behavior; note it silently discards real open exposure.
    Abandon,
    /// Force-close at the final bar's close.
    CloseAtEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of current capital committed per entry (fixed sizing).
    pub position_size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub exit_policy: ExitPolicy,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            position_size: 0.1,
            stop_loss: 0.02,
            take_profit: 0.05,
            exit_policy: ExitPolicy::Abandon,
        }
    }
}

/// Per-bar directional call from an external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Up,
    Down,
}

impl Prediction {
    /// Map a {0, 1} classifier label; anything else is no prediction.
    pub fn from_label(label: u8) -> Option<Prediction> {
        match label {
            1 => Some(Prediction::Up),
            0 => Some(Prediction::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: Summary,
}

enum SizingMode<'a> {
    Fixed,
    Managed {
        confidences: &'a [f64],
        volatility: f64,
        risk: &'a mut RiskManager,
    },
}

#[derive(Debug, Clone)]
pub struct Backtester {
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Self {
        Backtester { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Classifier mode with fixed-fraction sizing: enter long at a bar's
    /// close when it is predicted Up and no position is open.
    pub fn run(
        &self,
        series: &BarSeries,
        predictions: &[Prediction],
    ) -> Result<BacktestReport, SignalsimError> {
        let entries = self.prediction_entries(series, predictions)?;
        self.simulate(series, &entries, SizingMode::Fixed)
    }

    /// Strategy mode: a Long position acts as an up-prediction.
    pub fn run_positions(
        &self,
        series: &BarSeries,
        positions: &[Position],
    ) -> Result<BacktestReport, SignalsimError> {
        if positions.len() != series.len() {
            return Err(SignalsimError::DimensionMismatch {
                bars: series.len(),
                values: positions.len(),
            });
        }
        let entries: Vec<bool> = positions.iter().map(|p| p.is_long()).collect();
        self.simulate(series, &entries, SizingMode::Fixed)
    }

    /// Classifier mode with dynamic sizing: each entry is gated on the
    /// running drawdown and sized by the risk manager from the bar's
    /// confidence. The portfolio value is pushed back into the risk
    /// manager after every close.
    pub fn run_managed(
        &self,
        series: &BarSeries,
        predictions: &[Prediction],
        confidences: &[f64],
        volatility: f64,
        risk: &mut RiskManager,
    ) -> Result<BacktestReport, SignalsimError> {
        let entries = self.prediction_entries(series, predictions)?;
        if confidences.len() != series.len() {
            return Err(SignalsimError::DimensionMismatch {
                bars: series.len(),
                values: confidences.len(),
            });
        }
        self.simulate(
            series,
            &entries,
            SizingMode::Managed {
                confidences,
                volatility,
                risk,
            },
        )
    }

    fn prediction_entries(
        &self,
        series: &BarSeries,
        predictions: &[Prediction],
    ) -> Result<Vec<bool>, SignalsimError> {
        if predictions.len() != series.len() {
            return Err(SignalsimError::DimensionMismatch {
                bars: series.len(),
                values: predictions.len(),
            });
        }
        Ok(predictions.iter().map(|p| *p == Prediction::Up).collect())
    }

    /// The run itself. Outer loop from bar 1 (bar 0 has no prior
    /// context); an entry resolves its exit eagerly by scanning forward,
    /// so capital steps at the entry bar's processing step and the curve
    /// is flat between entry and exit. Bars consumed by the exit scan are
    /// not entry-eligible, so trades never overlap.
    fn simulate(
        &self,
        series: &BarSeries,
        entries: &[bool],
        mut mode: SizingMode,
    ) -> Result<BacktestReport, SignalsimError> {
        let bars = series.bars();
        let mut capital = self.config.initial_capital;
        let mut peak = capital;
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(bars.len().saturating_sub(1));
        // Index of the last bar consumed by a closed trade.
        let mut consumed_until = 0usize;

        for i in 1..bars.len() {
            if entries[i] && i > consumed_until {
                if let Some(trade) = self.try_trade(bars, i, capital, peak, &mut mode) {
                    consumed_until = trade.exit_index;
                    capital += trade.pnl;
                    if capital > peak {
                        peak = capital;
                    }
                    if let SizingMode::Managed { risk, .. } = &mut mode {
                        risk.update_portfolio_value(capital);
                    }
                    trades.push(trade);
                }
            }
            equity_curve.push(EquityPoint {
                date: bars[i].date,
                capital,
            });
        }

        let summary = Summary::compute(self.config.initial_capital, &trades, &equity_curve);
        Ok(BacktestReport {
            trades,
            equity_curve,
            summary,
        })
    }

    /// Attempt an entry at `entry_index` and resolve it to a closed trade.
    /// Returns None when sizing declines the entry, the drawdown gate
    /// refuses, or no exit triggers and the policy abandons the trade.
    fn try_trade(
        &self,
        bars: &[Bar],
        entry_index: usize,
        capital: f64,
        peak: f64,
        mode: &mut SizingMode,
    ) -> Option<Trade> {
        let entry_price = bars[entry_index].close;

        let shares = match mode {
            SizingMode::Fixed => capital * self.config.position_size / entry_price,
            SizingMode::Managed {
                confidences,
                volatility,
                risk,
            } => {
                let drawdown = if peak > 0.0 { (peak - capital) / peak } else { 0.0 };
                if !risk.check_risk_limits(drawdown, 0) {
                    return None;
                }
                match risk.size_position(confidences[entry_index], *volatility, entry_price) {
                    Sizing::NoTrade => return None,
                    Sizing::Units(units) => units,
                }
            }
        };

        let exit_index = match self.find_exit(bars, entry_index, entry_price) {
            Some(j) => j,
            None => match self.config.exit_policy {
                ExitPolicy::Abandon => return None,
                ExitPolicy::CloseAtEnd => {
                    // An entry on the final bar has nothing to close into.
                    if entry_index + 1 >= bars.len() {
                        return None;
                    }
                    bars.len() - 1
                }
            },
        };

        let exit_price = bars[exit_index].close;
        Some(Trade {
            entry_index,
            exit_index,
            entry_date: bars[entry_index].date,
            exit_date: bars[exit_index].date,
            entry_price,
            exit_price,
            position_size: shares * entry_price,
            shares,
            pnl: (exit_price - entry_price) * shares,
            return_pct: (exit_price - entry_price) / entry_price,
        })
    }

    /// First bar past the entry whose running return crosses the stop-loss
    /// or take-profit threshold.
    fn find_exit(&self, bars: &[Bar], entry_index: usize, entry_price: f64) -> Option<usize> {
        for j in entry_index + 1..bars.len() {
            let running = (bars[j].close - entry_price) / entry_price;
            if running <= -self.config.stop_loss || running >= self.config.take_profit {
                return Some(j);
            }
        }
        None
    }
}
