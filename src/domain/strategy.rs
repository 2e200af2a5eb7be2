//! Signal generators: map a bar series to a position series.
//!
//! Three variants share one contract: `generate` returns a position per
//! bar, same length as the input, and never looks ahead. Warmup bars
//! (where a window does not fit yet) are Flat. A series shorter than a
//! variant's minimum lookback is an error, not an all-Flat result.

use super::error::SignalsimError;
use super::ohlcv::BarSeries;
use super::position::Position;
use super::rolling::{
    rolling_mean, rolling_mean_opt, rolling_sample_std, rolling_sum, simple_returns,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumParams {
    /// Bars between the two closes compared.
    pub lookback: usize,
    /// Momentum magnitude below which the signal is Flat.
    pub threshold: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        MomentumParams {
            lookback: 20,
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionParams {
    pub window: usize,
    /// Band width in standard deviations.
    pub std_devs: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        MeanReversionParams {
            window: 20,
            std_devs: 2.0,
        }
    }
}

/// Parameters for the physics-inspired variant. Price deviation from the
/// fast moving average acts as potential energy, the rolling return sum as
/// kinetic energy, and the fast/slow cross as an external force.
#[derive(Debug, Clone, PartialEq)]
pub struct HamiltonianParams {
    pub damping: f64,
    pub external_influence: f64,
    pub friction: f64,
    /// Scales the volatility-based dynamic threshold.
    pub price_threshold: f64,
    pub fast_window: usize,
    pub slow_window: usize,
    pub momentum_window: usize,
    pub volatility_window: usize,
}

impl Default for HamiltonianParams {
    fn default() -> Self {
        HamiltonianParams {
            damping: 0.15,
            external_influence: 0.4,
            friction: 0.03,
            price_threshold: 0.02,
            fast_window: 20,
            slow_window: 50,
            momentum_window: 10,
            volatility_window: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Momentum(MomentumParams),
    MeanReversion(MeanReversionParams),
    Hamiltonian(HamiltonianParams),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Momentum(_) => "momentum",
            Strategy::MeanReversion(_) => "mean-reversion",
            Strategy::Hamiltonian(_) => "hamiltonian",
        }
    }

    pub fn validate(&self) -> Result<(), SignalsimError> {
        let invalid = |reason: String| SignalsimError::InvalidConfiguration { reason };
        match self {
            Strategy::Momentum(p) => {
                if p.lookback == 0 {
                    return Err(invalid("momentum lookback must be positive".into()));
                }
                if p.threshold < 0.0 {
                    return Err(invalid("momentum threshold must not be negative".into()));
                }
            }
            Strategy::MeanReversion(p) => {
                if p.window < 2 {
                    return Err(invalid("mean-reversion window must be at least 2".into()));
                }
                if p.std_devs <= 0.0 {
                    return Err(invalid("mean-reversion std_devs must be positive".into()));
                }
            }
            Strategy::Hamiltonian(p) => {
                if p.fast_window == 0
                    || p.slow_window == 0
                    || p.momentum_window == 0
                    || p.volatility_window < 2
                {
                    return Err(invalid(
                        "hamiltonian windows must be positive (volatility window at least 2)"
                            .into(),
                    ));
                }
                if p.fast_window >= p.slow_window {
                    return Err(invalid(format!(
                        "hamiltonian fast window ({}) must be below slow window ({})",
                        p.fast_window, p.slow_window
                    )));
                }
                if p.price_threshold < 0.0 {
                    return Err(invalid(
                        "hamiltonian price_threshold must not be negative".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Minimum series length for the variant to produce any defined signal.
    pub fn min_bars(&self) -> usize {
        match self {
            Strategy::Momentum(p) => p.lookback + 1,
            Strategy::MeanReversion(p) => p.window,
            Strategy::Hamiltonian(p) => {
                // The volatility threshold is a rolling mean of a rolling
                // std, and the energy diff needs one prior defined bar.
                p.slow_window.max(2 * p.volatility_window - 1) + 1
            }
        }
    }

    /// Generate one position per bar. Pure: no state survives the call.
    pub fn generate(&self, series: &BarSeries) -> Result<Vec<Position>, SignalsimError> {
        let minimum = self.min_bars();
        if series.len() < minimum {
            return Err(SignalsimError::InsufficientData {
                bars: series.len(),
                minimum,
            });
        }

        let closes = series.closes();
        let positions = match self {
            Strategy::Momentum(p) => momentum_positions(&closes, p),
            Strategy::MeanReversion(p) => mean_reversion_positions(&closes, p),
            Strategy::Hamiltonian(p) => hamiltonian_positions(&closes, p),
        };
        debug_assert_eq!(positions.len(), series.len());
        Ok(positions)
    }
}

fn momentum_positions(closes: &[f64], params: &MomentumParams) -> Vec<Position> {
    let mut positions = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i < params.lookback {
            positions.push(Position::Flat);
            continue;
        }
        let momentum = closes[i] / closes[i - params.lookback] - 1.0;
        positions.push(if momentum > params.threshold {
            Position::Long
        } else if momentum < -params.threshold {
            Position::Short
        } else {
            Position::Flat
        });
    }
    positions
}

fn mean_reversion_positions(closes: &[f64], params: &MeanReversionParams) -> Vec<Position> {
    let means = rolling_mean(closes, params.window);
    let stds = rolling_sample_std(closes, params.window);

    let mut positions = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let position = match (means[i], stds[i]) {
            (Some(mean), Some(std)) => {
                let lower = mean - params.std_devs * std;
                let upper = mean + params.std_devs * std;
                if closes[i] < lower {
                    Position::Long
                } else if closes[i] > upper {
                    Position::Short
                } else {
                    Position::Flat
                }
            }
            _ => Position::Flat,
        };
        positions.push(position);
    }
    positions
}

fn hamiltonian_positions(closes: &[f64], params: &HamiltonianParams) -> Vec<Position> {
    let returns = simple_returns(closes);
    let fast = rolling_mean(closes, params.fast_window);
    let slow = rolling_mean(closes, params.slow_window);
    let momentum = rolling_sum(&returns, params.momentum_window);
    let volatility = rolling_sample_std(&returns, params.volatility_window);
    let vol_mean = rolling_mean_opt(&volatility, params.volatility_window);

    let energy: Vec<Option<f64>> = (0..closes.len())
        .map(|i| match (fast[i], slow[i], momentum[i]) {
            (Some(f), Some(s), Some(m)) => {
                let potential = (closes[i] - f) * (1.0 - params.damping);
                let kinetic = m * (1.0 - params.friction);
                let trend = if f > s { 1.0 } else { -1.0 };
                let external = trend * params.external_influence;
                Some(potential + kinetic + external)
            }
            _ => None,
        })
        .collect();

    // Single left-to-right scan threading the last position: a bar whose
    // energy change stays inside the threshold inherits the prior position.
    let mut positions = Vec::with_capacity(closes.len());
    let mut last = Position::Flat;
    for i in 0..closes.len() {
        if i > 0 {
            if let (Some(prev), Some(curr), Some(vol)) = (energy[i - 1], energy[i], vol_mean[i]) {
                let threshold = vol * params.price_threshold;
                let change = curr - prev;
                if change > threshold {
                    last = Position::Long;
                } else if change < -threshold {
                    last = Position::Short;
                }
            }
        }
        positions.push(last);
    }
    positions
}
