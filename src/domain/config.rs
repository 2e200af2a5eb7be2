//! Typed configuration builders with validation.
//!
//! The INI surface is small: `[backtest]`, `[risk]`, and `[strategy]`
//! sections, every key optional except the strategy kind. Builders read
//! through [`ConfigPort`] so tests can feed string configs.

use crate::ports::config_port::ConfigPort;

use super::backtest::{BacktestConfig, ExitPolicy};
use super::error::SignalsimError;
use super::risk::RiskLimits;
use super::strategy::{HamiltonianParams, MeanReversionParams, MomentumParams, Strategy};

fn invalid(section: &str, key: &str, reason: &str) -> SignalsimError {
    SignalsimError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SignalsimError> {
    let defaults = BacktestConfig::default();

    let initial_capital = config.get_double("backtest", "initial_capital", defaults.initial_capital);
    if initial_capital <= 0.0 {
        return Err(invalid("backtest", "initial_capital", "must be positive"));
    }

    let position_size = config.get_double("backtest", "position_size", defaults.position_size);
    if position_size <= 0.0 || position_size > 1.0 {
        return Err(invalid("backtest", "position_size", "must be in (0, 1]"));
    }

    let stop_loss = config.get_double("backtest", "stop_loss", defaults.stop_loss);
    if stop_loss <= 0.0 {
        return Err(invalid("backtest", "stop_loss", "must be positive"));
    }

    let take_profit = config.get_double("backtest", "take_profit", defaults.take_profit);
    if take_profit <= 0.0 {
        return Err(invalid("backtest", "take_profit", "must be positive"));
    }

    let exit_policy = match config.get_string("backtest", "exit_policy") {
        None => defaults.exit_policy,
        Some(value) => match value.as_str() {
            "abandon" => ExitPolicy::Abandon,
            "close-at-end" => ExitPolicy::CloseAtEnd,
            _ => {
                return Err(invalid(
                    "backtest",
                    "exit_policy",
                    "expected 'abandon' or 'close-at-end'",
                ));
            }
        },
    };

    Ok(BacktestConfig {
        initial_capital,
        position_size,
        stop_loss,
        take_profit,
        exit_policy,
    })
}

pub fn build_risk_limits(config: &dyn ConfigPort) -> Result<RiskLimits, SignalsimError> {
    let defaults = RiskLimits::default();
    let limits = RiskLimits {
        max_position_size: config.get_double("risk", "max_position_size", defaults.max_position_size),
        max_drawdown: config.get_double("risk", "max_drawdown", defaults.max_drawdown),
        min_confidence: config.get_double("risk", "min_confidence", defaults.min_confidence),
    };
    limits.validate()?;
    Ok(limits)
}

/// Build a strategy from `[strategy] kind` plus per-variant keys.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<Strategy, SignalsimError> {
    let kind = config
        .get_string("strategy", "kind")
        .ok_or_else(|| SignalsimError::ConfigMissing {
            section: "strategy".into(),
            key: "kind".into(),
        })?;

    let strategy = match kind.as_str() {
        "momentum" => {
            let defaults = MomentumParams::default();
            Strategy::Momentum(MomentumParams {
                lookback: read_window(config, "lookback", defaults.lookback)?,
                threshold: config.get_double("strategy", "threshold", defaults.threshold),
            })
        }
        "mean-reversion" => {
            let defaults = MeanReversionParams::default();
            Strategy::MeanReversion(MeanReversionParams {
                window: read_window(config, "window", defaults.window)?,
                std_devs: config.get_double("strategy", "std_devs", defaults.std_devs),
            })
        }
        "hamiltonian" => {
            let defaults = HamiltonianParams::default();
            Strategy::Hamiltonian(HamiltonianParams {
                damping: config.get_double("strategy", "damping", defaults.damping),
                external_influence: config.get_double(
                    "strategy",
                    "external_influence",
                    defaults.external_influence,
                ),
                friction: config.get_double("strategy", "friction", defaults.friction),
                price_threshold: config.get_double(
                    "strategy",
                    "price_threshold",
                    defaults.price_threshold,
                ),
                fast_window: read_window(config, "fast_window", defaults.fast_window)?,
                slow_window: read_window(config, "slow_window", defaults.slow_window)?,
                momentum_window: read_window(config, "momentum_window", defaults.momentum_window)?,
                volatility_window: read_window(
                    config,
                    "volatility_window",
                    defaults.volatility_window,
                )?,
            })
        }
        other => {
            return Err(SignalsimError::InvalidConfiguration {
                reason: format!("unknown strategy kind: {other}"),
            });
        }
    };

    strategy.validate()?;
    Ok(strategy)
}

fn read_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, SignalsimError> {
    let value = config.get_int("strategy", key, default as i64);
    if value < 0 {
        return Err(invalid("strategy", key, "must not be negative"));
    }
    Ok(value as usize)
}
