//! Position sizing and portfolio risk gating.

use super::error::SignalsimError;

/// Static risk budget. Fractions are of portfolio value.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskLimits {
    pub max_position_size: f64,
    pub max_drawdown: f64,
    pub min_confidence: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        RiskLimits {
            max_position_size: 0.2,
            max_drawdown: 0.2,
            min_confidence: 0.55,
        }
    }
}

impl RiskLimits {
    pub fn validate(&self) -> Result<(), SignalsimError> {
        let invalid = |reason: String| SignalsimError::InvalidConfiguration { reason };
        if self.max_position_size <= 0.0 || self.max_position_size > 1.0 {
            return Err(invalid("max_position_size must be in (0, 1]".into()));
        }
        if self.max_drawdown <= 0.0 || self.max_drawdown > 1.0 {
            return Err(invalid("max_drawdown must be in (0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid("min_confidence must be in [0, 1]".into()));
        }
        Ok(())
    }
}

/// Outcome of a sizing request. `NoTrade` is a valid decision, not an
/// error: the risk rules decline the entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    Units(f64),
    NoTrade,
}

/// Converts a signal's confidence and an asset volatility estimate into a
/// bounded trade size. The portfolio value is the only mutable state and
/// changes only through [`RiskManager::update_portfolio_value`].
#[derive(Debug, Clone)]
pub struct RiskManager {
    limits: RiskLimits,
    portfolio_value: f64,
}

impl RiskManager {
    pub fn new(limits: RiskLimits, portfolio_value: f64) -> Self {
        RiskManager {
            limits,
            portfolio_value,
        }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn portfolio_value(&self) -> f64 {
        self.portfolio_value
    }

    /// Size an entry in asset units, or decline it.
    ///
    /// Confidence below the minimum threshold declines outright; otherwise
    /// the Kelly fraction, capped at `max_position_size`, sets the slice of
    /// portfolio value to commit.
    pub fn size_position(&self, confidence: f64, volatility: f64, price: f64) -> Sizing {
        if confidence < self.limits.min_confidence {
            return Sizing::NoTrade;
        }

        let kelly = Self::kelly_fraction(confidence, volatility);
        let fraction = kelly.min(self.limits.max_position_size);
        let position_value = self.portfolio_value * fraction;

        Sizing::Units(position_value / price)
    }

    /// Kelly fraction with `b = 1 + volatility` standing in for the
    /// win/loss payout ratio. Not a literal payout ratio, just monotone in
    /// volatility; preserved as documented behavior. Floored at zero.
    fn kelly_fraction(win_prob: f64, volatility: f64) -> f64 {
        let loss_prob = 1.0 - win_prob;
        let win_loss_ratio = 1.0 + volatility;
        let kelly = (win_prob * win_loss_ratio - loss_prob) / win_loss_ratio;
        kelly.max(0.0)
    }

    /// Pure gate consulted before acting on a sized entry. The caller owns
    /// drawdown tracking and passes the current figure.
    pub fn check_risk_limits(&self, current_drawdown: f64, _open_positions: usize) -> bool {
        current_drawdown <= self.limits.max_drawdown
    }

    /// Must be called after each capital-changing event; sizing never
    /// tracks trades implicitly.
    pub fn update_portfolio_value(&mut self, new_value: f64) {
        self.portfolio_value = new_value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn manager() -> RiskManager {
        RiskManager::new(RiskLimits::default(), 100_000.0)
    }

    #[test]
    fn low_confidence_declines() {
        let sizing = manager().size_position(0.54, 0.2, 50.0);
        assert_eq!(sizing, Sizing::NoTrade);
    }

    #[test]
    fn threshold_confidence_trades() {
        let sizing = manager().size_position(0.55, 0.2, 50.0);
        assert!(matches!(sizing, Sizing::Units(u) if u > 0.0));
    }

    #[test]
    fn kelly_clipped_to_max_position_size() {
        // kelly = (0.6 * 1.2 - 0.4) / 1.2 ≈ 0.267, clipped to 0.2
        // units = 100000 * 0.2 / 50 = 400
        let sizing = manager().size_position(0.6, 0.2, 50.0);
        match sizing {
            Sizing::Units(units) => assert_relative_eq!(units, 400.0, epsilon = 1e-9),
            Sizing::NoTrade => panic!("expected units"),
        }
    }

    #[test]
    fn kelly_below_cap_used_directly() {
        // kelly = (0.56 * 1.1 - 0.44) / 1.1 = 0.176 / 1.1 = 0.16
        let sizing = manager().size_position(0.56, 0.1, 100.0);
        let expected_fraction = (0.56 * 1.1 - 0.44) / 1.1;
        match sizing {
            Sizing::Units(units) => {
                assert_relative_eq!(units, 100_000.0 * expected_fraction / 100.0, epsilon = 1e-9)
            }
            Sizing::NoTrade => panic!("expected units"),
        }
    }

    #[test]
    fn kelly_never_negative() {
        // confidence barely above threshold with zero volatility:
        // kelly = (0.55 * 1.0 - 0.45) / 1.0 = 0.1, fine; force a negative
        // raw kelly by a permissive threshold instead.
        let limits = RiskLimits {
            min_confidence: 0.0,
            ..RiskLimits::default()
        };
        let manager = RiskManager::new(limits, 100_000.0);
        let sizing = manager.size_position(0.1, 0.0, 50.0);
        match sizing {
            Sizing::Units(units) => assert_eq!(units, 0.0),
            Sizing::NoTrade => panic!("expected zero units, not NoTrade"),
        }
    }

    #[test]
    fn units_bounded_by_max_position_value() {
        let manager = manager();
        for confidence in [0.55, 0.6, 0.8, 0.99] {
            for volatility in [0.0, 0.1, 0.5, 2.0] {
                if let Sizing::Units(units) = manager.size_position(confidence, volatility, 50.0) {
                    assert!(units >= 0.0);
                    assert!(units <= 0.2 * 100_000.0 / 50.0 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn drawdown_gate() {
        let manager = manager();
        assert!(manager.check_risk_limits(0.0, 0));
        assert!(manager.check_risk_limits(0.2, 0));
        assert!(!manager.check_risk_limits(0.21, 0));
        assert!(!manager.check_risk_limits(0.9, 1));
    }

    #[test]
    fn portfolio_value_update_changes_sizing() {
        let mut manager = manager();
        let before = manager.size_position(0.6, 0.2, 50.0);
        manager.update_portfolio_value(50_000.0);
        let after = manager.size_position(0.6, 0.2, 50.0);
        match (before, after) {
            (Sizing::Units(b), Sizing::Units(a)) => assert_relative_eq!(a, b / 2.0, epsilon = 1e-9),
            _ => panic!("expected units from both calls"),
        }
        assert_relative_eq!(manager.portfolio_value(), 50_000.0);
    }

    #[test]
    fn limits_validation() {
        assert!(RiskLimits::default().validate().is_ok());
        let bad = RiskLimits {
            max_position_size: 0.0,
            ..RiskLimits::default()
        };
        assert!(bad.validate().is_err());
        let bad = RiskLimits {
            max_drawdown: 1.5,
            ..RiskLimits::default()
        };
        assert!(bad.validate().is_err());
        let bad = RiskLimits {
            min_confidence: -0.1,
            ..RiskLimits::default()
        };
        assert!(bad.validate().is_err());
    }
}
