//! Data access port trait.

use crate::domain::error::SignalsimError;
use crate::domain::ohlcv::BarSeries;

pub trait DataPort {
    /// Load the full bar history for a symbol, validated and time-ordered.
    fn load_bars(&self, symbol: &str) -> Result<BarSeries, SignalsimError>;

    fn list_symbols(&self) -> Result<Vec<String>, SignalsimError>;
}
