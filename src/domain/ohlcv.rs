//! OHLCV bar representation and validated bar series.

use chrono::NaiveDate;

use super::error::SignalsimError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    fn validate(&self) -> Result<(), SignalsimError> {
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(SignalsimError::BadSeries {
                reason: format!("non-positive price on {}", self.date),
            });
        }
        Ok(())
    }
}

/// A time-ordered series of bars.
///
/// Construction enforces the series invariants: non-empty, dates strictly
/// increasing, all prices positive. Everything downstream (signal
/// generation, the simulator) relies on these holding.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, SignalsimError> {
        if bars.is_empty() {
            return Err(SignalsimError::BadSeries {
                reason: "series is empty".into(),
            });
        }
        for bar in &bars {
            bar.validate()?;
        }
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SignalsimError::BadSeries {
                    reason: format!(
                        "dates not strictly increasing: {} then {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }
        Ok(BarSeries { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; an empty series cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
