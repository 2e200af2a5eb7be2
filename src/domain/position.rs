//! Directional positions, realized trades, and equity samples.

use chrono::NaiveDate;

/// Directional stance held from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Long,
    Flat,
    Short,
}

impl Position {
    pub fn signum(self) -> i8 {
        match self {
            Position::Long => 1,
            Position::Flat => 0,
            Position::Short => -1,
        }
    }

    pub fn is_long(self) -> bool {
        self == Position::Long
    }

    pub fn is_flat(self) -> bool {
        self == Position::Flat
    }

    pub fn is_short(self) -> bool {
        self == Position::Short
    }
}

/// A realized round trip. Created only by the simulator; immutable once
/// recorded. `exit_index > entry_index` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Currency committed at entry.
    pub position_size: f64,
    pub shares: f64,
    pub pnl: f64,
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub capital: f64,
}
