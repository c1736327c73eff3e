//! UTC calendar-day clock.
//!
//! Quota days roll over at UTC midnight. The clock is injected so the
//! ledger can be driven across day boundaries in tests.

use std::sync::Mutex;

use chrono::{Days, NaiveDate, Utc};

use crate::ProtocolError;

/// Source of the current quota day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    day: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self { day: Mutex::new(day) }
    }

    /// Build from a `YYYY-MM-DD` stamp.
    pub fn at(stamp: &str) -> Result<Self, ProtocolError> {
        parse_day(stamp).map(Self::new)
    }

    pub fn set(&self, day: NaiveDate) {
        *self.day.lock().unwrap_or_else(|e| e.into_inner()) = day;
    }

    /// Move forward by whole days.
    pub fn advance_days(&self, days: u64) {
        let mut day = self.day.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = day.checked_add_days(Days::new(days)) {
            *day = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.day.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse a `YYYY-MM-DD` day stamp.
pub fn parse_day(stamp: &str) -> Result<NaiveDate, ProtocolError> {
    NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
        .map_err(|e| ProtocolError::InvalidDay(stamp.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances_across_month_end() {
        let clock = FixedClock::at("2024-01-31").unwrap();
        clock.advance_days(1);
        assert_eq!(clock.today(), parse_day("2024-02-01").unwrap());
    }

    #[test]
    fn test_parse_day_rejects_time_component() {
        assert!(parse_day("2024-01-31T10:00:00").is_err());
        assert!(parse_day("31/01/2024").is_err());
    }
}
