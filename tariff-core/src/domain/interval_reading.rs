use std::fmt;

use time::OffsetDateTime;

use crate::domain::period::Season;
use crate::error::{Result, TariffError};

/// One metered interval: the energy delivered during a fixed-length window
/// starting at `ts`.
///
/// `ts` must already carry the utility's local civil offset. Hour, weekday and
/// month are read in that offset and no time-zone conversion happens later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalReading {
    pub ts: OffsetDateTime,
    pub kwh: f64,
}

impl IntervalReading {
    pub fn new(ts: OffsetDateTime, kwh: f64) -> Self {
        Self { ts, kwh }
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.ts.year(),
            month: self.ts.month() as u8,
        }
    }

    /// Rules:
    /// - kWh must be finite.
    /// - kWh must be non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.kwh.is_finite() {
            return Err(TariffError::InvalidReading {
                ts: self.ts,
                reason: "kwh must be finite".to_string(),
            });
        }
        if self.kwh < 0.0 {
            return Err(TariffError::InvalidReading {
                ts: self.ts,
                reason: format!("kwh must be non-negative, got {}", self.kwh),
            });
        }
        Ok(())
    }
}

/// Calendar month in local civil time, the grouping key for monthly bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MonthKey {
    pub year: i32,
    /// 1 = January.
    pub month: u8,
}

impl MonthKey {
    pub fn season(&self) -> Season {
        Season::for_month_number(self.month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Length of one metering interval.
///
/// Demand charges are billed on kW, so every kWh reading is converted with
/// `kw = kwh / hours`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalDuration {
    hours: f64,
}

impl IntervalDuration {
    pub fn from_hours(hours: f64) -> Result<Self> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(TariffError::Configuration(format!(
                "interval duration must be a positive number of hours, got {hours}"
            )));
        }
        Ok(Self { hours })
    }

    pub fn from_minutes(minutes: u32) -> Result<Self> {
        Self::from_hours(f64::from(minutes) / 60.0)
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn demand_kw(&self, kwh: f64) -> f64 {
        kwh / self.hours
    }

    /// Number of readings that make up one full day, rounded up.
    pub fn readings_per_day(&self) -> usize {
        // Absorb representation error, e.g. 24 / (1/3) = 72.00000000000001.
        (24.0 / self.hours - 1e-9).ceil().max(1.0) as usize
    }
}
