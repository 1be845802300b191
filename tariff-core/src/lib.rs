pub mod billing;
pub mod domain;
pub mod error;

pub use billing::{aggregate, analyze_range, compare};
pub use domain::{
    ComparisonReport, IntervalDuration, IntervalReading, MonthKey, MonthlyBill, RateSchedule,
    ScheduleKind, Season, TariffConfig,
};
pub use error::TariffError;
