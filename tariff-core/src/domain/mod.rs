pub mod bill;
pub mod interval_reading;
pub mod period;
pub mod rate_schedule;
pub mod report;

pub use bill::{DemandCharges, MonthlyBill, PeriodCharge, ScheduleCharges, StandardEnergy};
pub use interval_reading::{IntervalDuration, IntervalReading, MonthKey};
pub use period::{EvRatePeriod, RatePeriod, Season};
pub use rate_schedule::{
    DemandRates, HourWindow, RateSchedule, ScheduleKind, SeasonWindows, StandardRates,
    TariffConfig, TouEnergyRates, TouEvRates, TouPeriodTable, TouRates,
};
pub use report::{
    ComparisonReport, CostComparison, MonthComparison, PeriodShare, RangeAnalysis, UsageBreakdown,
};
