pub mod aggregate;
pub mod classify;
pub mod compare;
pub mod range;
pub mod tariff;

pub use aggregate::{aggregate, aggregate_with};
pub use classify::{classify_season, classify_tou_ev_period, classify_tou_period};
pub use compare::compare;
pub use range::analyze_range;
pub use tariff::{standard_energy, Tariff};
