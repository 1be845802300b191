use std::fmt;

use crate::domain::interval_reading::IntervalDuration;
use crate::domain::period::Season;
use crate::error::{Result, TariffError};

/// Half-open hour-of-day window `[start, end)` in local civil time.
///
/// A window with `start > end` wraps past midnight, so `{23, 5}` covers
/// 23:00 through 04:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HourWindow {
    pub start: u8,
    pub end: u8,
}

impl HourWindow {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u8) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        if self.start > 23 || self.end > 24 || self.start == self.end {
            return Err(TariffError::Configuration(format!(
                "{what}: invalid hour window [{}, {})",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// On-peak and discount windows for one season of the TOU schedule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonWindows {
    /// Days on which on-peak applies, counted from Monday = 0.
    pub on_peak_days: Vec<u8>,
    pub on_peak_hours: Vec<HourWindow>,
    /// Discount hours apply on every day of the week.
    pub discount_hours: Vec<HourWindow>,
}

impl SeasonWindows {
    pub fn is_discount_hour(&self, hour: u8) -> bool {
        self.discount_hours.iter().any(|w| w.contains(hour))
    }

    pub fn is_on_peak(&self, weekday_from_monday: u8, hour: u8) -> bool {
        self.on_peak_days.contains(&weekday_from_monday)
            && self.on_peak_hours.iter().any(|w| w.contains(hour))
    }

    fn validate(&self, season: Season) -> Result<()> {
        if let Some(day) = self.on_peak_days.iter().find(|d| **d > 6) {
            return Err(TariffError::Configuration(format!(
                "tou {season} on-peak day {day} is not a weekday index (0 = Monday .. 6 = Sunday)"
            )));
        }
        for w in &self.on_peak_hours {
            w.validate(&format!("tou {season} on-peak"))?;
        }
        for w in &self.discount_hours {
            w.validate(&format!("tou {season} discount"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouPeriodTable {
    pub summer: SeasonWindows,
    pub winter: SeasonWindows,
}

impl TouPeriodTable {
    pub fn for_season(&self, season: Season) -> &SeasonWindows {
        match season {
            Season::Summer => &self.summer,
            Season::Winter => &self.winter,
        }
    }
}

/// Flat summer rate and a declining two-block winter rate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardRates {
    pub customer_charge: f64,
    pub summer_rate: f64,
    pub tier1_rate: f64,
    pub tier2_rate: f64,
    /// kWh billed at `tier1_rate` each winter month before `tier2_rate` applies.
    pub tier_threshold_kwh: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouEnergyRates {
    pub on_peak: f64,
    pub off_peak: f64,
    pub discount: f64,
}

/// $/kW rates applied to the month's peak interval demand.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DemandRates {
    pub on_peak: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouRates {
    pub customer_charge: f64,
    pub energy: TouEnergyRates,
    pub demand: DemandRates,
    pub periods: TouPeriodTable,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouEvRates {
    pub customer_charge: f64,
    pub discount_rate: f64,
    pub standard_rate: f64,
    pub discount_window: HourWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum ScheduleKind {
    Standard,
    Tou,
    TouEv,
}

impl ScheduleKind {
    /// Preference order used to break exact cost ties.
    pub const ALL: [ScheduleKind; 3] = [ScheduleKind::Standard, ScheduleKind::Tou, ScheduleKind::TouEv];

    pub fn label(&self) -> &'static str {
        match self {
            ScheduleKind::Standard => "Standard",
            ScheduleKind::Tou => "TOU",
            ScheduleKind::TouEv => "TOU-EV",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RateSchedule {
    Standard(StandardRates),
    Tou(TouRates),
    TouEv(TouEvRates),
}

impl RateSchedule {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            RateSchedule::Standard(_) => ScheduleKind::Standard,
            RateSchedule::Tou(_) => ScheduleKind::Tou,
            RateSchedule::TouEv(_) => ScheduleKind::TouEv,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            RateSchedule::Standard(r) => {
                check_rate("standard customer_charge", r.customer_charge)?;
                check_rate("standard summer_rate", r.summer_rate)?;
                check_rate("standard tier1_rate", r.tier1_rate)?;
                check_rate("standard tier2_rate", r.tier2_rate)?;
                check_rate("standard tier_threshold_kwh", r.tier_threshold_kwh)
            }
            RateSchedule::Tou(r) => {
                check_rate("tou customer_charge", r.customer_charge)?;
                check_rate("tou energy.on_peak", r.energy.on_peak)?;
                check_rate("tou energy.off_peak", r.energy.off_peak)?;
                check_rate("tou energy.discount", r.energy.discount)?;
                check_rate("tou demand.on_peak", r.demand.on_peak)?;
                check_rate("tou demand.max", r.demand.max)?;
                r.periods.summer.validate(Season::Summer)?;
                r.periods.winter.validate(Season::Winter)
            }
            RateSchedule::TouEv(r) => {
                check_rate("tou_ev customer_charge", r.customer_charge)?;
                check_rate("tou_ev discount_rate", r.discount_rate)?;
                check_rate("tou_ev standard_rate", r.standard_rate)?;
                r.discount_window.validate("tou_ev discount")
            }
        }
    }
}

fn check_rate(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TariffError::Configuration(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Everything the engine needs to bill a reading sequence.
///
/// There are no built-in defaults: every rate comes from the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TariffConfig {
    pub interval_hours: f64,
    pub standard: StandardRates,
    pub tou: TouRates,
    pub tou_ev: TouEvRates,
}

impl TariffConfig {
    /// Validates every schedule and returns the interval duration.
    pub fn validate(&self) -> Result<IntervalDuration> {
        let interval = IntervalDuration::from_hours(self.interval_hours)?;
        for schedule in self.schedules() {
            schedule.validate()?;
        }
        Ok(interval)
    }

    /// The three schedules in tie-break preference order.
    pub fn schedules(&self) -> [RateSchedule; 3] {
        [
            RateSchedule::Standard(self.standard.clone()),
            RateSchedule::Tou(self.tou.clone()),
            RateSchedule::TouEv(self.tou_ev.clone()),
        ]
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::duke_config;
    use super::*;

    #[test]
    fn hour_window_is_half_open() {
        let w = HourWindow::new(18, 21);
        assert!(!w.contains(17));
        assert!(w.contains(18));
        assert!(w.contains(20));
        assert!(!w.contains(21));
    }

    #[test]
    fn hour_window_wraps_past_midnight() {
        let w = HourWindow::new(23, 5);
        assert!(w.contains(23));
        assert!(w.contains(0));
        assert!(w.contains(4));
        assert!(!w.contains(5));
        assert!(!w.contains(22));
    }

    #[test]
    fn published_config_is_valid() {
        let interval = duke_config().validate().unwrap();
        assert_eq!(interval.hours(), 0.5);
    }

    #[test]
    fn zero_interval_is_a_configuration_error() {
        let mut cfg = duke_config();
        cfg.interval_hours = 0.0;
        assert!(matches!(cfg.validate(), Err(TariffError::Configuration(_))));
    }

    #[test]
    fn negative_rate_is_a_configuration_error() {
        let mut cfg = duke_config();
        cfg.tou.demand.max = -1.0;
        assert!(matches!(cfg.validate(), Err(TariffError::Configuration(_))));
    }

    #[test]
    fn bad_weekday_index_is_rejected() {
        let mut cfg = duke_config();
        cfg.tou.periods.winter.on_peak_days.push(7);
        assert!(matches!(cfg.validate(), Err(TariffError::Configuration(_))));
    }

    #[test]
    fn empty_hour_window_is_rejected() {
        let mut cfg = duke_config();
        cfg.tou_ev.discount_window = HourWindow::new(5, 5);
        assert!(matches!(cfg.validate(), Err(TariffError::Configuration(_))));
    }

    #[test]
    fn schedules_follow_preference_order() {
        let kinds: Vec<_> = duke_config().schedules().iter().map(RateSchedule::kind).collect();
        assert_eq!(kinds, ScheduleKind::ALL.to_vec());
    }
}
