use time::OffsetDateTime;

use crate::domain::bill::{MonthlyBill, PeriodCharge};
use crate::domain::interval_reading::MonthKey;
use crate::domain::period::Season;
use crate::domain::rate_schedule::ScheduleKind;

/// `part` as a percentage of `whole`, 0 when `whole` is not positive.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Totals of the three schedules over the same usage, with savings relative
/// to Standard.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CostComparison {
    pub standard: f64,
    pub tou: f64,
    pub tou_ev: f64,
    pub tou_savings: f64,
    pub tou_ev_savings: f64,
    pub tou_ev_vs_tou_savings: f64,
    pub tou_savings_pct: f64,
    pub tou_ev_savings_pct: f64,
    pub cheapest: ScheduleKind,
}

impl CostComparison {
    pub fn from_totals(standard: f64, tou: f64, tou_ev: f64) -> Self {
        let tou_savings = standard - tou;
        let tou_ev_savings = standard - tou_ev;

        // Strict `<` keeps the earlier schedule on exact ties.
        let mut cheapest = ScheduleKind::Standard;
        let mut best = standard;
        for (kind, cost) in [(ScheduleKind::Tou, tou), (ScheduleKind::TouEv, tou_ev)] {
            if cost < best {
                cheapest = kind;
                best = cost;
            }
        }

        Self {
            standard,
            tou,
            tou_ev,
            tou_savings,
            tou_ev_savings,
            tou_ev_vs_tou_savings: tou - tou_ev,
            tou_savings_pct: percent_of(tou_savings, standard),
            tou_ev_savings_pct: percent_of(tou_ev_savings, standard),
            cheapest,
        }
    }

    pub fn total_for(&self, kind: ScheduleKind) -> f64 {
        match kind {
            ScheduleKind::Standard => self.standard,
            ScheduleKind::Tou => self.tou,
            ScheduleKind::TouEv => self.tou_ev,
        }
    }

    pub fn cheapest_cost(&self) -> f64 {
        self.total_for(self.cheapest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MonthComparison {
    pub month: MonthKey,
    pub season: Season,
    pub costs: CostComparison,
}

/// Share of usage falling into one rate period.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PeriodShare {
    pub period: &'static str,
    pub kwh: f64,
    pub share_pct: f64,
}

impl PeriodShare {
    /// Shares of each line in `lines`, relative to their combined kWh.
    pub fn from_lines(lines: &[(&'static str, PeriodCharge)]) -> Vec<PeriodShare> {
        let kwh: Vec<_> = lines.iter().map(|&(period, l)| (period, l.kwh)).collect();
        Self::from_kwh(&kwh)
    }

    pub fn from_kwh(usage: &[(&'static str, f64)]) -> Vec<PeriodShare> {
        let total: f64 = usage.iter().map(|(_, kwh)| kwh).sum();
        usage
            .iter()
            .map(|&(period, kwh)| PeriodShare {
                period,
                kwh,
                share_pct: percent_of(kwh, total),
            })
            .collect()
    }
}

/// Average monthly usage per rate period across the whole report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UsageBreakdown {
    /// Mean monthly kWh per TOU period; shares relative to the mean monthly total.
    pub tou: Vec<PeriodShare>,
    pub tou_ev: Vec<PeriodShare>,
    pub avg_tou_demand_charge: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComparisonReport {
    pub months: Vec<MonthComparison>,
    pub annual: CostComparison,
    pub standard_bills: Vec<MonthlyBill>,
    pub tou_bills: Vec<MonthlyBill>,
    pub tou_ev_bills: Vec<MonthlyBill>,
    pub usage: UsageBreakdown,
}

impl ComparisonReport {
    pub fn bills_for(&self, kind: ScheduleKind) -> &[MonthlyBill] {
        match kind {
            ScheduleKind::Standard => &self.standard_bills,
            ScheduleKind::Tou => &self.tou_bills,
            ScheduleKind::TouEv => &self.tou_ev_bills,
        }
    }
}

/// Usage charges for an arbitrary window billed as one period.
///
/// Each bill's `month` is the month the window starts in. The comparison
/// ranks schedules on `usage_cost()` because the monthly customer charge is
/// not prorated over a partial window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RangeAnalysis {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub start: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub end: OffsetDateTime,
    pub season: Season,
    pub reading_count: usize,
    pub total_kwh: f64,
    pub standard: MonthlyBill,
    pub tou: MonthlyBill,
    pub tou_ev: MonthlyBill,
    pub tou_shares: Vec<PeriodShare>,
    pub tou_ev_shares: Vec<PeriodShare>,
    pub comparison: CostComparison,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_totals_resolve_to_standard() {
        let c = CostComparison::from_totals(100.0, 100.0, 100.0);
        assert_eq!(c.cheapest, ScheduleKind::Standard);
    }

    #[test]
    fn tou_beats_tou_ev_on_tie() {
        let c = CostComparison::from_totals(120.0, 90.0, 90.0);
        assert_eq!(c.cheapest, ScheduleKind::Tou);
        assert_eq!(c.cheapest_cost(), 90.0);
    }

    #[test]
    fn savings_are_relative_to_standard() {
        let c = CostComparison::from_totals(200.0, 150.0, 120.0);
        assert_eq!(c.tou_savings, 50.0);
        assert_eq!(c.tou_ev_savings, 80.0);
        assert_eq!(c.tou_ev_vs_tou_savings, 30.0);
        assert_eq!(c.tou_savings_pct, 25.0);
        assert_eq!(c.tou_ev_savings_pct, 40.0);
        assert_eq!(c.cheapest, ScheduleKind::TouEv);
    }

    #[test]
    fn zero_standard_total_gives_zero_percent() {
        let c = CostComparison::from_totals(0.0, 10.0, 5.0);
        assert_eq!(c.tou_savings_pct, 0.0);
        assert_eq!(c.tou_ev_savings_pct, 0.0);
        assert_eq!(c.cheapest, ScheduleKind::Standard);
    }

    #[test]
    fn shares_of_empty_usage_are_zero() {
        let shares = PeriodShare::from_lines(&[
            ("discount", PeriodCharge::at(0.0, 0.1)),
            ("standard", PeriodCharge::at(0.0, 0.2)),
        ]);
        assert!(shares.iter().all(|s| s.share_pct == 0.0));
    }
}
