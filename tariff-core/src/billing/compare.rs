use crate::billing::aggregate::aggregate;
use crate::domain::{
    ComparisonReport, CostComparison, IntervalDuration, IntervalReading, MonthComparison,
    MonthlyBill, PeriodShare, RateSchedule, TariffConfig, UsageBreakdown,
};
use crate::error::{Result, TariffError};

/// Bills `readings` under all three schedules and compares them month by
/// month and over the whole input.
///
/// At least one full day of readings is required.
pub fn compare(readings: &[IntervalReading], config: &TariffConfig) -> Result<ComparisonReport> {
    let interval = config.validate()?;

    let required = interval.readings_per_day();
    if readings.len() < required {
        return Err(TariffError::InsufficientData {
            found: readings.len(),
            required,
        });
    }

    let [standard, tou, tou_ev] = config.schedules();
    let (standard_bills, tou_bills, tou_ev_bills) =
        run_schedules(readings, [&standard, &tou, &tou_ev], interval)?;

    // All three series come from the same readings, so their month keys line up.
    let months: Vec<MonthComparison> = standard_bills
        .iter()
        .zip(&tou_bills)
        .zip(&tou_ev_bills)
        .map(|((s, t), e)| {
            debug_assert!(s.month == t.month && t.month == e.month);
            MonthComparison {
                month: s.month,
                season: s.season,
                costs: CostComparison::from_totals(s.total_cost, t.total_cost, e.total_cost),
            }
        })
        .collect();

    let annual = CostComparison::from_totals(
        sum_totals(&standard_bills),
        sum_totals(&tou_bills),
        sum_totals(&tou_ev_bills),
    );
    let usage = usage_breakdown(&tou_bills, &tou_ev_bills);

    tracing::debug!(
        months = months.len(),
        cheapest = %annual.cheapest,
        "rate comparison complete"
    );

    Ok(ComparisonReport {
        months,
        annual,
        standard_bills,
        tou_bills,
        tou_ev_bills,
        usage,
    })
}

type BillSeries = (Vec<MonthlyBill>, Vec<MonthlyBill>, Vec<MonthlyBill>);

#[cfg(feature = "parallel")]
fn run_schedules(
    readings: &[IntervalReading],
    [standard, tou, tou_ev]: [&RateSchedule; 3],
    interval: IntervalDuration,
) -> Result<BillSeries> {
    let (standard, (tou, tou_ev)) = rayon::join(
        || aggregate(readings, standard, interval),
        || {
            rayon::join(
                || aggregate(readings, tou, interval),
                || aggregate(readings, tou_ev, interval),
            )
        },
    );
    Ok((standard?, tou?, tou_ev?))
}

#[cfg(not(feature = "parallel"))]
fn run_schedules(
    readings: &[IntervalReading],
    [standard, tou, tou_ev]: [&RateSchedule; 3],
    interval: IntervalDuration,
) -> Result<BillSeries> {
    Ok((
        aggregate(readings, standard, interval)?,
        aggregate(readings, tou, interval)?,
        aggregate(readings, tou_ev, interval)?,
    ))
}

fn sum_totals(bills: &[MonthlyBill]) -> f64 {
    bills.iter().map(|b| b.total_cost).sum()
}

/// Mean monthly kWh per period line across `bills`.
fn mean_period_kwh(bills: &[MonthlyBill]) -> Vec<(&'static str, f64)> {
    let mut sums: Vec<(&'static str, f64)> = Vec::new();
    for bill in bills {
        for (i, (period, line)) in bill.charges.period_lines().into_iter().enumerate() {
            match sums.get_mut(i) {
                Some((_, kwh)) => *kwh += line.kwh,
                None => sums.push((period, line.kwh)),
            }
        }
    }

    let n = bills.len().max(1) as f64;
    sums.into_iter().map(|(period, kwh)| (period, kwh / n)).collect()
}

fn usage_breakdown(tou_bills: &[MonthlyBill], tou_ev_bills: &[MonthlyBill]) -> UsageBreakdown {
    let n = tou_bills.len().max(1) as f64;
    UsageBreakdown {
        tou: PeriodShare::from_kwh(&mean_period_kwh(tou_bills)),
        tou_ev: PeriodShare::from_kwh(&mean_period_kwh(tou_ev_bills)),
        avg_tou_demand_charge: tou_bills.iter().map(|b| b.demand_charge).sum::<f64>() / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate_schedule::fixtures::duke_config;
    use crate::domain::ScheduleKind;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    fn half_hourly(start: OffsetDateTime, count: usize, kwh: f64) -> Vec<IntervalReading> {
        (0..count)
            .map(|i| IntervalReading::new(start + Duration::minutes(30 * i as i64), kwh))
            .collect()
    }

    #[test]
    fn fewer_than_one_day_is_insufficient() {
        let readings = half_hourly(datetime!(2024-07-06 00:00 -4), 47, 1.0);
        let err = compare(&readings, &duke_config()).unwrap_err();
        assert_eq!(err, TariffError::InsufficientData { found: 47, required: 48 });
    }

    #[test]
    fn exactly_one_day_is_enough() {
        let readings = half_hourly(datetime!(2024-07-06 00:00 -4), 48, 1.0);
        let report = compare(&readings, &duke_config()).unwrap();
        assert_eq!(report.months.len(), 1);
    }

    #[test]
    fn invalid_configuration_is_reported_before_data_checks() {
        let mut cfg = duke_config();
        cfg.interval_hours = -0.5;
        let err = compare(&[], &cfg).unwrap_err();
        assert!(matches!(err, TariffError::Configuration(_)));
    }

    #[test]
    fn identical_totals_pick_standard() {
        let mut cfg = duke_config();
        cfg.standard.summer_rate = 0.0;
        cfg.standard.tier1_rate = 0.0;
        cfg.standard.tier2_rate = 0.0;
        cfg.tou.energy.on_peak = 0.0;
        cfg.tou.energy.off_peak = 0.0;
        cfg.tou.energy.discount = 0.0;
        cfg.tou.demand.on_peak = 0.0;
        cfg.tou.demand.max = 0.0;
        cfg.tou_ev.discount_rate = 0.0;
        cfg.tou_ev.standard_rate = 0.0;

        let readings = half_hourly(datetime!(2024-02-01 00:00 -5), 48 * 40, 0.8);
        let report = compare(&readings, &cfg).unwrap();
        assert!(report.months.iter().all(|m| m.costs.cheapest == ScheduleKind::Standard));
        assert_eq!(report.annual.cheapest, ScheduleKind::Standard);
        assert_eq!(report.annual.tou_savings, 0.0);
    }

    #[test]
    fn monthly_rows_join_the_three_series() {
        let readings = half_hourly(datetime!(2024-04-20 00:00 -4), 48 * 30, 0.6);
        let report = compare(&readings, &duke_config()).unwrap();

        assert_eq!(report.months.len(), 2);
        for (i, row) in report.months.iter().enumerate() {
            assert_eq!(row.month, report.standard_bills[i].month);
            assert_eq!(row.costs.standard, report.standard_bills[i].total_cost);
            assert_eq!(row.costs.tou, report.tou_bills[i].total_cost);
            assert_eq!(row.costs.tou_ev, report.tou_ev_bills[i].total_cost);
            assert_eq!(row.costs.tou_savings, row.costs.standard - row.costs.tou);
            assert_eq!(row.costs.tou_ev_savings, row.costs.standard - row.costs.tou_ev);
        }

        let standard_sum: f64 = report.standard_bills.iter().map(|b| b.total_cost).sum();
        assert_eq!(report.annual.standard, standard_sum);
        let lowest = report
            .annual
            .standard
            .min(report.annual.tou)
            .min(report.annual.tou_ev);
        assert_eq!(report.annual.cheapest_cost(), lowest);
    }

    #[test]
    fn overnight_load_favours_tou_ev() {
        // Heavy charging 23:00-05:00 every night, light load otherwise.
        let readings: Vec<_> = (0..48 * 28)
            .map(|i| {
                let ts = datetime!(2024-02-01 00:00 -5) + Duration::minutes(30 * i);
                let hour = ts.hour();
                let kwh = if hour >= 23 || hour < 5 { 3.0 } else { 0.2 };
                IntervalReading::new(ts, kwh)
            })
            .collect();
        let report = compare(&readings, &duke_config()).unwrap();
        assert_eq!(report.annual.cheapest, ScheduleKind::TouEv);
        assert!(report.annual.tou_ev_savings > 0.0);
    }

    #[test]
    fn usage_breakdown_shares_sum_to_one_hundred() {
        let readings = half_hourly(datetime!(2024-06-01 00:00 -4), 48 * 45, 1.0);
        let report = compare(&readings, &duke_config()).unwrap();

        let tou_pct: f64 = report.usage.tou.iter().map(|s| s.share_pct).sum();
        let ev_pct: f64 = report.usage.tou_ev.iter().map(|s| s.share_pct).sum();
        assert!((tou_pct - 100.0).abs() < 1e-9);
        assert!((ev_pct - 100.0).abs() < 1e-9);

        let labels: Vec<_> = report.usage.tou.iter().map(|s| s.period).collect();
        assert_eq!(labels, vec!["on_peak", "off_peak", "discount"]);
        assert!(report.usage.avg_tou_demand_charge > 0.0);
    }

    #[test]
    fn comparison_is_idempotent() {
        let readings = half_hourly(datetime!(2024-09-15 00:00 -4), 48 * 30, 0.9);
        let cfg = duke_config();
        assert_eq!(compare(&readings, &cfg).unwrap(), compare(&readings, &cfg).unwrap());
    }
}
