use std::collections::BTreeMap;

use crate::billing::tariff::Tariff;
use crate::domain::{IntervalDuration, IntervalReading, MonthKey, MonthlyBill, RateSchedule, Season};
use crate::error::Result;

/// Bills `readings` month by month under `schedule`.
///
/// Returns one bill per calendar month present in the input, in chronological
/// order. Input order does not matter and months without readings are never
/// emitted. Partial months are billed on whatever readings they contain.
pub fn aggregate(
    readings: &[IntervalReading],
    schedule: &RateSchedule,
    interval: IntervalDuration,
) -> Result<Vec<MonthlyBill>> {
    match schedule {
        RateSchedule::Standard(rates) => aggregate_with(readings, rates, interval),
        RateSchedule::Tou(rates) => aggregate_with(readings, rates, interval),
        RateSchedule::TouEv(rates) => aggregate_with(readings, rates, interval),
    }
}

pub fn aggregate_with<T: Tariff>(
    readings: &[IntervalReading],
    tariff: &T,
    interval: IntervalDuration,
) -> Result<Vec<MonthlyBill>> {
    let mut months: BTreeMap<MonthKey, (usize, T::Usage)> = BTreeMap::new();

    for reading in readings {
        reading.validate()?;
        let (count, usage) = months.entry(reading.month_key()).or_default();
        *count += 1;
        tariff.record(usage, reading, interval);
    }

    let bills: Vec<MonthlyBill> = months
        .into_iter()
        .map(|(month, (count, usage))| settle(tariff, month, month.season(), count, &usage))
        .collect();

    tracing::debug!(
        schedule = %tariff.kind(),
        readings = readings.len(),
        months = bills.len(),
        "aggregated monthly bills"
    );

    Ok(bills)
}

/// Bills every reading in `readings` as a single period labelled `month`.
pub(crate) fn bill_single_period(
    readings: &[IntervalReading],
    schedule: &RateSchedule,
    interval: IntervalDuration,
    month: MonthKey,
    season: Season,
) -> Result<MonthlyBill> {
    match schedule {
        RateSchedule::Standard(rates) => single_period_with(readings, rates, interval, month, season),
        RateSchedule::Tou(rates) => single_period_with(readings, rates, interval, month, season),
        RateSchedule::TouEv(rates) => single_period_with(readings, rates, interval, month, season),
    }
}

fn single_period_with<T: Tariff>(
    readings: &[IntervalReading],
    tariff: &T,
    interval: IntervalDuration,
    month: MonthKey,
    season: Season,
) -> Result<MonthlyBill> {
    let mut usage = T::Usage::default();
    for reading in readings {
        reading.validate()?;
        tariff.record(&mut usage, reading, interval);
    }
    Ok(settle(tariff, month, season, readings.len(), &usage))
}

fn settle<T: Tariff>(
    tariff: &T,
    month: MonthKey,
    season: Season,
    reading_count: usize,
    usage: &T::Usage,
) -> MonthlyBill {
    MonthlyBill::new(
        month,
        season,
        reading_count,
        tariff.customer_charge(),
        tariff.settle(usage, season),
    )
}
