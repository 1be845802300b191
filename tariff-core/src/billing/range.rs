use time::OffsetDateTime;

use crate::billing::aggregate::bill_single_period;
use crate::domain::{
    CostComparison, IntervalReading, MonthKey, PeriodShare, RangeAnalysis, TariffConfig,
};
use crate::error::{Result, TariffError};

/// Bills the readings in `[start, end]` (inclusive) as one period under each
/// schedule.
///
/// The season, and therefore the Standard tiering, follows the month `start`
/// falls in. TOU readings are still classified by their own timestamps.
pub fn analyze_range(
    readings: &[IntervalReading],
    config: &TariffConfig,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<RangeAnalysis> {
    let interval = config.validate()?;

    let window: Vec<IntervalReading> = readings
        .iter()
        .filter(|r| r.ts >= start && r.ts <= end)
        .copied()
        .collect();
    if window.is_empty() {
        return Err(TariffError::EmptyRange { start, end });
    }

    let month = MonthKey {
        year: start.year(),
        month: start.month() as u8,
    };
    let season = month.season();

    let [standard, tou, tou_ev] = config.schedules();
    let standard = bill_single_period(&window, &standard, interval, month, season)?;
    let tou = bill_single_period(&window, &tou, interval, month, season)?;
    let tou_ev = bill_single_period(&window, &tou_ev, interval, month, season)?;

    let comparison =
        CostComparison::from_totals(standard.usage_cost(), tou.usage_cost(), tou_ev.usage_cost());

    tracing::debug!(
        readings = window.len(),
        %season,
        cheapest = %comparison.cheapest,
        "range analysis complete"
    );

    Ok(RangeAnalysis {
        start,
        end,
        season,
        reading_count: window.len(),
        total_kwh: tou.total_kwh,
        tou_shares: PeriodShare::from_lines(&tou.charges.period_lines()),
        tou_ev_shares: PeriodShare::from_lines(&tou_ev.charges.period_lines()),
        standard,
        tou,
        tou_ev,
        comparison,
    })
}
