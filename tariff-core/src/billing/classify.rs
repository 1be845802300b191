use time::{Month, OffsetDateTime};

use crate::domain::{EvRatePeriod, HourWindow, RatePeriod, Season, TouPeriodTable};

pub fn classify_season(month: Month) -> Season {
    Season::for_month_number(month as u8)
}

/// TOU period of a reading starting at `ts`, read in `ts`'s own offset.
///
/// Discount hours are checked first and apply on every day, so an hour listed
/// in both windows bills as discount. On-peak applies only on the table's
/// weekdays. There is no holiday calendar.
pub fn classify_tou_period(ts: OffsetDateTime, table: &TouPeriodTable) -> RatePeriod {
    let windows = table.for_season(classify_season(ts.month()));
    let hour = ts.hour();

    if windows.is_discount_hour(hour) {
        return RatePeriod::Discount;
    }
    if windows.is_on_peak(ts.weekday().number_days_from_monday(), hour) {
        return RatePeriod::OnPeak;
    }
    RatePeriod::OffPeak
}

/// EV period of a reading starting at `ts`. Independent of season and weekday.
pub fn classify_tou_ev_period(ts: OffsetDateTime, discount_window: &HourWindow) -> EvRatePeriod {
    if discount_window.contains(ts.hour()) {
        EvRatePeriod::Discount
    } else {
        EvRatePeriod::Standard
    }
}
