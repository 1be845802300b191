use crate::billing::classify::{classify_tou_ev_period, classify_tou_period};
use crate::domain::{
    DemandCharges, EvRatePeriod, IntervalDuration, IntervalReading, PeriodCharge, RatePeriod,
    ScheduleCharges, ScheduleKind, Season, StandardEnergy, StandardRates, TouEvRates, TouRates,
};

/// A rate schedule that can bill one period of readings.
///
/// `record` folds a single reading into the schedule's usage accumulator and
/// `settle` turns the accumulated usage into charges. Every reading lands in
/// exactly one period of the accumulator.
pub trait Tariff {
    type Usage: Default;

    fn kind(&self) -> ScheduleKind;

    fn customer_charge(&self) -> f64;

    fn record(&self, usage: &mut Self::Usage, reading: &IntervalReading, interval: IntervalDuration);

    fn settle(&self, usage: &Self::Usage, season: Season) -> ScheduleCharges;
}

/// Standard energy charge for `kwh` consumed in one month of `season`.
///
/// Winter is a declining two-block rate, continuous at the threshold.
pub fn standard_energy(rates: &StandardRates, kwh: f64, season: Season) -> StandardEnergy {
    match season {
        Season::Summer => StandardEnergy::Flat(PeriodCharge::at(kwh, rates.summer_rate)),
        Season::Winter => {
            let first = kwh.min(rates.tier_threshold_kwh);
            let excess = (kwh - rates.tier_threshold_kwh).max(0.0);
            StandardEnergy::Tiered {
                first_block: PeriodCharge::at(first, rates.tier1_rate),
                excess: PeriodCharge::at(excess, rates.tier2_rate),
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StandardUsage {
    pub kwh: f64,
}

impl Tariff for StandardRates {
    type Usage = StandardUsage;

    fn kind(&self) -> ScheduleKind {
        ScheduleKind::Standard
    }

    fn customer_charge(&self) -> f64 {
        self.customer_charge
    }

    fn record(&self, usage: &mut StandardUsage, reading: &IntervalReading, _interval: IntervalDuration) {
        usage.kwh += reading.kwh;
    }

    fn settle(&self, usage: &StandardUsage, season: Season) -> ScheduleCharges {
        ScheduleCharges::Standard(standard_energy(self, usage.kwh, season))
    }
}

/// Per-period energy plus the two demand maxima. Demand is tracked as the
/// highest interval kW, never summed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TouUsage {
    pub on_peak_kwh: f64,
    pub off_peak_kwh: f64,
    pub discount_kwh: f64,
    pub on_peak_demand_kw: f64,
    pub max_demand_kw: f64,
}

impl Tariff for TouRates {
    type Usage = TouUsage;

    fn kind(&self) -> ScheduleKind {
        ScheduleKind::Tou
    }

    fn customer_charge(&self) -> f64 {
        self.customer_charge
    }

    fn record(&self, usage: &mut TouUsage, reading: &IntervalReading, interval: IntervalDuration) {
        let demand_kw = interval.demand_kw(reading.kwh);
        usage.max_demand_kw = usage.max_demand_kw.max(demand_kw);

        match classify_tou_period(reading.ts, &self.periods) {
            RatePeriod::OnPeak => {
                usage.on_peak_kwh += reading.kwh;
                usage.on_peak_demand_kw = usage.on_peak_demand_kw.max(demand_kw);
            }
            RatePeriod::OffPeak => usage.off_peak_kwh += reading.kwh,
            RatePeriod::Discount => usage.discount_kwh += reading.kwh,
        }
    }

    fn settle(&self, usage: &TouUsage, _season: Season) -> ScheduleCharges {
        ScheduleCharges::Tou {
            on_peak: PeriodCharge::at(usage.on_peak_kwh, self.energy.on_peak),
            off_peak: PeriodCharge::at(usage.off_peak_kwh, self.energy.off_peak),
            discount: PeriodCharge::at(usage.discount_kwh, self.energy.discount),
            demand: DemandCharges {
                on_peak_demand_kw: usage.on_peak_demand_kw,
                max_demand_kw: usage.max_demand_kw,
                on_peak_charge: usage.on_peak_demand_kw * self.demand.on_peak,
                max_charge: usage.max_demand_kw * self.demand.max,
            },
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TouEvUsage {
    pub discount_kwh: f64,
    pub standard_kwh: f64,
}

impl Tariff for TouEvRates {
    type Usage = TouEvUsage;

    fn kind(&self) -> ScheduleKind {
        ScheduleKind::TouEv
    }

    fn customer_charge(&self) -> f64 {
        self.customer_charge
    }

    fn record(&self, usage: &mut TouEvUsage, reading: &IntervalReading, _interval: IntervalDuration) {
        match classify_tou_ev_period(reading.ts, &self.discount_window) {
            EvRatePeriod::Discount => usage.discount_kwh += reading.kwh,
            EvRatePeriod::Standard => usage.standard_kwh += reading.kwh,
        }
    }

    fn settle(&self, usage: &TouEvUsage, _season: Season) -> ScheduleCharges {
        ScheduleCharges::TouEv {
            discount: PeriodCharge::at(usage.discount_kwh, self.discount_rate),
            standard: PeriodCharge::at(usage.standard_kwh, self.standard_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate_schedule::fixtures::duke_config;
    use time::macros::datetime;

    fn cost(energy: StandardEnergy) -> f64 {
        ScheduleCharges::Standard(energy).energy_charge()
    }

    #[test]
    fn summer_standard_is_flat() {
        let rates = duke_config().standard;
        let energy = standard_energy(&rates, 1200.0, Season::Summer);
        assert_eq!(energy, StandardEnergy::Flat(PeriodCharge::at(1200.0, 0.12623)));
    }

    #[test]
    fn winter_standard_below_threshold_uses_tier1_only() {
        let rates = duke_config().standard;
        match standard_energy(&rates, 500.0, Season::Winter) {
            StandardEnergy::Tiered { first_block, excess } => {
                assert_eq!(first_block.kwh, 500.0);
                assert_eq!(excess.kwh, 0.0);
                assert_eq!(excess.cost, 0.0);
            }
            other => panic!("expected tiered energy, got {other:?}"),
        }
    }

    #[test]
    fn winter_tier_is_continuous_at_threshold() {
        let rates = duke_config().standard;
        let at_threshold = cost(standard_energy(&rates, 800.0, Season::Winter));
        for eps in [0.5, 10.0, 250.0] {
            let above = cost(standard_energy(&rates, 800.0 + eps, Season::Winter));
            assert_eq!(above, at_threshold + eps * rates.tier2_rate);
        }
    }

    #[test]
    fn winter_tier_is_monotonic() {
        let rates = duke_config().standard;
        let mut last = 0.0;
        for kwh in (0..40).map(|i| f64::from(i) * 50.0) {
            let c = cost(standard_energy(&rates, kwh, Season::Winter));
            assert!(c >= last);
            last = c;
        }
    }

    #[test]
    fn tou_tracks_peak_demand_not_energy() {
        let cfg = duke_config();
        let interval = IntervalDuration::from_hours(0.5).unwrap();
        let mut usage = TouUsage::default();
        // Wednesday evening on-peak, then a larger off-peak reading.
        cfg.tou.record(&mut usage, &IntervalReading::new(datetime!(2024-07-03 18:00 -4), 1.5), interval);
        cfg.tou.record(&mut usage, &IntervalReading::new(datetime!(2024-07-03 18:30 -4), 0.5), interval);
        cfg.tou.record(&mut usage, &IntervalReading::new(datetime!(2024-07-03 22:00 -4), 2.0), interval);

        assert_eq!(usage.on_peak_kwh, 2.0);
        assert_eq!(usage.off_peak_kwh, 2.0);
        assert_eq!(usage.on_peak_demand_kw, 3.0);
        assert_eq!(usage.max_demand_kw, 4.0);

        let charges = cfg.tou.settle(&usage, Season::Summer);
        let demand = charges.demand().copied().unwrap();
        assert_eq!(demand.on_peak_charge, 3.0 * 1.99);
        assert_eq!(demand.max_charge, 4.0 * 3.91);
        assert_eq!(charges.demand_charge(), demand.on_peak_charge + demand.max_charge);
    }

    #[test]
    fn tou_ev_has_no_demand_charge() {
        let cfg = duke_config();
        let interval = IntervalDuration::from_hours(0.5).unwrap();
        let mut usage = TouEvUsage::default();
        cfg.tou_ev.record(&mut usage, &IntervalReading::new(datetime!(2024-07-03 23:30 -4), 3.0), interval);
        cfg.tou_ev.record(&mut usage, &IntervalReading::new(datetime!(2024-07-03 12:00 -4), 1.0), interval);

        let charges = cfg.tou_ev.settle(&usage, Season::Summer);
        assert_eq!(charges.demand_charge(), 0.0);
        assert_eq!(charges.energy_charge(), 3.0 * 0.06548 + 1.0 * 0.13096);
    }
}
