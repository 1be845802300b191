use crate::domain::interval_reading::MonthKey;
use crate::domain::period::Season;
use crate::domain::rate_schedule::ScheduleKind;

/// Energy billed in one rate period.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PeriodCharge {
    pub kwh: f64,
    /// $/kWh.
    pub rate: f64,
    pub cost: f64,
}

impl PeriodCharge {
    pub fn at(kwh: f64, rate: f64) -> Self {
        Self {
            kwh,
            rate,
            cost: kwh * rate,
        }
    }
}

/// TOU demand-charge components. Demand figures are kW, not kWh.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DemandCharges {
    /// Highest interval demand among on-peak readings, 0 when there were none.
    pub on_peak_demand_kw: f64,
    /// Highest interval demand among all readings.
    pub max_demand_kw: f64,
    pub on_peak_charge: f64,
    pub max_charge: f64,
}

impl DemandCharges {
    pub fn total(&self) -> f64 {
        self.on_peak_charge + self.max_charge
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum StandardEnergy {
    /// Summer: every kWh at the summer rate.
    Flat(PeriodCharge),
    /// Winter: declining two-block rate.
    Tiered {
        first_block: PeriodCharge,
        excess: PeriodCharge,
    },
}

/// Schedule-specific breakdown of a bill.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum ScheduleCharges {
    Standard(StandardEnergy),
    Tou {
        on_peak: PeriodCharge,
        off_peak: PeriodCharge,
        discount: PeriodCharge,
        demand: DemandCharges,
    },
    TouEv {
        discount: PeriodCharge,
        standard: PeriodCharge,
    },
}

impl ScheduleCharges {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            ScheduleCharges::Standard(_) => ScheduleKind::Standard,
            ScheduleCharges::Tou { .. } => ScheduleKind::Tou,
            ScheduleCharges::TouEv { .. } => ScheduleKind::TouEv,
        }
    }

    /// Energy lines in a fixed order. Every billed kWh appears in exactly one line.
    pub fn period_lines(&self) -> Vec<(&'static str, PeriodCharge)> {
        match *self {
            ScheduleCharges::Standard(StandardEnergy::Flat(all)) => vec![("all", all)],
            ScheduleCharges::Standard(StandardEnergy::Tiered { first_block, excess }) => {
                vec![("tier1", first_block), ("tier2", excess)]
            }
            ScheduleCharges::Tou {
                on_peak,
                off_peak,
                discount,
                ..
            } => vec![
                ("on_peak", on_peak),
                ("off_peak", off_peak),
                ("discount", discount),
            ],
            ScheduleCharges::TouEv { discount, standard } => {
                vec![("discount", discount), ("standard", standard)]
            }
        }
    }

    pub fn total_kwh(&self) -> f64 {
        self.period_lines().iter().map(|(_, line)| line.kwh).sum()
    }

    pub fn energy_charge(&self) -> f64 {
        self.period_lines().iter().map(|(_, line)| line.cost).sum()
    }

    pub fn demand(&self) -> Option<&DemandCharges> {
        match self {
            ScheduleCharges::Tou { demand, .. } => Some(demand),
            _ => None,
        }
    }

    pub fn demand_charge(&self) -> f64 {
        self.demand().map(DemandCharges::total).unwrap_or(0.0)
    }
}

/// One schedule's bill for one calendar month.
///
/// `total_cost == customer_charge + energy_charge + demand_charge` holds
/// exactly, and `total_kwh` is the sum of the period lines.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MonthlyBill {
    pub month: MonthKey,
    pub season: Season,
    pub reading_count: usize,
    pub total_kwh: f64,
    pub customer_charge: f64,
    pub energy_charge: f64,
    pub demand_charge: f64,
    pub total_cost: f64,
    pub charges: ScheduleCharges,
}

impl MonthlyBill {
    pub fn new(
        month: MonthKey,
        season: Season,
        reading_count: usize,
        customer_charge: f64,
        charges: ScheduleCharges,
    ) -> Self {
        let energy_charge = charges.energy_charge();
        let demand_charge = charges.demand_charge();
        Self {
            month,
            season,
            reading_count,
            total_kwh: charges.total_kwh(),
            customer_charge,
            energy_charge,
            demand_charge,
            total_cost: customer_charge + energy_charge + demand_charge,
            charges,
        }
    }

    pub fn kind(&self) -> ScheduleKind {
        self.charges.kind()
    }

    /// Energy plus demand, i.e. everything except the fixed customer charge.
    pub fn usage_cost(&self) -> f64 {
        self.energy_charge + self.demand_charge
    }
}
