use std::fmt;

/// Two-season model keyed purely on calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum Season {
    /// May through September.
    Summer,
    /// October through April.
    Winter,
}

impl Season {
    /// `month` is 1-based. Values outside 1..=12 fall through to winter.
    pub fn for_month_number(month: u8) -> Self {
        if (5..=9).contains(&month) {
            Season::Summer
        } else {
            Season::Winter
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Summer => "summer",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rate periods of the demand-charge time-of-use schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum RatePeriod {
    OnPeak,
    OffPeak,
    Discount,
}

impl RatePeriod {
    pub const ALL: [RatePeriod; 3] = [RatePeriod::OnPeak, RatePeriod::OffPeak, RatePeriod::Discount];

    pub fn label(&self) -> &'static str {
        match self {
            RatePeriod::OnPeak => "on_peak",
            RatePeriod::OffPeak => "off_peak",
            RatePeriod::Discount => "discount",
        }
    }
}

impl fmt::Display for RatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rate periods of the EV time-of-use schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum EvRatePeriod {
    Discount,
    Standard,
}

impl EvRatePeriod {
    pub const ALL: [EvRatePeriod; 2] = [EvRatePeriod::Discount, EvRatePeriod::Standard];

    pub fn label(&self) -> &'static str {
        match self {
            EvRatePeriod::Discount => "discount",
            EvRatePeriod::Standard => "standard",
        }
    }
}

impl fmt::Display for EvRatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
