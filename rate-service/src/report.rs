//! Human-readable rendering of comparison results.

use std::fmt::{self, Write};

use tariff_core::domain::{CostComparison, MonthlyBill, PeriodShare, RangeAnalysis};
use tariff_core::{ComparisonReport, ScheduleKind};

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

fn savings_line(out: &mut impl Write, label: &str, total: f64, savings: f64, pct: f64) -> fmt::Result {
    writeln!(
        out,
        "  {label:<28} ${total:>10.2}  (saves ${savings:>8.2}, {pct:>5.1}%)"
    )
}

fn annual_section(out: &mut impl Write, annual: &CostComparison) -> fmt::Result {
    writeln!(out, "TOTAL COSTS:")?;
    writeln!(out, "  {:<28} ${:>10.2}", "Standard:", annual.standard)?;
    savings_line(out, "Time-of-Use:", annual.tou, annual.tou_savings, annual.tou_savings_pct)?;
    savings_line(out, "TOU-EV:", annual.tou_ev, annual.tou_ev_savings, annual.tou_ev_savings_pct)?;
    writeln!(out, "\n  TOU-EV vs TOU savings:        ${:>10.2}", annual.tou_ev_vs_tou_savings)?;
    writeln!(
        out,
        "\n  BEST RATE: {} at ${:.2}",
        annual.cheapest,
        annual.cheapest_cost()
    )
}

fn shares_section(out: &mut impl Write, shares: &[PeriodShare]) -> fmt::Result {
    for share in shares {
        writeln!(
            out,
            "  {:<12} {:>10.1} kWh ({:>5.1}%)",
            share.period, share.kwh, share.share_pct
        )?;
    }
    Ok(())
}

/// Text summary of a full comparison.
pub struct ComparisonSummary<'a>(pub &'a ComparisonReport);

impl fmt::Display for ComparisonSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "{RULE}")?;
        writeln!(f, "RATE COMPARISON: Standard, Time-of-Use, TOU-EV")?;
        writeln!(f, "{RULE}\n")?;
        annual_section(f, &report.annual)?;

        writeln!(f, "\n{THIN_RULE}")?;
        writeln!(f, "MONTHLY BREAKDOWN:")?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(
            f,
            "{:<10} {:<8} {:>11} {:>11} {:>11}  {:<10}",
            "Month", "Season", "Standard", "TOU", "TOU-EV", "Best"
        )?;
        for row in &report.months {
            let c = &row.costs;
            writeln!(
                f,
                "{:<10} {:<8} ${:>10.2} ${:>10.2} ${:>10.2}  {:<10}",
                row.month.to_string(),
                row.season.label(),
                c.standard,
                c.tou,
                c.tou_ev,
                c.cheapest.label()
            )?;
        }

        writeln!(f, "\n{THIN_RULE}")?;
        writeln!(f, "AVERAGE MONTHLY USAGE:")?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "Time-of-Use periods:")?;
        shares_section(f, &report.usage.tou)?;
        writeln!(
            f,
            "  avg demand charges: ${:.2}/month",
            report.usage.avg_tou_demand_charge
        )?;
        writeln!(f, "TOU-EV periods:")?;
        shares_section(f, &report.usage.tou_ev)?;

        writeln!(f, "\n{RULE}")
    }
}

fn bill_lines(out: &mut impl Write, bill: &MonthlyBill) -> fmt::Result {
    for (period, line) in bill.charges.period_lines() {
        writeln!(
            out,
            "  {:<10} {:>10.2} kWh @ {:>7.3}¢/kWh = ${:>8.2}",
            period,
            line.kwh,
            line.rate * 100.0,
            line.cost
        )?;
    }
    if let Some(demand) = bill.charges.demand() {
        writeln!(
            out,
            "  on-peak demand {:>6.2} kW = ${:>8.2}",
            demand.on_peak_demand_kw, demand.on_peak_charge
        )?;
        writeln!(
            out,
            "  max demand     {:>6.2} kW = ${:>8.2}",
            demand.max_demand_kw, demand.max_charge
        )?;
    }
    writeln!(out, "  usage charges: ${:.2}", bill.usage_cost())
}

/// Text summary of a date-range analysis.
pub struct RangeSummary<'a>(pub &'a RangeAnalysis);

impl fmt::Display for RangeSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.0;

        writeln!(f, "{RULE}")?;
        writeln!(f, "RANGE ANALYSIS: {} to {}", analysis.start, analysis.end)?;
        writeln!(
            f,
            "season: {}, readings: {}, total: {:.2} kWh",
            analysis.season, analysis.reading_count, analysis.total_kwh
        )?;
        writeln!(f, "{RULE}")?;

        for (kind, bill) in [
            (ScheduleKind::Standard, &analysis.standard),
            (ScheduleKind::Tou, &analysis.tou),
            (ScheduleKind::TouEv, &analysis.tou_ev),
        ] {
            writeln!(f, "\n{kind}:")?;
            bill_lines(f, bill)?;
        }

        let c = &analysis.comparison;
        writeln!(f, "\n{THIN_RULE}")?;
        writeln!(f, "CHEAPEST RATE: {} (${:.2})", c.cheapest, c.cheapest_cost())?;
        writeln!(f, "  TOU vs Standard savings:    ${:>8.2}", c.tou_savings)?;
        writeln!(f, "  TOU-EV vs Standard savings: ${:>8.2}", c.tou_ev_savings)?;
        writeln!(f, "  TOU-EV vs TOU savings:      ${:>8.2}", c.tou_ev_vs_tou_savings)?;
        writeln!(f, "{RULE}")
    }
}

pub fn render_comparison(report: &ComparisonReport) -> String {
    ComparisonSummary(report).to_string()
}

pub fn render_range(analysis: &RangeAnalysis) -> String {
    RangeSummary(analysis).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tariff_core::domain::{MonthComparison, UsageBreakdown};
    use tariff_core::{MonthKey, Season};

    fn report() -> ComparisonReport {
        let costs = CostComparison::from_totals(120.0, 100.0, 90.0);
        ComparisonReport {
            months: vec![MonthComparison {
                month: MonthKey { year: 2024, month: 7 },
                season: Season::Summer,
                costs,
            }],
            annual: costs,
            standard_bills: Vec::new(),
            tou_bills: Vec::new(),
            tou_ev_bills: Vec::new(),
            usage: UsageBreakdown {
                tou: PeriodShare::from_kwh(&[("on_peak", 50.0), ("off_peak", 150.0), ("discount", 0.0)]),
                tou_ev: PeriodShare::from_kwh(&[("discount", 100.0), ("standard", 100.0)]),
                avg_tou_demand_charge: 12.5,
            },
        }
    }

    #[test]
    fn comparison_summary_names_best_rate() {
        let text = render_comparison(&report());
        assert!(text.contains("BEST RATE: TOU-EV at $90.00"));
        assert!(text.contains("2024-07"));
        assert!(text.contains("avg demand charges: $12.50/month"));
    }

    #[test]
    fn comparison_summary_lists_period_shares() {
        let text = render_comparison(&report());
        assert!(text.contains("on_peak"));
        assert!(text.contains("25.0%"));
        assert!(text.contains("50.0%"));
    }

    #[test]
    fn range_summary_lists_every_schedule() {
        let cfg = crate::config::AppConfig::from_toml_str(include_str!("../rate-config.toml")).unwrap();
        let start = time::macros::datetime!(2024-07-03 17:00 -4);
        let readings: Vec<tariff_core::IntervalReading> = (0..8)
            .map(|i| tariff_core::IntervalReading::new(start + time::Duration::minutes(30 * i), 1.0))
            .collect();
        let analysis =
            tariff_core::analyze_range(&readings, &cfg.tariff, start, start + time::Duration::hours(4)).unwrap();

        let text = format!("{}", RangeSummary(&analysis));
        assert_eq!(text, render_range(&analysis));
        for heading in ["Standard:", "TOU:", "TOU-EV:", "on-peak demand", "CHEAPEST RATE"] {
            assert!(text.contains(heading), "missing {heading}");
        }
    }
}
