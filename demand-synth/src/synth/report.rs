use std::fmt::Write;

use indexmap::IndexMap;
use load_model::{HourlyRecord, MonthValidation};

/// Peak, mean and total of one month of generated demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthSummary {
    pub peak_kw: f64,
    pub mean_kw: f64,
    pub total_kwh: f64,
    pub hours: usize,
}

/// Aggregate records by month, in the order months first appear.
pub fn monthly_summary(records: &[HourlyRecord]) -> IndexMap<u32, MonthSummary> {
    let mut summary: IndexMap<u32, MonthSummary> = IndexMap::new();
    for record in records {
        let entry = summary.entry(record.month()).or_insert(MonthSummary {
            peak_kw: f64::NEG_INFINITY,
            mean_kw: 0.0,
            total_kwh: 0.0,
            hours: 0,
        });
        entry.peak_kw = entry.peak_kw.max(record.demand_kw);
        entry.total_kwh += record.demand_kw;
        entry.hours += 1;
    }
    for entry in summary.values_mut() {
        entry.mean_kw = entry.total_kwh / entry.hours as f64;
    }
    summary
}

pub fn format_monthly_summary(summary: &IndexMap<u32, MonthSummary>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5} {:>10} {:>10} {:>12}",
        "Month", "Peak kW", "Mean kW", "Total kWh"
    );
    for (month, s) in summary {
        let _ = writeln!(
            out,
            "{:>5} {:>10.2} {:>10.2} {:>12.2}",
            month, s.peak_kw, s.mean_kw, s.total_kwh
        );
    }
    out
}

/// Target versus realized table with a status column.
///
/// Months that missed the peak or total, or contain a negative hour, are
/// marked with `!`.
pub fn format_validation_table(validation: &[MonthValidation]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5} {:>11} {:>11} {:>13} {:>13}  {}",
        "Month", "Target kW", "Result kW", "Target kWh", "Result kWh", "Status"
    );
    for v in validation {
        let marker = if v.honored() { ' ' } else { '!' };
        let _ = writeln!(
            out,
            "{:>5} {:>11.2} {:>11.2} {:>13.2} {:>13.2} {}{}",
            v.month,
            v.target_peak_kw,
            v.realized_peak_kw,
            v.target_total_kwh,
            v.realized_total_kwh,
            marker,
            v.status.label()
        );
    }
    out
}
