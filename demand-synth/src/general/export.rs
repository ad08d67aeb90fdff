use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use load_model::{HOURS_PER_DAY, HourlyRecord};

/// One row per calendar date with the 24 hourly values.
///
/// Records must be in chronological order; hours missing from a date stay at
/// zero.
pub fn pivot_by_date(records: &[HourlyRecord]) -> Vec<(NaiveDate, [f64; 24])> {
    let mut rows: Vec<(NaiveDate, [f64; 24])> = Vec::new();
    for record in records {
        let date = record.date();
        let needs_row = rows.last().is_none_or(|(last, _)| *last != date);
        if needs_row {
            rows.push((date, [0.0; HOURS_PER_DAY]));
        }
        if let Some((_, hours)) = rows.last_mut() {
            hours[record.hour() as usize] = record.demand_kw;
        }
    }
    rows
}

fn hour_label(hour: usize) -> String {
    format!("{:02}:00", hour)
}

/// Write the long series: `date,time,day_kind,demand_kw`.
pub fn write_series_csv(records: &[HourlyRecord], file_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Failed to create file: {}", file_path.display()))?;

    writer.write_record(["date", "time", "day_kind", "demand_kw"])?;
    for record in records {
        writer.write_record([
            record.date().format("%Y-%m-%d").to_string(),
            hour_label(record.hour() as usize),
            record.day_kind.label().to_string(),
            format!("{:.2}", record.demand_kw),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
    Ok(())
}

/// Write the date by hour table, rows labelled `M/D`.
pub fn write_pivot_csv(records: &[HourlyRecord], file_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Failed to create file: {}", file_path.display()))?;

    let mut header = vec!["Date".to_string()];
    header.extend((0..HOURS_PER_DAY).map(hour_label));
    writer.write_record(&header)?;

    for (date, hours) in pivot_by_date(records) {
        let mut row = Vec::with_capacity(HOURS_PER_DAY + 1);
        row.push(format!("{}/{}", date.month(), date.day()));
        row.extend(hours.iter().map(|kw| format!("{:.2}", kw)));
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
    Ok(())
}
