use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use load_model::MonthlyTarget;

/// Parse a numeric cell written by a human.
///
/// Everything except digits, `.` and `-` is dropped first, so thousands
/// separators and unit suffixes (`"22,000 kWh"`) are accepted.
pub fn parse_number(raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned
        .parse::<f64>()
        .with_context(|| format!("Failed to parse number '{}' (cleaned: '{}')", raw, cleaned))
}

fn parse_month(raw: &str) -> Result<u32> {
    let value = parse_number(raw)?;
    if value.fract() != 0.0 || value < 0.0 {
        anyhow::bail!("Month must be a whole number, got '{}'", raw);
    }
    Ok(value as u32)
}

fn target_from_fields(month: &str, peak: &str, total: &str, row: usize) -> Result<MonthlyTarget> {
    let month = parse_month(month).with_context(|| format!("Invalid month on row {}", row))?;
    let peak = parse_number(peak).with_context(|| format!("Invalid peak on row {}", row))?;
    let total = parse_number(total).with_context(|| format!("Invalid total on row {}", row))?;
    MonthlyTarget::new(month, peak, total)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Invalid target on row {}", row))
}

/// Loads monthly targets from a CSV file
///
/// The first row is a header; columns are month, peak (kW) and total (kWh) in
/// that order.
pub fn load_targets_from_csv(file_path: &Path) -> Result<Vec<MonthlyTarget>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    let mut targets = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // Header is row 1
        let row = idx + 2;
        let record = record.with_context(|| format!("Failed to read row {}", row))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if record.len() < 3 {
            anyhow::bail!("Row {} has {} columns, expected 3", row, record.len());
        }
        targets.push(target_from_fields(&record[0], &record[1], &record[2], row)?);
    }

    Ok(targets)
}

/// Text form of a spreadsheet cell, `None` for empty cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::Float(v) => Some(v.to_string()),
        Data::Int(v) => Some(v.to_string()),
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Loads monthly targets from the first sheet of a workbook (xlsx, xls, ods)
///
/// Same column layout as [`load_targets_from_csv`]; the first row is skipped.
pub fn load_targets_from_workbook(file_path: &Path) -> Result<Vec<MonthlyTarget>> {
    let mut workbook = open_workbook_auto(file_path)
        .with_context(|| format!("Failed to open workbook: {}", file_path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .context("Workbook has no sheets")?
        .context("Failed to read worksheet")?;

    let mut targets = Vec::new();
    for (idx, row) in range.rows().enumerate().skip(1) {
        let row_number = idx + 1;
        let fields: Vec<Option<String>> = row.iter().take(3).map(cell_text).collect();
        if fields.iter().all(Option::is_none) {
            continue;
        }
        match fields.as_slice() {
            [Some(month), Some(peak), Some(total)] => {
                targets.push(target_from_fields(month, peak, total, row_number)?);
            }
            _ => anyhow::bail!("Row {} needs month, peak and total", row_number),
        }
    }

    Ok(targets)
}

/// Load targets, picking the reader from the file extension.
pub fn load_targets(file_path: &Path) -> Result<Vec<MonthlyTarget>> {
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => load_targets_from_csv(file_path),
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => {
            load_targets_from_workbook(file_path)
        }
        _ => anyhow::bail!(
            "Unsupported target file '{}'. Use .csv or .xlsx",
            file_path.display()
        ),
    }
}
