use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Billing-level summary of one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./demand.ts")]
pub struct MonthlyTarget {
    /// Month of the year (1-12).
    pub month: u32,
    /// Contracted / metered peak demand in kW.
    pub peak_kw: f64,
    /// Energy consumed over the month in kWh.
    pub total_kwh: f64,
}

impl MonthlyTarget {
    /// Create a new target with validation
    pub fn new(month: u32, peak_kw: f64, total_kwh: f64) -> Result<Self, String> {
        let target = MonthlyTarget {
            month,
            peak_kw,
            total_kwh,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=12).contains(&self.month) {
            return Err(format!(
                "Invalid month: {}. Must be between 1 and 12",
                self.month
            ));
        }
        if !self.peak_kw.is_finite() || self.peak_kw <= 0.0 {
            return Err(format!(
                "Invalid peak for month {}: {} kW. Must be a positive number",
                self.month, self.peak_kw
            ));
        }
        if !self.total_kwh.is_finite() || self.total_kwh <= 0.0 {
            return Err(format!(
                "Invalid total for month {}: {} kWh. Must be a positive number",
                self.month, self.total_kwh
            ));
        }
        Ok(())
    }

    /// Ratio of mean to peak demand over `hours` hours.
    pub fn load_factor(&self, hours: usize) -> f64 {
        self.total_kwh / (self.peak_kw * hours as f64)
    }
}
