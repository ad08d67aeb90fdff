use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::calendar::DayKind;

/// Storage precision of generated demand values (kW).
pub const DEMAND_RESOLUTION: f64 = 0.01;

/// One generated hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./demand.ts")]
pub struct HourlyRecord {
    /// Start of the hour.
    pub timestamp: NaiveDateTime,
    pub day_kind: DayKind,
    /// Average demand over the hour in kW (equal to the energy in kWh).
    pub demand_kw: f64,
}

impl HourlyRecord {
    pub fn new(timestamp: NaiveDateTime, day_kind: DayKind, demand_kw: f64) -> Self {
        HourlyRecord {
            timestamp,
            day_kind,
            demand_kw,
        }
    }

    pub fn is_nonworking(&self) -> bool {
        self.day_kind.is_nonworking()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    /// Hour of day (0-23)
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// How the two-parameter model of a month was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./demand.ts")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitStatus {
    /// The unmodified shape admits a non-negative base and amplitude.
    Fitted,
    /// The shape was sharpened or flattened with exponent `gamma`.
    Reshaped { gamma: f64 },
    /// Every coefficient equals the maximum: the load is flat and the peak
    /// target cannot steer the fit.
    FlatPattern,
    /// No reshaping reached the total under the peak; the load was made flat
    /// to hit the total.
    ClampedFlat,
    /// No reshaping kept the base non-negative; the base was set to zero and
    /// the shape scaled to hit the total.
    ClampedZeroBase,
}

impl FitStatus {
    /// True when the model itself gave up the peak target and only the
    /// reconciliation step enforces it.
    pub fn peak_abandoned(&self) -> bool {
        matches!(
            self,
            FitStatus::FlatPattern | FitStatus::ClampedFlat | FitStatus::ClampedZeroBase
        )
    }

    pub fn label(&self) -> String {
        match self {
            FitStatus::Fitted => "fitted".to_string(),
            FitStatus::Reshaped { gamma } => format!("reshaped (gamma={:.3})", gamma),
            FitStatus::FlatPattern => "flat pattern".to_string(),
            FitStatus::ClampedFlat => "clamped: flat load".to_string(),
            FitStatus::ClampedZeroBase => "clamped: zero base".to_string(),
        }
    }
}

/// Target versus realized statistics of one generated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./demand.ts")]
pub struct MonthValidation {
    pub month: u32,
    pub target_peak_kw: f64,
    pub target_total_kwh: f64,
    pub realized_peak_kw: f64,
    pub realized_total_kwh: f64,
    /// Smallest hourly value of the month. Negative only when the total
    /// correction had no hour that could absorb it inside `[0, peak]`.
    pub min_demand_kw: f64,
    pub status: FitStatus,
}

/// Slack for comparing stored values that are already on the 0.01 grid.
const PEAK_TOLERANCE: f64 = 1e-9;

impl MonthValidation {
    /// The realized maximum equals the target.
    ///
    /// A target with more than two decimals cannot be stored exactly and is
    /// reported as missed.
    pub fn peak_honored(&self) -> bool {
        (self.realized_peak_kw - self.target_peak_kw).abs() < PEAK_TOLERANCE
    }

    /// The realized sum is within one storage unit of the target.
    pub fn total_honored(&self) -> bool {
        (self.realized_total_kwh - self.target_total_kwh).abs() < DEMAND_RESOLUTION
    }

    /// No hour of the month is negative.
    pub fn non_negative(&self) -> bool {
        self.min_demand_kw >= 0.0
    }

    /// Peak, total and non-negativity all hold.
    pub fn honored(&self) -> bool {
        self.peak_honored() && self.total_honored() && self.non_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(realized_peak_kw: f64, realized_total_kwh: f64) -> MonthValidation {
        MonthValidation {
            month: 1,
            target_peak_kw: 50.0,
            target_total_kwh: 22000.0,
            realized_peak_kw,
            realized_total_kwh,
            min_demand_kw: 5.0,
            status: FitStatus::Fitted,
        }
    }

    #[test]
    fn test_record_accessors() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        let record = HourlyRecord::new(ts, DayKind::Working, 42.5);
        assert_eq!(record.month(), 3);
        assert_eq!(record.hour(), 13);
        assert!(!record.is_nonworking());
    }

    #[test]
    fn test_honored_flags() {
        assert!(validation(50.0, 22000.0).peak_honored());
        assert!(validation(50.0, 22000.005).total_honored());
        assert!(!validation(49.9, 22000.0).peak_honored());
        assert!(!validation(50.0, 22000.02).total_honored());
        assert!(validation(50.0, 22000.0).honored());
    }

    #[test]
    fn test_sub_resolution_peak_is_missed() {
        let mut v = validation(50.01, 22000.0);
        v.target_peak_kw = 50.005;
        assert!(!v.peak_honored());
        assert!(!v.honored());
    }

    #[test]
    fn test_negative_hour_is_not_honored() {
        let mut v = validation(50.0, 22000.0);
        v.min_demand_kw = -99.84;
        assert!(v.peak_honored() && v.total_honored());
        assert!(!v.non_negative());
        assert!(!v.honored());
    }

    #[test]
    fn test_status_flags() {
        assert!(!FitStatus::Fitted.peak_abandoned());
        assert!(!FitStatus::Reshaped { gamma: 2.0 }.peak_abandoned());
        assert!(FitStatus::ClampedZeroBase.peak_abandoned());
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_string(&FitStatus::Reshaped { gamma: 5.05 }).unwrap();
        assert_eq!(json, r#"{"kind":"reshaped","gamma":5.05}"#);
    }
}
