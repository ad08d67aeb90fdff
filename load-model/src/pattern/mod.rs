pub mod preset;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::calendar::DayKind;

pub const HOURS_PER_DAY: usize = 24;

/// Largest accepted non-working amplitude ratio (120 %).
pub const MAX_AMPLITUDE_RATIO: f64 = 1.2;

/// Scale `values` so that they sum to 100.
///
/// This is the display form of a shape. An all-zero input stays all-zero.
pub fn normalize_to_percentage(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / total * 100.0).collect()
}

/// Scale `values` so that their maximum is exactly 1.0.
///
/// This is the generation form of a shape. An all-zero input stays all-zero.
pub fn normalize_to_unit_peak(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / max).collect()
}

/// Two 24-hour load shapes: one for working days, one for non-working days.
///
/// Values are relative weights per hour of day. They are conventionally kept in
/// percentage form (each array sums to 100) but any non-negative scale works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./pattern.ts")]
pub struct ShapePattern {
    /// Hourly weights for working days, index 0 is 00:00-01:00.
    pub working: Vec<f64>,
    /// Hourly weights for non-working days.
    pub nonworking: Vec<f64>,
}

impl ShapePattern {
    /// Create a new pattern with validation
    pub fn new(working: Vec<f64>, nonworking: Vec<f64>) -> Result<Self, String> {
        let pattern = ShapePattern {
            working,
            nonworking,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_shape("working", &self.working)?;
        validate_shape("non-working", &self.nonworking)
    }

    /// Percentage form of both shapes (each sums to 100).
    pub fn to_percentage(&self) -> ShapePattern {
        ShapePattern {
            working: normalize_to_percentage(&self.working),
            nonworking: normalize_to_percentage(&self.nonworking),
        }
    }
}

fn validate_shape(name: &str, values: &[f64]) -> Result<(), String> {
    if values.len() != HOURS_PER_DAY {
        return Err(format!(
            "Invalid {} shape: expected {} hourly values, got {}",
            name,
            HOURS_PER_DAY,
            values.len()
        ));
    }
    if let Some((hour, value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(format!(
            "Invalid {} shape: hour {} has value {}. Must be finite and >= 0",
            name, hour, value
        ));
    }
    Ok(())
}

/// A shape pattern together with the non-working amplitude ratio.
///
/// The ratio scales the non-working shape relative to the working-day peak:
/// `0.3` means the highest non-working hour reaches 30 % of the highest working
/// hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./pattern.ts")]
pub struct PatternModel {
    pub pattern: ShapePattern,
    /// Non-working amplitude ratio in `[0, 1.2]`.
    pub amplitude_ratio: f64,
}

impl PatternModel {
    pub fn new(pattern: ShapePattern, amplitude_ratio: f64) -> Result<Self, String> {
        pattern.validate()?;
        validate_amplitude_ratio(amplitude_ratio)?;
        Ok(PatternModel {
            pattern,
            amplitude_ratio,
        })
    }

    /// Create a model from an amplitude given in percent (0-120).
    pub fn from_percent(pattern: ShapePattern, amplitude_percent: f64) -> Result<Self, String> {
        Self::new(pattern, amplitude_percent / 100.0)
    }

    pub fn amplitude_percent(&self) -> f64 {
        self.amplitude_ratio * 100.0
    }

    pub fn validate(&self) -> Result<(), String> {
        self.pattern.validate()?;
        validate_amplitude_ratio(self.amplitude_ratio)
    }

    /// Coefficients used for generation.
    ///
    /// Working hours use the unit-peak working shape; non-working hours use the
    /// unit-peak non-working shape scaled by the amplitude ratio.
    pub fn generation_coefficients(&self) -> GenerationCoefficients {
        let working = normalize_to_unit_peak(&self.pattern.working);
        let nonworking = normalize_to_unit_peak(&self.pattern.nonworking)
            .into_iter()
            .map(|c| c * self.amplitude_ratio)
            .collect();
        GenerationCoefficients {
            working,
            nonworking,
        }
    }
}

fn validate_amplitude_ratio(ratio: f64) -> Result<(), String> {
    if !ratio.is_finite() || !(0.0..=MAX_AMPLITUDE_RATIO).contains(&ratio) {
        return Err(format!(
            "Invalid amplitude ratio: {}. Must be between 0 and {}",
            ratio, MAX_AMPLITUDE_RATIO
        ));
    }
    Ok(())
}

/// Per-hour generation coefficients for both day kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationCoefficients {
    pub working: Vec<f64>,
    pub nonworking: Vec<f64>,
}

impl GenerationCoefficients {
    /// Coefficient of `hour` (0-23) on a day of the given kind.
    pub fn get(&self, kind: DayKind, hour: usize) -> f64 {
        match kind {
            DayKind::Working => self.working[hour],
            DayKind::NonWorking => self.nonworking[hour],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn office() -> ShapePattern {
        preset::PatternPreset::Office.pattern()
    }

    #[test]
    fn test_percentage_sums_to_100() {
        let values = normalize_to_percentage(&[1.0, 3.0, 4.0, 2.0]);
        let sum: f64 = values.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((values[2] - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_stays_zero() {
        assert_eq!(normalize_to_percentage(&[0.0; 4]), vec![0.0; 4]);
        assert_eq!(normalize_to_unit_peak(&[0.0; 4]), vec![0.0; 4]);
    }

    #[test]
    fn test_unit_peak_max_is_one() {
        let values = normalize_to_unit_peak(&[2.0, 5.0, 2.5]);
        assert_eq!(values, vec![0.4, 1.0, 0.5]);
    }

    #[test]
    fn test_two_normalizations_differ() {
        let raw = [2.0, 4.0, 2.0, 2.0];
        let pct = normalize_to_percentage(&raw);
        let unit = normalize_to_unit_peak(&raw);
        assert!((pct[1] - 40.0).abs() < 1e-12);
        assert_eq!(unit[1], 1.0);
    }

    #[test]
    fn test_shape_validation() {
        assert!(ShapePattern::new(vec![1.0; 23], vec![1.0; 24]).is_err());
        let mut negative = vec![1.0; 24];
        negative[5] = -0.1;
        assert!(ShapePattern::new(vec![1.0; 24], negative).is_err());
        assert!(ShapePattern::new(vec![1.0; 24], vec![0.0; 24]).is_ok());
    }

    #[test]
    fn test_amplitude_ratio_bounds() {
        assert!(PatternModel::new(office(), 1.2).is_ok());
        assert!(PatternModel::new(office(), 1.21).is_err());
        assert!(PatternModel::new(office(), -0.01).is_err());
        assert!(PatternModel::from_percent(office(), 30.0).is_ok());
    }

    #[test]
    fn test_generation_coefficients_scale_nonworking() {
        let model = PatternModel::from_percent(office(), 30.0).unwrap();
        let coefs = model.generation_coefficients();
        let working_max = coefs.working.iter().copied().fold(0.0, f64::max);
        let nonworking_max = coefs.nonworking.iter().copied().fold(0.0, f64::max);
        assert_eq!(working_max, 1.0);
        assert!((nonworking_max - 0.3).abs() < 1e-12);
        // Office working peak is at 14:00
        assert_eq!(coefs.get(DayKind::Working, 14), 1.0);
    }

    proptest! {
        #[test]
        fn prop_percentage_sums_to_100(values in prop::collection::vec(0.0..1e4f64, 24)) {
            prop_assume!(values.iter().sum::<f64>() > 0.0);
            let pct = normalize_to_percentage(&values);
            prop_assert!((pct.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        }

        #[test]
        fn prop_percentage_is_idempotent(values in prop::collection::vec(0.0..1e4f64, 24)) {
            prop_assume!(values.iter().sum::<f64>() > 0.0);
            let once = normalize_to_percentage(&values);
            let twice = normalize_to_percentage(&once);
            for (a, b) in once.iter().zip(twice.iter()) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_unit_peak_max_is_one(values in prop::collection::vec(0.0..1e4f64, 24)) {
            prop_assume!(values.iter().any(|v| *v > 0.0));
            let unit = normalize_to_unit_peak(&values);
            let max = unit.iter().copied().fold(0.0, f64::max);
            prop_assert_eq!(max, 1.0);
        }
    }
}
