use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use load_model::{
    CalendarRule, HourlyRecord, MonthValidation, MonthlyTarget, PatternModel, PatternPreset,
    ShapePattern,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SynthError, SynthResult};

/// Default monthly peaks in kW, January first
const DEFAULT_PEAKS_KW: [f64; 12] = [
    50.0, 50.0, 45.0, 45.0, 50.0, 55.0, 60.0, 60.0, 55.0, 45.0, 45.0, 50.0,
];

/// Default monthly totals in kWh, January first
const DEFAULT_TOTALS_KWH: [f64; 12] = [
    22000.0, 20000.0, 19000.0, 18000.0, 20000.0, 24000.0, 28000.0, 30000.0, 26000.0, 20000.0,
    19000.0, 23000.0,
];

/// Bounds of the reshaping search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub gamma_min: f64,      // Flattest exponent tried
    pub gamma_max: f64,      // Sharpest exponent tried
    pub max_iterations: usize, // Bisection steps before giving up
    pub feasibility_eps: f64,  // Slack on base/amplitude >= 0 for the unshaped fit
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            gamma_min: 0.1,
            gamma_max: 10.0,
            max_iterations: 20,
            feasibility_eps: 0.001,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> SynthResult<()> {
        if !(self.gamma_min > 0.0 && self.gamma_min < self.gamma_max && self.gamma_max.is_finite())
        {
            return Err(SynthError::Config(format!(
                "Invalid gamma bounds [{}, {}]. Need 0 < min < max",
                self.gamma_min, self.gamma_max
            )));
        }
        if self.max_iterations == 0 {
            return Err(SynthError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.feasibility_eps.is_finite() || self.feasibility_eps < 0.0 {
            return Err(SynthError::Config(format!(
                "Invalid feasibility_eps: {}",
                self.feasibility_eps
            )));
        }
        Ok(())
    }
}

/// Run configuration as read from a TOML file or built from CLI flags.
///
/// ```toml
/// year = 2024
/// preset = "office"
/// amplitude_percent = 30.0
/// non_working_dates = ["2024-01-01", "2024-01-02"]
///
/// [[targets]]
/// month = 1
/// peak_kw = 50.0
/// total_kwh = 22000.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub year: i32,
    pub preset: PatternPreset,
    /// Replaces the preset's shapes when present
    pub pattern: Option<ShapePattern>,
    /// Non-working amplitude in percent, the preset's own value when absent
    pub amplitude_percent: Option<f64>,
    /// Explicit non-working dates. When absent, the built-in list for the year
    /// is used if there is one, otherwise weekends only.
    pub non_working_dates: Option<Vec<NaiveDate>>,
    pub targets: Vec<MonthlyTarget>,
    /// Generate months on the rayon pool
    pub parallel: bool,
    pub search: SearchConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            year: 2024,
            preset: PatternPreset::Office,
            pattern: None,
            amplitude_percent: None,
            non_working_dates: None,
            targets: default_targets(),
            parallel: false,
            search: SearchConfig::default(),
        }
    }
}

/// The twelve default monthly targets.
pub fn default_targets() -> Vec<MonthlyTarget> {
    (1..=12u32)
        .zip(DEFAULT_PEAKS_KW.iter().zip(DEFAULT_TOTALS_KWH.iter()))
        .map(|(month, (&peak_kw, &total_kwh))| MonthlyTarget {
            month,
            peak_kw,
            total_kwh,
        })
        .collect()
}

impl SynthesisConfig {
    pub fn from_toml_str(content: &str) -> SynthResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> SynthResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn pattern_model(&self) -> SynthResult<PatternModel> {
        let pattern = match &self.pattern {
            Some(custom) => custom.to_percentage(),
            None => self.preset.pattern(),
        };
        let amplitude = self
            .amplitude_percent
            .unwrap_or_else(|| self.preset.amplitude_percent());
        PatternModel::from_percent(pattern, amplitude).map_err(SynthError::InvalidPattern)
    }

    pub fn calendar_rule(&self) -> SynthResult<CalendarRule> {
        match &self.non_working_dates {
            Some(dates) => {
                CalendarRule::new(self.year, dates.clone()).map_err(SynthError::InvalidCalendar)
            }
            None if self.year == 2024 => Ok(CalendarRule::japan_2024()),
            None => {
                warn!(
                    year = self.year,
                    "No holiday list for this year, only weekends are non-working"
                );
                Ok(CalendarRule::weekends_only(self.year))
            }
        }
    }

    /// Resolve presets and defaults into a validated engine input.
    pub fn to_input(&self) -> SynthResult<SynthesisInput> {
        let input = SynthesisInput {
            year: self.year,
            calendar: self.calendar_rule()?,
            pattern: self.pattern_model()?,
            targets: self.targets.clone(),
            search: self.search.clone(),
            parallel: self.parallel,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Everything one synthesis run needs.
#[derive(Debug, Clone)]
pub struct SynthesisInput {
    pub year: i32,
    pub calendar: CalendarRule,
    pub pattern: PatternModel,
    /// At most one target per month. Months without a target are skipped.
    pub targets: Vec<MonthlyTarget>,
    pub search: SearchConfig,
    pub parallel: bool,
}

impl SynthesisInput {
    pub fn new(
        year: i32,
        calendar: CalendarRule,
        pattern: PatternModel,
        targets: Vec<MonthlyTarget>,
    ) -> SynthResult<Self> {
        let input = SynthesisInput {
            year,
            calendar,
            pattern,
            targets,
            search: SearchConfig::default(),
            parallel: false,
        };
        input.validate()?;
        Ok(input)
    }

    /// Reject inputs the engine cannot work with.
    pub fn validate(&self) -> SynthResult<()> {
        let mut seen = HashSet::new();
        for target in &self.targets {
            target.validate().map_err(SynthError::InvalidTarget)?;
            if !seen.insert(target.month) {
                return Err(SynthError::DuplicateTarget(target.month));
            }
        }

        self.pattern
            .validate()
            .map_err(SynthError::InvalidPattern)?;

        if self.calendar.year != self.year {
            return Err(SynthError::InvalidCalendar(format!(
                "Calendar is for {} but the run is for {}",
                self.calendar.year, self.year
            )));
        }

        self.search.validate()
    }

    pub fn target(&self, month: u32) -> Option<&MonthlyTarget> {
        self.targets.iter().find(|t| t.month == month)
    }
}

/// Result of a synthesis run.
#[derive(Debug, Clone, Default)]
pub struct SynthesisOutput {
    /// Generated hours in chronological order
    pub records: Vec<HourlyRecord>,
    /// One entry per generated month
    pub validation: Vec<MonthValidation>,
    /// Months left out because no target was given
    pub skipped_months: Vec<u32>,
}

impl SynthesisOutput {
    pub fn records_for_month(&self, month: u32) -> impl Iterator<Item = &HourlyRecord> {
        self.records.iter().filter(move |r| r.month() == month)
    }

    /// Every generated month hits both targets without a negative hour.
    pub fn all_honored(&self) -> bool {
        self.validation.iter().all(|v| v.honored())
    }
}
