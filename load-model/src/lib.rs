//! Model structs for synthesizing hourly load curves from monthly billing data.
//!
//! The engine lives in `demand-synth`; this crate only holds the shapes that are
//! exchanged with it, plus the small pure functions (day classification and
//! pattern normalization) that any front-end needs to preview an input.

pub mod calendar;
pub mod demand;
pub mod pattern;

pub use calendar::{CalendarRule, DayKind};
pub use demand::record::{DEMAND_RESOLUTION, FitStatus, HourlyRecord, MonthValidation};
pub use demand::target::MonthlyTarget;
pub use pattern::preset::PatternPreset;
pub use pattern::{
    GenerationCoefficients, HOURS_PER_DAY, PatternModel, ShapePattern, normalize_to_percentage,
    normalize_to_unit_peak,
};
