pub mod holidays;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Represents the type of day for load shape selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./calendar.ts")]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Regular working day (Monday through Friday, not a listed holiday)
    Working,
    /// Saturday, Sunday or an explicitly listed non-working date
    NonWorking,
}

impl DayKind {
    pub fn is_nonworking(self) -> bool {
        self == DayKind::NonWorking
    }

    /// Short label used in exports.
    pub fn label(self) -> &'static str {
        match self {
            DayKind::Working => "working",
            DayKind::NonWorking => "non-working",
        }
    }
}

/// Non-working calendar of a single year.
///
/// Saturdays and Sundays are always non-working. On top of that the rule carries
/// an explicit list of dates (public holidays, substitute holidays, company
/// closures). The list is configuration: nothing here derives holidays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./calendar.ts")]
pub struct CalendarRule {
    /// The calendar year this rule applies to.
    pub year: i32,
    /// Explicit non-working dates in `year`, in addition to weekends.
    pub non_working_dates: Vec<NaiveDate>,
}

impl CalendarRule {
    /// Create a rule with validation
    ///
    /// Every listed date must fall inside `year`. Duplicates are removed and the
    /// list is kept sorted.
    pub fn new(year: i32, mut non_working_dates: Vec<NaiveDate>) -> Result<Self, String> {
        if let Some(stray) = non_working_dates.iter().find(|d| d.year() != year) {
            return Err(format!(
                "Invalid non-working date: {}. Must fall in year {}",
                stray, year
            ));
        }
        non_working_dates.sort();
        non_working_dates.dedup();

        Ok(CalendarRule {
            year,
            non_working_dates,
        })
    }

    /// A rule where only Saturdays and Sundays are non-working.
    pub fn weekends_only(year: i32) -> Self {
        CalendarRule {
            year,
            non_working_dates: Vec::new(),
        }
    }

    /// Japanese public holidays, substitutes and year-end closures for 2024.
    pub fn japan_2024() -> Self {
        CalendarRule {
            year: 2024,
            non_working_dates: holidays::japan_2024(),
        }
    }

    /// Returns true for weekends and for explicitly listed dates.
    pub fn is_nonworking(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            || self.non_working_dates.contains(&date)
    }

    pub fn day_kind(&self, date: NaiveDate) -> DayKind {
        if self.is_nonworking(date) {
            DayKind::NonWorking
        } else {
            DayKind::Working
        }
    }
}
