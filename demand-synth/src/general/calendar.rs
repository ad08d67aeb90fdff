use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use load_model::{CalendarRule, GenerationCoefficients, HOURS_PER_DAY};

/// Hours in the modelled year (leap day always excluded)
pub const HOURS_PER_YEAR: usize = 365 * HOURS_PER_DAY;

fn is_leap_day(date: NaiveDate) -> bool {
    date.month() == 2 && date.day() == 29
}

/// Every hour of `year` in chronological order, with February 29th dropped.
///
/// The model always works on a 365-day year, so leap years lose their leap day
/// instead of shifting the rest of the calendar.
pub fn year_hours(year: i32) -> Vec<NaiveDateTime> {
    let mut hours = Vec::with_capacity(HOURS_PER_YEAR);
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return hours;
    };

    for date in first.iter_days().take_while(|d| d.year() == year) {
        if is_leap_day(date) {
            continue;
        }
        for hour in 0..HOURS_PER_DAY as u32 {
            if let Some(ts) = date.and_hms_opt(hour, 0, 0) {
                hours.push(ts);
            }
        }
    }

    hours
}

/// Split a chronological list of hours into months, keeping month order.
pub fn group_by_month(hours: &[NaiveDateTime]) -> IndexMap<u32, Vec<NaiveDateTime>> {
    let mut months: IndexMap<u32, Vec<NaiveDateTime>> = IndexMap::new();
    for &ts in hours {
        months.entry(ts.month()).or_default().push(ts);
    }
    months
}

/// Generation coefficient of every hour, picking the working or non-working
/// shape from the calendar.
pub fn month_coefficients(
    hours: &[NaiveDateTime],
    rule: &CalendarRule,
    coefficients: &GenerationCoefficients,
) -> Vec<f64> {
    hours
        .iter()
        .map(|ts| {
            let kind = rule.day_kind(ts.date());
            coefficients.get(kind, ts.hour() as usize)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use load_model::PatternPreset;

    #[test]
    fn test_year_hours_leap_year_has_8760() {
        let hours = year_hours(2024);
        assert_eq!(hours.len(), HOURS_PER_YEAR);
        assert!(hours.iter().all(|ts| !is_leap_day(ts.date())));
    }

    #[test]
    fn test_year_hours_common_year_has_8760() {
        let hours = year_hours(2023);
        assert_eq!(hours.len(), 8760);
        assert_eq!(hours[0].hour(), 0);
        assert_eq!(hours[8759].date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(hours[8759].hour(), 23);
    }

    #[test]
    fn test_group_by_month_counts() {
        let months = group_by_month(&year_hours(2024));
        let expected = [744, 672, 744, 720, 744, 720, 744, 744, 720, 744, 720, 744];
        assert_eq!(months.len(), 12);
        for (i, (month, hours)) in months.iter().enumerate() {
            assert_eq!(*month, i as u32 + 1);
            assert_eq!(hours.len(), expected[i]);
        }
    }

    #[test]
    fn test_month_coefficients_follow_calendar() {
        let rule = CalendarRule::japan_2024();
        let coefs = PatternPreset::Office.pattern_model().generation_coefficients();
        let months = group_by_month(&year_hours(2024));
        let january = month_coefficients(&months[0], &rule, &coefs);

        // Jan 1 is a holiday: 14:00 uses the non-working shape (flat at 0.3)
        assert!((january[14] - 0.3).abs() < 1e-12);
        // Jan 4 is a plain Thursday: 14:00 is the working peak
        assert_eq!(january[3 * 24 + 14], 1.0);
    }
}
