use chrono::NaiveDate;

/// (month, day) pairs of the 2024 Japanese non-working dates.
///
/// Public holidays and substitute holidays, plus the year-end closure
/// (Dec 30-31) and the New Year closure (Jan 2-3).
const JAPAN_2024: [(u32, u32); 25] = [
    (1, 1),
    (1, 2),
    (1, 3),
    (1, 8),
    (2, 11),
    (2, 12),
    (2, 23),
    (3, 20),
    (4, 29),
    (5, 3),
    (5, 4),
    (5, 5),
    (5, 6),
    (7, 15),
    (8, 11),
    (8, 12),
    (9, 16),
    (9, 22),
    (9, 23),
    (10, 14),
    (11, 3),
    (11, 4),
    (11, 23),
    (12, 30),
    (12, 31),
];

pub fn japan_2024() -> Vec<NaiveDate> {
    JAPAN_2024
        .iter()
        .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(2024, month, day))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_dates_are_valid() {
        assert_eq!(japan_2024().len(), JAPAN_2024.len());
    }
}
