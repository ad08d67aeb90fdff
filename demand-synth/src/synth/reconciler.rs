use load_model::DEMAND_RESOLUTION;
use tracing::debug;

/// Pre-rounding total differences up to this size are left alone (kWh).
const TOTAL_TOLERANCE: f64 = 0.001;

/// Hours touched while forcing a month onto its targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Hour overwritten with the target peak
    pub peak_index: Option<usize>,
    /// Hour that absorbed the pre-rounding total difference
    pub total_index: Option<usize>,
    /// The total correction kept that hour inside `[0, target_peak]`
    pub total_within_bounds: bool,
    /// Hour that absorbed the residual left by rounding
    pub residual_index: Option<usize>,
}

/// Round to the storage resolution (0.01 kW).
pub fn round_demand(value: f64) -> f64 {
    let scale = 1.0 / DEMAND_RESOLUTION;
    (value * scale).round() / scale
}

/// Index of the largest value; the earliest one wins ties.
pub fn index_of_max(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] >= v => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Overwrite the current maximum with `target_peak`.
pub fn force_peak(values: &mut [f64], target_peak: f64) -> Option<usize> {
    let index = index_of_max(values)?;
    values[index] = target_peak;
    Some(index)
}

/// Put the whole difference to `target_total` on one non-peak hour.
///
/// Candidates are visited from the largest value down and the first one that
/// stays inside `[0, target_peak]` is taken. If none does, the smallest
/// non-peak hour takes the difference regardless.
///
/// Returns the adjusted hour and whether it stayed inside the bounds.
pub fn force_total(
    values: &mut [f64],
    peak_index: usize,
    target_peak: f64,
    target_total: f64,
) -> Option<(usize, bool)> {
    let diff = target_total - values.iter().sum::<f64>();
    if diff.abs() <= TOTAL_TOLERANCE {
        return None;
    }

    let mut order: Vec<usize> = (0..values.len()).filter(|&i| i != peak_index).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let within_bounds = order.iter().copied().find(|&i| {
        let adjusted = values[i] + diff;
        (0.0..=target_peak).contains(&adjusted)
    });

    let (index, in_bounds) = match within_bounds {
        Some(i) => (i, true),
        None => (*order.last()?, false),
    };
    values[index] += diff;
    Some((index, in_bounds))
}

/// Push the rounding residual of the month onto one non-peak hour.
///
/// Hours are scanned in chronological order and the first one whose rounded,
/// corrected value stays inside `[0, target_peak]` takes the residual.
pub fn settle_rounding(values: &mut [f64], target_peak: f64, target_total: f64) -> Option<usize> {
    let drift = target_total - values.iter().sum::<f64>();
    if drift.abs() < DEMAND_RESOLUTION {
        return None;
    }

    let peak_index = index_of_max(values)?;
    let index = (0..values.len()).filter(|&i| i != peak_index).find(|&i| {
        let adjusted = round_demand(values[i] + drift);
        (0.0..=target_peak).contains(&adjusted)
    })?;
    values[index] = round_demand(values[index] + drift);
    Some(index)
}

/// Force a month's raw demand onto its peak and total.
///
/// Order: peak hour, total hour, rounding to 0.01 kW, then the rounding
/// residual. Negative raw values are clipped to zero first.
pub fn reconcile_month(values: &mut [f64], target_peak: f64, target_total: f64) -> Reconciliation {
    let mut result = Reconciliation::default();

    for v in values.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }

    result.peak_index = force_peak(values, target_peak);

    if let Some(peak_index) = result.peak_index {
        if let Some((index, in_bounds)) = force_total(values, peak_index, target_peak, target_total) {
            result.total_index = Some(index);
            result.total_within_bounds = in_bounds;
        } else {
            result.total_within_bounds = true;
        }
    }

    for v in values.iter_mut() {
        *v = round_demand(*v);
    }

    result.residual_index = settle_rounding(values, target_peak, target_total);

    debug!(
        peak_index = ?result.peak_index,
        total_index = ?result.total_index,
        residual_index = ?result.residual_index,
        "Reconciled month"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_index_of_max_prefers_first() {
        assert_eq!(index_of_max(&[1.0, 3.0, 2.0, 3.0]), Some(1));
        assert_eq!(index_of_max(&[]), None);
    }

    #[test]
    fn test_force_peak_touches_one_hour() {
        let mut values = vec![1.0, 4.0, 2.0, 4.0];
        assert_eq!(force_peak(&mut values, 5.0), Some(1));
        assert_eq!(values, vec![1.0, 5.0, 2.0, 4.0]);
    }

    #[test]
    fn test_force_total_uses_largest_non_peak_hour() {
        let mut values = vec![1.0, 10.0, 6.0, 3.0];
        let result = force_total(&mut values, 1, 10.0, 21.0);
        assert_eq!(result, Some((2, true)));
        assert_eq!(values, vec![1.0, 10.0, 7.0, 3.0]);
    }

    #[test]
    fn test_force_total_skips_hours_that_would_exceed_peak() {
        let mut values = vec![1.0, 10.0, 9.5, 3.0];
        // +2 would push hour 2 above the peak, hour 3 can take it
        let result = force_total(&mut values, 1, 10.0, 25.5);
        assert_eq!(result, Some((3, true)));
        assert_eq!(values[3], 5.0);
    }

    #[test]
    fn test_force_total_falls_back_to_smallest_hour() {
        let mut values = vec![2.0, 10.0, 9.0, 1.0];
        // +30 fits nowhere; the smallest non-peak hour absorbs it
        let result = force_total(&mut values, 1, 10.0, 52.0);
        assert_eq!(result, Some((3, false)));
        assert_eq!(values[3], 31.0);
    }

    #[test]
    fn test_force_total_within_tolerance_is_noop() {
        let mut values = vec![1.0, 10.0, 6.0];
        assert_eq!(force_total(&mut values, 1, 10.0, 17.0005), None);
        assert_eq!(values, vec![1.0, 10.0, 6.0]);
    }

    #[test]
    fn test_settle_rounding_picks_first_non_peak_hour() {
        let mut values = vec![10.0, 2.0, 3.0];
        let index = settle_rounding(&mut values, 10.0, 15.05);
        assert_eq!(index, Some(1));
        assert!((values[1] - 2.05).abs() < 1e-9);
    }

    #[test]
    fn test_settle_rounding_ignores_sub_resolution_drift() {
        let mut values = vec![10.0, 2.0, 3.0];
        assert_eq!(settle_rounding(&mut values, 10.0, 15.004), None);
    }

    #[test]
    fn test_reconcile_month_hits_targets() {
        let mut values = vec![-1.0, 3.333, 8.7, 5.111, 4.2, 2.9];
        let result = reconcile_month(&mut values, 10.0, 30.0);
        assert_eq!(result.peak_index, Some(2));
        assert_ne!(result.total_index, result.peak_index);
        let max = values.iter().copied().fold(0.0, f64::max);
        let sum: f64 = values.iter().sum();
        assert_eq!(max, 10.0);
        assert!((sum - 30.0).abs() < DEMAND_RESOLUTION);
        assert!(values.iter().all(|&v| v >= 0.0));
    }

    proptest! {
        #[test]
        fn prop_reconcile_touches_few_hours(
            raw in prop::collection::vec(0.0..50.0f64, 48),
            delta in -20.0..20.0f64,
        ) {
            let target_peak = 60.0;
            let target_total = raw.iter().sum::<f64>() + target_peak + delta;

            let mut values = raw.clone();
            let peak = force_peak(&mut values, target_peak).unwrap();
            let total = force_total(&mut values, peak, target_peak, target_total);
            let changed = values.iter().zip(raw.iter()).filter(|(a, b)| a != b).count();
            prop_assert!(changed <= 2);
            if let Some((index, in_bounds)) = total {
                prop_assert_ne!(index, peak);
                prop_assert!((values.iter().sum::<f64>() - target_total).abs() < 1e-6);
                if in_bounds {
                    prop_assert_eq!(values.iter().copied().fold(0.0, f64::max), target_peak);
                }
            }

            let mut rounded: Vec<f64> = values.iter().map(|&v| round_demand(v)).collect();
            let before = rounded.clone();
            if let Some(index) = settle_rounding(&mut rounded, target_peak, target_total) {
                prop_assert_ne!(Some(index), index_of_max(&before));
            }
            let changed = rounded.iter().zip(before.iter()).filter(|(a, b)| a != b).count();
            prop_assert!(changed <= 1);
        }

        #[test]
        fn prop_reconciled_values_are_non_negative(
            raw in prop::collection::vec(-5.0..50.0f64, 24),
            target_total in 100.0..900.0f64,
        ) {
            let mut values = raw;
            let result = reconcile_month(&mut values, 60.0, target_total);
            if result.total_within_bounds {
                prop_assert!(values.iter().all(|&v| v >= 0.0));
            }
        }
    }
}
