use load_model::FitStatus;
use tracing::debug;

use crate::synth::affine_fit::{AffineParams, fit_affine};
use crate::synth::synth_utils::SearchConfig;

/// Outcome of the reshaping search for one month.
#[derive(Debug, Clone)]
pub struct ShapeFit {
    /// Coefficients the parameters were fitted on (possibly reshaped)
    pub coefs: Vec<f64>,
    pub params: AffineParams,
    /// Exponent applied to the coefficients, `None` if the shape was kept
    pub gamma: Option<f64>,
    /// Bisection steps taken
    pub iterations: usize,
    /// A non-negative base and amplitude were found
    pub converged: bool,
}

/// Power-law warp `(c / max)^gamma * max`.
///
/// The maximum is preserved; `gamma > 1` sharpens the shape, `gamma < 1`
/// flattens it.
pub fn reshape(coefs: &[f64], gamma: f64) -> Vec<f64> {
    let max = coefs.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return coefs.to_vec();
    }
    coefs
        .iter()
        .map(|&c| (c / max).powf(gamma) * max)
        .collect()
}

/// Search a reshaping exponent for which the affine fit has a non-negative
/// base and amplitude.
///
/// Bisection over `[gamma_min, gamma_max]`:
/// - a negative base means the shape carries too much energy for the target
///   total, so the shape is sharpened (`low = gamma`)
/// - a negative amplitude means the shape is too peaky, so it is flattened
///   (`high = gamma`)
///
/// The first feasible point is returned. If none is found, the last midpoint is
/// returned with whatever signs it has; see [`apply_fallback`].
pub fn optimize_shape(
    target_peak: f64,
    target_total: f64,
    coefs: &[f64],
    search: &SearchConfig,
) -> ShapeFit {
    let params = fit_affine(target_peak, target_total, coefs);
    if params.is_feasible(search.feasibility_eps) {
        return ShapeFit {
            coefs: coefs.to_vec(),
            params,
            gamma: None,
            iterations: 0,
            converged: true,
        };
    }

    let max = coefs.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return ShapeFit {
            coefs: coefs.to_vec(),
            params,
            gamma: None,
            iterations: 0,
            converged: false,
        };
    }

    let mut low = search.gamma_min;
    let mut high = search.gamma_max;
    let mut gamma = (low + high) / 2.0;

    for iteration in 1..=search.max_iterations {
        gamma = (low + high) / 2.0;
        let reshaped = reshape(coefs, gamma);
        let params = fit_affine(target_peak, target_total, &reshaped);
        debug!(
            iteration,
            gamma,
            base = params.base,
            amplitude = params.amplitude,
            "Shape search step"
        );

        if params.base < 0.0 {
            low = gamma;
        } else if params.amplitude < 0.0 {
            high = gamma;
        } else {
            return ShapeFit {
                coefs: reshaped,
                params,
                gamma: Some(gamma),
                iterations: iteration,
                converged: true,
            };
        }
    }

    let reshaped = reshape(coefs, gamma);
    let params = fit_affine(target_peak, target_total, &reshaped);
    ShapeFit {
        coefs: reshaped,
        params,
        gamma: Some(gamma),
        iterations: search.max_iterations,
        converged: false,
    }
}

/// Clamp a fit that still has a negative parameter and classify the result.
///
/// The total is always kept; the peak is given up:
/// - negative amplitude: flat load `target_total / n`
/// - negative base: zero base, shape scaled to `target_total`
pub fn apply_fallback(target_total: f64, fit: &ShapeFit) -> (AffineParams, FitStatus) {
    let mut params = fit.params;
    let n = fit.coefs.len().max(1) as f64;

    if params.amplitude < 0.0 {
        params.amplitude = 0.0;
        params.base = target_total / n;
        return (params, FitStatus::ClampedFlat);
    }

    if params.base < 0.0 {
        let sum: f64 = fit.coefs.iter().sum();
        params.base = 0.0;
        params.amplitude = if sum > 0.0 { target_total / sum } else { 0.0 };
        return (params, FitStatus::ClampedZeroBase);
    }

    let status = if params.flat {
        FitStatus::FlatPattern
    } else if let Some(gamma) = fit.gamma {
        FitStatus::Reshaped { gamma }
    } else {
        FitStatus::Fitted
    };
    (params, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use load_model::PatternPreset;

    fn office_week() -> Vec<f64> {
        // Five working days followed by a weekend at 30 %
        let coefs = PatternPreset::Office.pattern_model().generation_coefficients();
        let mut week = Vec::with_capacity(168);
        for _ in 0..5 {
            week.extend_from_slice(&coefs.working);
        }
        for _ in 0..2 {
            week.extend_from_slice(&coefs.nonworking);
        }
        week
    }

    #[test]
    fn test_reshape_preserves_max() {
        let coefs = [0.2, 0.5, 2.0, 1.0];
        for gamma in [0.1, 0.5, 1.0, 3.0, 10.0] {
            let reshaped = reshape(&coefs, gamma);
            assert_eq!(reshaped[2], 2.0);
        }
        let sharp = reshape(&coefs, 3.0);
        assert!(sharp.iter().sum::<f64>() < coefs.iter().sum::<f64>());
    }

    #[test]
    fn test_feasible_shape_is_returned_unchanged() {
        let coefs = office_week();
        let fit = optimize_shape(60.0, 6048.0, &coefs, &SearchConfig::default());
        assert!(fit.converged);
        assert_eq!(fit.gamma, None);
        assert_eq!(fit.iterations, 0);
        assert_eq!(fit.coefs, coefs);
    }

    #[test]
    fn test_low_total_sharpens_shape() {
        let coefs = office_week();
        // Load factor ~0.1, well below the shape's own
        let total = 60.0 * 168.0 * 0.1;
        let fit = optimize_shape(60.0, total, &coefs, &SearchConfig::default());
        assert!(fit.converged);
        assert!(fit.iterations <= 20);
        assert!(fit.gamma.unwrap() > 1.0);
        assert!(fit.params.base >= 0.0 && fit.params.amplitude >= 0.0);
    }

    #[test]
    fn test_flat_shape_needs_no_search() {
        let fit = optimize_shape(60.0, 744.0 * 30.0, &[1.0; 744], &SearchConfig::default());
        assert!(fit.converged);
        assert_eq!(fit.iterations, 0);
        let (params, status) = apply_fallback(744.0 * 30.0, &fit);
        assert_eq!(status, FitStatus::FlatPattern);
        assert_eq!(params.amplitude, 0.0);
    }

    #[test]
    fn test_total_above_peak_hours_clamps_flat() {
        let coefs = office_week();
        let total = 60.0 * 168.0 * 1.5;
        let fit = optimize_shape(60.0, total, &coefs, &SearchConfig::default());
        assert!(!fit.converged);
        let (params, status) = apply_fallback(total, &fit);
        assert_eq!(status, FitStatus::ClampedFlat);
        assert_eq!(params.amplitude, 0.0);
        assert!((params.base * 168.0 - total).abs() < 1e-6);
    }

    #[test]
    fn test_unreachable_low_total_clamps_zero_base() {
        // A shape with a high floor that even gamma=10 cannot sharpen enough
        let coefs: Vec<f64> = (0..24).map(|h| if h == 12 { 1.0 } else { 0.999 }).collect();
        let total = 24.0 * 60.0 * 0.05;
        let fit = optimize_shape(60.0, total, &coefs, &SearchConfig::default());
        assert!(!fit.converged);
        let (params, status) = apply_fallback(total, &fit);
        assert_eq!(status, FitStatus::ClampedZeroBase);
        assert_eq!(params.base, 0.0);
        let sum: f64 = fit.coefs.iter().map(|&c| params.demand(c)).sum();
        assert!((sum - total).abs() < 1e-6);
    }

    #[test]
    fn test_fitted_and_reshaped_status() {
        let coefs = office_week();
        let fit = optimize_shape(60.0, 6048.0, &coefs, &SearchConfig::default());
        assert_eq!(apply_fallback(6048.0, &fit).1, FitStatus::Fitted);

        let total = 60.0 * 168.0 * 0.1;
        let fit = optimize_shape(60.0, total, &coefs, &SearchConfig::default());
        assert!(matches!(
            apply_fallback(total, &fit).1,
            FitStatus::Reshaped { .. }
        ));
    }
}
