/// Relative tolerance under which `sum - n * max` counts as zero.
const FLAT_TOLERANCE: f64 = 1e-12;

/// Parameters of the monthly load model `demand(t) = base + amplitude * coef(t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParams {
    /// Constant floor in kW
    pub base: f64,
    /// Scale of the shape on top of the floor
    pub amplitude: f64,
    /// The coefficients were flat, so the peak constraint could not be used
    pub flat: bool,
}

impl AffineParams {
    /// Both parameters are non-negative up to `eps`.
    pub fn is_feasible(&self, eps: f64) -> bool {
        self.base >= -eps && self.amplitude >= -eps
    }

    /// Demand for one hour, clipped at zero.
    pub fn demand(&self, coef: f64) -> f64 {
        (self.base + self.amplitude * coef).max(0.0)
    }
}

/// Solve base and amplitude so that the peak lands on the largest coefficient
/// and the sum over all hours equals `target_total`.
///
/// With `n` hours, `S = sum(coefs)` and `M = max(coefs)`:
///
/// ```text
/// base + amplitude * M   = target_peak
/// n * base + amplitude * S = target_total
/// ```
///
/// A negative base or amplitude is returned as is; the sign is what tells the
/// caller the shape has to change. When the coefficients are flat the system is
/// degenerate and a constant load of `target_total / n` is returned.
pub fn fit_affine(target_peak: f64, target_total: f64, coefs: &[f64]) -> AffineParams {
    let n = coefs.len() as f64;
    if coefs.is_empty() {
        return AffineParams {
            base: 0.0,
            amplitude: 0.0,
            flat: true,
        };
    }

    let sum: f64 = coefs.iter().sum();
    let max = coefs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let denominator = sum - n * max;

    if denominator.abs() <= FLAT_TOLERANCE * (n * max.abs()).max(1.0) {
        return AffineParams {
            base: target_total / n,
            amplitude: 0.0,
            flat: true,
        };
    }

    let amplitude = (target_total - n * target_peak) / denominator;
    let base = target_peak - amplitude * max;

    AffineParams {
        base,
        amplitude,
        flat: false,
    }
}
