//! Hyperbolic kernels of the porous-electrode solution
//!
//! The potentials in the positive electrode are combinations of
//!
//! $$ R(a) = \frac{\cosh(a\nu)}{\sinh\nu}, \qquad \nu = \sqrt{w} $$
//!
//! which has a pole at $w = 0$. The transfer functions only ever need the
//! products $\nu R(a)$ and differences $(R(a) - R(b))/\nu$, and both are entire
//! in $w$. Near the origin they are summed as power series in $w$; elsewhere
//! they are written with $e^{-2\nu}$ so that nothing overflows for large
//! $|\nu|$.

use num::complex::Complex64;

/// $|w|$ below which the power series are used
pub(crate) const SERIES_RADIUS: f64 = 0.25;

/// Terms kept in each power series, enough for full precision inside
/// [`SERIES_RADIUS`]
const SERIES_TERMS: usize = 12;

/// Sum $\sum_k t_k$ with $t_0$ given and $t_{k+1} = t_k \cdot w \cdot r(k)$
fn power_series(w: Complex64, first: f64, ratio: impl Fn(f64) -> f64) -> Complex64 {
    let mut term = Complex64::from(first);
    let mut sum = term;
    for k in 0..SERIES_TERMS {
        term *= w * ratio(k as f64);
        sum += term;
    }
    sum
}

/// $\cosh\sqrt{w} = \sum_k w^k/(2k)!$
pub(crate) fn cosh_sqrt(w: Complex64) -> Complex64 {
    power_series(w, 1.0, |k| 1.0 / ((2.0 * k + 1.0) * (2.0 * k + 2.0)))
}

/// $\sinh\sqrt{w}/\sqrt{w} = \sum_k w^k/(2k+1)!$
pub(crate) fn sinhc_sqrt(w: Complex64) -> Complex64 {
    power_series(w, 1.0, |k| 1.0 / ((2.0 * k + 2.0) * (2.0 * k + 3.0)))
}

/// $(\cosh\sqrt{w} - 1)/w = \sum_k w^k/(2k+2)!$
pub(crate) fn cosh_sqrt_excess(w: Complex64) -> Complex64 {
    power_series(w, 0.5, |k| 1.0 / ((2.0 * k + 3.0) * (2.0 * k + 4.0)))
}

/// $\beta\coth\beta - 1$ for $\beta = \sqrt{b}$
///
/// Vanishes like $b/3$ at the origin and grows like $\beta$ for large $|b|$.
pub(crate) fn coth_excess(b: Complex64) -> Complex64 {
    if b.norm() < SERIES_RADIUS {
        // (β cosh β - sinh β)/β = Σ_{k≥1} 2k b^k/(2k+1)!
        let numerator = b * power_series(b, 1.0 / 3.0, |k| {
            (k + 2.0) / ((k + 1.0) * (2.0 * k + 4.0) * (2.0 * k + 5.0))
        });
        numerator / sinhc_sqrt(b)
    } else {
        let beta = b.sqrt();
        let decay = (-2.0 * beta).exp();
        beta * (1.0 + decay) / (1.0 - decay) - 1.0
    }
}

/// Kernel of the porous-electrode solution at one value of $w$
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Kernel {
    Series { w: Complex64 },
    Exponential { nu: Complex64, decay: Complex64 },
}

impl Kernel {
    pub fn new(w: Complex64) -> Self {
        if w.norm() < SERIES_RADIUS {
            Self::series(w)
        } else {
            Self::exponential(w)
        }
    }

    pub fn series(w: Complex64) -> Self {
        Self::Series { w }
    }

    pub fn exponential(w: Complex64) -> Self {
        let nu = w.sqrt();
        Self::Exponential {
            nu,
            decay: (-2.0 * nu).exp(),
        }
    }

    /// $R(a)$ from exponentials, $a \in [0, 1]$
    fn ratio(nu: Complex64, decay: Complex64, a: f64) -> Complex64 {
        (((a - 1.0) * nu).exp() + (-(a + 1.0) * nu).exp()) / (1.0 - decay)
    }

    /// $\nu \cosh(a\nu)/\sinh\nu$
    pub fn scaled_ratio(&self, a: f64) -> Complex64 {
        match *self {
            Self::Series { w } => cosh_sqrt(a * a * w) / sinhc_sqrt(w),
            Self::Exponential { nu, decay } => nu * Self::ratio(nu, decay, a),
        }
    }

    /// $(\cosh(a\nu) - \cosh(b\nu))/(\nu\sinh\nu)$
    pub fn ratio_difference(&self, a: f64, b: f64) -> Complex64 {
        match *self {
            Self::Series { w } => {
                let (a2, b2) = (a * a, b * b);
                (a2 * cosh_sqrt_excess(a2 * w) - b2 * cosh_sqrt_excess(b2 * w)) / sinhc_sqrt(w)
            }
            Self::Exponential { nu, decay } => {
                (Self::ratio(nu, decay, a) - Self::ratio(nu, decay, b)) / nu
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex64, b: Complex64, tol: f64) -> bool {
        (a - b).norm() <= tol * b.norm().max(1e-300)
    }

    #[test]
    fn test_series_match_closed_forms() {
        let w = Complex64::new(0.12, -0.17);
        let nu = w.sqrt();
        assert!(close(cosh_sqrt(w), nu.cosh(), 1e-15));
        assert!(close(sinhc_sqrt(w), nu.sinh() / nu, 1e-15));
        assert!(close(cosh_sqrt_excess(w), (nu.cosh() - 1.0) / w, 1e-14));
        assert!(close(coth_excess(w), nu / nu.tanh() - 1.0, 1e-12));
    }

    #[test]
    fn test_origin() {
        let zero = Complex64::new(0.0, 0.0);
        assert_eq!(coth_excess(zero), zero);
        let kernel = Kernel::new(zero);
        assert_eq!(kernel.scaled_ratio(0.3), Complex64::new(1.0, 0.0));
        // (a² - b²)/2 in the limit
        assert!(close(kernel.ratio_difference(1.0, 0.5), Complex64::new(0.375, 0.0), 1e-15));
    }

    #[test]
    fn test_forms_agree_at_series_radius() {
        for angle in [0.0, 0.4, 0.785, 1.2, 1.57] {
            let w = Complex64::from_polar(SERIES_RADIUS, angle);
            let series = Kernel::series(w);
            let exponential = Kernel::exponential(w);
            for a in [0.0, 0.25, 0.5, 1.0] {
                assert!(close(series.scaled_ratio(a), exponential.scaled_ratio(a), 1e-12));
                for b in [0.0, 0.7, 1.0] {
                    let s = series.ratio_difference(a, b);
                    let e = exponential.ratio_difference(a, b);
                    assert!((s - e).norm() < 1e-12, "a={a} b={b}: {s} vs {e}");
                }
            }
        }
    }

    #[test]
    fn test_large_argument_is_finite() {
        let kernel = Kernel::new(Complex64::new(1e6, 1e6));
        let edge = kernel.scaled_ratio(1.0);
        assert!(edge.re.is_finite() && edge.im.is_finite());
        // Deep inside, the response decays to nothing
        assert!(kernel.scaled_ratio(0.5).norm() < 1e-100);
        assert!(coth_excess(Complex64::new(1e8, 0.0)).re.is_finite());
    }
}
