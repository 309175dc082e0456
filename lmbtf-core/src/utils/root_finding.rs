//! Scalar root finding.

use crate::FloatValue;
use thiserror::Error;

/// Failure modes of [`RootFinder::solve`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RootFindingError {
    #[error("f({lower}) = {f_lower} and f({upper}) = {f_upper} do not bracket a root")]
    NoBracket {
        lower: FloatValue,
        upper: FloatValue,
        f_lower: FloatValue,
        f_upper: FloatValue,
    },
    #[error("no convergence after {iterations} iterations, last estimate {estimate}")]
    MaxIterations {
        iterations: usize,
        estimate: FloatValue,
    },
    #[error("function is not finite at {x}")]
    NonFinite { x: FloatValue },
}

/// A converged root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub value: FloatValue,
    /// Number of function evaluations after the bracket check
    pub iterations: usize,
}

/// Safeguarded Newton/bisection solver.
///
/// Each iteration takes a Newton step when it stays inside the current bracket
/// and shrinks the residual fast enough, and bisects otherwise. The bracket is
/// tightened after every evaluation so the iteration cannot leave it.
///
/// Convergence is declared when the last step is below
/// `abs_tol + rel_tol * |x|`.
///
/// # Example
/// ```
/// use lmbtf_core::utils::root_finding::RootFinder;
///
/// // sqrt(2) as the root of x^2 - 2
/// let root = RootFinder::default()
///     .solve(|x| (x * x - 2.0, 2.0 * x), 0.0, 2.0)
///     .unwrap();
/// assert!((root.value - 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootFinder {
    pub abs_tol: FloatValue,
    pub rel_tol: FloatValue,
    pub max_iterations: usize,
}

impl Default for RootFinder {
    fn default() -> Self {
        Self {
            abs_tol: 1e-15,
            rel_tol: 1e-13,
            max_iterations: 200,
        }
    }
}

impl RootFinder {
    /// Find a root of `f` in `[lower, upper]`.
    ///
    /// `f` returns the function value and its derivative. The function values at
    /// the two ends must have opposite signs (or one of them must be zero).
    pub fn solve<F>(
        &self,
        f: F,
        lower: FloatValue,
        upper: FloatValue,
    ) -> Result<Root, RootFindingError>
    where
        F: Fn(FloatValue) -> (FloatValue, FloatValue),
    {
        let (f_lower, _) = f(lower);
        let (f_upper, _) = f(upper);
        if !f_lower.is_finite() {
            return Err(RootFindingError::NonFinite { x: lower });
        }
        if !f_upper.is_finite() {
            return Err(RootFindingError::NonFinite { x: upper });
        }
        if f_lower == 0.0 {
            return Ok(Root {
                value: lower,
                iterations: 0,
            });
        }
        if f_upper == 0.0 {
            return Ok(Root {
                value: upper,
                iterations: 0,
            });
        }
        if f_lower.signum() == f_upper.signum() {
            return Err(RootFindingError::NoBracket {
                lower,
                upper,
                f_lower,
                f_upper,
            });
        }

        // Orient the bracket so that f(x_neg) < 0 < f(x_pos)
        let (mut x_neg, mut x_pos) = if f_lower < 0.0 {
            (lower, upper)
        } else {
            (upper, lower)
        };

        let mut x = 0.5 * (lower + upper);
        let mut step_old = (upper - lower).abs();
        let mut step = step_old;
        let (mut fx, mut dfx) = f(x);
        if !fx.is_finite() {
            return Err(RootFindingError::NonFinite { x });
        }
        if fx < 0.0 {
            x_neg = x;
        } else {
            x_pos = x;
        }

        for iteration in 1..=self.max_iterations {
            if fx == 0.0 {
                return Ok(Root {
                    value: x,
                    iterations: iteration,
                });
            }

            let newton_leaves_bracket =
                ((x - x_pos) * dfx - fx) * ((x - x_neg) * dfx - fx) > 0.0;
            let newton_too_slow = (2.0 * fx).abs() > (step_old * dfx).abs();

            if !dfx.is_finite() || dfx == 0.0 || newton_leaves_bracket || newton_too_slow {
                step_old = step;
                step = 0.5 * (x_pos - x_neg);
                x = x_neg + step;
            } else {
                step_old = step;
                step = fx / dfx;
                x -= step;
            }

            let tolerance = self.abs_tol + self.rel_tol * x.abs();
            if step.abs() < tolerance || (x_pos - x_neg).abs() < tolerance {
                return Ok(Root {
                    value: x,
                    iterations: iteration,
                });
            }

            (fx, dfx) = f(x);
            if !fx.is_finite() {
                return Err(RootFindingError::NonFinite { x });
            }
            if fx < 0.0 {
                x_neg = x;
            } else {
                x_pos = x;
            }
        }

        Err(RootFindingError::MaxIterations {
            iterations: self.max_iterations,
            estimate: x,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial_root() {
        let root = RootFinder::default()
            .solve(|x| (x * x * x - x - 2.0, 3.0 * x * x - 1.0), 1.0, 2.0)
            .unwrap();
        let r = root.value;
        assert!((r * r * r - r - 2.0).abs() < 1e-12, "root = {}", r);
        assert!(root.iterations < 20);
    }

    #[test]
    fn test_decreasing_function() {
        // Roots of decreasing functions are oriented internally
        let root = RootFinder::default()
            .solve(|x| (-(x - 0.3), -1.0), 0.0, 1.0)
            .unwrap();
        assert!((root.value - 0.3).abs() < 1e-14);
    }

    #[test]
    fn test_endpoint_root() {
        let root = RootFinder::default()
            .solve(|x| (x - 1.0, 1.0), 1.0, 3.0)
            .unwrap();
        assert_eq!(root.value, 1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn test_no_bracket() {
        let err = RootFinder::default()
            .solve(|x| (x * x + 1.0, 2.0 * x), -1.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, RootFindingError::NoBracket { .. }));
    }

    #[test]
    fn test_zero_derivative_falls_back_to_bisection() {
        // Derivative reported as zero everywhere: pure bisection
        let root = RootFinder::default()
            .solve(|x| (x - 0.123, 0.0), 0.0, 1.0)
            .unwrap();
        assert!((root.value - 0.123).abs() < 1e-12);
    }

    #[test]
    fn test_iteration_limit() {
        let finder = RootFinder {
            max_iterations: 3,
            ..RootFinder::default()
        };
        let err = finder.solve(|x| (x - 0.123, 0.0), 0.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            RootFindingError::MaxIterations { iterations: 3, .. }
        ));
    }

    #[test]
    fn test_non_finite() {
        let err = RootFinder::default()
            .solve(|x| (1.0 / x, -1.0 / (x * x)), 0.0, 1.0)
            .unwrap_err();
        assert_eq!(err, RootFindingError::NonFinite { x: 0.0 });
    }

    #[test]
    fn test_steep_logistic() {
        // Fermi-Dirac shaped residual similar to the MSMR occupancy
        let f = |u: f64| {
            let e = (40.0 * (u - 4.0)).exp();
            (1.0 / (1.0 + e) - 0.25, -40.0 * e / ((1.0 + e) * (1.0 + e)))
        };
        let root = RootFinder::default().solve(f, 2.0, 6.0).unwrap();
        let expected = 4.0 + (3.0_f64).ln() / 40.0;
        assert!(
            (root.value - expected).abs() < 1e-12,
            "{} vs {}",
            root.value,
            expected
        );
    }
}
