//! Multi-species multi-reaction (MSMR) electrode thermodynamics and kinetics
//!
//! The electrode is a set of parallel galleries. At potential $U$ gallery $j$
//! holds
//!
//! $$ x_j(U) = \frac{X_j}{1 + \exp\left(f (U - U^0_j)/\omega_j\right)}, \qquad f = \frac{F}{RT} $$
//!
//! and the electrode lithiation is $\theta(U) = \sum_j x_j(U)$. The mapping from
//! potential to lithiation is explicit; the open-circuit potential at a given
//! lithiation is found by a bracketed root find of $\theta(U) - \theta^* = 0$.
//!
//! At an equilibrium potential each gallery has exchange current
//!
//! $$ i_{0,j} = k_{0,j}\, x_j^{\omega_j \alpha_j} (X_j - x_j)^{\omega_j (1 - \alpha_j)} $$
//!
//! and charge-transfer resistance $R_{ct,j} = V_T / i_{0,j}$. The galleries share
//! one interface so the electrode resistance is their parallel combination.
//!
//! # Reference
//!
//! Verbrugge, M., Baker, D., Koch, B., Xiao, X. and Gu, W. (2017)
//! Thermodynamic model for substitutional materials: application to lithiated
//! graphite, spinel manganese oxide, iron phosphate, and layered
//! nickel-manganese-cobalt oxide. J. Electrochem. Soc. 164, E3243.

use lmbtf_core::constants::{inverse_thermal_voltage, thermal_voltage};
use lmbtf_core::errors::{LMBError, LMBResult};
use lmbtf_core::parameters::{GalleryParameters, ResolvedParameters};
use lmbtf_core::utils::root_finding::{RootFinder, RootFindingError};
use lmbtf_core::FloatValue;
use log::{trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Allowed deviation of $\sum_j X_j$ from one
const CAPACITY_TOLERANCE: FloatValue = 1e-6;

/// Half-width of the valid potential range beyond the outermost standard
/// potentials, in units of $\omega_{max} V_T$
const WINDOW_WIDTH: FloatValue = 100.0;

/// A resolved gallery
pub type Gallery = GalleryParameters<FloatValue>;

/// Charge-transfer state of an MSMR electrode at one equilibrium potential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeTransfer {
    /// Gallery occupancies $x_j$
    pub partial_lithiation: Vec<FloatValue>,
    /// Gallery exchange currents (A)
    pub exchange_current: Vec<FloatValue>,
    /// Gallery charge-transfer resistances (Ω)
    pub rct_j: Vec<FloatValue>,
    /// Parallel combination of `rct_j` (Ω)
    pub rct: FloatValue,
}

/// MSMR electrode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsmrElectrode {
    galleries: Vec<Gallery>,
    #[serde(skip, default)]
    solver: RootFinder,
}

impl MsmrElectrode {
    /// Build an electrode, checking the gallery parameters
    ///
    /// Every gallery needs a finite standard potential, positive capacity share,
    /// ideality factor and rate constant, and a symmetry factor in (0, 1). The
    /// capacity shares must sum to one.
    pub fn new(galleries: Vec<Gallery>) -> LMBResult<Self> {
        if galleries.is_empty() {
            return Err(LMBError::MissingParameter {
                region: "pos".to_string(),
                parameter: "galleries".to_string(),
            });
        }

        for (j, g) in galleries.iter().enumerate() {
            let invalid = |name: &str, reason: &str| LMBError::InvalidParameter {
                parameter: format!("pos.galleries[{j}].{name}"),
                reason: reason.to_string(),
            };
            if !g.u0.is_finite() {
                return Err(invalid("u0", "must be finite"));
            }
            if !(g.x.is_finite() && g.x > 0.0) {
                return Err(invalid("x", "must be positive"));
            }
            if !(g.omega.is_finite() && g.omega > 0.0) {
                return Err(invalid("omega", "must be positive"));
            }
            if !(g.k0.is_finite() && g.k0 > 0.0) {
                return Err(invalid("k0", "must be positive"));
            }
            if !(g.alpha > 0.0 && g.alpha < 1.0) {
                return Err(invalid("alpha", "must lie strictly between 0 and 1"));
            }
        }

        let total: FloatValue = galleries.iter().map(|g| g.x).sum();
        if (total - 1.0).abs() > CAPACITY_TOLERANCE {
            return Err(LMBError::InvalidParameter {
                parameter: "pos.galleries[*].x".to_string(),
                reason: format!("capacity shares must sum to 1, got {total}"),
            });
        }

        Ok(Self {
            galleries,
            solver: RootFinder::default(),
        })
    }

    /// Electrode described by the positive region of a resolved parameter set
    pub fn from_resolved(parameters: &ResolvedParameters) -> LMBResult<Self> {
        Self::new(parameters.pos.galleries.clone())
    }

    /// Replace the root finder used for open-circuit potentials
    pub fn with_solver(mut self, solver: RootFinder) -> Self {
        self.solver = solver;
        self
    }

    pub fn n_galleries(&self) -> usize {
        self.galleries.len()
    }

    /// Occupancy and vacancy of gallery `g` at `potential`
    ///
    /// The vacancy $X_j - x_j$ is computed directly to avoid cancellation when the
    /// gallery is nearly full.
    fn occupancy(g: &Gallery, potential: FloatValue, f: FloatValue) -> (FloatValue, FloatValue) {
        let a = f * (potential - g.u0) / g.omega;
        (g.x / (1.0 + a.exp()), g.x / (1.0 + (-a).exp()))
    }

    /// Gallery occupancies $x_j$ at `potential` (V)
    pub fn partial_lithiation(
        &self,
        potential: FloatValue,
        temperature: FloatValue,
    ) -> Vec<FloatValue> {
        let f = inverse_thermal_voltage(temperature);
        self.galleries
            .iter()
            .map(|g| Self::occupancy(g, potential, f).0)
            .collect()
    }

    /// Electrode lithiation $\theta(U)$ at `potential` (V)
    pub fn lithiation(&self, potential: FloatValue, temperature: FloatValue) -> FloatValue {
        self.lithiation_and_slope(potential, temperature).0
    }

    /// $d\theta/dU$ at `potential`, always non-positive
    pub fn lithiation_slope(&self, potential: FloatValue, temperature: FloatValue) -> FloatValue {
        self.lithiation_and_slope(potential, temperature).1
    }

    /// $dU/d\theta$ at `potential`
    ///
    /// Unbounded (negative infinity) where the electrode is empty or full.
    pub fn ocp_slope(&self, potential: FloatValue, temperature: FloatValue) -> FloatValue {
        1.0 / self.lithiation_slope(potential, temperature)
    }

    fn lithiation_and_slope(
        &self,
        potential: FloatValue,
        temperature: FloatValue,
    ) -> (FloatValue, FloatValue) {
        let f = inverse_thermal_voltage(temperature);
        self.galleries
            .iter()
            .fold((0.0, -0.0), |(theta, slope), g| {
                let (x, vacancy) = Self::occupancy(g, potential, f);
                (theta + x, slope - f / g.omega * x * vacancy / g.x)
            })
    }

    /// Range of potentials in which open-circuit potentials are searched
    pub fn potential_window(&self, temperature: FloatValue) -> (FloatValue, FloatValue) {
        let omega_max = self
            .galleries
            .iter()
            .map(|g| g.omega)
            .fold(0.0, FloatValue::max);
        let margin = WINDOW_WIDTH * omega_max * thermal_voltage(temperature);
        let u_min = self
            .galleries
            .iter()
            .map(|g| g.u0)
            .fold(FloatValue::INFINITY, FloatValue::min);
        let u_max = self
            .galleries
            .iter()
            .map(|g| g.u0)
            .fold(FloatValue::NEG_INFINITY, FloatValue::max);
        (u_min - margin, u_max + margin)
    }

    /// Bracket for the open-circuit potential at lithiation `theta` in (0, 1)
    ///
    /// [`Self::potential_window`], widened where needed so that the lithiation
    /// is at most `theta` at the upper end and at least `theta` at the lower
    /// end. Uses $x_j \le X_j e^{-a_j}$ and $X_j - x_j \le X_j e^{a_j}$ with
    /// $a_j = f (U - U^0_j)/\omega_j$.
    pub fn ocp_bracket(&self, theta: FloatValue, temperature: FloatValue) -> (FloatValue, FloatValue) {
        let (mut lower, mut upper) = self.potential_window(temperature);
        let vt = thermal_voltage(temperature);
        let n = self.galleries.len() as FloatValue;
        let capacity: FloatValue = self.galleries.iter().map(|g| g.x).sum();

        for g in &self.galleries {
            let above = g.u0 + g.omega * vt * (n * g.x / theta).ln();
            if above.is_finite() {
                upper = upper.max(above);
            }
            let below = g.u0 + g.omega * vt * ((capacity - theta) / (n * g.x)).ln();
            if below.is_finite() {
                lower = lower.min(below);
            }
        }
        (lower, upper)
    }

    /// Reject a lithiation outside $[0, 1]$ at setpoint `index`
    pub fn check_lithiation(
        &self,
        index: usize,
        theta: FloatValue,
        temperature: FloatValue,
    ) -> LMBResult<()> {
        if (0.0..=1.0).contains(&theta) {
            return Ok(());
        }
        let (lower, upper) = self.potential_window(temperature);
        Err(LMBError::NoBracket {
            index,
            target: theta,
            lower,
            upper,
        })
    }

    /// Open-circuit potential at lithiation `theta`
    pub fn ocp(&self, theta: FloatValue, temperature: FloatValue) -> LMBResult<FloatValue> {
        self.solve_ocp(0, theta, temperature)
    }

    /// Open-circuit potentials for a vector of lithiations
    ///
    /// Each point is an independent root find and the points are solved in
    /// parallel. If several points fail, the error for the lowest index is
    /// returned.
    pub fn ocp_vector(
        &self,
        thetas: &[FloatValue],
        temperature: FloatValue,
    ) -> LMBResult<Vec<FloatValue>> {
        let results: Vec<LMBResult<FloatValue>> = thetas
            .par_iter()
            .enumerate()
            .map(|(index, &theta)| self.solve_ocp(index, theta, temperature))
            .collect();
        results.into_iter().collect()
    }

    /// Root find for one lithiation point
    ///
    /// Lithiations of exactly 0 and 1 map to $+\infty$ and $-\infty$, the limits
    /// of the occupancy functions. Anything outside $[0, 1]$, or too close to
    /// the ends to be bracketed by [`Self::ocp_bracket`], is an error.
    fn solve_ocp(
        &self,
        index: usize,
        theta: FloatValue,
        temperature: FloatValue,
    ) -> LMBResult<FloatValue> {
        self.check_lithiation(index, theta, temperature)?;
        if theta == 0.0 {
            return Ok(FloatValue::INFINITY);
        }
        if theta == 1.0 {
            return Ok(FloatValue::NEG_INFINITY);
        }

        let (lower, upper) = self.ocp_bracket(theta, temperature);
        let no_bracket = || LMBError::NoBracket {
            index,
            target: theta,
            lower,
            upper,
        };

        let residual = |u: FloatValue| {
            let (lithiation, slope) = self.lithiation_and_slope(u, temperature);
            (lithiation - theta, slope)
        };

        match self.solver.solve(residual, lower, upper) {
            Ok(root) => {
                trace!(
                    "OCP at theta={theta} converged to {} V in {} iterations",
                    root.value,
                    root.iterations
                );
                if root.iterations > self.solver.max_iterations / 2 {
                    warn!(
                        "OCP root find for setpoint {index} needed {} of {} iterations",
                        root.iterations, self.solver.max_iterations
                    );
                }
                Ok(root.value)
            }
            Err(RootFindingError::NoBracket { .. }) | Err(RootFindingError::NonFinite { .. }) => {
                Err(no_bracket())
            }
            Err(RootFindingError::MaxIterations {
                iterations,
                estimate,
            }) => Err(LMBError::NotConverged {
                index,
                iterations,
                estimate,
            }),
        }
    }

    /// Charge-transfer resistances at equilibrium potential `potential`
    ///
    /// At $U = \pm\infty$ every exchange current vanishes and every resistance is
    /// $+\infty$.
    pub fn charge_transfer(&self, potential: FloatValue, temperature: FloatValue) -> ChargeTransfer {
        let f = inverse_thermal_voltage(temperature);
        let vt = thermal_voltage(temperature);

        let n = self.galleries.len();
        let mut partial_lithiation = Vec::with_capacity(n);
        let mut exchange_current = Vec::with_capacity(n);
        let mut rct_j = Vec::with_capacity(n);

        for g in &self.galleries {
            let (x, vacancy) = Self::occupancy(g, potential, f);
            let i0 = g.k0 * x.powf(g.omega * g.alpha) * vacancy.powf(g.omega * (1.0 - g.alpha));
            partial_lithiation.push(x);
            exchange_current.push(i0);
            rct_j.push(vt / i0);
        }

        let conductance: FloatValue = rct_j.iter().map(|r| 1.0 / r).sum();
        ChargeTransfer {
            partial_lithiation,
            exchange_current,
            rct_j,
            rct: 1.0 / conductance,
        }
    }
}
