//! Baker-Verbrugge perturbation resistance
//!
//! The reduced-order response of the cell to a slowly varying current is a
//! resistance per lithiation setpoint
//!
//! $$ R = R_0 + R_{ct,p}(\theta) + R_{diff}(\theta) $$
//!
//! where $R_0$ is the series resistance of the cell, $R_{ct,p}$ the MSMR
//! charge-transfer resistance of the positive electrode and
//!
//! $$ R_{diff}(\theta) = \frac{|\theta_{100} - \theta_0|\, V_T}{15 \cdot 3600\, Q\, D_s\, \theta(1 - \theta)} $$
//!
//! the solid-diffusion resistance of an ideal intercalation particle.
//! $R_{diff}$ is singular at $\theta \in \{0, 1\}$ and those entries are
//! returned as $+\infty$.
//!
//! # Reference
//!
//! Baker, D. R. and Verbrugge, M. W. (2012) Multi-species, multi-reaction model
//! for porous intercalation electrodes: Part I. J. Electrochem. Soc. 159, A1341.

use crate::msmr::{ChargeTransfer, MsmrElectrode};
use lmbtf_core::constants::{thermal_voltage, DEFAULT_TEMPERATURE, SECONDS_PER_HOUR};
use lmbtf_core::errors::{LMBError, LMBResult};
use lmbtf_core::parameters::{CellModel, ResolvedParameters};
use lmbtf_core::resolve::resolve_at_temperature;
use lmbtf_core::utils::column::{as_column, IntoColumn};
use lmbtf_core::FloatValue;
use log::debug;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Options of [`compute_perturbation_resistance`]
///
/// Unknown option names are rejected when deserialising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PerturbationOptions {
    /// Evaluation temperature
    /// unit: K
    pub temperature: FloatValue,
    /// Open-circuit potentials already computed at the requested lithiations
    ///
    /// Used as-is. Callers must drop the cache when the galleries change.
    #[serde(alias = "ocpData")]
    pub ocp: Option<Vec<FloatValue>>,
    /// Also return the per-gallery charge-transfer resistances
    #[serde(alias = "computeRctj")]
    pub compute_rctj: bool,
}

impl Default for PerturbationOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            ocp: None,
            compute_rctj: false,
        }
    }
}

impl PerturbationOptions {
    /// Check the options against a lithiation vector of length `n_points`
    pub fn validate(&self, n_points: usize) -> LMBResult<()> {
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(LMBError::InvalidOption {
                option: "temperature".to_string(),
                reason: format!(
                    "must be a finite absolute temperature in K, got {}",
                    self.temperature
                ),
            });
        }
        if let Some(ocp) = &self.ocp {
            if ocp.len() != n_points {
                return Err(LMBError::InvalidOption {
                    option: "ocp".to_string(),
                    reason: format!(
                        "expected {n_points} potentials to match the lithiations, got {}",
                        ocp.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Components of the perturbation resistance, each an `n × 1` column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationParts {
    /// Series resistance
    pub r0: Array2<FloatValue>,
    /// Lithium-metal charge-transfer resistance, already part of an assembled `r0`
    pub rct_neg: Array2<FloatValue>,
    /// Positive-electrode charge-transfer resistance
    pub rct_pos: Array2<FloatValue>,
    /// Solid-diffusion resistance
    pub rdiff: Array2<FloatValue>,
    /// Per-gallery charge-transfer resistances, `n × J`, when requested
    pub rct_j: Option<Array2<FloatValue>>,
}

/// Perturbation resistance at a set of lithiations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationResistance {
    /// $R_0 + R_{ct,p} + R_{diff}$ as an `n × 1` column
    pub total: Array2<FloatValue>,
    pub parts: PerturbationParts,
    /// Open-circuit potential at each lithiation as an `n × 1` column
    pub ocp: Array2<FloatValue>,
}

/// Solid-diffusion resistance at positive-electrode lithiation `theta`
pub fn diffusion_resistance(
    parameters: &ResolvedParameters,
    theta: FloatValue,
    temperature: FloatValue,
) -> FloatValue {
    parameters.stoichiometry_window() * thermal_voltage(temperature)
        / (15.0
            * SECONDS_PER_HOUR
            * parameters.constants.q
            * parameters.pos.dsref
            * theta
            * (1.0 - theta))
}

/// Perturbation resistance of `model` at each positive-electrode lithiation
///
/// `lithiation` may be a slice, a `Vec`, a one-dimensional array, or a `1 × n`
/// or `n × 1` matrix; every returned vector is an `n × 1` column.
pub fn compute_perturbation_resistance(
    model: &CellModel,
    lithiation: impl IntoColumn,
    options: &PerturbationOptions,
) -> LMBResult<PerturbationResistance> {
    let theta = lithiation.into_column()?;
    options.validate(theta.len())?;

    let temperature = options.temperature;
    let parameters = resolve_at_temperature(model, temperature)?;
    let electrode = MsmrElectrode::from_resolved(&parameters)?;
    for (index, &t) in theta.iter().enumerate() {
        electrode.check_lithiation(index, t, temperature)?;
    }

    let ocp: Vec<FloatValue> = match &options.ocp {
        Some(cached) => cached.clone(),
        None => electrode.ocp_vector(&theta.to_vec(), temperature)?,
    };

    let charge_transfer: Vec<ChargeTransfer> = ocp
        .par_iter()
        .map(|&u| electrode.charge_transfer(u, temperature))
        .collect();

    let n = theta.len();
    let r0 = Array1::from_elem(n, parameters.series_resistance(temperature));
    let rct_neg = Array1::from_elem(n, parameters.negative_charge_transfer_resistance(temperature));
    let rct_pos: Array1<FloatValue> = charge_transfer.iter().map(|ct| ct.rct).collect();
    let rdiff = theta.mapv(|t| diffusion_resistance(&parameters, t, temperature));
    let total = &r0 + &rct_pos + &rdiff;

    let rct_j = options.compute_rctj.then(|| {
        Array2::from_shape_fn((n, electrode.n_galleries()), |(i, j)| {
            charge_transfer[i].rct_j[j]
        })
    });

    debug!(
        "Perturbation resistance at {n} lithiations, {} K, R0 = {} Ω",
        temperature, r0.first().copied().unwrap_or(FloatValue::NAN)
    );

    Ok(PerturbationResistance {
        total: as_column(total),
        parts: PerturbationParts {
            r0: as_column(r0),
            rct_neg: as_column(rct_neg),
            rct_pos: as_column(rct_pos),
            rdiff: as_column(rdiff),
            rct_j,
        },
        ocp: as_column(Array1::from(ocp)),
    })
}
