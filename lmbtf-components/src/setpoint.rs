//! Operating points of a cell
//!
//! A [`Setpoint`] is a cell model resolved at one state of charge and one
//! temperature, together with the MSMR equilibrium of the positive electrode
//! at that state of charge. Transfer functions only ever see setpoints.

use crate::msmr::{ChargeTransfer, MsmrElectrode};
use lmbtf_core::constants::thermal_voltage;
use lmbtf_core::errors::{LMBError, LMBResult};
use lmbtf_core::parameters::{CellModel, ResolvedParameters};
use lmbtf_core::resolve::resolve_at_temperature;
use lmbtf_core::FloatValue;
use log::debug;
use serde::{Deserialize, Serialize};

/// Cell state at one (SOC, temperature) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// State of charge in [0, 1]
    pub soc: FloatValue,
    /// unit: K
    pub temperature: FloatValue,
    pub parameters: ResolvedParameters,
    /// Positive-electrode stoichiometry at `soc`
    pub theta: FloatValue,
    /// Open-circuit potential of the positive electrode at `theta`
    /// unit: V
    pub ocp: FloatValue,
    /// $dU/d\theta$ at `theta`
    /// unit: V
    pub ocp_slope: FloatValue,
    pub charge_transfer: ChargeTransfer,
    /// Charge-transfer resistance of the lithium-metal interface
    /// unit: Ω
    pub rct_neg: FloatValue,
}

impl Setpoint {
    /// Resolve `model` at `temperature` and evaluate it at `soc`
    pub fn evaluate(model: &CellModel, soc: FloatValue, temperature: FloatValue) -> LMBResult<Self> {
        let parameters = resolve_at_temperature(model, temperature)?;
        Self::from_resolved(parameters, soc, temperature, None)
    }

    /// Evaluate an already resolved parameter set at `soc`
    ///
    /// `parameters` must have been resolved at `temperature`. When `cached_ocp`
    /// is given it is taken as the open-circuit potential at `soc` and the root
    /// find is skipped. The cache is trusted as-is.
    pub fn from_resolved(
        parameters: ResolvedParameters,
        soc: FloatValue,
        temperature: FloatValue,
        cached_ocp: Option<FloatValue>,
    ) -> LMBResult<Self> {
        if !(0.0..=1.0).contains(&soc) {
            return Err(LMBError::InvalidOption {
                option: "soc".to_string(),
                reason: format!("must lie in [0, 1], got {soc}"),
            });
        }
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(LMBError::InvalidOption {
                option: "temperature".to_string(),
                reason: format!("must be a finite absolute temperature in K, got {temperature}"),
            });
        }

        let electrode = MsmrElectrode::from_resolved(&parameters)?;
        let theta = parameters.positive_stoichiometry(soc);
        let ocp = match cached_ocp {
            Some(ocp) => ocp,
            None => electrode.ocp(theta, temperature)?,
        };
        let ocp_slope = electrode.ocp_slope(ocp, temperature);
        let charge_transfer = electrode.charge_transfer(ocp, temperature);
        let rct_neg = parameters.negative_charge_transfer_resistance(temperature);

        debug!(
            "Setpoint soc={soc} T={temperature} K: theta={theta}, U={ocp} V, Rct_p={} Ω",
            charge_transfer.rct
        );

        Ok(Self {
            soc,
            temperature,
            parameters,
            theta,
            ocp,
            ocp_slope,
            charge_transfer,
            rct_neg,
        })
    }

    /// unit: V
    pub fn thermal_voltage(&self) -> FloatValue {
        thermal_voltage(self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MODEL: &str = r#"
[const]
tref = 298.15
q = 0.005

[neg]
k0 = 2.0
rf = 0.2
cdl = 5e-6
ndl = 1.0

[eff]
kappa = 4.0

[pos]
sigma = 50.0
kappa = 2.5
dsref = 2e-3
rf = 0.05
cdl = 1e-3
ndl = 0.95
theta0 = 0.85
theta100 = 0.25

[[pos.galleries]]
u0 = 3.9
x = 1.0
omega = 1.2
k0 = 0.7
"#;

    #[test]
    fn test_evaluate() {
        let model = CellModel::from_toml_str(MODEL).unwrap();
        let sp = Setpoint::evaluate(&model, 0.5, 298.15).unwrap();
        assert_relative_eq!(sp.theta, 0.55, epsilon = 1e-15);
        let electrode = MsmrElectrode::from_resolved(&sp.parameters).unwrap();
        assert_relative_eq!(electrode.lithiation(sp.ocp, 298.15), 0.55, max_relative = 1e-10);
        assert!(sp.ocp_slope < 0.0);
        assert_relative_eq!(sp.rct_neg, thermal_voltage(298.15) / 2.0);
    }

    #[test]
    fn test_cached_ocp_is_used() {
        let model = CellModel::from_toml_str(MODEL).unwrap();
        let resolved = resolve_at_temperature(&model, 298.15).unwrap();
        let sp = Setpoint::from_resolved(resolved, 0.5, 298.15, Some(3.7)).unwrap();
        assert_eq!(sp.ocp, 3.7);
    }

    #[test]
    fn test_soc_out_of_range() {
        let model = CellModel::from_toml_str(MODEL).unwrap();
        for soc in [-0.1, 1.5, FloatValue::NAN] {
            let err = Setpoint::evaluate(&model, soc, 298.15).unwrap_err();
            assert!(matches!(err, LMBError::InvalidOption { option, .. } if option == "soc"));
        }
    }
}
