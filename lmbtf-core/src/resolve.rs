//! Resolution of a parameter model at one temperature
//!
//! [`resolve_at_temperature`] turns a [`CellModel`] into a
//! [`ResolvedParameters`] set by evaluating every slot's temperature function.
//! This is the single point where models become flat values; everything
//! downstream consumes [`ResolvedParameters`].
//!
//! The resolved set also exposes the lumped quantities shared by the
//! transfer-function and perturbation-resistance calculations.

use crate::constants::thermal_voltage;
use crate::errors::{LMBError, LMBResult};
use crate::parameters::{CellModel, ElectrolyteLayers, ResolvedParameters, TemperatureFunction};
use crate::FloatValue;
use log::debug;

/// Resolve every parameter of `model` at `temperature` (K)
///
/// The reference temperature `const.tref` must be a `fix` parameter. The result
/// depends only on the inputs, so repeated calls return identical values.
pub fn resolve_at_temperature(
    model: &CellModel,
    temperature: FloatValue,
) -> LMBResult<ResolvedParameters> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(LMBError::InvalidOption {
            option: "temperature".to_string(),
            reason: format!("must be a finite absolute temperature in K, got {temperature}"),
        });
    }

    let reference_temperature = match &model.constants.tref {
        TemperatureFunction::Fix { value } if value.is_finite() && *value > 0.0 => *value,
        TemperatureFunction::Fix { value } => {
            return Err(LMBError::InvalidParameter {
                parameter: "const.tref".to_string(),
                reason: format!("must be a positive temperature in K, got {value}"),
            })
        }
        other => {
            return Err(LMBError::InvalidParameter {
                parameter: "const.tref".to_string(),
                reason: format!("must be 'fix', got '{}'", other.kind()),
            })
        }
    };

    debug!("Resolving cell model at {temperature} K (reference {reference_temperature} K)");
    model.try_map(|name, function| function.evaluate(name, temperature, reference_temperature))
}

impl ResolvedParameters {
    /// Resistance of the electrolyte between the lithium-metal interface and the
    /// positive electrode
    ///
    /// For separate layers this is $1/\kappa_{dll} + 1/\kappa_{sep}$, for an
    /// effective layer $1/\kappa_{eff}$.
    pub fn electrolyte_resistance(&self) -> FloatValue {
        match &self.electrolyte {
            ElectrolyteLayers::Separate { dll, sep } => 1.0 / dll.kappa + 1.0 / sep.kappa,
            ElectrolyteLayers::Effective(eff) => 1.0 / eff.kappa,
        }
    }

    /// Charge-transfer resistance of the lithium-metal interface
    pub fn negative_charge_transfer_resistance(&self, temperature: FloatValue) -> FloatValue {
        thermal_voltage(temperature) / self.neg.k0
    }

    /// Lumped electrolyte resistance across the positive electrode
    pub fn positive_electrolyte_resistance(&self) -> FloatValue {
        1.0 / self.pos.kappa
    }

    /// Lumped solid-phase resistance across the positive electrode
    pub fn positive_solid_resistance(&self) -> FloatValue {
        1.0 / self.pos.sigma
    }

    /// Width of the positive-electrode stoichiometry window $|\theta_{100} - \theta_0|$
    pub fn stoichiometry_window(&self) -> FloatValue {
        (self.pos.theta100 - self.pos.theta0).abs()
    }

    /// Capacity of the positive electrode per unit stoichiometry
    /// unit: Ah
    pub fn positive_capacity(&self) -> FloatValue {
        self.constants.q / self.stoichiometry_window()
    }

    /// Positive-electrode stoichiometry at a state of charge
    pub fn positive_stoichiometry(&self, soc: FloatValue) -> FloatValue {
        self.pos.theta0 + soc * (self.pos.theta100 - self.pos.theta0)
    }

    /// Series resistance of the cell
    ///
    /// Uses `const.r0` when supplied. Otherwise the sum of the lithium-metal film
    /// and charge-transfer resistances, the electrolyte layers, the positive film
    /// and the ohmic part of the porous electrode:
    ///
    /// $$ R_0 = R_{f,n} + R_{ct,n} + R_{el} + R_{f,p} + \frac{R_{e,p} + R_{s,p}}{3} $$
    pub fn series_resistance(&self, temperature: FloatValue) -> FloatValue {
        match self.constants.r0 {
            Some(r0) => r0,
            None => {
                self.neg.rf
                    + self.negative_charge_transfer_resistance(temperature)
                    + self.electrolyte_resistance()
                    + self.pos.rf
                    + (self.positive_electrolyte_resistance() + self.positive_solid_resistance())
                        / 3.0
            }
        }
    }
}
