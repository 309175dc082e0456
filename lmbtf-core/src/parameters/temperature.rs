//! Temperature dependence of a single parameter
//!
//! Every parameter slot in a cell model carries one of three temperature
//! functions:
//!
//! - `fix`: the value does not depend on temperature
//! - `lut`: a lookup table over a discrete temperature axis. The requested
//!   temperature must be one of the tabulated temperatures; there is no
//!   interpolation between entries.
//! - `Eact`: an Arrhenius relation around the model reference temperature
//!
//! $$ p(T) = p_{ref} \exp\left(\frac{E_a}{R}\left(\frac{1}{T_{ref}} - \frac{1}{T}\right)\right) $$
//!
//! The activation energy may be negative for quantities that fall with
//! rising temperature.

use crate::constants::GAS_CONSTANT;
use crate::errors::{LMBError, LMBResult};
use crate::FloatValue;
use is_close::is_close;
use serde::{Deserialize, Serialize};

/// Temperature function attached to a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TemperatureFunction {
    /// Temperature-invariant value
    #[serde(rename = "fix")]
    Fix { value: FloatValue },
    /// Values tabulated against temperature (K)
    #[serde(rename = "lut")]
    Lut {
        temperatures: Vec<FloatValue>,
        values: Vec<FloatValue>,
    },
    /// Arrhenius relation
    ///
    /// `value` is the value at the model reference temperature and
    /// `activation_energy` is in J/mol.
    #[serde(rename = "Eact")]
    Eact {
        value: FloatValue,
        activation_energy: FloatValue,
    },
}

impl TemperatureFunction {
    /// Names of the recognised kinds, as they appear in parameter documents
    pub const KINDS: [&'static str; 3] = ["fix", "lut", "Eact"];

    pub fn fixed(value: FloatValue) -> Self {
        Self::Fix { value }
    }

    pub fn lookup(temperatures: Vec<FloatValue>, values: Vec<FloatValue>) -> Self {
        Self::Lut {
            temperatures,
            values,
        }
    }

    pub fn arrhenius(value: FloatValue, activation_energy: FloatValue) -> Self {
        Self::Eact {
            value,
            activation_energy,
        }
    }

    /// Kind name used in parameter documents
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fix { .. } => "fix",
            Self::Lut { .. } => "lut",
            Self::Eact { .. } => "Eact",
        }
    }

    /// Check the internal consistency of the function
    ///
    /// Lookup tables must be non-empty with one value per tabulated temperature.
    pub fn validate(&self, parameter: &str) -> LMBResult<()> {
        if let Self::Lut {
            temperatures,
            values,
        } = self
        {
            if temperatures.is_empty() {
                return Err(LMBError::InvalidParameter {
                    parameter: parameter.to_string(),
                    reason: "lookup table has no entries".to_string(),
                });
            }
            if temperatures.len() != values.len() {
                return Err(LMBError::InvalidParameter {
                    parameter: parameter.to_string(),
                    reason: format!(
                        "lookup table has {} temperatures but {} values",
                        temperatures.len(),
                        values.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Evaluate the parameter at `temperature`
    ///
    /// `reference_temperature` is only used by the Arrhenius kind. `parameter` is
    /// the qualified parameter name reported in errors.
    pub fn evaluate(
        &self,
        parameter: &str,
        temperature: FloatValue,
        reference_temperature: FloatValue,
    ) -> LMBResult<FloatValue> {
        match self {
            Self::Fix { value } => Ok(*value),
            Self::Lut {
                temperatures,
                values,
            } => {
                self.validate(parameter)?;
                temperatures
                    .iter()
                    .position(|&t| is_close!(t, temperature))
                    .map(|index| values[index])
                    .ok_or_else(|| LMBError::TemperatureNotTabulated {
                        parameter: parameter.to_string(),
                        temperature,
                        available: format!("{:?}", temperatures),
                    })
            }
            Self::Eact {
                value,
                activation_energy,
            } => {
                let eact_over_r = activation_energy / GAS_CONSTANT;
                Ok(value * (eact_over_r * (1.0 / reference_temperature - 1.0 / temperature)).exp())
            }
        }
    }
}

impl From<FloatValue> for TemperatureFunction {
    fn from(value: FloatValue) -> Self {
        Self::fixed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_TEMPERATURE, ZERO_CELSIUS};
    use approx::assert_relative_eq;

    #[test]
    fn test_fix_ignores_temperature() {
        let f = TemperatureFunction::fixed(1.234);
        for t in [250.0, 298.15, 333.15, 400.0] {
            assert_eq!(f.evaluate("p", t, DEFAULT_TEMPERATURE).unwrap(), 1.234);
        }
    }

    #[test]
    fn test_eact_identity_at_reference_temperature() {
        let f = TemperatureFunction::arrhenius(0.75, 35_000.0);
        let v = f.evaluate("p", 310.0, 310.0).unwrap();
        assert_eq!(v, 0.75);
    }

    #[test]
    fn test_eact_direction() {
        let tref = DEFAULT_TEMPERATURE;
        let rising = TemperatureFunction::arrhenius(1.0, 30_000.0);
        let falling = TemperatureFunction::arrhenius(1.0, -30_000.0);

        assert!(rising.evaluate("p", tref + 10.0, tref).unwrap() > 1.0);
        assert!(rising.evaluate("p", tref - 10.0, tref).unwrap() < 1.0);
        assert!(falling.evaluate("p", tref + 10.0, tref).unwrap() < 1.0);
    }

    #[test]
    fn test_eact_matches_closed_form() {
        let tref = 298.15;
        let t = 318.15;
        let ea = 42_000.0;
        let f = TemperatureFunction::arrhenius(2.0, ea);
        let expected = 2.0 * (ea / GAS_CONSTANT * (1.0 / tref - 1.0 / t)).exp();
        assert_relative_eq!(f.evaluate("p", t, tref).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_lut_exact_match() {
        let f = TemperatureFunction::lookup(vec![273.15, 298.15, 318.15], vec![1.0, 2.0, 3.0]);
        assert_eq!(f.evaluate("p", 318.15, 298.15).unwrap(), 3.0);
        // Rounding in 273.15 + 25 still selects the tabulated entry
        assert_eq!(f.evaluate("p", ZERO_CELSIUS + 25.0, 298.15).unwrap(), 2.0);
    }

    #[test]
    fn test_lut_mismatch_is_an_error() {
        let f = TemperatureFunction::lookup(vec![273.15, 298.15], vec![1.0, 2.0]);
        let err = f.evaluate("pos.dsref", 300.0, 298.15).unwrap_err();
        match err {
            LMBError::TemperatureNotTabulated { parameter, .. } => {
                assert_eq!(parameter, "pos.dsref")
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_lut_length_mismatch() {
        let f = TemperatureFunction::lookup(vec![273.15, 298.15], vec![1.0]);
        assert!(matches!(
            f.validate("p"),
            Err(LMBError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_tagged_serialization() {
        let json = r#"{"kind": "Eact", "value": 1.5, "activation_energy": 20000.0}"#;
        let f: TemperatureFunction = serde_json::from_str(json).unwrap();
        assert_eq!(f, TemperatureFunction::arrhenius(1.5, 20000.0));
        assert_eq!(f.kind(), "Eact");

        let bad = r#"{"kind": "poly", "value": 1.5}"#;
        assert!(serde_json::from_str::<TemperatureFunction>(bad).is_err());
    }
}
