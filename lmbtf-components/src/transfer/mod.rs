//! Transfer functions of a lithium-metal cell
//!
//! The cell is described on a normalised coordinate $x \in [0, 3]$:
//!
//! | range | region |
//! |-------|--------|
//! | $x = 0$ | lithium-metal interface |
//! | $[0, 1]$ | electrolyte layer next to the lithium metal (`dll`) |
//! | $[1, 2]$ | separator (`sep`) |
//! | $[2, 3]$ | porous positive electrode, local coordinate $z = x - 2$ |
//!
//! A half cell lumps `dll` and `sep` into one effective layer (`eff`) on
//! $[0, 2]$; only the electrolyte resistance changes.
//!
//! Each [`TransferFunction`] is the ratio of a linearised cell variable to the
//! applied current, $V(s)/I_{app}(s)$, with discharge current positive. In the
//! positive electrode the interface admittance is
//!
//! $$ Y_{se} = \frac{Y_{par}}{1 + R_f Y_{par}}, \quad
//!    Y_{par} = \frac{Y_d}{1 + R_{ct} Y_d} + C_{dl} s^{n_{dl}}, \quad
//!    Y_d = \frac{3 \cdot 3600\, Q_p D_s}{-dU/d\theta} (\beta\coth\beta - 1) $$
//!
//! with $\beta = \sqrt{s/D_s}$, and the porous-electrode solution depends on
//! $\nu = \sqrt{(R_e + R_s) Y_{se}}$. The reaction current density is
//!
//! $$ i_{fdl}(z) = \frac{\nu\left[R_e \cosh(\nu(1 - z)) + R_s \cosh(\nu z)\right]}{(R_e + R_s)\sinh\nu} $$
//!
//! and the other variables follow from it. All expressions are evaluated in
//! forms that stay finite at $s = 0$ and for large $|s|$ (see the `kernel`
//! module), so the DC limit is available directly. At $s = 0$ the particles
//! cannot sustain a steady current, so `Phise`, `Phis`, `Thetass` and the cell
//! impedance take their real-axis limits: infinite values with a zero
//! imaginary part, never NaN.

mod kernel;
mod response;

use crate::setpoint::Setpoint;
use lmbtf_core::errors::{LMBError, LMBResult};
use lmbtf_core::FloatValue;
use ndarray::{Array1, Array2};
use num::complex::Complex64;
use response::{CellResponse, Location};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Position of the lithium-metal interface
pub const NEGATIVE_INTERFACE: FloatValue = 0.0;
/// Start of the positive electrode
pub const ELECTRODE_START: FloatValue = 2.0;
/// Positive current collector
pub const CELL_END: FloatValue = 3.0;

/// Laplace variable $s = j 2\pi f$ for each frequency in Hz
pub fn laplace_frequencies(frequencies: &[FloatValue]) -> Vec<Complex64> {
    frequencies
        .iter()
        .map(|f| Complex64::new(0.0, 2.0 * PI * f))
        .collect()
}

/// A linearised cell variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFunction {
    /// Solid minus electrolyte potential across an interface
    Phise,
    /// Electrolyte potential
    Phie,
    /// Solid potential
    Phis,
    /// Double-layer plus faradaic current density
    Ifdl,
    /// Surface stoichiometry of the positive-electrode particles
    Thetass,
}

impl TransferFunction {
    pub const ALL: [TransferFunction; 5] = [
        Self::Phise,
        Self::Phie,
        Self::Phis,
        Self::Ifdl,
        Self::Thetass,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Phise => "phise",
            Self::Phie => "phie",
            Self::Phis => "phis",
            Self::Ifdl => "ifdl",
            Self::Thetass => "thetass",
        }
    }

    /// Map a normalised position to a cell location, checking that the
    /// variable is defined there
    fn locate(&self, position: FloatValue) -> LMBResult<Location> {
        let invalid = |reason: &str| LMBError::InvalidPosition {
            variable: self.name().to_string(),
            position,
            reason: reason.to_string(),
        };

        if !(NEGATIVE_INTERFACE..=CELL_END).contains(&position) {
            return Err(invalid("outside the cell [0, 3]"));
        }
        let location = if position == NEGATIVE_INTERFACE {
            Location::NegativeInterface
        } else if position < ELECTRODE_START {
            Location::Electrolyte(position)
        } else {
            Location::Electrode(position - ELECTRODE_START)
        };

        match (self, location) {
            (Self::Phie, _) => Ok(location),
            (_, Location::Electrolyte(_)) => Err(invalid("no interface in an electrolyte-only layer")),
            (Self::Thetass, Location::NegativeInterface) => {
                Err(invalid("no insertion particles at the lithium-metal interface"))
            }
            _ => Ok(location),
        }
    }

    fn at(&self, response: &CellResponse, location: Location) -> Complex64 {
        match self {
            Self::Phise => response.phise(location),
            Self::Phie => response.phie(location),
            Self::Phis => response.phis(location),
            Self::Ifdl => response.ifdl(location),
            Self::Thetass => response.thetass(location),
        }
    }

    /// Evaluate at every combination of `positions` and Laplace variables `s`
    ///
    /// The result is indexed `(position, frequency)`. Every position is checked
    /// before anything is evaluated.
    pub fn evaluate(
        &self,
        setpoint: &Setpoint,
        positions: &[FloatValue],
        s: &[Complex64],
    ) -> LMBResult<Array2<Complex64>> {
        let locations = positions
            .iter()
            .map(|&x| self.locate(x))
            .collect::<LMBResult<Vec<_>>>()?;

        let mut values = Array2::<Complex64>::zeros((locations.len(), s.len()));
        for (j, &sj) in s.iter().enumerate() {
            let response = CellResponse::new(setpoint, sj);
            for (i, &location) in locations.iter().enumerate() {
                values[[i, j]] = self.at(&response, location);
            }
        }
        Ok(values)
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TransferFunction {
    type Err = LMBError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tf| tf.name() == lower)
            .ok_or_else(|| LMBError::InvalidOption {
                option: "transfer function".to_string(),
                reason: format!("unknown variable '{s}'"),
            })
    }
}

/// Impedance of the cell, $Z_{cell} = -(-\phi_{se}(0) + \phi_e(3) + \phi_{se}(3))$
pub fn cell_impedance(setpoint: &Setpoint, s: &[Complex64]) -> LMBResult<Array1<Complex64>> {
    let phise = TransferFunction::Phise.evaluate(setpoint, &[NEGATIVE_INTERFACE, CELL_END], s)?;
    let phie = TransferFunction::Phie.evaluate(setpoint, &[CELL_END], s)?;
    Ok(&phise.row(0) - &phie.row(0) - &phise.row(1))
}

#[cfg(test)]
mod tests {
    use super::response::constant_phase;
    use super::*;
    use approx::assert_relative_eq;
    use lmbtf_core::parameters::CellModel;

    fn setpoint() -> Setpoint {
        let model = CellModel::from_toml_str(include_str!("../../tests/data/full_cell.toml")).unwrap();
        Setpoint::evaluate(&model, 0.4, 298.15).unwrap()
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Phie".parse::<TransferFunction>().unwrap(), TransferFunction::Phie);
        assert_eq!("thetass".parse::<TransferFunction>().unwrap(), TransferFunction::Thetass);
        assert!("phi".parse::<TransferFunction>().is_err());
        for tf in TransferFunction::ALL {
            assert_eq!(tf.to_string().parse::<TransferFunction>().unwrap(), tf);
        }
    }

    #[test]
    fn test_positions_are_checked() {
        let sp = setpoint();
        let s = laplace_frequencies(&[1.0]);
        for (tf, x) in [
            (TransferFunction::Phie, 3.5),
            (TransferFunction::Phie, -0.1),
            (TransferFunction::Phise, 1.0),
            (TransferFunction::Ifdl, 0.5),
            (TransferFunction::Thetass, 0.0),
            (TransferFunction::Phis, FloatValue::NAN),
        ] {
            match tf.evaluate(&sp, &[2.5, x], &s) {
                Err(LMBError::InvalidPosition { variable, .. }) => assert_eq!(variable, tf.name()),
                other => panic!("{tf} at {x}: unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_shape() {
        let sp = setpoint();
        let s = laplace_frequencies(&[0.1, 1.0, 10.0, 100.0]);
        let values = TransferFunction::Phis
            .evaluate(&sp, &[0.0, 2.0, 2.5, 3.0], &s)
            .unwrap();
        assert_eq!(values.dim(), (4, 4));
    }

    #[test]
    fn test_phie_dc_limit() {
        let sp = setpoint();
        let p = &sp.parameters;
        let dc = [Complex64::new(0.0, 0.0)];
        let phie = TransferFunction::Phie.evaluate(&sp, &[0.0, 2.0, 3.0], &dc).unwrap();

        let r_el = p.electrolyte_resistance();
        let re = p.positive_electrolyte_resistance();
        assert_eq!(phie[[0, 0]], Complex64::new(0.0, 0.0));
        assert_relative_eq!(phie[[1, 0]].re, -r_el, max_relative = 1e-14);
        assert_relative_eq!(phie[[2, 0]].re, -(r_el + 0.5 * re), max_relative = 1e-14);
        assert_eq!(phie[[2, 0]].im, 0.0);
    }

    #[test]
    fn test_interface_values() {
        let sp = setpoint();
        let s = laplace_frequencies(&[3.0]);
        let ifdl = TransferFunction::Ifdl.evaluate(&sp, &[0.0], &s).unwrap();
        assert_eq!(ifdl[[0, 0]], Complex64::new(1.0, 0.0));

        // At the interface Phis is the interface impedance itself
        let phise = TransferFunction::Phise.evaluate(&sp, &[0.0], &s).unwrap();
        let phis = TransferFunction::Phis.evaluate(&sp, &[0.0], &s).unwrap();
        assert_eq!(phise, phis);
    }

    #[test]
    fn test_reaction_current_is_conserved() {
        // The reaction current across the electrode integrates to the applied current
        let sp = setpoint();
        let n = 200;
        let positions: Vec<FloatValue> = (0..=n)
            .map(|k| ELECTRODE_START + k as FloatValue / n as FloatValue)
            .collect();
        for f in [1e-3, 1.0, 1e3] {
            let ifdl = TransferFunction::Ifdl
                .evaluate(&sp, &positions, &laplace_frequencies(&[f]))
                .unwrap();
            let h = 1.0 / n as FloatValue;
            let mut total = ifdl[[0, 0]] + ifdl[[n, 0]];
            for k in 1..n {
                total += ifdl[[k, 0]] * if k % 2 == 1 { 4.0 } else { 2.0 };
            }
            total *= h / 3.0;
            assert!((total - 1.0).norm() < 1e-6, "f = {f}: {total}");
        }
    }

    #[test]
    fn test_transmission_line_impedance() {
        let sp = setpoint();
        let p = &sp.parameters;
        let frequencies = [0.05, 2.0, 400.0];
        let s = laplace_frequencies(&frequencies);
        let z = cell_impedance(&sp, &s).unwrap();

        let re = p.positive_electrolyte_resistance();
        let rs = p.positive_solid_resistance();
        let d = re + rs;
        for (j, &sj) in s.iter().enumerate() {
            let zse_neg = TransferFunction::Phise.evaluate(&sp, &[0.0], &[sj]).unwrap()[[0, 0]];
            let phise_pos = TransferFunction::Phise.evaluate(&sp, &[3.0], &[sj]).unwrap()[[0, 0]];
            let ifdl_pos = TransferFunction::Ifdl.evaluate(&sp, &[3.0], &[sj]).unwrap()[[0, 0]];
            let yse = -ifdl_pos / phise_pos;
            let nu = (d * yse).sqrt();
            let porous = re * rs / d
                + ((re * re + rs * rs) / nu.tanh() + 2.0 * re * rs / nu.sinh()) / (d * nu);
            let expected = zse_neg + p.electrolyte_resistance() + porous;
            assert!(
                (z[j] - expected).norm() < 1e-10 * expected.norm(),
                "f = {}: {} vs {}",
                frequencies[j],
                z[j],
                expected
            );
        }
    }

    #[test]
    fn test_high_frequency_is_finite() {
        let sp = setpoint();
        let s = laplace_frequencies(&[1e7]);
        for tf in TransferFunction::ALL {
            let values = tf.evaluate(&sp, &[2.0, 2.3, 3.0], &s).unwrap();
            assert!(values.iter().all(|v| v.re.is_finite() && v.im.is_finite()), "{tf}");
        }
    }

    #[test]
    fn test_dc_limit_of_every_variable() {
        let sp = setpoint();
        let dc = [Complex64::new(0.0, 0.0)];
        for tf in TransferFunction::ALL {
            let positions: &[FloatValue] = match tf {
                TransferFunction::Thetass => &[2.0, 2.5, 3.0],
                _ => &[0.0, 2.0, 2.5, 3.0],
            };
            let values = tf.evaluate(&sp, positions, &dc).unwrap();
            assert!(
                values.iter().all(|v| !v.re.is_nan() && !v.im.is_nan()),
                "{tf}: {values}"
            );
        }

        let phise = TransferFunction::Phise.evaluate(&sp, &[0.0, 2.5], &dc).unwrap();
        assert!(phise[[0, 0]].re.is_finite());
        assert_eq!(phise[[1, 0]], Complex64::new(FloatValue::NEG_INFINITY, 0.0));

        let phis = TransferFunction::Phis.evaluate(&sp, &[3.0], &dc).unwrap();
        assert_eq!(phis[[0, 0]].re, FloatValue::NEG_INFINITY);

        let thetass = TransferFunction::Thetass.evaluate(&sp, &[2.5], &dc).unwrap();
        assert_eq!(thetass[[0, 0]], Complex64::new(FloatValue::INFINITY, 0.0));

        let ifdl = TransferFunction::Ifdl.evaluate(&sp, &[2.5], &dc).unwrap();
        assert_relative_eq!(ifdl[[0, 0]].re, 1.0, max_relative = 1e-14);

        let z = cell_impedance(&sp, &dc).unwrap();
        assert_eq!(z[0].re, FloatValue::INFINITY);
        assert!(z[0].im.is_finite());
    }

    #[test]
    fn test_constant_phase() {
        assert_eq!(constant_phase(Complex64::new(0.0, 0.0), 0.8), Complex64::new(0.0, 0.0));
        let s = Complex64::new(0.0, 2.0);
        assert!((constant_phase(s, 1.0) - s).norm() < 1e-15);
    }
}
