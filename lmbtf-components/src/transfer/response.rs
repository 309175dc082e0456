//! Linear response of the cell at one Laplace frequency

use super::kernel::{coth_excess, Kernel};
use crate::setpoint::Setpoint;
use lmbtf_core::constants::SECONDS_PER_HOUR;
use lmbtf_core::parameters::ElectrolyteLayers;
use lmbtf_core::FloatValue;
use num::complex::Complex64;
use num::Zero;

/// Constant-phase element $s^n$, zero at $s = 0$
pub(crate) fn constant_phase(s: Complex64, n: FloatValue) -> Complex64 {
    if s.is_zero() {
        Complex64::zero()
    } else {
        s.powf(n)
    }
}

/// A position in the normalised cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Location {
    /// The lithium-metal interface, $x = 0$
    NegativeInterface,
    /// Inside the electrolyte-only layers, $0 < x < 2$
    Electrolyte(FloatValue),
    /// Inside the positive electrode at local coordinate $z = x - 2$
    Electrode(FloatValue),
}

/// Resistance of the electrolyte layers between $x = 0$ and `x` in $[0, 2]$
fn electrolyte_resistance_to(layers: &ElectrolyteLayers<FloatValue>, x: FloatValue) -> FloatValue {
    match layers {
        ElectrolyteLayers::Separate { dll, .. } if x <= 1.0 => x / dll.kappa,
        ElectrolyteLayers::Separate { dll, sep } => 1.0 / dll.kappa + (x - 1.0) / sep.kappa,
        ElectrolyteLayers::Effective(eff) => 0.5 * x / eff.kappa,
    }
}

/// Cell response at one value of $s$
///
/// Interface quantities (`ifdl`, `phise`, `thetass`) are only meaningful at the
/// lithium-metal interface and in the positive electrode; electrolyte-only
/// positions are rejected before a response is evaluated.
pub(crate) struct CellResponse<'a> {
    setpoint: &'a Setpoint,
    /// Lithium-metal interface impedance
    zse_neg: Complex64,
    /// Share of the diffusion admittance left after charge transfer, $1/(1 + R_{ct} Y_d)$
    faradaic_share: Complex64,
    /// Admittance of the faradaic branch in parallel with the double layer
    ypar: Complex64,
    /// `ypar` in series with the film
    yse: Complex64,
    re: FloatValue,
    rs: FloatValue,
    kernel: Kernel,
}

impl<'a> CellResponse<'a> {
    pub fn new(setpoint: &'a Setpoint, s: Complex64) -> Self {
        let p = &setpoint.parameters;

        let ydl_neg = p.neg.cdl * constant_phase(s, p.neg.ndl);
        let zse_neg = p.neg.rf + (1.0 / setpoint.rct_neg + ydl_neg).inv();

        let ds = p.pos.dsref;
        let scale = 3.0 * SECONDS_PER_HOUR * p.positive_capacity() * ds / (-setpoint.ocp_slope);
        let yd = scale * coth_excess(s / ds);

        let rct = setpoint.charge_transfer.rct;
        let faradaic_share = if rct.is_finite() {
            (1.0 + rct * yd).inv()
        } else {
            Complex64::zero()
        };
        let ypar = yd * faradaic_share + p.pos.cdl * constant_phase(s, p.pos.ndl);
        let yse = ypar / (1.0 + p.pos.rf * ypar);

        let re = p.positive_electrolyte_resistance();
        let rs = p.positive_solid_resistance();
        let kernel = Kernel::new((re + rs) * yse);

        Self {
            setpoint,
            zse_neg,
            faradaic_share,
            ypar,
            yse,
            re,
            rs,
            kernel,
        }
    }

    fn d(&self) -> FloatValue {
        self.re + self.rs
    }

    /// Double-layer plus faradaic current density, per unit applied current
    pub fn ifdl(&self, location: Location) -> Complex64 {
        match location {
            Location::NegativeInterface | Location::Electrolyte(_) => Complex64::from(1.0),
            Location::Electrode(z) => {
                (self.re * self.kernel.scaled_ratio(1.0 - z) + self.rs * self.kernel.scaled_ratio(z))
                    / self.d()
            }
        }
    }

    /// Whether the positive interface passes no current, as at $s = 0$
    ///
    /// The reaction current is then uniform and the interface potential diverges.
    fn is_blocking(&self) -> bool {
        self.ypar.is_zero()
    }

    /// Solid minus electrolyte potential across the interface
    ///
    /// Negative infinity on a blocking interface, the limit as $s \to 0^+$.
    pub fn phise(&self, location: Location) -> Complex64 {
        match location {
            Location::NegativeInterface | Location::Electrolyte(_) => self.zse_neg,
            Location::Electrode(_) if self.is_blocking() => {
                Complex64::new(FloatValue::NEG_INFINITY, 0.0)
            }
            Location::Electrode(_) => -self.ifdl(location) / self.yse,
        }
    }

    /// Electrolyte potential, referenced to the lithium-metal interface
    pub fn phie(&self, location: Location) -> Complex64 {
        let layers = &self.setpoint.parameters.electrolyte;
        match location {
            Location::NegativeInterface => Complex64::zero(),
            Location::Electrolyte(x) => Complex64::from(-electrolyte_resistance_to(layers, x)),
            Location::Electrode(z) => {
                let r_el = self.setpoint.parameters.electrolyte_resistance();
                let d = self.d();
                let j = self.rs * z / d
                    + (self.re * self.kernel.ratio_difference(1.0, 1.0 - z)
                        + self.rs * self.kernel.ratio_difference(0.0, z))
                        / d;
                -r_el - self.re * j
            }
        }
    }

    /// Solid potential
    pub fn phis(&self, location: Location) -> Complex64 {
        self.phise(location) + self.phie(location)
    }

    /// Surface stoichiometry of the positive-electrode particles
    ///
    /// Positive infinity on a blocking interface that still admits faradaic
    /// current, zero when charge transfer is blocked.
    pub fn thetass(&self, location: Location) -> Complex64 {
        match location {
            Location::Electrode(_) if self.is_blocking() => {
                if self.faradaic_share.is_zero() {
                    Complex64::zero()
                } else {
                    Complex64::new(FloatValue::INFINITY, 0.0)
                }
            }
            Location::Electrode(_) => {
                self.ifdl(location) * self.faradaic_share / (self.ypar * -self.setpoint.ocp_slope)
            }
            Location::NegativeInterface | Location::Electrolyte(_) => Complex64::zero(),
        }
    }
}
