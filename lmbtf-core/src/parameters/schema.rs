//! Typed cell parameter schema
//!
//! A cell is described region by region. Each region has a fixed set of
//! parameter slots. The structs are generic over the slot type so that the same
//! schema describes both a parameter model (slots hold a
//! [`TemperatureFunction`]) and a resolved parameter set (slots hold plain
//! values).
//!
//! Lumped parameters are used throughout: conductances are in siemens for the
//! whole layer, capacitances in farads for the whole interface, and the cell
//! capacity in ampere-hours.

use super::temperature::TemperatureFunction;
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

/// Regions of a lithium-metal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Cell-wide constants
    Const,
    /// Lithium-metal negative electrode interface
    Neg,
    /// Porous positive electrode
    Pos,
    /// Separator
    Sep,
    /// Electrolyte layer between the lithium-metal interface and the separator
    Dll,
    /// Effective combined separator and `dll` layer
    Eff,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Const,
        Region::Neg,
        Region::Pos,
        Region::Sep,
        Region::Dll,
        Region::Eff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Const => "const",
            Region::Neg => "neg",
            Region::Pos => "pos",
            Region::Sep => "sep",
            Region::Dll => "dll",
            Region::Eff => "eff",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell-wide constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstParameters<P> {
    /// Reference temperature for Arrhenius relations
    /// unit: K
    pub tref: P,
    /// Cell capacity
    /// unit: Ah
    pub q: P,
    /// Series resistance, when supplied directly instead of being assembled
    /// from the other regions
    /// unit: Ω
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r0: Option<P>,
}

/// Lithium-metal interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeParameters<P> {
    /// Exchange current of the plating/stripping reaction
    /// unit: A
    pub k0: P,
    /// Film (SEI) resistance
    /// unit: Ω
    pub rf: P,
    /// Double-layer capacitance
    /// unit: F
    pub cdl: P,
    /// Constant-phase exponent of the double layer (1 is an ideal capacitor)
    pub ndl: P,
}

/// Electrolyte-only layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectrolyteParameters<P> {
    /// Lumped ionic conductance of the layer
    /// unit: S
    pub kappa: P,
}

/// Electrolyte between the lithium-metal interface and the positive electrode
///
/// A full cell describes the `dll` and `sep` layers separately; a half-cell
/// description substitutes a single effective layer. Both feed the same
/// downstream calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectrolyteLayers<P> {
    Separate {
        dll: ElectrolyteParameters<P>,
        sep: ElectrolyteParameters<P>,
    },
    Effective(ElectrolyteParameters<P>),
}

/// One MSMR gallery of the positive electrode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryParameters<P> {
    /// Standard potential
    /// unit: V
    pub u0: P,
    /// Share of the electrode capacity held by the gallery
    pub x: P,
    /// Ideality factor
    pub omega: P,
    /// Kinetic rate constant
    /// unit: A
    pub k0: P,
    /// Charge-transfer symmetry factor
    pub alpha: P,
}

/// Porous positive electrode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositiveParameters<P> {
    /// Lumped solid-phase conductance
    /// unit: S
    pub sigma: P,
    /// Lumped electrolyte conductance within the electrode
    /// unit: S
    pub kappa: P,
    /// Reference solid diffusivity $D_s/R_s^2$
    /// unit: 1/s
    pub dsref: P,
    /// Film resistance
    /// unit: Ω
    pub rf: P,
    /// Double-layer capacitance
    /// unit: F
    pub cdl: P,
    /// Constant-phase exponent of the double layer
    pub ndl: P,
    /// Electrode stoichiometry at 0 % state of charge
    pub theta0: P,
    /// Electrode stoichiometry at 100 % state of charge
    pub theta100: P,
    pub galleries: Vec<GalleryParameters<P>>,
}

/// Complete cell description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellParameters<P> {
    #[serde(rename = "const")]
    pub constants: ConstParameters<P>,
    pub neg: NegativeParameters<P>,
    pub electrolyte: ElectrolyteLayers<P>,
    pub pos: PositiveParameters<P>,
}

/// Parameter model: every slot carries a temperature function
pub type CellModel = CellParameters<TemperatureFunction>;

/// Parameters resolved at one temperature
pub type ResolvedParameters = CellParameters<FloatValue>;

impl<P> ConstParameters<P> {
    pub fn try_map<Q, E>(
        &self,
        f: &mut impl FnMut(&str, &P) -> Result<Q, E>,
    ) -> Result<ConstParameters<Q>, E> {
        Ok(ConstParameters {
            tref: f("const.tref", &self.tref)?,
            q: f("const.q", &self.q)?,
            r0: self.r0.as_ref().map(|p| f("const.r0", p)).transpose()?,
        })
    }
}

impl<P> NegativeParameters<P> {
    pub fn try_map<Q, E>(
        &self,
        f: &mut impl FnMut(&str, &P) -> Result<Q, E>,
    ) -> Result<NegativeParameters<Q>, E> {
        Ok(NegativeParameters {
            k0: f("neg.k0", &self.k0)?,
            rf: f("neg.rf", &self.rf)?,
            cdl: f("neg.cdl", &self.cdl)?,
            ndl: f("neg.ndl", &self.ndl)?,
        })
    }
}

impl<P> ElectrolyteParameters<P> {
    pub fn try_map<Q, E>(
        &self,
        region: Region,
        f: &mut impl FnMut(&str, &P) -> Result<Q, E>,
    ) -> Result<ElectrolyteParameters<Q>, E> {
        Ok(ElectrolyteParameters {
            kappa: f(&format!("{region}.kappa"), &self.kappa)?,
        })
    }
}

impl<P> ElectrolyteLayers<P> {
    pub fn try_map<Q, E>(
        &self,
        f: &mut impl FnMut(&str, &P) -> Result<Q, E>,
    ) -> Result<ElectrolyteLayers<Q>, E> {
        Ok(match self {
            ElectrolyteLayers::Separate { dll, sep } => ElectrolyteLayers::Separate {
                dll: dll.try_map(Region::Dll, &mut *f)?,
                sep: sep.try_map(Region::Sep, &mut *f)?,
            },
            ElectrolyteLayers::Effective(eff) => {
                ElectrolyteLayers::Effective(eff.try_map(Region::Eff, &mut *f)?)
            }
        })
    }

    /// Regions present in this layering
    pub fn regions(&self) -> &'static [Region] {
        match self {
            ElectrolyteLayers::Separate { .. } => &[Region::Dll, Region::Sep],
            ElectrolyteLayers::Effective(_) => &[Region::Eff],
        }
    }
}

impl<P> GalleryParameters<P> {
    pub fn try_map<Q, E>(
        &self,
        index: usize,
        f: &mut impl FnMut(&str, &P) -> Result<Q, E>,
    ) -> Result<GalleryParameters<Q>, E> {
        let name = |p: &str| format!("pos.galleries[{index}].{p}");
        Ok(GalleryParameters {
            u0: f(&name("u0"), &self.u0)?,
            x: f(&name("x"), &self.x)?,
            omega: f(&name("omega"), &self.omega)?,
            k0: f(&name("k0"), &self.k0)?,
            alpha: f(&name("alpha"), &self.alpha)?,
        })
    }
}

impl<P> PositiveParameters<P> {
    pub fn try_map<Q, E>(
        &self,
        f: &mut impl FnMut(&str, &P) -> Result<Q, E>,
    ) -> Result<PositiveParameters<Q>, E> {
        Ok(PositiveParameters {
            sigma: f("pos.sigma", &self.sigma)?,
            kappa: f("pos.kappa", &self.kappa)?,
            dsref: f("pos.dsref", &self.dsref)?,
            rf: f("pos.rf", &self.rf)?,
            cdl: f("pos.cdl", &self.cdl)?,
            ndl: f("pos.ndl", &self.ndl)?,
            theta0: f("pos.theta0", &self.theta0)?,
            theta100: f("pos.theta100", &self.theta100)?,
            galleries: self
                .galleries
                .iter()
                .enumerate()
                .map(|(index, gallery)| gallery.try_map(index, &mut *f))
                .collect::<Result<Vec<_>, E>>()?,
        })
    }
}

impl<P> CellParameters<P> {
    /// Apply `f` to every parameter slot, passing the qualified parameter name
    ///
    /// Slots are visited region by region in a fixed order and the first error
    /// is returned.
    pub fn try_map<Q, E>(
        &self,
        mut f: impl FnMut(&str, &P) -> Result<Q, E>,
    ) -> Result<CellParameters<Q>, E> {
        Ok(CellParameters {
            constants: self.constants.try_map(&mut f)?,
            neg: self.neg.try_map(&mut f)?,
            electrolyte: self.electrolyte.try_map(&mut f)?,
            pos: self.pos.try_map(&mut f)?,
        })
    }

    /// Number of MSMR galleries in the positive electrode
    pub fn n_galleries(&self) -> usize {
        self.pos.galleries.len()
    }
}

impl From<&ResolvedParameters> for CellModel {
    /// Lift a flat parameter set into a model whose slots are all `fix`
    fn from(resolved: &ResolvedParameters) -> Self {
        let lifted: Result<CellModel, Infallible> =
            resolved.try_map(|_, &value| Ok(TemperatureFunction::fixed(value)));
        match lifted {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}
