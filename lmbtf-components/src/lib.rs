//! Electrochemical components for lithium-metal battery cells
//!
//! Everything here consumes a [`lmbtf_core::parameters::ResolvedParameters`]
//! set, either directly or through a [`setpoint::Setpoint`].
//!
//! # Module Organisation
//!
//! - `msmr`: MSMR open-circuit potential and charge-transfer kinetics of the
//!   positive electrode
//! - `setpoint`: resolution of a cell model at one (SOC, temperature) pair
//! - `transfer`: closed-form transfer functions and the cell impedance
//! - `perturbation`: Baker-Verbrugge perturbation resistance

pub mod msmr;
pub mod perturbation;
pub mod setpoint;
pub mod transfer;
