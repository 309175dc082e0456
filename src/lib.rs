//! Analytic transfer functions and perturbation resistance for lithium-metal
//! battery cells.
//!
//! The work is split over two crates, re-exported here:
//!
//! - [`lmbtf_core`]: constants, errors, the cell parameter schema and its
//!   temperature resolution, and numerical utilities
//! - [`lmbtf_components`]: the MSMR electrode, setpoints, transfer functions
//!   and the perturbation resistance
//!
//! With the `python` feature the crate also builds the `lmbtf._lib` extension
//! module.

pub use lmbtf_components;
pub use lmbtf_core;

#[cfg(feature = "python")]
pub mod python;
