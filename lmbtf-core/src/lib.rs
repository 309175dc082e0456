//! Core types for lithium-metal battery transfer-function models.
//!
//! This crate holds everything the electrochemical components share:
//!
//! - [`constants`]: physical constants and the thermal voltage
//! - [`errors`]: the error taxonomy used across the workspace
//! - [`parameters`]: the typed cell parameter schema and its temperature functions
//! - [`resolve`]: resolution of a parameter model at a temperature
//! - [`utils`]: the root finder and column-orientation helpers

pub mod constants;
pub mod errors;
pub mod parameters;
pub mod resolve;
pub mod utils;

/// Floating point type used for all model quantities
pub type FloatValue = f64;
