//! Numerical utilities.

pub mod column;
pub mod root_finding;
