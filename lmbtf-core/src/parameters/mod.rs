//! Cell parameter models
//!
//! - [`schema`]: the typed, region-organised parameter schema
//! - [`temperature`]: the temperature function carried by every parameter slot
//! - [`ingest`]: reading parameter models from TOML documents

pub mod ingest;
pub mod schema;
pub mod temperature;

pub use schema::{
    CellModel, CellParameters, ConstParameters, ElectrolyteLayers, ElectrolyteParameters,
    GalleryParameters, NegativeParameters, PositiveParameters, Region, ResolvedParameters,
};
pub use temperature::TemperatureFunction;
