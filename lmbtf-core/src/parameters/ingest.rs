//! Reading cell models from TOML documents
//!
//! A document has one table per region. Each parameter is either a bare number
//! (a `fix` value) or an inline table with a `kind` discriminator:
//!
//! ```toml
//! [const]
//! tref = 298.15
//! q = 0.005
//!
//! [neg]
//! k0 = { kind = "Eact", value = 2.0, activation_energy = 40000.0 }
//! rf = 0.05
//! cdl = 2e-5
//! ndl = 0.95
//!
//! [eff]
//! kappa = { kind = "lut", temperatures = [283.15, 298.15], values = [6.0, 8.0] }
//!
//! [pos]
//! sigma = 200.0
//! kappa = 4.0
//! dsref = 5e-4
//! rf = 0.02
//! cdl = 1e-3
//! ndl = 0.9
//! theta0 = 0.95
//! theta100 = 0.25
//!
//! [[pos.galleries]]
//! u0 = 4.0
//! x = 1.0
//! omega = 1.0
//! k0 = 1.0
//! ```
//!
//! Either `dll` and `sep` or a single `eff` table describes the electrolyte.
//! Unknown regions, unknown parameters and unknown temperature-function kinds
//! are rejected with the qualified parameter name.

use super::schema::{
    CellModel, CellParameters, ConstParameters, ElectrolyteLayers, ElectrolyteParameters,
    GalleryParameters, NegativeParameters, PositiveParameters, Region,
};
use super::temperature::TemperatureFunction;
use crate::errors::{LMBError, LMBResult};
use log::debug;
use std::path::Path;
use toml::{Table, Value};

/// Default charge-transfer symmetry factor for galleries that do not set one
pub const DEFAULT_ALPHA: f64 = 0.5;

impl CellModel {
    /// Parse a cell model from a TOML document
    pub fn from_toml_str(document: &str) -> LMBResult<CellModel> {
        let mut root: Table = document.parse()?;

        for name in root.keys() {
            if !Region::ALL.iter().any(|r| r.as_str() == name) {
                return Err(LMBError::UnknownParameter {
                    region: "<root>".to_string(),
                    parameter: name.clone(),
                });
            }
        }

        let constants = read_constants(region_table(&mut root, Region::Const)?)?;
        let neg = read_negative(region_table(&mut root, Region::Neg)?)?;
        let electrolyte = read_electrolyte(&mut root)?;
        let pos = read_positive(region_table(&mut root, Region::Pos)?)?;

        let model = CellParameters {
            constants,
            neg,
            electrolyte,
            pos,
        };
        model.validate()?;

        debug!(
            "Loaded cell model with {} galleries and electrolyte regions {:?}",
            model.n_galleries(),
            model.electrolyte.regions()
        );
        Ok(model)
    }

    /// Read and parse a cell model from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> LMBResult<CellModel> {
        let document = std::fs::read_to_string(path.as_ref())?;
        debug!("Reading cell model from {}", path.as_ref().display());
        Self::from_toml_str(&document)
    }

    /// Check every temperature function for internal consistency
    pub fn validate(&self) -> LMBResult<()> {
        if self.pos.galleries.is_empty() {
            return Err(LMBError::MissingParameter {
                region: Region::Pos.to_string(),
                parameter: "galleries".to_string(),
            });
        }
        self.try_map(|name, p| p.validate(name))?;
        Ok(())
    }
}

/// Parameters of one table, consumed slot by slot
struct SlotReader {
    label: String,
    entries: Table,
}

impl SlotReader {
    fn new(label: impl Into<String>, entries: Table) -> Self {
        Self {
            label: label.into(),
            entries,
        }
    }

    fn qualified(&self, name: &str) -> String {
        format!("{}.{}", self.label, name)
    }

    fn optional(&mut self, name: &str) -> LMBResult<Option<TemperatureFunction>> {
        match self.entries.remove(name) {
            Some(value) => parse_temperature_function(&self.qualified(name), value).map(Some),
            None => Ok(None),
        }
    }

    fn required(&mut self, name: &str) -> LMBResult<TemperatureFunction> {
        self.optional(name)?
            .ok_or_else(|| LMBError::MissingParameter {
                region: self.label.clone(),
                parameter: name.to_string(),
            })
    }

    /// Fail on any parameter that was not consumed
    fn finish(self) -> LMBResult<()> {
        match self.entries.keys().next() {
            Some(name) => Err(LMBError::UnknownParameter {
                region: self.label,
                parameter: name.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn parse_temperature_function(parameter: &str, value: Value) -> LMBResult<TemperatureFunction> {
    let function = match value {
        Value::Float(v) => TemperatureFunction::fixed(v),
        Value::Integer(v) => TemperatureFunction::fixed(v as f64),
        Value::Table(table) => {
            let kind = match table.get("kind") {
                Some(Value::String(kind)) => kind.clone(),
                Some(other) => other.to_string(),
                None => "<missing>".to_string(),
            };
            if !TemperatureFunction::KINDS.contains(&kind.as_str()) {
                return Err(LMBError::UnknownTemperatureFunction {
                    parameter: parameter.to_string(),
                    kind,
                });
            }
            Value::Table(table)
                .try_into::<TemperatureFunction>()
                .map_err(|e| LMBError::InvalidParameter {
                    parameter: parameter.to_string(),
                    reason: e.to_string(),
                })?
        }
        other => {
            return Err(LMBError::InvalidParameter {
                parameter: parameter.to_string(),
                reason: format!("expected a number or a table, got {}", other.type_str()),
            })
        }
    };
    function.validate(parameter)?;
    Ok(function)
}

fn region_table(root: &mut Table, region: Region) -> LMBResult<SlotReader> {
    match root.remove(region.as_str()) {
        Some(Value::Table(table)) => Ok(SlotReader::new(region.as_str(), table)),
        Some(other) => Err(LMBError::InvalidParameter {
            parameter: region.to_string(),
            reason: format!("expected a table, got {}", other.type_str()),
        }),
        None => Err(LMBError::MissingRegion(region.to_string())),
    }
}

fn read_constants(mut reader: SlotReader) -> LMBResult<ConstParameters<TemperatureFunction>> {
    let constants = ConstParameters {
        tref: reader.required("tref")?,
        q: reader.required("q")?,
        r0: reader.optional("r0")?,
    };
    reader.finish()?;
    Ok(constants)
}

fn read_negative(mut reader: SlotReader) -> LMBResult<NegativeParameters<TemperatureFunction>> {
    let neg = NegativeParameters {
        k0: reader.required("k0")?,
        rf: reader.required("rf")?,
        cdl: reader.required("cdl")?,
        ndl: reader.required("ndl")?,
    };
    reader.finish()?;
    Ok(neg)
}

fn read_layer(mut reader: SlotReader) -> LMBResult<ElectrolyteParameters<TemperatureFunction>> {
    let layer = ElectrolyteParameters {
        kappa: reader.required("kappa")?,
    };
    reader.finish()?;
    Ok(layer)
}

fn read_electrolyte(root: &mut Table) -> LMBResult<ElectrolyteLayers<TemperatureFunction>> {
    let has_dll = root.contains_key(Region::Dll.as_str());
    let has_sep = root.contains_key(Region::Sep.as_str());
    let has_eff = root.contains_key(Region::Eff.as_str());

    match (has_dll || has_sep, has_eff) {
        (true, true) => Err(LMBError::ConflictingRegions(
            "'eff' and 'dll'/'sep'".to_string(),
        )),
        (false, true) => Ok(ElectrolyteLayers::Effective(read_layer(region_table(
            root,
            Region::Eff,
        )?)?)),
        (_, false) => {
            let dll = read_layer(region_table(root, Region::Dll)?)?;
            let sep = read_layer(region_table(root, Region::Sep)?)?;
            Ok(ElectrolyteLayers::Separate { dll, sep })
        }
    }
}

fn read_gallery(
    index: usize,
    value: Value,
) -> LMBResult<GalleryParameters<TemperatureFunction>> {
    let label = format!("pos.galleries[{index}]");
    let table = match value {
        Value::Table(table) => table,
        other => {
            return Err(LMBError::InvalidParameter {
                parameter: label,
                reason: format!("expected a table, got {}", other.type_str()),
            })
        }
    };
    let mut reader = SlotReader::new(label, table);
    let gallery = GalleryParameters {
        u0: reader.required("u0")?,
        x: reader.required("x")?,
        omega: reader.required("omega")?,
        k0: reader.required("k0")?,
        alpha: reader
            .optional("alpha")?
            .unwrap_or(TemperatureFunction::fixed(DEFAULT_ALPHA)),
    };
    reader.finish()?;
    Ok(gallery)
}

fn read_positive(mut reader: SlotReader) -> LMBResult<PositiveParameters<TemperatureFunction>> {
    let galleries = match reader.entries.remove("galleries") {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| read_gallery(index, item))
            .collect::<LMBResult<Vec<_>>>()?,
        Some(other) => {
            return Err(LMBError::InvalidParameter {
                parameter: "pos.galleries".to_string(),
                reason: format!("expected an array of tables, got {}", other.type_str()),
            })
        }
        None => Vec::new(),
    };

    let pos = PositiveParameters {
        sigma: reader.required("sigma")?,
        kappa: reader.required("kappa")?,
        dsref: reader.required("dsref")?,
        rf: reader.required("rf")?,
        cdl: reader.required("cdl")?,
        ndl: reader.required("ndl")?,
        theta0: reader.required("theta0")?,
        theta100: reader.required("theta100")?,
        galleries,
    };
    reader.finish()?;
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_CELL: &str = r#"
[const]
tref = 298.15
q = 0.005

[neg]
k0 = { kind = "Eact", value = 2.0, activation_energy = 40000.0 }
rf = 0.05
cdl = 2e-5
ndl = 0.95

[eff]
kappa = { kind = "lut", temperatures = [283.15, 298.15], values = [6.0, 8.0] }

[pos]
sigma = 200.0
kappa = 4.0
dsref = 5e-4
rf = 0.02
cdl = 1e-3
ndl = 0.9
theta0 = 0.95
theta100 = 0.25

[[pos.galleries]]
u0 = 3.9
x = 0.4
omega = 0.8
k0 = 1.0

[[pos.galleries]]
u0 = 4.2
x = 0.6
omega = 1.5
k0 = 2
alpha = 0.4
"#;

    #[test]
    fn test_half_cell_document() {
        let model = CellModel::from_toml_str(HALF_CELL).unwrap();

        assert!(matches!(model.electrolyte, ElectrolyteLayers::Effective(_)));
        assert_eq!(model.n_galleries(), 2);
        assert_eq!(model.neg.k0, TemperatureFunction::arrhenius(2.0, 40000.0));
        assert_eq!(model.pos.galleries[0].alpha, TemperatureFunction::fixed(0.5));
        assert_eq!(model.pos.galleries[1].k0, TemperatureFunction::fixed(2.0));
        assert!(model.constants.r0.is_none());
    }

    #[test]
    fn test_full_cell_document() {
        let document = HALF_CELL.replace(
            "[eff]\nkappa = { kind = \"lut\", temperatures = [283.15, 298.15], values = [6.0, 8.0] }",
            "[dll]\nkappa = 30.0\n\n[sep]\nkappa = 12.0",
        );
        let model = CellModel::from_toml_str(&document).unwrap();
        match model.electrolyte {
            ElectrolyteLayers::Separate { dll, sep } => {
                assert_eq!(dll.kappa, TemperatureFunction::fixed(30.0));
                assert_eq!(sep.kappa, TemperatureFunction::fixed(12.0));
            }
            _ => panic!("expected separate layers"),
        }
    }

    #[test]
    fn test_unknown_kind_names_parameter() {
        let document = HALF_CELL.replace(
            "rf = 0.05",
            "rf = { kind = \"polynomial\", value = 0.05 }",
        );
        match CellModel::from_toml_str(&document).unwrap_err() {
            LMBError::UnknownTemperatureFunction { parameter, kind } => {
                assert_eq!(parameter, "neg.rf");
                assert_eq!(kind, "polynomial");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_unknown_parameter() {
        let document = HALF_CELL.replace("ndl = 0.95", "ndl = 0.95\nbogus = 1.0");
        match CellModel::from_toml_str(&document).unwrap_err() {
            LMBError::UnknownParameter { region, parameter } => {
                assert_eq!(region, "neg");
                assert_eq!(parameter, "bogus");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_missing_parameter_and_region() {
        let document = HALF_CELL.replace("dsref = 5e-4\n", "");
        assert!(matches!(
            CellModel::from_toml_str(&document),
            Err(LMBError::MissingParameter { parameter, .. }) if parameter == "dsref"
        ));

        let document = HALF_CELL.replace("[neg]", "[negative]");
        assert!(CellModel::from_toml_str(&document).is_err());
    }

    #[test]
    fn test_conflicting_electrolyte_regions() {
        let document = format!("{HALF_CELL}\n[sep]\nkappa = 1.0\n");
        assert!(matches!(
            CellModel::from_toml_str(&document),
            Err(LMBError::ConflictingRegions(_))
        ));
    }

    #[test]
    fn test_missing_galleries() {
        let end = HALF_CELL.find("[[pos.galleries]]").unwrap();
        assert!(matches!(
            CellModel::from_toml_str(&HALF_CELL[..end]),
            Err(LMBError::MissingParameter { parameter, .. }) if parameter == "galleries"
        ));
    }

    #[test]
    fn test_malformed_lut() {
        let document = HALF_CELL.replace("values = [6.0, 8.0]", "values = [6.0]");
        assert!(matches!(
            CellModel::from_toml_str(&document),
            Err(LMBError::InvalidParameter { parameter, .. }) if parameter == "eff.kappa"
        ));
    }
}
