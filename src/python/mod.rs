//! Python bindings
//!
//! # Usage from Python
//!
//! ```python
//! import numpy as np
//! from lmbtf._lib import CellModel, msmr_ocp
//!
//! model = CellModel.from_file("cell.toml")
//! z = model.impedance(np.logspace(-3, 4, 50), soc=0.5, temperature=298.15)
//! r = model.perturbation_resistance(np.linspace(0.1, 0.9, 9), compute_rctj=True)
//! r["total"].shape  # (9, 1)
//! ```

use lmbtf_components::msmr::MsmrElectrode;
use lmbtf_components::perturbation::{compute_perturbation_resistance, PerturbationOptions};
use lmbtf_components::setpoint::Setpoint;
use lmbtf_components::transfer::{cell_impedance, laplace_frequencies, TransferFunction};
use lmbtf_core::constants::DEFAULT_TEMPERATURE;
use lmbtf_core::errors::LMBError;
use lmbtf_core::parameters::CellModel;
use lmbtf_core::resolve::resolve_at_temperature;
use numpy::{Complex64, IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::PathBuf;

fn to_py_err(e: LMBError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// A cell parameter model
///
/// Every parameter carries its own temperature function, so the model can be
/// evaluated at any temperature its lookup tables cover.
#[pyclass(name = "CellModel", module = "lmbtf._lib")]
#[derive(Clone)]
pub struct PyCellModel(pub CellModel);

#[pymethods]
impl PyCellModel {
    /// Parse a model from a TOML document
    #[staticmethod]
    fn from_toml(document: &str) -> PyResult<Self> {
        CellModel::from_toml_str(document)
            .map(Self)
            .map_err(to_py_err)
    }

    /// Read a model from a TOML file
    #[staticmethod]
    fn from_file(path: PathBuf) -> PyResult<Self> {
        CellModel::from_toml_file(path)
            .map(Self)
            .map_err(to_py_err)
    }

    /// Model with every parameter fixed at its value at `temperature`
    #[pyo3(signature = (temperature=DEFAULT_TEMPERATURE))]
    fn resolve(&self, temperature: f64) -> PyResult<Self> {
        let resolved = resolve_at_temperature(&self.0, temperature).map_err(to_py_err)?;
        Ok(Self(CellModel::from(&resolved)))
    }

    #[getter]
    fn n_galleries(&self) -> usize {
        self.0.n_galleries()
    }

    /// Cell impedance at each frequency (Hz)
    #[pyo3(signature = (frequencies, soc, temperature=DEFAULT_TEMPERATURE))]
    fn impedance<'py>(
        &self,
        py: Python<'py>,
        frequencies: PyReadonlyArray1<'py, f64>,
        soc: f64,
        temperature: f64,
    ) -> PyResult<Bound<'py, PyArray1<Complex64>>> {
        let setpoint = Setpoint::evaluate(&self.0, soc, temperature).map_err(to_py_err)?;
        let s = laplace_frequencies(&frequencies.as_array().to_vec());
        let z = cell_impedance(&setpoint, &s).map_err(to_py_err)?;
        Ok(z.into_pyarray_bound(py))
    }

    /// Transfer function `name` at each position and frequency (Hz)
    ///
    /// Returns a `(position, frequency)` array.
    #[pyo3(signature = (name, positions, frequencies, soc, temperature=DEFAULT_TEMPERATURE))]
    fn transfer_function<'py>(
        &self,
        py: Python<'py>,
        name: &str,
        positions: PyReadonlyArray1<'py, f64>,
        frequencies: PyReadonlyArray1<'py, f64>,
        soc: f64,
        temperature: f64,
    ) -> PyResult<Bound<'py, PyArray2<Complex64>>> {
        let variable: TransferFunction = name.parse().map_err(to_py_err)?;
        let setpoint = Setpoint::evaluate(&self.0, soc, temperature).map_err(to_py_err)?;
        let s = laplace_frequencies(&frequencies.as_array().to_vec());
        let values = variable
            .evaluate(&setpoint, &positions.as_array().to_vec(), &s)
            .map_err(to_py_err)?;
        Ok(values.into_pyarray_bound(py))
    }

    /// Perturbation resistance at each positive-electrode lithiation
    ///
    /// Returns a dict of `(n, 1)` arrays: `total`, `r0`, `rct_neg`, `rct_pos`,
    /// `rdiff` and `ocp`, plus the `(n, J)` array `rct_j` when requested.
    #[pyo3(signature = (lithiation, temperature=DEFAULT_TEMPERATURE, ocp=None, compute_rctj=false))]
    fn perturbation_resistance<'py>(
        &self,
        py: Python<'py>,
        lithiation: PyReadonlyArray1<'py, f64>,
        temperature: f64,
        ocp: Option<PyReadonlyArray1<'py, f64>>,
        compute_rctj: bool,
    ) -> PyResult<Bound<'py, PyDict>> {
        let theta = lithiation.as_array().to_vec();
        let options = PerturbationOptions {
            temperature,
            ocp: ocp.map(|o| o.as_array().to_vec()),
            compute_rctj,
        };
        let model = &self.0;
        let result = py
            .allow_threads(|| compute_perturbation_resistance(model, theta, &options))
            .map_err(to_py_err)?;

        let out = PyDict::new_bound(py);
        out.set_item("total", result.total.into_pyarray_bound(py))?;
        out.set_item("r0", result.parts.r0.into_pyarray_bound(py))?;
        out.set_item("rct_neg", result.parts.rct_neg.into_pyarray_bound(py))?;
        out.set_item("rct_pos", result.parts.rct_pos.into_pyarray_bound(py))?;
        out.set_item("rdiff", result.parts.rdiff.into_pyarray_bound(py))?;
        if let Some(rct_j) = result.parts.rct_j {
            out.set_item("rct_j", rct_j.into_pyarray_bound(py))?;
        }
        out.set_item("ocp", result.ocp.into_pyarray_bound(py))?;
        Ok(out)
    }

    fn __repr__(&self) -> String {
        format!(
            "CellModel(galleries={}, electrolyte={:?})",
            self.0.n_galleries(),
            self.0.electrolyte.regions()
        )
    }
}

/// Open-circuit potential of the positive electrode at each lithiation
#[pyfunction]
#[pyo3(signature = (model, lithiation, temperature=DEFAULT_TEMPERATURE))]
fn msmr_ocp<'py>(
    py: Python<'py>,
    model: &PyCellModel,
    lithiation: PyReadonlyArray1<'py, f64>,
    temperature: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let theta = lithiation.as_array().to_vec();
    let parameters = resolve_at_temperature(&model.0, temperature).map_err(to_py_err)?;
    let electrode = MsmrElectrode::from_resolved(&parameters).map_err(to_py_err)?;
    let ocp = py
        .allow_threads(|| electrode.ocp_vector(&theta, temperature))
        .map_err(to_py_err)?;
    Ok(ocp.into_pyarray_bound(py))
}

#[pymodule]
#[pyo3(name = "_lib")]
fn lmbtf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyCellModel>()?;
    m.add_function(wrap_pyfunction!(msmr_ocp, m)?)?;
    Ok(())
}
