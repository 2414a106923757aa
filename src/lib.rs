//! Per-pixel solar illumination from a digital elevation model: incidence
//! angle and horizon shadow mask for one UTC instant.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod compositor;
pub mod config;
pub mod error;
pub mod gradient;
pub mod grid;
pub mod incidence;
pub mod logging;
pub mod pipeline;
pub mod shadowing;
pub mod sun;

pub use config::RunConfig;
pub use error::{Result, SunshadeError};
pub use grid::{ElevationGrid, GeoLocation};
pub use pipeline::{run_pure, IlluminationResult};
pub use sun::{SunPosition, SunVector};

#[cfg(feature = "python")]
#[pymodule]
fn sunshade(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    py_module.add_function(wrap_pyfunction!(logging::init_logging, py_module)?)?;

    // Register submodules
    register_sun_module(py_module)?;
    register_terrain_module(py_module)?;
    register_shadowing_module(py_module)?;
    register_compositor_module(py_module)?;
    register_pipeline_module(py_module)?;

    py_module.add("__doc__", "DEM sun incidence and shadow algorithms implemented in Rust.")?;

    Ok(())
}

#[cfg(feature = "python")]
fn register_sun_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "sun")?;
    submodule.add("__doc__", "Solar ephemeris.")?;
    submodule.add_function(wrap_pyfunction!(sun::sun_vector_py, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(sun::julian_date_py, &submodule)?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}

#[cfg(feature = "python")]
fn register_terrain_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "terrain")?;
    submodule.add("__doc__", "Terrain orientation and sun incidence angle.")?;
    submodule.add_function(wrap_pyfunction!(gradient::terrain_gradient, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(incidence::incidence_angle, &submodule)?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}

#[cfg(feature = "python")]
fn register_shadowing_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "shadowing")?;
    submodule.add("__doc__", "Horizon shadow casting.")?;
    submodule.add_function(wrap_pyfunction!(shadowing::project_shadows, &submodule)?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}

#[cfg(feature = "python")]
fn register_compositor_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "compositor")?;
    submodule.add("__doc__", "Shadow merge, statistics and 8-bit quantization.")?;
    submodule.add_class::<compositor::IlluminationStats>()?;
    submodule.add_function(wrap_pyfunction!(compositor::composite, &submodule)?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}

#[cfg(feature = "python")]
fn register_pipeline_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "pipeline")?;
    submodule.add("__doc__", "Single-instant illumination run.")?;
    submodule.add_class::<config::RunConfig>()?;
    submodule.add_class::<pipeline::IlluminationOutput>()?;
    submodule.add_function(wrap_pyfunction!(config::parse_timestamp_py, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(config::output_names, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(pipeline::compute_illumination, &submodule)?)?;
    py_module.add("SHADOW_BAND_DESCRIPTION", config::SHADOW_BAND_DESCRIPTION)?;
    py_module.add("INCIDENCE_BAND_DESCRIPTION", config::INCIDENCE_BAND_DESCRIPTION)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}
