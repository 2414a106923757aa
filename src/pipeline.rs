//! Single-instant illumination run: one FFI entrance/exit.
//!
//! Orchestrates: sun vector → gradient → incidence → shadows → composite.
//! Intermediate grids stay as ndarray arrays and never cross the FFI boundary.

use chrono::{DateTime, Utc};
use ndarray::Array2;
#[cfg(feature = "python")]
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::compositor::{composite_pure, IlluminationStats};
use crate::config::RunConfig;
use crate::error::Result;
use crate::gradient::terrain_gradient_pure;
use crate::grid::ElevationGrid;
use crate::incidence::incidence_angle_pure;
use crate::shadowing::project_shadows_pure;
use crate::sun::{sun_vector_at, SunPosition};

/// Everything a run produces for the raster writer and the report.
#[derive(Debug, Clone)]
pub struct IlluminationResult {
    pub sun: SunPosition,
    /// `true` = illuminated.
    pub shadow_mask: Array2<bool>,
    /// Incidence in degrees with shadowed cells at 90.
    pub incidence: Array2<f64>,
    /// 0 = shadow, 1 = illuminated.
    pub shadow_u8: Array2<u8>,
    /// Incidence truncated to whole degrees.
    pub incidence_u8: Array2<u8>,
    pub stats: IlluminationStats,
}

fn report_sun(sun: &SunPosition, config: &RunConfig) {
    let v = sun.vector;
    log::info!(
        "Sun altitude {:.2} deg, azimuth {:.2} deg, vector [{:.4}, {:.4}, {:.4}]",
        sun.altitude_deg,
        sun.azimuth_deg,
        v.x,
        v.y,
        v.z
    );
    if sun.altitude_deg < 0.0 {
        log::warn!(
            "Sun is below the horizon ({:.2} deg); shadows may not be meaningful",
            sun.altitude_deg
        );
    } else if sun.altitude_deg < config.low_sun_warning_deg {
        log::warn!(
            "Sun is very low ({:.2} deg); shadows will be very long",
            sun.altitude_deg
        );
    }
}

/// Run the full pipeline for one UTC instant.
pub fn run_pure(
    config: &RunConfig,
    instant: DateTime<Utc>,
    grid: &ElevationGrid,
) -> Result<IlluminationResult> {
    let location = config.location()?;
    log::info!(
        "Processing {} at lat {:.4}, lon {:.4}",
        instant.format("%Y-%m-%d %H:%M UTC"),
        location.latitude,
        location.longitude
    );

    let sun = SunPosition::from(sun_vector_at(instant, &location));
    report_sun(&sun, config);

    let (rows, cols) = grid.shape();
    log::info!(
        "DEM {} rows x {} cols, spacing {} x {} m",
        rows,
        cols,
        grid.dx(),
        grid.dy()
    );
    if let Some((lo, hi)) = grid.elevation_range() {
        log::info!("DEM elevation range {:.1} to {:.1} m", lo, hi);
    }

    log::debug!("Calculating gradient");
    let gradient = terrain_gradient_pure(grid.view(), grid.dx(), grid.dy());
    log::debug!("Calculating incidence angle");
    let raw_incidence = incidence_angle_pure(gradient.view(), &sun.vector);
    log::debug!("Calculating shadows");
    let shadow_mask = project_shadows_pure(grid.view(), &sun.vector, grid.dx(), grid.dy());
    log::debug!("Combining shadow and incidence angle");
    let composite = composite_pure(raw_incidence.view(), shadow_mask.view())?;

    let stats = composite.stats;
    log::info!(
        "Shadowed {:.1}%, illuminated {:.1}%",
        stats.shadow_percent,
        stats.illuminated_percent
    );
    match (stats.mean_incidence_all, stats.mean_incidence_illuminated) {
        (Some(all), Some(lit)) => log::info!(
            "Mean incidence {:.1} deg (all), {:.1} deg (illuminated only)",
            all,
            lit
        ),
        (Some(all), None) => log::info!("Mean incidence {:.1} deg (all), no illuminated cells", all),
        _ => log::info!("Empty grid, no incidence statistics"),
    }

    Ok(IlluminationResult {
        sun,
        shadow_mask,
        incidence: composite.incidence,
        shadow_u8: composite.shadow_u8,
        incidence_u8: composite.incidence_u8,
        stats,
    })
}

/// Result of one run (Python version).
#[cfg(feature = "python")]
#[pyclass]
pub struct IlluminationOutput {
    #[pyo3(get)]
    pub sun_altitude: f64,
    #[pyo3(get)]
    pub sun_azimuth: f64,
    #[pyo3(get)]
    pub sun_vector: (f64, f64, f64),
    /// 0 = shadow, 1 = illuminated.
    #[pyo3(get)]
    pub shadow: Py<PyArray2<u8>>,
    /// Whole degrees 0-90, shadowed cells at 90.
    #[pyo3(get)]
    pub incidence: Py<PyArray2<u8>>,
    /// Merged incidence before quantization.
    #[pyo3(get)]
    pub incidence_deg: Py<PyArray2<f64>>,
    #[pyo3(get)]
    pub stats: IlluminationStats,
}

/// Compute shadow and incidence rasters for one UTC instant (Python wrapper).
///
/// Args:
///     dem: 2D elevation array (float64).
///     dx: Cell spacing along columns (metres).
///     timestamp: UTC timestamp `YYYYMMDDtHHMM`.
///     config: Optional `RunConfig` (reference location); defaults apply.
///     dy: Cell spacing along rows (metres), defaults to dx.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(signature = (dem, dx, timestamp, config=None, dy=None))]
pub fn compute_illumination(
    py: Python<'_>,
    dem: PyReadonlyArray2<f64>,
    dx: f64,
    timestamp: &str,
    config: Option<&RunConfig>,
    dy: Option<f64>,
) -> PyResult<IlluminationOutput> {
    let config = config.cloned().unwrap_or_default();
    let instant = crate::config::parse_timestamp(timestamp)?;
    let grid = ElevationGrid::new(dem.as_array().to_owned(), dx, dy.unwrap_or(dx))?;

    let result = py.allow_threads(|| run_pure(&config, instant, &grid))?;

    let v = result.sun.vector;
    Ok(IlluminationOutput {
        sun_altitude: result.sun.altitude_deg,
        sun_azimuth: result.sun.azimuth_deg,
        sun_vector: (v.x, v.y, v.z),
        shadow: result.shadow_u8.into_pyarray(py).unbind(),
        incidence: result.incidence_u8.into_pyarray(py).unbind(),
        incidence_deg: result.incidence.into_pyarray(py).unbind(),
        stats: result.stats,
    })
}
