//! Horizon-tracking shadow casting on an elevation grid.
//!
//! Two orthogonal families of rays are marched away from the sun: one seeded
//! along a row (one ray per column), one seeded along a column (one ray per
//! row). Along each ray the elevation is projected onto the plane normal to
//! the sun direction; a cell is occluded when an earlier cell on the same ray
//! projects strictly higher. The two families together approximate full 2D
//! occlusion; they are not exact ray tracing.

use ndarray::{Array2, ArrayView2};
#[cfg(feature = "python")]
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
#[cfg(feature = "python")]
use pyo3::prelude::*;
use rayon::prelude::*;

use crate::sun::SunVector;

/// Starting value of the running horizon on every ray.
const HORIZON_FLOOR: f64 = -1e20;

/// Ray step away from the sun, scaled so the dominant horizontal component
/// has unit length. A vertical sun falls back to straight down.
pub fn invert_sun_vector(sun: &SunVector) -> [f64; 3] {
    let max_xy = sun.x.abs().max(sun.y.abs());
    if max_xy == 0.0 {
        return [0.0, 0.0, -1.0];
    }
    [-sun.x / max_xy, -sun.y / max_xy, -sun.z / max_xy]
}

/// Projection axis perpendicular to the sun's bearing, with magnitude equal to
/// the sun's horizontal component. A vertical sun falls back to up.
pub fn normal_sun_vector(sun: &SunVector) -> [f64; 3] {
    let horizontal = sun.horizontal_norm();
    if horizontal == 0.0 {
        return [0.0, 0.0, 1.0];
    }
    [
        -sun.x * sun.z / horizontal,
        -sun.y * sun.z / horizontal,
        horizontal,
    ]
}

/// Edge cells the two sweeps start from, nearest the sun.
///
/// A sun from the west (negative x) seeds column 1 rather than 0, and a sun
/// from the negative-y side seeds row 1; otherwise the last index is used.
/// Exactly-zero components take the last index.
pub fn seed_edges(sun: &SunVector, rows: usize, cols: usize) -> (usize, usize) {
    let start_row = if sun.y < 0.0 { 1 } else { rows.saturating_sub(1) };
    let start_col = if sun.x < 0.0 { 1 } else { cols.saturating_sub(1) };
    (start_row, start_col)
}

struct RayCaster<'a> {
    dem: ArrayView2<'a, f64>,
    step: [f64; 2],
    normal: [f64; 3],
}

impl<'a> RayCaster<'a> {
    fn new(dem: ArrayView2<'a, f64>, sun: &SunVector) -> Self {
        let inverse = invert_sun_vector(sun);
        Self {
            dem,
            step: [inverse[0], inverse[1]],
            normal: normal_sun_vector(sun),
        }
    }

    /// March one ray from `(row, col)` and return the cells it occludes.
    ///
    /// Owns its running horizon; rays never share state.
    fn cast(&self, row: usize, col: usize, spacing: f64) -> Vec<(usize, usize)> {
        let (rows, cols) = self.dem.dim();
        let stationary = self.step[0] == 0.0 && self.step[1] == 0.0;
        let mut occluded = Vec::new();
        let mut horizon = HORIZON_FLOOR;
        let mut n = 0usize;

        loop {
            let offset_x = self.step[0] * n as f64;
            let offset_y = self.step[1] * n as f64;
            // Nearest index, ties to even.
            let c = (col as f64 + offset_x).round_ties_even();
            let r = (row as f64 + offset_y).round_ties_even();
            if !c.is_finite() || !r.is_finite() {
                break;
            }
            if c < 0.0 || c >= cols as f64 || r < 0.0 || r >= rows as f64 {
                break;
            }
            let (r, c) = (r as usize, c as usize);

            let projected = offset_x * spacing * self.normal[0]
                + offset_y * spacing * self.normal[1]
                + self.dem[[r, c]] * self.normal[2];
            if projected < horizon {
                occluded.push((r, c));
            } else {
                horizon = projected;
            }

            // A vertical sun never leaves the seed cell.
            if stationary {
                break;
            }
            n += 1;
        }
        occluded
    }
}

fn apply_occlusion(in_sun: &mut Array2<bool>, rays: Vec<Vec<(usize, usize)>>) -> usize {
    let mut count = 0;
    for (r, c) in rays.into_iter().flatten() {
        in_sun[[r, c]] = false;
        count += 1;
    }
    count
}

/// Illumination mask for `dem` under `sun`; `true` = illuminated.
///
/// A non-finite sun vector casts no rays and leaves every cell lit; use
/// `SunVector::try_new` to reject such input up front.
///
/// The row-seeded sweep scales ray offsets by `dx`, the column-seeded sweep by
/// `dy`. Rays within a sweep run in parallel. Occlusion only ever clears
/// cells, so the result does not depend on ray order.
pub fn project_shadows_pure(dem: ArrayView2<f64>, sun: &SunVector, dx: f64, dy: f64) -> Array2<bool> {
    let (rows, cols) = dem.dim();
    let mut in_sun = Array2::from_elem((rows, cols), true);
    if rows == 0 || cols == 0 {
        return in_sun;
    }

    let caster = RayCaster::new(dem, sun);
    let (start_row, start_col) = seed_edges(sun, rows, cols);
    log::debug!(
        "Casting shadows: step=({:.4}, {:.4}), seed row {}, seed col {}",
        caster.step[0],
        caster.step[1],
        start_row,
        start_col
    );

    let row_seeded: Vec<_> = (0..cols)
        .into_par_iter()
        .map(|col| caster.cast(start_row, col, dx))
        .collect();
    let marked = apply_occlusion(&mut in_sun, row_seeded);
    log::debug!("Row-seeded sweep: {} rays, {} occlusions", cols, marked);

    let col_seeded: Vec<_> = (0..rows)
        .into_par_iter()
        .map(|row| caster.cast(row, start_col, dy))
        .collect();
    let marked = apply_occlusion(&mut in_sun, col_seeded);
    log::debug!("Column-seeded sweep: {} rays, {} occlusions", rows, marked);

    in_sun
}

/// Casts terrain shadows for a sun direction (PyO3 wrapper).
///
/// Args:
///     dem: 2D elevation array (float64).
///     sun_vector: (x, y, z) unit sun direction.
///     dx: Cell spacing along columns (metres).
///     dy: Cell spacing along rows (metres), defaults to dx.
///
/// Returns:
///     2D uint8 array, 1 = illuminated, 0 = shadow.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(signature = (dem, sun_vector, dx, dy=None))]
pub fn project_shadows(
    py: Python<'_>,
    dem: PyReadonlyArray2<f64>,
    sun_vector: (f64, f64, f64),
    dx: f64,
    dy: Option<f64>,
) -> PyResult<Py<PyArray2<u8>>> {
    let dy = dy.unwrap_or(dx);
    let grid = crate::grid::ElevationGrid::new(dem.as_array().to_owned(), dx, dy)?;
    let sun = SunVector::try_new(sun_vector.0, sun_vector.1, sun_vector.2)?;
    let mask = py.allow_threads(|| project_shadows_pure(grid.view(), &sun, dx, dy));
    Ok(mask.mapv(u8::from).into_pyarray(py).unbind())
}
