//! Terrain orientation vectors from elevation finite differences.

use ndarray::{s, Array3, ArrayView2, Axis, Zip};
#[cfg(feature = "python")]
use numpy::{IntoPyArray, PyArray3, PyReadonlyArray2};
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Per-cell unit orientation vector, shaped (rows, cols, 3).
///
/// Each cell uses the 2x2 window toward its lower-right neighbours:
/// x = 0.5*dy*(z00 - z01 + z10 - z11), y = 0.5*dx*(z00 + z01 - z10 - z11),
/// z = dx*dy, then normalized. The vertical component never vanishes, so the
/// norm is at least dx*dy. The last row and column copy their neighbours.
/// Grids without a 2x2 window get the flat orientation (0, 0, 1).
pub fn terrain_gradient_pure(dem: ArrayView2<f64>, dx: f64, dy: f64) -> Array3<f64> {
    let (rows, cols) = dem.dim();
    let mut grad = Array3::<f64>::zeros((rows, cols, 3));
    if rows == 0 || cols == 0 {
        return grad;
    }
    if rows < 2 || cols < 2 {
        grad.slice_mut(s![.., .., 2]).fill(1.0);
        return grad;
    }

    let vertical = dx * dy;
    Zip::indexed(grad.slice_mut(s![..rows - 1, ..cols - 1, ..]).lanes_mut(Axis(2)))
        .par_for_each(|(r, c), mut g| {
            let z00 = dem[[r, c]];
            let z01 = dem[[r, c + 1]];
            let z10 = dem[[r + 1, c]];
            let z11 = dem[[r + 1, c + 1]];
            let gx = 0.5 * dy * (z00 - z01 + z10 - z11);
            let gy = 0.5 * dx * (z00 + z01 - z10 - z11);
            let norm = (gx * gx + gy * gy + vertical * vertical).sqrt();
            g[0] = gx / norm;
            g[1] = gy / norm;
            g[2] = vertical / norm;
        });

    // Boundary rule: copy, do not extrapolate. Row first, then column, so the
    // corner ends up equal to the last interior cell.
    {
        let (src, mut dst) = grad.multi_slice_mut((s![rows - 2, .., ..], s![rows - 1, .., ..]));
        dst.assign(&src);
    }
    {
        let (src, mut dst) = grad.multi_slice_mut((s![.., cols - 2, ..], s![.., cols - 1, ..]));
        dst.assign(&src);
    }
    grad
}

/// Terrain orientation field (PyO3 wrapper).
///
/// Args:
///     dem: 2D elevation array (float64).
///     dx: Cell spacing along columns (metres).
///     dy: Cell spacing along rows (metres), defaults to dx.
///
/// Returns:
///     (rows, cols, 3) array of unit vectors.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(signature = (dem, dx, dy=None))]
pub fn terrain_gradient(
    py: Python<'_>,
    dem: PyReadonlyArray2<f64>,
    dx: f64,
    dy: Option<f64>,
) -> PyResult<Py<PyArray3<f64>>> {
    let dy = dy.unwrap_or(dx);
    let grid = crate::grid::ElevationGrid::new(dem.as_array().to_owned(), dx, dy)?;
    let result = terrain_gradient_pure(grid.view(), dx, dy);
    Ok(result.into_pyarray(py).unbind())
}
