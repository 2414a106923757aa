//! Sun incidence angle from terrain orientation.

use ndarray::{Array2, ArrayView3, Axis, Zip};
#[cfg(feature = "python")]
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray3};
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::sun::SunVector;

/// Angle between the orientation vector and the sun, in degrees.
///
/// 0 is direct illumination, 90 is grazing; surfaces facing away from the
/// sun are clamped to 90.
#[inline]
pub fn incidence_deg(orientation: [f64; 3], sun: &SunVector) -> f64 {
    sun.dot(orientation)
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
        .clamp(0.0, 90.0)
}

/// Incidence angle raster for a (rows, cols, 3) orientation field.
pub fn incidence_angle_pure(gradient: ArrayView3<f64>, sun: &SunVector) -> Array2<f64> {
    let (rows, cols, _) = gradient.dim();
    let mut angle = Array2::<f64>::zeros((rows, cols));
    Zip::from(&mut angle)
        .and(gradient.lanes(Axis(2)))
        .par_for_each(|a, g| *a = incidence_deg([g[0], g[1], g[2]], sun));
    angle
}

/// Incidence angle raster (PyO3 wrapper).
///
/// Args:
///     gradient: (rows, cols, 3) unit orientation field.
///     sun_vector: (x, y, z) unit sun direction.
///
/// Returns:
///     2D array of angles in degrees, 0-90.
#[cfg(feature = "python")]
#[pyfunction]
pub fn incidence_angle(
    py: Python<'_>,
    gradient: PyReadonlyArray3<f64>,
    sun_vector: (f64, f64, f64),
) -> PyResult<Py<PyArray2<f64>>> {
    let grad_v = gradient.as_array();
    if grad_v.shape()[2] != 3 {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "gradient must have shape (rows, cols, 3).",
        ));
    }
    let sun = SunVector::try_new(sun_vector.0, sun_vector.1, sun_vector.2)?;
    let result = incidence_angle_pure(grad_v, &sun);
    Ok(result.into_pyarray(py).unbind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::terrain_gradient_pure;
    use ndarray::Array2;

    #[test]
    fn test_overhead_sun_on_flat_ground() {
        let sun = SunVector::new(0.0, 0.0, 1.0);
        assert_eq!(incidence_deg([0.0, 0.0, 1.0], &sun), 0.0);
    }

    #[test]
    fn test_facing_away_is_ninety() {
        let sun = SunVector::new(0.0, 0.0, 1.0);
        assert_eq!(incidence_deg([0.0, 0.0, -1.0], &sun), 90.0);
        assert_eq!(incidence_deg([1.0, 0.0, 0.0], &sun), 90.0);
        let below = SunVector::new(0.6, 0.0, -0.8);
        assert_eq!(incidence_deg([0.0, 0.0, 1.0], &below), 90.0);
    }

    #[test]
    fn test_angle_matches_dot_product() {
        let s = 1.0 / 2.0_f64.sqrt();
        let sun = SunVector::new(s, 0.0, s);
        assert!((incidence_deg([0.0, 0.0, 1.0], &sun) - 45.0).abs() < 1e-9);
        // Rounding above 1 is clamped, not NaN.
        assert_eq!(incidence_deg([s, 0.0, s + 1e-12], &sun), 0.0);
    }

    #[test]
    fn test_raster_stays_in_range() {
        let dem = Array2::from_shape_fn((9, 8), |(r, c)| ((r * c) as f64).sqrt() * 5.0);
        let grad = terrain_gradient_pure(dem.view(), 1.0, 1.0);
        for sun in [
            SunVector::new(0.3, 0.4, (1.0_f64 - 0.25).sqrt()),
            SunVector::new(-0.9, 0.1, -(1.0_f64 - 0.82).sqrt()),
        ] {
            let angle = incidence_angle_pure(grad.view(), &sun);
            assert_eq!(angle.dim(), (9, 8));
            for ((r, c), &a) in angle.indexed_iter() {
                assert!((0.0..=90.0).contains(&a));
                let g = grad.slice(ndarray::s![r, c, ..]);
                if sun.dot([g[0], g[1], g[2]]) <= 0.0 {
                    assert_eq!(a, 90.0);
                }
            }
        }
    }
}
