//! Merge the shadow mask into the incidence raster, summarize, quantize.

use ndarray::{Array2, ArrayView2, Zip};
#[cfg(feature = "python")]
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::error::{Result, SunshadeError};

/// Angle written into shadowed cells (no direct light).
pub const SHADOW_INCIDENCE_DEG: f64 = 90.0;

/// Scalar summary of a run.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IlluminationStats {
    /// Percentage of shadowed cells (0-100).
    pub shadow_percent: f64,
    /// Always `100 - shadow_percent`.
    pub illuminated_percent: f64,
    /// Mean incidence before shadow merge; `None` for an empty grid.
    pub mean_incidence_all: Option<f64>,
    /// Mean incidence over lit cells; `None` when nothing is lit.
    pub mean_incidence_illuminated: Option<f64>,
}

#[cfg(feature = "python")]
#[pymethods]
impl IlluminationStats {
    fn __repr__(&self) -> String {
        format!("{self:?}")
    }
}

/// Merged incidence raster and the 8-bit outputs.
#[derive(Debug, Clone)]
pub struct Composite {
    pub incidence: Array2<f64>,
    pub incidence_u8: Array2<u8>,
    pub shadow_u8: Array2<u8>,
    pub stats: IlluminationStats,
}

fn check_shape(incidence: &ArrayView2<f64>, in_sun: &ArrayView2<bool>) -> Result<()> {
    if incidence.dim() != in_sun.dim() {
        return Err(SunshadeError::shape_mismatch(
            "shadow mask",
            incidence.dim(),
            in_sun.dim(),
        ));
    }
    Ok(())
}

/// Copy of `incidence` with shadowed cells set to 90 degrees.
pub fn merge_shadow_pure(incidence: ArrayView2<f64>, in_sun: ArrayView2<bool>) -> Result<Array2<f64>> {
    check_shape(&incidence, &in_sun)?;
    let mut merged = incidence.to_owned();
    Zip::from(&mut merged).and(&in_sun).for_each(|angle, &lit| {
        if !lit {
            *angle = SHADOW_INCIDENCE_DEG;
        }
    });
    Ok(merged)
}

/// Statistics over the unmerged incidence raster and the mask.
pub fn illumination_stats_pure(
    incidence: ArrayView2<f64>,
    in_sun: ArrayView2<bool>,
) -> Result<IlluminationStats> {
    check_shape(&incidence, &in_sun)?;
    let total = in_sun.len();
    let (lit_count, lit_sum) = Zip::from(&incidence)
        .and(&in_sun)
        .fold((0usize, 0.0f64), |(count, sum), &angle, &lit| {
            if lit {
                (count + 1, sum + angle)
            } else {
                (count, sum)
            }
        });
    let shadowed = total - lit_count;

    let shadow_percent = if total == 0 {
        0.0
    } else {
        shadowed as f64 / total as f64 * 100.0
    };
    Ok(IlluminationStats {
        shadow_percent,
        illuminated_percent: 100.0 - shadow_percent,
        mean_incidence_all: incidence.mean(),
        mean_incidence_illuminated: (lit_count > 0).then(|| lit_sum / lit_count as f64),
    })
}

/// Clamp to [0, 90] and truncate toward zero.
pub fn quantize_incidence(incidence: ArrayView2<f64>) -> Array2<u8> {
    incidence.mapv(|angle| angle.clamp(0.0, SHADOW_INCIDENCE_DEG) as u8)
}

/// Output convention: 0 = shadow, 1 = illuminated, as the shadow band
/// description states. The byte is the mask value itself, not its complement.
pub fn quantize_shadow(in_sun: ArrayView2<bool>) -> Array2<u8> {
    in_sun.mapv(u8::from)
}

pub fn composite_pure(incidence: ArrayView2<f64>, in_sun: ArrayView2<bool>) -> Result<Composite> {
    let stats = illumination_stats_pure(incidence, in_sun)?;
    let merged = merge_shadow_pure(incidence, in_sun)?;
    Ok(Composite {
        incidence_u8: quantize_incidence(merged.view()),
        shadow_u8: quantize_shadow(in_sun),
        incidence: merged,
        stats,
    })
}

/// Composite an incidence raster with a 0/1 shadow mask (PyO3 wrapper).
///
/// Args:
///     incidence: 2D incidence angles in degrees.
///     shadow: 2D uint8 mask, 1 = illuminated, 0 = shadow.
///
/// Returns:
///     (incidence_u8, shadow_u8, stats)
#[cfg(feature = "python")]
#[pyfunction]
pub fn composite(
    py: Python<'_>,
    incidence: PyReadonlyArray2<f64>,
    shadow: PyReadonlyArray2<u8>,
) -> PyResult<(Py<PyArray2<u8>>, Py<PyArray2<u8>>, IlluminationStats)> {
    let in_sun = shadow.as_array().mapv(|v| v != 0);
    let result = composite_pure(incidence.as_array(), in_sun.view())?;
    Ok((
        result.incidence_u8.into_pyarray(py).unbind(),
        result.shadow_u8.into_pyarray(py).unbind(),
        result.stats,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_shadowed_cells_become_ninety() {
        let incidence = array![[10.0, 20.0], [30.0, 40.0]];
        let in_sun = array![[true, false], [false, true]];
        let merged = merge_shadow_pure(incidence.view(), in_sun.view()).unwrap();
        assert_eq!(merged, array![[10.0, 90.0], [90.0, 40.0]]);
    }

    #[test]
    fn test_stats_use_unmerged_angles() {
        let incidence = array![[10.0, 20.0], [30.0, 40.0]];
        let in_sun = array![[true, false], [false, true]];
        let stats = illumination_stats_pure(incidence.view(), in_sun.view()).unwrap();
        assert_eq!(stats.shadow_percent, 50.0);
        assert_eq!(stats.illuminated_percent, 50.0);
        assert_eq!(stats.mean_incidence_all, Some(25.0));
        assert_eq!(stats.mean_incidence_illuminated, Some(25.0));
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        for (rows, cols, every) in [(3, 3, 2), (7, 11, 3), (13, 17, 5), (1, 9, 7)] {
            let incidence = Array2::<f64>::from_elem((rows, cols), 45.0);
            let in_sun = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) % every != 0);
            let stats = illumination_stats_pure(incidence.view(), in_sun.view()).unwrap();
            assert_eq!(stats.shadow_percent + stats.illuminated_percent, 100.0);
        }
    }

    #[test]
    fn test_nothing_lit() {
        let incidence = array![[12.0, 80.0]];
        let in_sun = array![[false, false]];
        let stats = illumination_stats_pure(incidence.view(), in_sun.view()).unwrap();
        assert_eq!(stats.shadow_percent, 100.0);
        assert_eq!(stats.illuminated_percent, 0.0);
        assert_eq!(stats.mean_incidence_all, Some(46.0));
        assert_eq!(stats.mean_incidence_illuminated, None);
    }

    #[test]
    fn test_quantize_truncates() {
        let incidence = array![[0.0, 0.99, 45.7], [89.999, 90.0, 120.0]];
        assert_eq!(
            quantize_incidence(incidence.view()),
            array![[0u8, 0, 45], [89, 90, 90]]
        );
        assert_eq!(quantize_incidence(array![[-3.0]].view()), array![[0u8]]);
    }

    #[test]
    fn test_quantize_shadow_convention() {
        let in_sun = array![[true, false]];
        assert_eq!(quantize_shadow(in_sun.view()), array![[1u8, 0]]);
        assert!(crate::config::SHADOW_BAND_DESCRIPTION.contains("0=shadow, 1=no shadow"));
    }

    #[test]
    fn test_empty_inputs() {
        let incidence = Array2::<f64>::zeros((0, 0));
        let in_sun = Array2::<bool>::from_elem((0, 0), true);
        let result = composite_pure(incidence.view(), in_sun.view()).unwrap();
        assert_eq!(result.incidence_u8.dim(), (0, 0));
        assert_eq!(result.stats.shadow_percent, 0.0);
        assert_eq!(result.stats.illuminated_percent, 100.0);
        assert_eq!(result.stats.mean_incidence_all, None);
        assert_eq!(result.stats.mean_incidence_illuminated, None);
    }

    #[test]
    fn test_shape_mismatch() {
        let incidence = Array2::<f64>::zeros((2, 3));
        let in_sun = Array2::<bool>::from_elem((3, 2), true);
        assert_eq!(
            composite_pure(incidence.view(), in_sun.view()).unwrap_err(),
            SunshadeError::shape_mismatch("shadow mask", (2, 3), (3, 2))
        );
    }
}
