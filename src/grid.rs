//! Input data model: reference location and elevation grid.

use ndarray::{Array2, ArrayView2};
use ndarray_stats::QuantileExt;

use crate::error::{Result, SunshadeError};

/// Single reference point used for the sun position (not per pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<()> {
        if self.latitude.is_finite() && self.longitude.is_finite() {
            Ok(())
        } else {
            Err(SunshadeError::NonFiniteLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Dense rows x cols elevation model with per-axis cell spacing in metres.
///
/// Row index grows along the raster's y axis (southward for north-up
/// rasters), column index grows eastward. All cells are assumed valid.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    elevation: Array2<f64>,
    dx: f64,
    dy: f64,
}

fn check_spacing(dx: f64, dy: f64) -> Result<()> {
    if dx.is_finite() && dy.is_finite() && dx > 0.0 && dy > 0.0 {
        Ok(())
    } else {
        Err(SunshadeError::InvalidSpacing { dx, dy })
    }
}

impl ElevationGrid {
    pub fn new(elevation: Array2<f64>, dx: f64, dy: f64) -> Result<Self> {
        check_spacing(dx, dy)?;
        Ok(Self { elevation, dx, dy })
    }

    /// Build a grid from row vectors; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>, dx: f64, dy: f64) -> Result<Self> {
        check_spacing(dx, dy)?;
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != num_cols)
        {
            return Err(SunshadeError::RaggedGrid {
                row,
                expected: num_cols,
                found: values.len(),
            });
        }
        let elevation = Array2::from_shape_fn((num_rows, num_cols), |(r, c)| rows[r][c]);
        Ok(Self { elevation, dx, dy })
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.elevation.view()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.elevation.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.elevation.is_empty()
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Minimum and maximum elevation, skipping NaN cells.
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        let min = *self.elevation.min_skipnan();
        let max = *self.elevation.max_skipnan();
        if min.is_nan() || max.is_nan() {
            None
        } else {
            Some((min, max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_location_rejects_non_finite() {
        assert!(GeoLocation::new(46.8182, 8.2275).is_ok());
        assert!(matches!(
            GeoLocation::new(f64::NAN, 8.0),
            Err(SunshadeError::NonFiniteLocation { .. })
        ));
        assert!(GeoLocation::new(10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_spacing_must_be_positive() {
        let dem = Array2::<f64>::zeros((2, 2));
        assert!(ElevationGrid::new(dem.clone(), 1.0, 1.0).is_ok());
        assert!(ElevationGrid::new(dem.clone(), 0.0, 1.0).is_err());
        assert!(ElevationGrid::new(dem, 1.0, -2.0).is_err());
    }

    #[test]
    fn test_from_rows_checks_rectangularity() {
        let grid = ElevationGrid::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 1.0, 1.0)
            .unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.view()[[1, 0]], 3.0);

        let err = ElevationGrid::from_rows(vec![vec![1.0, 2.0], vec![3.0]], 1.0, 1.0)
            .unwrap_err();
        assert_eq!(
            err,
            SunshadeError::RaggedGrid {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_empty_grid_is_allowed() {
        let grid = ElevationGrid::from_rows(vec![], 1.0, 1.0).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.shape(), (0, 0));
        assert_eq!(grid.elevation_range(), None);
    }

    #[test]
    fn test_elevation_range_skips_nan() {
        let grid = ElevationGrid::new(array![[3.0, f64::NAN], [-1.5, 7.25]], 1.0, 1.0).unwrap();
        assert_eq!(grid.elevation_range(), Some((-1.5, 7.25)));
    }
}
