//! Run configuration passed explicitly into the pipeline entry point.

use chrono::{DateTime, NaiveDate, Utc};
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::error::{Result, SunshadeError};
use crate::grid::GeoLocation;

pub const DEFAULT_TIMESTAMP: &str = "20210602t1005";
pub const DEFAULT_DEM: &str = "LIDAR_MAX_subset_engadin.tif";
pub const DEFAULT_OUT_DIR: &str = "./output_results";
/// Central Switzerland.
pub const REFERENCE_LATITUDE: f64 = 46.8182;
pub const REFERENCE_LONGITUDE: f64 = 8.2275;

pub const SHADOW_BAND_DESCRIPTION: &str = "Shadow: 0=shadow, 1=no shadow";
pub const INCIDENCE_BAND_DESCRIPTION: &str = "Incidence angle: 0-90 degrees";

/// Settings constant across a run. Output and compression fields are handed to
/// the raster writer untouched.
#[cfg_attr(feature = "python", pyclass(get_all, set_all))]
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub default_timestamp: String,
    pub default_dem: String,
    pub default_out_dir: String,
    pub compression: String,
    pub predictor: u8,
    /// Sun altitudes below this (degrees) trigger a long-shadow warning.
    pub low_sun_warning_deg: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            latitude: REFERENCE_LATITUDE,
            longitude: REFERENCE_LONGITUDE,
            default_timestamp: DEFAULT_TIMESTAMP.to_string(),
            default_dem: DEFAULT_DEM.to_string(),
            default_out_dir: DEFAULT_OUT_DIR.to_string(),
            compression: "deflate".to_string(),
            predictor: 2,
            low_sun_warning_deg: 5.0,
        }
    }
}

impl RunConfig {
    pub fn location(&self) -> Result<GeoLocation> {
        GeoLocation::new(self.latitude, self.longitude)
    }

    pub fn validate(&self) -> Result<()> {
        self.location().map(|_| ())
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl RunConfig {
    #[new]
    #[pyo3(signature = (latitude=REFERENCE_LATITUDE, longitude=REFERENCE_LONGITUDE))]
    pub fn py_new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "RunConfig(latitude={}, longitude={})",
            self.latitude, self.longitude
        )
    }
}

fn timestamp_error(input: &str, reason: &str) -> SunshadeError {
    SunshadeError::InvalidTimestamp {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn digits(input: &str, range: std::ops::Range<usize>) -> Result<u32> {
    input[range]
        .parse::<u32>()
        .map_err(|_| timestamp_error(input, "expected digits in YYYYMMDDtHHMM"))
}

/// Parse a compact `YYYYMMDDtHHMM` timestamp, always as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let bytes = input.as_bytes();
    if bytes.len() != 13 || !input.is_ascii() {
        return Err(timestamp_error(input, "expected format YYYYMMDDtHHMM"));
    }
    if !matches!(bytes[8], b't' | b'T') {
        return Err(timestamp_error(input, "expected 't' between date and time"));
    }
    if !bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 8 || b.is_ascii_digit())
    {
        return Err(timestamp_error(input, "expected digits in YYYYMMDDtHHMM"));
    }
    let year = digits(input, 0..4)? as i32;
    let month = digits(input, 4..6)?;
    let day = digits(input, 6..8)?;
    let hour = digits(input, 9..11)?;
    let minute = digits(input, 11..13)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| timestamp_error(input, "no such calendar date"))?
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| timestamp_error(input, "no such time of day"))
        .map(|naive| naive.and_utc())
}

/// File names for the two output rasters of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub shadow: String,
    pub incidence: String,
}

impl OutputNames {
    pub fn new(timestamp: &str, dem_stem: &str) -> Self {
        Self {
            shadow: format!("shadow_{timestamp}_{dem_stem}.tif"),
            incidence: format!("incidence_angle_{timestamp}_{dem_stem}.tif"),
        }
    }
}

/// Validate a compact UTC timestamp and return it as ISO 8601.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "parse_timestamp")]
pub fn parse_timestamp_py(timestamp: &str) -> PyResult<String> {
    Ok(parse_timestamp(timestamp)?.to_rfc3339())
}

/// Output raster file names `(shadow, incidence)` for a timestamp and DEM stem.
#[cfg(feature = "python")]
#[pyfunction]
pub fn output_names(timestamp: &str, dem_stem: &str) -> (String, String) {
    let names = OutputNames::new(timestamp, dem_stem);
    (names.shadow, names.incidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_swiss_reference() {
        let config = RunConfig::default();
        let location = config.location().unwrap();
        assert_eq!(location.latitude, 46.8182);
        assert_eq!(location.longitude, 8.2275);
        assert_eq!(config.compression, "deflate");
        assert_eq!(config.predictor, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_finite_location_fails_validation() {
        let config = RunConfig {
            latitude: f64::NAN,
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SunshadeError::NonFiniteLocation { .. })
        ));
    }

    #[test]
    fn test_parse_timestamp_as_utc() {
        let expected = Utc.with_ymd_and_hms(2021, 6, 2, 10, 5, 0).unwrap();
        assert_eq!(parse_timestamp("20210602t1005").unwrap(), expected);
        assert_eq!(parse_timestamp("20210602T1005").unwrap(), expected);
        assert_eq!(
            parse_timestamp(DEFAULT_TIMESTAMP).unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        for bad in [
            "",
            "2021-06-02 10:05",
            "20210602x1005",
            "20210602t10051",
            "2021060at1005",
            "20210230t1005",
            "20210602t2460",
            "２０２１0602t100",
        ] {
            assert!(
                matches!(
                    parse_timestamp(bad),
                    Err(SunshadeError::InvalidTimestamp { .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_output_names() {
        let names = OutputNames::new("20210602t1005", "engadin");
        assert_eq!(names.shadow, "shadow_20210602t1005_engadin.tif");
        assert_eq!(names.incidence, "incidence_angle_20210602t1005_engadin.tif");
    }
}
