//! Solar ephemeris: unit sun direction for one UTC instant and location.
//!
//! Uses the NOAA low-precision series (Julian century based) for the
//! equation of time and the solar declination.

use chrono::{DateTime, Utc};
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::error::{Result, SunshadeError};
use crate::grid::GeoLocation;

const SECONDS_PER_DAY: f64 = 86_400.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Unit vector pointing at the sun.
///
/// `x` is positive east, `y` positive toward increasing row index (south on a
/// north-up raster) and `z` is up. `z` is negative when the sun is below the
/// horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SunVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Like `new`, but rejects NaN or infinite components.
    pub fn try_new(x: f64, y: f64, z: f64) -> Result<Self> {
        let sun = Self::new(x, y, z);
        if !sun.is_finite() {
            return Err(SunshadeError::NonFiniteSunVector { x, y, z });
        }
        Ok(sun)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn horizontal_norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(&self, v: [f64; 3]) -> f64 {
        self.x * v[0] + self.y * v[1] + self.z * v[2]
    }

    /// Solar altitude above the horizon in degrees.
    pub fn altitude_deg(&self) -> f64 {
        self.z.clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// Compass bearing of the sun (0 = N, 90 = E, 180 = S, 270 = W).
    pub fn azimuth_deg(&self) -> f64 {
        self.x.atan2(-self.y).to_degrees().rem_euclid(360.0)
    }

    pub fn is_below_horizon(&self) -> bool {
        self.z < 0.0
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Sun position summary reported alongside the rasters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    pub vector: SunVector,
}

impl From<SunVector> for SunPosition {
    fn from(vector: SunVector) -> Self {
        Self {
            altitude_deg: vector.altitude_deg(),
            azimuth_deg: vector.azimuth_deg(),
            vector,
        }
    }
}

/// Continuous day count with the day boundary at noon UTC.
pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    let seconds =
        instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) * 1e-9;
    seconds / SECONDS_PER_DAY + UNIX_EPOCH_JD
}

/// Julian centuries since 2000-01-01 12:00 UTC.
pub fn julian_century(julian_date: f64) -> f64 {
    (julian_date - J2000_JD) / DAYS_PER_CENTURY
}

/// Terms shared by the equation of time and the declination.
struct OrbitTerms {
    /// Corrected obliquity of the ecliptic (degrees).
    obliquity_corr: f64,
    /// Geometric mean longitude of the sun (degrees, in [0, 360)).
    mean_longitude: f64,
    /// Geometric mean anomaly of the sun (radians).
    mean_anomaly: f64,
}

fn orbit_terms(jdc: f64) -> OrbitTerms {
    let seconds = 21.448 - jdc * (46.8150 + jdc * (0.00059 - jdc * 0.001813));
    let mean_obliquity = 23.0 + (26.0 + seconds / 60.0) / 60.0;
    let obliquity_corr =
        mean_obliquity + 0.00256 * (125.04 - 1934.136 * jdc).to_radians().cos();
    let mean_longitude = (280.46646 + jdc * (36000.76983 + jdc * 0.0003032)).rem_euclid(360.0);
    let mean_anomaly = (357.52911 + jdc * (35999.05029 - 0.0001537 * jdc)).to_radians();
    OrbitTerms {
        obliquity_corr,
        mean_longitude,
        mean_anomaly,
    }
}

/// Equation of time in minutes.
pub fn equation_of_time(julian_date: f64) -> f64 {
    let jdc = julian_century(julian_date);
    let t = orbit_terms(jdc);
    let ecc = 0.016708634 - jdc * (0.000042037 + 0.0000001267 * jdc);
    let y = ((t.obliquity_corr.to_radians() / 2.0).tan()).powi(2);
    let l0 = t.mean_longitude.to_radians();
    let m = t.mean_anomaly;
    let eq_time = y * (2.0 * l0).sin() - 2.0 * ecc * m.sin()
        + 4.0 * ecc * y * m.sin() * (2.0 * l0).cos()
        - 0.5 * y * y * (4.0 * l0).sin()
        - 1.25 * ecc * ecc * (2.0 * m).sin();
    eq_time.to_degrees() * 4.0
}

/// Solar declination in degrees.
pub fn sun_declination(julian_date: f64) -> f64 {
    let jdc = julian_century(julian_date);
    let t = orbit_terms(jdc);
    let m = t.mean_anomaly;
    let eq_center = m.sin() * (1.914602 - jdc * (0.004817 + 0.000014 * jdc))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * jdc)
        + (3.0 * m).sin() * 0.000289;
    let true_longitude = t.mean_longitude + eq_center;
    let apparent_longitude =
        true_longitude - 0.00569 - 0.00478 * (125.04 - 1934.136 * jdc).to_radians().sin();
    (t.obliquity_corr.to_radians().sin() * apparent_longitude.to_radians().sin())
        .asin()
        .to_degrees()
}

/// Hour angle in radians: 0 at local solar noon, negative in the morning.
pub fn hour_angle(julian_date: f64, longitude: f64) -> f64 {
    // Julian days start at noon, so the fractional part counts from 12:00 UTC.
    let fractional_day = julian_date - julian_date.floor();
    let hour_utc = (fractional_day * 24.0 + 12.0).rem_euclid(24.0);
    let solar_time = hour_utc + longitude / 15.0 + equation_of_time(julian_date) / 60.0;
    std::f64::consts::PI * (solar_time / 12.0 - 1.0)
}

/// Unit vector toward the sun for a Julian date and location in degrees.
pub fn sun_vector(julian_date: f64, latitude: f64, longitude: f64) -> SunVector {
    let omega = hour_angle(julian_date, longitude);
    let delta = sun_declination(julian_date).to_radians();
    let lambda = latitude.to_radians();

    let (sin_omega, cos_omega) = omega.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();
    let (sin_lambda, cos_lambda) = lambda.sin_cos();

    SunVector {
        x: -sin_omega * cos_delta,
        y: sin_lambda * cos_omega * cos_delta - cos_lambda * sin_delta,
        z: cos_lambda * cos_omega * cos_delta + sin_lambda * sin_delta,
    }
}

pub fn sun_vector_at(instant: DateTime<Utc>, location: &GeoLocation) -> SunVector {
    sun_vector(julian_date(instant), location.latitude, location.longitude)
}

/// Sun direction for a compact UTC timestamp (`YYYYMMDDtHHMM`).
///
/// Returns the `(x, y, z)` unit vector.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "sun_vector")]
pub fn sun_vector_py(timestamp: &str, latitude: f64, longitude: f64) -> PyResult<(f64, f64, f64)> {
    let instant = crate::config::parse_timestamp(timestamp)?;
    let location = GeoLocation::new(latitude, longitude)?;
    let v = sun_vector_at(instant, &location);
    Ok((v.x, v.y, v.z))
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "julian_date")]
pub fn julian_date_py(timestamp: &str) -> PyResult<f64> {
    Ok(julian_date(crate::config::parse_timestamp(timestamp)?))
}
