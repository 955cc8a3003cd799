//! The empirical offset model between GCJ-02 and WGS-84.
//!
//! GCJ-02 is WGS-84 plus a location-dependent offset of a few hundred meters.
//! The offset is given by two correction polynomials over the coordinates
//! recentered at (105°E, 35°N) and is scaled into degrees on the
//! reference ellipsoid of the model.
//!
//! The model is applied only inside the bounding box of mainland China,
//! any other point is returned untouched.
//!
//! All the functions are pure and can be called from any thread.
//! Non-finite input is never rejected: a NaN fails every bound check,
//! so it is treated as being out of China and comes back as is.

use std::f64::consts::PI;

/// Semi-major axis of the reference ellipsoid of the offset model (meters)
pub const SEMI_MAJOR_AXIS: f64 = 6_378_245.0;

/// First eccentricity squared of the reference ellipsoid of the offset model
#[allow(clippy::excessive_precision, clippy::unreadable_literal)]
pub const ECCENTRICITY_SQ: f64 = 0.00669342162296594323;

/// The western (exclusive) bound of the region where the offset applies
pub const CHINA_MIN_LNG: f64 = 73.66;
/// The eastern (exclusive) bound of the region where the offset applies
pub const CHINA_MAX_LNG: f64 = 135.05;
/// The southern (exclusive) bound of the region where the offset applies
pub const CHINA_MIN_LAT: f64 = 3.86;
/// The northern (exclusive) bound of the region where the offset applies
pub const CHINA_MAX_LAT: f64 = 53.55;

const CENTER_LNG: f64 = 105.0;
const CENTER_LAT: f64 = 35.0;

/// Is the point outside of the region where GCJ-02 differs from WGS-84?
///
/// The bounds are exclusive, so a point lying exactly on the border
/// is considered to be out of China.
///
/// ```
/// use geod_datum::is_out_of_china;
///
/// assert!(is_out_of_china(73.66, 30.0));
/// assert!(!is_out_of_china(73.661, 30.0));
/// ```
pub fn is_out_of_china(lng: f64, lat: f64) -> bool {
    let inside = lng > CHINA_MIN_LNG
        && lng < CHINA_MAX_LNG
        && lat > CHINA_MIN_LAT
        && lat < CHINA_MAX_LAT;
    !inside
}

/// Convert the GCJ-02 (longitude, latitude) into the WGS-84 one.
///
/// The offset is evaluated at the GCJ-02 point itself and subtracted,
/// which approximates the (analytically non-invertible) inverse of the forward shift
/// with the residual error of a few meters.
///
/// ```
/// use geod_datum::gcj02_to_wgs84;
///
/// let (lng, lat) = gcj02_to_wgs84(116.397_428, 39.909_23);
/// assert!((lng - 116.391_184).abs() < 1e-6);
/// assert!((lat - 39.907_826).abs() < 1e-6);
/// ```
pub fn gcj02_to_wgs84(lng: f64, lat: f64) -> (f64, f64) {
    if is_out_of_china(lng, lat) {
        return (lng, lat);
    }

    let (d_lng, d_lat) = offset(lng, lat);
    (lng - d_lng, lat - d_lat)
}

/// Convert the WGS-84 (longitude, latitude) into the GCJ-02 one.
///
/// This is the forward shift: the offset evaluated at the WGS-84 point is added to it.
pub fn wgs84_to_gcj02(lng: f64, lat: f64) -> (f64, f64) {
    if is_out_of_china(lng, lat) {
        return (lng, lat);
    }

    let (d_lng, d_lat) = offset(lng, lat);
    (lng + d_lng, lat + d_lat)
}

/// The (longitude, latitude) offset in degrees near the given point.
///
/// The order of operations matters: the results are compared bit-for-bit
/// with the already converted datasets.
fn offset(lng: f64, lat: f64) -> (f64, f64) {
    let d_lat = transform_lat(lng - CENTER_LNG, lat - CENTER_LAT);
    let d_lng = transform_lng(lng - CENTER_LNG, lat - CENTER_LAT);

    let rad_lat = lat / 180.0 * PI;
    let magic = rad_lat.sin();
    let magic = 1.0 - ECCENTRICITY_SQ * magic * magic;
    let sqrt_magic = magic.sqrt();

    let d_lat = (d_lat * 180.0)
        / ((SEMI_MAJOR_AXIS * (1.0 - ECCENTRICITY_SQ)) / (magic * sqrt_magic) * PI);
    let d_lng = (d_lng * 180.0) / (SEMI_MAJOR_AXIS / sqrt_magic * rad_lat.cos() * PI);
    (d_lng, d_lat)
}

/// Latitude correction polynomial over the recentered coordinates
pub(crate) fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

/// Longitude correction polynomial over the recentered coordinates
pub(crate) fn transform_lng(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}
