use std::{error::Error, fmt, marker::PhantomData, num::ParseFloatError, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    enum_trivial_from_impl,
    shift::{gcj02_to_wgs84, is_out_of_china, wgs84_to_gcj02},
    utils::round_fract,
};

pub use self::datum::{Datum, Gcj02, Wgs84};

mod datum;

/// The number of decimal digits the map renderer keeps (about 0.1 m)
pub const RENDER_PRECISION: u32 = 6;

/// The pair (longitude, latitude) in decimal degrees expressed in the datum `D`.
///
/// The datum is only known at the type level, so a GCJ-02 coordinate
/// cannot be shifted into WGS-84 twice:
///
/// ```
/// use geod_datum::{Coordinate, Gcj02};
///
/// let gate = Coordinate::<Gcj02>::new(116.397_428, 39.909_23);
/// let wgs = gate.to_wgs84();
/// assert!(wgs.lng() < gate.lng());
/// ```
///
/// ```compile_fail
/// use geod_datum::{Coordinate, Wgs84};
///
/// let wgs = Coordinate::<Wgs84>::new(116.391_184, 39.907_826);
/// let _twice = wgs.to_wgs84();
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coordinate<D: Datum> {
    lng: f64,
    lat: f64,
    datum: PhantomData<D>,
}

impl<D: Datum> Coordinate<D> {
    /// Construct a coordinate from the longitude and latitude (degrees).
    ///
    /// No validation is done: any pair of numbers is accepted.
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self {
            lng,
            lat,
            datum: PhantomData,
        }
    }

    /// Construct a coordinate rejecting NaN and infinite components.
    ///
    /// # Errors
    /// When the longitude or latitude is not a finite number.
    pub fn checked(lng: f64, lat: f64) -> Result<Self, NonFiniteCoordinate> {
        let coord = Self::new(lng, lat);
        if coord.is_finite() {
            Ok(coord)
        } else {
            Err(NonFiniteCoordinate { lng, lat })
        }
    }

    /// Longitude in degrees
    pub const fn lng(self) -> f64 {
        self.lng
    }

    /// Latitude in degrees
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// The name of the datum the coordinate is expressed in
    pub fn datum_name(self) -> &'static str {
        D::NAME
    }

    /// Both components are finite numbers
    pub fn is_finite(self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// The point is outside of the region where the datum shift applies.
    ///
    /// Such a point has the same numbers in both datums.
    pub fn is_out_of_china(self) -> bool {
        is_out_of_china(self.lng, self.lat)
    }

    /// Round both components to the given number of decimal digits
    pub fn rounded(self, digits: u32) -> Self {
        Self::new(round_fract(self.lng, digits), round_fract(self.lat, digits))
    }

    /// The pair as an array in the GeoJSON order
    pub const fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl Coordinate<Gcj02> {
    /// Shift the coordinate into the WGS-84 datum
    pub fn to_wgs84(self) -> Coordinate<Wgs84> {
        let (lng, lat) = gcj02_to_wgs84(self.lng, self.lat);
        Coordinate::new(lng, lat)
    }
}

impl Coordinate<Wgs84> {
    /// Shift the coordinate into the GCJ-02 datum
    pub fn to_gcj02(self) -> Coordinate<Gcj02> {
        let (lng, lat) = wgs84_to_gcj02(self.lng, self.lat);
        Coordinate::new(lng, lat)
    }
}

impl<D: Datum> From<(f64, f64)> for Coordinate<D> {
    fn from(value: (f64, f64)) -> Self {
        let (lng, lat) = value;
        Self::new(lng, lat)
    }
}

impl<D: Datum> From<[f64; 2]> for Coordinate<D> {
    fn from(value: [f64; 2]) -> Self {
        let [lng, lat] = value;
        Self::new(lng, lat)
    }
}

impl<D: Datum> From<Coordinate<D>> for (f64, f64) {
    fn from(coord: Coordinate<D>) -> Self {
        (coord.lng, coord.lat)
    }
}

impl<D: Datum> fmt::Display for Coordinate<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let precision = f.precision().unwrap_or(RENDER_PRECISION as usize);
            write_signed(f, self.lng, precision, ('E', 'W'))?;
            write!(f, ", ")?;
            write_signed(f, self.lat, precision, ('N', 'S'))
        } else {
            write!(f, "{},{}", self.lng, self.lat)
        }
    }
}

/// Write the absolute value of the angle followed by the direction letter.
/// The zero angle has no direction.
fn write_signed(
    f: &mut fmt::Formatter<'_>,
    value: f64,
    precision: usize,
    (positive, negative): (char, char),
) -> fmt::Result {
    write!(f, "{:.*}°", precision, value.abs())?;
    if value > 0.0 {
        write!(f, "{}", positive)
    } else if value < 0.0 {
        write!(f, "{}", negative)
    } else {
        Ok(())
    }
}

#[derive(Debug)]
/// The error while parsing the `"lng,lat"` string
pub enum ParseCoordinateError {
    /// Nothing to parse
    EmptyString,
    /// The string is not a comma-separated pair of decimal numbers
    Format,
    /// A component is not a valid floating number
    Float(ParseFloatError),
}

enum_trivial_from_impl!(ParseFloatError => ParseCoordinateError:Float);

impl fmt::Display for ParseCoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate parsing failed: ")?;
        match self {
            Self::EmptyString => write!(f, "empty string provided"),
            Self::Format => write!(f, "expected the `longitude,latitude` pair"),
            Self::Float(inner) => write!(f, "{}", inner),
        }
    }
}

impl Error for ParseCoordinateError {}

#[derive(Debug, Copy, Clone)]
/// The coordinate has NaN or infinite component
pub struct NonFiniteCoordinate {
    lng: f64,
    lat: f64,
}

impl fmt::Display for NonFiniteCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coordinate components should be finite numbers, got ({}, {})",
            self.lng, self.lat
        )
    }
}

impl Error for NonFiniteCoordinate {}

lazy_static! {
    static ref RE_LOCATION: Regex = Regex::new(
        r"(?x)
        ^\s*
        (?P<lng>[-+]?\d{1,3}(?:\.\d+)?)     # longitude
        \s*,\s*                             # comma with optional spaces
        (?P<lat>[-+]?\d{1,2}(?:\.\d+)?)     # latitude
        \s*$
        "
    )
    .expect("Location regex is valid");
}

impl<D: Datum> FromStr for Coordinate<D> {
    type Err = ParseCoordinateError;

    /// Parse the location in the format of the geocoder: `"116.397428,39.909230"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseCoordinateError::EmptyString);
        }

        let capture = RE_LOCATION
            .captures(s)
            .ok_or(ParseCoordinateError::Format)?;
        let lng = capture
            .name("lng")
            .ok_or(ParseCoordinateError::Format)?
            .as_str()
            .parse()?;
        let lat = capture
            .name("lat")
            .ok_or(ParseCoordinateError::Format)?
            .as_str()
            .parse()?;

        Ok(Self::new(lng, lat))
    }
}

#[cfg(feature = "serde")]
impl<D: Datum> Serialize for Coordinate<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, D: Datum> Deserialize<'de> for Coordinate<D> {
    /// Read the GeoJSON position. The altitude (if any) is dropped.
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let position = Vec::<f64>::deserialize(deserializer)?;
        match position.as_slice() {
            [lng, lat, ..] => Ok(Self::new(*lng, *lat)),
            _ => Err(de::Error::invalid_length(
                position.len(),
                &"the [longitude, latitude] position",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let c = Coordinate::<Gcj02>::new(121.473_701, 31.230_416);
        assert_eq!(c.lng(), 121.473_701);
        assert_eq!(c.lat(), 31.230_416);
        assert_eq!(c.datum_name(), "GCJ-02");
        assert_eq!(c.to_array(), [121.473_701, 31.230_416]);

        let pair: (f64, f64) = c.into();
        assert_eq!(pair, (121.473_701, 31.230_416));
    }

    #[test]
    fn from_tuple_and_array() {
        let a: Coordinate<Wgs84> = (10.5, -3.25).into();
        let b: Coordinate<Wgs84> = [10.5, -3.25].into();
        assert_eq!(a, b);
        assert_eq!(a.datum_name(), "WGS-84");
    }

    #[test]
    fn shift_into_wgs84() {
        let gate = Coordinate::<Gcj02>::new(116.397_428, 39.909_23);
        let wgs = gate.to_wgs84();
        assert!((wgs.lng() - 116.391_184_374_042_33).abs() < 1e-12);
        assert!((wgs.lat() - 39.907_826_493_613_69).abs() < 1e-12);
        assert_eq!(wgs.datum_name(), "WGS-84");
    }

    #[test]
    fn shift_back_is_close() {
        let gate = Coordinate::<Gcj02>::new(116.397_428, 39.909_23);
        let back = gate.to_wgs84().to_gcj02();
        assert!((back.lng() - gate.lng()).abs() < 1e-4);
        assert!((back.lat() - gate.lat()).abs() < 1e-4);
    }

    #[test]
    fn out_of_china_has_the_same_numbers() {
        let london = Coordinate::<Gcj02>::new(-0.127_758, 51.507_351);
        assert!(london.is_out_of_china());
        assert_eq!(london.to_wgs84().to_array(), london.to_array());
    }

    #[test]
    fn rounding() {
        let wgs = Coordinate::<Gcj02>::new(116.397_428, 39.909_23)
            .to_wgs84()
            .rounded(RENDER_PRECISION);
        assert_eq!(wgs.to_array(), [116.391_184, 39.907_826]);
    }

    #[test]
    fn checked_rejects_non_finite() {
        assert!(Coordinate::<Gcj02>::checked(116.4, 39.9).is_ok());
        assert!(Coordinate::<Gcj02>::checked(f64::NAN, 39.9).is_err());
        assert!(Coordinate::<Wgs84>::checked(116.4, f64::INFINITY).is_err());

        let err = Coordinate::<Wgs84>::checked(f64::NEG_INFINITY, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Coordinate components should be finite numbers, got (-inf, 1)"
        );
    }

    #[test]
    fn unchecked_nan_propagates() {
        let c = Coordinate::<Gcj02>::new(f64::NAN, 39.9);
        assert!(!c.is_finite());
        assert!(c.is_out_of_china());
        assert!(c.to_wgs84().lng().is_nan());
    }

    #[test]
    fn display_plain() {
        let c = Coordinate::<Gcj02>::new(116.397_428, 39.909_23);
        assert_eq!(c.to_string(), "116.397428,39.90923");
    }

    #[test]
    fn display_alternate() {
        let c = Coordinate::<Gcj02>::new(116.397_428, 39.909_23);
        assert_eq!(format!("{:#}", c), "116.397428°E, 39.909230°N");

        let santiago = Coordinate::<Wgs84>::new(-70.666_667, -33.45);
        assert_eq!(format!("{:#.2}", santiago), "70.67°W, 33.45°S");

        let origin = Coordinate::<Wgs84>::new(0.0, 0.0);
        assert_eq!(format!("{:#.1}", origin), "0.0°, 0.0°");
    }

    #[test]
    fn parse_location() {
        let c: Coordinate<Gcj02> = "116.397428,39.909230".parse().unwrap();
        assert_eq!(c, Coordinate::new(116.397_428, 39.909_23));
    }

    #[test]
    fn parse_with_spaces_and_signs() {
        let c: Coordinate<Wgs84> = " -70.5, +33 ".parse().unwrap();
        assert_eq!(c.to_array(), [-70.5, 33.0]);

        let c: Coordinate<Wgs84> = "104.065735 ,30.659462".parse().unwrap();
        assert_eq!(c.to_array(), [104.065_735, 30.659_462]);
    }

    #[test]
    fn display_then_parse() {
        let c = Coordinate::<Gcj02>::new(113.264_385, 23.129_112);
        let parsed: Coordinate<Gcj02> = c.to_string().parse().unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    #[should_panic(expected = "EmptyString")]
    fn parse_empty() {
        let _c: Coordinate<Gcj02> = "  ".parse().unwrap();
    }

    #[test]
    #[should_panic(expected = "Format")]
    fn parse_single_number() {
        let _c: Coordinate<Gcj02> = "116.397428".parse().unwrap();
    }

    #[test]
    #[should_panic(expected = "Format")]
    fn parse_three_numbers() {
        let _c: Coordinate<Gcj02> = "116.4,39.9,50".parse().unwrap();
    }

    #[test]
    #[should_panic(expected = "Format")]
    fn parse_semicolon() {
        let _c: Coordinate<Gcj02> = "116.4;39.9".parse().unwrap();
    }

    #[test]
    #[should_panic(expected = "Format")]
    fn parse_nan_is_not_a_location() {
        let _c: Coordinate<Gcj02> = "NaN,39.9".parse().unwrap();
    }

    #[test]
    fn parse_error_message() {
        let err = "abc".parse::<Coordinate<Gcj02>>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Coordinate parsing failed: expected the `longitude,latitude` pair"
        );
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::super::*;

        #[test]
        fn serialize_as_position() {
            let c = Coordinate::<Wgs84>::new(116.391_184, 39.907_826);
            assert_eq!(
                serde_json::to_string(&c).unwrap(),
                "[116.391184,39.907826]"
            );
        }

        #[test]
        fn deserialize_position() {
            let c: Coordinate<Gcj02> = serde_json::from_str("[116.397428, 39.90923]").unwrap();
            assert_eq!(c, Coordinate::new(116.397_428, 39.909_23));
        }

        #[test]
        fn altitude_is_dropped() {
            let c: Coordinate<Gcj02> = serde_json::from_str("[116.4, 39.9, 44.5]").unwrap();
            assert_eq!(c.to_array(), [116.4, 39.9]);
        }

        #[test]
        fn short_position_fails() {
            let res = serde_json::from_str::<Coordinate<Gcj02>>("[116.4]");
            assert!(res.is_err());
        }
    }
}
