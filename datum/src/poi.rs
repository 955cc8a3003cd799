//! Decoding of the place search response of the Chinese geocoder.
//!
//! The geocoder answers with the GCJ-02 positions written as `"lng,lat"` strings:
//!
//! ```json
//! {"status": "1", "info": "OK", "infocode": "10000", "count": "1",
//!  "pois": [{"id": "B000A8UIN8", "name": "Tiananmen", "location": "116.397428,39.909230"}]}
//! ```
//!
//! Issuing the request is the job of the caller.

use std::{error::Error, fmt};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    coord::{Coordinate, Gcj02, ParseCoordinateError},
    enum_trivial_from_impl,
};

/// The value of the `status` field of a successful response
const STATUS_OK: &str = "1";

/// The `infocode`-s which mean the key has run out of its quota
const QUOTA_INFOCODES: [&str; 5] = ["10003", "10004", "10005", "10009", "10044"];

/// The body of the place search response
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSearchResponse {
    /// `"1"` on success, `"0"` on failure
    pub status: String,
    /// Human-readable status
    #[serde(default)]
    pub info: Option<String>,
    /// Machine-readable status
    #[serde(default)]
    pub infocode: Option<String>,
    /// The total number of matches (as a string)
    #[serde(default)]
    pub count: Option<String>,
    /// The matches, the most relevant first
    #[serde(default)]
    pub pois: Vec<Poi>,
}

/// Point of interest: a named place found by the keyword.
///
/// The fields are kept as sent: the geocoder puts an empty array
/// in place of an empty string.
#[derive(Debug, Clone, Deserialize)]
pub struct Poi {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    address: Value,
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

#[derive(Debug)]
/// Failed to get the location out of the response
pub enum PoiError {
    /// The body is not a place search response
    Json(serde_json::Error),
    /// The geocoder refused to answer
    Status {
        /// Human-readable status
        info: String,
        /// Machine-readable status
        infocode: String,
    },
    /// Nothing was found
    NoResults,
    /// The place has no location
    MissingLocation {
        /// Name of the place
        name: String,
    },
    /// The location of the place is malformed
    Location(ParseCoordinateError),
}

enum_trivial_from_impl!(serde_json::Error => PoiError:Json);
enum_trivial_from_impl!(ParseCoordinateError => PoiError:Location);

impl PoiError {
    /// Is the error caused by the exhausted quota of the key?
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Self::Status { infocode, .. } => QUOTA_INFOCODES.contains(&infocode.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for PoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Place search failed: ")?;
        match self {
            Self::Json(inner) => write!(f, "{}", inner),
            Self::Status { info, infocode } => {
                write!(f, "geocoder replied {:?} (infocode {})", info, infocode)
            }
            Self::NoResults => write!(f, "no places found"),
            Self::MissingLocation { name } => write!(f, "place {:?} has no location", name),
            Self::Location(inner) => write!(f, "{}", inner),
        }
    }
}

impl Error for PoiError {}

impl PlaceSearchResponse {
    /// Decode the response body.
    ///
    /// # Errors
    /// When the body is not a JSON of the expected shape.
    pub fn from_json(body: &str) -> Result<Self, PoiError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Did the geocoder process the request?
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// The most relevant place.
    ///
    /// # Errors
    /// - the geocoder replied with the failure status;
    /// - no places were found.
    pub fn first(&self) -> Result<&Poi, PoiError> {
        if !self.is_ok() {
            return Err(PoiError::Status {
                info: self.info.clone().unwrap_or_default(),
                infocode: self.infocode.clone().unwrap_or_default(),
            });
        }

        self.pois.first().ok_or(PoiError::NoResults)
    }
}

impl Poi {
    /// Geocoder's identifier of the place
    pub fn id(&self) -> Option<&str> {
        non_empty_str(&self.id)
    }

    /// Name of the place
    pub fn name(&self) -> Option<&str> {
        non_empty_str(&self.name)
    }

    /// The position of the place in GCJ-02.
    ///
    /// # Errors
    /// When the `"lng,lat"` location is absent or malformed.
    pub fn location(&self) -> Result<Coordinate<Gcj02>, PoiError> {
        let location =
            non_empty_str(&self.location).ok_or_else(|| PoiError::MissingLocation {
                name: self.name().unwrap_or_default().to_owned(),
            })?;

        Ok(location.parse()?)
    }

    /// The street address, if the geocoder knows it
    pub fn address(&self) -> Option<&str> {
        non_empty_str(&self.address)
    }
}

/// Get the GCJ-02 position of the most relevant place from the response body.
///
/// # Errors
/// See the [`PoiError`] variants.
pub fn first_location(body: &str) -> Result<Coordinate<Gcj02>, PoiError> {
    let located = PlaceSearchResponse::from_json(body)
        .and_then(|response| response.first().and_then(Poi::location));

    if let Err(err) = &located {
        warn!(error = %err, "No usable location in the place search response");
    }
    located
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUND: &str = r#"{
        "status": "1",
        "info": "OK",
        "infocode": "10000",
        "count": "2",
        "pois": [
            {
                "id": "B000A60DA1",
                "name": "Tiananmen",
                "address": "Dongchangan Street",
                "location": "116.397428,39.909230",
                "type": "scenic spot"
            },
            {
                "id": "B000A83M61",
                "name": "Tiananmen Square",
                "address": [],
                "location": "116.397755,39.903179"
            }
        ]
    }"#;

    #[test]
    fn first_place_wins() {
        let location = first_location(FOUND).unwrap();
        assert_eq!(location, Coordinate::new(116.397_428, 39.909_23));
    }

    #[test]
    fn full_response() {
        let response = PlaceSearchResponse::from_json(FOUND).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.count.as_deref(), Some("2"));
        assert_eq!(response.pois.len(), 2);

        let first = response.first().unwrap();
        assert_eq!(first.id(), Some("B000A60DA1"));
        assert_eq!(first.name(), Some("Tiananmen"));
        assert_eq!(first.address(), Some("Dongchangan Street"));

        let second = &response.pois[1];
        assert!(second.address().is_none());
        assert_eq!(
            second.location().unwrap(),
            Coordinate::new(116.397_755, 39.903_179)
        );
    }

    #[test]
    fn location_then_wgs84() {
        let wgs = first_location(FOUND).unwrap().to_wgs84();
        assert!((wgs.lng() - 116.391_184_374_042_33).abs() < 1e-12);
        assert!((wgs.lat() - 39.907_826_493_613_69).abs() < 1e-12);
    }

    #[test]
    fn odd_later_place_is_ignored() {
        let body = r#"{"status": "1", "pois": [
            {"name": "Tiananmen", "location": "116.397428,39.909230"},
            {"name": "Ghost", "location": [], "id": []}
        ]}"#;
        let location = first_location(body).unwrap();
        assert_eq!(location, Coordinate::new(116.397_428, 39.909_23));

        let response = PlaceSearchResponse::from_json(body).unwrap();
        let ghost = &response.pois[1];
        assert!(ghost.id().is_none());
        assert!(matches!(
            ghost.location(),
            Err(PoiError::MissingLocation { name }) if name == "Ghost"
        ));
    }

    #[test]
    fn nameless_place() {
        let body = r#"{"status": "1", "pois": [{"location": "116.397428,39.909230"}]}"#;
        let location = first_location(body).unwrap();
        assert_eq!(location, Coordinate::new(116.397_428, 39.909_23));

        let response = PlaceSearchResponse::from_json(body).unwrap();
        assert!(response.first().unwrap().name().is_none());
    }

    #[test]
    fn no_pois() {
        let body = r#"{"status": "1", "info": "OK", "infocode": "10000", "count": "0", "pois": []}"#;
        assert!(matches!(first_location(body), Err(PoiError::NoResults)));

        let body = r#"{"status": "1", "info": "OK", "infocode": "10000"}"#;
        assert!(matches!(first_location(body), Err(PoiError::NoResults)));
    }

    #[test]
    fn failure_status() {
        let body = r#"{"status": "0", "info": "INVALID_USER_KEY", "infocode": "10001"}"#;
        let err = first_location(body).unwrap_err();
        assert!(!err.is_quota_exceeded());
        assert_eq!(
            err.to_string(),
            "Place search failed: geocoder replied \"INVALID_USER_KEY\" (infocode 10001)"
        );
    }

    #[test]
    fn quota_exceeded() {
        let body = r#"{"status": "0", "info": "DAILY_QUERY_OVER_LIMIT", "infocode": "10003"}"#;
        let err = first_location(body).unwrap_err();
        assert!(err.is_quota_exceeded());
    }

    #[test]
    fn missing_location() {
        let body = r#"{"status": "1", "pois": [{"name": "Nowhere", "location": ""}]}"#;
        let err = first_location(body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Place search failed: place \"Nowhere\" has no location"
        );

        let body = r#"{"status": "1", "pois": [{"name": "Nowhere"}]}"#;
        assert!(matches!(
            first_location(body),
            Err(PoiError::MissingLocation { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "Location(Format)")]
    fn malformed_location() {
        let body = r#"{"status": "1", "pois": [{"name": "Broken", "location": "116.39;39.90"}]}"#;
        let _c = first_location(body).unwrap();
    }

    #[test]
    #[should_panic(expected = "Json")]
    fn not_json() {
        let _c = first_location("<html>502 Bad Gateway</html>").unwrap();
    }
}
