//! The itinerary as a GeoJSON `FeatureCollection`.
//!
//! The trip planner produces the collection in GCJ-02 (the coordinates of the
//! Chinese geocoder), while the map renderer draws in WGS-84.
//! Every type here is tagged with the datum of its positions,
//! so the collection can be shifted exactly once.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    coord::{Coordinate, Datum, Gcj02, Wgs84},
    enum_trivial_from_impl,
};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

/// The whole itinerary: a route line and the points of interest along it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct FeatureCollection<D: Datum> {
    #[serde(rename = "type")]
    tag: CollectionTag,
    /// The route and its stops
    pub features: Vec<Feature<D>>,
}

/// A single map object with its description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Feature<D: Datum> {
    #[serde(rename = "type")]
    tag: FeatureTag,
    /// What to show in the info card
    pub properties: Properties<D>,
    /// Where to draw
    pub geometry: Geometry<D>,
}

/// The shape of the feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", bound = "")]
pub enum Geometry<D: Datum> {
    /// Single position of a point of interest
    Point {
        /// `[lng, lat]`
        coordinates: Coordinate<D>,
    },
    /// The route polyline
    LineString {
        /// `[[lng, lat], ...]`
        coordinates: Vec<Coordinate<D>>,
    },
}

/// How the renderer should treat the feature
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// A stop of the trip
    #[default]
    Point,
    /// The trip's route
    Line,
}

/// The description of a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
#[allow(missing_docs)]
pub struct Properties<D: Datum> {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub title: String,
    /// The order of the stop in the route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Line width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartData>,
    /// The copy of the point's position for the info card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate<D>>,
}

/// The chart attached to a point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// `bar`, `line` or `pie`
    #[serde(rename = "type")]
    pub kind: String,
    /// Chart caption
    pub title: String,
    /// Labels of the X axis (bar and line charts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<Vec<String>>,
    /// The data series
    pub series: Vec<ChartSeriesItem>,
}

/// One series of a chart.
///
/// The pie charts use `name` and `value`, the others `title` and `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ChartSeriesItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f64>>,
}

#[derive(Debug)]
/// The payload cannot be read or written
pub enum GeoJsonError {
    /// Malformed JSON or unexpected structure
    Json(serde_json::Error),
}

enum_trivial_from_impl!(serde_json::Error => GeoJsonError:Json);

impl fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid feature collection: ")?;
        match self {
            Self::Json(inner) => write!(f, "{}", inner),
        }
    }
}

impl Error for GeoJsonError {}

impl<D: Datum> FeatureCollection<D> {
    /// Construct a collection of the given features
    pub fn new(features: Vec<Feature<D>>) -> Self {
        Self {
            tag: CollectionTag::FeatureCollection,
            features,
        }
    }

    /// Read the collection from the JSON text.
    ///
    /// # Errors
    /// When the text is not a valid feature collection.
    pub fn from_json(json: &str) -> Result<Self, GeoJsonError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the collection as an indented JSON text.
    ///
    /// # Errors
    /// Practically impossible, as every part of the collection is serializable.
    pub fn to_json_pretty(&self) -> Result<String, GeoJsonError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The number of positions in all the geometries
    pub fn positions_count(&self) -> usize {
        self.features
            .iter()
            .map(|feature| match &feature.geometry {
                Geometry::Point { .. } => 1,
                Geometry::LineString { coordinates } => coordinates.len(),
            })
            .sum()
    }
}

impl<D: Datum> Default for FeatureCollection<D> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<D: Datum> Feature<D> {
    /// Construct a point of interest
    pub fn point(properties: Properties<D>, coordinates: Coordinate<D>) -> Self {
        Self {
            tag: FeatureTag::Feature,
            properties,
            geometry: Geometry::Point { coordinates },
        }
    }

    /// Construct a route
    pub fn line(properties: Properties<D>, coordinates: Vec<Coordinate<D>>) -> Self {
        Self {
            tag: FeatureTag::Feature,
            properties,
            geometry: Geometry::LineString { coordinates },
        }
    }
}

impl<D: Datum> Properties<D> {
    /// Minimal description with the title only
    pub fn titled(kind: FeatureKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Self::default()
        }
    }

    fn with_coordinates<T: Datum>(&self, coordinates: Option<Coordinate<T>>) -> Properties<T> {
        Properties {
            kind: self.kind,
            title: self.title.clone(),
            index: self.index,
            width: self.width,
            category: self.category.clone(),
            desc: self.desc.clone(),
            address: self.address.clone(),
            open_time: self.open_time.clone(),
            ticket_price: self.ticket_price.clone(),
            rating: self.rating,
            tags: self.tags.clone(),
            chart_data: self.chart_data.clone(),
            coordinates,
        }
    }
}

#[derive(Debug, Default)]
struct ShiftStats {
    shifted: usize,
    bypassed: usize,
}

impl ShiftStats {
    fn shift(&mut self, coord: Coordinate<Gcj02>, precision: Option<u32>) -> Coordinate<Wgs84> {
        if coord.is_out_of_china() {
            self.bypassed += 1;
        } else {
            self.shifted += 1;
        }

        shift_position(coord, precision)
    }
}

fn shift_position(coord: Coordinate<Gcj02>, precision: Option<u32>) -> Coordinate<Wgs84> {
    let wgs = coord.to_wgs84();
    precision.map_or(wgs, |digits| wgs.rounded(digits))
}

impl FeatureCollection<Gcj02> {
    /// Shift every position of the collection into WGS-84.
    ///
    /// The position of a point is also copied into its `properties.coordinates`.
    /// When the `precision` is given, the shifted numbers are rounded
    /// to that many decimal digits.
    pub fn to_wgs84(&self, precision: Option<u32>) -> FeatureCollection<Wgs84> {
        let (wgs, stats) = self.shift(precision);
        debug!(
            features = self.features.len(),
            shifted = stats.shifted,
            bypassed = stats.bypassed,
            "Feature collection converted into WGS-84"
        );
        wgs
    }

    fn shift(&self, precision: Option<u32>) -> (FeatureCollection<Wgs84>, ShiftStats) {
        let mut stats = ShiftStats::default();
        let features = self
            .features
            .iter()
            .map(|feature| feature.shift(&mut stats, precision))
            .collect();
        (FeatureCollection::new(features), stats)
    }
}

impl Feature<Gcj02> {
    /// Shift the feature into WGS-84 (see [`FeatureCollection::to_wgs84`])
    pub fn to_wgs84(&self, precision: Option<u32>) -> Feature<Wgs84> {
        self.shift(&mut ShiftStats::default(), precision)
    }

    fn shift(&self, stats: &mut ShiftStats, precision: Option<u32>) -> Feature<Wgs84> {
        match &self.geometry {
            Geometry::Point { coordinates } => {
                let wgs = stats.shift(*coordinates, precision);
                Feature::point(self.properties.with_coordinates(Some(wgs)), wgs)
            }
            Geometry::LineString { coordinates } => {
                trace!(
                    title = %self.properties.title,
                    vertices = coordinates.len(),
                    "Shifting the route"
                );
                let line = coordinates
                    .iter()
                    .map(|&coord| stats.shift(coord, precision))
                    .collect();
                // not a geometry position, so not counted
                let own = self
                    .properties
                    .coordinates
                    .map(|coord| shift_position(coord, precision));
                Feature::line(self.properties.with_coordinates(own), line)
            }
        }
    }
}
