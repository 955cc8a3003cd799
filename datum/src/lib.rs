//! Datum shift between the Chinese GCJ-02 and the WGS-84 coordinates.
//!
//! The Chinese geocoders report positions in GCJ-02,
//! which is WGS-84 with a secret location-dependent offset of a few hundred meters.
//! Before drawing such positions on a WGS-84 map they should be shifted back.
//!
//! ```
//! use geod_datum::{Coordinate, Gcj02};
//!
//! let gate: Coordinate<Gcj02> = "116.397428,39.909230".parse().unwrap();
//! let wgs = gate.to_wgs84().rounded(6);
//! assert_eq!(wgs.to_string(), "116.391184,39.907826");
//! ```

// do not warn on older Rust versions
#![allow(unknown_lints)]
//
// The following list was generated with the command
//   $ rustc -W help | grep ' allow ' | awk '{print $1}' | tr - _ | sort | xargs -I{} echo '#![warn({})]'
//
#![warn(absolute_paths_not_starting_with_crate)]
#![warn(anonymous_parameters)]
#![warn(deprecated_in_future)]
#![warn(elided_lifetimes_in_paths)]
#![warn(explicit_outlives_requirements)]
#![warn(keyword_idents)]
#![warn(macro_use_extern_crate)]
#![warn(meta_variable_misuse)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(single_use_lifetimes)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
// conflicts with the `clippy::redundant_pub_crate`
#![allow(unreachable_pub)]
// !!! NO UNSAFE
#![forbid(unsafe_code)]
#![warn(unstable_features)]
#![warn(unused_crate_dependencies)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]
#![warn(unused_labels)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]
#![warn(unused_results)]
#![warn(variant_size_differences)]
//
// additional recommendations
#![deny(clippy::mem_forget)]
// suppress some pedantic warnings
#![allow(clippy::non_ascii_literal)]
#![allow(clippy::must_use_candidate)]
// `use super::*` in tests
#![cfg_attr(test, allow(clippy::wildcard_imports))]

// the binary and the integration tests dependencies
#[cfg(feature = "cli")]
use {anyhow as _, clap as _, tracing_subscriber as _};
#[cfg(test)]
use tempfile as _;

pub use coord::{
    Coordinate, Datum, Gcj02, NonFiniteCoordinate, ParseCoordinateError, Wgs84, RENDER_PRECISION,
};
pub use shift::{
    gcj02_to_wgs84, is_out_of_china, wgs84_to_gcj02, CHINA_MAX_LAT, CHINA_MAX_LNG, CHINA_MIN_LAT,
    CHINA_MIN_LNG, ECCENTRICITY_SQ, SEMI_MAJOR_AXIS,
};

mod coord;
#[cfg(feature = "serde")]
pub mod geojson;
#[cfg(feature = "serde")]
pub mod poi;
mod shift;
mod utils;
