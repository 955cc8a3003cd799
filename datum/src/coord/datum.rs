use std::fmt;

mod private {
    /// Prevents implementing [`Datum`](super::Datum) outside of the crate
    pub trait Sealed {}

    impl Sealed for super::Gcj02 {}
    impl Sealed for super::Wgs84 {}
}

/// The geodetic system the coordinate is expressed in.
///
/// The trait is sealed: only the [`Gcj02`] and [`Wgs84`] markers implement it.
pub trait Datum:
    private::Sealed + Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Human-readable name of the datum
    const NAME: &'static str;
}

/// Chinese national datum, reported by the Chinese geocoding services
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Gcj02;

/// World Geodetic System, used by the global web map renderers
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Wgs84;

impl Datum for Gcj02 {
    const NAME: &'static str = "GCJ-02";
}

impl Datum for Wgs84 {
    const NAME: &'static str = "WGS-84";
}
