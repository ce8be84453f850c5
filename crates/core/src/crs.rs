//! Coordinate Reference System handling

use crate::units::LinearUnit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation.
///
/// EPSG-code based, with a declared linear unit so area and distance
/// conversions don't need a projection database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    epsg: u32,
    unit: LinearUnit,
}

impl Crs {
    /// Create a CRS from an EPSG code, assuming metre units.
    pub fn from_epsg(code: u32) -> Self {
        let unit = if code == 4326 {
            LinearUnit::Degrees
        } else {
            LinearUnit::Metres
        };
        Self { epsg: code, unit }
    }

    /// Create a CRS from an EPSG code with an explicit linear unit
    /// (US state-plane systems are commonly in feet).
    pub fn from_epsg_with_unit(code: u32, unit: LinearUnit) -> Self {
        Self { epsg: code, unit }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// UTM zone CRS (EPSG 326xx north / 327xx south), metre units.
    pub fn utm(zone: u32, north: bool) -> Self {
        let code = if north { 32600 + zone } else { 32700 + zone };
        Self::from_epsg(code)
    }

    /// EPSG code
    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Linear unit of the coordinate system
    pub fn linear_unit(&self) -> LinearUnit {
        self.unit
    }

    /// Whether this is WGS84 geographic
    pub fn is_geographic(&self) -> bool {
        self.epsg == 4326
    }

    /// Parse a UTM EPSG code into `(zone, is_north)`.
    ///
    /// - EPSG 326xx -> zone xx, North hemisphere
    /// - EPSG 327xx -> zone xx, South hemisphere
    pub fn utm_zone(&self) -> Option<(u32, bool)> {
        if (32601..=32660).contains(&self.epsg) {
            Some((self.epsg - 32600, true))
        } else if (32701..=32760).contains(&self.epsg) {
            Some((self.epsg - 32700, false))
        } else {
            None
        }
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        self.epsg == other.epsg
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}
