//! Linear and area units
//!
//! Buffer distances ("1 mile", "150 feet") and area results ("acres") carry
//! explicit units; geometry work happens in the units of the layer's CRS, so
//! everything funnels through these conversions.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const METRES_PER_FOOT: f64 = 0.3048;
const METRES_PER_MILE: f64 = 1_609.344;
const SQ_METRES_PER_ACRE: f64 = 4_046.856_422_4;
const SQ_FEET_PER_ACRE: f64 = 43_560.0;

/// Linear measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearUnit {
    Metres,
    Feet,
    Miles,
    /// Geographic CRS unit; carries no fixed metric length, so distance and
    /// area conversions through it fail.
    Degrees,
}

impl LinearUnit {
    /// Length of one unit in metres, if the unit is metric-convertible.
    pub fn in_metres(self) -> Option<f64> {
        match self {
            LinearUnit::Metres => Some(1.0),
            LinearUnit::Feet => Some(METRES_PER_FOOT),
            LinearUnit::Miles => Some(METRES_PER_MILE),
            LinearUnit::Degrees => None,
        }
    }

    /// Parse a unit from its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "metres" => Some(LinearUnit::Metres),
            "feet" => Some(LinearUnit::Feet),
            "miles" => Some(LinearUnit::Miles),
            "degrees" => Some(LinearUnit::Degrees),
            _ => None,
        }
    }

    /// Convert a length from this unit into `target` units.
    pub fn convert(self, value: f64, target: LinearUnit) -> Result<f64> {
        if self == target {
            return Ok(value);
        }
        let from = self
            .in_metres()
            .ok_or_else(|| degrees_error("distance", self))?;
        let to = target
            .in_metres()
            .ok_or_else(|| degrees_error("distance", target))?;
        Ok(value * from / to)
    }
}

impl fmt::Display for LinearUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinearUnit::Metres => "metres",
            LinearUnit::Feet => "feet",
            LinearUnit::Miles => "miles",
            LinearUnit::Degrees => "degrees",
        };
        write!(f, "{s}")
    }
}

/// Area measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaUnit {
    Acres,
    SquareMetres,
    SquareFeet,
}

impl AreaUnit {
    /// Convert an area expressed in square CRS units into this unit.
    ///
    /// `crs_unit` is the linear unit of the coordinate system the area was
    /// measured in.
    pub fn from_square_units(self, area: f64, crs_unit: LinearUnit) -> Result<f64> {
        let metre = crs_unit
            .in_metres()
            .ok_or_else(|| degrees_error("area", crs_unit))?;
        let sq_metres = area * metre * metre;
        Ok(match self {
            AreaUnit::SquareMetres => sq_metres,
            AreaUnit::SquareFeet => sq_metres / (METRES_PER_FOOT * METRES_PER_FOOT),
            AreaUnit::Acres => sq_metres / SQ_METRES_PER_ACRE,
        })
    }
}

fn degrees_error(what: &'static str, unit: LinearUnit) -> Error {
    Error::InvalidParameter {
        name: what,
        value: unit.to_string(),
        reason: "geographic units have no fixed metric length; project first".into(),
    }
}
