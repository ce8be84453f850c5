//! Geometric area measurement with unit conversion

use crate::geom::to_multi_polygon;
use geo::Area;
use geo_types::Geometry;
use landsift_core::{AreaUnit, Crs, Result};

/// Area of a geometry in `unit`, measured in the given CRS.
///
/// Non-areal geometries (points, lines) have zero area. The CRS must carry a
/// metric-convertible linear unit; geographic CRS are rejected.
pub fn area(geom: &Geometry<f64>, unit: AreaUnit, crs: &Crs) -> Result<f64> {
    let raw = match to_multi_polygon(geom) {
        Some(mp) => mp.unsigned_area(),
        None => 0.0,
    };
    unit.from_square_units(raw, crs.linear_unit())
}
