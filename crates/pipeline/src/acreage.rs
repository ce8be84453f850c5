//! Geometry metrics stage
//!
//! Adds `GIS_ACRES` to the parcel layer, computed from the native parcel
//! geometry. This is the only place the input schema grows outside the
//! aggregation stage, and every later percent division relies on the
//! positive-area guarantee enforced here.

use landsift_core::{AreaUnit, AttributeValue, Error, FeatureLayer, Result};
use landsift_engine::GeoEngine;

/// Parcel acreage field
pub const GIS_ACRES: &str = "GIS_ACRES";
/// Its human-readable alias
pub const GIS_ACRES_ALIAS: &str = "GIS Calculated Acres";

/// Return a copy of `parcels` with `GIS_ACRES` computed per feature.
///
/// Fails fast if any parcel area is not strictly positive — a degenerate
/// parcel would poison every percent computed later.
pub fn compute_acreage<E: GeoEngine>(engine: &E, parcels: &FeatureLayer) -> Result<FeatureLayer> {
    let crs = parcels
        .crs()
        .ok_or(Error::InvalidParameter {
            name: "crs",
            value: "none".into(),
            reason: "parcel layer must carry a CRS to measure acreage".into(),
        })?
        .clone();

    let mut out = parcels.clone();
    out.add_field(GIS_ACRES, Some(GIS_ACRES_ALIAS))?;
    out.compute(GIS_ACRES, |feature| {
        let acres = engine.compute_area(&feature.geometry, AreaUnit::Acres, &crs)?;
        if acres <= 0.0 {
            return Err(Error::InvalidParameter {
                name: GIS_ACRES,
                value: format!("{acres}"),
                reason: "parcel area must be positive".into(),
            });
        }
        Ok(AttributeValue::Float(acres))
    })?;

    Ok(out)
}
