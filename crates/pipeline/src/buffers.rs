//! Buffer stage
//!
//! Two fixed buffers drive the analysis: a 1 mile halo around the parcels
//! bounds every raster operation, and a 150 ft halo around the roads feeds
//! the proximity flag.

use landsift_core::{FeatureLayer, LinearUnit, Result, Workspace};
use landsift_engine::GeoEngine;
use tracing::info;

/// Analysis buffer distance around parcels, in miles
pub const PARCEL_BUFFER_MILES: f64 = 1.0;
/// Proximity buffer distance around roads, in feet
pub const ROAD_BUFFER_FEET: f64 = 150.0;

/// Buffer the parcels by one mile and persist as `parcel_buffer`.
pub fn parcel_buffer<E: GeoEngine>(
    engine: &E,
    workspace: &Workspace,
    parcels: &FeatureLayer,
) -> Result<FeatureLayer> {
    info!(distance_miles = PARCEL_BUFFER_MILES, "buffering parcels");
    let mut out = engine.buffer(parcels, PARCEL_BUFFER_MILES, LinearUnit::Miles)?;
    out.set_name("parcel_buffer");
    workspace.write_layer("parcel_buffer", &out)?;
    Ok(out)
}

/// Buffer the roads by 150 feet and persist as `roads_buffer`.
pub fn road_buffer<E: GeoEngine>(
    engine: &E,
    workspace: &Workspace,
    roads: &FeatureLayer,
) -> Result<FeatureLayer> {
    info!(distance_feet = ROAD_BUFFER_FEET, "buffering roads");
    let mut out = engine.buffer(roads, ROAD_BUFFER_FEET, LinearUnit::Feet)?;
    out.set_name("roads_buffer");
    workspace.write_layer("roads_buffer", &out)?;
    Ok(out)
}
