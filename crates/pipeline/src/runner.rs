//! Pipeline orchestrator
//!
//! Runs the enrichment stages in a fixed, strictly sequential order and
//! persists every stage output as a named workspace dataset. Any failure
//! aborts the run; datasets written before the failure stay in the
//! workspace for inspection.

use crate::acreage;
use crate::aggregate::{self, Metric};
use crate::buffers;
use crate::config::{PipelineConfig, PipelineInputs};
use crate::raster_prep::{self, RasterSource};
use geo_types::Geometry;
use landsift_core::{Error, FeatureLayer, Result, Workspace};
use landsift_engine::GeoEngine;
use tracing::info;

/// The parcel enrichment pipeline, generic over its geometry engine.
pub struct Pipeline<E> {
    engine: E,
    workspace: Workspace,
}

impl<E: GeoEngine> Pipeline<E> {
    /// Open the workspace and bind the engine.
    pub fn new(engine: E, config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            engine,
            workspace: Workspace::open(&config.workspace, config.overwrite_output)?,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Run every stage and return the final enriched parcel layer
    /// (also persisted as `parcel_analysis_final`).
    pub fn run(&self, inputs: &PipelineInputs) -> Result<FeatureLayer> {
        validate(inputs)?;

        info!("computing parcel acreage");
        let parcels = acreage::compute_acreage(&self.engine, &inputs.parcels)?;
        let target = parcels
            .crs()
            .cloned()
            .ok_or(Error::InvalidParameter {
                name: "crs",
                value: "none".into(),
                reason: "parcel layer must carry a CRS".into(),
            })?;

        let parcel_buffer = buffers::parcel_buffer(&self.engine, &self.workspace, &parcels)?;
        let roads_buffer = buffers::road_buffer(&self.engine, &self.workspace, &inputs.roads)?;

        let slope_polygons = raster_prep::prepare(
            &self.engine,
            &self.workspace,
            &RasterSource::slope(),
            &inputs.slope,
            &parcel_buffer,
            &target,
        )?;
        let parcels = self.aggregate(parcels, &slope_polygons, Metric::SLOPE, "parcel_slope")?;
        let parcels = self.aggregate(parcels, &roads_buffer, Metric::ROADS, "parcel_roads")?;
        let parcels = self.aggregate(
            parcels,
            &inputs.flood_zones,
            Metric::FLOOD_ZONE,
            "parcel_flood_zones",
        )?;
        let parcels =
            self.aggregate(parcels, &inputs.wetlands, Metric::WETLANDS, "parcel_wetlands")?;

        let forest_polygons = raster_prep::prepare(
            &self.engine,
            &self.workspace,
            &RasterSource::forest(),
            &inputs.forest,
            &parcel_buffer,
            &target,
        )?;
        let parcels =
            self.aggregate(parcels, &forest_polygons, Metric::FOREST, "parcel_analysis_final")?;

        info!(parcels = parcels.len(), "pipeline complete");
        Ok(parcels)
    }

    fn aggregate(
        &self,
        parcels: FeatureLayer,
        reference: &FeatureLayer,
        metric: Metric,
        dataset: &str,
    ) -> Result<FeatureLayer> {
        info!(reference = reference.name(), dataset, "aggregating");
        let mut out = aggregate::summarize(&self.engine, &parcels, reference, metric)?;
        out.set_name(dataset);
        self.workspace.write_layer(dataset, &out)?;
        Ok(out)
    }
}

/// Up-front input validation: every vector layer non-empty, parcels
/// polygonal. Runs before any dataset is written.
fn validate(inputs: &PipelineInputs) -> Result<()> {
    for layer in [
        &inputs.parcels,
        &inputs.flood_zones,
        &inputs.wetlands,
        &inputs.roads,
    ] {
        if layer.is_empty() {
            return Err(Error::EmptyLayer(layer.name().to_string()));
        }
    }
    for feature in inputs.parcels.iter() {
        if !matches!(
            feature.geometry,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_)
        ) {
            return Err(Error::Geometry(format!(
                "parcel layer '{}' contains non-polygon geometry",
                inputs.parcels.name()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, Polygon};
    use landsift_core::{Crs, Feature, LinearUnit, Raster};

    fn feet_crs() -> Crs {
        Crs::from_epsg_with_unit(2272, LinearUnit::Feet)
    }

    fn polygon_layer(name: &str) -> FeatureLayer {
        let mut layer = FeatureLayer::with_crs(name, feet_crs());
        layer.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![],
        ))));
        layer
    }

    fn inputs() -> PipelineInputs {
        let mut roads = FeatureLayer::with_crs("roads", feet_crs());
        roads.push(Feature::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
        ]))));
        PipelineInputs {
            parcels: polygon_layer("parcels"),
            flood_zones: polygon_layer("flood_zones"),
            wetlands: polygon_layer("wetlands"),
            roads,
            slope: Raster::filled(2, 2, 10.0),
            forest: Raster::filled(2, 2, 42.0),
        }
    }

    #[test]
    fn test_validate_accepts_good_inputs() {
        assert!(validate(&inputs()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_layer() {
        let mut bad = inputs();
        bad.wetlands = FeatureLayer::with_crs("wetlands", feet_crs());
        assert!(matches!(
            validate(&bad),
            Err(Error::EmptyLayer(name)) if name == "wetlands"
        ));
    }

    #[test]
    fn test_validate_rejects_point_parcels() {
        let mut bad = inputs();
        bad.parcels = FeatureLayer::with_crs("parcels", feet_crs());
        bad.parcels
            .push(Feature::new(Geometry::Point(Point::new(0.0, 0.0))));
        assert!(matches!(validate(&bad), Err(Error::Geometry(_))));
    }
}
