//! Pipeline configuration and input bundle

use landsift_core::{FeatureLayer, Raster};
use std::path::PathBuf;

/// Run configuration for the enrichment pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory every stage writes its named datasets into
    pub workspace: PathBuf,
    /// Replace same-named datasets from earlier runs instead of failing
    pub overwrite_output: bool,
}

impl PipelineConfig {
    /// Config with overwrite enabled, the normal mode for reruns.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            overwrite_output: true,
        }
    }
}

/// The six source datasets of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// Parcel polygons to enrich
    pub parcels: FeatureLayer,
    /// Flood zone polygons
    pub flood_zones: FeatureLayer,
    /// Wetland polygons
    pub wetlands: FeatureLayer,
    /// Road centerlines
    pub roads: FeatureLayer,
    /// Slope raster, percent slope per cell
    pub slope: Raster,
    /// Land-cover raster carrying forest class codes
    pub forest: Raster,
}
