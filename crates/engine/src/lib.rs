//! # landsift Engine
//!
//! Geometry and raster operations behind the `GeoEngine` capability trait:
//!
//! - **buffer**: outward offset of a vector layer by a fixed distance
//! - **clip**: restrict a raster to a rectangle plus a polygon mask
//! - **reproject**: move a raster into a target spatial reference
//! - **reclassify**: remap cell values through an ordered range table
//! - **vectorize**: turn in-class cells into polygon features
//! - **summarize within**: per-polygon overlap area and feature count
//! - **area**: geometry area with unit conversion
//!
//! The pipeline talks only to `GeoEngine`, so it can be unit-tested against
//! a scripted fake; `PlanarEngine` is the in-memory implementation for
//! projected (planar) coordinate systems.

pub mod buffer;
pub mod clip;
mod geom;
pub mod measure;
pub mod overlay;
pub mod reclassify;
pub mod reproject;
pub mod vectorize;

pub use buffer::BufferParams;
pub use overlay::OverlapSummary;
pub use reclassify::{RemapEntry, RemapTable};

use geo_types::Geometry;
use landsift_core::{AreaUnit, BoundingBox, Crs, FeatureLayer, LinearUnit, Raster, Result};

/// The geometry/raster capability set the pipeline depends on.
///
/// Implementations are pure: every method derives a new dataset from its
/// inputs and never mutates them.
pub trait GeoEngine {
    /// Area of a geometry in `unit`, measured in the given CRS.
    fn compute_area(&self, geometry: &Geometry<f64>, unit: AreaUnit, crs: &Crs) -> Result<f64>;

    /// Outward offset of every feature by `distance` (in `unit`).
    ///
    /// Fails with `EmptyLayer` if the source has no features.
    fn buffer(&self, layer: &FeatureLayer, distance: f64, unit: LinearUnit)
        -> Result<FeatureLayer>;

    /// Restrict a raster to `rect`, masked to the exact polygon boundary of
    /// `mask` (cells whose centre falls outside the mask become no-data).
    fn clip_raster(&self, raster: &Raster, rect: BoundingBox, mask: &FeatureLayer)
        -> Result<Raster>;

    /// Transform a raster into the target spatial reference.
    fn reproject_raster(&self, raster: &Raster, target: &Crs) -> Result<Raster>;

    /// Remap cell values through an ordered range table.
    fn reclassify(&self, raster: &Raster, table: &RemapTable) -> Result<Raster>;

    /// Convert in-class cells into polygon features tagged `gridcode`.
    fn vectorize(&self, raster: &Raster) -> Result<FeatureLayer>;

    /// Per base polygon: summed intersection area (in `unit`) with the
    /// reference layer and the count of intersecting reference features.
    /// A polygon with no overlap yields `{ area: 0.0, count: 0 }`.
    fn summarize_within(
        &self,
        base: &FeatureLayer,
        reference: &FeatureLayer,
        unit: AreaUnit,
    ) -> Result<Vec<OverlapSummary>>;
}

/// In-memory engine for planar (projected) coordinate systems.
#[derive(Debug, Clone)]
pub struct PlanarEngine {
    /// Segments used to approximate buffer arcs
    pub buffer_segments: usize,
}

impl Default for PlanarEngine {
    fn default() -> Self {
        Self { buffer_segments: 16 }
    }
}

impl GeoEngine for PlanarEngine {
    fn compute_area(&self, geometry: &Geometry<f64>, unit: AreaUnit, crs: &Crs) -> Result<f64> {
        measure::area(geometry, unit, crs)
    }

    fn buffer(
        &self,
        layer: &FeatureLayer,
        distance: f64,
        unit: LinearUnit,
    ) -> Result<FeatureLayer> {
        buffer::buffer_layer(
            layer,
            distance,
            unit,
            &BufferParams { segments: self.buffer_segments },
        )
    }

    fn clip_raster(
        &self,
        raster: &Raster,
        rect: BoundingBox,
        mask: &FeatureLayer,
    ) -> Result<Raster> {
        clip::clip_raster(raster, rect, mask)
    }

    fn reproject_raster(&self, raster: &Raster, target: &Crs) -> Result<Raster> {
        reproject::reproject_raster(raster, target)
    }

    fn reclassify(&self, raster: &Raster, table: &RemapTable) -> Result<Raster> {
        reclassify::reclassify(raster, table)
    }

    fn vectorize(&self, raster: &Raster) -> Result<FeatureLayer> {
        vectorize::vectorize(raster)
    }

    fn summarize_within(
        &self,
        base: &FeatureLayer,
        reference: &FeatureLayer,
        unit: AreaUnit,
    ) -> Result<Vec<OverlapSummary>> {
        overlay::summarize_within(base, reference, unit)
    }
}
