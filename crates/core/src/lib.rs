//! # landsift Core
//!
//! Core types and I/O for the landsift parcel-suitability pipeline.
//!
//! This crate provides:
//! - `Raster`: georeferenced f64 grid with no-data handling
//! - `GeoTransform`: affine transformation for georeferencing
//! - `Crs`: coordinate reference system with a declared linear unit
//! - `Feature` / `FeatureLayer`: vector features with an attribute schema
//! - `Workspace`: named-dataset store with overwrite semantics
//! - GeoTIFF and GeoJSON I/O

pub mod bounds;
pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod units;
pub mod vector;
pub mod workspace;

pub use bounds::BoundingBox;
pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster};
pub use units::{AreaUnit, LinearUnit};
pub use vector::{AttributeValue, Feature, FeatureLayer, FieldDef};
pub use workspace::Workspace;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bounds::BoundingBox;
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster};
    pub use crate::units::{AreaUnit, LinearUnit};
    pub use crate::vector::{AttributeValue, Feature, FeatureLayer};
    pub use crate::workspace::Workspace;
}
