//! # landsift Pipeline
//!
//! The parcel suitability enrichment pipeline. Starting from parcel
//! polygons and four reference datasets (flood zones, wetlands, roads, a
//! slope raster, and a land-cover raster), it computes per-parcel acreage,
//! overlap area and percent metrics, and a road proximity flag, persisting
//! every intermediate as a named workspace dataset:
//!
//! 1. geometry metrics — `GIS_ACRES` from native parcel geometry
//! 2. buffers — 1 mile analysis halo, 150 ft road halo
//! 3. raster preparation — clip, reproject, reclassify, vectorize
//! 4. aggregation — acres/percent fields and the yes/no road flag
//!
//! Stages run strictly in order and abort on first error; reruns recover by
//! overwriting same-named datasets.

pub mod acreage;
pub mod aggregate;
pub mod buffers;
pub mod config;
pub mod raster_prep;
pub mod runner;

pub use acreage::{compute_acreage, GIS_ACRES};
pub use aggregate::{summarize, Metric, MetricKind, ROAD_WITHIN_150FT};
pub use buffers::{PARCEL_BUFFER_MILES, ROAD_BUFFER_FEET};
pub use config::{PipelineConfig, PipelineInputs};
pub use raster_prep::RasterSource;
pub use runner::Pipeline;
