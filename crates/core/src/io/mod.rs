//! I/O operations for reading and writing geospatial data

mod geojson_io;
mod geotiff;

pub use geojson_io::{read_geojson_layer, write_geojson_layer};
pub use geotiff::{read_geotiff, write_geotiff};
