//! Named-dataset workspace
//!
//! Every stage of the pipeline writes its output as a new named dataset in a
//! shared workspace directory; nothing is mutated after creation. Rerunning
//! the pipeline overwrites same-named datasets when `overwrite_output` is
//! set, which is the only supported retry mechanism.

use crate::error::{Error, Result};
use crate::io::{read_geojson_layer, read_geotiff, write_geojson_layer, write_geotiff};
use crate::raster::Raster;
use crate::vector::FeatureLayer;
use std::fs;
use std::path::{Path, PathBuf};

/// A workspace directory holding named layer and raster datasets.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    overwrite_output: bool,
}

impl Workspace {
    /// Open (creating if needed) a workspace rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, overwrite_output: bool) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            overwrite_output,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn overwrite_output(&self) -> bool {
        self.overwrite_output
    }

    /// Path a layer dataset of this name lives at
    pub fn layer_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.geojson"))
    }

    /// Path a raster dataset of this name lives at
    pub fn raster_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.tif"))
    }

    fn guard(&self, name: &str, path: &Path) -> Result<()> {
        if !self.overwrite_output && path.exists() {
            return Err(Error::DatasetExists(name.to_string()));
        }
        Ok(())
    }

    /// Persist a layer under `name`, overwriting per the workspace policy.
    pub fn write_layer(&self, name: &str, layer: &FeatureLayer) -> Result<PathBuf> {
        let path = self.layer_path(name);
        self.guard(name, &path)?;
        write_geojson_layer(layer, &path)?;
        Ok(path)
    }

    /// Persist a raster under `name`, overwriting per the workspace policy.
    pub fn write_raster(&self, name: &str, raster: &Raster) -> Result<PathBuf> {
        let path = self.raster_path(name);
        self.guard(name, &path)?;
        write_geotiff(raster, &path)?;
        Ok(path)
    }

    /// Read a previously written layer dataset.
    pub fn read_layer(&self, name: &str) -> Result<FeatureLayer> {
        read_geojson_layer(self.layer_path(name), name)
    }

    /// Read a previously written raster dataset.
    pub fn read_raster(&self, name: &str) -> Result<Raster> {
        read_geotiff(self.raster_path(name))
    }
}
