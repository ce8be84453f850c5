//! Raster reclassification
//!
//! Remap cell values through an ordered range table into a suitability mask:
//! matched values take the entry's output, unmatched values fall to the
//! table default. No-data output is NaN, which drops the cell from all
//! downstream area computation.

use landsift_core::{Error, Raster, Result};
use ndarray::Array2;
use rayon::prelude::*;

/// One remap entry: an inclusive value range and its output.
///
/// `output = None` sends matching cells to no-data.
#[derive(Debug, Clone)]
pub struct RemapEntry {
    /// Minimum value (inclusive)
    pub low: f64,
    /// Maximum value (inclusive)
    pub high: f64,
    /// Output value, or None for no-data
    pub output: Option<f64>,
}

impl RemapEntry {
    /// Map `[low, high]` to `value`
    pub fn to_value(low: f64, high: f64, value: f64) -> Self {
        Self { low, high, output: Some(value) }
    }

    /// Map `[low, high]` to no-data
    pub fn to_nodata(low: f64, high: f64) -> Self {
        Self { low, high, output: None }
    }

    fn matches(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// An ordered remap table. The first matching entry wins, so adjacent
/// entries sharing a boundary value resolve in favor of the earlier entry
/// (slope 30 is suitable under `[0,30]=1, [30,100]=nodata`).
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    pub entries: Vec<RemapEntry>,
    /// Output for values matching no entry; None (the default) is no-data.
    pub default: Option<f64>,
}

impl RemapTable {
    pub fn new(entries: Vec<RemapEntry>) -> Self {
        Self { entries, default: None }
    }

    fn remap(&self, value: f64) -> Option<f64> {
        for entry in &self.entries {
            if entry.matches(value) {
                return entry.output;
            }
        }
        self.default
    }
}

/// Reclassify a raster through `table`.
///
/// No-data cells stay no-data; everything else is remapped. The output uses
/// NaN as its no-data value.
pub fn reclassify(raster: &Raster, table: &RemapTable) -> Result<Raster> {
    let (rows, cols) = raster.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let val = unsafe { raster.get_unchecked(row, col) };
                if raster.is_nodata(val) {
                    continue;
                }
                if let Some(mapped) = table.remap(val) {
                    row_data[col] = mapped;
                }
            }
            row_data
        })
        .collect();

    let mut output = raster.with_same_meta(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}
