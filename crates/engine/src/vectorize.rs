//! Raster-to-polygon conversion
//!
//! Every contiguous region of same-valued in-class cells (4-connectivity)
//! becomes one polygon feature tagged `gridcode`. Region geometry is the
//! exact union of its cells as row-run rectangles — no simplification, no
//! overlap, so downstream intersection areas are exact. No-data cells
//! contribute nothing.

use geo_types::{Geometry, LineString, MultiPolygon, Polygon};
use landsift_core::{AttributeValue, Feature, FeatureLayer, Raster, Result};
use std::collections::VecDeque;

/// Convert in-class raster cells into polygon features.
///
/// An all-no-data raster yields an empty layer; the caller decides whether
/// that is acceptable (a study area can legitimately contain no steep slope
/// at all).
pub fn vectorize(raster: &Raster) -> Result<FeatureLayer> {
    let (rows, cols) = raster.shape();

    let mut layer = FeatureLayer::new("vectorized");
    layer.set_crs(raster.crs().cloned());
    layer.add_field("gridcode", Some("Value"))?;

    if rows == 0 || cols == 0 {
        return Ok(layer);
    }

    let mut visited = vec![false; rows * cols];
    let idx = |row: usize, col: usize| row * cols + col;

    for start_row in 0..rows {
        for start_col in 0..cols {
            if visited[idx(start_row, start_col)] {
                continue;
            }
            let value = unsafe { raster.get_unchecked(start_row, start_col) };
            if raster.is_nodata(value) {
                visited[idx(start_row, start_col)] = true;
                continue;
            }

            // Flood-fill one region of equal-valued cells
            let mut cells = Vec::new();
            let mut queue = VecDeque::new();
            visited[idx(start_row, start_col)] = true;
            queue.push_back((start_row, start_col));

            while let Some((row, col)) = queue.pop_front() {
                cells.push((row, col));

                let mut neighbors = Vec::with_capacity(4);
                if row > 0 {
                    neighbors.push((row - 1, col));
                }
                if row + 1 < rows {
                    neighbors.push((row + 1, col));
                }
                if col > 0 {
                    neighbors.push((row, col - 1));
                }
                if col + 1 < cols {
                    neighbors.push((row, col + 1));
                }

                for (nr, nc) in neighbors {
                    if visited[idx(nr, nc)] {
                        continue;
                    }
                    let nv = unsafe { raster.get_unchecked(nr, nc) };
                    if !raster.is_nodata(nv) && nv == value {
                        visited[idx(nr, nc)] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }

            let mut feature = Feature::new(Geometry::MultiPolygon(region_geometry(
                raster, &cells,
            )));
            feature.set("gridcode", AttributeValue::Int(value.round() as i64));
            layer.push(feature);
        }
    }

    Ok(layer)
}

/// Row-run rectangle decomposition of a region's cells.
fn region_geometry(raster: &Raster, cells: &[(usize, usize)]) -> MultiPolygon<f64> {
    let mut by_row: Vec<(usize, Vec<usize>)> = Vec::new();
    for &(row, col) in cells {
        match by_row.iter_mut().find(|(r, _)| *r == row) {
            Some((_, cols)) => cols.push(col),
            None => by_row.push((row, vec![col])),
        }
    }

    let gt = raster.transform();
    let mut polys = Vec::new();

    for (row, mut row_cols) in by_row {
        row_cols.sort_unstable();
        let mut run_start = row_cols[0];
        let mut run_len = 1usize;

        let mut flush = |start: usize, len: usize, polys: &mut Vec<Polygon<f64>>| {
            let (x0, y_top) = gt.pixel_to_geo_corner(start, row);
            let (x1, _) = gt.pixel_to_geo_corner(start + len, row);
            let (_, y_bot) = gt.pixel_to_geo_corner(start, row + 1);
            polys.push(Polygon::new(
                LineString::from(vec![
                    (x0, y_bot),
                    (x1, y_bot),
                    (x1, y_top),
                    (x0, y_top),
                    (x0, y_bot),
                ]),
                vec![],
            ));
        };

        for &col in &row_cols[1..] {
            if col == run_start + run_len {
                run_len += 1;
            } else {
                flush(run_start, run_len, &mut polys);
                run_start = col;
                run_len = 1;
            }
        }
        flush(run_start, run_len, &mut polys);
    }

    MultiPolygon::new(polys)
}
