//! Raster clipping
//!
//! Restrict a raster to an analysis rectangle, additionally masked to the
//! exact polygon boundary of a layer: cells whose centre falls outside the
//! mask become no-data even when they sit inside the rectangle.

use crate::geom::to_multi_polygon;
use geo::Intersects;
use geo_types::{MultiPolygon, Point};
use landsift_core::{BoundingBox, Error, FeatureLayer, GeoTransform, Raster, Result};

/// Clip a raster to `rect`, masked by the polygons of `mask`.
///
/// The output grid is the pixel window covering the intersection of `rect`
/// with the raster bounds; cells outside the mask carry NaN. Fails with
/// `NoCellsInExtent` when the window is empty or no cell survives the mask.
pub fn clip_raster(raster: &Raster, rect: BoundingBox, mask: &FeatureLayer) -> Result<Raster> {
    if mask.is_empty() {
        return Err(Error::EmptyLayer(mask.name().to_string()));
    }
    // Pixel-window arithmetic is meaningless across coordinate systems
    if let (Some(rc), Some(mc)) = (raster.crs(), mask.crs()) {
        if !rc.is_equivalent(mc) {
            return Err(Error::CrsMismatch(rc.identifier(), mc.identifier()));
        }
    }

    let masks: Vec<(BoundingBox, MultiPolygon<f64>)> = mask
        .iter()
        .filter_map(|f| {
            let mp = to_multi_polygon(&f.geometry)?;
            let bb = BoundingBox::of_geometry(&f.geometry)?;
            Some((bb, mp))
        })
        .collect();
    if masks.is_empty() {
        return Err(Error::Geometry(format!(
            "mask layer '{}' has no polygon features",
            mask.name()
        )));
    }

    let (rows, cols) = raster.shape();
    let gt = raster.transform();

    // Pixel window covering the rectangle, clamped to the raster
    let (c0, r0) = gt.geo_to_pixel(rect.min_x, rect.max_y);
    let (c1, r1) = gt.geo_to_pixel(rect.max_x, rect.min_y);
    let col0 = c0.floor().max(0.0) as usize;
    let row0 = r0.floor().max(0.0) as usize;
    let col1 = (c1.ceil() as isize).clamp(0, cols as isize) as usize;
    let row1 = (r1.ceil() as isize).clamp(0, rows as isize) as usize;

    if col0 >= col1 || row0 >= row1 {
        return Err(Error::NoCellsInExtent);
    }

    let out_rows = row1 - row0;
    let out_cols = col1 - col0;
    let mut out = raster.with_same_meta(out_rows, out_cols);
    let (ox, oy) = gt.pixel_to_geo_corner(col0, row0);
    out.set_transform(GeoTransform::new(ox, oy, gt.pixel_width, gt.pixel_height));
    out.set_nodata(Some(f64::NAN));

    let mut valid = 0usize;
    for row in 0..out_rows {
        for col in 0..out_cols {
            let value = unsafe { raster.get_unchecked(row0 + row, col0 + col) };
            let (x, y) = gt.pixel_to_geo(col0 + col, row0 + row);

            let keep = !raster.is_nodata(value)
                && rect.contains_point(x, y)
                && masks.iter().any(|(bb, mp)| {
                    bb.contains_point(x, y) && mp.intersects(&Point::new(x, y))
                });

            let cell = if keep {
                valid += 1;
                value
            } else {
                f64::NAN
            };
            out.set(row, col, cell)?;
        }
    }

    if valid == 0 {
        return Err(Error::NoCellsInExtent);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry, LineString, Polygon};
    use landsift_core::Feature;

    /// 10x10 raster, cell size 10, origin (0, 100): covers (0,0)-(100,100)
    fn base_raster() -> Raster {
        let mut r = Raster::from_vec((0..100).map(f64::from).collect(), 10, 10).unwrap();
        r.set_transform(GeoTransform::new(0.0, 100.0, 10.0, -10.0));
        r
    }

    fn mask(min: f64, max: f64) -> FeatureLayer {
        let mut layer = FeatureLayer::new("parcel_buffer");
        layer.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (min, min),
                (max, min),
                (max, max),
                (min, max),
                (min, min),
            ]),
            vec![],
        ))));
        layer
    }

    #[test]
    fn test_clip_window_shape() {
        let raster = base_raster();
        let rect = BoundingBox::new(20.0, 20.0, 60.0, 60.0);
        let clipped = clip_raster(&raster, rect, &mask(20.0, 60.0)).unwrap();
        assert_eq!(clipped.shape(), (4, 4));
        // Output origin snaps to the source grid
        assert_eq!(clipped.transform().origin_x, 20.0);
        assert_eq!(clipped.transform().origin_y, 60.0);
    }

    #[test]
    fn test_mask_excludes_cells_inside_rectangle() {
        let raster = base_raster();
        // Rectangle covers the whole raster, mask only the lower-left quarter
        let rect = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let clipped = clip_raster(&raster, rect, &mask(0.0, 50.0)).unwrap();
        assert_eq!(clipped.shape(), (10, 10));
        // Cell centres inside the mask survive, the rest are NaN
        assert_eq!(clipped.valid_count(), 25);
        assert!(clipped.get(0, 0).unwrap().is_nan()); // top-left, y=95
        assert!(!clipped.get(9, 0).unwrap().is_nan()); // bottom-left, y=5
    }

    #[test]
    fn test_disjoint_extent_is_fatal() {
        let raster = base_raster();
        let rect = BoundingBox::new(500.0, 500.0, 600.0, 600.0);
        assert!(matches!(
            clip_raster(&raster, rect, &mask(500.0, 600.0)),
            Err(Error::NoCellsInExtent)
        ));
    }

    #[test]
    fn test_mask_outside_rect_is_fatal() {
        let raster = base_raster();
        // Window intersects the raster, but every surviving centre misses the mask
        let rect = BoundingBox::new(0.0, 0.0, 40.0, 40.0);
        assert!(matches!(
            clip_raster(&raster, rect, &mask(200.0, 300.0)),
            Err(Error::NoCellsInExtent)
        ));
    }

    #[test]
    fn test_cross_crs_clip_is_fatal() {
        use landsift_core::Crs;

        let mut raster = base_raster();
        raster.set_crs(Some(Crs::wgs84()));
        let mut parcel_mask = mask(0.0, 100.0);
        parcel_mask.set_crs(Some(Crs::from_epsg(2272)));

        let rect = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            clip_raster(&raster, rect, &parcel_mask),
            Err(Error::CrsMismatch(_, _))
        ));
    }

    #[test]
    fn test_empty_mask_is_fatal() {
        let raster = base_raster();
        let rect = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let empty = FeatureLayer::new("parcel_buffer");
        assert!(matches!(
            clip_raster(&raster, rect, &empty),
            Err(Error::EmptyLayer(_))
        ));
    }
}
