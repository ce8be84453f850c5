//! Polygon-in-polygon summarization
//!
//! For each base polygon, sum its intersection area with a reference layer
//! and count the reference features that actually overlap it. Candidate
//! pairs come from an R-tree over reference envelopes; exact intersection
//! uses polygon clipping, so shared edges and point touches contribute
//! nothing.

use crate::geom::to_multi_polygon;
use geo::{Area, BooleanOps};
use geo_types::MultiPolygon;
use landsift_core::{AreaUnit, Error, FeatureLayer, Result};
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};

/// Overlap of one base polygon with a reference layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapSummary {
    /// Total intersection area, in the requested unit
    pub area: f64,
    /// Number of reference features with a positive-area intersection
    pub count: usize,
}

impl OverlapSummary {
    /// The summary of a polygon with no overlap at all.
    pub fn none() -> Self {
        Self { area: 0.0, count: 0 }
    }
}

struct RefEntry {
    envelope: AABB<[f64; 2]>,
    geometry: MultiPolygon<f64>,
}

impl RTreeObject for RefEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Summarize the reference layer within each base feature, in base order.
///
/// Both layers must share a CRS; the result area is converted from the CRS
/// linear unit into `unit`. Base features without polygonal geometry, and
/// bases with no overlapping reference feature, yield a zero summary.
pub fn summarize_within(
    base: &FeatureLayer,
    reference: &FeatureLayer,
    unit: AreaUnit,
) -> Result<Vec<OverlapSummary>> {
    let crs = base.crs().ok_or(Error::InvalidParameter {
        name: "crs",
        value: "none".into(),
        reason: "cannot convert overlap areas without a base-layer CRS".into(),
    })?;
    if let Some(ref_crs) = reference.crs() {
        if !crs.is_equivalent(ref_crs) {
            return Err(Error::CrsMismatch(crs.identifier(), ref_crs.identifier()));
        }
    }

    let tree = RTree::bulk_load(
        reference
            .iter()
            .filter_map(|f| {
                let mp = to_multi_polygon(&f.geometry)?;
                let bb = landsift_core::BoundingBox::of_geometry(&f.geometry)?;
                Some(RefEntry {
                    envelope: AABB::from_corners([bb.min_x, bb.min_y], [bb.max_x, bb.max_y]),
                    geometry: mp,
                })
            })
            .collect(),
    );

    let crs_unit = crs.linear_unit();
    base.features()
        .par_iter()
        .map(|feature| {
            let Some(base_mp) = to_multi_polygon(&feature.geometry) else {
                return Ok(OverlapSummary::none());
            };
            let Some(bb) = landsift_core::BoundingBox::of_geometry(&feature.geometry) else {
                return Ok(OverlapSummary::none());
            };
            let envelope = AABB::from_corners([bb.min_x, bb.min_y], [bb.max_x, bb.max_y]);

            let mut raw_area = 0.0;
            let mut count = 0usize;
            for entry in tree.locate_in_envelope_intersecting(&envelope) {
                let overlap = base_mp.intersection(&entry.geometry).unsigned_area();
                if overlap > 0.0 {
                    raw_area += overlap;
                    count += 1;
                }
            }

            Ok(OverlapSummary {
                area: unit.from_square_units(raw_area, crs_unit)?,
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::{Geometry, LineString, Polygon};
    use landsift_core::{Crs, Feature, LinearUnit};

    fn feet_crs() -> Crs {
        Crs::from_epsg_with_unit(2272, LinearUnit::Feet)
    }

    fn square(min_x: f64, min_y: f64, side: f64) -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (min_x + side, min_y),
                (min_x + side, min_y + side),
                (min_x, min_y + side),
                (min_x, min_y),
            ]),
            vec![],
        ))
    }

    fn layer(name: &str, geoms: Vec<Geometry<f64>>) -> FeatureLayer {
        let mut l = FeatureLayer::with_crs(name, feet_crs());
        for g in geoms {
            l.push(Feature::new(g));
        }
        l
    }

    #[test]
    fn test_full_containment() {
        // 330 ft square inside a 660 ft parcel: 108900 sq ft = 2.5 acres
        let base = layer("parcels", vec![square(0.0, 0.0, 660.0)]);
        let reference = layer("wetlands", vec![square(100.0, 100.0, 330.0)]);

        let out = summarize_within(&base, &reference, AreaUnit::Acres).unwrap();
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].area, 2.5, epsilon = 1e-9);
        assert_eq!(out[0].count, 1);
    }

    #[test]
    fn test_partial_overlap() {
        // Reference square hangs half outside the parcel
        let base = layer("parcels", vec![square(0.0, 0.0, 660.0)]);
        let reference = layer("flood", vec![square(330.0, 0.0, 660.0)]);

        let out = summarize_within(&base, &reference, AreaUnit::Acres).unwrap();
        // Overlap is 330 x 660 ft = 217800 sq ft = 5 acres
        assert_relative_eq!(out[0].area, 5.0, epsilon = 1e-9);
        assert_eq!(out[0].count, 1);
    }

    #[test]
    fn test_no_overlap_is_zero_not_error() {
        let base = layer("parcels", vec![square(0.0, 0.0, 660.0)]);
        let reference = layer("flood", vec![square(10_000.0, 10_000.0, 100.0)]);

        let out = summarize_within(&base, &reference, AreaUnit::Acres).unwrap();
        assert_eq!(out[0], OverlapSummary::none());
    }

    #[test]
    fn test_edge_touch_does_not_count() {
        // Shares the x=660 edge only
        let base = layer("parcels", vec![square(0.0, 0.0, 660.0)]);
        let reference = layer("flood", vec![square(660.0, 0.0, 100.0)]);

        let out = summarize_within(&base, &reference, AreaUnit::Acres).unwrap();
        assert_eq!(out[0].count, 0);
        assert_eq!(out[0].area, 0.0);
    }

    #[test]
    fn test_counts_multiple_features() {
        let base = layer("parcels", vec![square(0.0, 0.0, 660.0)]);
        let reference = layer(
            "wetlands",
            vec![
                square(0.0, 0.0, 100.0),
                square(200.0, 200.0, 100.0),
                square(5_000.0, 5_000.0, 100.0),
            ],
        );

        let out = summarize_within(&base, &reference, AreaUnit::Acres).unwrap();
        assert_eq!(out[0].count, 2);
        // Two 100 ft squares: 20000 sq ft
        assert_relative_eq!(out[0].area, 20_000.0 / 43_560.0, epsilon = 1e-9);
    }

    #[test]
    fn test_result_follows_base_order() {
        let base = layer(
            "parcels",
            vec![square(0.0, 0.0, 660.0), square(10_000.0, 0.0, 660.0)],
        );
        let reference = layer("flood", vec![square(0.0, 0.0, 660.0)]);

        let out = summarize_within(&base, &reference, AreaUnit::Acres).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].area > 0.0);
        assert_eq!(out[1], OverlapSummary::none());
    }

    #[test]
    fn test_crs_mismatch_is_fatal() {
        let base = layer("parcels", vec![square(0.0, 0.0, 660.0)]);
        let mut reference = layer("flood", vec![square(0.0, 0.0, 660.0)]);
        reference.set_crs(Some(Crs::from_epsg(26918)));

        assert!(matches!(
            summarize_within(&base, &reference, AreaUnit::Acres),
            Err(Error::CrsMismatch(_, _))
        ));
    }
}
