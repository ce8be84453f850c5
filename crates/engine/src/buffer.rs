//! Buffer operations
//!
//! Outward offset of a layer's features by a fixed distance. Curves are
//! approximated with vertex circles and per-segment rectangles (capsules);
//! the parts are not dissolved, since downstream use only needs the combined
//! extent and, for road proximity, the raw footprint for overlay.

use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use landsift_core::{Error, Feature, FeatureLayer, LinearUnit, Result};
use std::f64::consts::PI;

/// Parameters for buffer operations
#[derive(Debug, Clone)]
pub struct BufferParams {
    /// Number of segments to approximate circular arcs
    pub segments: usize,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self { segments: 16 }
    }
}

/// Buffer every feature of a layer outward by `distance` (in `unit`).
///
/// The distance is converted into the layer's CRS units before any geometry
/// work. Each output feature is the multipolygon of its source feature's
/// offset parts.
///
/// Fails with `EmptyLayer` if the source has no features — a buffer of
/// nothing has no extent to hand downstream.
pub fn buffer_layer(
    layer: &FeatureLayer,
    distance: f64,
    unit: LinearUnit,
    params: &BufferParams,
) -> Result<FeatureLayer> {
    if layer.is_empty() {
        return Err(Error::EmptyLayer(layer.name().to_string()));
    }
    let crs = layer.crs().ok_or(Error::InvalidParameter {
        name: "crs",
        value: "none".into(),
        reason: "cannot convert a buffer distance without a layer CRS".into(),
    })?;

    let r = unit.convert(distance, crs.linear_unit())?;
    if r <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "distance",
            value: format!("{distance} {unit}"),
            reason: "buffer distance must be positive".into(),
        });
    }

    let n = params.segments.max(4);
    let mut out = FeatureLayer::with_crs(format!("{}_buffer", layer.name()), crs.clone());
    for feature in layer.iter() {
        let mut parts = Vec::new();
        offset_parts(&feature.geometry, r, n, &mut parts);
        out.push(Feature::new(Geometry::MultiPolygon(MultiPolygon::new(parts))));
    }
    Ok(out)
}

/// Collect the offset polygons of one geometry into `parts`.
fn offset_parts(geom: &Geometry<f64>, r: f64, n: usize, parts: &mut Vec<Polygon<f64>>) {
    match geom {
        Geometry::Point(p) => parts.push(circle(p.x(), p.y(), r, n)),
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                parts.push(circle(p.x(), p.y(), r, n));
            }
        }
        Geometry::Line(l) => {
            path_parts(&[l.start, l.end], r, n, parts);
        }
        Geometry::LineString(ls) => path_parts(&ls.0, r, n, parts),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                path_parts(&ls.0, r, n, parts);
            }
        }
        Geometry::Polygon(p) => polygon_parts(p, r, n, parts),
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                polygon_parts(p, r, n, parts);
            }
        }
        Geometry::Rect(rect) => polygon_parts(&rect.to_polygon(), r, n, parts),
        Geometry::Triangle(t) => polygon_parts(&t.to_polygon(), r, n, parts),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                offset_parts(g, r, n, parts);
            }
        }
    }
}

/// Outward offset of a polygon: its own footprint plus the offset of its
/// exterior ring. Interior rings shrink under an outward buffer and are
/// already covered by the footprint.
fn polygon_parts(poly: &Polygon<f64>, r: f64, n: usize, parts: &mut Vec<Polygon<f64>>) {
    parts.push(poly.clone());
    path_parts(&poly.exterior().0, r, n, parts);
}

/// Capsule decomposition of a coordinate path: a circle at every vertex and
/// a rectangle along every segment.
fn path_parts(coords: &[Coord<f64>], r: f64, n: usize, parts: &mut Vec<Polygon<f64>>) {
    for c in coords {
        parts.push(circle(c.x, c.y, r, n));
    }
    for pair in coords.windows(2) {
        if let Some(rect) = segment_rect(pair[0], pair[1], r) {
            parts.push(rect);
        }
    }
}

/// A polygon approximating a circle with `n` segments.
fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Polygon<f64> {
    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((cx + r * angle.cos(), cy + r * angle.sin()));
    }
    // Close the ring
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

/// The rectangle offset of one segment, or None for a degenerate segment.
fn segment_rect(a: Coord<f64>, b: Coord<f64>, r: f64) -> Option<Polygon<f64>> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return None;
    }
    let nx = -dy / len * r;
    let ny = dx / len * r;
    Some(Polygon::new(
        LineString::from(vec![
            (a.x + nx, a.y + ny),
            (b.x + nx, b.y + ny),
            (b.x - nx, b.y - ny),
            (a.x - nx, a.y - ny),
            (a.x + nx, a.y + ny),
        ]),
        vec![],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use landsift_core::{BoundingBox, Crs};

    fn feet_crs() -> Crs {
        Crs::from_epsg_with_unit(2272, LinearUnit::Feet)
    }

    #[test]
    fn test_circle_area() {
        let poly = circle(0.0, 0.0, 10.0, 64);
        let expected = PI * 100.0;
        let actual = poly.unsigned_area();
        let error = (actual - expected).abs() / expected;
        assert!(
            error < 0.01,
            "Circle area error {:.2}% (expected {:.1}, got {:.1})",
            error * 100.0,
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_layer_is_fatal() {
        let layer = FeatureLayer::with_crs("roads", feet_crs());
        let result = buffer_layer(&layer, 150.0, LinearUnit::Feet, &BufferParams::default());
        assert!(matches!(result, Err(Error::EmptyLayer(_))));
    }

    #[test]
    fn test_road_buffer_extent() {
        let mut roads = FeatureLayer::with_crs("roads", feet_crs());
        roads.push(Feature::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (1000.0, 0.0),
        ]))));

        let buffered =
            buffer_layer(&roads, 150.0, LinearUnit::Feet, &BufferParams::default()).unwrap();
        assert_eq!(buffered.len(), 1);

        let bb = buffered.extent().unwrap();
        assert!((bb.min_x - -150.0).abs() < 1.0);
        assert!((bb.max_x - 1150.0).abs() < 1.0);
        assert!((bb.min_y - -150.0).abs() < 1.0);
        assert!((bb.max_y - 150.0).abs() < 1.0);
    }

    #[test]
    fn test_parcel_buffer_one_mile() {
        let mut parcels = FeatureLayer::with_crs("parcels", feet_crs());
        parcels.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (660.0, 0.0),
                (660.0, 660.0),
                (0.0, 660.0),
                (0.0, 0.0),
            ]),
            vec![],
        ))));

        let buffered =
            buffer_layer(&parcels, 1.0, LinearUnit::Miles, &BufferParams::default()).unwrap();
        let bb = buffered.extent().unwrap();
        // 1 mile = 5280 ft outward in every direction
        let expected = BoundingBox::new(-5280.0, -5280.0, 5940.0, 5940.0);
        assert!((bb.min_x - expected.min_x).abs() < 1.0);
        assert!((bb.max_y - expected.max_y).abs() < 1.0);
    }

    #[test]
    fn test_buffer_distance_must_be_positive() {
        let mut roads = FeatureLayer::with_crs("roads", feet_crs());
        roads.push(Feature::new(Geometry::Point(geo_types::Point::new(0.0, 0.0))));
        let result = buffer_layer(&roads, 0.0, LinearUnit::Feet, &BufferParams::default());
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }
}
