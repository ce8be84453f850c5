//! Geometry coercion helpers

use geo_types::{Geometry, MultiPolygon, Polygon};

/// View a geometry as a multipolygon; non-areal geometries yield `None`.
pub(crate) fn to_multi_polygon(geom: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        Geometry::GeometryCollection(gc) => {
            let polys: Vec<Polygon<f64>> = gc
                .0
                .iter()
                .filter_map(to_multi_polygon)
                .flat_map(|mp| mp.0)
                .collect();
            if polys.is_empty() {
                None
            } else {
                Some(MultiPolygon::new(polys))
            }
        }
        _ => None,
    }
}
