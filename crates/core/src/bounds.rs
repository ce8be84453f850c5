//! Axis-aligned bounding boxes

use geo_types::{Geometry, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Merge with another box, producing the combined envelope.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.min_x, self.min_y),
                (self.max_x, self.min_y),
                (self.max_x, self.max_y),
                (self.min_x, self.max_y),
                (self.min_x, self.min_y),
            ]),
            vec![],
        )
    }

    /// Envelope of a geometry, or `None` for empty geometries.
    pub fn of_geometry(geom: &Geometry<f64>) -> Option<BoundingBox> {
        let mut acc: Option<BoundingBox> = None;
        fold_coords(geom, &mut |x, y| {
            let point = BoundingBox::new(x, y, x, y);
            acc = Some(match acc {
                Some(b) => b.union(&point),
                None => point,
            });
        });
        acc
    }
}

fn fold_coords(geom: &Geometry<f64>, f: &mut impl FnMut(f64, f64)) {
    match geom {
        Geometry::Point(p) => f(p.x(), p.y()),
        Geometry::Line(l) => {
            f(l.start.x, l.start.y);
            f(l.end.x, l.end.y);
        }
        Geometry::LineString(ls) => ls.0.iter().for_each(|c| f(c.x, c.y)),
        Geometry::Polygon(p) => {
            // Interior rings can't extend past the exterior
            p.exterior().0.iter().for_each(|c| f(c.x, c.y));
        }
        Geometry::MultiPoint(mp) => mp.0.iter().for_each(|p| f(p.x(), p.y())),
        Geometry::MultiLineString(mls) => {
            mls.0.iter().flat_map(|ls| ls.0.iter()).for_each(|c| f(c.x, c.y));
        }
        Geometry::MultiPolygon(mp) => {
            mp.0.iter()
                .flat_map(|p| p.exterior().0.iter())
                .for_each(|c| f(c.x, c.y));
        }
        Geometry::Rect(r) => {
            f(r.min().x, r.min().y);
            f(r.max().x, r.max().y);
        }
        Geometry::Triangle(t) => t.to_array().iter().for_each(|c| f(c.x, c.y)),
        Geometry::GeometryCollection(gc) => {
            gc.0.iter().for_each(|g| fold_coords(g, f));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, Polygon};

    #[test]
    fn test_bbox_of_polygon() {
        let poly = Polygon::new(
            LineString::from(vec![
                (1.0, 2.0), (9.0, 2.0), (9.0, 7.0), (1.0, 7.0), (1.0, 2.0),
            ]),
            vec![],
        );
        let bb = BoundingBox::of_geometry(&Geometry::Polygon(poly)).unwrap();
        assert_eq!(bb, BoundingBox::new(1.0, 2.0, 9.0, 7.0));
        assert_eq!(bb.width(), 8.0);
        assert_eq!(bb.height(), 5.0);
    }

    #[test]
    fn test_bbox_union() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(2.0, -1.0, 3.0, 0.5);
        assert_eq!(a.union(&b), BoundingBox::new(0.0, -1.0, 3.0, 1.0));
    }

    #[test]
    fn test_bbox_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        assert!(a.intersects(&BoundingBox::new(1.0, 1.0, 3.0, 3.0)));
        assert!(!a.intersects(&BoundingBox::new(3.0, 3.0, 4.0, 4.0)));
    }

    #[test]
    fn test_bbox_of_point() {
        let bb = BoundingBox::of_geometry(&Geometry::Point(Point::new(4.0, 5.0))).unwrap();
        assert_eq!(bb.width(), 0.0);
        assert!(bb.contains_point(4.0, 5.0));
    }
}
