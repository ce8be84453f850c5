//! Pure-Rust WGS84 → UTM raster reprojection (Snyder 1987, USGS formulas).
//!
//! Covers EPSG 326xx (UTM North) and 327xx (UTM South). No external C
//! dependencies (no libproj). Reprojection between two projected CRS is not
//! supported; inputs are expected either already projected or in WGS84.

use landsift_core::{Crs, Error, GeoTransform, Raster, Result};

// WGS84 ellipsoid constants

const A: f64 = 6_378_137.0; // semi-major axis (m)
const F: f64 = 1.0 / 298.257_223_563; // flattening
const E2: f64 = 2.0 * F - F * F; // eccentricity squared
const E_PRIME2: f64 = E2 / (1.0 - E2); // second eccentricity squared
const K0: f64 = 0.9996; // UTM scale factor
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Reproject a raster into the target spatial reference.
///
/// An already-matching source comes back as a copy stamped with `target`.
/// Otherwise the source must be geographic WGS84 and the target a UTM zone;
/// the output keeps the source pixel count, covers the projected envelope of
/// the source bounds, and samples nearest-neighbour. Anything else fails
/// with `UnsupportedReprojection`.
pub fn reproject_raster(raster: &Raster, target: &Crs) -> Result<Raster> {
    let source = raster.crs().ok_or(Error::InvalidParameter {
        name: "crs",
        value: "none".into(),
        reason: "cannot reproject a raster without a source CRS".into(),
    })?;

    if source.is_equivalent(target) {
        let mut out = raster.clone();
        out.set_crs(Some(target.clone()));
        return Ok(out);
    }

    let unsupported = || Error::UnsupportedReprojection {
        from: source.identifier(),
        to: target.identifier(),
    };
    if !source.is_geographic() {
        return Err(unsupported());
    }
    let (zone, north) = target.utm_zone().ok_or_else(unsupported)?;

    let (rows, cols) = raster.shape();
    let bounds = raster.bounds(); // lon/lat degrees

    // Projected envelope from all four corners; transforming only min/max
    // would miss the non-linear distortion of the projection.
    let corners = [
        (bounds.min_x, bounds.min_y),
        (bounds.min_x, bounds.max_y),
        (bounds.max_x, bounds.min_y),
        (bounds.max_x, bounds.max_y),
    ];
    let mut min_e = f64::MAX;
    let mut min_n = f64::MAX;
    let mut max_e = f64::MIN;
    let mut max_n = f64::MIN;
    for &(lon, lat) in &corners {
        let (e, n) = wgs84_to_utm(lon, lat, zone, north);
        min_e = min_e.min(e);
        min_n = min_n.min(n);
        max_e = max_e.max(e);
        max_n = max_n.max(n);
    }

    let mut out = raster.with_same_meta(rows, cols);
    out.set_transform(GeoTransform::new(
        min_e,
        max_n,
        (max_e - min_e) / cols as f64,
        -(max_n - min_n) / rows as f64,
    ));
    out.set_crs(Some(target.clone()));
    out.set_nodata(Some(f64::NAN));

    let src_gt = raster.transform();
    for row in 0..rows {
        for col in 0..cols {
            let (e, n) = out.pixel_to_geo(col, row);
            let (lon, lat) = utm_to_wgs84(e, n, zone, north);
            let (src_col, src_row) = src_gt.geo_to_pixel(lon, lat);

            let sr = src_row.floor();
            let sc = src_col.floor();
            let value = if sr >= 0.0 && sc >= 0.0 && sr < rows as f64 && sc < cols as f64 {
                let v = unsafe { raster.get_unchecked(sr as usize, sc as usize) };
                if raster.is_nodata(v) {
                    f64::NAN
                } else {
                    v
                }
            } else {
                f64::NAN
            };
            out.set(row, col, value)?;
        }
    }

    Ok(out)
}

/// Convert WGS84 (longitude, latitude) in degrees to UTM (easting, northing)
/// in metres for the given zone and hemisphere.
/// Snyder eqs. 8-9 and 8-10.
pub fn wgs84_to_utm(lon_deg: f64, lat_deg: f64, zone: u32, north: bool) -> (f64, f64) {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let lon0 = central_meridian(zone);

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let tan_lat = lat.tan();

    let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = E_PRIME2 * cos_lat * cos_lat;
    let a_coeff = cos_lat * (lon - lon0);

    let m = meridional_arc(lat);

    let a2 = a_coeff * a_coeff;
    let a4 = a2 * a2;
    let a6 = a4 * a2;

    let easting = K0 * n
        * (a_coeff
            + (1.0 - t + c) * a2 * a_coeff / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * E_PRIME2) * a4 * a_coeff / 120.0)
        + FALSE_EASTING;

    let northing = K0
        * (m
            + n * tan_lat
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * E_PRIME2) * a6 / 720.0));

    let northing = if north {
        northing
    } else {
        northing + FALSE_NORTHING_SOUTH
    };

    (easting, northing)
}

/// Convert UTM (easting, northing) in metres back to WGS84 (longitude,
/// latitude) in degrees. Snyder eqs. 8-17 through 8-25 via the footpoint
/// latitude.
pub fn utm_to_wgs84(easting: f64, northing: f64, zone: u32, north: bool) -> (f64, f64) {
    let lon0 = central_meridian(zone);
    let northing = if north {
        northing
    } else {
        northing - FALSE_NORTHING_SOUTH
    };

    let m = northing / K0;
    let e4 = E2 * E2;
    let e6 = e4 * E2;
    let mu = m / (A * (1.0 - E2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let e1 = (1.0 - (1.0 - E2).sqrt()) / (1.0 + (1.0 - E2).sqrt());
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_2 * e1_2;

    // Footpoint latitude (Snyder eq. 3-26)
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = E_PRIME2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = A / (1.0 - E2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = A * (1.0 - E2) / (1.0 - E2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = (easting - FALSE_EASTING) / (n1 * K0);

    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d2 * d2;
    let d5 = d4 * d;
    let d6 = d4 * d2;

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * E_PRIME2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * E_PRIME2
                    - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * E_PRIME2 + 24.0 * t1 * t1)
                * d5
                / 120.0)
            / cos_phi1;

    (lon.to_degrees(), lat.to_degrees())
}

/// Central meridian of a UTM zone, in radians.
fn central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

/// Meridional arc from equator to latitude `lat` (radians).
/// Snyder eq. 3-21.
fn meridional_arc(lat: f64) -> f64 {
    let e2 = E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use landsift_core::LinearUnit;

    fn assert_close(a: f64, b: f64, tol: f64, msg: &str) {
        let diff = (a - b).abs();
        assert!(
            diff < tol,
            "{msg}: expected {b}, got {a}, diff {diff} exceeds tolerance {tol}"
        );
    }

    #[test]
    fn test_equator_central_meridian() {
        // Zone 18 central meridian is -75°: easting 500000, northing 0
        let (e, n) = wgs84_to_utm(-75.0, 0.0, 18, true);
        assert_close(e, 500_000.0, 0.01, "easting at CM");
        assert_close(n, 0.0, 0.01, "northing at equator");
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let points = [(-75.16, 39.95), (-74.5, 40.2), (-76.9, 38.8)];
        for (lon, lat) in points {
            let (e, n) = wgs84_to_utm(lon, lat, 18, true);
            let (lon2, lat2) = utm_to_wgs84(e, n, 18, true);
            assert_close(lon2, lon, 1e-7, "roundtrip lon");
            assert_close(lat2, lat, 1e-7, "roundtrip lat");
        }
    }

    #[test]
    fn test_southern_hemisphere_false_northing() {
        let (_, n) = wgs84_to_utm(-58.38, -34.60, 21, false);
        assert!(n > 6_000_000.0 && n < 10_000_000.0, "northing {n}");
        let (lon, lat) = utm_to_wgs84(373_000.0, n, 21, false);
        assert_close(lon, -58.38, 0.01, "lon");
        assert_close(lat, -34.60, 0.01, "lat");
    }

    /// A 0.01° raster near Philadelphia, WGS84.
    fn wgs84_raster() -> Raster {
        let mut r = Raster::from_vec((0..100).map(f64::from).collect(), 10, 10).unwrap();
        r.set_transform(GeoTransform::new(-75.2, 40.0, 0.01, -0.01));
        r.set_crs(Some(Crs::wgs84()));
        r
    }

    #[test]
    fn test_identity_reprojection_keeps_data() {
        let raster = wgs84_raster();
        let out = reproject_raster(&raster, &Crs::wgs84()).unwrap();
        assert_eq!(out.shape(), raster.shape());
        assert_eq!(out.get(3, 4).unwrap(), raster.get(3, 4).unwrap());
    }

    #[test]
    fn test_wgs84_to_utm18n() {
        let raster = wgs84_raster();
        let target = Crs::utm(18, true);
        let out = reproject_raster(&raster, &target).unwrap();

        assert_eq!(out.shape(), (10, 10));
        assert_eq!(out.crs().unwrap().epsg(), 32618);
        assert_eq!(out.crs().unwrap().linear_unit(), LinearUnit::Metres);

        // ~40°N near -75° lands west of the central meridian with a
        // northing a little above 4.4 million metres
        let b = out.bounds();
        assert!(b.min_x > 300_000.0 && b.max_x < 500_000.0, "easting {b:?}");
        assert!(b.min_y > 4_300_000.0 && b.max_y < 4_500_000.0, "northing {b:?}");

        // Cells near the middle resample from real source cells
        assert!(out.valid_count() > 50, "valid {}", out.valid_count());
    }

    #[test]
    fn test_projected_to_projected_is_unsupported() {
        let mut raster = wgs84_raster();
        raster.set_crs(Some(Crs::from_epsg(26918)));
        let result = reproject_raster(&raster, &Crs::utm(17, true));
        assert!(matches!(result, Err(Error::UnsupportedReprojection { .. })));
    }

    #[test]
    fn test_missing_source_crs_is_fatal() {
        let mut raster = wgs84_raster();
        raster.set_crs(None);
        let result = reproject_raster(&raster, &Crs::utm(18, true));
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }
}
