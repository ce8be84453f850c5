//! Raster preparation stage
//!
//! Turns a source raster (slope, land cover) into a suitability polygon
//! layer: align with the parcel CRS, clip to the analysis buffer,
//! reclassify through the source's remap table, vectorize. Every
//! intermediate is persisted under a predictable name so a run can be
//! inspected dataset by dataset.

use landsift_core::{Crs, Error, FeatureLayer, Raster, Result, Workspace};
use landsift_engine::{GeoEngine, RemapEntry, RemapTable};
use tracing::info;

/// One raster input: its dataset name stem and remap table.
#[derive(Debug, Clone)]
pub struct RasterSource {
    /// Stem for the intermediate dataset names (`slope_clip`, ...)
    pub stem: &'static str,
    /// Suitability remap applied after reprojection
    pub table: RemapTable,
}

impl RasterSource {
    /// Percent-slope raster: at most 30 percent is buildable.
    ///
    /// Exactly 30 falls in the first entry and stays suitable; anything
    /// above goes to no-data.
    pub fn slope() -> Self {
        Self {
            stem: "slope",
            table: RemapTable::new(vec![
                RemapEntry::to_value(0.0, 30.0, 1.0),
                RemapEntry::to_nodata(30.0, 100.0),
            ]),
        }
    }

    /// Land-cover raster: NLCD forest classes 41-43 sit inside [40, 44].
    ///
    /// Codes outside the declared [0, 100] domain match no entry and fall
    /// to the table default, which is no-data.
    pub fn forest() -> Self {
        Self {
            stem: "forest",
            table: RemapTable::new(vec![
                RemapEntry::to_value(40.0, 44.0, 1.0),
                RemapEntry::to_nodata(0.0, 39.0),
                RemapEntry::to_nodata(45.0, 100.0),
            ]),
        }
    }
}

/// Run the full preparation chain for one raster source.
///
/// Returns the vectorized suitability polygons (`<stem>_polygon`), having
/// written `<stem>_clip`, `<stem>_clip_project` and
/// `<stem>_clip_project_reclass` along the way.
pub fn prepare<E: GeoEngine>(
    engine: &E,
    workspace: &Workspace,
    source: &RasterSource,
    raster: &Raster,
    analysis_buffer: &FeatureLayer,
    target: &Crs,
) -> Result<FeatureLayer> {
    let rect = analysis_buffer.extent().ok_or_else(|| {
        Error::Geometry(format!(
            "analysis buffer '{}' has no extent",
            analysis_buffer.name()
        ))
    })?;

    // The buffer extent is in the analysis CRS, so a raster delivered in a
    // different one must be brought over before any pixel window is cut.
    let aligned;
    let source_raster = match raster.crs() {
        Some(crs) if !crs.is_equivalent(target) => {
            info!(stem = source.stem, crs = %target, "reprojecting into the analysis CRS");
            aligned = engine.reproject_raster(raster, target)?;
            &aligned
        }
        _ => raster,
    };

    info!(stem = source.stem, "clipping raster to analysis buffer");
    let clipped = engine.clip_raster(source_raster, rect, analysis_buffer)?;
    workspace.write_raster(&format!("{}_clip", source.stem), &clipped)?;

    let projected = engine.reproject_raster(&clipped, target)?;
    workspace.write_raster(&format!("{}_clip_project", source.stem), &projected)?;

    info!(stem = source.stem, "reclassifying");
    let reclassed = engine.reclassify(&projected, &source.table)?;
    workspace.write_raster(&format!("{}_clip_project_reclass", source.stem), &reclassed)?;

    info!(stem = source.stem, "vectorizing");
    let mut polygons = engine.vectorize(&reclassed)?;
    let name = format!("{}_polygon", source.stem);
    polygons.set_name(&name);
    workspace.write_layer(&name, &polygons)?;

    Ok(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry, LineString, Polygon};
    use landsift_core::{Feature, GeoTransform, LinearUnit};
    use landsift_engine::PlanarEngine;

    fn feet_crs() -> Crs {
        Crs::from_epsg_with_unit(2272, LinearUnit::Feet)
    }

    /// 10x10 slope raster over (0,0)-(660,660), 66 ft cells: the top three
    /// rows are gentle, the rest steep.
    fn slope_raster() -> Raster {
        let mut values = vec![50.0; 100];
        for v in values.iter_mut().take(30) {
            *v = 10.0;
        }
        let mut r = Raster::from_vec(values, 10, 10).unwrap();
        r.set_transform(GeoTransform::new(0.0, 660.0, 66.0, -66.0));
        r.set_crs(Some(feet_crs()));
        r
    }

    fn buffer_layer() -> FeatureLayer {
        let mut layer = FeatureLayer::with_crs("parcel_buffer", feet_crs());
        layer.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (-100.0, -100.0),
                (760.0, -100.0),
                (760.0, 760.0),
                (-100.0, 760.0),
                (-100.0, -100.0),
            ]),
            vec![],
        ))));
        layer
    }

    #[test]
    fn test_prepare_writes_all_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path(), true).unwrap();
        let engine = PlanarEngine::default();

        let polygons = prepare(
            &engine,
            &ws,
            &RasterSource::slope(),
            &slope_raster(),
            &buffer_layer(),
            &feet_crs(),
        )
        .unwrap();

        assert_eq!(polygons.name(), "slope_polygon");
        assert!(!polygons.is_empty());
        for name in ["slope_clip", "slope_clip_project", "slope_clip_project_reclass"] {
            assert!(ws.raster_path(name).exists(), "{name} missing");
        }
        assert!(ws.layer_path("slope_polygon").exists());
    }

    #[test]
    fn test_prepare_keeps_only_suitable_cells() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path(), true).unwrap();
        let engine = PlanarEngine::default();

        prepare(
            &engine,
            &ws,
            &RasterSource::slope(),
            &slope_raster(),
            &buffer_layer(),
            &feet_crs(),
        )
        .unwrap();

        let reclassed = ws.read_raster("slope_clip_project_reclass").unwrap();
        // 30 gentle cells survive, 70 steep cells drop out
        assert_eq!(reclassed.valid_count(), 30);
    }

    #[test]
    fn test_geographic_raster_is_projected_before_the_clip() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path(), true).unwrap();
        let engine = PlanarEngine::default();
        let target = Crs::utm(18, true);

        // Gentle slope over a 0.1 degree square near 40N 75.15W, zone 18
        let mut raster = Raster::from_vec(vec![10.0; 100], 10, 10).unwrap();
        raster.set_transform(GeoTransform::new(-75.2, 40.1, 0.01, -0.01));
        raster.set_crs(Some(Crs::wgs84()));

        // Buffer in UTM metres covering the projected raster footprint
        let mut buffer = FeatureLayer::with_crs("parcel_buffer", target.clone());
        buffer.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (470_000.0, 4_415_000.0),
                (505_000.0, 4_415_000.0),
                (505_000.0, 4_450_000.0),
                (470_000.0, 4_450_000.0),
                (470_000.0, 4_415_000.0),
            ]),
            vec![],
        ))));

        let polygons = prepare(
            &engine,
            &ws,
            &RasterSource::slope(),
            &raster,
            &buffer,
            &target,
        )
        .unwrap();

        assert!(!polygons.is_empty());
        assert_eq!(polygons.crs().map(Crs::epsg), Some(32618));
        let clipped = ws.read_raster("slope_clip").unwrap();
        // The persisted clip is already in analysis coordinates
        assert!(clipped.transform().origin_x > 400_000.0);
    }

    #[test]
    fn test_disjoint_raster_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path(), true).unwrap();
        let engine = PlanarEngine::default();

        let mut far = slope_raster();
        far.set_transform(GeoTransform::new(100_000.0, 100_660.0, 66.0, -66.0));

        let result = prepare(
            &engine,
            &ws,
            &RasterSource::slope(),
            &far,
            &buffer_layer(),
            &feet_crs(),
        );
        assert!(matches!(result, Err(Error::NoCellsInExtent)));
    }
}
