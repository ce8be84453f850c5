//! Aggregation stage
//!
//! Folds one reference layer into the parcel attribute table. Area metrics
//! land as an acres field plus a percent-of-parcel field; the road metric
//! lands as a yes/no proximity flag. Transient overlap counts (and, for
//! roads, the overlap area) never reach the output schema.

use crate::acreage::GIS_ACRES;
use landsift_core::{AreaUnit, AttributeValue, Error, FeatureLayer, Result};
use landsift_engine::GeoEngine;

/// Road proximity flag field
pub const ROAD_WITHIN_150FT: &str = "ROAD_WITHIN_150FT";

/// How a reference layer folds into the parcel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// `<STEM>_ACRES` and `<STEM>_PERCENT`
    AreaPercent,
    /// `ROAD_WITHIN_150FT` = "yes" iff any overlap
    RoadFlag,
}

/// One aggregation: field stem, alias label, and kind.
#[derive(Debug, Clone, Copy)]
pub struct Metric {
    pub stem: &'static str,
    /// Label the field aliases derive from ("Slope" -> "Slope Acres")
    pub label: &'static str,
    pub kind: MetricKind,
}

impl Metric {
    pub const SLOPE: Metric = Metric {
        stem: "SLOPE",
        label: "Slope",
        kind: MetricKind::AreaPercent,
    };
    pub const FLOOD_ZONE: Metric = Metric {
        stem: "FLOOD_ZONE",
        label: "Flood Zone",
        kind: MetricKind::AreaPercent,
    };
    pub const WETLANDS: Metric = Metric {
        stem: "WETLANDS",
        label: "Wetlands",
        kind: MetricKind::AreaPercent,
    };
    pub const FOREST: Metric = Metric {
        stem: "FOREST",
        label: "Forest",
        kind: MetricKind::AreaPercent,
    };
    pub const ROADS: Metric = Metric {
        stem: "ROAD",
        label: "Road",
        kind: MetricKind::RoadFlag,
    };
}

/// Return a copy of `parcels` extended with the metric's fields, computed
/// from the overlap of each parcel with `reference`.
///
/// Never removes a field: repeated aggregations accumulate monotonically.
pub fn summarize<E: GeoEngine>(
    engine: &E,
    parcels: &FeatureLayer,
    reference: &FeatureLayer,
    metric: Metric,
) -> Result<FeatureLayer> {
    let summaries = engine.summarize_within(parcels, reference, AreaUnit::Acres)?;
    let mut out = parcels.clone();

    match metric.kind {
        MetricKind::AreaPercent => {
            let acres_field = format!("{}_ACRES", metric.stem);
            let percent_field = format!("{}_PERCENT", metric.stem);
            let acres_alias = format!("{} Acres", metric.label);
            let percent_alias = format!("{} Percent", metric.label);
            out.add_field(&acres_field, Some(acres_alias.as_str()))?;
            out.add_field(&percent_field, Some(percent_alias.as_str()))?;

            for (idx, summary) in summaries.iter().enumerate() {
                let gis_acres = out.number(idx, GIS_ACRES)?;
                if gis_acres <= 0.0 {
                    return Err(Error::InvalidParameter {
                        name: GIS_ACRES,
                        value: format!("{gis_acres}"),
                        reason: "percent-of-parcel needs a positive parcel acreage".into(),
                    });
                }
                out.set_value(idx, &acres_field, AttributeValue::Float(summary.area))?;
                out.set_value(
                    idx,
                    &percent_field,
                    AttributeValue::Float(summary.area / gis_acres),
                )?;
            }
        }
        MetricKind::RoadFlag => {
            out.add_field(ROAD_WITHIN_150FT, Some("Road Within 150ft"))?;
            for (idx, summary) in summaries.iter().enumerate() {
                let flag = if summary.count > 0 { "yes" } else { "no" };
                out.set_value(idx, ROAD_WITHIN_150FT, AttributeValue::Text(flag.into()))?;
            }
        }
    }

    Ok(out)
}
