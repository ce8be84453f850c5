//! GeoJSON layer reading/writing
//!
//! Feature properties map to `AttributeValue`; the layer CRS rides along as
//! the legacy named-CRS foreign member so workspace round-trips keep it.

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureLayer};
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};
use std::fs;
use std::path::Path;

/// Read a GeoJSON FeatureCollection into a FeatureLayer.
///
/// The layer's field schema is the union of property keys in order of first
/// appearance. Features without geometry are rejected.
pub fn read_geojson_layer<P: AsRef<Path>>(path: P, name: &str) -> Result<FeatureLayer> {
    let text = fs::read_to_string(path.as_ref())?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| Error::Geometry(format!("GeoJSON parse error: {e}")))?;

    let fc = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(Error::Geometry(
                "expected a GeoJSON FeatureCollection".to_string(),
            ))
        }
    };

    let mut layer = FeatureLayer::new(name);
    if let Some(crs) = read_crs_member(&fc) {
        layer.set_crs(Some(crs));
    }

    let mut field_order: Vec<String> = Vec::new();
    let mut parsed = Vec::new();

    for gj_feature in fc.features {
        let geometry = gj_feature
            .geometry
            .ok_or_else(|| Error::Geometry(format!("feature without geometry in '{name}'")))?;
        let geom: geo_types::Geometry<f64> = geometry
            .value
            .try_into()
            .map_err(|e| Error::Geometry(format!("unsupported geometry: {e}")))?;

        let mut feature = Feature::new(geom);
        if let Some(props) = gj_feature.properties {
            for (key, value) in props {
                if !field_order.iter().any(|f| f == &key) {
                    field_order.push(key.clone());
                }
                feature.set(key, json_to_attribute(value));
            }
        }
        parsed.push(feature);
    }

    for field in &field_order {
        layer.add_field(field, None)?;
    }
    for mut feature in parsed {
        // add_field ran after parsing, so backfill missing keys as Null
        for field in &field_order {
            if feature.get(field).is_none() {
                feature.set(field.clone(), AttributeValue::Null);
            }
        }
        layer.push(feature);
    }

    Ok(layer)
}

/// Write a FeatureLayer as a GeoJSON FeatureCollection
pub fn write_geojson_layer<P: AsRef<Path>>(layer: &FeatureLayer, path: P) -> Result<()> {
    let mut features = Vec::with_capacity(layer.len());

    for feature in layer.iter() {
        let value = geojson::Value::from(&feature.geometry);
        let mut props = JsonObject::new();
        for field in layer.fields() {
            let v = feature
                .get(&field.name)
                .cloned()
                .unwrap_or(AttributeValue::Null);
            props.insert(field.name.clone(), attribute_to_json(v));
        }
        features.push(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(value)),
            id: None,
            properties: Some(props),
            foreign_members: None,
        });
    }

    let fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: layer.crs().map(crs_member),
    };

    fs::write(path.as_ref(), GeoJson::from(fc).to_string())?;
    Ok(())
}

fn json_to_attribute(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(b) => AttributeValue::Int(i64::from(b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Int(i)
            } else {
                AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => AttributeValue::Text(s),
        other => AttributeValue::Text(other.to_string()),
    }
}

fn attribute_to_json(value: AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Int(i) => JsonValue::from(i),
        AttributeValue::Float(f) => {
            if f.is_finite() {
                JsonValue::from(f)
            } else {
                JsonValue::Null
            }
        }
        AttributeValue::Text(s) => JsonValue::String(s),
    }
}

fn crs_member(crs: &Crs) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("name".to_string(), JsonValue::String(crs.identifier()));
    // The EPSG name alone cannot distinguish a foot-based state-plane system
    // from a metre one, so the linear unit rides along as an extra property.
    props.insert(
        "unit".to_string(),
        JsonValue::String(crs.linear_unit().to_string()),
    );
    let mut crs_obj = JsonObject::new();
    crs_obj.insert("type".to_string(), JsonValue::String("name".to_string()));
    crs_obj.insert("properties".to_string(), JsonValue::Object(props));
    let mut members = JsonObject::new();
    members.insert("crs".to_string(), JsonValue::Object(crs_obj));
    members
}

fn read_crs_member(fc: &FeatureCollection) -> Option<Crs> {
    let props = fc
        .foreign_members
        .as_ref()?
        .get("crs")?
        .get("properties")?;
    let name = props.get("name")?.as_str()?;
    let code: u32 = name.strip_prefix("EPSG:")?.parse().ok()?;
    let unit = props
        .get("unit")
        .and_then(|u| u.as_str())
        .and_then(crate::units::LinearUnit::from_name);
    Some(match unit {
        Some(unit) => Crs::from_epsg_with_unit(code, unit),
        None => Crs::from_epsg(code),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry, LineString, Polygon};

    fn sample_layer() -> FeatureLayer {
        let mut layer = FeatureLayer::with_crs("parcels", Crs::from_epsg(26918));
        layer.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (100.0, 0.0),
                (100.0, 100.0),
                (0.0, 100.0),
                (0.0, 0.0),
            ]),
            vec![],
        ))));
        layer.add_field("GIS_ACRES", Some("GIS Calculated Acres")).unwrap();
        layer
            .set_value(0, "GIS_ACRES", AttributeValue::Float(2.47))
            .unwrap();
        layer.add_field("ROAD_WITHIN_150FT", None).unwrap();
        layer
            .set_value(0, "ROAD_WITHIN_150FT", AttributeValue::Text("no".into()))
            .unwrap();
        layer
    }

    #[test]
    fn test_geojson_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.geojson");

        let layer = sample_layer();
        write_geojson_layer(&layer, &path).unwrap();
        let back = read_geojson_layer(&path, "parcels").unwrap();

        assert_eq!(back.len(), 1);
        assert!(back.has_field("GIS_ACRES"));
        assert_eq!(back.number(0, "GIS_ACRES").unwrap(), 2.47);
        assert_eq!(
            back.value(0, "ROAD_WITHIN_150FT").unwrap().as_str(),
            Some("no")
        );
        assert_eq!(back.crs().map(|c| c.epsg()), Some(26918));
        assert_eq!(back.features()[0].geometry, layer.features()[0].geometry);
    }

    #[test]
    fn test_crs_unit_survives_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.geojson");

        let mut layer = sample_layer();
        layer.set_crs(Some(Crs::from_epsg_with_unit(
            2272,
            crate::units::LinearUnit::Feet,
        )));
        write_geojson_layer(&layer, &path).unwrap();

        let back = read_geojson_layer(&path, "parcels").unwrap();
        let crs = back.crs().unwrap();
        assert_eq!(crs.epsg(), 2272);
        // Foot-based CRS must not come back as metres; that would shrink
        // every acre figure by ~10.76x
        assert_eq!(crs.linear_unit(), crate::units::LinearUnit::Feet);
    }

    #[test]
    fn test_read_rejects_non_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("point.geojson");
        fs::write(&path, r#"{"type":"Point","coordinates":[1.0,2.0]}"#).unwrap();
        assert!(read_geojson_layer(&path, "x").is_err());
    }
}
