//! Vector features and layers
//!
//! A `FeatureLayer` is a set of features (geometry + attributes) with a
//! declared field schema. Schema operations (add, rename, delete, compute)
//! go through the layer so the field registry and the per-feature attribute
//! maps stay in sync; the enrichment pipeline never mutates a layer it was
//! given, it clones and returns a new one.

use crate::bounds::BoundingBox;
use crate::crs::Crs;
use crate::error::{Error, Result};
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    /// Numeric view of the value. `Null` normalizes to 0.0 (a parcel with
    /// zero overlap records 0, not null); text has no numeric view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Null => Some(0.0),
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A field definition: name plus an optional human-readable alias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub alias: Option<String>,
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Geometry<f64>,
    properties: HashMap<String, AttributeValue>,
}

impl Feature {
    /// Create a new feature with geometry and no attributes
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            properties: HashMap::new(),
        }
    }

    /// Get an attribute
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Set an attribute (schema bookkeeping happens at the layer level)
    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.properties.remove(key)
    }
}

/// A named collection of features with a field schema and optional CRS
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayer {
    name: String,
    crs: Option<Crs>,
    fields: Vec<FieldDef>,
    features: Vec<Feature>,
}

impl FeatureLayer {
    /// Create an empty layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crs: None,
            fields: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Create an empty layer with a CRS
    pub fn with_crs(name: impl Into<String>, crs: Crs) -> Self {
        Self {
            name: name.into(),
            crs: Some(crs),
            fields: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Combined envelope of all feature geometries
    pub fn extent(&self) -> Option<BoundingBox> {
        self.features
            .iter()
            .filter_map(|f| BoundingBox::of_geometry(&f.geometry))
            .reduce(|a, b| a.union(&b))
    }

    // Schema operations

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Add a field, initialized to `Null` on every feature.
    ///
    /// A name collision is a schema error and fatal to the run.
    pub fn add_field(&mut self, name: &str, alias: Option<&str>) -> Result<()> {
        if self.has_field(name) {
            return Err(Error::FieldExists(name.to_string()));
        }
        self.fields.push(FieldDef {
            name: name.to_string(),
            alias: alias.map(str::to_string),
        });
        for feature in &mut self.features {
            feature.set(name, AttributeValue::Null);
        }
        Ok(())
    }

    /// Rename a field, optionally replacing its alias.
    pub fn rename_field(&mut self, old: &str, new: &str, alias: Option<&str>) -> Result<()> {
        if old != new && self.has_field(new) {
            return Err(Error::FieldExists(new.to_string()));
        }
        let def = self
            .fields
            .iter_mut()
            .find(|f| f.name == old)
            .ok_or_else(|| Error::MissingField(old.to_string()))?;
        def.name = new.to_string();
        if let Some(a) = alias {
            def.alias = Some(a.to_string());
        }
        for feature in &mut self.features {
            if let Some(v) = feature.remove(old) {
                feature.set(new, v);
            }
        }
        Ok(())
    }

    /// Update only the alias of an existing field.
    pub fn set_field_alias(&mut self, name: &str, alias: &str) -> Result<()> {
        let def = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::MissingField(name.to_string()))?;
        def.alias = Some(alias.to_string());
        Ok(())
    }

    /// Delete a field and its values from every feature.
    pub fn delete_field(&mut self, name: &str) -> Result<()> {
        let idx = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| Error::MissingField(name.to_string()))?;
        self.fields.remove(idx);
        for feature in &mut self.features {
            feature.remove(name);
        }
        Ok(())
    }

    // Value access

    /// Attribute value for one feature; the field must be registered and the
    /// index in range.
    pub fn value(&self, feature: usize, field: &str) -> Result<&AttributeValue> {
        if !self.has_field(field) {
            return Err(Error::MissingField(field.to_string()));
        }
        let feat = self.features.get(feature).ok_or(Error::FeatureOutOfBounds {
            index: feature,
            len: self.features.len(),
        })?;
        Ok(feat.get(field).unwrap_or(&AttributeValue::Null))
    }

    /// Numeric attribute value for one feature. `Null` reads as 0.0.
    pub fn number(&self, feature: usize, field: &str) -> Result<f64> {
        self.value(feature, field)?
            .as_f64()
            .ok_or_else(|| Error::TypeMismatch {
                field: field.to_string(),
                expected: "numeric",
            })
    }

    /// Set an attribute value for one feature; the field must be registered
    /// and the index in range.
    pub fn set_value(&mut self, feature: usize, field: &str, value: AttributeValue) -> Result<()> {
        if !self.has_field(field) {
            return Err(Error::MissingField(field.to_string()));
        }
        let len = self.features.len();
        let feat = self
            .features
            .get_mut(feature)
            .ok_or(Error::FeatureOutOfBounds {
                index: feature,
                len,
            })?;
        feat.set(field, value);
        Ok(())
    }

    /// Compute a field from an expression over each feature
    /// (the `CalculateField` analogue).
    pub fn compute<F>(&mut self, field: &str, mut expr: F) -> Result<()>
    where
        F: FnMut(&Feature) -> Result<AttributeValue>,
    {
        if !self.has_field(field) {
            return Err(Error::MissingField(field.to_string()));
        }
        for feature in &mut self.features {
            let value = expr(feature)?;
            feature.set(field, value);
        }
        Ok(())
    }
}

impl IntoIterator for FeatureLayer {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
