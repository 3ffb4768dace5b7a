//! Feature sources

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{Feature, Fields, GeometryType};

/// A layer features can be pulled from.
///
/// Iteration is a lazy, finite, single pass in source order.
pub trait FeatureSource {
    /// Layer name, used in log messages
    fn name(&self) -> &str;

    /// Attribute schema
    fn fields(&self) -> &Fields;

    /// Static geometry type; tells whether geometries carry Z
    fn geometry_type(&self) -> GeometryType;

    fn crs(&self) -> Option<&CRS>;

    /// Number of features, when known up front
    fn feature_count(&self) -> Option<usize>;

    /// Iterate features in source order
    fn features(&self) -> Box<dyn Iterator<Item = Feature> + '_>;
}

/// A feature source held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    name: String,
    fields: Fields,
    geometry_type: GeometryType,
    crs: Option<CRS>,
    features: Vec<Feature>,
}

impl MemoryLayer {
    pub fn new(
        name: impl Into<String>,
        fields: Fields,
        geometry_type: GeometryType,
        crs: Option<CRS>,
    ) -> Self {
        Self {
            name: name.into(),
            fields,
            geometry_type,
            crs,
            features: Vec::new(),
        }
    }

    /// Append a feature. Its attribute row must match the schema length.
    pub fn push(&mut self, feature: Feature) -> Result<()> {
        if feature.attributes.len() != self.fields.len() {
            return Err(Error::InvalidParameter {
                name: "attributes",
                value: feature.attributes.len().to_string(),
                reason: format!(
                    "feature {} does not match the {} field(s) of layer '{}'",
                    feature.id,
                    self.fields.len(),
                    self.name
                ),
            });
        }
        self.features.push(feature);
        Ok(())
    }

    /// Builder-style [`MemoryLayer::push`]
    pub fn with_feature(mut self, feature: Feature) -> Result<Self> {
        self.push(feature)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }
}

impl FeatureSource for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    fn feature_count(&self) -> Option<usize> {
        Some(self.features.len())
    }

    fn features(&self) -> Box<dyn Iterator<Item = Feature> + '_> {
        Box::new(self.features.iter().cloned())
    }
}

impl IntoIterator for MemoryLayer {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
