//! Vector data structures
//!
//! - [`LineGeometry`]: ordered parts of ordered [`Vertex`]es with optional Z
//! - [`Fields`]/[`AttributeValue`]: ordered schema and positional attribute rows
//! - [`Feature`]: id + geometry + attributes
//! - [`FeatureSource`]/[`MemoryLayer`]: where features are pulled from
//! - [`FeatureSink`]/[`SinkDescriptor`]: where features are written to

mod fields;
mod geometry;
mod sink;
mod source;

pub use fields::{AttributeValue, Field, FieldType, Fields};
pub use geometry::{GeometryType, LineGeometry, Vertex};
pub use sink::{FeatureSink, MemorySink, MemoryStore, SinkDescriptor};
pub use source::{FeatureSource, MemoryLayer};

use serde::{Deserialize, Serialize};

/// Feature identifier, unique within a layer
pub type FeatureId = u64;

/// A line feature with positional attributes.
///
/// `attributes[i]` holds the value of field `i` of the owning layer's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: LineGeometry,
    pub attributes: Vec<AttributeValue>,
}

impl Feature {
    pub fn new(id: FeatureId, geometry: LineGeometry, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            geometry,
            attributes,
        }
    }

    /// Attribute by field name, resolved through `fields`
    pub fn attribute<'a>(&'a self, fields: &Fields, name: &str) -> Option<&'a AttributeValue> {
        fields.index_of(name).and_then(|i| self.attributes.get(i))
    }

    /// Replace the attribute row
    pub fn set_attributes(&mut self, attributes: Vec<AttributeValue>) {
        self.attributes = attributes;
    }
}
