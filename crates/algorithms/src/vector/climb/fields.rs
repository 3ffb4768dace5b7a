//! Output schema of the climb algorithm
//!
//! Input fields named like a generated field are dropped; the four generated
//! floating point fields are appended after the kept ones.

use climb_core::vector::{AttributeValue, Field, FieldType, Fields};

use super::accumulator::ClimbStats;

pub const CLIMB_FIELD: &str = "climb";
pub const DESCENT_FIELD: &str = "descent";
pub const MIN_ELEVATION_FIELD: &str = "minelev";
pub const MAX_ELEVATION_FIELD: &str = "maxelev";

/// Generated fields, in output order
pub const GENERATED_FIELDS: [&str; 4] = [
    CLIMB_FIELD,
    DESCENT_FIELD,
    MIN_ELEVATION_FIELD,
    MAX_ELEVATION_FIELD,
];

/// Mapping from an input schema to the output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProjection {
    fields: Fields,
    dropped: Vec<usize>,
    collisions: Vec<String>,
}

impl FieldProjection {
    pub fn new(input: &Fields) -> Self {
        let mut fields = Fields::new();
        let mut dropped = Vec::new();
        let mut collisions = Vec::new();

        for (index, field) in input.iter().enumerate() {
            if GENERATED_FIELDS.contains(&field.name.as_str()) {
                dropped.push(index);
                collisions.push(field.name.clone());
            } else {
                fields.push(field.clone());
            }
        }
        for name in GENERATED_FIELDS {
            fields.push(Field::new(name, FieldType::Float));
        }

        Self {
            fields,
            dropped,
            collisions,
        }
    }

    /// Output schema
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Zero-based indices of dropped input fields, ascending
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    /// Names of the dropped input fields
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    /// One warning per dropped input field
    pub fn warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.collisions
            .iter()
            .map(|name| format!("Warning: existing {} attribute found and removed", name))
    }

    /// Build an output attribute row from an input row and its statistics
    pub fn project(&self, attributes: Vec<AttributeValue>, stats: &ClimbStats) -> Vec<AttributeValue> {
        let mut row = Vec::with_capacity(self.fields.len());
        row.extend(
            attributes
                .into_iter()
                .enumerate()
                .filter(|(i, _)| self.dropped.binary_search(i).is_err())
                .map(|(_, value)| value),
        );
        row.push(AttributeValue::Float(stats.climb));
        row.push(AttributeValue::Float(stats.descent));
        row.push(AttributeValue::from(stats.min_elevation));
        row.push(AttributeValue::from(stats.max_elevation));
        row
    }
}
