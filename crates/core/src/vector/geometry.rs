//! Line geometries with optional elevation

use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex with planar position and elevation.
///
/// `z` is NaN when the vertex carries no elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar vertex without elevation
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: f64::NAN }
    }

    /// Elevation, if it is a usable (finite) number
    pub fn elevation(&self) -> Option<f64> {
        self.z.is_finite().then_some(self.z)
    }

    /// Planar position
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

/// Static geometry type of a line layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    LineString,
    LineStringZ,
    MultiLineString,
    MultiLineStringZ,
}

impl GeometryType {
    pub fn from_flags(multi: bool, has_z: bool) -> Self {
        match (multi, has_z) {
            (false, false) => Self::LineString,
            (false, true) => Self::LineStringZ,
            (true, false) => Self::MultiLineString,
            (true, true) => Self::MultiLineStringZ,
        }
    }

    /// Whether geometries of this type carry elevation values
    pub fn has_z(self) -> bool {
        matches!(self, Self::LineStringZ | Self::MultiLineStringZ)
    }

    pub fn is_multi(self) -> bool {
        matches!(self, Self::MultiLineString | Self::MultiLineStringZ)
    }

    /// The same type with elevation added
    pub fn with_z(self) -> Self {
        Self::from_flags(self.is_multi(), true)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LineString => "LineString",
            Self::LineStringZ => "LineStringZ",
            Self::MultiLineString => "MultiLineString",
            Self::MultiLineStringZ => "MultiLineStringZ",
        };
        f.write_str(name)
    }
}

/// A (possibly multi-part) line geometry.
///
/// Part order and vertex order are preserved exactly as read; climb is
/// direction dependent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineGeometry {
    parts: Vec<Vec<Vertex>>,
}

impl LineGeometry {
    pub fn new(parts: Vec<Vec<Vertex>>) -> Self {
        Self { parts }
    }

    /// Single-part geometry
    pub fn single(vertices: Vec<Vertex>) -> Self {
        Self {
            parts: vec![vertices],
        }
    }

    /// Single-part geometry from (x, y, z) triples
    pub fn from_xyz(coords: &[(f64, f64, f64)]) -> Self {
        Self::single(coords.iter().map(|&(x, y, z)| Vertex::new(x, y, z)).collect())
    }

    /// Geometry with no parts (null geometry)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parts(&self) -> &[Vec<Vertex>] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut Vec<Vertex>> {
        self.parts.iter_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| p.is_empty())
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    /// All vertices, part after part
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.parts.iter().flatten()
    }
}
