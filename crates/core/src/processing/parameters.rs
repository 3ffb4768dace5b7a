//! Declarative parameter/output definitions and their runtime values.
//!
//! Algorithms describe their inputs with [`ParamDef`]s; callers supply a
//! [`Parameters`] map keyed by parameter name and get [`Outputs`] back.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::raster::RasterLayer;
use crate::vector::{FeatureSource, SinkDescriptor};

/// Definition of a single algorithm parameter.
#[derive(Debug, Clone)]
pub struct ParamDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    pub optional: bool,
}

impl ParamDef {
    pub fn required(name: &'static str, label: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            label,
            kind,
            optional: false,
        }
    }

    pub fn optional(name: &'static str, label: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            label,
            kind,
            optional: true,
        }
    }
}

/// The kind of a parameter, which decides the accepted [`ParamValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Line feature source
    LineSource,
    /// Raster layer (e.g. a DEM)
    RasterLayer,
    /// 1-based band of the raster parameter named `parent`
    Band { parent: &'static str },
    /// Output layer destination
    FeatureSink,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineSource => f.write_str("line layer"),
            Self::RasterLayer => f.write_str("raster layer"),
            Self::Band { parent } => write!(f, "band of {}", parent),
            Self::FeatureSink => f.write_str("feature sink"),
        }
    }
}

/// Runtime parameter value.
#[derive(Clone)]
pub enum ParamValue {
    Source(Rc<dyn FeatureSource>),
    Raster(Rc<RasterLayer>),
    Band(usize),
    Sink(SinkDescriptor),
}

impl ParamValue {
    /// Whether this value is acceptable for a parameter of `kind`
    pub fn matches(&self, kind: &ParamKind) -> bool {
        matches!(
            (self, kind),
            (Self::Source(_), ParamKind::LineSource)
                | (Self::Raster(_), ParamKind::RasterLayer)
                | (Self::Band(_), ParamKind::Band { .. })
                | (Self::Sink(_), ParamKind::FeatureSink)
        )
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Source(_) => "feature source",
            Self::Raster(_) => "raster layer",
            Self::Band(_) => "band",
            Self::Sink(_) => "sink",
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(s) => write!(f, "Source({})", s.name()),
            Self::Raster(r) => write!(f, "Raster({})", r.name()),
            Self::Band(b) => write!(f, "Band({})", b),
            Self::Sink(s) => write!(f, "Sink({})", s),
        }
    }
}

/// Parameter values keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct Parameters(BTreeMap<String, ParamValue>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    /// Builder-style [`Parameters::insert`]
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn source(&self, name: &'static str) -> Result<Rc<dyn FeatureSource>> {
        match self.get(name) {
            Some(ParamValue::Source(s)) => Ok(Rc::clone(s)),
            Some(other) => Err(wrong_type(name, other, "feature source")),
            None => Err(Error::MissingParameter(name)),
        }
    }

    pub fn optional_raster(&self, name: &'static str) -> Result<Option<Rc<RasterLayer>>> {
        match self.get(name) {
            Some(ParamValue::Raster(r)) => Ok(Some(Rc::clone(r))),
            Some(other) => Err(wrong_type(name, other, "raster layer")),
            None => Ok(None),
        }
    }

    pub fn optional_band(&self, name: &'static str) -> Result<Option<usize>> {
        match self.get(name) {
            Some(ParamValue::Band(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_type(name, other, "band")),
            None => Ok(None),
        }
    }

    pub fn sink(&self, name: &'static str) -> Result<SinkDescriptor> {
        match self.get(name) {
            Some(ParamValue::Sink(s)) => Ok(s.clone()),
            Some(other) => Err(wrong_type(name, other, "sink")),
            None => Err(Error::MissingParameter(name)),
        }
    }
}

fn wrong_type(name: &'static str, value: &ParamValue, expected: &str) -> Error {
    Error::InvalidParameter {
        name,
        value: value.type_name().to_string(),
        reason: format!("expected a {}", expected),
    }
}

/// Definition of an algorithm output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: OutputKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Number,
    Layer,
}

/// Runtime output value. An undefined number is `Number(None)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Number(Option<f64>),
    Layer(String),
}

/// Output values keyed by output name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Outputs(BTreeMap<String, OutputValue>);

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: OutputValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.0.get(name)
    }

    /// Numeric output; `None` when absent, not a number, or undefined
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(OutputValue::Number(n)) => *n,
            _ => None,
        }
    }

    /// Destination identifier of a layer output
    pub fn layer(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OutputValue::Layer(id)) => Some(id),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
