//! Feature sinks

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::crs::CRS;
use crate::error::Result;
use crate::io::GeoJsonSink;
use crate::vector::{Feature, Fields, GeometryType, MemoryLayer};

/// Streaming destination for features.
///
/// Features are accepted one at a time. Nothing is committed until
/// [`FeatureSink::finish`]; a sink dropped without finishing leaves no output.
pub trait FeatureSink {
    fn add_feature(&mut self, feature: Feature) -> Result<()>;

    /// Flush and commit everything written so far
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Where an algorithm should write its output layer.
#[derive(Debug, Clone)]
pub enum SinkDescriptor {
    /// Collect into memory; read back through the store after the run
    Memory(MemoryStore),
    /// Stream a GeoJSON FeatureCollection to a file
    GeoJson(PathBuf),
}

impl SinkDescriptor {
    /// In-memory sink with a fresh store
    pub fn memory(name: impl Into<String>) -> Self {
        Self::Memory(MemoryStore::new(name))
    }

    /// Open the sink for the given schema.
    ///
    /// Returns the sink and its destination identifier.
    pub fn open(
        &self,
        fields: Fields,
        geometry_type: GeometryType,
        crs: Option<CRS>,
    ) -> Result<(Box<dyn FeatureSink>, String)> {
        match self {
            Self::Memory(store) => {
                let layer = MemoryLayer::new(store.name(), fields, geometry_type, crs);
                let sink = MemorySink {
                    layer,
                    store: Some(store.clone()),
                };
                Ok((Box::new(sink), store.id()))
            }
            Self::GeoJson(path) => {
                let sink = GeoJsonSink::create(path, fields, geometry_type, crs)?;
                Ok((Box::new(sink), path.display().to_string()))
            }
        }
    }
}

impl fmt::Display for SinkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(store) => write!(f, "{}", store.id()),
            Self::GeoJson(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Shared handle to the layer produced by a memory sink.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    name: String,
    layer: Rc<RefCell<Option<MemoryLayer>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: Rc::new(RefCell::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination identifier, `memory:<name>`
    pub fn id(&self) -> String {
        format!("memory:{}", self.name)
    }

    /// Whether a finished layer is available
    pub fn is_committed(&self) -> bool {
        self.layer.borrow().is_some()
    }

    /// Take the committed layer out of the store
    pub fn take(&self) -> Option<MemoryLayer> {
        self.layer.borrow_mut().take()
    }
}

/// Sink collecting features into a [`MemoryLayer`].
#[derive(Debug)]
pub struct MemorySink {
    layer: MemoryLayer,
    store: Option<MemoryStore>,
}

impl MemorySink {
    /// Detached sink, inspected through [`MemorySink::layer`]
    pub fn new(fields: Fields, geometry_type: GeometryType, crs: Option<CRS>) -> Self {
        Self {
            layer: MemoryLayer::new("output", fields, geometry_type, crs),
            store: None,
        }
    }

    /// Features written so far
    pub fn layer(&self) -> &MemoryLayer {
        &self.layer
    }

    pub fn into_layer(self) -> MemoryLayer {
        self.layer
    }
}

impl FeatureSink for MemorySink {
    fn add_feature(&mut self, feature: Feature) -> Result<()> {
        self.layer.push(feature)
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let MemorySink { layer, store } = *self;
        if let Some(store) = store {
            *store.layer.borrow_mut() = Some(layer);
        }
        Ok(())
    }
}
