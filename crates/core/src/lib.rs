//! # Climb Core
//!
//! Core types, traits and I/O for the climb processing library.
//!
//! This crate provides:
//! - `LineGeometry`, `Feature` and the `FeatureSource` / `FeatureSink` seams
//! - `Raster<T>` and `RasterLayer`: georeferenced grids used as elevation models
//! - `CRS`: Coordinate Reference System handling
//! - `ProcessingAlgorithm`: the capability trait shared by every algorithm,
//!   with its parameters, outputs, feedback context and provider registry
//! - GeoJSON I/O for line layers

pub mod crs;
pub mod error;
pub mod io;
pub mod processing;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use processing::{Feedback, ProcessingAlgorithm, Provider};
pub use raster::{GeoTransform, Raster, RasterElement, RasterLayer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::processing::{
        Feedback, OutputValue, Outputs, ParamValue, Parameters, ProcessingAlgorithm, Provider,
    };
    pub use crate::raster::{GeoTransform, Raster, RasterElement, RasterLayer};
    pub use crate::vector::{
        AttributeValue, Feature, FeatureSink, FeatureSource, Field, FieldType, Fields,
        GeometryType, LineGeometry, MemoryLayer, SinkDescriptor, Vertex,
    };
}
