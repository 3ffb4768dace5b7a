//! In-memory raster data structures
//!
//! Rasters are supplied by the caller; there is no file I/O here. A DEM used
//! for draping is a [`RasterLayer`] holding one grid per band.

mod element;
mod geotransform;
mod grid;
mod layer;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use layer::RasterLayer;
