//! I/O for vector layers
//!
//! GeoJSON is the only persistence format. Rasters are built in memory by
//! the caller.

mod geojson;

pub use geojson::{read_geojson, read_geojson_from_str, write_geojson, GeoJsonSink};
