//! Multi-band raster layer (e.g. a DEM)

use geo_types::Coord;

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::Raster;

/// A named raster layer made of one or more bands sharing a grid.
///
/// Bands are addressed with 1-based indices.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    name: String,
    bands: Vec<Raster<f64>>,
}

impl RasterLayer {
    /// Build a layer from its bands. All bands must have the same shape.
    pub fn new(name: impl Into<String>, bands: Vec<Raster<f64>>) -> Result<Self> {
        let Some(first) = bands.first() else {
            return Err(Error::InvalidDimensions {
                width: 0,
                height: 0,
            });
        };
        let shape = first.shape();
        if let Some(bad) = bands.iter().find(|b| b.shape() != shape) {
            return Err(Error::InvalidDimensions {
                width: bad.cols(),
                height: bad.rows(),
            });
        }
        Ok(Self {
            name: name.into(),
            bands,
        })
    }

    /// Single-band layer
    pub fn single(name: impl Into<String>, band: Raster<f64>) -> Self {
        Self {
            name: name.into(),
            bands: vec![band],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band by 1-based index
    pub fn band(&self, index: usize) -> Option<&Raster<f64>> {
        index.checked_sub(1).and_then(|i| self.bands.get(i))
    }

    /// CRS of the first band
    pub fn crs(&self) -> Option<&CRS> {
        self.bands.first().and_then(|b| b.crs())
    }

    /// Sample `band` at the planar position `at`.
    ///
    /// `Ok(None)` means the point is outside the grid or hits no-data; an
    /// unknown band is an error.
    pub fn sample(&self, band: usize, at: Coord<f64>) -> Result<Option<f64>> {
        let raster = self.band(band).ok_or_else(|| Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("raster '{}' has {} band(s)", self.name, self.band_count()),
        })?;
        Ok(raster.value_at(at.x, at.y))
    }
}
