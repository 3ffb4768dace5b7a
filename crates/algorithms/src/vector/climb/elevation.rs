//! Elevation source resolution
//!
//! Decides where vertex elevations come from before any feature is read:
//! embedded Z when the layer type has it, otherwise a DEM band draped onto
//! the geometries.

use std::rc::Rc;

use climb_core::processing::Feedback;
use climb_core::raster::RasterLayer;
use climb_core::vector::{FeatureSource, GeometryType};
use climb_core::{Error, Result};

use crate::vector::drape::Drape;

/// Message of the configuration error raised for 2D input without a DEM
pub const NO_Z_MESSAGE: &str = "The line layer has no Z values - a DEM is needed";

/// Where the climb algorithm takes elevations from.
#[derive(Debug, Clone)]
pub enum ElevationSource {
    /// Geometries carry Z and are used verbatim
    Embedded {
        /// A DEM was supplied but is not needed
        ignored_raster: bool,
    },
    /// Z is sampled from `band` (1-based) of `raster`
    Raster { raster: Rc<RasterLayer>, band: usize },
}

impl ElevationSource {
    /// Pre-flight resolution.
    ///
    /// Fails with a configuration error when the layer has no Z and no
    /// usable raster band was supplied.
    pub fn resolve(
        geometry_type: GeometryType,
        raster: Option<Rc<RasterLayer>>,
        band: Option<usize>,
    ) -> Result<Self> {
        if geometry_type.has_z() {
            return Ok(Self::Embedded {
                ignored_raster: raster.is_some(),
            });
        }

        let raster = raster.ok_or_else(|| Error::configuration(NO_Z_MESSAGE))?;
        let band = band.ok_or_else(|| {
            Error::configuration(format!(
                "A band of raster '{}' must be selected to add Z values",
                raster.name()
            ))
        })?;
        if band == 0 || band > raster.band_count() {
            return Err(Error::configuration(format!(
                "Band {} is not available in raster '{}' (bands 1 to {})",
                band,
                raster.name(),
                raster.band_count()
            )));
        }

        Ok(Self::Raster { raster, band })
    }

    /// Whether geometries must be draped before accumulation
    pub fn needs_drape(&self) -> bool {
        matches!(self, Self::Raster { .. })
    }

    /// The source to iterate: `source` itself, or its draped copy
    pub fn apply(
        &self,
        source: Rc<dyn FeatureSource>,
        drape: &dyn Drape,
        feedback: &mut Feedback,
    ) -> Result<Rc<dyn FeatureSource>> {
        match self {
            Self::Embedded { ignored_raster } => {
                if *ignored_raster {
                    feedback.push_info(format!(
                        "Layer '{}' has Z values; the DEM is ignored",
                        source.name()
                    ));
                }
                Ok(source)
            }
            Self::Raster { raster, band } => {
                feedback.push_info("Adding Z values from DEM...");
                let draped = drape.drape(source.as_ref(), raster, *band, feedback)?;
                feedback.push_info("Z values added.");
                Ok(Rc::new(draped))
            }
        }
    }
}
