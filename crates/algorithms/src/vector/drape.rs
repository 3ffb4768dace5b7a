//! Drape: set vertex Z values from a raster band
//!
//! Every vertex takes the value of the raster cell containing it. Vertices
//! outside the grid or on no-data cells receive `nodata_value`.

use climb_core::processing::Feedback;
use climb_core::raster::RasterLayer;
use climb_core::vector::{FeatureSource, MemoryLayer};
use climb_core::{Error, Result};

/// Produces a Z-aware copy of a line source from a raster band.
pub trait Drape {
    /// Drape `source` on band `band` (1-based) of `raster`
    fn drape(
        &self,
        source: &dyn FeatureSource,
        raster: &RasterLayer,
        band: usize,
        feedback: &mut Feedback,
    ) -> Result<MemoryLayer>;
}

/// Parameters for setting Z from a raster
#[derive(Debug, Clone, PartialEq)]
pub struct SetZFromRaster {
    /// Multiplier applied to sampled values (default 1.0)
    pub scale: f64,
    /// Z assigned where the raster has no value (default NaN, i.e. skipped
    /// by the climb accumulator)
    pub nodata_value: f64,
}

impl Default for SetZFromRaster {
    fn default() -> Self {
        Self {
            scale: 1.0,
            nodata_value: f64::NAN,
        }
    }
}

impl Drape for SetZFromRaster {
    fn drape(
        &self,
        source: &dyn FeatureSource,
        raster: &RasterLayer,
        band: usize,
        feedback: &mut Feedback,
    ) -> Result<MemoryLayer> {
        set_z_from_raster(source, raster, band, self, feedback)
    }
}

/// Copy `source` into memory, replacing every vertex Z with the value of
/// `band` of `raster` at that vertex.
///
/// The copy keeps the source schema, feature ids and CRS; its geometry type
/// is promoted to the Z variant. No CRS transformation is done, so the
/// raster must share the source CRS.
pub fn set_z_from_raster(
    source: &dyn FeatureSource,
    raster: &RasterLayer,
    band: usize,
    params: &SetZFromRaster,
    feedback: &mut Feedback,
) -> Result<MemoryLayer> {
    if raster.band(band).is_none() {
        return Err(Error::Drape(format!(
            "raster '{}' has no band {} ({} available)",
            raster.name(),
            band,
            raster.band_count()
        )));
    }

    if let (Some(layer_crs), Some(raster_crs)) = (source.crs(), raster.crs()) {
        if !layer_crs.is_equivalent(raster_crs) {
            feedback.push_warning(format!(
                "Layer CRS {} differs from raster CRS {}; coordinates are used as is",
                layer_crs, raster_crs
            ));
        }
    }

    let mut layer = MemoryLayer::new(
        source.name(),
        source.fields().clone(),
        source.geometry_type().with_z(),
        source.crs().cloned(),
    );

    let mut missing = 0usize;
    for mut feature in source.features() {
        for part in feature.geometry.parts_mut() {
            for vertex in part.iter_mut() {
                vertex.z = match raster.sample(band, vertex.coord())? {
                    Some(value) => value * params.scale,
                    None => {
                        missing += 1;
                        params.nodata_value
                    }
                };
            }
        }
        layer
            .push(feature)
            .map_err(|e| Error::Drape(e.to_string()))?;
    }

    if missing > 0 {
        feedback.push_info(format!(
            "{} vertices fell outside raster '{}' or on no-data",
            missing,
            raster.name()
        ));
    }

    Ok(layer)
}
