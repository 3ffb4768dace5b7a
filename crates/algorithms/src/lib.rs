//! # Climb Algorithms
//!
//! Line elevation analysis built on `climb-core`.
//!
//! ## Available Algorithms
//!
//! - **vector::drape**: set Z values of line vertices from a raster band
//! - **vector::climb**: total climb and descent, min/max elevation per line
//!   and per layer
//!
//! [`climb_provider`] registers every algorithm under the `climb` provider.

pub mod provider;
pub mod vector;

pub use provider::climb_provider;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::provider::climb_provider;
    pub use crate::vector::{
        accumulate_climb, climb_along_line, set_z_from_raster, ClimbAlongLine, ClimbStats,
        ClimbSummary, Drape, SetZFromRaster,
    };
    pub use climb_core::prelude::*;
}
