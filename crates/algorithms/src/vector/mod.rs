//! Vector analysis algorithms
//!
//! - Drape: set vertex Z values from a raster band
//! - Climb along line: total climb/descent and elevation range of line features

pub mod climb;
pub mod drape;

pub use climb::{accumulate_climb, climb_along_line, ClimbAlongLine, ClimbStats, ClimbSummary};
pub use drape::{set_z_from_raster, Drape, SetZFromRaster};
