//! The `climb` processing provider

use climb_core::processing::{Provider, ProcessingAlgorithm};
use climb_core::Result;

use crate::vector::ClimbAlongLine;

pub const PROVIDER_ID: &str = "climb";
pub const PROVIDER_NAME: &str = "Climb";

fn climb_along_line() -> Box<dyn ProcessingAlgorithm> {
    Box::new(ClimbAlongLine::new())
}

/// Provider with every algorithm of this crate registered
pub fn climb_provider() -> Result<Provider> {
    Provider::new(PROVIDER_ID, PROVIDER_NAME)
        .with_long_name("Climb (total climb and descent along lines)")
        .with_algorithm(climb_along_line)
}
