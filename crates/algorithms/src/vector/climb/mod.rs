//! Climb along line
//!
//! Total climb and descent along line geometries, from embedded Z values or
//! from a DEM band draped onto the lines. Each output feature gets `climb`,
//! `descent`, `minelev` and `maxelev` fields; the layer totals are returned
//! as scalar outputs.

mod accumulator;
mod elevation;
mod fields;
mod run;

pub use accumulator::{accumulate_climb, accumulate_climb_with, ClimbAccumulator, ClimbStats};
pub use elevation::{ElevationSource, NO_Z_MESSAGE};
pub use fields::{
    FieldProjection, CLIMB_FIELD, DESCENT_FIELD, GENERATED_FIELDS, MAX_ELEVATION_FIELD,
    MIN_ELEVATION_FIELD,
};
pub use run::{climb_along_line, ClimbSummary, LayerAggregate};

use climb_core::processing::{
    validate_parameters, Feedback, OutputDef, OutputKind, OutputValue, Outputs, ParamDef,
    ParamKind, Parameters, ProcessingAlgorithm,
};
use climb_core::Result;
use std::fmt;

use crate::vector::drape::{Drape, SetZFromRaster};

/// Input line layer
pub const INPUT: &str = "INPUT";
/// Optional DEM used when the lines have no Z
pub const DEM: &str = "DEMFORZ";
/// DEM band (1-based)
pub const BAND: &str = "BANDDEM";
/// Output layer
pub const OUTPUT: &str = "OUTPUT";

pub const TOTAL_CLIMB: &str = "TOTALCLIMB";
pub const TOTAL_DESCENT: &str = "TOTALDESCENT";
pub const MIN_ELEVATION: &str = "MINELEVATION";
pub const MAX_ELEVATION: &str = "MAXELEVATION";

const HELP: &str = "The total climb and descent along the line geometries of the \
input line layer are calculated using the Z values of the points making up the lines. \
Z values can be provided by the line geometries or by a DEM, which is then draped \
onto the lines. A DEM is only used when the line layer has no Z values. \
The output layer has extra fields (climb and descent) with the total climb and \
descent of each line, and extra fields (minelev and maxelev) with its minimum and \
maximum elevation. Input fields with these names are removed. \
The layer totals are returned in the TOTALCLIMB, TOTALDESCENT, MINELEVATION and \
MAXELEVATION outputs.";

/// Climb along line algorithm
pub struct ClimbAlongLine {
    drape: Box<dyn Drape>,
}

impl Default for ClimbAlongLine {
    fn default() -> Self {
        Self::with_drape(SetZFromRaster::default())
    }
}

impl fmt::Debug for ClimbAlongLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClimbAlongLine").finish_non_exhaustive()
    }
}

impl ClimbAlongLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another drape when Z comes from a DEM
    pub fn with_drape(drape: impl Drape + 'static) -> Self {
        Self {
            drape: Box::new(drape),
        }
    }

    fn resolve(&self, params: &Parameters) -> Result<ElevationSource> {
        let source = params.source(INPUT)?;
        ElevationSource::resolve(
            source.geometry_type(),
            params.optional_raster(DEM)?,
            params.optional_band(BAND)?,
        )
    }
}

impl ProcessingAlgorithm for ClimbAlongLine {
    fn id(&self) -> &'static str {
        "climbalongline"
    }

    fn display_name(&self) -> &'static str {
        "Climb along line"
    }

    fn group(&self) -> &'static str {
        "Vector analysis"
    }

    fn group_id(&self) -> &'static str {
        "vectoranalysis"
    }

    fn short_help(&self) -> &'static str {
        HELP
    }

    fn parameters(&self) -> Vec<ParamDef> {
        vec![
            ParamDef::required(INPUT, "Line layer", ParamKind::LineSource),
            ParamDef::optional(DEM, "DEM (to get Z values)", ParamKind::RasterLayer),
            ParamDef::optional(BAND, "Band", ParamKind::Band { parent: DEM }),
            ParamDef::required(OUTPUT, "Climb layer", ParamKind::FeatureSink),
        ]
    }

    fn outputs(&self) -> Vec<OutputDef> {
        let number = |name, label| OutputDef {
            name,
            label,
            kind: OutputKind::Number,
        };
        vec![
            OutputDef {
                name: OUTPUT,
                label: "Climb layer",
                kind: OutputKind::Layer,
            },
            number(TOTAL_CLIMB, "Total climb"),
            number(TOTAL_DESCENT, "Total descent"),
            number(MIN_ELEVATION, "Minimum elevation"),
            number(MAX_ELEVATION, "Maximum elevation"),
        ]
    }

    fn check_parameters(&self, params: &Parameters) -> Result<()> {
        validate_parameters(&self.parameters(), params)?;
        self.resolve(params).map(|_| ())
    }

    fn run(&self, params: &Parameters, feedback: &mut Feedback) -> Result<Outputs> {
        let elevation = self.resolve(params)?;
        let output = params.sink(OUTPUT)?;

        let source = elevation.apply(params.source(INPUT)?, self.drape.as_ref(), feedback)?;
        let summary = climb_along_line(source.as_ref(), &output, feedback)?;

        let totals = &summary.aggregate;
        let mut outputs = Outputs::new();
        outputs.insert(OUTPUT, OutputValue::Layer(summary.destination.clone()));
        outputs.insert(TOTAL_CLIMB, OutputValue::Number(Some(totals.total_climb)));
        outputs.insert(TOTAL_DESCENT, OutputValue::Number(Some(totals.total_descent)));
        outputs.insert(MIN_ELEVATION, OutputValue::Number(totals.min_elevation));
        outputs.insert(MAX_ELEVATION, OutputValue::Number(totals.max_elevation));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climb_core::processing::ParamValue;
    use climb_core::vector::SinkDescriptor;
    use climb_core::Error;

    #[test]
    fn test_metadata() {
        let alg = ClimbAlongLine::new();
        assert_eq!(alg.id(), "climbalongline");
        assert_eq!(alg.group_id(), "vectoranalysis");
        let names: Vec<_> = alg.parameters().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["INPUT", "DEMFORZ", "BANDDEM", "OUTPUT"]);
        assert_eq!(alg.outputs().len(), 5);
        assert!(alg.short_help().contains("TOTALCLIMB"));
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let params = Parameters::new().with(OUTPUT, ParamValue::Sink(SinkDescriptor::memory("out")));
        let err = ClimbAlongLine::new().check_parameters(&params).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("INPUT")));
        assert!(err.is_configuration());
    }
}
