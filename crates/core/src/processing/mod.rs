//! Processing framework: the algorithm capability trait, its parameters and
//! outputs, the feedback context and the provider registry.

mod feedback;
mod parameters;
mod registry;

pub use feedback::{CancelHandle, Feedback, LogEntry, LogLevel};
pub use parameters::{
    OutputDef, OutputKind, OutputValue, Outputs, ParamDef, ParamKind, ParamValue, Parameters,
};
pub use registry::{AlgorithmFactory, AlgorithmInfo, AlgorithmRegistry, Provider};

use crate::error::{Error, Result};

/// Capability interface shared by every processing algorithm.
///
/// An algorithm describes its parameters and outputs, validates a parameter
/// set before touching any data, and runs against an explicit [`Feedback`].
pub trait ProcessingAlgorithm {
    /// Stable identifier, lowercase alphanumeric
    fn id(&self) -> &'static str;

    /// Human readable name
    fn display_name(&self) -> &'static str;

    fn group(&self) -> &'static str;

    fn group_id(&self) -> &'static str;

    /// Short help text
    fn short_help(&self) -> &'static str {
        ""
    }

    fn parameters(&self) -> Vec<ParamDef>;

    fn outputs(&self) -> Vec<OutputDef>;

    /// Pre-flight validation. Runs before any feature is read.
    ///
    /// The default checks that every required parameter is present and that
    /// every supplied value fits its parameter kind.
    fn check_parameters(&self, params: &Parameters) -> Result<()> {
        validate_parameters(&self.parameters(), params)
    }

    /// Run with already validated parameters
    fn run(&self, params: &Parameters, feedback: &mut Feedback) -> Result<Outputs>;

    /// Validate, then run
    fn execute(&self, params: &Parameters, feedback: &mut Feedback) -> Result<Outputs> {
        self.check_parameters(params)?;
        self.run(params, feedback)
    }
}

/// Check `params` against the declared definitions: every required
/// parameter is present and every supplied value fits its kind.
pub fn validate_parameters(defs: &[ParamDef], params: &Parameters) -> Result<()> {
    for def in defs {
        match params.get(def.name) {
            Some(value) if !value.matches(&def.kind) => {
                return Err(Error::InvalidParameter {
                    name: def.name,
                    value: format!("{:?}", value),
                    reason: format!("expected a {}", def.kind),
                });
            }
            None if !def.optional => return Err(Error::MissingParameter(def.name)),
            _ => {}
        }
    }
    Ok(())
}
