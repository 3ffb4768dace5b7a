//! Run loop: stream features through the accumulator into a sink while
//! folding layer totals

use climb_core::processing::Feedback;
use climb_core::vector::{Feature, FeatureSource, SinkDescriptor};
use climb_core::Result;
use tracing::debug;

use super::accumulator::{accumulate_climb_with, ClimbStats};
use super::fields::FieldProjection;

/// Layer-wide totals and elevation range.
///
/// Min/max stay `None` until a feature with a valid elevation is folded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerAggregate {
    pub total_climb: f64,
    pub total_descent: f64,
    pub min_elevation: Option<f64>,
    pub max_elevation: Option<f64>,
}

impl LayerAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the statistics of one feature
    pub fn fold(&mut self, stats: &ClimbStats) {
        self.total_climb += stats.climb;
        self.total_descent += stats.descent;
        if let Some(min) = stats.min_elevation {
            self.min_elevation = Some(self.min_elevation.map_or(min, |m| m.min(min)));
        }
        if let Some(max) = stats.max_elevation {
            self.max_elevation = Some(self.max_elevation.map_or(max, |m| m.max(max)));
        }
    }
}

impl<'a> FromIterator<&'a ClimbStats> for LayerAggregate {
    fn from_iter<I: IntoIterator<Item = &'a ClimbStats>>(iter: I) -> Self {
        let mut aggregate = Self::new();
        for stats in iter {
            aggregate.fold(stats);
        }
        aggregate
    }
}

/// Result of a climb run
#[derive(Debug, Clone, PartialEq)]
pub struct ClimbSummary {
    /// Destination identifier of the output layer
    pub destination: String,
    pub aggregate: LayerAggregate,
    /// Features written to the sink
    pub features: usize,
    /// The run stopped early on cancellation
    pub canceled: bool,
}

/// Compute climb and descent for every feature of `source` and write the
/// annotated features to `output`.
///
/// `source` must already carry the elevations to use. Cancellation is polled
/// before each feature; a canceled run still commits the features written so
/// far and reports partial totals.
pub fn climb_along_line(
    source: &dyn FeatureSource,
    output: &SinkDescriptor,
    feedback: &mut Feedback,
) -> Result<ClimbSummary> {
    let projection = FieldProjection::new(source.fields());
    for warning in projection.warnings() {
        feedback.push_warning(warning);
    }

    let (mut sink, destination) = output.open(
        projection.fields().clone(),
        source.geometry_type(),
        source.crs().cloned(),
    )?;

    let count = source.feature_count().filter(|&n| n > 0);
    let mut aggregate = LayerAggregate::new();
    let mut processed = 0usize;
    let mut canceled = false;

    for feature in source.features() {
        if feedback.is_canceled() {
            canceled = true;
            break;
        }

        let Feature {
            id,
            geometry,
            attributes,
        } = feature;
        let stats = accumulate_climb_with(&geometry, |vertex| {
            feedback.push_debug(format!(
                "Missing Z value at ({}, {}) in feature {}",
                vertex.x, vertex.y, id
            ));
        });

        let row = projection.project(attributes, &stats);
        sink.add_feature(Feature::new(id, geometry, row))?;
        aggregate.fold(&stats);

        processed += 1;
        if let Some(total) = count {
            feedback.set_progress(((processed * 100) / total) as u32);
        }
    }

    sink.finish()?;
    debug!(
        "Wrote {} feature(s) to {} (climb {:.3}, descent {:.3})",
        processed, destination, aggregate.total_climb, aggregate.total_descent
    );

    if canceled {
        feedback.push_info(format!(
            "Canceled after {} feature(s); partial results kept",
            processed
        ));
    }

    Ok(ClimbSummary {
        destination,
        aggregate,
        features: processed,
        canceled,
    })
}
