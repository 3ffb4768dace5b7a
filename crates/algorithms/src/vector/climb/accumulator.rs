//! Climb and descent accumulation along a single (multi-part) line geometry
//!
//! Each part is walked in vertex order. Consecutive valid elevations produce
//! a delta; strictly positive deltas add to climb and strictly negative ones
//! add their magnitude to descent. Invalid (non-finite) elevations are
//! skipped without breaking the chain, so `[10, NaN, 10]` yields 0/0.
//! Parts never share a delta chain, while min/max span every part.

use climb_core::vector::{LineGeometry, Vertex};

/// Per-feature climb statistics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClimbStats {
    /// Sum of positive deltas (>= 0)
    pub climb: f64,
    /// Sum of the magnitudes of negative deltas (>= 0)
    pub descent: f64,
    /// Lowest valid elevation, `None` when the feature has none
    pub min_elevation: Option<f64>,
    /// Highest valid elevation, `None` when the feature has none
    pub max_elevation: Option<f64>,
    /// Vertices skipped for lacking a valid elevation
    pub skipped_vertices: usize,
}

impl ClimbStats {
    /// Whether any vertex carried a valid elevation
    pub fn has_elevation(&self) -> bool {
        self.min_elevation.is_some()
    }

    /// Net elevation change, `climb - descent`
    pub fn net(&self) -> f64 {
        self.climb - self.descent
    }
}

/// Streaming accumulator for one feature.
///
/// Call [`ClimbAccumulator::start_part`] before the vertices of every part,
/// then [`ClimbAccumulator::push`] each elevation in order.
#[derive(Debug, Clone, Default)]
pub struct ClimbAccumulator {
    stats: ClimbStats,
    previous: Option<f64>,
}

impl ClimbAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new part; the previous elevation is forgotten
    pub fn start_part(&mut self) {
        self.previous = None;
    }

    /// Feed the next elevation of the current part.
    ///
    /// Returns `false` if `z` is not finite and was skipped.
    pub fn push(&mut self, z: f64) -> bool {
        if !z.is_finite() {
            self.stats.skipped_vertices += 1;
            return false;
        }

        if let Some(previous) = self.previous {
            let delta = z - previous;
            if delta > 0.0 {
                self.stats.climb += delta;
            } else if delta < 0.0 {
                self.stats.descent -= delta;
            }
        }

        self.stats.min_elevation = Some(self.stats.min_elevation.map_or(z, |m| m.min(z)));
        self.stats.max_elevation = Some(self.stats.max_elevation.map_or(z, |m| m.max(z)));
        self.previous = Some(z);
        true
    }

    /// Feed every vertex of one part
    pub fn add_part<'a>(&mut self, vertices: impl IntoIterator<Item = &'a Vertex>) {
        self.start_part();
        for vertex in vertices {
            self.push(vertex.z);
        }
    }

    pub fn finish(self) -> ClimbStats {
        self.stats
    }
}

/// Climb statistics of a geometry
pub fn accumulate_climb(geometry: &LineGeometry) -> ClimbStats {
    accumulate_climb_with(geometry, |_| {})
}

/// Climb statistics of a geometry, calling `on_missing` for every vertex
/// skipped for lacking a valid elevation
pub fn accumulate_climb_with<F>(geometry: &LineGeometry, mut on_missing: F) -> ClimbStats
where
    F: FnMut(&Vertex),
{
    let mut acc = ClimbAccumulator::new();
    for part in geometry.parts() {
        acc.start_part();
        for vertex in part {
            if !acc.push(vertex.z) {
                on_missing(vertex);
            }
        }
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(zs: &[f64]) -> LineGeometry {
        let coords: Vec<_> = zs
            .iter()
            .enumerate()
            .map(|(i, &z)| (i as f64, 0.0, z))
            .collect();
        LineGeometry::from_xyz(&coords)
    }

    fn multi(parts: &[&[f64]]) -> LineGeometry {
        LineGeometry::new(
            parts
                .iter()
                .map(|zs| {
                    zs.iter()
                        .enumerate()
                        .map(|(i, &z)| Vertex::new(i as f64, 0.0, z))
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn test_mixed_profile() {
        let stats = accumulate_climb(&line(&[10.0, 15.0, 12.0, 18.0]));
        assert_relative_eq!(stats.climb, 11.0);
        assert_relative_eq!(stats.descent, 3.0);
        assert_eq!(stats.min_elevation, Some(10.0));
        assert_eq!(stats.max_elevation, Some(18.0));
        assert_eq!(stats.skipped_vertices, 0);
    }

    #[test]
    fn test_net_equals_end_minus_start() {
        let zs = [102.5, 99.0, 99.0, 130.25, 87.0, 88.5, 140.0];
        let stats = accumulate_climb(&line(&zs));
        assert_relative_eq!(stats.net(), zs[zs.len() - 1] - zs[0], epsilon = 1e-9);
        assert!(stats.climb >= 0.0 && stats.descent >= 0.0);
    }

    #[test]
    fn test_net_over_generated_profiles() {
        for seed in 0..40u32 {
            let len = 2 + (seed as usize * 7) % 90;
            let phase = f64::from(seed) * 0.37;
            let mut zs: Vec<f64> = (0..len)
                .map(|i| {
                    let t = i as f64 * 0.61 + phase;
                    (t.sin() * 180.0 + (t * 2.3).cos() * 17.5) - 45.25 + f64::from(seed) / 8.0
                })
                .collect();
            // interior gaps must not change the identity
            for i in (3..len.saturating_sub(1)).step_by(5) {
                zs[i] = f64::NAN;
            }

            let stats = accumulate_climb(&line(&zs));
            let valid: Vec<f64> = zs.iter().copied().filter(|z| z.is_finite()).collect();
            let (first, last) = (valid[0], valid[valid.len() - 1]);

            assert_relative_eq!(stats.net(), last - first, epsilon = 1e-9);
            assert!(stats.climb >= 0.0 && stats.descent >= 0.0);
            let (min, max) = (stats.min_elevation.unwrap(), stats.max_elevation.unwrap());
            assert!(min <= first.min(last) && max >= first.max(last));
            assert_eq!(stats.skipped_vertices, zs.len() - valid.len());
        }
    }

    #[test]
    fn test_invalid_vertex_does_not_reset_previous() {
        let mut missing = Vec::new();
        let stats = accumulate_climb_with(&line(&[10.0, f64::NAN, 10.0]), |v| missing.push(v.x));
        assert_eq!(stats.climb, 0.0);
        assert_eq!(stats.descent, 0.0);
        assert_eq!(stats.skipped_vertices, 1);
        assert_eq!(missing, vec![1.0]);
    }

    #[test]
    fn test_infinite_z_is_invalid() {
        let stats = accumulate_climb(&line(&[5.0, f64::INFINITY, 8.0, f64::NEG_INFINITY]));
        assert_relative_eq!(stats.climb, 3.0);
        assert_eq!(stats.max_elevation, Some(8.0));
        assert_eq!(stats.skipped_vertices, 2);
    }

    #[test]
    fn test_degenerate_parts_contribute_nothing() {
        let stats = accumulate_climb(&multi(&[&[f64::NAN, f64::NAN], &[42.0]]));
        assert_eq!(stats.climb, 0.0);
        assert_eq!(stats.descent, 0.0);
        assert_eq!(stats.min_elevation, Some(42.0));
        assert_eq!(stats.max_elevation, Some(42.0));
    }

    #[test]
    fn test_no_valid_elevation_leaves_min_max_undefined() {
        let stats = accumulate_climb(&line(&[f64::NAN, f64::NAN]));
        assert!(!stats.has_elevation());
        assert_eq!(stats.max_elevation, None);
        assert_eq!(accumulate_climb(&LineGeometry::empty()), ClimbStats::default());
    }

    #[test]
    fn test_parts_are_independent() {
        let a: &[f64] = &[0.0, 10.0, 5.0];
        let b: &[f64] = &[100.0, 90.0, 95.0];
        let whole = accumulate_climb(&multi(&[a, b]));
        let first = accumulate_climb(&multi(&[a]));
        let second = accumulate_climb(&multi(&[b]));

        // no delta between the end of one part and the start of the next
        assert_relative_eq!(whole.climb, first.climb + second.climb);
        assert_relative_eq!(whole.descent, first.descent + second.descent);
        assert_eq!(whole.min_elevation, Some(0.0));
        assert_eq!(whole.max_elevation, Some(100.0));
    }

    #[test]
    fn test_flat_segments_count_as_neither() {
        let mut acc = ClimbAccumulator::new();
        acc.add_part(line(&[7.0, 7.0, 7.0]).vertices());
        let stats = acc.finish();
        assert_eq!((stats.climb, stats.descent), (0.0, 0.0));
    }
}
