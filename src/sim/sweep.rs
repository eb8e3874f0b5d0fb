//! Arithmetic sweep of channel parameters.

/// An arithmetic sweep `start, start + step, ..., < stop`.
///
/// Mirrors the way the existing BER-test CLI subcommand computes a list of
/// Eb/N0 values from `--min-ebn0`/`--max-ebn0`/`--step-ebn0`, generalized to
/// any channel parameter (including a BSC crossover probability).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// First value in the sweep (inclusive).
    pub start: f64,
    /// Exclusive upper bound.
    pub stop: f64,
    /// Step between consecutive values; must be positive.
    pub step: f64,
}

impl Sweep {
    /// Number of points in the sweep.
    pub fn len(&self) -> usize {
        ((self.stop - self.start) / self.step).ceil() as usize
    }

    /// Whether the sweep has no points (only possible if `start >= stop`,
    /// which [`crate::config::Config::validate`] rejects before this is
    /// called in practice).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the sweep's points in increasing order.
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |k| self.start + k as f64 * self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_point() {
        let sweep = Sweep {
            start: 10.0,
            stop: 10.5,
            step: 1.0,
        };
        assert_eq!(sweep.len(), 1);
        assert_eq!(sweep.points().collect::<Vec<_>>(), vec![10.0]);
    }

    #[test]
    fn several_points_strictly_increasing() {
        let sweep = Sweep {
            start: 0.5,
            stop: 0.51,
            step: 0.01,
        };
        let points: Vec<_> = sweep.points().collect();
        assert_eq!(points.len(), sweep.len());
        for w in points.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn len_matches_ceil_formula() {
        let sweep = Sweep {
            start: 0.0,
            stop: 1.0,
            step: 0.3,
        };
        // (1.0 - 0.0) / 0.3 = 3.33.. -> ceil = 4
        assert_eq!(sweep.len(), 4);
    }
}
