//! Parity-check code representation.
//!
//! An LDPC code is defined by its parity-check matrix H, which this crate
//! stores as two adjacency lists (one per side of the Tanner graph) rather
//! than as a dense or even sparse matrix type, since the decoder and channel
//! never need anything but read-only adjacency iteration.

/// Immutable sparse parity-check matrix, represented as the adjacency lists
/// of its Tanner graph.
///
/// `var_checks[v]` lists, in insertion order, the indices of the check nodes
/// incident to variable node `v`; `check_vars[c]` lists the variable nodes
/// incident to check node `c`. The two lists are consistent transposes: edge
/// `(v, c)` appears in `var_checks[v]` iff it appears in `check_vars[c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityCheckCode {
    var_checks: Vec<Vec<usize>>,
    check_vars: Vec<Vec<usize>>,
}

impl ParityCheckCode {
    /// Builds a code from its two adjacency lists.
    ///
    /// # Panics
    /// Panics if the adjacency lists are not consistent transposes of one
    /// another, or if any index is out of range. This is only checked in
    /// debug builds, since callers (the `alist` adapter, or tests) are
    /// expected to have already validated the data.
    pub fn from_adjacency(var_checks: Vec<Vec<usize>>, check_vars: Vec<Vec<usize>>) -> Self {
        let code = ParityCheckCode {
            var_checks,
            check_vars,
        };
        debug_assert!(code.is_consistent());
        code
    }

    fn is_consistent(&self) -> bool {
        let m = self.check_vars.len();
        let n = self.var_checks.len();
        for (v, checks) in self.var_checks.iter().enumerate() {
            for &c in checks {
                if c >= m || !self.check_vars[c].contains(&v) {
                    return false;
                }
            }
        }
        for (c, vars) in self.check_vars.iter().enumerate() {
            for &v in vars {
                if v >= n || !self.var_checks[v].contains(&c) {
                    return false;
                }
            }
        }
        true
    }

    /// Number of variable nodes (coded bits).
    pub fn n(&self) -> usize {
        self.var_checks.len()
    }

    /// Number of check nodes (parity equations).
    pub fn m(&self) -> usize {
        self.check_vars.len()
    }

    /// Check nodes incident to variable node `v`.
    pub fn var_checks(&self, v: usize) -> &[usize] {
        &self.var_checks[v]
    }

    /// Variable nodes incident to check node `c`.
    pub fn check_vars(&self, c: usize) -> &[usize] {
        &self.check_vars[c]
    }

    /// Total number of edges in the Tanner graph.
    pub fn num_edges(&self) -> usize {
        self.var_checks.iter().map(Vec::len).sum()
    }

    /// Structural code rate `(n - m) / n`, assuming H has full rank.
    ///
    /// This is the rate used by the AWGN channel to convert an Eb/N0 figure
    /// into a noise standard deviation (see [`crate::channel`]).
    pub fn code_rate(&self) -> f64 {
        let n = self.n() as f64;
        let m = self.m() as f64;
        (n - m) / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repetition_code() -> ParityCheckCode {
        // n=3, m=1, H = [[1,1,1]]
        ParityCheckCode::from_adjacency(vec![vec![0], vec![0], vec![0]], vec![vec![0, 1, 2]])
    }

    #[test]
    fn dimensions() {
        let code = repetition_code();
        assert_eq!(code.n(), 3);
        assert_eq!(code.m(), 1);
        assert_eq!(code.num_edges(), 3);
    }

    #[test]
    fn code_rate() {
        let code = repetition_code();
        assert!((code.code_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn adjacency_is_transposed_consistently() {
        let code = repetition_code();
        for v in 0..code.n() {
            for &c in code.var_checks(v) {
                assert!(code.check_vars(c).contains(&v));
            }
        }
    }

    #[test]
    #[should_panic]
    fn inconsistent_adjacency_panics_in_debug() {
        // check node 0 claims variable 5, which doesn't exist (n=3)
        let _ = ParityCheckCode::from_adjacency(vec![vec![0], vec![0], vec![0]], vec![vec![0, 1, 5]]);
    }
}
