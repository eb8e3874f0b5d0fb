//! Per-worker channel simulation.
//!
//! A [`Channel`] draws a received vector for the all-zero BPSK codeword over
//! either an AWGN or a binary symmetric channel, and converts it into LLRs
//! for the decoder. Each `Channel` owns its own reproducible RNG (see
//! [`crate::rand`]), so it is exclusively owned by one simulation worker.

use crate::error::DomainError;
use crate::rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Normal};

/// Which channel model a [`Channel`] simulates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ChannelKind {
    /// Additive white Gaussian noise channel with BPSK signaling.
    Awgn,
    /// Binary symmetric channel.
    Bsc,
}

impl std::str::FromStr for ChannelKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "awgn" => Ok(ChannelKind::Awgn),
            "bsc" => Ok(ChannelKind::Bsc),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChannelKind::Awgn => "awgn",
            ChannelKind::Bsc => "bsc",
        })
    }
}

#[derive(Debug, Clone)]
enum Model {
    Awgn { sigma: f64 },
    Bsc { crossover: f64 },
}

/// A per-worker stochastic channel.
///
/// Simulates the transmission of the all-zero codeword (see the crate-level
/// Non-goals: this engine never encodes a message) and produces LLRs for the
/// decoder.
#[derive(Debug, Clone)]
pub struct Channel {
    kind: ChannelKind,
    model: Model,
    rng: Rng,
    received: Vec<f64>,
}

impl Channel {
    /// Creates a channel of the given kind, seeded from `seed`.
    ///
    /// The channel parameter is left at an arbitrary default (AWGN: `sigma =
    /// 1.0`; BSC: `crossover = 0.0`) until [`Channel::set_parameter`] is
    /// called.
    pub fn new(kind: ChannelKind, seed: u64, n: usize) -> Channel {
        let model = match kind {
            ChannelKind::Awgn => Model::Awgn { sigma: 1.0 },
            ChannelKind::Bsc => Model::Bsc { crossover: 0.0 },
        };
        Channel {
            kind,
            model,
            rng: Rng::seed_from_u64(seed),
            received: vec![0.0; n],
        }
    }

    /// Which channel model this is.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Sets the channel parameter.
    ///
    /// For AWGN, `x` is an Eb/N0 in dB and `code_rate` is the code's
    /// structural rate; the noise standard deviation is derived as
    /// `sigma = sqrt(1 / (2 * R * 10^(x/10)))`.
    ///
    /// For BSC, `x` is the crossover probability directly; it must lie in
    /// `[0, 1]` or this returns [`DomainError`]. Values above `0.5` are
    /// clamped to `0.5` for the LLR formula (a BSC with `p > 0.5` is
    /// equivalent to one with `1 - p` and inverted hard decisions, so
    /// clamping rather than rejecting matches the physical channel).
    pub fn set_parameter(&mut self, code_rate: f64, x: f64) -> Result<(), DomainError> {
        match self.kind {
            ChannelKind::Awgn => {
                let ebn0 = 10.0_f64.powf(x / 10.0);
                let esn0 = code_rate * ebn0;
                let sigma = (1.0 / (2.0 * esn0)).sqrt();
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(DomainError::InvalidSigma {
                        ebn0_db: x,
                        code_rate,
                        sigma,
                    });
                }
                self.model = Model::Awgn { sigma };
            }
            ChannelKind::Bsc => {
                if !(0.0..=1.0).contains(&x) {
                    return Err(DomainError::InvalidCrossover(x));
                }
                self.model = Model::Bsc {
                    crossover: x.min(0.5),
                };
            }
        }
        Ok(())
    }

    /// Draws a new received vector for the all-zero BPSK codeword.
    ///
    /// Deterministic given the sequence of calls to `simulate` for a fixed
    /// seed.
    pub fn simulate(&mut self) {
        match self.model {
            Model::Awgn { sigma } => {
                let noise = Normal::new(0.0, sigma).expect("non-negative sigma");
                for r in self.received.iter_mut() {
                    *r = 1.0 + noise.sample(&mut self.rng);
                }
            }
            Model::Bsc { crossover } => {
                let flip = Bernoulli::new(crossover).expect("crossover in [0, 0.5]");
                for r in self.received.iter_mut() {
                    *r = if flip.sample(&mut self.rng) { 1.0 } else { 0.0 };
                }
            }
        }
    }

    /// Writes the LLRs corresponding to the last [`Channel::simulate`] call
    /// into `llrs`, which must have the same length as the code.
    ///
    /// For AWGN: `llr = 2 * received / sigma^2`.
    /// For BSC: `llr = log((1 - p) / p) * (1 - 2 * received)`, with
    /// `received` in `{0, 1}`.
    pub fn compute_llrs(&self, llrs: &mut [f64]) {
        assert_eq!(llrs.len(), self.received.len());
        match self.model {
            Model::Awgn { sigma } => {
                let scale = 2.0 / (sigma * sigma);
                for (llr, &r) in llrs.iter_mut().zip(self.received.iter()) {
                    *llr = scale * r;
                }
            }
            Model::Bsc { crossover } => {
                let scale = ((1.0 - crossover) / crossover).ln();
                for (llr, &r) in llrs.iter_mut().zip(self.received.iter()) {
                    *llr = scale * (1.0 - 2.0 * r);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awgn_zero_sigma_is_noiseless() {
        let mut channel = Channel::new(ChannelKind::Awgn, 1, 8);
        channel.set_parameter(1.0, 1000.0).unwrap();
        channel.simulate();
        let mut llrs = vec![0.0; 8];
        channel.compute_llrs(&mut llrs);
        assert!(llrs.iter().all(|&l| l > 0.0));
    }

    #[test]
    fn bsc_zero_crossover_is_noiseless() {
        let mut channel = Channel::new(ChannelKind::Bsc, 1, 8);
        channel.set_parameter(1.0, 0.0).unwrap();
        channel.simulate();
        let mut llrs = vec![0.0; 8];
        channel.compute_llrs(&mut llrs);
        assert!(llrs.iter().all(|&l| l.is_infinite() && l > 0.0));
    }

    #[test]
    fn awgn_rejects_nonpositive_code_rate() {
        let mut channel = Channel::new(ChannelKind::Awgn, 1, 8);
        // A code rate of zero (e.g. m >= n) makes Es/N0 zero regardless of
        // Eb/N0, which would otherwise yield an infinite sigma.
        assert!(channel.set_parameter(0.0, 5.0).is_err());
        assert!(channel.set_parameter(-0.5, 5.0).is_err());
    }

    #[test]
    fn bsc_rejects_out_of_range_probability() {
        let mut channel = Channel::new(ChannelKind::Bsc, 1, 8);
        assert!(channel.set_parameter(1.0, 1.5).is_err());
        assert!(channel.set_parameter(1.0, -0.1).is_err());
    }

    #[test]
    fn bsc_clamps_above_half() {
        let mut channel = Channel::new(ChannelKind::Bsc, 1, 8);
        assert!(channel.set_parameter(1.0, 0.9).is_ok());
    }

    #[test]
    fn determinism_given_same_seed_and_calls() {
        let mut a = Channel::new(ChannelKind::Awgn, 42, 16);
        let mut b = Channel::new(ChannelKind::Awgn, 42, 16);
        a.set_parameter(0.5, 3.0).unwrap();
        b.set_parameter(0.5, 3.0).unwrap();
        let mut llrs_a = vec![0.0; 16];
        let mut llrs_b = vec![0.0; 16];
        for _ in 0..5 {
            a.simulate();
            b.simulate();
            a.compute_llrs(&mut llrs_a);
            b.compute_llrs(&mut llrs_b);
            assert_eq!(llrs_a, llrs_b);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Channel::new(ChannelKind::Awgn, 1, 16);
        let mut b = Channel::new(ChannelKind::Awgn, 2, 16);
        a.set_parameter(0.5, 3.0).unwrap();
        b.set_parameter(0.5, 3.0).unwrap();
        a.simulate();
        b.simulate();
        let mut llrs_a = vec![0.0; 16];
        let mut llrs_b = vec![0.0; 16];
        a.compute_llrs(&mut llrs_a);
        b.compute_llrs(&mut llrs_b);
        assert_ne!(llrs_a, llrs_b);
    }
}
