//! Flat simulation configuration, shared by the library and the CLI.

use crate::channel::ChannelKind;
use crate::decoder::ArithmeticKind;
use crate::error::ConfigError;
use crate::sim::sweep::Sweep;

/// A complete, validated description of one simulation run.
///
/// `Config` is the single source of truth for both the library entry point
/// ([`crate::sim::SimDriver::new`]) and the `ldpc-sim` CLI binary, which
/// only adds argument parsing and file loading on top of it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the alist file describing the code.
    pub code_path: String,
    /// Path to the results file, rewritten in full on every update.
    pub output_path: String,
    /// Arithmetic sweep of channel parameters.
    pub sweep: Sweep,
    /// Number of parallel worker threads.
    pub threads: usize,
    /// Base seed; worker `i` is seeded with `base_seed + i`.
    pub base_seed: u64,
    /// Channel model.
    pub channel_kind: ChannelKind,
    /// Decoder check-node update rule.
    pub arithmetic: ArithmeticKind,
    /// Maximum number of belief-propagation iterations per frame.
    pub max_iterations: usize,
    /// Maximum number of frames to simulate per sweep point.
    pub max_frames: u64,
    /// Minimum number of frame errors to observe before stopping a sweep
    /// point early.
    pub min_fec: u64,
    /// Whether the decoder exits as soon as the syndrome is all-zero.
    pub early_term: bool,
    /// Whether the results file carries a trailing seconds-per-frame column.
    pub log_frame_time: bool,
}

impl Config {
    /// Checks every invariant that [`crate::sim::SimDriver::new`] would
    /// otherwise have to reject on its own, so that configuration and
    /// startup I/O errors are fatal and reported before any worker thread
    /// is spawned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep.step <= 0.0 {
            return Err(ConfigError::NonPositiveStep(self.sweep.step));
        }
        if !(self.sweep.start < self.sweep.stop) {
            return Err(ConfigError::EmptySweep {
                start: self.sweep.start,
                stop: self.sweep.stop,
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.max_frames == 0 {
            return Err(ConfigError::ZeroMaxFrames);
        }
        if self.min_fec == 0 {
            return Err(ConfigError::ZeroMinFec);
        }
        Ok(())
    }
}
