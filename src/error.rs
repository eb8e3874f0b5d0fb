//! Crate-wide error types.
//!
//! Errors are split into the three kinds that the simulation driver and its
//! collaborators can raise: invalid configuration, I/O failure, and a value
//! falling outside the domain a formula is defined on.

use thiserror::Error;

/// Error raised while validating a [`crate::config::Config`] or constructing
/// a [`crate::sim::SimDriver`] from one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The sweep's step is not strictly positive.
    #[error("sweep step must be positive, got {0}")]
    NonPositiveStep(f64),
    /// The sweep's start is not strictly less than its stop.
    #[error("sweep start ({start}) must be less than stop ({stop})")]
    EmptySweep {
        /// Sweep start.
        start: f64,
        /// Sweep stop.
        stop: f64,
    },
    /// The worker count was zero.
    #[error("thread count must be at least 1")]
    ZeroThreads,
    /// The BP iteration cap was zero.
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
    /// `max_frames` was zero.
    #[error("max_frames must be at least 1")]
    ZeroMaxFrames,
    /// `min_fec` was zero.
    #[error("min_fec must be at least 1")]
    ZeroMinFec,
    /// The channel kind string did not name a known channel.
    #[error("unknown channel kind '{0}' (expected 'awgn' or 'bsc')")]
    UnknownChannelKind(String),
    /// The decoder arithmetic string did not name a known strategy.
    #[error("unknown decoder arithmetic '{0}' (expected 'sum-product' or 'min-sum')")]
    UnknownArithmetic(String),
}

/// Error raised by file I/O performed before or during a simulation.
#[derive(Debug, Error)]
pub enum IoError {
    /// The alist file could not be read from disk.
    #[error("failed to read code file {path}: {source}")]
    ReadCode {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The alist file was not a valid alist.
    #[error("failed to parse alist: {0}")]
    ParseAlist(String),
    /// The results file was not in the expected line-oriented layout.
    #[error("failed to parse results file: {0}")]
    ParseResults(String),
    /// The output path could not be opened for writing at startup.
    #[error("failed to open output file {path}: {source}")]
    OpenOutput {
        /// Path that was opened.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Error raised when a channel parameter falls outside its domain.
#[derive(Debug, Clone, Copy, Error)]
pub enum DomainError {
    /// A BSC crossover probability was not in `[0, 1]`.
    #[error("BSC crossover probability {0} is not in [0, 1]")]
    InvalidCrossover(f64),
    /// An AWGN Eb/N0 (combined with the code rate) produced a noise standard
    /// deviation that is not a positive finite number.
    #[error("AWGN Eb/N0 of {ebn0_db} dB at code rate {code_rate} yields a non-finite or non-positive sigma ({sigma})")]
    InvalidSigma {
        /// The Eb/N0 value, in dB, that was passed to `set_parameter`.
        ebn0_db: f64,
        /// The code's structural rate.
        code_rate: f64,
        /// The resulting (invalid) sigma.
        sigma: f64,
    },
}

/// Top-level error type covering every failure mode in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An I/O operation failed.
    #[error(transparent)]
    Io(#[from] IoError),
    /// A value fell outside its domain.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
