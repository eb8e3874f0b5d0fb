//! `ldpc-sim` command-line front-end.
//!
//! Maps a [`clap`]-derived [`Args`] struct onto a [`Config`], loads the code,
//! installs a `ctrlc` stop-flag handler, and runs the sweep, printing
//! progress to the terminal the way the existing `ber` subcommand does.

use crate::channel::ChannelKind;
use crate::config::Config;
use crate::decoder::ArithmeticKind;
use crate::error::{ConfigError, IoError};
use crate::sim::{ConsoleAndFileSink, SimDriver, Sweep};
use clap::Parser;
use std::error::Error as StdError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Command-line arguments for the `ldpc-sim` binary.
#[derive(Debug, Parser)]
#[command(name = "ldpc-sim", about = "Monte-Carlo BER/FER simulation for LDPC codes")]
pub struct Args {
    /// Path to the alist file describing the code.
    alist: String,
    /// Path to the results file, rewritten in full on every update.
    #[arg(long, default_value = "results.txt")]
    output: String,
    /// Channel kind: "awgn" or "bsc".
    #[arg(long, default_value = "awgn", value_parser = parse_channel_kind)]
    channel: ChannelKind,
    /// First value of the sweep (Eb/N0 in dB for AWGN, crossover probability for BSC).
    #[arg(long)]
    start: f64,
    /// Exclusive upper bound of the sweep.
    #[arg(long)]
    stop: f64,
    /// Step between consecutive sweep points.
    #[arg(long)]
    step: f64,
    /// Number of worker threads (defaults to available parallelism).
    #[arg(long)]
    threads: Option<usize>,
    /// Base seed; worker `i` is seeded with `base_seed + i`.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Decoder check-node update rule: "sum-product" or "min-sum".
    #[arg(long, default_value = "sum-product", value_parser = parse_arithmetic_kind)]
    arithmetic: ArithmeticKind,
    /// Magnitude scaling factor for min-sum, in (0, 1].
    #[arg(long, default_value_t = 1.0)]
    min_sum_scale: f64,
    /// Maximum number of belief-propagation iterations per frame.
    #[arg(long, default_value_t = 100)]
    max_iterations: usize,
    /// Maximum number of frames to simulate per sweep point.
    #[arg(long, default_value_t = 1_000_000)]
    max_frames: u64,
    /// Minimum number of frame errors to observe before advancing to the
    /// next sweep point.
    #[arg(long, default_value_t = 100)]
    min_fec: u64,
    /// Disable early termination on an all-zero syndrome.
    #[arg(long)]
    no_early_term: bool,
    /// Add a trailing seconds-per-frame column to the results file.
    #[arg(long)]
    log_frame_time: bool,
}

fn parse_channel_kind(s: &str) -> Result<ChannelKind, String> {
    s.parse()
        .map_err(|_| ConfigError::UnknownChannelKind(s.to_string()).to_string())
}

fn parse_arithmetic_kind(s: &str) -> Result<ArithmeticKind, String> {
    match s {
        "sum-product" => Ok(ArithmeticKind::SumProduct),
        "min-sum" => Ok(ArithmeticKind::MinSum { scale: 1.0 }),
        _ => Err(ConfigError::UnknownArithmetic(s.to_string()).to_string()),
    }
}

impl Args {
    fn to_config(&self) -> Config {
        let arithmetic = match self.arithmetic {
            ArithmeticKind::SumProduct => ArithmeticKind::SumProduct,
            ArithmeticKind::MinSum { .. } => ArithmeticKind::MinSum {
                scale: self.min_sum_scale,
            },
        };
        Config {
            code_path: self.alist.clone(),
            output_path: self.output.clone(),
            sweep: Sweep {
                start: self.start,
                stop: self.stop,
                step: self.step,
            },
            threads: self
                .threads
                .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get())),
            base_seed: self.seed,
            channel_kind: self.channel,
            arithmetic,
            max_iterations: self.max_iterations,
            max_frames: self.max_frames,
            min_fec: self.min_fec,
            early_term: !self.no_early_term,
            log_frame_time: self.log_frame_time,
        }
    }

    /// Runs the `ldpc-sim` binary to completion.
    pub fn run(&self) -> Result<(), Box<dyn StdError>> {
        let config = self.to_config();
        config.validate()?;

        let text = std::fs::read_to_string(&self.alist).map_err(|source| IoError::ReadCode {
            path: self.alist.clone(),
            source,
        })?;
        let code = Arc::new(crate::alist::parse(&text)?);

        // Fail fast if the output path isn't writable, rather than
        // discovering it only after the sweep has already produced results.
        std::fs::File::create(&config.output_path).map_err(|source| IoError::OpenOutput {
            path: config.output_path.clone(),
            source,
        })?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        {
            let stop_flag = Arc::clone(&stop_flag);
            ctrlc::set_handler(move || stop_flag.store(true, std::sync::atomic::Ordering::Relaxed))?;
        }

        let sweep_len = config.sweep.len();
        let mut sink = ConsoleAndFileSink::new(config.output_path.clone(), sweep_len, config.log_frame_time);
        let mut driver = SimDriver::new(config, code)?;

        let start = Instant::now();
        driver.start(&stop_flag, &mut sink)?;
        println!(
            "done in {}",
            humantime::format_duration(Duration::from_secs(start.elapsed().as_secs()))
        );
        Ok(())
    }
}
