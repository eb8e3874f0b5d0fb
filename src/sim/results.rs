//! Results reporting: console progress and the results file.
//!
//! Formatting, file rewriting, and terminal updates are pulled out of the
//! worker hot path into a [`ResultsSink`], the way the existing `ber`
//! subcommand pulls its `Reporter`/`Progress` pair out of `BerTest::run`.
//! The sink is only ever touched from inside the driver's per-sweep-point
//! critical section (see [`crate::sim::driver`]), never from a worker.

use crate::error::IoError;
use console::Term;
use std::io::Write as _;

/// Derived statistics for one sweep point, recomputed every time a new
/// error frame is folded into the shared counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStats {
    /// The channel parameter for this sweep point.
    pub param: f64,
    /// Frames simulated so far at this point.
    pub frames: u64,
    /// Total bit errors so far at this point.
    pub bit_errors: u64,
    /// Total frame errors so far at this point.
    pub frame_errors: u64,
    /// Sum of per-frame iteration counts so far at this point.
    pub iterations_sum: u64,
    /// `bit_errors / (frames * n)`.
    pub ber: f64,
    /// `frame_errors / frames`.
    pub fer: f64,
    /// `iterations_sum / frames`.
    pub avg_iterations: f64,
    /// Mean wall-clock seconds per frame, excluding time spent in the
    /// critical section itself.
    pub seconds_per_frame: f64,
}

/// A sink for progress and results reporting.
///
/// Implementors are only called from the driver's critical section (see
/// §5 of the design: `bit_errors`, `frame_errors`, the results table, and
/// file/console I/O share one mutex), so methods take `&mut self`.
pub trait ResultsSink: Send {
    /// Called once per observed error frame, with the freshly recomputed
    /// statistics for the sweep point currently running.
    fn record_error_event(&mut self, point_index: usize, min_fec: u64, stats: PointStats);

    /// Called when a sweep point's stop condition is reached, so the sink
    /// can emit a trailing newline on the console.
    fn finish_point(&mut self, _point_index: usize) {}
}

/// An in-memory table of per-point statistics, sized to the sweep length.
///
/// Rows for points not yet reached are `None`; this is the "optional
/// in-memory results sink" named as an external interface.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    rows: Vec<Option<PointStats>>,
}

impl ResultsTable {
    /// Creates a table with `len` empty rows.
    pub fn new(len: usize) -> ResultsTable {
        ResultsTable {
            rows: vec![None; len],
        }
    }

    /// The rows, in sweep order.
    pub fn rows(&self) -> &[Option<PointStats>] {
        &self.rows
    }

    fn set(&mut self, point_index: usize, stats: PointStats) {
        self.rows[point_index] = Some(stats);
    }

    /// Formats the table as the results file's text layout.
    pub fn format(&self, log_frame_time: bool) -> String {
        let mut s = if log_frame_time {
            String::from("snr fer ber frames avg_iter frame_time\n")
        } else {
            String::from("snr fer ber frames avg_iter\n")
        };
        for row in &self.rows {
            match row {
                Some(p) if log_frame_time => {
                    s.push_str(&format!(
                        "{} {} {} {} {} {}\n",
                        p.param, p.fer, p.ber, p.frames, p.avg_iterations, p.seconds_per_frame
                    ));
                }
                Some(p) => {
                    s.push_str(&format!(
                        "{} {} {} {} {}\n",
                        p.param, p.fer, p.ber, p.frames, p.avg_iterations
                    ));
                }
                None => s.push('\n'),
            }
        }
        s
    }

    /// Parses a results file back into a table, the inverse of [`format`](Self::format).
    ///
    /// Only the columns the file actually carries (`param`, `fer`, `ber`,
    /// `frames`, `avg_iter`, and the optional `frame_time`) are recovered;
    /// `bit_errors` is not part of the file format and is always `0` in the
    /// returned rows, while `frame_errors` and `iterations_sum` are
    /// reconstructed from `fer`/`avg_iter` times `frames`. This is enough to
    /// make `format` idempotent (`format(parse(format(t))) == format(t)`),
    /// which is the property the results file needs.
    pub fn parse(text: &str) -> Result<ResultsTable, IoError> {
        let err = |msg: String| IoError::ParseResults(msg);
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| err("missing header line".to_string()))?;
        let log_frame_time = match header.split_whitespace().count() {
            5 => false,
            6 => true,
            n => return Err(err(format!("header has {n} columns, expected 5 or 6"))),
        };

        let parse_f64 = |s: &str| -> Result<f64, IoError> {
            s.parse().map_err(|_| err(format!("not a number: {s}")))
        };

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                rows.push(None);
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let expected = if log_frame_time { 6 } else { 5 };
            if tokens.len() != expected {
                return Err(err(format!(
                    "row has {} columns, expected {expected}: {line}",
                    tokens.len()
                )));
            }
            let param = parse_f64(tokens[0])?;
            let fer = parse_f64(tokens[1])?;
            let ber = parse_f64(tokens[2])?;
            let frames: u64 = tokens[3]
                .parse()
                .map_err(|_| err(format!("not an integer: {}", tokens[3])))?;
            let avg_iterations = parse_f64(tokens[4])?;
            let seconds_per_frame = if log_frame_time {
                parse_f64(tokens[5])?
            } else {
                0.0
            };
            rows.push(Some(PointStats {
                param,
                frames,
                bit_errors: 0,
                frame_errors: (fer * frames as f64).round() as u64,
                iterations_sum: (avg_iterations * frames as f64).round() as u64,
                ber,
                fer,
                avg_iterations,
                seconds_per_frame,
            }));
        }
        Ok(ResultsTable { rows })
    }
}

/// Writes the console progress line and rewrites the results file in full
/// on every error event.
pub struct ConsoleAndFileSink {
    output_path: String,
    table: ResultsTable,
    log_frame_time: bool,
    min_fec_header_printed: bool,
    term: Term,
}

impl ConsoleAndFileSink {
    /// Creates a sink that writes progress to `output_path` and to stdout.
    pub fn new(output_path: impl Into<String>, sweep_len: usize, log_frame_time: bool) -> Self {
        ConsoleAndFileSink {
            output_path: output_path.into(),
            table: ResultsTable::new(sweep_len),
            log_frame_time,
            min_fec_header_printed: false,
            term: Term::stdout(),
        }
    }

    fn rewrite_file(&self) -> std::io::Result<()> {
        let tmp_path = format!("{}.tmp", self.output_path);
        {
            let mut f = std::fs::File::create(&tmp_path)?;
            f.write_all(self.table.format(self.log_frame_time).as_bytes())?;
        }
        std::fs::rename(&tmp_path, &self.output_path)
    }
}

impl ResultsSink for ConsoleAndFileSink {
    fn record_error_event(&mut self, point_index: usize, min_fec: u64, stats: PointStats) {
        self.table.set(point_index, stats);
        if let Err(e) = self.rewrite_file() {
            eprintln!("warning: failed to write results file: {e}");
        }
        if !self.min_fec_header_printed {
            let _ = self.term.write_line(
                "    param |  fec/min |   frames |      ber |      fer | avg iter |  ms/frame",
            );
            self.min_fec_header_printed = true;
        } else {
            let _ = self.term.clear_last_lines(1);
        }
        let _ = self.term.write_line(&format!(
            "{:9.4} | {:4}/{:4} | {:8} | {:8.2e} | {:8.2e} | {:8.2} | {:9.3}",
            stats.param,
            stats.frame_errors,
            min_fec,
            stats.frames,
            stats.ber,
            stats.fer,
            stats.avg_iterations,
            stats.seconds_per_frame * 1e3,
        ));
    }

    fn finish_point(&mut self, _point_index: usize) {
        self.min_fec_header_printed = false;
        let _ = self.term.write_line("");
    }
}

/// A sink that discards all reporting, used in tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl ResultsSink for NullSink {
    fn record_error_event(&mut self, _point_index: usize, _min_fec: u64, _stats: PointStats) {}
}
