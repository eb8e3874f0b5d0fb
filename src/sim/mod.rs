//! Monte-Carlo simulation driver and results reporting.

pub mod driver;
pub mod results;
pub mod sweep;

pub use driver::SimDriver;
pub use results::{ConsoleAndFileSink, NullSink, PointStats, ResultsSink, ResultsTable};
pub use sweep::Sweep;
