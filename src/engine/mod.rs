//! Engine module: CLI surface, progress display and the score comparison report

pub mod arg_parser;
pub mod cli;
pub mod compare;
pub mod progress;

// Re-export commonly used functions
pub use arg_parser::{Cli, RunArgs};
pub use cli::handle_run;
pub use compare::{ComparisonReport, compare, compare_results, load_expected, write_report};
