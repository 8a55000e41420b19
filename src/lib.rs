//! # grading
//!
//! A library for grading programming assignments. Tests are plain closures
//! collected in a [`TestSuite`]; each one runs in a forked child process by
//! default, so a crash, panic or infinite loop in student code is reported
//! as a result instead of taking the grader down. Tests carry weights,
//! timeouts and tags, and results can be reported as a brief log, a verbose
//! log, a table, or Gradescope `results.json`.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use grading::{TestSuite, check_int};
//!
//! fn main() -> std::process::ExitCode {
//!     let mut suite = TestSuite::new();
//!     suite
//!         .add("sum")
//!         .description("sum of 1..=4 is 10")
//!         .timeout(Duration::from_secs(1))
//!         .run(|| drop(check_int(10, (1..=4).sum())));
//!
//!     suite.main()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Command-line parsing for grading executables
pub mod arguments;
/// In-place test declaration
pub mod builder;
/// Expectation checks
pub mod checks;
/// Constant values used throughout
pub mod constants;
/// Library error type
pub mod error;
/// Report formatters
pub mod format;
/// `tracing` subscriber setup
pub mod logging;
/// Forked test execution
pub mod process;
/// Test statuses and results
pub mod results;
/// OS sandboxing for test processes
pub mod sandbox;
/// Test suites and statistics
pub mod suite;

pub use arguments::{Arguments, ArgumentsError};
pub use builder::TestBuilder;
pub use checks::{
    CheckFailure, CheckResult, check, check_eq, check_float, check_float_default, check_int,
    check_string,
};
pub use error::{GradingError, Result};
pub use format::{Formatter, OutputFormat};
pub use process::{run_isolated, run_sandboxed, run_with_output};
pub use results::{TestExitStatus, TestResult};
pub use suite::{Statistics, TestSuite};
pub use test::{RunStrategy, TagSet, Test, TestClosure, run_in_process};
