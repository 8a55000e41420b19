#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

/// Width of the separator lines drawn by the text formatters
pub const LINE_WIDTH: usize = 80;

/// Largest number of bytes kept from each captured stream of a test
pub const MAX_CAPTURED_OUTPUT: u64 = 64 * 1024;

/// Marker appended to captured output that was cut at `MAX_CAPTURED_OUTPUT`
pub const TRUNCATION_MARKER: &str = "\n[... output truncated ...]\n";

/// How long the parent sleeps between polls of a child running under a timeout
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Tolerance used by `check_float_default`
pub const DEFAULT_FLOAT_TOLERANCE: f64 = 0.000_001;

/// Environment variable providing a default for `--format`
pub const FORMAT_ENV: &str = "GRADING_FORMAT";

/// Environment variable providing a default for `--run-strategy`
pub const RUN_STRATEGY_ENV: &str = "GRADING_RUN_STRATEGY";

/// Environment variable providing a default for `--timeout`
pub const TIMEOUT_ENV: &str = "GRADING_TIMEOUT";

/// Environment variable providing a default for `--output`
pub const OUTPUT_ENV: &str = "GRADING_OUTPUT";

/// Environment variable holding the `tracing` filter directives
pub const LOG_ENV: &str = "GRADING_LOG";

/// Filter used when `GRADING_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "warn";
