#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, time::Duration};

use bpaf::{OptionParser, ParseFailure, Parser, construct, long, short};
use thiserror::Error;

use crate::{
    constants::{FORMAT_ENV, OUTPUT_ENV, RUN_STRATEGY_ENV, TIMEOUT_ENV},
    format::OutputFormat,
    test::RunStrategy,
};

/// Parsed command-line arguments of a grading executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arguments {
    /// How results are reported
    pub format:       OutputFormat,
    /// Skip test execution entirely (e.g., for build testing)
    pub skip:         bool,
    /// How each test is executed
    pub run_strategy: RunStrategy,
    /// Suite-wide time limit per test
    pub timeout:      Option<Duration>,
    /// Only tests carrying one of these tags run; empty means all
    pub tags:         Vec<String>,
    /// Report destination; stdout when absent
    pub output:       Option<PathBuf>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            format:       OutputFormat::Brief,
            skip:         false,
            run_strategy: RunStrategy::Sandboxed,
            timeout:      None,
            tags:         Vec::new(),
            output:       None,
        }
    }
}

/// Why arguments could not be turned into [`Arguments`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentsError {
    /// `--help` was requested; carries the usage text.
    #[error("{0}")]
    Help(String),
    /// The arguments were invalid; carries the message for the user.
    #[error("{0}")]
    Invalid(String),
}

impl From<ParseFailure> for ArgumentsError {
    fn from(failure: ParseFailure) -> Self {
        if matches!(failure, ParseFailure::Stderr(..)) {
            Self::Invalid(failure.unwrap_stderr())
        } else {
            Self::Help(failure.unwrap_stdout())
        }
    }
}

/// Builds the command-line parser.
fn options() -> OptionParser<Arguments> {
    let format = short('f')
        .long("format")
        .env(FORMAT_ENV)
        .help("Output format (brief, gradescope, table, verbose)")
        .argument::<OutputFormat>("FORMAT")
        .fallback(OutputFormat::Brief);

    let skip = short('s')
        .long("skip-tests")
        .help("Skip test execution (e.g., for build testing)")
        .switch();

    let run_strategy = short('r')
        .long("run-strategy")
        .env(RUN_STRATEGY_ENV)
        .help("Strategy for running tests (inline, separated, sandboxed)")
        .argument::<RunStrategy>("STRATEGY")
        .fallback(RunStrategy::Sandboxed);

    let timeout = short('t')
        .long("timeout")
        .env(TIMEOUT_ENV)
        .help("Kill tests after n seconds (0 disables the limit)")
        .argument::<u64>("SECONDS")
        .fallback(0)
        .map(|secs| (secs > 0).then(|| Duration::from_secs(secs)));

    let tags = long("tag")
        .help("Only run tests carrying TAG (may be repeated)")
        .argument::<String>("TAG")
        .many();

    let output = short('o')
        .long("output")
        .env(OUTPUT_ENV)
        .help("Write the report to FILE instead of stdout")
        .argument::<PathBuf>("FILE")
        .optional();

    construct!(Arguments {
        format,
        skip,
        run_strategy,
        timeout,
        tags,
        output
    })
    .to_options()
    .descr("Run the tests built into this grading executable")
}

impl Arguments {
    /// Parses `args`, which must not include the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, ArgumentsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owned: Vec<String> = args.into_iter().map(Into::into).collect();
        let borrowed: Vec<&str> = owned.iter().map(String::as_str).collect();

        options()
            .run_inner(borrowed.as_slice())
            .map_err(ArgumentsError::from)
    }

    /// Parses the arguments this process was started with.
    pub fn from_env() -> Result<Self, ArgumentsError> {
        Self::parse(std::env::args().skip(1))
    }
}
