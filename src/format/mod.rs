#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, io, io::Write, str::FromStr};

use colored::Colorize;

use crate::{
    constants::LINE_WIDTH,
    results::{TestExitStatus, TestResult},
    suite::Statistics,
    test::Test,
};

/// One-line-per-test console output.
pub mod brief;
/// Gradescope autograder `results.json` output.
pub mod gradescope;
/// Summary table output.
pub mod table;
/// Detailed console output including captured streams.
pub mod verbose;

pub use brief::BriefFormatter;
pub use gradescope::{
    GradescopeFormatter, GradescopeOutputFormat, GradescopeStatus, GradescopeSubmission,
    GradescopeTestCase, GradescopeVisibility,
};
pub use table::TableFormatter;
pub use verbose::VerboseFormatter;

/// Which report a suite run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per test
    #[default]
    Brief,
    /// Gradescope JSON
    Gradescope,
    /// Summary table
    Table,
    /// Descriptions and captured output
    Verbose,
}

impl OutputFormat {
    /// Names accepted on the command line.
    pub const VALID: &'static str = "brief, gradescope, table, verbose";
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brief" => Ok(Self::Brief),
            "gradescope" => Ok(Self::Gradescope),
            "table" => Ok(Self::Table),
            "verbose" => Ok(Self::Verbose),
            other => Err(format!("Invalid --format: '{other}'\nValid options: {}", Self::VALID)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Brief => "brief",
            Self::Gradescope => "gradescope",
            Self::Table => "table",
            Self::Verbose => "verbose",
        })
    }
}

/// Receives suite progress and renders a report.
pub trait Formatter {
    /// Called before a test runs.
    fn test_beginning(&mut self, _test: &Test) -> io::Result<()> {
        Ok(())
    }

    /// Called with the result of a test.
    fn test_ended(&mut self, test: &Test, result: &TestResult) -> io::Result<()>;

    /// Called once all selected tests have run.
    fn suite_complete(&mut self, stats: &Statistics) -> io::Result<()>;
}

/// Creates the formatter for `format`, writing to `out`.
///
/// `colour` enables coloured statuses in the console formats. Pass `true`
/// only when `out` is a terminal.
pub fn create<'a, W: Write + 'a>(
    format: OutputFormat,
    out: W,
    colour: bool,
) -> Box<dyn Formatter + 'a> {
    match format {
        OutputFormat::Brief => Box::new(BriefFormatter::new(out).coloured(colour)),
        OutputFormat::Gradescope => Box::new(GradescopeFormatter::new(out)),
        OutputFormat::Table => Box::new(TableFormatter::new(out)),
        OutputFormat::Verbose => Box::new(VerboseFormatter::new(out).coloured(colour)),
    }
}

/// A separator line of `-`.
pub(crate) fn line() -> String {
    "-".repeat(LINE_WIDTH)
}

/// A separator line of `=`.
pub(crate) fn double_line() -> String {
    "=".repeat(LINE_WIDTH)
}

/// Status text, green when passed and red otherwise. Plain unless `colour`.
pub(crate) fn paint(status: TestExitStatus, colour: bool) -> String {
    let text = status.to_string();
    match (colour, status.is_pass()) {
        (false, _) => text,
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    }
}

/// Writes the "Passed p out of t tests" summary shared by console formats.
pub(crate) fn write_summary(out: &mut impl Write, stats: &Statistics) -> io::Result<()> {
    if stats.total > 0 {
        writeln!(out, "Passed {} out of {} tests", stats.passed, stats.total)?;
    }
    out.flush()
}
