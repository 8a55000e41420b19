use std::io::{self, Write};

use super::{Formatter, double_line, line, paint, write_summary};
use crate::{results::TestResult, suite::Statistics, test::Test};

/// Prints each test's description, result and captured streams.
pub struct VerboseFormatter<W: Write> {
    /// Report destination
    out:         W,
    /// `-` separator
    line:        String,
    /// `=` separator
    double_line: String,
    /// Whether statuses are coloured
    colour:      bool,
}

impl<W: Write> VerboseFormatter<W> {
    /// Creates a formatter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            line: line(),
            double_line: double_line(),
            colour: false,
        }
    }

    /// Enables or disables coloured statuses.
    pub fn coloured(mut self, colour: bool) -> Self {
        self.colour = colour;
        self
    }

    /// Writes one framed section of captured output.
    fn section(&mut self, title: &str, body: &str) -> io::Result<()> {
        writeln!(self.out, "{}\n{title}\n{}", self.line, self.line)?;
        self.out.write_all(body.as_bytes())?;
        if !body.ends_with('\n') {
            writeln!(self.out)?;
        }
        writeln!(self.out, "{}", self.line)
    }
}

impl<W: Write> Formatter for VerboseFormatter<W> {
    fn test_beginning(&mut self, test: &Test) -> io::Result<()> {
        writeln!(self.out, "{}", self.double_line)?;
        writeln!(self.out, "Running test: '{}'.", test.name())?;
        writeln!(self.out, "Description:\n{}", test.description())?;
        self.out.flush()
    }

    fn test_ended(&mut self, _test: &Test, result: &TestResult) -> io::Result<()> {
        writeln!(self.out, "Result: {}", paint(result.status, self.colour))?;

        if !result.output.is_empty() {
            self.section("Standard output (stdout):", &result.output)?;
        }
        if !result.error_output.is_empty() {
            self.section("Error output (stderr):", &result.error_output)?;
        }

        writeln!(self.out, "{}\n", self.double_line)?;
        self.out.flush()
    }

    fn suite_complete(&mut self, stats: &Statistics) -> io::Result<()> {
        write_summary(&mut self.out, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::TestExitStatus;

    #[test]
    fn captured_streams_are_framed_only_when_present() {
        let mut buf = Vec::new();
        {
            let mut formatter = VerboseFormatter::new(&mut buf);
            let test = Test::new("prints", "writes a greeting", || {});
            formatter.test_beginning(&test).unwrap();
            formatter
                .test_ended(&test, &TestResult::with_output(TestExitStatus::Pass, "hello", ""))
                .unwrap();
        }

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Running test: 'prints'."));
        assert!(text.contains("Description:\nwrites a greeting\n"));
        assert!(text.contains("Standard output (stdout):"));
        assert!(text.contains("hello\n"));
        assert!(!text.contains("Error output"));
    }
}
