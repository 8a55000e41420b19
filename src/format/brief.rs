use std::io::{self, Write};

use super::{Formatter, paint, write_summary};
use crate::{results::TestResult, suite::Statistics, test::Test};

/// Prints `Running test 'name'... passed.` for each test.
pub struct BriefFormatter<W: Write> {
    /// Report destination
    out:    W,
    /// Whether statuses are coloured
    colour: bool,
}

impl<W: Write> BriefFormatter<W> {
    /// Creates a formatter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, colour: false }
    }

    /// Enables or disables coloured statuses.
    pub fn coloured(mut self, colour: bool) -> Self {
        self.colour = colour;
        self
    }
}

impl<W: Write> Formatter for BriefFormatter<W> {
    fn test_beginning(&mut self, test: &Test) -> io::Result<()> {
        write!(self.out, "Running test '{}'... ", test.name())?;
        self.out.flush()
    }

    fn test_ended(&mut self, _test: &Test, result: &TestResult) -> io::Result<()> {
        writeln!(self.out, "{}.", paint(result.status, self.colour))?;
        self.out.flush()
    }

    fn suite_complete(&mut self, stats: &Statistics) -> io::Result<()> {
        write_summary(&mut self.out, stats)
    }
}
