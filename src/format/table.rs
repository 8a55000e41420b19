use std::io::{self, Write};

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use super::Formatter;
use crate::{results::TestResult, suite::Statistics, test::Test};

/// One row of the overview table.
#[derive(Tabled, Clone, Debug)]
struct Row {
    #[tabled(rename = "Test")]
    /// Test name
    name:   String,
    #[tabled(rename = "Result")]
    /// Status text
    result: String,
    #[tabled(rename = "Score")]
    /// Earned over possible weight
    score:  String,
}

/// Prints a "Grading Overview" table once the suite completes.
pub struct TableFormatter<W: Write> {
    /// Report destination
    out:    W,
    /// Rows collected so far
    rows:   Vec<Row>,
    /// Weight earned by passing tests
    earned: u64,
    /// Weight of every reported test
    out_of: u64,
}

impl<W: Write> TableFormatter<W> {
    /// Creates a formatter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
            earned: 0,
            out_of: 0,
        }
    }
}

impl<W: Write> Formatter for TableFormatter<W> {
    fn test_ended(&mut self, test: &Test, result: &TestResult) -> io::Result<()> {
        let weight = u64::from(test.weight());
        let earned = if result.passed() { weight } else { 0 };

        self.earned += earned;
        self.out_of += weight;
        self.rows.push(Row {
            name:   test.name().to_string(),
            result: result.status.to_string(),
            score:  format!("{earned}/{weight}"),
        });
        Ok(())
    }

    fn suite_complete(&mut self, stats: &Statistics) -> io::Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }

        let mut table = Table::new(&self.rows);
        table
            .with(Panel::header("Grading Overview"))
            .with(Panel::footer(format!(
                "Total: {}/{} ({} of {} tests passed)",
                self.earned, self.out_of, stats.passed, stats.total
            )))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(40).keep_words(true)))
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Modify::new(Rows::last()).with(Alignment::center()))
            .with(Style::modern());

        writeln!(self.out, "{table}")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::TestExitStatus;

    #[test]
    fn table_lists_tests_and_weighted_total() {
        let mut buf = Vec::new();
        {
            let mut formatter = TableFormatter::new(&mut buf);
            let heavy = Test::new("heavy", "", || {}).with_weight(4);
            let light = Test::new("light", "", || {});

            formatter
                .test_ended(&heavy, &TestResult::new(TestExitStatus::Pass))
                .unwrap();
            formatter
                .test_ended(&light, &TestResult::new(TestExitStatus::Timeout))
                .unwrap();
            formatter
                .suite_complete(&Statistics {
                    total:  2,
                    passed: 1,
                    failed: 1,
                    score:  0.8,
                })
                .unwrap();
        }

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Grading Overview"));
        assert!(text.contains("heavy"));
        assert!(text.contains("timeout"));
        assert!(text.contains("Total: 4/5"));
    }
}
