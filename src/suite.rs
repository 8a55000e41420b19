#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fs::File,
    io::{self, BufWriter, IsTerminal},
    process::ExitCode,
};

use tracing::{error, info};

use crate::{
    arguments::{Arguments, ArgumentsError},
    builder::TestBuilder,
    error::{GradingError, Result},
    format::{self, Formatter},
    results::{TestExitStatus, TestResult},
    test::Test,
};

/// Totals of one suite run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    /// Tests that ran
    pub total:  usize,
    /// Tests that passed
    pub passed: usize,
    /// Tests that did not pass
    pub failed: usize,
    /// Passed weight over total weight, in `[0, 1]`
    pub score:  f64,
}

/// An ordered collection of tests.
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    /// Tests in declaration order
    tests: Vec<Test>,
}

impl TestSuite {
    /// Creates an empty suite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts declaring a test called `name`; see [`TestBuilder`].
    ///
    /// # Panics
    ///
    /// If `name` is empty.
    pub fn add(&mut self, name: impl Into<String>) -> TestBuilder<'_> {
        let name = name.into();
        assert!(!name.is_empty(), "test names must not be empty");
        TestBuilder::new(self, name)
    }

    /// Appends an already-built test.
    pub fn push(&mut self, test: Test) -> &mut Self {
        self.tests.push(test);
        self
    }

    /// Tests in declaration order.
    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    /// Number of tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// True if the suite has no tests.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Sum of all test weights.
    pub fn total_weight(&self) -> u64 {
        self.tests.iter().map(|t| u64::from(t.weight())).sum()
    }

    /// Tests carrying any of `tags`, or every test when `tags` is empty.
    pub fn selected(&self, tags: &[String]) -> Vec<&Test> {
        self.tests
            .iter()
            .filter(|test| tags.is_empty() || tags.iter().any(|tag| test.has_tag(tag)))
            .collect()
    }

    /// Runs the suite as configured by `args`, reporting to stdout or to
    /// `args.output`.
    pub fn run(&self, args: &Arguments) -> Result<Statistics> {
        if args.skip {
            info!("skipping test execution");
            return Ok(Statistics::default());
        }

        match &args.output {
            Some(path) => {
                let file = File::create(path).map_err(GradingError::Output)?;
                let mut formatter = format::create(args.format, BufWriter::new(file), false);
                self.run_with(args, formatter.as_mut())
            }
            None => {
                let stdout = io::stdout();
                let colour = stdout.is_terminal();
                let mut formatter = format::create(args.format, stdout, colour);
                self.run_with(args, formatter.as_mut())
            }
        }
    }

    /// Runs the suite, reporting through `formatter`.
    pub fn run_with(&self, args: &Arguments, formatter: &mut dyn Formatter) -> Result<Statistics> {
        let mut stats = Statistics::default();
        if args.skip {
            return Ok(stats);
        }

        let selected = self.selected(&args.tags);
        let total_weight: u64 = selected.iter().map(|t| u64::from(t.weight())).sum();
        let mut earned: u64 = 0;

        for test in selected {
            formatter
                .test_beginning(test)
                .map_err(GradingError::Output)?;

            let result = test
                .run(args.run_strategy, args.timeout)
                .unwrap_or_else(|e| {
                    error!(test = test.name(), "could not run test: {e}");
                    TestResult::with_output(TestExitStatus::OtherError, "", e.to_string())
                });

            formatter
                .test_ended(test, &result)
                .map_err(GradingError::Output)?;

            stats.total += 1;
            if result.passed() {
                stats.passed += 1;
                earned += u64::from(test.weight());
            } else {
                stats.failed += 1;
            }
        }

        stats.score = if total_weight == 0 {
            0.0
        } else {
            earned as f64 / total_weight as f64
        };

        formatter
            .suite_complete(&stats)
            .map_err(GradingError::Output)?;
        info!(
            total = stats.total,
            passed = stats.passed,
            score = stats.score,
            "suite complete"
        );
        Ok(stats)
    }

    /// Entry point for grading executables: parses the process arguments,
    /// runs the suite and maps the outcome to an exit code.
    ///
    /// Failing tests still exit successfully; only usage errors (2) and
    /// reporting errors (1) do not.
    pub fn main(&self) -> ExitCode {
        crate::logging::init();

        let args = match Arguments::from_env() {
            Ok(args) => args,
            Err(ArgumentsError::Help(text)) => {
                println!("{text}");
                return ExitCode::SUCCESS;
            }
            Err(ArgumentsError::Invalid(text)) => {
                eprintln!("{text}");
                return ExitCode::from(2);
            }
        };

        match self.run(&args) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        }
    }
}

impl From<Vec<Test>> for TestSuite {
    fn from(tests: Vec<Test>) -> Self {
        Self { tests }
    }
}

impl FromIterator<Test> for TestSuite {
    fn from_iter<I: IntoIterator<Item = Test>>(iter: I) -> Self {
        Self {
            tests: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TestSuite {
    type Item = &'a Test;
    type IntoIter = std::slice::Iter<'a, Test>;

    fn into_iter(self) -> Self::IntoIter {
        self.tests.iter()
    }
}
