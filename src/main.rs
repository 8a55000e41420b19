#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # grading-selftest
//!
//! Runs a suite whose tests are *meant* to pass, fail, crash and hang, then
//! verifies that the harness reported each of them correctly. Run it on a
//! grading host to check that process isolation, timeouts and output
//! capture work there.

use std::{
    fs::File,
    io::{BufWriter, IsTerminal, Write},
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, Result, ensure};
use dotenvy::dotenv;
use grading::{
    Arguments, ArgumentsError, Formatter, RunStrategy, Statistics, Test, TestExitStatus,
    TestResult, TestSuite, check_int, format, logging,
};
use tracing::info;

/// Describes a test case in the problem domain.
struct Expectation {
    /// Input values
    values: &'static [i64],
    /// Index passed to the function under test
    index:  usize,
    /// Expected return value
    value:  i64,
}

/// This function contains a logical error.
fn function_under_test(values: &[i64], index: usize) -> i64 {
    let _ = writeln!(std::io::stdout(), "This is stdout from function_under_test(v, {index}).");
    let _ = writeln!(std::io::stderr(), "This is stderr from function_under_test(v, {index}).");

    values[index + 1]
}

/// Checks `function_under_test` against one expectation.
fn test_student_fn(e: &Expectation) {
    let output = function_under_test(e.values, e.index);
    drop(check_int(e.value, output).message(format_args!("index {}", e.index)));
}

/// Even numbers.
const EVEN_NUMBERS: &[i64] = &[2, 4, 6, 8, 10];
/// The Fibonacci sequence.
const FIBONACCI: &[i64] = &[1, 1, 2, 3, 5];

/// The self-test suite, each test paired with the status it must produce.
fn suite() -> (TestSuite, Vec<(&'static str, TestExitStatus)>) {
    let mut suite = TestSuite::new();

    suite
        .add("should pass")
        .description(
            " - correct expectation: the first element in the Fibonacci sequence is 1\n - \
             function_under_test will return the correct value\n - this test should pass",
        )
        .with_expectation(test_student_fn, Expectation {
            values: FIBONACCI,
            index:  0,
            value:  1,
        })
        .add("should fail")
        .description(
            " - incorrect expectation: the first even number is 2\n - function_under_test will \
             return the wrong number\n - this test should fail",
        )
        .weight(10)
        .with_expectation(test_student_fn, Expectation {
            values: EVEN_NUMBERS,
            index:  0,
            value:  2,
        })
        .add("should panic")
        .description(
            " - function_under_test indexes past the end\n - the panic should be contained",
        )
        .with_expectation(test_student_fn, Expectation {
            values: EVEN_NUMBERS,
            index:  4,
            value:  0,
        })
        .add("should segfault")
        .description(" - test raises SIGSEGV\n - the segfault should be contained")
        .run(|| {
            // SAFETY: restoring the default disposition and raising a signal
            // have no memory-safety preconditions.
            unsafe {
                libc::signal(libc::SIGSEGV, libc::SIG_DFL);
                libc::raise(libc::SIGSEGV);
            }
        })
        .add("should abort")
        .description(" - test aborts\n - the abort should be contained")
        .run(|| std::process::abort())
        .add("should timeout")
        .description(" - test loops forever\n - the test should be killed after 1s")
        .timeout(Duration::from_secs(1))
        .run(|| {
            loop {
                std::thread::sleep(Duration::from_millis(10));
            }
        });

    suite.push(
        Test::new(
            "funny output",
            "with \"quoted\" string\nand newlines\nand\ttabs\n",
            || {
                let _ = write!(
                    std::io::stdout(),
                    "Hello! I have \"quotes\" and \t tabs...\n ... and newlines too!\n\nkthxbye"
                );
            },
        )
        .with_tag("output"),
    );

    let expected = vec![
        ("should pass", TestExitStatus::Pass),
        ("should fail", TestExitStatus::Fail),
        ("should panic", TestExitStatus::UncaughtException),
        ("should segfault", TestExitStatus::Segfault),
        ("should abort", TestExitStatus::Abort),
        ("should timeout", TestExitStatus::Timeout),
        ("funny output", TestExitStatus::Pass),
    ];

    (suite, expected)
}

/// Forwards to the real formatter while remembering every status.
struct Recording<'a> {
    /// Formatter producing the user-visible report
    inner:    Box<dyn Formatter + 'a>,
    /// `(test name, status)` in run order
    statuses: Vec<(String, TestExitStatus)>,
}

impl Formatter for Recording<'_> {
    fn test_beginning(&mut self, test: &Test) -> std::io::Result<()> {
        self.inner.test_beginning(test)
    }

    fn test_ended(&mut self, test: &Test, result: &TestResult) -> std::io::Result<()> {
        self.statuses.push((test.name().to_string(), result.status));
        self.inner.test_ended(test, result)
    }

    fn suite_complete(&mut self, stats: &Statistics) -> std::io::Result<()> {
        self.inner.suite_complete(stats)
    }
}

fn main() -> Result<ExitCode> {
    dotenv().ok();
    logging::init();

    let args = match Arguments::from_env() {
        Ok(args) => args,
        Err(ArgumentsError::Help(text)) => {
            println!("{text}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(ArgumentsError::Invalid(text)) => {
            eprintln!("{text}");
            return Ok(ExitCode::from(2));
        }
    };

    ensure!(
        args.run_strategy != RunStrategy::Inline,
        "the self-test crashes on purpose and needs a separated or sandboxed run strategy"
    );

    let (out, colour): (Box<dyn Write>, bool) = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create {}", path.display()))?;
            (Box::new(BufWriter::new(file)), false)
        }
        None => (Box::new(std::io::stdout()), std::io::stdout().is_terminal()),
    };

    let (suite, expected) = suite();
    let mut recording = Recording {
        inner:    format::create(args.format, out, colour),
        statuses: Vec::new(),
    };

    let stats = suite
        .run_with(&args, &mut recording)
        .context("self-test suite could not be run")?;
    info!(score = stats.score, "self-test suite finished");

    let mut mismatches = Vec::new();
    for (name, status) in &recording.statuses {
        if let Some((_, want)) = expected.iter().find(|(n, _)| n == name)
            && want != status
        {
            mismatches.push(format!("'{name}': expected {want}, got {status}"));
        }
    }

    ensure!(mismatches.is_empty(), "harness misreported tests:\n{}", mismatches.join("\n"));
    Ok(ExitCode::SUCCESS)
}
