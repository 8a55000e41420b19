#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Expectation checks used inside test closures.
//!
//! A failing [`CheckResult`] reports itself when it is dropped: it writes an
//! "expected X, got Y" message to stderr and unwinds the test with a
//! [`CheckFailure`] payload, which the runner records as a failed test.
//! Results can be combined with `&` and `|` before they are dropped, and
//! annotated with [`CheckResult::message`].

use std::{
    fmt::Display,
    io::Write,
    ops::{BitAnd, BitOr},
};

use crate::constants::DEFAULT_FLOAT_TOLERANCE;

/// Unwind payload carried out of a test by a failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    /// Expected value, empty for plain boolean checks
    pub expected: String,
    /// Actual value, or the description of a failed condition
    pub actual:   String,
    /// Extra context attached with [`CheckResult::message`]
    pub message:  String,
}

impl Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nCheck failed: {}", self.message)?;
        if self.expected.is_empty() {
            writeln!(f, "  {}", self.actual)?;
        } else {
            writeln!(f, "  expected `{}`, got `{}`", self.expected, self.actual)?;
        }
        writeln!(f)
    }
}

/// The outcome of one check.
///
/// Dropping a failed, un-cancelled result fails the running test.
#[derive(Debug, Default)]
pub struct CheckResult {
    /// Whether dropping this result should report a failure
    report_error: bool,
    /// Expected value as text
    expected:     String,
    /// Actual value as text
    actual:       String,
    /// Free-form context appended by the test author
    message:      String,
}

impl CheckResult {
    /// A passing result.
    pub fn pass() -> Self {
        Self::default()
    }

    /// A failed condition described by `description`.
    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            report_error: true,
            expected: String::new(),
            actual: description.into(),
            message: String::new(),
        }
    }

    /// A failed comparison between `expected` and `actual`.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            report_error: true,
            expected: expected.into(),
            actual: actual.into(),
            message: String::new(),
        }
    }

    /// True if this result will fail the test when dropped.
    pub fn error(&self) -> bool {
        self.report_error
    }

    /// Expected value, empty for boolean checks.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Actual value.
    pub fn actual(&self) -> &str {
        &self.actual
    }

    /// Context accumulated so far.
    pub fn message_text(&self) -> &str {
        &self.message
    }

    /// Appends `text` to the failure message.
    pub fn message(mut self, text: impl Display) -> Self {
        self.message.push_str(&text.to_string());
        self
    }

    /// Appends a list to the failure message as `[ a b c ]`.
    pub fn message_list<T: Display>(mut self, items: &[T]) -> Self {
        self.message.push('[');
        for item in items {
            self.message.push(' ');
            self.message.push_str(&item.to_string());
        }
        self.message.push_str(" ]");
        self
    }

    /// Disarms the result so dropping it does nothing.
    pub fn cancel(&mut self) {
        self.report_error = false;
    }

    /// Builds the failure payload without disarming.
    fn to_failure(&self) -> CheckFailure {
        CheckFailure {
            expected: self.expected.clone(),
            actual:   self.actual.clone(),
            message:  self.message.clone(),
        }
    }

    /// Merges two failed results under `conjunction`, disarming both.
    fn combine(mut x: Self, mut y: Self, conjunction: &str) -> Self {
        let expected = format!("({} {conjunction} {})", x.expected, y.expected);
        let actual = if x.actual == y.actual {
            x.actual.clone()
        } else {
            format!("({} or {})", x.actual, y.actual)
        };
        let message = match (x.message.is_empty(), y.message.is_empty()) {
            (true, true) => String::new(),
            (false, true) => x.message.clone(),
            (true, false) => y.message.clone(),
            (false, false) => format!("{}; {}", x.message, y.message),
        };

        x.cancel();
        y.cancel();

        Self {
            report_error: true,
            expected,
            actual,
            message,
        }
    }
}

impl Drop for CheckResult {
    fn drop(&mut self) {
        if !self.report_error || std::thread::panicking() {
            return;
        }
        self.report_error = false;

        let failure = self.to_failure();
        // Straight to fd 2 so a forked test's capture file receives it.
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{failure}");
        let _ = stderr.flush();

        // Unwinds without running the panic hook.
        std::panic::resume_unwind(Box::new(failure));
    }
}

impl BitAnd for CheckResult {
    type Output = CheckResult;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self.error(), rhs.error()) {
            (false, false) => Self::pass(),
            (false, true) => rhs,
            (true, false) => self,
            (true, true) => Self::combine(self, rhs, "and"),
        }
    }
}

impl BitOr for CheckResult {
    type Output = CheckResult;

    fn bitor(mut self, mut rhs: Self) -> Self::Output {
        if self.error() && rhs.error() {
            return Self::combine(self, rhs, "or");
        }

        self.cancel();
        rhs.cancel();
        Self::pass()
    }
}

/// Fails with `description` unless `condition` holds.
pub fn check(condition: bool, description: impl Into<String>) -> CheckResult {
    if condition {
        CheckResult::pass()
    } else {
        CheckResult::failure(description)
    }
}

/// Compares two integers.
pub fn check_int(expected: i64, actual: i64) -> CheckResult {
    check_eq(expected, actual)
}

/// Compares two floats with an absolute or relative `tolerance`.
///
/// Passes when `|actual - expected| < tolerance`, or when the error is
/// within `tolerance` relative to the magnitude of `expected`.
pub fn check_float(expected: f64, actual: f64, tolerance: f64) -> CheckResult {
    let error = (actual - expected).abs();

    if error < tolerance || error < expected.abs() * tolerance {
        return CheckResult::pass();
    }

    CheckResult::mismatch(expected.to_string(), actual.to_string())
}

/// [`check_float`] with a tolerance of `1e-6`.
pub fn check_float_default(expected: f64, actual: f64) -> CheckResult {
    check_float(expected, actual, DEFAULT_FLOAT_TOLERANCE)
}

/// Compares two strings.
pub fn check_string(expected: impl AsRef<str>, actual: impl AsRef<str>) -> CheckResult {
    let (expected, actual) = (expected.as_ref(), actual.as_ref());
    if expected == actual {
        CheckResult::pass()
    } else {
        CheckResult::mismatch(expected, actual)
    }
}

/// Compares any two displayable values.
pub fn check_eq<T: PartialEq + Display>(expected: T, actual: T) -> CheckResult {
    if expected == actual {
        CheckResult::pass()
    } else {
        CheckResult::mismatch(expected.to_string(), actual.to_string())
    }
}
