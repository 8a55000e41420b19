#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

/// How a single test finished.
///
/// The discriminant doubles as the exit code of a forked test process, so
/// the parent can recover the status from `waitpid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TestExitStatus {
    /// The test succeeded
    Pass              = 0,
    /// A check inside the test failed
    Fail              = 1,
    /// The test aborted (`SIGABRT`)
    Abort             = 2,
    /// The test caused a segmentation fault
    Segfault          = 3,
    /// The test ran longer than its timeout and was killed
    Timeout           = 4,
    /// The test panicked with something other than a failed check
    UncaughtException = 5,
    /// The test terminated for any other reason
    OtherError        = 6,
}

impl TestExitStatus {
    /// Process exit code used to report this status from a child.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Maps a child's exit code back to a status; unknown codes are
    /// `OtherError`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Pass,
            1 => Self::Fail,
            2 => Self::Abort,
            3 => Self::Segfault,
            4 => Self::Timeout,
            5 => Self::UncaughtException,
            _ => Self::OtherError,
        }
    }

    /// True only for `Pass`.
    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

impl Display for TestExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Pass => "passed",
            Self::Fail => "failed",
            Self::Abort => "aborted",
            Self::Segfault => "segmentation fault",
            Self::Timeout => "timeout",
            Self::UncaughtException => "uncaught exception",
            Self::OtherError => "unknown test error",
        };
        f.write_str(text)
    }
}

/// The outcome of running one test, including whatever it printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    /// How the test finished
    pub status:       TestExitStatus,
    /// Captured standard output (empty when output is not captured)
    pub output:       String,
    /// Captured standard error (empty when output is not captured)
    pub error_output: String,
}

impl TestResult {
    /// A result with no captured output.
    pub fn new(status: TestExitStatus) -> Self {
        Self {
            status,
            output: String::new(),
            error_output: String::new(),
        }
    }

    /// A result with captured stdout and stderr.
    pub fn with_output(
        status: TestExitStatus,
        output: impl Into<String>,
        error_output: impl Into<String>,
    ) -> Self {
        Self {
            status,
            output: output.into(),
            error_output: error_output.into(),
        }
    }

    /// True if the test passed.
    pub fn passed(&self) -> bool {
        self.status.is_pass()
    }
}

impl From<TestExitStatus> for TestResult {
    fn from(status: TestExitStatus) -> Self {
        Self::new(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_round_trip_and_unknown_codes_are_other_errors() {
        for status in [
            TestExitStatus::Pass,
            TestExitStatus::Fail,
            TestExitStatus::Abort,
            TestExitStatus::Segfault,
            TestExitStatus::Timeout,
            TestExitStatus::UncaughtException,
            TestExitStatus::OtherError,
        ] {
            assert_eq!(TestExitStatus::from_code(status.code()), status);
        }

        assert_eq!(TestExitStatus::from_code(101), TestExitStatus::OtherError);
        assert_eq!(TestExitStatus::from_code(-1), TestExitStatus::OtherError);
    }

    #[test]
    fn statuses_display_as_words() {
        assert_eq!(TestExitStatus::Pass.to_string(), "passed");
        assert_eq!(TestExitStatus::Segfault.to_string(), "segmentation fault");
        assert_eq!(TestExitStatus::OtherError.to_string(), "unknown test error");
    }
}
