#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use thiserror::Error;

/// Errors raised while running tests or writing their report.
#[derive(Debug, Error)]
pub enum GradingError {
    /// The test process could not be forked.
    #[error("failed to fork test process: {0}")]
    Fork(String),
    /// Waiting on (or killing) the test process failed.
    #[error("failed to wait for test process: {0}")]
    Wait(String),
    /// Setting up or reading the captured stdout/stderr failed.
    #[error("failed to capture test output: {0}")]
    Capture(#[source] std::io::Error),
    /// Writing the report failed.
    #[error("failed to write test report: {0}")]
    Output(#[source] std::io::Error),
    /// A value returned by an isolated test could not be (de)serialized.
    #[error("failed to transfer test output value: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The sandbox could not be entered.
    #[error("failed to enter sandbox: {0}")]
    Sandbox(String),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, GradingError>;
