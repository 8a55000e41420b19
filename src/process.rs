#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runs tests in forked child processes.
//!
//! The child's stdout and stderr are redirected into anonymous temporary
//! files, the test body runs, and the child exits with the
//! [`TestExitStatus`] code. The parent waits (polling when a timeout
//! applies), maps the wait status and reads back the captured streams.

use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write},
    os::fd::AsRawFd,
    panic::{AssertUnwindSafe, catch_unwind},
    time::{Duration, Instant},
};

use nix::{
    errno::Errno,
    sys::{
        signal::{Signal, kill},
        wait::{WaitPidFlag, WaitStatus, waitpid},
    },
    unistd::{ForkResult, Pid, fork},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    constants::{MAX_CAPTURED_OUTPUT, TRUNCATION_MARKER, WAIT_POLL_INTERVAL},
    error::{GradingError, Result},
    results::{TestExitStatus, TestResult},
    sandbox,
    test::{classify_panic, run_in_process},
};

/// Drop guard that kills and reaps a forked child unless disarmed.
struct ChildGuard(Option<Pid>);

impl ChildGuard {
    /// Wraps the provided child pid.
    fn new(pid: Pid) -> Self {
        Self(Some(pid))
    }

    /// Prevents the guard from killing the process on drop.
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(pid) = self.0.take() {
            let _ = kill(pid, Signal::SIGKILL);
            loop {
                match waitpid(pid, None) {
                    Err(Errno::EINTR) => continue,
                    _ => break,
                }
            }
        }
    }
}

/// Temporary files receiving a child's stdout and stderr.
struct Capture {
    /// Replaces fd 1 in the child
    stdout: File,
    /// Replaces fd 2 in the child
    stderr: File,
}

impl Capture {
    /// Creates both capture files.
    fn new() -> Result<Self> {
        Ok(Self {
            stdout: tempfile::tempfile().map_err(GradingError::Capture)?,
            stderr: tempfile::tempfile().map_err(GradingError::Capture)?,
        })
    }

    /// Points fds 1 and 2 of the calling (child) process at the capture files.
    fn install(&self) -> io::Result<()> {
        let targets = [
            (&self.stdout, libc::STDOUT_FILENO),
            (&self.stderr, libc::STDERR_FILENO),
        ];
        for (file, target) in targets {
            // SAFETY: both descriptors are open for the duration of the call.
            if unsafe { libc::dup2(file.as_raw_fd(), target) } < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    /// Reads back what the child wrote.
    fn collect(mut self) -> Result<(String, String)> {
        let output = read_capped(&mut self.stdout).map_err(GradingError::Capture)?;
        let error_output = read_capped(&mut self.stderr).map_err(GradingError::Capture)?;
        Ok((output, error_output))
    }
}

/// Reads at most `MAX_CAPTURED_OUTPUT` bytes from the start of `file`.
fn read_capped(file: &mut File) -> io::Result<String> {
    file.seek(SeekFrom::Start(0))?;

    let mut buf = Vec::new();
    Read::take(&mut *file, MAX_CAPTURED_OUTPUT + 1).read_to_end(&mut buf)?;

    let truncated = buf.len() as u64 > MAX_CAPTURED_OUTPUT;
    buf.truncate(MAX_CAPTURED_OUTPUT as usize);

    let mut text = String::from_utf8_lossy(&buf).into_owned();
    if truncated {
        text.push_str(TRUNCATION_MARKER);
    }
    Ok(text)
}

/// Maps a terminal wait status to a test status.
fn status_from_wait(status: WaitStatus) -> TestExitStatus {
    match status {
        WaitStatus::Exited(_, code) => TestExitStatus::from_code(code),
        WaitStatus::Signaled(_, Signal::SIGSEGV, _) => TestExitStatus::Segfault,
        WaitStatus::Signaled(_, Signal::SIGABRT, _) => TestExitStatus::Abort,
        _ => TestExitStatus::OtherError,
    }
}

/// Waits for `pid` to terminate. Returns `None` once `timeout` has elapsed.
fn wait_for(pid: Pid, timeout: Option<Duration>) -> Result<Option<WaitStatus>> {
    let start = Instant::now();
    let flags = timeout.map(|_| WaitPidFlag::WNOHANG);

    loop {
        match waitpid(pid, flags) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                return Ok(Some(status));
            }
            Ok(_) => {
                if let Some(limit) = timeout
                    && start.elapsed() > limit
                {
                    return Ok(None);
                }
                std::thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(GradingError::Wait(e.to_string())),
        }
    }
}

/// Exits the child immediately, skipping the parent's atexit handlers.
fn exit_child(status: TestExitStatus) -> ! {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    // SAFETY: `_exit` never returns and touches no Rust state.
    unsafe { libc::_exit(status.code()) }
}

/// Forks, runs `body` in the child and collects the result in the parent.
fn fork_test(
    body: impl FnOnce() -> TestExitStatus,
    timeout: Option<Duration>,
    sandboxed: bool,
) -> Result<TestResult> {
    // Anything still buffered would otherwise be written twice.
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    let capture = Capture::new()?;

    // SAFETY: the child only redirects descriptors, runs the test body and
    // leaves through `_exit`; it never returns into the caller's frames.
    match unsafe { fork() }.map_err(|e| GradingError::Fork(e.to_string()))? {
        ForkResult::Child => {
            if let Err(e) = capture.install() {
                let _ = writeln!(io::stderr(), "cannot capture test output: {e}");
                exit_child(TestExitStatus::OtherError);
            }
            if sandboxed && let Err(e) = sandbox::enter_sandbox() {
                let _ = writeln!(io::stderr(), "{e}");
                exit_child(TestExitStatus::OtherError);
            }
            exit_child(body())
        }
        ForkResult::Parent { child } => {
            debug!(%child, ?timeout, sandboxed, "forked test process");
            let guard = ChildGuard::new(child);

            let status = match wait_for(child, timeout)? {
                Some(wait_status) => {
                    guard.disarm();
                    status_from_wait(wait_status)
                }
                None => {
                    warn!(%child, ?timeout, "test timed out; killing it");
                    drop(guard);
                    TestExitStatus::Timeout
                }
            };

            let (output, error_output) = capture.collect()?;
            debug!(%child, %status, "test process finished");
            Ok(TestResult::with_output(status, output, error_output))
        }
    }
}

/// Runs `closure` in a forked child, containing crashes and enforcing
/// `timeout`.
pub fn run_isolated(
    closure: &(dyn Fn() + Send + Sync),
    timeout: Option<Duration>,
) -> Result<TestResult> {
    fork_test(|| run_in_process(closure), timeout, false)
}

/// Like [`run_isolated`], but the child enters the OS sandbox before running
/// `closure`.
pub fn run_sandboxed(
    closure: &(dyn Fn() + Send + Sync),
    timeout: Option<Duration>,
) -> Result<TestResult> {
    fork_test(|| run_in_process(closure), timeout, true)
}

/// Runs `f` in a forked child and copies its return value back.
///
/// The value travels as JSON through a temporary file and is only returned
/// when the child passed.
pub fn run_with_output<T, F>(f: F, timeout: Option<Duration>) -> Result<(TestResult, Option<T>)>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let mut slot = tempfile::tempfile().map_err(GradingError::Capture)?;
    let writer = slot.try_clone().map_err(GradingError::Capture)?;

    let result = fork_test(
        move || match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => match serde_json::to_writer(&writer, &value) {
                Ok(()) => TestExitStatus::Pass,
                Err(e) => {
                    let _ = writeln!(io::stderr(), "cannot serialize test output: {e}");
                    TestExitStatus::OtherError
                }
            },
            Err(payload) => classify_panic(payload),
        },
        timeout,
        false,
    )?;

    if !result.passed() {
        return Ok((result, None));
    }

    slot.seek(SeekFrom::Start(0)).map_err(GradingError::Capture)?;
    let value = serde_json::from_reader(&mut slot)?;
    Ok((result, Some(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_map_to_statuses() {
        let pid = Pid::from_raw(1);
        assert_eq!(status_from_wait(WaitStatus::Exited(pid, 0)), TestExitStatus::Pass);
        assert_eq!(status_from_wait(WaitStatus::Exited(pid, 1)), TestExitStatus::Fail);
        assert_eq!(status_from_wait(WaitStatus::Exited(pid, 42)), TestExitStatus::OtherError);
        assert_eq!(
            status_from_wait(WaitStatus::Signaled(pid, Signal::SIGSEGV, false)),
            TestExitStatus::Segfault
        );
        assert_eq!(
            status_from_wait(WaitStatus::Signaled(pid, Signal::SIGABRT, true)),
            TestExitStatus::Abort
        );
        assert_eq!(
            status_from_wait(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            TestExitStatus::OtherError
        );
    }

    #[test]
    fn long_captures_are_truncated() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&vec![b'x'; MAX_CAPTURED_OUTPUT as usize + 10]).unwrap();

        let text = read_capped(&mut file).unwrap();
        assert!(text.ends_with(TRUNCATION_MARKER));
        assert_eq!(text.len(), MAX_CAPTURED_OUTPUT as usize + TRUNCATION_MARKER.len());
    }

    #[test]
    fn short_captures_are_kept_whole() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"hello\n").unwrap();
        assert_eq!(read_capped(&mut file).unwrap(), "hello\n");
    }
}
