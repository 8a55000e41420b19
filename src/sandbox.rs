#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::error::{GradingError, Result};

#[cfg(target_os = "freebsd")]
unsafe extern "C" {
    /// Capsicum: enter capability mode.
    fn cap_enter() -> libc::c_int;
}

/// Drops privileges of the current (test) process as far as the platform
/// allows.
///
/// FreeBSD enters Capsicum capability mode; Linux sets `no_new_privs`.
/// Elsewhere this only logs a warning.
#[cfg(target_os = "freebsd")]
pub fn enter_sandbox() -> Result<()> {
    // SAFETY: plain system call without arguments.
    if unsafe { cap_enter() } == 0 {
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ENOSYS) {
        tracing::warn!("kernel built without Capsicum; running test unsandboxed");
        return Ok(());
    }
    Err(GradingError::Sandbox(format!("cap_enter(): {err}")))
}

/// Drops privileges of the current (test) process as far as the platform
/// allows.
///
/// FreeBSD enters Capsicum capability mode; Linux sets `no_new_privs`.
/// Elsewhere this only logs a warning.
#[cfg(target_os = "linux")]
pub fn enter_sandbox() -> Result<()> {
    let one: libc::c_ulong = 1;
    let zero: libc::c_ulong = 0;
    // SAFETY: PR_SET_NO_NEW_PRIVS takes integer arguments only.
    if unsafe { libc::prctl(libc::PR_SET_NO_NEW_PRIVS, one, zero, zero, zero) } == 0 {
        return Ok(());
    }

    Err(GradingError::Sandbox(format!(
        "prctl(PR_SET_NO_NEW_PRIVS): {}",
        std::io::Error::last_os_error()
    )))
}

/// Drops privileges of the current (test) process as far as the platform
/// allows.
///
/// FreeBSD enters Capsicum capability mode; Linux sets `no_new_privs`.
/// Elsewhere this only logs a warning.
#[cfg(not(any(target_os = "freebsd", target_os = "linux")))]
pub fn enter_sandbox() -> Result<()> {
    tracing::warn!("sandboxing is not supported on this platform; running test unsandboxed");
    Ok(())
}
