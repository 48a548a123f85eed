//! The process-wide logger and its hookup to the [`log`] facade.
//!
//! One [`Logger`] can be installed at a time. Installing registers a zero-sized trampoline with
//! [`log::set_logger`] (once per process) which forwards every facade record to the installed
//! logger, so `log::info!` and friends go through the same filter, buffer and outputs as the
//! printf-style macros of this crate.
//!
//! # Concurrency
//!
//! The installed logger is not synchronized beyond a single busy flag: a call that finds the
//! logger in use, whether re-entrantly from one of its own observers or from a concurrent caller,
//! is dropped and reports `Ok(0)`. Callers needing every message from several threads have to
//! serialize their logging themselves.
//!
//! [`install`] and [`uninstall`] wait a bounded number of polls for the flag and fail with
//! [`Busy`] after that, so calling them from an observer or from [`with_logger`] is an error
//! rather than a deadlock.

use core::fmt;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use crate::format::{Arg, FormatSource, RenderError};
use crate::logger::TAG;
use crate::{Logger, Severity};

/// The installed logger, or null.
static LOGGER: AtomicPtr<Logger> = AtomicPtr::new(ptr::null_mut());

/// Set while somebody holds a reference derived from `LOGGER`.
static BUSY: AtomicBool = AtomicBool::new(false);

/// Whether [`TRAMPOLINE`] has been registered with the `log` facade.
static FACADE_REGISTERED: AtomicBool = AtomicBool::new(false);

static TRAMPOLINE: Trampoline = Trampoline;

/// Forwards `log` facade records to the installed logger.
#[derive(Debug)]
struct Trampoline;

impl log::Log for Trampoline {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        let severity = Severity::from(metadata.level());
        dispatch(|logger| logger.is_enabled(severity, metadata.target())).unwrap_or(false)
    }

    fn log(&self, record: &log::Record<'_>) {
        let _ = log_fmt(
            Severity::from(record.level()),
            record.target(),
            *record.args(),
        );
    }

    fn flush(&self) {}
}

const ACQUIRE_ATTEMPTS: u32 = 1 << 20;

/// Releases [`BUSY`] on drop, so a panicking observer does not disable logging for good.
struct BusyGuard;

impl BusyGuard {
    fn try_acquire() -> Option<Self> {
        BUSY.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(BusyGuard)
    }

    /// Polls up to [`ACQUIRE_ATTEMPTS`] times, enough for an in-flight message to finish.
    fn acquire() -> Result<Self, Busy> {
        for _ in 0..ACQUIRE_ATTEMPTS {
            if let Some(guard) = Self::try_acquire() {
                return Ok(guard);
            }
            core::hint::spin_loop();
        }
        Err(Busy)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        BUSY.store(false, Ordering::Release);
    }
}

/// Runs `f` on the installed logger unless it is absent or busy.
fn dispatch<R>(f: impl FnOnce(&mut Logger) -> R) -> Option<R> {
    let _guard = BusyGuard::try_acquire()?;
    // SAFETY: a non-null `LOGGER` came from the `&'static mut Logger` passed to `install`, and
    // holding `BUSY` makes this the only reference to it until the guard is dropped.
    let logger = unsafe { LOGGER.load(Ordering::Acquire).as_mut() }?;
    Some(f(logger))
}

/// The installed logger stayed in use, most likely because the caller is running inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy;

impl fmt::Display for Busy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the installed logger is in use")
    }
}

impl core::error::Error for Busy {}

/// The error returned by [`install`].
#[derive(Debug)]
pub enum InstallError {
    /// A different logger already owns the `log` facade.
    Facade(log::SetLoggerError),
    /// The current logger could not be replaced, see [`Busy`].
    Busy,
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::Facade(error) => write!(f, "cannot hook into the log facade: {error}"),
            InstallError::Busy => write!(f, "cannot replace the logger: {}", Busy),
        }
    }
}

impl core::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            InstallError::Facade(error) => Some(error),
            InstallError::Busy => None,
        }
    }
}

impl From<Busy> for InstallError {
    fn from(_: Busy) -> Self {
        InstallError::Busy
    }
}

/// Makes `logger` the process-wide logger.
///
/// Returns the previously installed logger, if any. The swap happens under the busy flag, so an
/// in-flight message finishes on the old logger first. Fails with [`InstallError::Busy`] when
/// called from inside the installed logger.
///
/// Logs `"Log initialized"` under [`TAG`] once installed.
pub fn install(logger: &'static mut Logger) -> Result<Option<&'static mut Logger>, InstallError> {
    if !FACADE_REGISTERED.swap(true, Ordering::AcqRel) {
        if let Err(error) = log::set_logger(&TRAMPOLINE) {
            FACADE_REGISTERED.store(false, Ordering::Release);
            return Err(InstallError::Facade(error));
        }
    }

    let max_level = logger.max_level();
    let logger = ptr::from_mut(logger);
    let previous = {
        let _guard = BusyGuard::acquire()?;
        LOGGER.swap(logger, Ordering::AcqRel)
    };
    log::set_max_level(max_level.to_level_filter());

    let _ = log_fmt(Severity::Info, TAG, format_args!("Log initialized"));

    // SAFETY: a non-null previous value came from an earlier `install`, and it is no longer
    // reachable through `LOGGER`.
    Ok(unsafe { previous.as_mut() })
}

/// Removes the process-wide logger and hands it back.
///
/// Messages logged afterwards are discarded. Fails with [`Busy`] when called from inside the
/// installed logger.
pub fn uninstall() -> Result<Option<&'static mut Logger>, Busy> {
    let previous = {
        let _guard = BusyGuard::acquire()?;
        LOGGER.swap(ptr::null_mut(), Ordering::AcqRel)
    };
    log::set_max_level(log::LevelFilter::Off);

    // SAFETY: a non-null previous value came from `install`, and it is no longer reachable
    // through `LOGGER`.
    Ok(unsafe { previous.as_mut() })
}

/// Returns whether a logger is installed.
pub fn is_installed() -> bool {
    !LOGGER.load(Ordering::Acquire).is_null()
}

/// Runs `f` on the installed logger, e.g. to change levels or register callbacks.
///
/// Returns `None` without running `f` if no logger is installed or the logger is busy. The `log`
/// facade's maximum level is updated afterwards to match the logger's levels.
pub fn with_logger<R>(f: impl FnOnce(&mut Logger) -> R) -> Option<R> {
    dispatch(|logger| {
        let result = f(logger);
        log::set_max_level(logger.max_level().to_level_filter());
        result
    })
}

/// Logs a printf-style message through the installed logger.
///
/// Returns `Ok(0)` if the message is filtered, no logger is installed or the logger is busy.
pub fn log(
    severity: Severity,
    tag: &str,
    format: FormatSource<'_>,
    args: &[Arg<'_>],
) -> Result<usize, RenderError> {
    dispatch(|logger| logger.log(severity, tag, format, args)).unwrap_or(Ok(0))
}

/// Logs a [`format_args!`] message through the installed logger.
///
/// Returns `Ok(0)` if the message is filtered, no logger is installed or the logger is busy.
pub fn log_fmt(
    severity: Severity,
    tag: &str,
    args: fmt::Arguments<'_>,
) -> Result<usize, RenderError> {
    dispatch(|logger| logger.log_fmt(severity, tag, args)).unwrap_or(Ok(0))
}
