//! printf-style logging macros routed through the installed logger.
//!
//! - `log!`: Generic logging macro that accepts a severity level
//! - `error!`, `warn!`, `info!`, `debug!`, `verbose!`, `very_verbose!`: fixed severity
//! - `log_fmt!` and `error_fmt!` .. `very_verbose_fmt!`: the same with Rust [`format_args!`]
//!   syntax
//!
//! The format can be a string literal or a [`FlashStr`](crate::FlashStr) reference, each
//! argument anything convertible into an [`Arg`](crate::Arg). The result of the call is
//! discarded; use [`global::log`](crate::global::log) directly to inspect it.
//!
//! Rust-style formatting also works through the [`log`] facade, e.g.
//! `log::info!(target: "wifi", "connected to {ssid}")`, once a logger is installed.

/// Logs a message with the specified severity.
///
/// # Examples
///
/// ```rust
/// use taglog::Severity;
///
/// taglog::log!(Severity::Info, "app", "Hello %s!", "World");
/// taglog::log!(Severity::Debug, "mem", &taglog::flash_str!("free: %u"), 20480u32);
/// ```
#[macro_export]
macro_rules! log {
    ($severity:expr, $tag:expr, $format:expr $(, $arg:expr)* $(,)?) => {{
        let _ = $crate::global::log(
            $severity,
            $tag,
            $crate::FormatSource::from($format),
            &[$($crate::Arg::from($arg)),*],
        );
    }};
}

/// Logs a message at [`Severity::Error`](crate::Severity::Error).
///
/// ```rust
/// taglog::error!("i2c", "no ack from 0x%02X", 0x76u8);
/// ```
#[macro_export]
macro_rules! error {
    ($tag:expr, $($rest:tt)+) => {
        $crate::log!($crate::Severity::Error, $tag, $($rest)+)
    };
}

/// Logs a message at [`Severity::Warn`](crate::Severity::Warn).
#[macro_export]
macro_rules! warn {
    ($tag:expr, $($rest:tt)+) => {
        $crate::log!($crate::Severity::Warn, $tag, $($rest)+)
    };
}

/// Logs a message at [`Severity::Info`](crate::Severity::Info).
///
/// ```rust
/// taglog::info!("wifi", "connected, rssi %d dBm", -61);
/// ```
#[macro_export]
macro_rules! info {
    ($tag:expr, $($rest:tt)+) => {
        $crate::log!($crate::Severity::Info, $tag, $($rest)+)
    };
}

/// Logs a message at [`Severity::Debug`](crate::Severity::Debug).
#[macro_export]
macro_rules! debug {
    ($tag:expr, $($rest:tt)+) => {
        $crate::log!($crate::Severity::Debug, $tag, $($rest)+)
    };
}

/// Logs a message at [`Severity::Verbose`](crate::Severity::Verbose).
#[macro_export]
macro_rules! verbose {
    ($tag:expr, $($rest:tt)+) => {
        $crate::log!($crate::Severity::Verbose, $tag, $($rest)+)
    };
}

/// Logs a message at [`Severity::VeryVerbose`](crate::Severity::VeryVerbose).
#[macro_export]
macro_rules! very_verbose {
    ($tag:expr, $($rest:tt)+) => {
        $crate::log!($crate::Severity::VeryVerbose, $tag, $($rest)+)
    };
}

/// Logs a [`format_args!`] message with the specified severity.
///
/// ```rust
/// use taglog::Severity;
///
/// let ssid = "lab";
/// taglog::log_fmt!(Severity::Info, "wifi", "connected to {ssid}");
/// ```
#[macro_export]
macro_rules! log_fmt {
    ($severity:expr, $tag:expr, $($arg:tt)+) => {{
        let _ = $crate::global::log_fmt($severity, $tag, ::core::format_args!($($arg)+));
    }};
}

/// Logs a [`format_args!`] message at [`Severity::Error`](crate::Severity::Error).
#[macro_export]
macro_rules! error_fmt {
    ($tag:expr, $($arg:tt)+) => {
        $crate::log_fmt!($crate::Severity::Error, $tag, $($arg)+)
    };
}

/// Logs a [`format_args!`] message at [`Severity::Warn`](crate::Severity::Warn).
#[macro_export]
macro_rules! warn_fmt {
    ($tag:expr, $($arg:tt)+) => {
        $crate::log_fmt!($crate::Severity::Warn, $tag, $($arg)+)
    };
}

/// Logs a [`format_args!`] message at [`Severity::Info`](crate::Severity::Info).
#[macro_export]
macro_rules! info_fmt {
    ($tag:expr, $($arg:tt)+) => {
        $crate::log_fmt!($crate::Severity::Info, $tag, $($arg)+)
    };
}

/// Logs a [`format_args!`] message at [`Severity::Debug`](crate::Severity::Debug).
#[macro_export]
macro_rules! debug_fmt {
    ($tag:expr, $($arg:tt)+) => {
        $crate::log_fmt!($crate::Severity::Debug, $tag, $($arg)+)
    };
}

/// Logs a [`format_args!`] message at [`Severity::Verbose`](crate::Severity::Verbose).
#[macro_export]
macro_rules! verbose_fmt {
    ($tag:expr, $($arg:tt)+) => {
        $crate::log_fmt!($crate::Severity::Verbose, $tag, $($arg)+)
    };
}

/// Logs a [`format_args!`] message at [`Severity::VeryVerbose`](crate::Severity::VeryVerbose).
#[macro_export]
macro_rules! very_verbose_fmt {
    ($tag:expr, $($arg:tt)+) => {
        $crate::log_fmt!($crate::Severity::VeryVerbose, $tag, $($arg)+)
    };
}
