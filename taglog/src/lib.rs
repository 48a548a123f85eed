//! # `taglog`
//!
//! A tag-filtered logging core for embedded targets.
//!
//! Every message carries a [`Severity`] and a tag. A [`Logger`] decides per tag whether the
//! message is emitted, renders it printf-style into a render buffer allocated once at
//! construction, and hands the text to an optional [`Transport`] and to every registered
//! observer callback.
//!
//! ## Features
//!
//! - **Tag filtering**: a global level plus per-tag overrides
//! - **Bounded rendering**: output is truncated to the buffer, never reallocated
//! - **Flash format strings**: [`FlashStr`] format strings are staged into the buffer before use
//! - **`log` facade**: [`global::install`] routes `log::info!` and friends through the logger
//! - **UART**: [`uart::UartDevice`] with bounded blocking reads doubles as a transport
//!
//! ## Feature Flags
//!
//! - `std` - Enable standard library support: stdout transport, wall clock and test helpers
//!
//! ## Basic Usage
//!
//! ```rust
//! use taglog::transport::StdoutTransport;
//! use taglog::{Logger, Severity};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut logger = Logger::with_transport(StdoutTransport, 256);
//! logger.set_global_level(Severity::Info);
//! logger.set_level("wifi", Severity::Verbose);
//! taglog::global::install(Box::leak(Box::new(logger)))?;
//!
//! taglog::info!("app", "booted in %u ms", 412u32);
//! taglog::verbose!("wifi", "scan found %d networks", 3);
//! log::warn!(target: "app", "battery at {}%", 14);
//! # taglog::global::uninstall()?;
//! # Ok(())
//! # }
//! ```
//!
//! Messages can also be logged on a [`Logger`] directly, which reports rendering failures:
//!
//! ```rust
//! use taglog::{Arg, Logger, Severity};
//! use taglog::test_helpers::TestTransport;
//!
//! let transport = TestTransport::default();
//! let mut logger = Logger::with_transport(transport.clone(), 32);
//!
//! let length = logger.log(Severity::Info, "app", "Hello %s!\n", &[Arg::from("World")])?;
//! assert_eq!(length, 13);
//! assert_eq!(transport.lines(), ["Hello World!"]);
//! # Ok::<(), taglog::RenderError>(())
//! ```

#![no_std]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod config;
pub mod filter;
pub mod format;
pub mod global;
pub mod logger;
mod macros;
pub mod severity;
pub mod sink;
#[cfg(any(test, feature = "std"))]
#[doc(hidden)]
pub mod test_helpers;
pub mod transport;
pub mod uart;

pub use config::LoggerConfig;
pub use filter::{TagFilter, TagOverride};
pub use format::{Arg, FlashStr, FormatError, FormatSource, RenderError, Rendered};
pub use logger::Logger;
pub use severity::{InvalidSeverity, ParseSeverityError, Severity};
pub use sink::{Observer, Sink};
pub use transport::Transport;
