//! The filter → render → deliver pipeline.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use core::fmt;

use crate::config::LoggerConfig;
use crate::filter::{TagFilter, TagOverride};
use crate::format::{self, Arg, FormatSource, RenderError, Rendered};
use crate::sink::Sink;
use crate::transport::Transport;
use crate::Severity;

/// Tag used for the logger's own messages.
pub const TAG: &str = "logger";

/// Render buffer capacity used when none is configured.
pub const DEFAULT_TX_BUFFER_SIZE: usize = 512;

/// A tag-filtered logger rendering into a buffer allocated once at construction.
///
/// Every accepted message is rendered into the same buffer and delivered before the call
/// returns, so a `Logger` must not be used re-entrantly from its own transport or observers.
pub struct Logger {
    filter: TagFilter,
    buffer: Box<[u8]>,
    sink: Sink,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("filter", &self.filter)
            .field("tx_buffer_size", &self.buffer.len())
            .field("sink", &self.sink)
            .finish()
    }
}

impl Logger {
    /// Creates a logger with a render buffer of `tx_buffer_size` bytes.
    ///
    /// The global level starts at [`Severity::Debug`].
    pub fn new(transport: Option<Box<dyn Transport + Send>>, tx_buffer_size: usize) -> Self {
        Self {
            filter: TagFilter::default(),
            buffer: vec![0; tx_buffer_size].into_boxed_slice(),
            sink: Sink::new(transport),
        }
    }

    /// Creates a logger writing to `transport`.
    pub fn with_transport(transport: impl Transport + Send + 'static, tx_buffer_size: usize) -> Self {
        Self::new(Some(Box::new(transport)), tx_buffer_size)
    }

    /// Creates a logger from its configuration, registering the per-tag levels in map order.
    pub fn from_config(
        config: &LoggerConfig,
        transport: Option<Box<dyn Transport + Send>>,
    ) -> Self {
        let mut logger = Self::new(transport, config.tx_buffer_size);
        logger.set_global_level(config.level);
        for (tag, level) in &config.logs {
            logger.set_level(tag.clone(), *level);
        }
        logger
    }

    /// Returns the render buffer capacity in bytes.
    pub fn tx_buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the global default level.
    pub fn global_level(&self) -> Severity {
        self.filter.global_level()
    }

    /// Replaces the global default level.
    pub fn set_global_level(&mut self, level: Severity) {
        self.filter.set_global_level(level);
    }

    /// Adds a level override for `tag`. The first override registered for a tag wins.
    pub fn set_level(&mut self, tag: impl Into<String>, level: Severity) {
        self.filter.set_level(tag, level);
    }

    /// Returns the level in effect for `tag`.
    pub fn level_for(&self, tag: &str) -> Severity {
        self.filter.level_for(tag)
    }

    /// Returns the per-tag overrides in registration order.
    pub fn overrides(&self) -> &[TagOverride] {
        self.filter.overrides()
    }

    /// Returns whether a message at `severity` for `tag` would be emitted.
    pub fn is_enabled(&self, severity: Severity, tag: &str) -> bool {
        self.filter.enabled(severity, tag)
    }

    /// Returns the most verbose level any tag can currently emit at.
    pub fn max_level(&self) -> Severity {
        self.overrides()
            .iter()
            .map(|it| it.level)
            .fold(self.global_level(), Severity::max)
    }

    /// Returns the attached transport.
    pub fn transport(&self) -> Option<&(dyn Transport + Send)> {
        self.sink.transport()
    }

    /// Returns the attached transport mutably.
    pub fn transport_mut(&mut self) -> Option<&mut (dyn Transport + Send + 'static)> {
        self.sink.transport_mut()
    }

    /// Registers a callback invoked with `(severity, tag, message)` for every delivered message.
    pub fn add_on_log_callback(
        &mut self,
        callback: impl FnMut(Severity, &str, &str) + Send + 'static,
    ) {
        self.sink.add_observer(callback);
    }

    /// Filters, renders and delivers a printf-style message.
    ///
    /// Returns `Ok(0)` for filtered messages and otherwise the full length of the rendered
    /// message, which is larger than what was delivered if the message had to be truncated.
    pub fn log<'f>(
        &mut self,
        severity: Severity,
        tag: &str,
        format: impl Into<FormatSource<'f>>,
        args: &[Arg<'_>],
    ) -> Result<usize, RenderError> {
        if !self.filter.enabled(severity, tag) {
            return Ok(0);
        }
        let rendered = format::render(&mut self.buffer, format.into(), args)?;
        Ok(deliver(&mut self.sink, severity, tag, rendered))
    }

    /// Filters, renders and delivers a message built with [`format_args!`].
    pub fn log_fmt(
        &mut self,
        severity: Severity,
        tag: &str,
        args: fmt::Arguments<'_>,
    ) -> Result<usize, RenderError> {
        if !self.filter.enabled(severity, tag) {
            return Ok(0);
        }
        let rendered = format::render_fmt(&mut self.buffer, args)?;
        Ok(deliver(&mut self.sink, severity, tag, rendered))
    }

    /// Logs the current configuration under [`TAG`] at [`Severity::Info`].
    pub fn dump_config(&mut self) {
        let Self {
            filter,
            buffer,
            sink,
        } = self;
        if !filter.enabled(Severity::Info, TAG) {
            return;
        }

        let mut emit = |args: fmt::Arguments<'_>| {
            if let Ok(rendered) = format::render_fmt(&mut buffer[..], args) {
                deliver(&mut *sink, Severity::Info, TAG, rendered);
            }
        };
        emit(format_args!("Logger:"));
        emit(format_args!("  Level: {}", filter.global_level()));
        for it in filter.overrides() {
            emit(format_args!("  Level for '{}': {}", it.tag, it.level));
        }
    }
}

fn deliver(sink: &mut Sink, severity: Severity, tag: &str, rendered: Rendered<'_>) -> usize {
    sink.deliver(severity, tag, rendered.text);
    rendered.length
}
