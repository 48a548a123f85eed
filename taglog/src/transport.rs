//! Line-oriented outputs for rendered log messages.

/// A sink that accepts one rendered log line at a time.
///
/// Writes cannot fail from the logger's point of view; implementations drop what they cannot
/// deliver.
pub trait Transport {
    /// Writes `line` followed by a line break.
    fn write_line(&mut self, line: &str);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }
}

impl<T: Transport + ?Sized> Transport for alloc::boxed::Box<T> {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }
}

/// Adapts any [`embedded_io::Write`] byte sink into a [`Transport`].
///
/// Lines are terminated with `"\r\n"`, as serial terminals expect.
#[derive(Debug)]
pub struct IoTransport<W> {
    writer: W,
}

impl<W: embedded_io::Write> IoTransport<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> Transport for IoTransport<W> {
    fn write_line(&mut self, line: &str) {
        // this is a logger, ignore any errors writing
        let _ = self.writer.write_all(line.as_bytes());
        let _ = self.writer.write_all(b"\r\n");
    }
}

/// Writes lines to [`std::io::stdout`].
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutTransport;

#[cfg(feature = "std")]
impl Transport for StdoutTransport {
    fn write_line(&mut self, line: &str) {
        use std::io::Write;

        // this is a logger, ignore any errors writing
        let _ = std::writeln!(std::io::stdout(), "{line}");
    }
}
