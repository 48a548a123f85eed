//! In-memory recorders for asserting on delivered log messages.

use std::string::{String, ToString};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use crate::Severity;
use crate::transport::Transport;

/// A transport that stores every line it is handed.
///
/// Clones share the same storage, so keep one clone for inspection and hand the other to the
/// logger.
///
/// ```rust
/// use taglog::test_helpers::TestTransport;
/// use taglog::transport::Transport;
///
/// let transport = TestTransport::default();
/// let mut writer = transport.clone();
/// writer.write_line("hello");
/// assert_eq!(transport.lines(), ["hello"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestTransport {
    /// Shared vector storing all written lines.
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl TestTransport {
    /// Returns a copy of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Transport for TestTransport {
    fn write_line(&mut self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// Records `(severity, tag, message)` triples passed to observer callbacks.
#[derive(Debug, Clone, Default)]
pub struct TestObserver {
    /// Shared vector storing all observed messages.
    pub messages: Arc<Mutex<Vec<(Severity, String, String)>>>,
}

impl TestObserver {
    /// Returns a callback that records into this observer.
    pub fn callback(&self) -> impl FnMut(Severity, &str, &str) + Send + 'static {
        let observer = self.clone();
        move |severity, tag, message| observer.record(severity, tag, message)
    }

    /// Records a single message.
    pub fn record(&self, severity: Severity, tag: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((severity, tag.to_string(), message.to_string()));
    }

    /// Returns a copy of the messages recorded so far.
    pub fn messages(&self) -> Vec<(Severity, String, String)> {
        self.messages.lock().unwrap().clone()
    }
}
