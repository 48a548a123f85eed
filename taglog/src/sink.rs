//! Fanning rendered messages out to the transport and the registered observers.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::Severity;
use crate::transport::Transport;

/// A callback invoked with `(severity, tag, message)` for every delivered message.
pub type Observer = Box<dyn FnMut(Severity, &str, &str) + Send>;

/// Delivers rendered messages to an optional transport and an append-only list of observers.
///
/// Observers are called synchronously in registration order. They must not log themselves.
#[derive(Default)]
pub struct Sink {
    transport: Option<Box<dyn Transport + Send>>,
    observers: Vec<Observer>,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("transport", &self.transport.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Sink {
    /// Creates a sink writing to `transport`, if any.
    pub fn new(transport: Option<Box<dyn Transport + Send>>) -> Self {
        Self {
            transport,
            observers: Vec::new(),
        }
    }

    /// Returns the attached transport.
    pub fn transport(&self) -> Option<&(dyn Transport + Send)> {
        self.transport.as_deref()
    }

    /// Returns the attached transport mutably.
    pub fn transport_mut(&mut self) -> Option<&mut (dyn Transport + Send + 'static)> {
        self.transport.as_deref_mut()
    }

    /// Registers an observer. There is no way to remove one.
    pub fn add_observer(&mut self, observer: impl FnMut(Severity, &str, &str) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Returns the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Delivers a rendered message.
    ///
    /// Does nothing for an empty message. A single trailing `'\n'` is overwritten with a
    /// terminator in place and not delivered. A character cut short at the end by truncation is
    /// dropped, any other invalid UTF-8 is replaced with `U+FFFD`.
    pub fn deliver(&mut self, severity: Severity, tag: &str, message: &mut [u8]) {
        let Some(last) = message.last_mut() else {
            return;
        };

        let message = if *last == b'\n' {
            *last = 0;
            let end = message.len() - 1;
            &message[..end]
        } else {
            &message[..]
        };
        let message = decode(message);

        if let Some(transport) = &mut self.transport {
            transport.write_line(&message);
        }
        for observer in &mut self.observers {
            observer(severity, tag, &message);
        }
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let tail = bytes
        .utf8_chunks()
        .last()
        .map_or(&[][..], |chunk| chunk.invalid());
    let bytes = match core::str::from_utf8(tail) {
        // An incomplete sequence rather than an invalid one.
        Err(error) if error.error_len().is_none() => &bytes[..bytes.len() - tail.len()],
        _ => bytes,
    };
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::Sink;
    use crate::Severity;
    use crate::test_helpers::{TestObserver, TestTransport};
    use pretty_assertions::assert_eq;
    use std::borrow::ToOwned;
    use std::boxed::Box;
    use std::vec;

    fn sink() -> (Sink, TestTransport, TestObserver) {
        let transport = TestTransport::default();
        let observer = TestObserver::default();
        let mut sink = Sink::new(Some(Box::new(transport.clone())));
        sink.add_observer(observer.callback());
        (sink, transport, observer)
    }

    #[test]
    fn strips_one_trailing_newline() {
        let (mut sink, transport, observer) = sink();
        let mut message = *b"Hello World!\n\n";
        sink.deliver(Severity::Info, "app", &mut message);

        assert_eq!(transport.lines(), vec!["Hello World!\n".to_owned()]);
        assert_eq!(
            observer.messages(),
            vec![(Severity::Info, "app".to_owned(), "Hello World!\n".to_owned())]
        );
        assert_eq!(message[13], 0);
    }

    #[test]
    fn leaves_messages_without_newline_alone() {
        let (mut sink, transport, _) = sink();
        sink.deliver(Severity::Warn, "app", &mut b"no newline".to_owned());

        assert_eq!(transport.lines(), vec!["no newline".to_owned()]);
    }

    #[test]
    fn empty_messages_are_not_delivered() {
        let (mut sink, transport, observer) = sink();
        sink.deliver(Severity::Error, "app", &mut []);

        assert!(transport.lines().is_empty());
        assert!(observer.messages().is_empty());
    }

    #[test]
    fn a_lone_newline_is_delivered_empty() {
        let (mut sink, transport, _) = sink();
        sink.deliver(Severity::Error, "app", &mut b"\n".to_owned());

        assert_eq!(transport.lines(), vec![std::string::String::new()]);
    }

    #[test]
    fn observers_run_in_registration_order() {
        let order = TestObserver::default();
        let mut sink = Sink::new(None);
        for id in 0..3 {
            let order = order.clone();
            sink.add_observer(move |severity, _, _| {
                order.record(severity, "", &std::format!("{id}"));
            });
        }
        sink.deliver(Severity::Debug, "app", &mut b"x".to_owned());

        let ids: std::vec::Vec<_> = order
            .messages()
            .into_iter()
            .map(|(_, _, id)| id)
            .collect();
        assert_eq!(ids, ["0", "1", "2"]);
    }

    #[test]
    fn split_characters_are_dropped() {
        let (mut sink, transport, _) = sink();
        // "é" is 0xC3 0xA9; truncation kept only the first byte.
        sink.deliver(Severity::Info, "app", &mut [b'c', b'a', b'f', 0xC3]);

        assert_eq!(transport.lines(), vec!["caf".to_owned()]);
    }

    #[test]
    fn invalid_bytes_inside_the_message_are_replaced() {
        let (mut sink, transport, observer) = sink();
        sink.deliver(Severity::Info, "app", &mut b"21\xB0C, 40%".to_owned());

        assert_eq!(transport.lines(), vec!["21\u{FFFD}C, 40%".to_owned()]);
        assert_eq!(
            observer.messages(),
            vec![(Severity::Info, "app".to_owned(), "21\u{FFFD}C, 40%".to_owned())]
        );
    }

    #[test]
    fn invalid_bytes_and_a_split_character_together() {
        let (mut sink, transport, _) = sink();
        sink.deliver(Severity::Info, "app", &mut [b'a', 0xB0, b'b', 0xE2, 0x82]);

        assert_eq!(transport.lines(), vec!["a\u{FFFD}b".to_owned()]);
    }

    #[test]
    fn a_lone_invalid_last_byte_is_replaced_not_dropped() {
        let (mut sink, transport, _) = sink();
        sink.deliver(Severity::Info, "app", &mut [b'x', 0xFF]);

        assert_eq!(transport.lines(), vec!["x\u{FFFD}".to_owned()]);
    }
}
