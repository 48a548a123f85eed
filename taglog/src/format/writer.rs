use core::fmt;

use super::{FormatError, Rendered};

/// Writes into a fixed region, silently truncating anything that does not fit.
///
/// The last byte of the region is reserved for a terminator, so at most `region.len() - 1` bytes
/// of content are stored. The length keeps counting past the end, which gives the would-be length
/// of the untruncated output; `None` once that length no longer fits a `usize`.
#[derive(Debug)]
pub(crate) struct BoundedWriter<'b> {
    region: &'b mut [u8],
    written: usize,
    length: Option<usize>,
}

impl<'b> BoundedWriter<'b> {
    pub(crate) fn new(region: &'b mut [u8]) -> Self {
        Self {
            region,
            written: 0,
            length: Some(0),
        }
    }

    fn content_capacity(&self) -> usize {
        self.region.len().saturating_sub(1)
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) {
        let available = self.content_capacity() - self.written;
        let take = bytes.len().min(available);
        self.region[self.written..self.written + take].copy_from_slice(&bytes[..take]);
        self.written += take;
        self.count(bytes.len());
    }

    pub(crate) fn push_byte(&mut self, byte: u8) {
        self.push(&[byte]);
    }

    /// Pushes `byte` `count` times.
    pub(crate) fn fill(&mut self, byte: u8, count: usize) {
        let available = self.content_capacity() - self.written;
        let take = count.min(available);
        self.region[self.written..self.written + take].fill(byte);
        self.written += take;
        self.count(count);
    }

    fn count(&mut self, len: usize) {
        self.length = self.length.and_then(|length| length.checked_add(len));
    }

    /// Terminates the written content and hands it out.
    ///
    /// Fails if the would-be length overflowed; the region still holds the terminated prefix.
    pub(crate) fn finish(self) -> Result<Rendered<'b>, FormatError> {
        let Self {
            region,
            written,
            length,
        } = self;

        if let Some(terminator) = region.get_mut(written) {
            *terminator = 0;
        }

        Ok(Rendered {
            length: length.ok_or(FormatError::LengthOverflow)?,
            text: &mut region[..written],
        })
    }
}

impl fmt::Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s.as_bytes());
        Ok(())
    }
}

/// Counts the bytes written through it, used to size padded output before emitting it.
#[derive(Debug, Default)]
pub(crate) struct Counter(pub(crate) usize);

impl fmt::Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BoundedWriter;
    use crate::format::FormatError;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_room_for_terminator() {
        let mut region = [0xAA; 6];
        let mut writer = BoundedWriter::new(&mut region);
        writer.push(b"Hello World");
        let rendered = writer.finish().unwrap();

        assert_eq!(rendered.length, 11);
        assert_eq!(&*rendered.text, b"Hello");
        assert_eq!(region, *b"Hello\0");
    }

    #[test]
    fn empty_region_stores_nothing() {
        let mut region = [];
        let mut writer = BoundedWriter::new(&mut region);
        writer.push(b"abc");
        writer.fill(b' ', 4);
        let rendered = writer.finish().unwrap();

        assert_eq!(rendered.length, 7);
        assert!(rendered.text.is_empty());
    }

    #[test]
    fn fill_truncates_like_push() {
        let mut region = [0; 4];
        let mut writer = BoundedWriter::new(&mut region);
        writer.push_byte(b'[');
        writer.fill(b'-', 10);
        let rendered = writer.finish().unwrap();

        assert_eq!(rendered.length, 11);
        assert_eq!(&*rendered.text, b"[--");
    }

    #[test]
    fn overflowing_length_is_an_error() {
        let mut region = [0xAA; 4];
        let mut writer = BoundedWriter::new(&mut region);
        writer.push(b"ab");
        writer.fill(b' ', usize::MAX);
        writer.push(b"cd");

        assert_eq!(writer.finish().unwrap_err(), FormatError::LengthOverflow);
        assert_eq!(region, *b"ab \0");
    }
}
