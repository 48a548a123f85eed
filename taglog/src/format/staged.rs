use core::fmt;

use super::RenderError;

/// A null-terminated format string in memory that can only be read one byte at a time.
///
/// This is how strings placed in program flash look on parts without byte-addressable flash:
/// they have to be copied into RAM before a formatter can walk them. Build one with
/// [`flash_str!`](crate::flash_str).
#[derive(Clone, Copy)]
pub struct FlashStr {
    bytes: &'static [u8],
}

impl FlashStr {
    /// Wraps a null-terminated byte string.
    ///
    /// Reads past the end of `bytes` yield the terminator, so a missing terminator is harmless.
    pub const fn new(bytes: &'static [u8]) -> Self {
        Self { bytes }
    }

    /// Reads the byte at `index`.
    #[inline]
    pub fn read_byte(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }
}

impl fmt::Debug for FlashStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashStr")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Copies `source` into the front of `buffer`, including its terminator.
///
/// Returns the number of bytes copied. Fails once the copy fills the whole buffer, since the
/// formatted output needs room behind the staged string.
pub(crate) fn stage(source: &FlashStr, buffer: &mut [u8]) -> Result<usize, RenderError> {
    let capacity = buffer.len();

    for (index, slot) in buffer.iter_mut().enumerate() {
        let byte = source.read_byte(index);
        *slot = byte;
        if byte == 0 {
            let len = index + 1;
            if len == capacity {
                break;
            }
            return Ok(len);
        }
    }

    Err(RenderError::FormatTooLarge { capacity })
}

/// Copies a string into a fixed-size byte array at compile time, for [`flash_str!`](crate::flash_str).
#[doc(hidden)]
pub const fn flash_bytes<const N: usize>(text: &str) -> [u8; N] {
    let bytes = text.as_bytes();
    let mut out = [0; N];
    let mut index = 0;
    while index < N && index < bytes.len() {
        out[index] = bytes[index];
        index += 1;
    }
    out
}

/// Builds a [`FlashStr`](crate::FlashStr) from a string literal.
///
/// The null-terminated bytes are kept in a `static`. With `section = "..."` that static is placed
/// in the given linker section, e.g. `".flash.rodata"` for memory-mapped flash on ESP32 parts.
///
/// ```rust
/// let format = taglog::flash_str!("uptime %u s");
/// assert_eq!(format.read_byte(0), b'u');
/// assert_eq!(format.read_byte(11), 0);
/// ```
#[macro_export]
macro_rules! flash_str {
    ($text:literal) => {{
        const TEXT: &str = ::core::concat!($text, "\0");
        static BYTES: [u8; TEXT.len()] = $crate::format::flash_bytes(TEXT);
        $crate::FlashStr::new(&BYTES)
    }};
    ($text:literal, section = $section:literal) => {{
        const TEXT: &str = ::core::concat!($text, "\0");
        #[unsafe(link_section = $section)]
        static BYTES: [u8; TEXT.len()] = $crate::format::flash_bytes(TEXT);
        $crate::FlashStr::new(&BYTES)
    }};
}
