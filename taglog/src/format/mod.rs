//! Rendering log messages into a fixed-capacity buffer.
//!
//! Two kinds of format string are supported, selected by [`FormatSource`]:
//!
//! - [`FormatSource::Direct`] strings are formatted straight into the buffer.
//! - [`FormatSource::Staged`] strings live in memory that can only be read byte by byte. They are
//!   first copied into the front of the buffer, and the output is formatted into what is left:
//!
//! ```text
//! | staged format string \0 | gap | formatted message ... \0 |
//! 0                        len   len+1                   capacity
//! ```
//!
//! Both paths enforce the buffer capacity on every write. Output that does not fit is truncated
//! silently; the returned [`Rendered::length`] is still the full would-be length.

mod printf;
mod staged;
mod writer;

use core::fmt;

pub use staged::FlashStr;
#[doc(hidden)]
pub use staged::flash_bytes;

use writer::BoundedWriter;

/// Where a format string comes from.
#[derive(Debug, Clone, Copy)]
pub enum FormatSource<'a> {
    /// A format string readable in place.
    Direct(&'a str),
    /// A format string that has to be copied out before use.
    Staged(&'a FlashStr),
}

impl<'a> From<&'a str> for FormatSource<'a> {
    fn from(format: &'a str) -> Self {
        FormatSource::Direct(format)
    }
}

impl<'a> From<&'a FlashStr> for FormatSource<'a> {
    fn from(format: &'a FlashStr) -> Self {
        FormatSource::Staged(format)
    }
}

/// A single printf argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    /// A signed integer, for `d` and `i` (and `u`/`x`/`o`, reinterpreted).
    Int(i64),
    /// An unsigned integer, for `u`, `o`, `x` and `X`.
    Uint(u64),
    /// A floating point value, for `f`, `F`, `e` and `E`.
    Float(f64),
    /// A string, for `s`.
    Str(&'a str),
    /// A character, for `c`.
    Char(char),
    /// An address, for `p`.
    Ptr(usize),
}

macro_rules! impl_from_for_arg {
    ($variant:ident($target:ty): $($source:ty),*) => {
        $(
            impl From<$source> for Arg<'_> {
                fn from(value: $source) -> Self {
                    Arg::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

impl_from_for_arg!(Int(i64): i8, i16, i32, i64);
impl_from_for_arg!(Uint(u64): u8, u16, u32, u64);
impl_from_for_arg!(Float(f64): f32, f64);

impl From<isize> for Arg<'_> {
    fn from(value: isize) -> Self {
        Arg::Int(value as i64)
    }
}

impl From<usize> for Arg<'_> {
    fn from(value: usize) -> Self {
        Arg::Uint(value as u64)
    }
}

impl From<bool> for Arg<'_> {
    fn from(value: bool) -> Self {
        Arg::Uint(u64::from(value))
    }
}

impl From<char> for Arg<'_> {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a alloc::string::String> for Arg<'a> {
    fn from(value: &'a alloc::string::String) -> Self {
        Arg::Str(value)
    }
}

impl<T> From<*const T> for Arg<'_> {
    fn from(value: *const T) -> Self {
        Arg::Ptr(value as usize)
    }
}

/// A failure while interpreting a format string against its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    /// A conversion needed an argument past the end of the list.
    MissingArgument {
        /// Position of the missing argument.
        index: usize,
    },
    /// An argument does not fit its conversion.
    TypeMismatch {
        /// Position of the offending argument.
        index: usize,
        /// The conversion (or `*`) that consumed it.
        conversion: char,
    },
    /// An unsupported conversion character.
    UnknownConversion {
        /// The conversion character.
        conversion: char,
    },
    /// The format string ended inside a conversion specification.
    IncompleteSpecifier,
    /// A `Display` implementation returned an error.
    Display,
    /// The length of the full output does not fit a `usize`.
    LengthOverflow,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FormatError::MissingArgument { index } => write!(f, "missing argument {index}"),
            FormatError::TypeMismatch { index, conversion } => {
                write!(f, "argument {index} does not match conversion '%{conversion}'")
            }
            FormatError::UnknownConversion { conversion } => {
                write!(f, "unknown conversion '%{conversion}'")
            }
            FormatError::IncompleteSpecifier => {
                write!(f, "format string ends inside a conversion")
            }
            FormatError::Display => write!(f, "formatter error"),
            FormatError::LengthOverflow => write!(f, "output length overflows"),
        }
    }
}

impl core::error::Error for FormatError {}

/// Why a message could not be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// The arguments could not be formatted.
    Format(FormatError),
    /// A staged format string does not fit into the buffer.
    FormatTooLarge {
        /// Capacity of the buffer the string was staged into.
        capacity: usize,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Format(error) => write!(f, "formatting failed: {error}"),
            RenderError::FormatTooLarge { capacity } => {
                write!(f, "format string does not fit into {capacity} byte buffer")
            }
        }
    }
}

impl core::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            RenderError::Format(error) => Some(error),
            RenderError::FormatTooLarge { .. } => None,
        }
    }
}

impl From<FormatError> for RenderError {
    fn from(error: FormatError) -> Self {
        RenderError::Format(error)
    }
}

/// A successfully rendered message.
#[derive(Debug)]
pub struct Rendered<'b> {
    /// Length of the full output, which exceeds `text.len()` when the output was truncated.
    pub length: usize,
    /// The bytes actually stored in the buffer, without the terminator.
    pub text: &'b mut [u8],
}

impl Rendered<'_> {
    /// Returns whether the output was cut short to fit the buffer.
    pub fn is_truncated(&self) -> bool {
        self.length > self.text.len()
    }
}

/// Renders `format` with `args` into `buffer`.
pub fn render<'b>(
    buffer: &'b mut [u8],
    format: FormatSource<'_>,
    args: &[Arg<'_>],
) -> Result<Rendered<'b>, RenderError> {
    match format {
        FormatSource::Direct(format) => render_direct(buffer, format.as_bytes(), args),
        FormatSource::Staged(format) => {
            let len = staged::stage(format, buffer)?;
            let (staged, rest) = buffer.split_at_mut(len);
            // `stage` leaves at least one byte behind the terminator.
            let output = rest.get_mut(1..).unwrap_or_default();
            render_direct(output, staged, args)
        }
    }
}

fn render_direct<'b>(
    region: &'b mut [u8],
    format: &[u8],
    args: &[Arg<'_>],
) -> Result<Rendered<'b>, RenderError> {
    let mut writer = BoundedWriter::new(region);
    printf::format(&mut writer, format, args)?;
    Ok(writer.finish()?)
}

/// Renders pre-parsed Rust format arguments into `buffer`.
pub fn render_fmt<'b>(
    buffer: &'b mut [u8],
    args: fmt::Arguments<'_>,
) -> Result<Rendered<'b>, RenderError> {
    let mut writer = BoundedWriter::new(buffer);
    fmt::Write::write_fmt(&mut writer, args).map_err(|_| FormatError::Display)?;
    Ok(writer.finish()?)
}

#[cfg(test)]
mod tests {
    use super::{Arg, FlashStr, FormatError, FormatSource, RenderError, render, render_fmt};
    use pretty_assertions::assert_eq;

    #[test]
    fn direct_format_within_capacity() {
        let mut buffer = [0; 32];
        let rendered = render(
            &mut buffer,
            FormatSource::Direct("Hello %s!\n"),
            &[Arg::from("World")],
        )
        .unwrap();

        assert_eq!(rendered.length, 13);
        assert!(!rendered.is_truncated());
        assert_eq!(&*rendered.text, b"Hello World!\n");
    }

    #[test]
    fn direct_format_truncates_to_capacity() {
        let mut buffer = [0; 8];
        let rendered = render(
            &mut buffer,
            "value=%d".into(),
            &[Arg::from(1234567)],
        )
        .unwrap();

        assert_eq!(rendered.length, 13);
        assert!(rendered.is_truncated());
        assert_eq!(&*rendered.text, b"value=1");
        assert_eq!(buffer[7], 0);
    }

    #[test]
    fn staged_format_renders_behind_the_format_string() {
        let mut buffer = [0xAA; 32];
        let format = crate::flash_str!("Hello %s!\n");
        let rendered = render(&mut buffer, (&format).into(), &[Arg::from("World")]).unwrap();

        assert_eq!(rendered.length, 13);
        assert_eq!(&*rendered.text, b"Hello World!\n");

        // The staged copy of the format string occupies the front of the buffer.
        assert_eq!(&buffer[..11], b"Hello %s!\n\0");
        assert_eq!(&buffer[12..26], b"Hello World!\n\0");
    }

    #[test]
    fn staged_format_shares_the_capacity() {
        // 5 bytes staged + 1 gap leave 10 bytes, 9 for content.
        let mut buffer = [0; 16];
        let format = FlashStr::new(b"%s..\0");
        let rendered = render(
            &mut buffer,
            FormatSource::Staged(&format),
            &[Arg::from("abcdefghij")],
        )
        .unwrap();

        assert_eq!(rendered.length, 12);
        assert_eq!(&*rendered.text, b"abcdefghi");
    }

    #[test]
    fn staged_format_too_large() {
        let mut buffer = [0; 32];
        let format = FlashStr::new(&[b'a'; 40]);
        let error = render(&mut buffer, FormatSource::Staged(&format), &[]).unwrap_err();

        assert_eq!(error, RenderError::FormatTooLarge { capacity: 32 });
    }

    #[test]
    fn staged_format_with_no_room_left_renders_nothing() {
        let mut buffer = [0; 5];
        let format = crate::flash_str!("abc");
        let rendered = render(&mut buffer, FormatSource::Staged(&format), &[]).unwrap();

        assert_eq!(rendered.length, 3);
        assert!(rendered.text.is_empty());
    }

    #[test]
    fn format_errors_are_distinct_from_size_errors() {
        let mut buffer = [0; 32];
        let error = render(&mut buffer, "%d".into(), &[]).unwrap_err();

        assert_eq!(
            error,
            RenderError::Format(FormatError::MissingArgument { index: 0 })
        );
    }

    #[test]
    fn rust_format_arguments_are_bounded_too() {
        let mut buffer = [0; 10];
        let rendered = render_fmt(&mut buffer, format_args!("{}-{:>4}", "abc", 12345)).unwrap();

        assert_eq!(rendered.length, 9);
        assert_eq!(&*rendered.text, b"abc-12345");

        let mut buffer = [0; 6];
        let rendered = render_fmt(&mut buffer, format_args!("{}-{:>4}", "abc", 12345)).unwrap();
        assert_eq!(&*rendered.text, b"abc-1");
    }

    #[test]
    fn width_overflowing_the_length_is_a_format_error() {
        let mut buffer = [0; 32];
        let args = [Arg::Int(i64::MAX), Arg::Int(1)].repeat(3);

        let error = render(&mut buffer, "%*d%*d%*d".into(), &args).unwrap_err();
        assert_eq!(error, RenderError::Format(FormatError::LengthOverflow));

        let error = render(&mut buffer, "%99999999999999999999d!".into(), &[Arg::Int(1)]).unwrap_err();
        assert_eq!(error, RenderError::Format(FormatError::LengthOverflow));
    }

    #[test]
    fn precision_overflowing_the_length_is_a_format_error() {
        let mut buffer = [0; 32];
        let error = render(&mut buffer, "%+.99999999999999999999d".into(), &[Arg::Int(7)]).unwrap_err();

        assert_eq!(error, RenderError::Format(FormatError::LengthOverflow));
    }

    #[test]
    fn huge_float_precision_is_zero_padded() {
        let mut buffer = [0; 16];
        let rendered = render(&mut buffer, "%.5000f|%.2000e".into(), &[Arg::Float(0.5), Arg::Float(2.5)]).unwrap();

        assert_eq!(rendered.length, 2 + 5000 + 1 + 2 + 2000 + 4);
        assert_eq!(&*rendered.text, b"0.5000000000000");
    }
}
