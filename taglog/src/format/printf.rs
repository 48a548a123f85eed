//! A runtime printf-style interpreter writing into a [`BoundedWriter`].
//!
//! Supported: conversions `d i u o x X c s p f F e E %`, flags `- 0 + space #`, width and
//! precision (literal or `*`) and the length modifiers `hh h l ll L z j t`.

use core::fmt::{self, Write as _};

use super::writer::{BoundedWriter, Counter};
use super::{Arg, FormatError};

/// Integer width selected by a length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Length {
    Default,
    Char,
    Short,
    Long,
    LongLong,
    Max,
    Size,
    PtrDiff,
}

impl Length {
    /// Bit width of the C type on the 32-bit targets this runs on; `z`/`t` follow the pointer size.
    fn bits(self) -> u32 {
        match self {
            Length::Char => 8,
            Length::Short => 16,
            Length::Default | Length::Long => 32,
            Length::LongLong | Length::Max => 64,
            Length::Size | Length::PtrDiff => usize::BITS,
        }
    }

    fn truncate_signed(self, value: i64) -> i64 {
        match self.bits() {
            8 => i64::from(value as i8),
            16 => i64::from(value as i16),
            32 => i64::from(value as i32),
            _ => value,
        }
    }

    fn truncate_unsigned(self, value: u64) -> u64 {
        match self.bits() {
            8 => u64::from(value as u8),
            16 => u64::from(value as u16),
            32 => u64::from(value as u32),
            _ => value,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    alt: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    length: Length,
}

impl Default for Spec {
    fn default() -> Self {
        Self {
            left: false,
            plus: false,
            space: false,
            alt: false,
            zero: false,
            width: 0,
            precision: None,
            length: Length::Default,
        }
    }
}

/// Walks the argument slice in order.
struct Args<'a, 'v> {
    args: &'a [Arg<'v>],
    next: usize,
}

impl<'a, 'v> Args<'a, 'v> {
    fn next(&mut self) -> Result<(usize, Arg<'v>), FormatError> {
        let index = self.next;
        let arg = *self
            .args
            .get(index)
            .ok_or(FormatError::MissingArgument { index })?;
        self.next += 1;
        Ok((index, arg))
    }

    fn next_int(&mut self, conversion: u8) -> Result<i64, FormatError> {
        match self.next()? {
            (_, Arg::Int(value)) => Ok(value),
            (_, Arg::Uint(value)) => Ok(value as i64),
            (index, _) => Err(FormatError::TypeMismatch {
                index,
                conversion: char::from(conversion),
            }),
        }
    }
}

/// Formats `format` with `args` into `out`.
///
/// The format string ends at its first null byte, if any. Unused trailing arguments are ignored.
pub(crate) fn format(
    out: &mut BoundedWriter<'_>,
    format: &[u8],
    args: &[Arg<'_>],
) -> Result<(), FormatError> {
    let format = format.split(|byte| *byte == 0).next().unwrap_or_default();
    let mut args = Args { args, next: 0 };
    let mut rest = format;

    while let Some(percent) = rest.iter().position(|byte| *byte == b'%') {
        out.push(&rest[..percent]);
        rest = &rest[percent + 1..];

        let (spec, conversion, tail) = parse_spec(rest, &mut args)?;
        rest = tail;
        convert(out, spec, conversion, &mut args)?;
    }
    out.push(rest);

    Ok(())
}

/// Parses flags, width, precision and length up to and including the conversion byte.
fn parse_spec<'f>(
    mut rest: &'f [u8],
    args: &mut Args<'_, '_>,
) -> Result<(Spec, u8, &'f [u8]), FormatError> {
    let mut spec = Spec::default();

    while let Some((&byte, tail)) = rest.split_first() {
        match byte {
            b'-' => spec.left = true,
            b'+' => spec.plus = true,
            b' ' => spec.space = true,
            b'#' => spec.alt = true,
            b'0' => spec.zero = true,
            _ => break,
        }
        rest = tail;
    }

    if let Some((b'*', tail)) = rest.split_first() {
        let width = args.next_int(b'*')?;
        if width < 0 {
            spec.left = true;
        }
        spec.width = usize::try_from(width.unsigned_abs()).unwrap_or(usize::MAX);
        rest = tail;
    } else {
        let (width, tail) = parse_decimal(rest);
        spec.width = width;
        rest = tail;
    }

    if let Some((b'.', tail)) = rest.split_first() {
        rest = tail;
        if let Some((b'*', tail)) = rest.split_first() {
            // A negative precision is taken as if it were omitted.
            let precision = args.next_int(b'*')?;
            spec.precision = usize::try_from(precision).ok();
            rest = tail;
        } else {
            let (precision, tail) = parse_decimal(rest);
            spec.precision = Some(precision);
            rest = tail;
        }
    }

    let (length, tail) = match rest {
        [b'h', b'h', tail @ ..] => (Length::Char, tail),
        [b'h', tail @ ..] => (Length::Short, tail),
        [b'l', b'l', tail @ ..] => (Length::LongLong, tail),
        [b'l', tail @ ..] => (Length::Long, tail),
        [b'L', tail @ ..] => (Length::Default, tail),
        [b'j', tail @ ..] => (Length::Max, tail),
        [b'z', tail @ ..] => (Length::Size, tail),
        [b't', tail @ ..] => (Length::PtrDiff, tail),
        _ => (Length::Default, rest),
    };
    spec.length = length;

    match tail.split_first() {
        Some((&conversion, tail)) => Ok((spec, conversion, tail)),
        None => Err(FormatError::IncompleteSpecifier),
    }
}

fn parse_decimal(bytes: &[u8]) -> (usize, &[u8]) {
    let digits = bytes.iter().take_while(|byte| byte.is_ascii_digit()).count();
    let value = bytes[..digits].iter().fold(0usize, |value, digit| {
        value
            .saturating_mul(10)
            .saturating_add(usize::from(digit - b'0'))
    });
    (value, &bytes[digits..])
}

fn convert(
    out: &mut BoundedWriter<'_>,
    spec: Spec,
    conversion: u8,
    args: &mut Args<'_, '_>,
) -> Result<(), FormatError> {
    let mismatch = |index| FormatError::TypeMismatch {
        index,
        conversion: char::from(conversion),
    };

    match conversion {
        b'%' => out.push_byte(b'%'),
        b'd' | b'i' => {
            let value = match args.next()? {
                (_, Arg::Int(value)) => value,
                (_, Arg::Uint(value)) => value as i64,
                (_, Arg::Char(value)) => i64::from(u32::from(value)),
                (index, _) => return Err(mismatch(index)),
            };
            let value = spec.length.truncate_signed(value);
            let sign: &[u8] = if value < 0 {
                b"-"
            } else if spec.plus {
                b"+"
            } else if spec.space {
                b" "
            } else {
                b""
            };
            write_integer(out, spec, sign, value.unsigned_abs(), 10, false);
        }
        b'u' | b'o' | b'x' | b'X' => {
            let value = match args.next()? {
                (_, Arg::Int(value)) => value as u64,
                (_, Arg::Uint(value)) => value,
                (_, Arg::Char(value)) => u64::from(u32::from(value)),
                (_, Arg::Ptr(value)) => value as u64,
                (index, _) => return Err(mismatch(index)),
            };
            let value = spec.length.truncate_unsigned(value);
            let (radix, prefix): (u32, &[u8]) = match conversion {
                b'o' => (8, b""),
                b'x' if spec.alt && value != 0 => (16, b"0x"),
                b'X' if spec.alt && value != 0 => (16, b"0X"),
                b'x' | b'X' => (16, b""),
                _ => (10, b""),
            };
            write_integer(out, spec, prefix, value, radix, conversion == b'X');
        }
        b'p' => {
            let value = match args.next()? {
                (_, Arg::Ptr(value)) => value as u64,
                (_, Arg::Uint(value)) => value,
                (index, _) => return Err(mismatch(index)),
            };
            let spec = Spec {
                zero: false,
                precision: None,
                ..spec
            };
            write_integer(out, spec, b"0x", value, 16, false);
        }
        b'c' => {
            let mut encoded = [0; 4];
            let bytes: &[u8] = match args.next()? {
                (_, Arg::Char(value)) => value.encode_utf8(&mut encoded).as_bytes(),
                (_, Arg::Int(value)) => {
                    encoded[0] = value as u8;
                    &encoded[..1]
                }
                (_, Arg::Uint(value)) => {
                    encoded[0] = value as u8;
                    &encoded[..1]
                }
                (index, _) => return Err(mismatch(index)),
            };
            pad_around(out, spec, bytes.len(), |out| out.push(bytes));
        }
        b's' => {
            let text = match args.next()? {
                (_, Arg::Str(text)) => text.as_bytes(),
                (index, _) => return Err(mismatch(index)),
            };
            let text = match spec.precision {
                Some(precision) => &text[..text.len().min(precision)],
                None => text,
            };
            pad_around(out, spec, text.len(), |out| out.push(text));
        }
        b'f' | b'F' | b'e' | b'E' => {
            let value = match args.next()? {
                (_, Arg::Float(value)) => value,
                (_, Arg::Int(value)) => value as f64,
                (_, Arg::Uint(value)) => value as f64,
                (index, _) => return Err(mismatch(index)),
            };
            write_float(out, spec, conversion, value)?;
        }
        other => {
            return Err(FormatError::UnknownConversion {
                conversion: char::from(other),
            });
        }
    }

    Ok(())
}

/// Space-pads `len` bytes of content to the field width.
fn pad_around(
    out: &mut BoundedWriter<'_>,
    spec: Spec,
    len: usize,
    body: impl FnOnce(&mut BoundedWriter<'_>),
) {
    let padding = spec.width.saturating_sub(len);
    if spec.left {
        body(out);
        out.fill(b' ', padding);
    } else {
        out.fill(b' ', padding);
        body(out);
    }
}

/// Emits `prefix` and a body of `body_len` bytes padded to the field width.
///
/// Zero padding goes between prefix and body.
fn write_padded(
    out: &mut BoundedWriter<'_>,
    spec: Spec,
    prefix: &[u8],
    zero_pad: bool,
    body_len: usize,
    body: impl FnOnce(&mut BoundedWriter<'_>),
) {
    let padding = spec.width.saturating_sub(prefix.len().saturating_add(body_len));

    if spec.left {
        out.push(prefix);
        body(out);
        out.fill(b' ', padding);
    } else if zero_pad {
        out.push(prefix);
        out.fill(b'0', padding);
        body(out);
    } else {
        out.fill(b' ', padding);
        out.push(prefix);
        body(out);
    }
}

fn write_integer(
    out: &mut BoundedWriter<'_>,
    spec: Spec,
    prefix: &[u8],
    value: u64,
    radix: u32,
    upper: bool,
) {
    // Octal of u64::MAX is the longest rendering, at 22 digits.
    let mut digits = [0u8; 22];
    let mut start = digits.len();
    let mut rest = value;
    while rest != 0 {
        let digit = (rest % u64::from(radix)) as u8;
        start -= 1;
        digits[start] = match digit {
            0..=9 => b'0' + digit,
            _ if upper => b'A' + digit - 10,
            _ => b'a' + digit - 10,
        };
        rest /= u64::from(radix);
    }
    let digits = &digits[start..];

    // "%.0d" of zero prints no digits at all.
    let minimum = spec.precision.unwrap_or(1);
    let mut zeros = minimum.saturating_sub(digits.len());
    if radix == 8 && spec.alt && zeros == 0 && digits.first() != Some(&b'0') {
        zeros = 1;
    }

    let zero_pad = spec.zero && !spec.left && spec.precision.is_none();
    write_padded(out, spec, prefix, zero_pad, zeros.saturating_add(digits.len()), |out| {
        out.fill(b'0', zeros);
        out.push(digits);
    });
}

fn write_float(
    out: &mut BoundedWriter<'_>,
    spec: Spec,
    conversion: u8,
    value: f64,
) -> Result<(), FormatError> {
    let upper = conversion.is_ascii_uppercase();
    let sign: &[u8] = if value.is_sign_negative() && !value.is_nan() {
        b"-"
    } else if spec.plus {
        b"+"
    } else if spec.space {
        b" "
    } else {
        b""
    };

    if !value.is_finite() {
        let text: &[u8] = match (value.is_nan(), upper) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        write_padded(out, spec, sign, false, text.len(), |out| out.push(text));
        return Ok(());
    }

    let value = value.abs();
    let precision = spec.precision.unwrap_or(6);
    // Fraction digits of an f64 past this are always zero; they are padded in, not formatted.
    let exact = precision.min(MAX_EXACT_DIGITS);
    let extra_zeros = precision - exact;
    let scientific = matches!(conversion, b'e' | b'E');
    let render = |w: &mut dyn fmt::Write| -> Result<Exponent, fmt::Error> {
        if scientific {
            let mut w = Scientific::new(w, upper, spec.alt);
            write!(w, "{value:.exact$e}")?;
            Ok(w.finish())
        } else {
            write!(w, "{value:.exact$}")?;
            if spec.alt && precision == 0 {
                w.write_char('.')?;
            }
            Ok(Exponent::default())
        }
    };

    let mut counter = Counter::default();
    let exponent = render(&mut counter).map_err(|_| FormatError::Display)?;
    let body_len = counter.0 + exponent.len();

    let zero_pad = spec.zero && !spec.left;
    let mut result = Ok(());
    write_padded(out, spec, sign, zero_pad, body_len.saturating_add(extra_zeros), |out| {
        result = render(&mut *out).and_then(|exponent| {
            out.fill(b'0', extra_zeros);
            exponent.write(out)
        });
    });
    result.map_err(|_| FormatError::Display)
}

/// The most fraction digits an f64 can need in either notation.
const MAX_EXACT_DIGITS: usize = 1074;

/// A C-style exponent such as `e+03`, held back so zero padding can go in front of it.
#[derive(Debug, Default, Clone, Copy)]
struct Exponent {
    upper: bool,
    negative: bool,
    // f64 exponents have at most three digits.
    digits: [u8; 3],
    len: usize,
}

impl Exponent {
    /// Rendered length, zero for fixed notation.
    fn len(&self) -> usize {
        match self.len {
            0 => 0,
            len => 2 + len.max(2),
        }
    }

    fn write(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        if self.len == 0 {
            return Ok(());
        }
        w.write_char(if self.upper { 'E' } else { 'e' })?;
        w.write_char(if self.negative { '-' } else { '+' })?;
        if self.len < 2 {
            w.write_char('0')?;
        }
        for digit in &self.digits[..self.len] {
            w.write_char(char::from(*digit))?;
        }
        Ok(())
    }
}

/// Splits Rust's `1.5e3` exponent notation into the mantissa, passed through, and a C-style
/// [`Exponent`].
struct Scientific<W> {
    inner: W,
    alt: bool,
    seen_point: bool,
    in_exponent: bool,
    exponent: Exponent,
}

impl<W: fmt::Write> Scientific<W> {
    fn new(inner: W, upper: bool, alt: bool) -> Self {
        Self {
            inner,
            alt,
            seen_point: false,
            in_exponent: false,
            exponent: Exponent {
                upper,
                ..Exponent::default()
            },
        }
    }

    fn finish(self) -> Exponent {
        self.exponent
    }
}

impl<W: fmt::Write> fmt::Write for Scientific<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if !self.in_exponent {
                if byte == b'e' {
                    if self.alt && !self.seen_point {
                        self.inner.write_char('.')?;
                    }
                    self.in_exponent = true;
                } else {
                    self.seen_point |= byte == b'.';
                    self.inner.write_char(char::from(byte))?;
                }
            } else if byte == b'-' {
                self.exponent.negative = true;
            } else {
                let exponent = &mut self.exponent;
                let slot = exponent.digits.get_mut(exponent.len).ok_or(fmt::Error)?;
                *slot = byte;
                exponent.len += 1;
            }
        }
        Ok(())
    }
}
