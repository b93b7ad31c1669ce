//! Primitive decoders for the fields found in MetaStock index and time series
//! files.
//!
//! The index files mix three 32-bit floating point encodings:
//! - [`Mbf32`](FloatFormat::Mbf32): Microsoft Binary Format single precision,
//!   used by `MASTER` and all time series files
//! - [`Ieee`](FloatFormat::Ieee): little-endian IEEE 754 single precision
//! - [`IeeeReversed`](FloatFormat::IeeeReversed): IEEE 754 single precision with
//!   the bytes stored in the opposite order, used by `EMASTER` and `XMASTER`
//!
//! Dates are stored as [packed decimal numbers](decode_packed_date) inside either
//! a float or an unsigned integer field.

use std::{
    fmt,
    io::{self, Read, Seek, SeekFrom},
};

use time::{Date, Month};

use crate::error::DecodeError;

/// The encoding of a 4-byte floating point field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatFormat {
    /// Microsoft Binary Format single precision.
    Mbf32,
    /// Little-endian IEEE 754 single precision.
    Ieee,
    /// IEEE 754 single precision with reversed byte order.
    IeeeReversed,
}

/// The encoding of a 4-byte packed date field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateFormat {
    /// A packed date stored as a float.
    Float(FloatFormat),
    /// A packed date stored as a little-endian unsigned 32-bit integer.
    Long,
}

/// Converts a Microsoft Binary Format single precision float to an IEEE 754
/// `f32`.
///
/// MBF stores the exponent in the high byte with a bias of 129 and the sign bit
/// in the next byte, whereas IEEE 754 has the sign bit first and a bias of 127.
/// An exponent byte of zero denotes `0.0` regardless of the other bytes. An
/// exponent byte of one is below the normal IEEE range and also yields `0.0`.
pub fn mbf32_to_f32(bytes: [u8; 4]) -> f32 {
    let [b0, b1, b2, exp] = bytes;
    if exp < 2 {
        return 0.0;
    }
    let ieee_exp = exp - 2;
    let sign = b2 & 0x80;
    f32::from_le_bytes([b0, b1, (ieee_exp << 7) | (b2 & 0x7F), sign | (ieee_exp >> 1)])
}

/// Converts 4 bytes holding an IEEE 754 float in the given byte order to an `f32`.
/// `reversed` indicates the bytes are stored most significant first.
pub fn ieee_to_f32(bytes: [u8; 4], reversed: bool) -> f32 {
    if reversed {
        f32::from_be_bytes(bytes)
    } else {
        f32::from_le_bytes(bytes)
    }
}

/// Decodes a packed date: the decimal digits of `raw` interpreted as `YYMMDD`,
/// optionally preceded by a `1` century digit. Two-digit years of 80 and later
/// are in the 1900s, earlier ones in the 2000s.
///
/// # Errors
/// This function returns an error if `raw` doesn't have 6 or 7 digits, if a
/// 7-digit value doesn't start with `1`, or if the digits don't form a valid
/// calendar date.
pub fn decode_packed_date(raw: u64) -> Result<Date, DecodeError> {
    let mut buffer = itoa::Buffer::new();
    let digits = buffer.format(raw).as_bytes();
    let yymmdd = match digits {
        [_, _, _, _, _, _] => digits,
        [b'1', rest @ ..] if rest.len() == 6 => rest,
        [_, _, _, _, _, _, _] => {
            return Err(DecodeError::date(raw, "7-digit date must start with 1"))
        }
        _ => {
            return Err(DecodeError::date(
                raw,
                format!("expected 6 or 7 digits, found {}", digits.len()),
            ))
        }
    };
    let pair = |i: usize| (yymmdd[i] - b'0') * 10 + (yymmdd[i + 1] - b'0');
    let yy = i32::from(pair(0));
    let year = if yy >= 80 { 1900 + yy } else { 2000 + yy };
    let month = Month::try_from(pair(2)).map_err(|e| DecodeError::date(raw, e))?;
    Date::from_calendar_date(year, month, pair(4)).map_err(|e| DecodeError::date(raw, e))
}

/// Decodes a packed date stored as a float by truncating it toward zero.
///
/// # Errors
/// This function returns an error if the truncated value isn't a valid packed
/// date. See [`decode_packed_date()`].
pub fn decode_float_date(value: f32) -> Result<Date, DecodeError> {
    // `as` saturates: negative and NaN values become 0
    decode_packed_date(value as u64)
}

/// A fixed-size region of unknown purpose, retained verbatim.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Filler<const N: usize>([u8; N]);

impl<const N: usize> Filler<N> {
    /// Creates a new filler region from its raw bytes.
    pub const fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Returns `true` if every byte is zero.
    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl<const N: usize> Default for Filler<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> fmt::Debug for Filler<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filler<{N}>(")?;
        for b in self.0.iter() {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// Reads fixed-width fields at absolute byte offsets of a seekable source.
pub struct FieldReader<R> {
    reader: R,
}

impl<R> FieldReader<R>
where
    R: Read + Seek,
{
    /// Creates a new field reader over `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Consumes the field reader and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.read_exact(buf)
    }

    /// Reads `N` bytes at `offset`.
    ///
    /// # Errors
    /// This function returns an error if fewer than `N` bytes are available at
    /// `offset`.
    pub fn read_array<const N: usize>(&mut self, offset: u64) -> Result<[u8; N], DecodeError> {
        let mut buf = [0; N];
        self.read_exact_at(offset, &mut buf)
            .map_err(|e| DecodeError::io(e, offset, N))?;
        Ok(buf)
    }

    /// Reads an unsigned byte at `offset`.
    ///
    /// # Errors
    /// This function returns an error if `offset` is past the end of the source.
    pub fn read_u8(&mut self, offset: u64) -> Result<u8, DecodeError> {
        let [b] = self.read_array(offset)?;
        Ok(b)
    }

    /// Reads a little-endian `u16` at `offset`.
    ///
    /// # Errors
    /// This function returns an error if fewer than 2 bytes are available.
    pub fn read_u16(&mut self, offset: u64) -> Result<u16, DecodeError> {
        self.read_array(offset).map(u16::from_le_bytes)
    }

    /// Reads a little-endian `u32` at `offset`.
    ///
    /// # Errors
    /// This function returns an error if fewer than 4 bytes are available.
    pub fn read_u32(&mut self, offset: u64) -> Result<u32, DecodeError> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    /// Reads an `N`-byte region of unknown purpose at `offset`.
    ///
    /// # Errors
    /// This function returns an error if fewer than `N` bytes are available.
    pub fn read_filler<const N: usize>(&mut self, offset: u64) -> Result<Filler<N>, DecodeError> {
        self.read_array(offset).map(Filler)
    }

    /// Reads a string field of `width` bytes at `offset`. The string ends at the
    /// first null byte or at `width`, whichever comes first. Padding spaces are
    /// left for the caller to trim.
    ///
    /// # Errors
    /// This function returns an error if fewer than `width` bytes are available
    /// or the string isn't valid UTF-8.
    pub fn read_string(&mut self, offset: u64, width: usize) -> Result<String, DecodeError> {
        let mut buf = vec![0; width];
        self.read_exact_at(offset, &mut buf)
            .map_err(|e| DecodeError::io(e, offset, width))?;
        if let Some(end) = buf.iter().position(|b| *b == 0) {
            buf.truncate(end);
        }
        String::from_utf8(buf).map_err(|e| DecodeError::Utf8 {
            source: e.utf8_error(),
            offset,
        })
    }

    /// Reads a 4-byte float in `format` at `offset`.
    ///
    /// # Errors
    /// This function returns an error if fewer than 4 bytes are available.
    pub fn read_float(&mut self, offset: u64, format: FloatFormat) -> Result<f32, DecodeError> {
        let bytes = self.read_array(offset)?;
        Ok(match format {
            FloatFormat::Mbf32 => mbf32_to_f32(bytes),
            FloatFormat::Ieee => ieee_to_f32(bytes, false),
            FloatFormat::IeeeReversed => ieee_to_f32(bytes, true),
        })
    }

    /// Reads a 4-byte packed date in `format` at `offset`.
    ///
    /// # Errors
    /// This function returns an error if fewer than 4 bytes are available or the
    /// value isn't a valid packed date.
    pub fn read_date(&mut self, offset: u64, format: DateFormat) -> Result<Date, DecodeError> {
        match format {
            DateFormat::Float(float_format) => {
                decode_float_date(self.read_float(offset, float_format)?)
            }
            DateFormat::Long => decode_packed_date(u64::from(self.read_u32(offset)?)),
        }
    }
}
