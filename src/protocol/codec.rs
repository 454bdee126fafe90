//! Primitive readers: fixed-width little-endian scalars, Dec64, strings, time.
//!
//! All multi-byte values are little-endian. Every read other than the
//! top-level tag byte uses [`std::io::Read::read_exact`], whose documented
//! retry-until-filled behavior already satisfies the "block until the full
//! byte count is delivered" requirement. The tag byte is special: a
//! zero-byte read there is an orderly end of stream, not truncation, so it's
//! read with a single bare `read()` call instead.

use std::io::Read;
use std::sync::OnceLock;
use std::time::{Duration as StdDuration, SystemTime};

use byteorder::{LittleEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use super::error::ProtocolError;
use super::tag::Tag;
use super::value::{Duration, Sentinel};

/// Marks "no time" on the wire: decodes to the target platform's time-zero instant.
const EMPTY_TIME_NANOS: i64 = -6795364578871345152;

fn dec64_powers() -> &'static [f64; 129] {
    static POWERS: OnceLock<[f64; 129]> = OnceLock::new();
    POWERS.get_or_init(|| {
        let mut table = [1.0f64; 129];
        for (e, slot) in table.iter_mut().enumerate() {
            *slot = 10f64.powi(e as i32);
        }
        table
    })
}

/// Decodes a Dec64 value: high 56 bits are a signed coefficient, low 8 bits
/// are the exponent byte. Exponents `<= 127` are non-negative; `> 127`
/// encode `-(256 - e)`.
pub fn decode_dec64(d: i64) -> f64 {
    let exponent = (d & 0xFF) as u8;
    let coefficient = d >> 8; // arithmetic shift: sign-extends the 56-bit coefficient
    let powers = dec64_powers();
    if exponent <= 127 {
        coefficient as f64 * powers[exponent as usize]
    } else {
        coefficient as f64 / powers[(256 - exponent as u16) as usize]
    }
}

/// Streaming reader for the frame wire format.
///
/// Parses and validates on the fly; holds no buffering of its own beyond
/// what `inner` provides.
pub struct FrameReader<'a> {
    inner: &'a mut dyn Read,
}

impl<'a> FrameReader<'a> {
    /// Creates a frame reader over a byte stream.
    pub fn new(inner: &'a mut dyn Read) -> Self {
        FrameReader { inner }
    }

    /// Reads the one-byte tag that opens a top-level frame.
    ///
    /// Returns `Ok(None)` if the stream closed before any byte arrived (an
    /// orderly end of stream at a frame boundary). Any other read failure,
    /// or an unrecognized tag byte, is an error.
    pub fn read_tag_or_eof(&mut self) -> Result<Option<Tag>, ProtocolError> {
        let mut buf = [0u8; 1];
        let n = self.inner.read(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        Tag::from_u8(buf[0])
            .map(Some)
            .ok_or(ProtocolError::UnhandledType(buf[0]))
    }

    /// Reads a tag where a clean end of stream would be truncation, not EOF
    /// (i.e. a sub-value tag, or the tag that follows an array-header UID).
    pub fn read_tag(&mut self) -> Result<Tag, ProtocolError> {
        let v = self.read_u8_raw()?;
        Tag::from_u8(v).ok_or(ProtocolError::UnhandledType(v))
    }

    fn read_u8_raw(&mut self) -> Result<u8, ProtocolError> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads the three-byte little-endian 24-bit UID that follows every tag.
    pub fn read_uid(&mut self) -> Result<u32, ProtocolError> {
        let mut buf = [0u8; 3];
        self.inner.read_exact(&mut buf)?;
        Ok((((buf[2] as u32) << 8 | buf[1] as u32) << 8) | buf[0] as u32)
    }

    /// Reads a signed 64-bit integer.
    pub fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        Ok(self.inner.read_i64::<LittleEndian>()?)
    }

    /// Reads an IEEE-754 binary64 float.
    pub fn read_f64(&mut self) -> Result<f64, ProtocolError> {
        Ok(self.inner.read_f64::<LittleEndian>()?)
    }

    /// Reads a boolean, encoded as an `int64` (`0` is false, anything else true).
    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_i64()? != 0)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.read_i64()?;
        if len < 0 {
            return Err(ProtocolError::Invalid(format!(
                "negative string length {len}"
            )));
        }
        let mut buf = vec![0u8; len as usize];
        self.inner.read_exact(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| ProtocolError::Invalid(format!("invalid UTF-8 in string: {e}")))
    }

    /// Reads a nanosecond Unix timestamp, honoring the empty-time sentinel.
    pub fn read_time(&mut self) -> Result<SystemTime, ProtocolError> {
        let nanos = self.read_i64()?;
        if nanos == EMPTY_TIME_NANOS {
            return Ok(SystemTime::UNIX_EPOCH);
        }
        Ok(if nanos >= 0 {
            SystemTime::UNIX_EPOCH + StdDuration::from_nanos(nanos as u64)
        } else {
            // `nanos.unsigned_abs()`, not `-nanos as u64`: negating `i64::MIN`
            // overflows and panics in debug builds.
            SystemTime::UNIX_EPOCH - StdDuration::from_nanos(nanos.unsigned_abs())
        })
    }

    /// Reads a duration's four verbatim `int64` fields.
    pub fn read_duration(&mut self) -> Result<Duration, ProtocolError> {
        Ok(Duration {
            years: self.read_i64()?,
            months: self.read_i64()?,
            days: self.read_i64()?,
            nanos: self.read_i64()?,
        })
    }

    /// Reads a sentinel value.
    pub fn read_sentinel(&mut self) -> Result<Sentinel, ProtocolError> {
        Ok(Sentinel::from_i64(self.read_i64()?))
    }

    /// Reads a Dec64-encoded value and decodes it to binary64.
    pub fn read_dec64(&mut self) -> Result<f64, ProtocolError> {
        Ok(decode_dec64(self.read_i64()?))
    }
}
