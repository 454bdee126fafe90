//! Top-level and sub-value type tags.

use enum_primitive_derive::Primitive;

/// A one-byte type tag, shared by top-level frames (§4.2) and serialized
/// sub-values (§4.4).
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Primitive)]
pub enum Tag {
    /// No payload. Normally only seen inside a serialized sub-value.
    Null = 0x00,
    /// `int64` payload.
    Int = 0x01,
    /// `float64` payload.
    Float = 0x02,
    /// `time` payload.
    Time = 0x03,
    /// Four `int64`s: year, month, day, nanoseconds.
    Duration = 0x04,
    /// `string` payload; fatal when it occurs inside a sub-decoder.
    Error = 0x05,
    /// `string` payload.
    String = 0x06,
    /// Array header (§4.3). Only valid at the top level.
    Array = 0x07,
    /// Serialized array: `int64` size followed by that many sub-values.
    ArraySerial = 0x08,
    /// Time-series registration (label string). Only valid at the top level.
    TimeSeries = 0x09,
    /// `int64` sentinel value (`Null`=0, `End`=1, `Marker`=2).
    Sentinel = 0x0A,
    /// `int64` payload, `0` is `false`, anything else is `true`.
    Bool = 0x0B,
    /// `int64` payload, Dec64-encoded.
    Dec64 = 0x0C,
    /// Two serialized sub-values.
    Pair = 0x0D,
    /// One serialized sub-value.
    HeartBeat = 0x0E,
    /// One serialized sub-value (shape), then `∏shape` serialized sub-values.
    Tensor = 0x0F,
}
