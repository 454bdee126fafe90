//! The value tree produced by the interpreter and materializer.

use std::time::SystemTime;

/// A LispTick duration: years, months, and days are kept separate from the
/// sub-day nanosecond count, and none of the fields are normalized against
/// each other — they're preserved exactly as sent on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Duration {
    /// Whole years.
    pub years: i64,
    /// Whole months.
    pub months: i64,
    /// Whole days.
    pub days: i64,
    /// Sub-day duration, in nanoseconds.
    pub nanos: i64,
}

/// One of the three sentinel markers, or a forward-compatible unknown value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sentinel {
    /// An empty/null result (e.g. the LispTick unit value `()`).
    Null,
    /// Terminates the response stream. Never delivered to a consumer.
    End,
    /// A progress marker distinct from a `HeartBeat`.
    Marker,
    /// A sentinel value outside the known range, kept rather than rejected
    /// so a newer server's forward-compatible additions don't break decoding.
    Other(i64),
}

impl Sentinel {
    pub(crate) fn from_i64(v: i64) -> Self {
        match v {
            0 => Sentinel::Null,
            1 => Sentinel::End,
            2 => Sentinel::Marker,
            other => Sentinel::Other(other),
        }
    }
}

/// A single (time, value) observation in a time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// The timestamp that followed the value on the wire.
    pub time: SystemTime,
    /// The value at `time`, decoded at the time series' declared element type.
    pub value: Value,
}

/// An ordered, labeled sequence of points sharing one UID.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    /// The label sent with the time-series registration frame.
    pub label: Option<String>,
    /// Points in wire (arrival) order.
    pub points: Vec<Point>,
}

/// An n-dimensional array of values, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Extent of each dimension.
    pub shape: Vec<i64>,
    /// `∏shape` values, in row-major order.
    pub values: Vec<Value>,
}

/// A decoded result value.
///
/// This is a tagged sum over every variant the wire protocol can produce;
/// polymorphism across variants is limited to `Debug`/`PartialEq`; callers
/// match on the variant they expect.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A signed 64-bit integer.
    Int(i64),
    /// An IEEE-754 binary64 float.
    Float(f64),
    /// A Dec64-encoded decimal, decoded to binary64 (see [`crate::protocol::codec::decode_dec64`]).
    Dec64(f64),
    /// A boolean.
    Bool(bool),
    /// UTF-8 text.
    String(String),
    /// An instant, down-converted from the wire's nanosecond precision.
    Time(SystemTime),
    /// A duration with separate calendar and sub-day components.
    Duration(Duration),
    /// One of the three sentinel markers.
    Sentinel(Sentinel),
    /// A two-element tuple.
    Pair(Box<Value>, Box<Value>),
    /// A fixed-length, possibly nested, ordered sequence of values.
    Array(Vec<Value>),
    /// A named, ordered sequence of (time, value) points.
    TimeSeries(TimeSeries),
    /// An n-dimensional array of values.
    Tensor(Tensor),
    /// A progress indicator. Dropped by the materializer; visible in streaming mode.
    HeartBeat(Box<Value>),
    /// An error message from the server.
    Error(String),
}
