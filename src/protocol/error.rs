//! Defines the codec-level error type.

use thiserror::Error;

/// An error encountered while decoding the frame stream.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A frame, or sub-value, carried a tag byte this library doesn't understand.
    #[error("unhandled type 0x{0:02X} in frame")]
    UnhandledType(u8),
    /// The stream was well-formed at the tag level but violated some other
    /// expectation (bad UTF-8, negative array size, mismatched tensor shape...).
    #[error("invalid frame: {0}")]
    Invalid(String),
    /// An I/O error occurred, including an unexpected EOF in the middle of a frame.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The server sent an `Error` frame.
    #[error("server error: {0}")]
    ServerError(String),
    /// The materializer's point budget was reached before the stream ended.
    #[error("points limit reached, use streaming or a larger limit")]
    LimitExceeded,
    /// The encoded request envelope exceeds the 64 KiB wire ceiling.
    #[error("request of {0} bytes exceeds the 64KiB envelope limit")]
    Oversize(usize),
}
