//! The LispTick wire protocol: frame codec, stream interpreter, and materializer.

pub mod codec;
pub mod error;
pub mod frame;
pub mod interpreter;
pub mod materializer;
pub mod request;
pub mod tag;
pub mod value;

pub use codec::{decode_dec64, FrameReader};
pub use error::ProtocolError;
pub use interpreter::{Delivery, StreamInterpreter};
pub use materializer::materialize;
pub use request::encode_request;
pub use tag::Tag;
pub use value::{Duration, Point, Sentinel, Tensor, TimeSeries, Value};

/// The server's conventional TCP port.
pub const DEFAULT_PORT: u16 = 12006;
