//! A client for the LispTick streaming expression-evaluation protocol.
//!
//! A request is a short snippet of LispTick source sent to a server, which
//! evaluates it and streams back a sequence of typed, UID-tagged frames —
//! scalars, durations, time points, time series, (possibly nested) arrays,
//! pairs, tensors, and sentinels. This crate decodes that stream into
//! structured values, either by materializing the whole response into one
//! [`protocol::Value`] tree ([`Client::get_result`]) or by walking it frame
//! by frame as it arrives ([`Client::walk_result`]).
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lisptick::Client;
//!
//! let client = Client::connect("127.0.0.1");
//! let result = client.get_result("1+1")?;
//! println!("{result:?}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod protocol;

pub use client::{Client, ClientError, WalkItem};
pub use protocol::Value;
