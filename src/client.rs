use std::io::Write;
use std::net::TcpStream;

use crate::protocol::{self, Delivery, FrameReader, Point, ProtocolError, StreamInterpreter, Value};

/// An error encountered by a [Client].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The TCP connection to the server could not be established.
    #[error("connecting to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// The request envelope could not be written to the socket.
    #[error("sending request")]
    Send(#[source] std::io::Error),
    /// A codec- or stream-level error, including a server-sent `Error` frame.
    #[error("protocol error: {0}")]
    Protocol(ProtocolError),
    /// The materializer's point budget was reached before the stream ended.
    #[error("points limit reached, use streaming or a larger limit")]
    LimitExceeded,
    /// The encoded request envelope exceeds the 64 KiB wire ceiling.
    #[error("request of {0} bytes exceeds the envelope limit")]
    Oversize(usize),
}

impl From<ProtocolError> for ClientError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::LimitExceeded => ClientError::LimitExceeded,
            ProtocolError::Oversize(n) => ClientError::Oversize(n),
            other => ClientError::Protocol(other),
        }
    }
}

/// The result of a [Client] operation.
pub type Result<T> = std::result::Result<T, ClientError>;

/// One item delivered to a [`Client::walk_result`] callback.
#[derive(Debug)]
pub enum WalkItem {
    /// A standalone value, not part of any time series.
    Value(Value),
    /// A point appended to a time series previously opened at the same UID.
    Point(Point),
}

/// A LispTick client.
///
/// Each request opens its own connection: the client itself holds no
/// socket, only the address to dial. This matches the protocol's
/// single-threaded, one-transport-per-request model (see `RESOURCE MODEL`
/// in the protocol notes) — there is no persistent session to share between
/// requests.
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    port: u16,
}

impl Client {
    /// Creates a client that dials `host:port` for every request.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Client {
            host: host.into(),
            port,
        }
    }

    /// Creates a client targeting `host` on the protocol's conventional port.
    pub fn connect(host: impl Into<String>) -> Self {
        Self::new(host, protocol::DEFAULT_PORT)
    }

    /// Materializes a single value for `code`, with no point budget.
    pub fn get_result(&self, code: &str) -> Result<Value> {
        self.get_result_with_limit(code, None)
    }

    /// Materializes a single value for `code`, aborting if more than `limit`
    /// non-HeartBeat deliveries arrive.
    pub fn get_result_with_limit(&self, code: &str, limit: Option<i64>) -> Result<Value> {
        // The connection is local to this call and closes via `Drop` on
        // every exit path, including the `?` below.
        let mut conn = self.open(code)?;
        let mut reader = FrameReader::new(&mut conn);
        Ok(protocol::materialize(&mut reader, limit)?)
    }

    /// Streams the result for `code`, invoking `callback` for every
    /// delivered value or time-series point, in wire order.
    ///
    /// The callback receives the interpreter so it can inspect array/
    /// time-series structure (e.g. [`StreamInterpreter::children_of`]) if
    /// it needs to reassemble structure itself instead of relying on
    /// [`Client::get_result`]'s materialized tree. It must not be re-entered
    /// and may block the walk's progress.
    pub fn walk_result(
        &self,
        code: &str,
        mut callback: impl FnMut(&StreamInterpreter, u32, WalkItem),
    ) -> Result<()> {
        let mut conn = self.open(code)?;
        let mut reader = FrameReader::new(&mut conn);
        let mut interp = StreamInterpreter::new();

        loop {
            match interp.next(&mut reader).map_err(ClientError::from)? {
                None | Some(Delivery::End) => return Ok(()),
                Some(Delivery::ArrayHeader { .. } | Delivery::TimeSeriesLabel { .. }) => {}
                Some(Delivery::Value { uid, value }) => callback(&interp, uid, WalkItem::Value(value)),
                Some(Delivery::Point { uid, point }) => callback(&interp, uid, WalkItem::Point(point)),
            }
        }
    }

    fn open(&self, code: &str) -> Result<TcpStream> {
        let request = protocol::encode_request(code)?;

        let addr = format!("{}:{}", self.host, self.port);
        log::debug!("connecting to lisptick server at {addr}");
        let mut stream =
            TcpStream::connect(&addr).map_err(|source| ClientError::Connect { addr, source })?;

        stream.write_all(&request).map_err(ClientError::Send)?;
        Ok(stream)
    }
}

#[cfg(all(test, feature = "_integration-tests"))]
mod tests {
    use super::*;
    use anyhow::Context as _;

    fn test_client() -> Client {
        Client::connect("127.0.0.1")
    }

    #[test_log::test]
    fn scalar_arithmetic() -> anyhow::Result<()> {
        let client = test_client();
        let result = client
            .get_result("1+1")
            .context("evaluating 1+1 against a running server")?;
        assert_eq!(result, Value::Int(2));
        Ok(())
    }

    #[test_log::test]
    fn oversize_request_fails_before_connecting() -> anyhow::Result<()> {
        let client = test_client();
        let huge = "1".repeat(protocol::request::MAX_REQUEST_LEN + 1);
        match client.get_result(&huge) {
            Err(ClientError::Oversize(_)) => Ok(()),
            other => anyhow::bail!("expected Oversize, got {other:?}"),
        }
    }
}
