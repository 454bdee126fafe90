//! Consumes an entire response stream into one in-memory [`Value`] tree (§6).
//!
//! This is the non-streaming consumption mode: every point of every
//! time-series in the response is held in memory before `materialize`
//! returns, which is why it accepts an optional point budget. Streaming
//! consumers that want to process points as they arrive should drive a
//! [`StreamInterpreter`] directly instead (see [`crate::client::Client::walk_result`]).

use std::collections::HashMap;

use super::codec::FrameReader;
use super::error::ProtocolError;
use super::interpreter::{Delivery, StreamInterpreter};
use super::value::Value;

/// Reads a full response stream from `r` and folds it into one [`Value`].
///
/// `limit`, if given and non-negative, caps the number of non-HeartBeat
/// deliveries (scalar values and time-series points alike) this call will
/// accept. The counter is checked after every delivery; once it reaches
/// `limit`, [`ProtocolError::LimitExceeded`] is returned immediately — the
/// caller gets nothing rather than a truncated tree, since a truncated
/// series is rarely what a non-streaming caller wants. A negative limit is
/// treated as "no limit", matching the sentinel convention used elsewhere
/// on the wire.
pub fn materialize(r: &mut FrameReader<'_>, limit: Option<i64>) -> Result<Value, ProtocolError> {
    let mut interp = StreamInterpreter::new();
    let mut values: HashMap<u32, Value> = HashMap::new();
    let mut root: Option<u32> = None;
    let mut delivery_count: i64 = 0;

    loop {
        let event = match interp.next(r)? {
            None | Some(Delivery::End) => break,
            Some(event) => event,
        };

        match event {
            Delivery::ArrayHeader { uid, .. } => {
                root.get_or_insert(uid);
            }
            Delivery::TimeSeriesLabel { uid, .. } => {
                root.get_or_insert(uid);
            }
            Delivery::Value { value: Value::HeartBeat(_), .. } => {
                // Dropped here, not in the interpreter: a streaming consumer
                // still sees heartbeats (§4.5); only materialization (§4.6)
                // discards them, and they never count against the budget or
                // become the root value.
            }
            Delivery::Value { uid, value } => {
                root.get_or_insert(uid);
                values.insert(uid, value);
                delivery_count += 1;
                check_limit(limit, delivery_count)?;
            }
            Delivery::Point { .. } => {
                delivery_count += 1;
                check_limit(limit, delivery_count)?;
            }
        }
    }

    Ok(resolve_array(root.unwrap_or(0), &interp, &values))
}

fn check_limit(limit: Option<i64>, count: i64) -> Result<(), ProtocolError> {
    if let Some(limit) = limit {
        if limit >= 0 && count >= limit {
            return Err(ProtocolError::LimitExceeded);
        }
    }
    Ok(())
}

/// Resolves one UID to its final value, recursing into declared array children.
///
/// Dispatches on what the interpreter actually learned about `uid` — an
/// array header, a time-series registration, or neither — rather than
/// assuming anything about UID numbering, so it resolves correctly
/// regardless of the order in which the server assigned UIDs.
fn resolve_array(uid: u32, interp: &StreamInterpreter, values: &HashMap<u32, Value>) -> Value {
    if let Some(children) = interp.children_of(uid) {
        Value::Array(
            children
                .iter()
                .map(|&child| resolve_array(child, interp, values))
                .collect(),
        )
    } else if let Some(series) = interp.timeseries(uid) {
        Value::TimeSeries(series.clone())
    } else {
        values.get(&uid).cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn push_frame(buf: &mut Vec<u8>, tag: u8, uid: u32, payload: &[u8]) {
        buf.push(tag);
        buf.push((uid & 0xFF) as u8);
        buf.push(((uid >> 8) & 0xFF) as u8);
        buf.push(((uid >> 16) & 0xFF) as u8);
        buf.extend_from_slice(payload);
    }

    fn end_frame(buf: &mut Vec<u8>) {
        push_frame(buf, 0x0A, 0, &1i64.to_le_bytes());
    }

    #[test]
    fn scalar_result() {
        let mut buf = Vec::new();
        push_frame(&mut buf, 0x01, 7, &7i64.to_le_bytes());
        end_frame(&mut buf);

        let mut cursor = Cursor::new(buf);
        let mut r = FrameReader::new(&mut cursor);
        assert_eq!(materialize(&mut r, None).unwrap(), Value::Int(7));
    }

    #[test]
    fn flat_array_of_ints() {
        let mut buf = Vec::new();
        let mut header = 4i64.to_le_bytes().to_vec();
        for uid in [1u32, 2, 3, 4] {
            header.push(0x01);
            header.extend_from_slice(&uid.to_le_bytes()[..3]);
        }
        push_frame(&mut buf, 0x07, 0, &header);
        for (uid, v) in [(1u32, 10i64), (2, 20), (3, 30), (4, 40)] {
            push_frame(&mut buf, 0x01, uid, &v.to_le_bytes());
        }
        end_frame(&mut buf);

        let mut cursor = Cursor::new(buf);
        let mut r = FrameReader::new(&mut cursor);
        let result = materialize(&mut r, None).unwrap();
        assert_eq!(
            result,
            Value::Array(vec![
                Value::Int(10),
                Value::Int(20),
                Value::Int(30),
                Value::Int(40)
            ])
        );
    }

    #[test]
    fn array_with_nested_timeseries_child() {
        let mut buf = Vec::new();
        let mut header = 2i64.to_le_bytes().to_vec();
        for uid in [1u32, 2] {
            header.push(0x01);
            header.extend_from_slice(&uid.to_le_bytes()[..3]);
        }
        push_frame(&mut buf, 0x07, 0, &header); // array { 1, 2 }
        push_frame(&mut buf, 0x01, 1, &99i64.to_le_bytes()); // child 1: plain int
        let mut ts_payload = 0i64.to_le_bytes().to_vec();
        ts_payload.extend_from_slice(b""); // empty label
        push_frame(&mut buf, 0x09, 2, &ts_payload); // child 2: time-series
        for (v, t) in [(1.0f64, 10i64), (2.0, 20)] {
            push_frame(&mut buf, 0x02, 2, &v.to_le_bytes());
            buf.extend_from_slice(&t.to_le_bytes());
        }
        end_frame(&mut buf);

        let mut cursor = Cursor::new(buf);
        let mut r = FrameReader::new(&mut cursor);
        let result = materialize(&mut r, None).unwrap();
        match result {
            Value::Array(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0], Value::Int(99));
                match &items[1] {
                    Value::TimeSeries(series) => assert_eq!(series.points.len(), 2),
                    other => panic!("expected time series, got {other:?}"),
                }
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn point_budget_is_enforced_exactly() {
        let mut buf = Vec::new();
        let mut ts_payload = 0i64.to_le_bytes().to_vec();
        ts_payload.extend_from_slice(b"");
        push_frame(&mut buf, 0x09, 1, &ts_payload);
        for (v, t) in [(1.0f64, 10i64), (2.0, 20), (3.0, 30)] {
            push_frame(&mut buf, 0x02, 1, &v.to_le_bytes());
            buf.extend_from_slice(&t.to_le_bytes());
        }
        end_frame(&mut buf);

        let mut cursor = Cursor::new(buf.clone());
        let mut r = FrameReader::new(&mut cursor);
        assert!(matches!(materialize(&mut r, Some(2)), Err(ProtocolError::LimitExceeded)));

        let mut cursor = Cursor::new(buf);
        let mut r = FrameReader::new(&mut cursor);
        let result = materialize(&mut r, Some(4)).unwrap();
        match result {
            Value::TimeSeries(series) => assert_eq!(series.points.len(), 3),
            other => panic!("expected time series, got {other:?}"),
        }
    }

    #[test]
    fn heartbeats_are_dropped() {
        let mut buf = Vec::new();
        push_frame(&mut buf, 0x0E, 0, &{
            let mut sub = vec![0x00u8];
            sub.extend_from_slice(&[0, 0, 0]);
            sub
        });
        push_frame(&mut buf, 0x01, 5, &1i64.to_le_bytes());
        end_frame(&mut buf);

        let mut cursor = Cursor::new(buf);
        let mut r = FrameReader::new(&mut cursor);
        assert_eq!(materialize(&mut r, None).unwrap(), Value::Int(1));
    }
}
