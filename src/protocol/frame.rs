//! Top-level frame decoding (§4.2/4.3) and the serialized sub-value decoder (§4.4).

use super::codec::FrameReader;
use super::error::ProtocolError;
use super::tag::Tag;
use super::value::{Tensor, Value};

/// A fully-decoded top-level frame, before the interpreter folds it into
/// array/time-series state.
#[derive(Debug)]
pub enum TopFrame {
    /// An array header: declares the array's fixed size and its children's UIDs.
    ArrayHeader { uid: u32, size: i64, children: Vec<u32> },
    /// A time-series registration, carrying its label.
    TimeSeriesLabel { uid: u32, label: String },
    /// A sentinel frame. `End` terminates the stream; others are delivered as values.
    Sentinel { uid: u32, value: super::value::Sentinel },
    /// Any other tag, fully decoded to a [`Value`].
    Value { uid: u32, value: Value },
    /// A server-sent `Error` frame. Always fatal.
    Error { uid: u32, message: String },
}

/// Reads one top-level frame, or `None` at an orderly end of stream.
pub fn read_top_frame(r: &mut FrameReader<'_>) -> Result<Option<TopFrame>, ProtocolError> {
    let tag = match r.read_tag_or_eof()? {
        None => return Ok(None),
        Some(tag) => tag,
    };
    let uid = r.read_uid()?;

    Ok(Some(match tag {
        Tag::Error => TopFrame::Error {
            uid,
            message: r.read_string()?,
        },
        Tag::Array => {
            let (size, children) = read_array_header(r)?;
            TopFrame::ArrayHeader { uid, size, children }
        }
        Tag::TimeSeries => TopFrame::TimeSeriesLabel {
            uid,
            label: r.read_string()?,
        },
        Tag::Sentinel => TopFrame::Sentinel {
            uid,
            value: r.read_sentinel()?,
        },
        // `Null` has no top-level payload shape of its own (§4.2 lists it
        // "context-dependent; appears in serialized sub-decoder only"); a
        // conforming server never emits it here, so — matching the
        // reference implementation, which has no top-level handler for it
        // either — it's fatal rather than silently decoded to `Value::Null`.
        Tag::Null => return Err(ProtocolError::UnhandledType(Tag::Null as u8)),
        other => TopFrame::Value {
            uid,
            value: read_value_payload(r, other)?,
        },
    }))
}

/// Consumes an array header's payload: a size, then that many `(tag, uid)`
/// child slots. Only the tag+uid pairs are read here — children's payloads
/// arrive later, as their own top-level frames.
pub(crate) fn read_array_header(r: &mut FrameReader<'_>) -> Result<(i64, Vec<u32>), ProtocolError> {
    let size = r.read_i64()?;
    if size < 0 {
        return Err(ProtocolError::Invalid(format!("negative array size {size}")));
    }
    let mut children = Vec::with_capacity(size as usize);
    for _ in 0..size {
        let _child_tag = r.read_tag()?;
        children.push(r.read_uid()?);
    }
    Ok((size, children))
}

/// Reads one serialized sub-value: `[tag][uid (ignored)][payload]`.
///
/// An `Error` tag here is always fatal, per §4.4.
fn read_sub_value(r: &mut FrameReader<'_>) -> Result<Value, ProtocolError> {
    let tag = r.read_tag()?;
    let _uid = r.read_uid()?; // present for wire symmetry, semantically ignored
    if tag == Tag::Error {
        return Err(ProtocolError::ServerError(r.read_string()?));
    }
    read_value_payload(r, tag)
}

/// Decodes the payload that follows a tag+uid pair, for any tag except
/// `Error` (handled separately by each call site, since fatality differs
/// between the top level and the sub-decoder) and `Array`/`TimeSeries`
/// (never valid outside the top level).
///
/// `Null` reaches here only from the sub-decoder (`read_sub_value`):
/// `read_top_frame` rejects a top-level `Null` before calling this function.
pub(crate) fn read_value_payload(r: &mut FrameReader<'_>, tag: Tag) -> Result<Value, ProtocolError> {
    match tag {
        Tag::Null => Ok(Value::Null),
        Tag::Int => Ok(Value::Int(r.read_i64()?)),
        Tag::Float => Ok(Value::Float(r.read_f64()?)),
        Tag::Time => Ok(Value::Time(r.read_time()?)),
        Tag::Duration => Ok(Value::Duration(r.read_duration()?)),
        Tag::String => Ok(Value::String(r.read_string()?)),
        Tag::Bool => Ok(Value::Bool(r.read_bool()?)),
        Tag::Dec64 => Ok(Value::Dec64(r.read_dec64()?)),
        Tag::Sentinel => Ok(Value::Sentinel(r.read_sentinel()?)),
        Tag::ArraySerial => read_serial_array(r),
        Tag::Pair => {
            let head = read_sub_value(r)?;
            let tail = read_sub_value(r)?;
            Ok(Value::Pair(Box::new(head), Box::new(tail)))
        }
        Tag::HeartBeat => Ok(Value::HeartBeat(Box::new(read_sub_value(r)?))),
        Tag::Tensor => read_tensor(r),
        Tag::Error => unreachable!("Error is handled by callers before reaching read_value_payload"),
        Tag::Array | Tag::TimeSeries => Err(ProtocolError::Invalid(format!(
            "{tag:?} is only valid as a top-level frame"
        ))),
    }
}

fn read_serial_array(r: &mut FrameReader<'_>) -> Result<Value, ProtocolError> {
    let size = r.read_i64()?;
    if size < 0 {
        return Err(ProtocolError::Invalid(format!(
            "negative serialized array size {size}"
        )));
    }
    let mut values = Vec::with_capacity(size as usize);
    for _ in 0..size {
        values.push(read_sub_value(r)?);
    }
    Ok(Value::Array(values))
}

fn read_tensor(r: &mut FrameReader<'_>) -> Result<Value, ProtocolError> {
    let shape_value = read_sub_value(r)?;
    let shape = match shape_value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Int(i) => Ok(i),
                other => Err(ProtocolError::Invalid(format!(
                    "tensor shape element is not an int: {other:?}"
                ))),
            })
            .collect::<Result<Vec<i64>, ProtocolError>>()?,
        other => {
            return Err(ProtocolError::Invalid(format!(
                "tensor shape is not an array: {other:?}"
            )))
        }
    };

    let total: i64 = shape.iter().product();
    if total < 0 {
        return Err(ProtocolError::Invalid(format!(
            "tensor shape {shape:?} implies a negative size"
        )));
    }
    let mut values = Vec::with_capacity(total as usize);
    for _ in 0..total {
        values.push(read_sub_value(r)?);
    }
    Ok(Value::Tensor(Tensor { shape, values }))
}
