//! Demultiplexes the raw frame stream into a value tree (§5).
//!
//! A LispTick response interleaves frames for many logical values under one
//! byte stream, distinguished only by UID. [`StreamInterpreter`] is the
//! piece of state that makes sense of that interleaving: it remembers which
//! UIDs are array headers (and their declared children), which are
//! time-series registrations, and folds each subsequent value frame for a
//! time-series UID into that series' point list.

use std::collections::HashMap;
use std::time::SystemTime;

use super::codec::FrameReader;
use super::error::ProtocolError;
use super::frame::{self, TopFrame};
use super::value::{Point, Sentinel, TimeSeries, Value};

/// One decoded, demultiplexed event from the stream.
#[derive(Debug)]
pub enum Delivery {
    /// An array header arrived. `children` are in declared order; each will
    /// arrive later as its own event, keyed by its own UID.
    ArrayHeader { uid: u32, children: Vec<u32> },
    /// A time-series registration arrived, opening `uid` as a series.
    TimeSeriesLabel { uid: u32, label: Option<String> },
    /// A point was appended to the time-series previously opened at `uid`.
    Point { uid: u32, point: Point },
    /// A standalone value arrived for `uid` (not part of any time series).
    ///
    /// A [`Value::HeartBeat`] is delivered here like any other value — only
    /// the materializer drops heartbeats (§4.6); a streaming consumer sees
    /// them and may use them as a progress indicator.
    Value { uid: u32, value: Value },
    /// The stream's `End` sentinel arrived. No further events follow.
    End,
}

/// Tracks per-UID structure across the lifetime of one response stream.
///
/// Not `Clone`: a response stream is consumed exactly once, start to finish.
#[derive(Debug, Default)]
pub struct StreamInterpreter {
    arrays: HashMap<u32, Vec<u32>>,
    timeseries: HashMap<u32, TimeSeries>,
}

impl StreamInterpreter {
    /// Creates an interpreter with no known UIDs yet.
    pub fn new() -> Self {
        StreamInterpreter {
            arrays: HashMap::new(),
            timeseries: HashMap::new(),
        }
    }

    /// Declared children of an array header previously seen at `uid`, in order.
    pub fn children_of(&self, uid: u32) -> Option<&[u32]> {
        self.arrays.get(&uid).map(Vec::as_slice)
    }

    /// Whether `uid` was registered as a time series.
    pub fn is_timeseries(&self, uid: u32) -> bool {
        self.timeseries.contains_key(&uid)
    }

    /// The accumulated series registered at `uid`, if any.
    pub fn timeseries(&self, uid: u32) -> Option<&TimeSeries> {
        self.timeseries.get(&uid)
    }

    /// Reads and demultiplexes the next event from `r`.
    ///
    /// Returns `Ok(None)` only on an orderly close before any bytes of a new
    /// frame arrive; a clean `End` sentinel is reported as `Delivery::End`,
    /// not `None`.
    pub fn next(&mut self, r: &mut FrameReader<'_>) -> Result<Option<Delivery>, ProtocolError> {
        let top = match frame::read_top_frame(r)? {
            None => return Ok(None),
            Some(top) => top,
        };
        log::debug!("frame: {top:?}");

        Ok(Some(match top {
            TopFrame::Error { message, .. } => return Err(ProtocolError::ServerError(message)),
            TopFrame::ArrayHeader { uid, children, .. } => {
                log::trace!("array header uid={uid} size={}", children.len());
                self.arrays.insert(uid, children.clone());
                Delivery::ArrayHeader { uid, children }
            }
            TopFrame::TimeSeriesLabel { uid, label } => {
                log::trace!("time-series registered uid={uid} label={label:?}");
                let label = if label.is_empty() { None } else { Some(label) };
                self.timeseries.insert(
                    uid,
                    TimeSeries {
                        label: label.clone(),
                        points: Vec::new(),
                    },
                );
                Delivery::TimeSeriesLabel { uid, label }
            }
            TopFrame::Sentinel { uid, value } => {
                if value == Sentinel::End {
                    Delivery::End
                } else {
                    // Per spec.md §4.5 step 4, a non-`End` Sentinel is
                    // delivered as a scalar value unconditionally — step 5's
                    // trailing-timestamp read is reserved for "any other
                    // tag", which a Sentinel is not, even when its UID is a
                    // registered time series.
                    Delivery::Value {
                        uid,
                        value: Value::Sentinel(value),
                    }
                }
            }
            TopFrame::Value { uid, value } => {
                if self.is_timeseries(uid) {
                    let time = r.read_time()?;
                    self.push_point(uid, value, time)
                } else {
                    Delivery::Value { uid, value }
                }
            }
        }))
    }

    fn push_point(&mut self, uid: u32, value: Value, time: SystemTime) -> Delivery {
        let point = Point { time, value };
        if let Some(series) = self.timeseries.get_mut(&uid) {
            series.points.push(point.clone());
        }
        Delivery::Point { uid, point }
    }
}
