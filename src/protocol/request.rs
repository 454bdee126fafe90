//! Encodes a request for transmission (§6).
//!
//! The request envelope is unrelated to the frame codec used for responses:
//! it's a 2-byte little-endian size prefix around a small JSON object, not a
//! tagged frame.

use serde::Serialize;

use super::error::ProtocolError;

/// The 64 KiB ceiling on an encoded request envelope's JSON body.
///
/// This is a deliberate, narrow deviation from both spec.md §6's literal
/// "exceeds 65,536 bytes" wording and the original's `len > 65536` check:
/// the envelope's size prefix is two bytes wide, so `u16::MAX` (65,535) is
/// the largest length the wire format can actually carry. A body of exactly
/// 65,536 bytes would silently wrap the prefix rather than being rejected —
/// every other byte count above `u16::MAX` the literal wording would admit
/// is equally unencodable — so the ceiling enforced here is exclusive of
/// `u16::MAX` rather than the inclusive boundary a literal reading implies.
pub const MAX_REQUEST_LEN: usize = u16::MAX as usize;

#[derive(Serialize)]
struct RequestBody<'a> {
    code: &'a str,
}

/// Encodes `code` as `[len_lo, len_hi][json bytes]`, ready to write to the transport.
///
/// Returns [`ProtocolError::Oversize`] if the JSON body would exceed
/// [`MAX_REQUEST_LEN`] bytes; this check happens before any I/O is attempted.
pub fn encode_request(code: &str) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(&RequestBody { code })
        .map_err(|e| ProtocolError::Invalid(format!("failed to encode request: {e}")))?;

    if json.len() > MAX_REQUEST_LEN {
        return Err(ProtocolError::Oversize(json.len()));
    }

    let len = json.len() as u16;
    let mut out = Vec::with_capacity(2 + json.len());
    out.push((len & 0xFF) as u8);
    out.push(((len >> 8) & 0xFF) as u8);
    out.extend_from_slice(&json);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn envelope_shape() {
        let encoded = encode_request("1+1").unwrap();
        let json = br#"{"code":"1+1"}"#;
        assert_eq!(encoded[0] as usize | ((encoded[1] as usize) << 8), json.len());
        assert_eq!(&encoded[2..], json);
    }

    #[test]
    fn oversize_request_is_rejected_before_encoding_succeeds() {
        let huge = "x".repeat(MAX_REQUEST_LEN + 1);
        match encode_request(&huge) {
            Err(ProtocolError::Oversize(n)) => assert!(n > MAX_REQUEST_LEN),
            other => panic!("expected Oversize, got {other:?}"),
        }
    }

    #[test]
    fn request_at_exactly_the_limit_is_accepted() {
        // `{"code":"..."}` == 11 bytes of scaffolding around the code string.
        let code = "x".repeat(MAX_REQUEST_LEN - 11);
        let encoded = encode_request(&code).unwrap();
        assert_eq!(encoded.len() - 2, MAX_REQUEST_LEN);
    }
}
