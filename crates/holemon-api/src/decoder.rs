//! Response body decoding.
//!
//! Turns a raw response body into a JSON document. Bodies arrive either with
//! identity framing (the bytes are the JSON) or with HTTP/1.1 chunked
//! transfer encoding, where the payload is split into hex length-prefixed
//! chunks and terminated by a zero-size chunk:
//!
//! ```text
//! 4\r\n
//! JSON\r\n
//! 0\r\n
//! \r\n
//! ```

use bytes::{Bytes, BytesMut};
use serde_json::Value;

use crate::error::DecodeError;

const CRLF: &[u8] = b"\r\n";

/// Decode a response body into JSON, removing chunk framing first when
/// `chunked` is set.
pub fn decode(body: &[u8], chunked: bool) -> Result<Value, DecodeError> {
    if chunked {
        let payload = dechunk(body)?;
        parse_json(&payload)
    } else {
        parse_json(body)
    }
}

/// Strip chunked transfer framing, concatenating chunk payloads in order.
///
/// Chunk extensions (`;name=value` after the size) and trailer headers after
/// the zero-size chunk are ignored.
pub fn dechunk(body: &[u8]) -> Result<Bytes, DecodeError> {
    let mut rest = body;
    let mut payload = BytesMut::with_capacity(body.len());

    loop {
        let Some((line, tail)) = split_line(rest) else {
            return Err(framing(if rest.is_empty() {
                "body ended before the terminating zero-size chunk".to_owned()
            } else {
                "chunk-size line is not terminated by CRLF".to_owned()
            }));
        };
        let size = parse_chunk_size(line)?;
        rest = tail;

        if size == 0 {
            return Ok(payload.freeze());
        }

        if rest.len() < size {
            return Err(framing(format!(
                "truncated chunk: expected {size} bytes, got {}",
                rest.len()
            )));
        }
        let (chunk, tail) = rest.split_at(size);
        payload.extend_from_slice(chunk);

        rest = tail
            .strip_prefix(CRLF)
            .ok_or_else(|| framing("chunk data is not followed by CRLF".to_owned()))?;
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError::JsonParse {
        message: e.to_string(),
    })
}

/// Split off everything up to the first CRLF. `None` if there is no CRLF.
fn split_line(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = buf.windows(CRLF.len()).position(|w| w == CRLF)?;
    Some((&buf[..pos], &buf[pos + CRLF.len()..]))
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, DecodeError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| framing("chunk-size line is not valid UTF-8".to_owned()))?;
    let digits = text.split(';').next().unwrap_or_default().trim();
    if digits.is_empty() {
        return Err(framing("empty chunk-size line".to_owned()));
    }
    usize::from_str_radix(digits, 16)
        .map_err(|_| framing(format!("invalid chunk size {digits:?}")))
}

fn framing(reason: String) -> DecodeError {
    DecodeError::ChunkFraming { reason }
}
