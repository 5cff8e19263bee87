use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::indicator::is_error_indicator;
use crate::operation::Operation;
use crate::request::{HEADER_SIZE, MAX_FIELD_LEN, MESSAGE_ID};

/// Fixed response prefix: header (4) + status (1) + value length (2).
pub const RESPONSE_PREFIX_SIZE: usize = 7;

/// Status bytes the controller appends after the value.
pub const STATUS_TRAILER_SIZE: usize = 3;

/// Longest value a response frame can carry: the 16-bit payload length
/// also covers the status byte, the value length and the trailer.
pub const MAX_RESPONSE_VALUE_LEN: usize = MAX_FIELD_LEN - 1 - 2 - STATUS_TRAILER_SIZE;

/// Structurally parse a response and borrow its value bytes.
///
/// ```text
/// ┌────────────┬────────┬───────────┬─────────────────┬─────────┐
/// │ Header     │ Status │ Value len │ Value           │ Trailer │
/// │ bytes 0..4 │ byte 4 │ (2B BE)   │ bytes 7..7+len  │ ignored │
/// └────────────┴────────┴───────────┴─────────────────┴─────────┘
/// ```
///
/// Does not apply the not-found heuristic; see [`decode_response`].
pub fn response_value(src: &[u8]) -> Result<&[u8]> {
    if src.len() < RESPONSE_PREFIX_SIZE {
        return Err(FrameError::InvalidResponseLength { len: src.len() });
    }

    let value_len = u16::from_be_bytes([src[5], src[6]]) as usize;
    let available = src.len() - RESPONSE_PREFIX_SIZE;
    if available < value_len {
        return Err(FrameError::TruncatedResponse {
            declared: value_len,
            available,
        });
    }

    Ok(&src[RESPONSE_PREFIX_SIZE..RESPONSE_PREFIX_SIZE + value_len])
}

/// Decode a response frame into the variable's value.
///
/// Checks run in order: the 7-byte prefix must be present, the declared
/// value must fit in what arrived, and the raw frame must not match
/// [`is_error_indicator`]. Reads and writes share this routine; a write's
/// response echoes the accepted value.
pub fn decode_response(src: &[u8]) -> Result<String> {
    let value = response_value(src)?;
    if is_error_indicator(src) {
        return Err(FrameError::VariableNotFound);
    }
    Ok(String::from_utf8_lossy(value).into_owned())
}

/// Total frame size implied by a response prefix, if enough has arrived to
/// know it.
///
/// The header's payload length covers the trailer; the value length does
/// not. The larger of the two wins, so a frame with a zeroed header is still
/// read up to the end of its value.
pub fn declared_response_len(src: &[u8]) -> Option<usize> {
    if src.len() < HEADER_SIZE {
        return None;
    }
    let framed = HEADER_SIZE + u16::from_be_bytes([src[2], src[3]]) as usize;
    if src.len() < RESPONSE_PREFIX_SIZE {
        return Some(framed);
    }
    let value_len = u16::from_be_bytes([src[5], src[6]]) as usize;
    Some(framed.max(RESPONSE_PREFIX_SIZE + value_len))
}

/// Encode a response frame (controller side).
///
/// The trailer is `[0x00, 0x01, found]`: a miss ends in `0x00`, which is
/// what [`is_error_indicator`] looks for.
pub fn encode_response(
    operation: Operation,
    value: &[u8],
    found: bool,
    dst: &mut BytesMut,
) -> Result<()> {
    let payload_len = 1 + 2 + value.len() + STATUS_TRAILER_SIZE;
    if payload_len > MAX_FIELD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: MAX_FIELD_LEN,
        });
    }

    dst.reserve(4 + payload_len);
    dst.put_u16(MESSAGE_ID);
    dst.put_u16(payload_len as u16);
    dst.put_u8(operation.flag());
    dst.put_u16(value.len() as u16);
    dst.put_slice(value);
    dst.put_slice(&[0x00, 0x01, u8::from(found)]);
    Ok(())
}
