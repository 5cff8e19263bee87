use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::operation::Operation;

/// Request header: message ID (2) + payload length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Message ID carried by every request. The protocol never varies it.
pub const MESSAGE_ID: u16 = 0;

/// Largest name, value or payload expressible in a 16-bit length field.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// A parsed request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub name: Bytes,
    /// Present only for writes.
    pub value: Option<Bytes>,
}

impl Request {
    /// A read request for `name`.
    pub fn read(name: impl Into<Bytes>) -> Self {
        Self {
            operation: Operation::Read,
            name: name.into(),
            value: None,
        }
    }

    /// A write request setting `name` to `value`.
    pub fn write(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            operation: Operation::Write,
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Encode this request into `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        encode_request(
            self.operation,
            self.name.as_ref(),
            self.value.as_deref(),
            dst,
        )
    }
}

/// Reject inputs the controller cannot act on.
///
/// Run by the calling layer before any frame is built: the name must be
/// non-empty, and a write must carry a non-empty value.
pub fn validate_request(operation: Operation, name: &[u8], value: Option<&[u8]>) -> Result<()> {
    if name.is_empty() {
        return Err(FrameError::InvalidInput("empty variable name".into()));
    }
    if operation == Operation::Write && value.is_none_or(|v| v.is_empty()) {
        return Err(FrameError::InvalidInput("empty value".into()));
    }
    Ok(())
}

/// Payload size of a request: flag (1) + name length (2) + name, plus value
/// length (2) + value for writes.
pub fn request_payload_len(operation: Operation, name_len: usize, value_len: usize) -> usize {
    let base = 1 + 2 + name_len;
    match operation {
        Operation::Read => base,
        Operation::Write => base + 2 + value_len,
    }
}

/// Encode a request into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬───────────┬────────┬──────────┬──────┬──────────┬───────┐
/// │ Msg ID   │ Length    │ Op     │ Name len │ Name │ Value len│ Value │
/// │ (2B BE)  │ (2B BE)   │ (1B)   │ (2B BE)  │      │ (2B BE)  │       │
/// │ 0x0000   │ payload   │ 0 / 1  │          │      │ write only        │
/// └──────────┴───────────┴────────┴──────────┴──────┴──────────┴───────┘
/// ```
///
/// For reads `value` is ignored. Emptiness is not checked here; see
/// [`validate_request`].
pub fn encode_request(
    operation: Operation,
    name: &[u8],
    value: Option<&[u8]>,
    dst: &mut BytesMut,
) -> Result<()> {
    let value = match operation {
        Operation::Read => &[][..],
        Operation::Write => value.unwrap_or_default(),
    };

    check_field_len(name.len())?;
    check_field_len(value.len())?;
    let payload_len = request_payload_len(operation, name.len(), value.len());
    check_field_len(payload_len)?;

    dst.reserve(HEADER_SIZE + payload_len);
    dst.put_u16(MESSAGE_ID);
    dst.put_u16(payload_len as u16);
    dst.put_u8(operation.flag());
    dst.put_u16(name.len() as u16);
    dst.put_slice(name);
    if operation == Operation::Write {
        dst.put_u16(value.len() as u16);
        dst.put_slice(value);
    }
    Ok(())
}

/// Parse a request frame (controller side).
///
/// Trailing bytes beyond the declared payload are rejected so a stream
/// carrying two requests back to back is not silently half-read.
pub fn decode_request(src: &[u8]) -> Result<Request> {
    let mut buf = src;
    if buf.remaining() < HEADER_SIZE {
        return Err(FrameError::InvalidRequest(format!(
            "{} bytes is shorter than the {HEADER_SIZE}-byte header",
            src.len()
        )));
    }

    let _message_id = buf.get_u16();
    let payload_len = buf.get_u16() as usize;
    if buf.remaining() != payload_len {
        return Err(FrameError::InvalidRequest(format!(
            "header declares {payload_len} payload bytes, frame carries {}",
            buf.remaining()
        )));
    }

    if buf.remaining() < 3 {
        return Err(FrameError::InvalidRequest("payload too short".into()));
    }
    let flag = buf.get_u8();
    let operation = Operation::from_flag(flag)
        .ok_or_else(|| FrameError::InvalidRequest(format!("unknown operation flag {flag}")))?;

    let name = take_field(&mut buf, "name")?;
    let value = match operation {
        Operation::Read => None,
        Operation::Write => Some(take_field(&mut buf, "value")?),
    };

    if buf.has_remaining() {
        return Err(FrameError::InvalidRequest(format!(
            "{} unexpected trailing bytes",
            buf.remaining()
        )));
    }

    Ok(Request {
        operation,
        name,
        value,
    })
}

fn take_field(buf: &mut &[u8], what: &str) -> Result<Bytes> {
    if buf.remaining() < 2 {
        return Err(FrameError::InvalidRequest(format!("missing {what} length")));
    }
    let len = buf.get_u16() as usize;
    if buf.remaining() < len {
        return Err(FrameError::InvalidRequest(format!(
            "{what} length {len} exceeds remaining {} bytes",
            buf.remaining()
        )));
    }
    Ok(buf.copy_to_bytes(len))
}

fn check_field_len(len: usize) -> Result<()> {
    if len > MAX_FIELD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(())
}
