//! Request/response framing for the OpenShowVar protocol.
//!
//! This is the core of the workspace. A request frame is:
//! - A 2-byte big-endian message ID (always 0)
//! - A 2-byte big-endian payload length
//! - A payload of operation flag, length-prefixed name and, for writes,
//!   length-prefixed value
//!
//! Responses carry the value at a fixed offset behind a 2-byte length.
//! Everything here is pure: no I/O, no state between calls.

pub mod error;
pub mod hex;
pub mod indicator;
pub mod operation;
pub mod request;
pub mod response;

pub use error::{FrameError, Result};
pub use hex::HexBytes;
pub use indicator::is_error_indicator;
pub use operation::Operation;
pub use request::{
    decode_request, encode_request, request_payload_len, validate_request, Request, HEADER_SIZE,
    MAX_FIELD_LEN, MESSAGE_ID,
};
pub use response::{
    decode_response, declared_response_len, encode_response, response_value,
    MAX_RESPONSE_VALUE_LEN, RESPONSE_PREFIX_SIZE, STATUS_TRAILER_SIZE,
};
