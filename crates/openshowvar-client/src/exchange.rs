use bytes::{Bytes, BytesMut};
use openshowvar_frame::{
    declared_response_len, decode_response, encode_request, validate_request, HexBytes, Operation,
};
use openshowvar_transport::{Transport, TransportError};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::Result;

/// One full round trip on a borrowed transport.
///
/// Validates the inputs, encodes the request, sends it, waits for the
/// response and decodes the value. Writes return the value the controller
/// echoed back.
pub fn exchange<T: Transport + ?Sized>(
    transport: &mut T,
    operation: Operation,
    name: &[u8],
    value: Option<&[u8]>,
    config: &ClientConfig,
) -> Result<String> {
    let response = send_request(transport, operation, name, value, config)?;
    Ok(decode_response(&response)?)
}

/// Send one request and return the raw response bytes, undecoded.
pub fn send_request<T: Transport + ?Sized>(
    transport: &mut T,
    operation: Operation,
    name: &[u8],
    value: Option<&[u8]>,
    config: &ClientConfig,
) -> Result<Bytes> {
    validate_request(operation, name, value)?;

    let mut request = BytesMut::new();
    encode_request(operation, name, value, &mut request)?;

    debug!(%operation, request = %HexBytes(&request), "sent request");
    transport.send(&request)?;

    let response = receive_response(transport, config)?;
    debug!(response = %HexBytes(&response), "received response");
    Ok(response)
}

/// Receive one response.
///
/// The first chunk is usually the whole frame. If it declares more than
/// arrived, keep reading until the declared frame (trailer included) is
/// complete or the peer closes. Each read asks for no more than the frame
/// still owes, so nothing past it is consumed.
///
/// Bytes beyond `max_response_size` are read and dropped; the kept prefix
/// then decodes as truncated and the connection stays aligned on the next
/// frame.
fn receive_response<T: Transport + ?Sized>(
    transport: &mut T,
    config: &ClientConfig,
) -> Result<Bytes> {
    let first = transport.receive(config.receive_buffer_size)?;
    let frame_len = match declared_response_len(&first) {
        Some(expected) => expected,
        None => return Ok(first),
    };
    if first.len() >= frame_len {
        return Ok(first);
    }

    let keep = frame_len.min(config.max_response_size);
    let mut buf = BytesMut::from(&first[..first.len().min(keep)]);
    let mut received = first.len();
    while received < frame_len {
        let want = (frame_len - received).min(config.receive_buffer_size);
        match transport.receive(want) {
            Ok(chunk) => {
                received += chunk.len();
                let room = keep.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
            Err(TransportError::ConnectionClosed) => {
                debug!(received, expected = frame_len, "peer closed mid-response");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if frame_len > keep {
        warn!(
            declared = frame_len,
            kept = keep,
            "response exceeds max_response_size, remainder discarded"
        );
    }
    Ok(buf.freeze())
}
