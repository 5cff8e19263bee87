use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use bytes::BytesMut;
use openshowvar_frame::{
    decode_request, encode_response, FrameError, HexBytes, Operation, HEADER_SIZE,
    MAX_RESPONSE_VALUE_LEN,
};
use openshowvar_transport::{StreamTransport, TcpTransport, Transport, TransportError};
use tracing::{debug, warn};

use crate::error::Result;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);
const REQUEST_CHUNK_SIZE: usize = 1024;

/// Shared in-memory variable store.
///
/// Names are case-insensitive, as on the controller.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(&normalize(name)).cloned()
    }

    /// Create or replace a variable. Values too long for a response frame
    /// are rejected.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        if value.len() > MAX_RESPONSE_VALUE_LEN {
            return Err(FrameError::PayloadTooLarge {
                size: value.len(),
                max: MAX_RESPONSE_VALUE_LEN,
            }
            .into());
        }
        self.lock().insert(normalize(name), value.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Apply one request and return the response frame.
    ///
    /// Reads of unknown names and writes to unknown names both produce the
    /// not-found frame; a write never creates a variable.
    pub fn respond(&self, request: &[u8]) -> Result<BytesMut> {
        let request = decode_request(request)?;
        let name = String::from_utf8_lossy(&request.name);

        let mut vars = self.lock();
        let key = normalize(&name);
        let hit = match request.operation {
            Operation::Read => vars.get(&key).cloned(),
            Operation::Write => {
                let value = String::from_utf8_lossy(request.value.as_deref().unwrap_or_default())
                    .into_owned();
                vars.get_mut(&key).map(|slot| {
                    slot.clone_from(&value);
                    value
                })
            }
        };
        drop(vars);

        debug!(
            operation = %request.operation,
            name = %name,
            found = hit.is_some(),
            "served request"
        );

        let mut response = BytesMut::new();
        let (value, found) = match &hit {
            Some(value) => (value.as_bytes(), true),
            None => (&b""[..], false),
        };
        encode_response(request.operation, value, found, &mut response)?;
        Ok(response)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Serves the controller side of the protocol from a [`VariableTable`].
pub struct ControllerEmulator {
    listener: TcpTransport,
    variables: VariableTable,
}

impl ControllerEmulator {
    /// Bind to `addr`. Use port 0 for an ephemeral port.
    pub fn bind(addr: &str) -> Result<Self> {
        Ok(Self {
            listener: TcpTransport::bind(addr)?,
            variables: VariableTable::new(),
        })
    }

    /// Seed a variable.
    pub fn with_variable(self, name: &str, value: &str) -> Result<Self> {
        self.variables.set(name, value)?;
        Ok(self)
    }

    /// Handle to the live variable table.
    pub fn variables(&self) -> VariableTable {
        self.variables.clone()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Accept and serve clients until `running` is cleared.
    ///
    /// Each connection is served on its own thread.
    pub fn serve_until(&self, running: &AtomicBool) -> Result<()> {
        self.listener.set_nonblocking(true)?;

        while running.load(Ordering::SeqCst) {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(TransportError::Accept(err))
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) =>
                {
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let variables = self.variables.clone();
            std::thread::spawn(move || {
                if let Err(err) = serve_connection(stream, &variables) {
                    warn!(%peer, error = %err, "connection ended with error");
                }
            });
        }

        debug!("emulator stopped accepting");
        Ok(())
    }

    /// Serve on a background thread until the returned handle is stopped or
    /// dropped.
    pub fn spawn(self) -> Result<EmulatorHandle> {
        let local_addr = self.local_addr();
        let variables = self.variables();
        let running = Arc::new(AtomicBool::new(true));

        let thread = {
            let running = Arc::clone(&running);
            std::thread::spawn(move || self.serve_until(&running))
        };

        Ok(EmulatorHandle {
            local_addr,
            variables,
            running,
            thread: Some(thread),
        })
    }
}

impl std::fmt::Debug for ControllerEmulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerEmulator")
            .field("local_addr", &self.local_addr())
            .field("variables", &self.variables.len())
            .finish()
    }
}

/// A running background emulator.
pub struct EmulatorHandle {
    local_addr: SocketAddr,
    variables: VariableTable,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl EmulatorHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn variables(&self) -> VariableTable {
        self.variables.clone()
    }

    /// Stop accepting and wait for the accept loop to exit.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        match self.thread.take() {
            Some(thread) => thread.join().unwrap_or(Ok(())),
            None => Ok(()),
        }
    }
}

impl Drop for EmulatorHandle {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "emulator accept loop failed");
        }
    }
}

fn serve_connection(stream: TcpStream, variables: &VariableTable) -> Result<()> {
    // Accepted sockets inherit non-blocking mode on some platforms.
    stream.set_nonblocking(false).map_err(TransportError::Io)?;
    let mut transport = StreamTransport::new(stream);
    let mut pending = BytesMut::new();

    while let Some(request) = read_request(&mut transport, &mut pending)? {
        debug!(request = %HexBytes(&request), "received request");
        let response = variables.respond(&request)?;
        transport.send(&response)?;
    }
    Ok(())
}

/// Read one complete request frame. `None` on a clean close between frames.
///
/// `buf` carries bytes past the returned frame over to the next call.
fn read_request<T: Transport>(
    transport: &mut T,
    buf: &mut BytesMut,
) -> Result<Option<BytesMut>> {
    loop {
        if buf.len() >= HEADER_SIZE {
            let payload_len = u16::from_be_bytes([buf[2], buf[3]]) as usize;
            if buf.len() >= HEADER_SIZE + payload_len {
                return Ok(Some(buf.split_to(HEADER_SIZE + payload_len)));
            }
        }

        match transport.receive(REQUEST_CHUNK_SIZE) {
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(TransportError::ConnectionClosed) if buf.is_empty() => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use openshowvar_frame::{decode_response, encode_request};

    use super::*;
    use crate::error::ClientError;

    fn request(operation: Operation, name: &str, value: Option<&str>) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_request(
            operation,
            name.as_bytes(),
            value.map(str::as_bytes),
            &mut buf,
        )
        .unwrap();
        buf
    }

    #[test]
    fn read_hit_returns_value() {
        let table = VariableTable::new();
        table.set("$OV_PRO", "75").unwrap();

        let response = table
            .respond(&request(Operation::Read, "$OV_PRO", None))
            .unwrap();
        assert_eq!(decode_response(&response).unwrap(), "75");
    }

    #[test]
    fn names_are_case_insensitive() {
        let table = VariableTable::new();
        table.set("count", "3").unwrap();

        let response = table
            .respond(&request(Operation::Read, "COUNT", None))
            .unwrap();
        assert_eq!(decode_response(&response).unwrap(), "3");
        assert_eq!(table.get("Count").as_deref(), Some("3"));
    }

    #[test]
    fn write_updates_existing_variable() {
        let table = VariableTable::new();
        table.set("COUNT", "0").unwrap();

        let response = table
            .respond(&request(Operation::Write, "COUNT", Some("9")))
            .unwrap();
        assert_eq!(response[4], Operation::Write.flag());
        assert_eq!(decode_response(&response).unwrap(), "9");
        assert_eq!(table.get("COUNT").as_deref(), Some("9"));
    }

    #[test]
    fn miss_produces_not_found_frame() {
        let table = VariableTable::new();

        let response = table
            .respond(&request(Operation::Read, "$NOPE", None))
            .unwrap();
        assert!(matches!(
            decode_response(&response),
            Err(FrameError::VariableNotFound)
        ));

        let response = table
            .respond(&request(Operation::Write, "$NOPE", Some("1")))
            .unwrap();
        assert!(matches!(
            decode_response(&response),
            Err(FrameError::VariableNotFound)
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn malformed_request_is_rejected() {
        let table = VariableTable::new();
        let err = table.respond(&[0x00, 0x00, 0x00, 0x09, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Frame(FrameError::InvalidRequest(_))
        ));
    }

    #[test]
    fn read_request_reassembles_split_frames() {
        let frame = request(Operation::Write, "COUNT", Some("12345"));
        let mut transport = Chunked {
            chunks: frame.chunks(3).map(|c| c.to_vec()).collect(),
        };

        let mut pending = BytesMut::new();
        let got = read_request(&mut transport, &mut pending).unwrap().unwrap();
        assert_eq!(got, frame);
        assert!(read_request(&mut transport, &mut pending).unwrap().is_none());
    }

    #[test]
    fn read_request_close_mid_frame_is_error() {
        let frame = request(Operation::Read, "COUNT", None);
        let mut transport = Chunked {
            chunks: std::collections::VecDeque::from(vec![frame[..5].to_vec()]),
        };
        let err = read_request(&mut transport, &mut BytesMut::new()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::ConnectionClosed)
        ));
    }

    #[test]
    fn read_request_keeps_pipelined_frames() {
        let first = request(Operation::Read, "COUNT", None);
        let second = request(Operation::Write, "COUNT", Some("2"));
        let mut stream = first.to_vec();
        stream.extend_from_slice(&second);
        let mut transport = Chunked {
            chunks: std::collections::VecDeque::from(vec![stream]),
        };

        let mut pending = BytesMut::new();
        assert_eq!(read_request(&mut transport, &mut pending).unwrap().unwrap(), first);
        assert_eq!(read_request(&mut transport, &mut pending).unwrap().unwrap(), second);
        assert!(read_request(&mut transport, &mut pending).unwrap().is_none());
    }

    #[test]
    fn oversized_seed_is_rejected() {
        let table = VariableTable::new();
        let value = "v".repeat(MAX_RESPONSE_VALUE_LEN + 1);
        let err = table.set("$BIG", &value).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Frame(FrameError::PayloadTooLarge { .. })
        ));
        assert!(table.is_empty());

        let value = "v".repeat(MAX_RESPONSE_VALUE_LEN);
        table.set("$BIG", &value).unwrap();
        let response = table
            .respond(&request(Operation::Read, "$BIG", None))
            .unwrap();
        assert_eq!(decode_response(&response).unwrap().len(), MAX_RESPONSE_VALUE_LEN);

        let err = ControllerEmulator::bind("127.0.0.1:0")
            .unwrap()
            .with_variable("$BIG", &"v".repeat(MAX_RESPONSE_VALUE_LEN + 1))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Frame(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn handle_stop_ends_accept_loop() {
        let handle = ControllerEmulator::bind("127.0.0.1:0")
            .unwrap()
            .spawn()
            .unwrap();
        handle.stop().expect("accept loop should exit cleanly");
    }

    struct Chunked {
        chunks: std::collections::VecDeque<Vec<u8>>,
    }

    impl Transport for Chunked {
        fn send(&mut self, _bytes: &[u8]) -> openshowvar_transport::Result<()> {
            Ok(())
        }

        fn receive(&mut self, _max_bytes: usize) -> openshowvar_transport::Result<bytes::Bytes> {
            self.chunks
                .pop_front()
                .map(bytes::Bytes::from)
                .ok_or(TransportError::ConnectionClosed)
        }
    }
}
