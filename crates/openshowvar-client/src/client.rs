use std::net::{Shutdown, SocketAddr, TcpStream};

use bytes::Bytes;
use openshowvar_frame::{is_error_indicator, FrameError, Operation};
use openshowvar_transport::{StreamTransport, TcpTransport, Transport};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::exchange::{exchange, send_request};

/// A client connected over TCP.
pub type TcpClient = Client<StreamTransport<TcpStream>>;

/// Connect to a controller at `addr` (`host:port`) with default configuration.
pub fn connect(addr: &str) -> Result<TcpClient> {
    connect_with_config(addr, ClientConfig::default())
}

/// Connect with explicit configuration.
pub fn connect_with_config(addr: &str, config: ClientConfig) -> Result<TcpClient> {
    let transport = TcpTransport::connect(addr, &config.transport)?;
    Ok(Client::from_transport(transport, config))
}

/// An open connection to a controller.
///
/// The client owns its transport; dropping it closes the connection. Each
/// call is one request followed by one response.
pub struct Client<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    /// Wrap an already-connected transport.
    pub fn from_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Read the current value of `name`.
    pub fn read(&mut self, name: &str) -> Result<String> {
        exchange(
            &mut self.transport,
            Operation::Read,
            name.as_bytes(),
            None,
            &self.config,
        )
    }

    /// Write `value` to `name` and return the value the controller echoed.
    pub fn write(&mut self, name: &str, value: &str) -> Result<String> {
        exchange(
            &mut self.transport,
            Operation::Write,
            name.as_bytes(),
            Some(value.as_bytes()),
            &self.config,
        )
    }

    /// Send a raw request and return the undecoded response.
    ///
    /// A non-empty `value` makes this a write. The not-found check is applied
    /// to the raw bytes; length fields are not interpreted.
    pub fn send(&mut self, name: &str, value: Option<&str>) -> Result<Bytes> {
        let value = value.map(str::as_bytes);
        let operation = Operation::for_value(value);
        let response = send_request(
            &mut self.transport,
            operation,
            name.as_bytes(),
            value,
            &self.config,
        )?;
        if is_error_indicator(&response) {
            return Err(FrameError::VariableNotFound.into());
        }
        Ok(response)
    }

    /// Current client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the client and return the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl Client<StreamTransport<TcpStream>> {
    /// Address of the connected controller.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.transport.get_ref().peer_addr().ok()
    }

    /// Close the connection.
    pub fn disconnect(self) -> Result<()> {
        let stream = self.transport.into_inner();
        let peer = stream.peer_addr().ok();
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => {}
            Err(err) => return Err(openshowvar_transport::TransportError::Io(err).into()),
        }
        debug!(?peer, "disconnected from controller");
        Ok(())
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use openshowvar_transport::TransportError;

    use super::*;
    use crate::emulator::ControllerEmulator;
    use crate::error::ClientError;

    fn emulator() -> crate::emulator::EmulatorHandle {
        ControllerEmulator::bind("127.0.0.1:0")
            .expect("emulator should bind")
            .with_variable("COUNT", "0")
            .and_then(|e| e.with_variable("$OV_PRO", "100"))
            .expect("variables should seed")
            .spawn()
            .expect("emulator should start")
    }

    #[test]
    fn read_write_read_against_emulator() {
        let server = emulator();
        let mut client = connect(&server.local_addr().to_string()).expect("client should connect");

        assert_eq!(client.read("COUNT").unwrap(), "0");
        assert_eq!(client.write("COUNT", "1").unwrap(), "1");
        assert_eq!(client.read("COUNT").unwrap(), "1");

        client.disconnect().expect("disconnect should succeed");
        assert_eq!(
            server.variables().get("COUNT").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn unknown_variable_is_not_found() {
        let server = emulator();
        let mut client = connect(&server.local_addr().to_string()).unwrap();

        let err = client.read("$MISSING").unwrap_err();
        assert!(err.is_not_found());

        // The connection stays usable after a miss.
        assert_eq!(client.read("$OV_PRO").unwrap(), "100");
    }

    #[test]
    fn empty_inputs_rejected_before_send() {
        let server = emulator();
        let mut client = connect(&server.local_addr().to_string()).unwrap();

        assert!(matches!(
            client.read("").unwrap_err(),
            ClientError::Frame(FrameError::InvalidInput(_))
        ));
        assert!(matches!(
            client.write("COUNT", "").unwrap_err(),
            ClientError::Frame(FrameError::InvalidInput(_))
        ));
        assert!(matches!(
            client.write("", "1").unwrap_err(),
            ClientError::Frame(FrameError::InvalidInput(_))
        ));
    }

    #[test]
    fn send_returns_raw_response() {
        let server = emulator();
        let mut client = connect(&server.local_addr().to_string()).unwrap();

        let raw = client.send("$OV_PRO", None).unwrap();
        assert_eq!(&raw[7..10], b"100");

        let raw = client.send("COUNT", Some("5")).unwrap();
        assert_eq!(raw[4], Operation::Write.flag());
        assert_eq!(&raw[7..8], b"5");

        assert!(client.send("$MISSING", None).unwrap_err().is_not_found());
    }

    #[test]
    fn large_value_survives_small_buffer() {
        let value = "V".repeat(5000);
        let server = ControllerEmulator::bind("127.0.0.1:0")
            .unwrap()
            .with_variable("$BIG", &value)
            .unwrap()
            .spawn()
            .unwrap();
        let config = ClientConfig {
            receive_buffer_size: 256,
            ..ClientConfig::default()
        };
        let mut client =
            connect_with_config(&server.local_addr().to_string(), config).unwrap();

        assert_eq!(client.read("$BIG").unwrap(), value);
    }

    #[test]
    fn connection_stays_in_step_after_buffer_sized_value() {
        // 7 + 1017 fills the default receive buffer; the trailer follows.
        let value = "B".repeat(1017);
        let server = ControllerEmulator::bind("127.0.0.1:0")
            .and_then(|e| e.with_variable("$BIG", &value))
            .and_then(|e| e.with_variable("COUNT", "7"))
            .unwrap()
            .spawn()
            .unwrap();
        let mut client = connect(&server.local_addr().to_string()).unwrap();

        assert_eq!(client.read("$BIG").unwrap(), value);
        assert_eq!(client.read("COUNT").unwrap(), "7");
        assert_eq!(client.read("$BIG").unwrap(), value);
    }

    #[test]
    fn connect_to_closed_port_fails() {
        let addr = {
            let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
            listener.local_addr().to_string()
        };
        let err = connect(&addr).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Connect { .. })
        ));
    }

    #[test]
    fn read_timeout_surfaces_as_transport_error() {
        // A listener that accepts but never answers.
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();
        let silent = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_millis(300));
            drop(stream);
        });

        let mut config = ClientConfig::default();
        config.transport.read_timeout = Some(Duration::from_millis(50));
        let mut client = connect_with_config(&addr, config).unwrap();

        let err = client.read("COUNT").unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Io(_))));

        silent.join().unwrap();
    }

    #[test]
    fn peer_addr_matches_emulator() {
        let server = emulator();
        let client = connect(&server.local_addr().to_string()).unwrap();
        assert_eq!(client.peer_addr(), Some(server.local_addr()));
    }
}
