use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::stream::StreamTransport;

/// Port the controller-side variable server listens on by default.
pub const DEFAULT_PORT: u16 = 7000;

/// TCP transport.
///
/// Dials controllers with [`TcpTransport::connect`]. The bound form
/// (`bind`/`accept`) serves the controller side and is used by emulators.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Connect to a controller at `addr` (e.g. `"10.0.0.5:7000"`).
    ///
    /// Every resolved address is tried in order; the last failure is
    /// reported if none accepts the connection.
    pub fn connect(addr: &str, config: &TransportConfig) -> Result<StreamTransport<TcpStream>> {
        let candidates = resolve(addr)?;

        let mut last_err = None;
        for candidate in candidates {
            let attempt = match config.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    apply_config(&stream, config).map_err(|source| TransportError::Connect {
                        addr: addr.to_string(),
                        source,
                    })?;
                    info!(%candidate, "connected to controller");
                    return Ok(StreamTransport::new(stream));
                }
                Err(err) => {
                    debug!(%candidate, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(match last_err {
            Some(source) => TransportError::Connect {
                addr: addr.to_string(),
                source,
            },
            None => TransportError::Resolve(addr.to_string()),
        })
    }

    /// Bind and listen on `addr`. Use port 0 to let the OS pick one.
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|source| TransportError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        info!(%local_addr, "listening for openshowvar clients");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok((stream, peer))
    }

    /// Switch the listener between blocking and non-blocking accepts.
    ///
    /// In non-blocking mode `accept` fails with an `Accept` error of kind
    /// `WouldBlock` when no client is pending.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        self.listener.set_nonblocking(nonblocking)?;
        Ok(())
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

/// Apply timeouts and socket options from `config` to a connected stream.
pub fn apply_config(stream: &TcpStream, config: &TransportConfig) -> std::io::Result<()> {
    stream.set_read_timeout(config.read_timeout)?;
    stream.set_write_timeout(config.write_timeout)?;
    stream.set_nodelay(config.nodelay)?;
    Ok(())
}

fn resolve(addr: &str) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|_| TransportError::Resolve(addr.to_string()))?
        .collect();
    if addrs.is_empty() {
        return Err(TransportError::Resolve(addr.to_string()));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::time::Duration;

    use super::*;
    use crate::traits::Transport;

    #[test]
    fn test_bind_accept_connect() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let handle = std::thread::spawn(move || {
            let (mut server, _peer) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            server.read_exact(&mut buf).unwrap();
            server.write_all(&buf).unwrap();
        });

        let mut client = TcpTransport::connect(&addr, &TransportConfig::default()).unwrap();
        client.send(b"hello").unwrap();
        let reply = client.receive(1024).unwrap();
        assert_eq!(reply.as_ref(), b"hello");

        handle.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to obtain a port with nothing listening.
        let addr = {
            let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
            listener.local_addr().to_string()
        };

        let err = TcpTransport::connect(&addr, &TransportConfig::default()).unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
        assert!(err.io_source().is_some());
    }

    #[test]
    fn test_unresolvable_address() {
        let err = TcpTransport::connect("not an address", &TransportConfig::default()).unwrap_err();
        assert!(matches!(err, TransportError::Resolve(_)));
    }

    #[test]
    fn test_bind_conflict() {
        let first = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = first.local_addr().to_string();

        let err = TcpTransport::bind(&addr).unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
    }

    #[test]
    fn test_read_timeout_applied() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let config = TransportConfig {
            read_timeout: Some(Duration::from_millis(50)),
            ..TransportConfig::default()
        };
        let mut client = TcpTransport::connect(&addr, &config).unwrap();
        let (_server, _peer) = listener.accept().unwrap();

        let err = client.receive(16).unwrap_err();
        let kind = err.io_source().map(|e| e.kind());
        assert!(matches!(
            kind,
            Some(std::io::ErrorKind::WouldBlock) | Some(std::io::ErrorKind::TimedOut)
        ));
    }

    #[test]
    fn test_nonblocking_accept_would_block() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();

        let err = listener.accept().unwrap_err();
        assert!(matches!(
            err,
            TransportError::Accept(ref e) if e.kind() == std::io::ErrorKind::WouldBlock
        ));
    }

    #[test]
    fn test_transport_name() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        assert_eq!(listener.transport_name(), "tcp");
    }
}
