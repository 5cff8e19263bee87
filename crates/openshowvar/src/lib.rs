//! Read and write robot controller variables over the OpenShowVar protocol.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte-stream transport abstraction and TCP
//! - [`frame`]: Request/response frame codec
//! - [`client`]: Connection management and the controller emulator
//!
//! ```no_run
//! let mut client = openshowvar::client::connect("10.145.173.160:7000")?;
//! let count = client.read("COUNT")?;
//! client.write("COUNT", "1")?;
//! client.disconnect()?;
//! # Ok::<(), openshowvar::client::ClientError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use openshowvar_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use openshowvar_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use openshowvar_client::*;
}
