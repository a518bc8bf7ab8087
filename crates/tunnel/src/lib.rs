//! Tunnels into local and remote execution environments.
//!
//! This crate provides transport-agnostic connection primitives:
//! * [`EelTunnelsApi`]: opens outbound connections on behalf of an environment
//! * [`LocalTunnels`]: the same-machine implementation over OS sockets
//! * [`SocketAdapter`]: relays a socket into a pair of byte channels
//! * [`Connection`]: an established duplex stream with socket tuning knobs

pub mod adapter;
pub mod address;
pub mod api;
pub mod config;
pub mod connection;
pub mod error;
pub mod local;
pub mod options;
mod scope;

pub use adapter::{AdapterOptions, ChannelPair, ConnectionState, SocketAdapter};
pub use address::HostAddress;
pub use api::EelTunnelsApi;
pub use config::TunnelConfig;
pub use connection::{Connection, ConnectionHandle};
pub use error::{AddressParseError, ConfigError, EelConnectionError};
pub use local::LocalTunnels;
pub use options::SocketControl;
