//! Transport-agnostic tunnel operations.

use async_trait::async_trait;
use eel_path::{AbsolutePath, EelDescriptor};

use crate::address::HostAddress;
use crate::connection::Connection;
use crate::error::EelConnectionError;

/// Network access on behalf of an execution environment.
///
/// Only outbound connections are implemented. Accepting inbound connections
/// and listening on unix sockets default to
/// [`EelConnectionError::Unsupported`]; implementations do not provide them yet.
#[async_trait]
pub trait EelTunnelsApi: Send + Sync {
	/// Environment the tunnels reach into.
	fn descriptor(&self) -> &EelDescriptor;

	/// Connects to `address` as seen from the environment.
	///
	/// The attempt is bounded by the address's connect timeout and never
	/// retried.
	async fn connect_to_remote_port(&self, address: &HostAddress) -> Result<Connection, EelConnectionError>;

	/// Accepts one inbound connection on `address` inside the environment.
	async fn accept_on_remote_port(&self, address: &HostAddress) -> Result<Connection, EelConnectionError> {
		tracing::warn!(%address, "tunnel.accept.unsupported");
		Err(EelConnectionError::Unsupported {
			operation: "accept_on_remote_port",
		})
	}

	/// Listens on a unix socket at `path` inside the environment.
	async fn listen_on_unix_socket(&self, path: &AbsolutePath) -> Result<Connection, EelConnectionError> {
		tracing::warn!(path = %path, "tunnel.listen_unix.unsupported");
		Err(EelConnectionError::Unsupported {
			operation: "listen_on_unix_socket",
		})
	}
}
