//! Socket tuning knobs for established connections.

use std::io;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use rustix::net::sockopt;

/// Pass-through access to the options of a connected TCP socket.
///
/// Holds a duplicate descriptor of the socket the pumps relay, so changes
/// apply to the live connection. Values are validated only by the OS.
#[derive(Debug)]
pub struct SocketControl {
	socket: TcpStream,
}

impl SocketControl {
	pub(crate) const fn new(socket: TcpStream) -> Self {
		Self { socket }
	}

	/// Sets `SO_SNDBUF`.
	pub fn set_send_buffer_size(&self, size: usize) -> io::Result<()> {
		Ok(sockopt::set_socket_send_buffer_size(&self.socket, size)?)
	}

	/// Reads `SO_SNDBUF`.
	pub fn send_buffer_size(&self) -> io::Result<usize> {
		Ok(sockopt::socket_send_buffer_size(&self.socket)?)
	}

	/// Sets `SO_RCVBUF`.
	pub fn set_receive_buffer_size(&self, size: usize) -> io::Result<()> {
		Ok(sockopt::set_socket_recv_buffer_size(&self.socket, size)?)
	}

	/// Reads `SO_RCVBUF`.
	pub fn receive_buffer_size(&self) -> io::Result<usize> {
		Ok(sockopt::socket_recv_buffer_size(&self.socket)?)
	}

	/// Sets `SO_KEEPALIVE`.
	pub fn set_keep_alive(&self, enabled: bool) -> io::Result<()> {
		Ok(sockopt::set_socket_keepalive(&self.socket, enabled)?)
	}

	/// Reads `SO_KEEPALIVE`.
	pub fn keep_alive(&self) -> io::Result<bool> {
		Ok(sockopt::socket_keepalive(&self.socket)?)
	}

	/// Sets `SO_REUSEADDR`.
	pub fn set_reuse_address(&self, enabled: bool) -> io::Result<()> {
		Ok(sockopt::set_socket_reuseaddr(&self.socket, enabled)?)
	}

	/// Reads `SO_REUSEADDR`.
	pub fn reuse_address(&self) -> io::Result<bool> {
		Ok(sockopt::socket_reuseaddr(&self.socket)?)
	}

	/// Sets `SO_LINGER`.
	///
	/// A zero duration disables lingering. A positive duration enables it
	/// for that many whole seconds; sub-second precision is truncated.
	pub fn set_linger(&self, linger: Duration) -> io::Result<()> {
		let value = (!linger.is_zero()).then(|| Duration::from_secs(linger.as_secs()));
		Ok(sockopt::set_socket_linger(&self.socket, value)?)
	}

	/// Reads `SO_LINGER`; `None` when lingering is disabled.
	pub fn linger(&self) -> io::Result<Option<Duration>> {
		Ok(sockopt::socket_linger(&self.socket)?)
	}

	/// Sets `TCP_NODELAY`.
	pub fn set_no_delay(&self, enabled: bool) -> io::Result<()> {
		self.socket.set_nodelay(enabled)
	}

	/// Reads `TCP_NODELAY`.
	pub fn no_delay(&self) -> io::Result<bool> {
		self.socket.nodelay()
	}

	/// Shuts both directions down, waking any pump blocked on the socket.
	pub(crate) fn shutdown(&self) {
		match self.socket.shutdown(Shutdown::Both) {
			Ok(()) => tracing::trace!("tunnel.socket.shutdown"),
			// Already disconnected by the peer.
			Err(error) if error.kind() == io::ErrorKind::NotConnected => {}
			Err(error) => tracing::debug!(error = %error, "tunnel.socket.shutdown_failed"),
		}
	}
}
