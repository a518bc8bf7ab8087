//! Tunnels into the machine this process runs on.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use eel_path::EelDescriptor;
use tokio::net::{TcpSocket, TcpStream};

use crate::address::HostAddress;
use crate::api::EelTunnelsApi;
use crate::config::TunnelConfig;
use crate::connection::Connection;
use crate::error::EelConnectionError;

/// [`EelTunnelsApi`] backed by the host's own sockets.
///
/// Serves POSIX and Windows hosts alike; the descriptor records which one.
#[derive(Debug, Clone)]
pub struct LocalTunnels {
	descriptor: EelDescriptor,
	config: TunnelConfig,
}

impl Default for LocalTunnels {
	fn default() -> Self {
		Self::new(TunnelConfig::default())
	}
}

impl LocalTunnels {
	/// Creates local tunnels for the host environment.
	pub fn new(config: TunnelConfig) -> Self {
		Self {
			descriptor: EelDescriptor::local(),
			config,
		}
	}

	/// Configuration used for new connections.
	pub fn config(&self) -> &TunnelConfig {
		&self.config
	}

	/// Address for `host:port` using the configured connect timeout.
	pub fn address(&self, hostname: impl Into<String>, port: u16) -> HostAddress {
		HostAddress::builder(port)
			.hostname(hostname)
			.connect_timeout(self.config.connect_timeout())
			.build()
	}
}

#[async_trait]
impl EelTunnelsApi for LocalTunnels {
	fn descriptor(&self) -> &EelDescriptor {
		&self.descriptor
	}

	async fn connect_to_remote_port(&self, address: &HostAddress) -> Result<Connection, EelConnectionError> {
		tracing::debug!(%address, timeout = ?address.connect_timeout(), "tunnel.connect.start");
		let stream = match connect_within(address, connect_any(address)).await {
			Ok(stream) => stream,
			Err(error) => {
				tracing::debug!(%address, error = %error, "tunnel.connect.failed");
				return Err(error);
			}
		};
		if self.config.no_delay {
			stream.set_nodelay(true)?;
		}
		Ok(Connection::from_tcp(stream, self.config.adapter_options())?)
	}
}

/// Races `attempt` against the address's connect timeout.
///
/// When the timer wins, the attempt is dropped, which closes the socket it
/// was connecting.
async fn connect_within<F, T>(address: &HostAddress, attempt: F) -> Result<T, EelConnectionError>
where
	F: Future<Output = Result<T, EelConnectionError>>,
{
	let timeout: Duration = address.connect_timeout();
	match tokio::time::timeout(timeout, attempt).await {
		Ok(result) => result,
		Err(_elapsed) => Err(EelConnectionError::Timeout {
			address: address.to_string(),
			timeout,
		}),
	}
}

/// Tries every resolved address in turn and returns the first connection.
async fn connect_any(address: &HostAddress) -> Result<TcpStream, EelConnectionError> {
	let resolved: Vec<SocketAddr> = tokio::net::lookup_host((address.hostname(), address.port()))
		.await
		.map_err(|error| EelConnectionError::ResolveFailure(format!("{}: {error}", address.hostname())))?
		.collect();

	let mut last_error = None;
	for addr in resolved {
		match connect_one(addr).await {
			Ok(stream) => return Ok(stream),
			Err(error) => {
				tracing::trace!(%addr, error = %error, "tunnel.connect.attempt_failed");
				last_error = Some(error);
			}
		}
	}
	Err(match last_error {
		Some(error) => error.into(),
		None => EelConnectionError::ResolveFailure(format!("{}: no addresses", address.hostname())),
	})
}

async fn connect_one(addr: SocketAddr) -> io::Result<TcpStream> {
	let socket = if addr.is_ipv4() { TcpSocket::new_v4()? } else { TcpSocket::new_v6()? };
	socket.connect(addr).await
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use bytes::Bytes;
	use eel_path::EelOs;
	use pretty_assertions::assert_eq;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpListener;

	use super::*;
	use crate::adapter::ConnectionState;

	async fn echo_server() -> SocketAddr {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			let (mut socket, _) = listener.accept().await.unwrap();
			let mut buf = vec![0u8; 1024];
			loop {
				match socket.read(&mut buf).await {
					Ok(0) | Err(_) => break,
					Ok(n) => socket.write_all(&buf[..n]).await.unwrap(),
				}
			}
		});
		addr
	}

	#[tokio::test]
	async fn connects_and_relays_both_ways() {
		let server = echo_server().await;
		let tunnels = LocalTunnels::default();
		let address = tunnels.address("127.0.0.1", server.port());

		let mut connection = tunnels.connect_to_remote_port(&address).await.unwrap();
		assert_eq!(connection.remote_addr(), server);
		assert_eq!(tunnels.descriptor().os(), EelOs::current());

		connection.send_channel().send(Bytes::from_static(b"ping")).await.unwrap();
		let mut echoed = Vec::new();
		while echoed.len() < 4 {
			let chunk = connection.receive_channel().recv().await.unwrap();
			echoed.extend_from_slice(&chunk);
		}
		assert_eq!(echoed, b"ping");

		connection.close().await;
		assert_eq!(*connection.state().borrow(), ConnectionState::Closed);
		assert!(connection.receive_channel().recv().await.is_none());
	}

	#[tokio::test]
	async fn half_close_reaches_the_peer() {
		let server = echo_server().await;
		let tunnels = LocalTunnels::default();
		let connection = tunnels.connect_to_remote_port(&tunnels.address("127.0.0.1", server.port())).await.unwrap();

		let (send, mut receive, handle) = connection.into_parts();
		send.send(Bytes::from_static(b"bye")).await.unwrap();
		drop(send);

		let mut echoed = Vec::new();
		while let Some(chunk) = receive.recv().await {
			echoed.extend_from_slice(&chunk);
		}
		assert_eq!(echoed, b"bye");
		handle.state().wait_for(|state| *state == ConnectionState::Closed).await.unwrap();
	}

	#[tokio::test]
	async fn socket_options_pass_through() {
		let server = echo_server().await;
		let tunnels = LocalTunnels::new(TunnelConfig {
			no_delay: true,
			..TunnelConfig::default()
		});
		let connection = tunnels.connect_to_remote_port(&tunnels.address("127.0.0.1", server.port())).await.unwrap();
		let options = connection.options();

		assert!(options.no_delay().unwrap());
		options.set_no_delay(false).unwrap();
		assert!(!options.no_delay().unwrap());

		options.set_keep_alive(true).unwrap();
		assert!(options.keep_alive().unwrap());
		options.set_reuse_address(true).unwrap();
		assert!(options.reuse_address().unwrap());

		options.set_send_buffer_size(64 * 1024).unwrap();
		assert!(options.send_buffer_size().unwrap() > 0);
		options.set_receive_buffer_size(64 * 1024).unwrap();
		assert!(options.receive_buffer_size().unwrap() > 0);

		options.set_linger(Duration::from_millis(2_700)).unwrap();
		assert_eq!(options.linger().unwrap(), Some(Duration::from_secs(2)));
		options.set_linger(Duration::ZERO).unwrap();
		assert_eq!(options.linger().unwrap(), None);
	}

	#[tokio::test]
	async fn options_stay_readable_after_close() {
		let server = echo_server().await;
		let tunnels = LocalTunnels::new(TunnelConfig {
			no_delay: true,
			..TunnelConfig::default()
		});
		let mut connection = tunnels.connect_to_remote_port(&tunnels.address("127.0.0.1", server.port())).await.unwrap();

		connection.close().await;
		assert_eq!(*connection.state().borrow(), ConnectionState::Closed);
		assert!(connection.options().no_delay().unwrap());
		assert!(connection.options().receive_buffer_size().unwrap() > 0);
	}

	#[tokio::test]
	async fn refused_connection_is_a_failure_value() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let port = listener.local_addr().unwrap().port();
		drop(listener);

		let tunnels = LocalTunnels::default();
		let result = tunnels.connect_to_remote_port(&tunnels.address("127.0.0.1", port)).await;
		assert!(matches!(
			result,
			Err(EelConnectionError::ConnectionRefused(_) | EelConnectionError::UnknownFailure(_))
		));
	}

	#[tokio::test]
	async fn unresolvable_host_is_a_failure_value() {
		let tunnels = LocalTunnels::default();
		let result = tunnels.connect_to_remote_port(&tunnels.address("host.invalid", 80)).await;
		assert!(result.is_err());
	}

	/// Stands in for a socket whose handshake never completes.
	struct SocketGuard(Arc<AtomicUsize>);

	impl Drop for SocketGuard {
		fn drop(&mut self) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[tokio::test(start_paused = true)]
	async fn timeout_closes_the_pending_socket_once() {
		let closed = Arc::new(AtomicUsize::new(0));
		let guard = SocketGuard(Arc::clone(&closed));
		let attempt = async move {
			let _socket = guard;
			std::future::pending::<Result<(), EelConnectionError>>().await
		};
		let address = HostAddress::builder(9).connect_timeout(Duration::from_millis(250)).build();

		let result = connect_within(&address, attempt).await;
		assert_eq!(
			result,
			Err(EelConnectionError::Timeout {
				address: "localhost:9".to_string(),
				timeout: Duration::from_millis(250),
			})
		);
		assert_eq!(closed.load(Ordering::SeqCst), 1);
	}

	/// Listener that never accepts and whose backlog is already full, so new
	/// handshakes stall instead of completing or being refused.
	fn stalled_listener() -> (TcpListener, Vec<std::net::TcpStream>) {
		let socket = TcpSocket::new_v4().unwrap();
		socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
		let listener = socket.listen(1).unwrap();
		let addr = listener.local_addr().unwrap();

		let mut queued = Vec::new();
		for _ in 0..64 {
			match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
				Ok(stream) => queued.push(stream),
				Err(_) => return (listener, queued),
			}
		}
		panic!("backlog of {addr} never filled");
	}

	#[tokio::test(start_paused = true)]
	async fn stalled_handshake_times_out() {
		let (listener, _queued) = stalled_listener();
		let port = listener.local_addr().unwrap().port();
		let tunnels = LocalTunnels::default();
		let address = HostAddress::builder(port)
			.hostname("127.0.0.1")
			.connect_timeout(Duration::from_millis(250))
			.build();

		let result = tunnels.connect_to_remote_port(&address).await;
		assert_eq!(
			result.map(|_| ()),
			Err(EelConnectionError::Timeout {
				address: format!("127.0.0.1:{port}"),
				timeout: Duration::from_millis(250),
			})
		);
	}

	#[tokio::test]
	async fn acceptor_side_is_unsupported() {
		let tunnels = LocalTunnels::default();
		let accept = tunnels.accept_on_remote_port(&tunnels.address("127.0.0.1", 0)).await;
		assert!(matches!(
			accept,
			Err(EelConnectionError::Unsupported {
				operation: "accept_on_remote_port"
			})
		));
		let path = eel_path::AbsolutePath::from_std_path(&std::env::temp_dir()).unwrap().child("eel.sock").unwrap();
		let listen = tunnels.listen_on_unix_socket(&path).await;
		assert!(matches!(listen, Err(EelConnectionError::Unsupported { .. })));
	}
}
