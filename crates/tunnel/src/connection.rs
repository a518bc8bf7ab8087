//! Established duplex connections.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

use crate::adapter::{AbortHook, AdapterOptions, ChannelPair, ConnectionState, SocketAdapter};
use crate::options::SocketControl;

/// An established duplex byte stream to a remote host and port.
///
/// Owns the socket and the two pumps relaying it. Dropping the connection
/// cancels the pumps.
#[derive(Debug)]
pub struct Connection {
	send: mpsc::Sender<Bytes>,
	receive: mpsc::Receiver<Bytes>,
	handle: ConnectionHandle,
}

/// Lifetime and socket controls of a [`Connection`], detached from its channels.
#[derive(Debug)]
pub struct ConnectionHandle {
	adapter: SocketAdapter,
	control: Arc<SocketControl>,
	local_addr: SocketAddr,
	remote_addr: SocketAddr,
}

impl Connection {
	/// Wraps a connected TCP stream.
	pub(crate) fn from_tcp(stream: TcpStream, options: AdapterOptions) -> io::Result<Self> {
		let local_addr = stream.local_addr()?;
		let remote_addr = stream.peer_addr()?;

		let stream = stream.into_std()?;
		let control = Arc::new(SocketControl::new(stream.try_clone()?));
		let stream = TcpStream::from_std(stream)?;

		let abort: AbortHook = {
			let control = Arc::clone(&control);
			Arc::new(move || control.shutdown())
		};
		let (adapter, ChannelPair { send, receive }) = SocketAdapter::spawn(stream, options, Some(abort));

		tracing::debug!(local = %local_addr, remote = %remote_addr, "tunnel.connection.open");
		Ok(Self {
			send,
			receive,
			handle: ConnectionHandle {
				adapter,
				control,
				local_addr,
				remote_addr,
			},
		})
	}

	/// Channel whose bytes are written to the socket, in order.
	///
	/// The write direction is shut down once this sender and all its clones
	/// are dropped.
	pub fn send_channel(&self) -> &mpsc::Sender<Bytes> {
		&self.send
	}

	/// Channel yielding the bytes read from the socket, in order. Yields
	/// `None` after EOF or teardown.
	pub fn receive_channel(&mut self) -> &mut mpsc::Receiver<Bytes> {
		&mut self.receive
	}

	/// Splits the connection into its channels and its handle.
	pub fn into_parts(self) -> (mpsc::Sender<Bytes>, mpsc::Receiver<Bytes>, ConnectionHandle) {
		(self.send, self.receive, self.handle)
	}

	/// Lifetime and socket controls.
	pub fn handle(&self) -> &ConnectionHandle {
		&self.handle
	}

	/// Socket option setters and getters.
	pub fn options(&self) -> &SocketControl {
		self.handle.options()
	}

	/// Address of the local end.
	pub fn local_addr(&self) -> SocketAddr {
		self.handle.local_addr
	}

	/// Address of the remote end.
	pub fn remote_addr(&self) -> SocketAddr {
		self.handle.remote_addr
	}

	/// Watches whether the connection is open, closed or failed.
	pub fn state(&self) -> watch::Receiver<ConnectionState> {
		self.handle.state()
	}

	/// See [`ConnectionHandle::close`]; the control descriptor is released
	/// when the connection is dropped.
	pub async fn close(&mut self) {
		self.handle.close().await;
	}
}

impl ConnectionHandle {
	/// Socket option setters and getters.
	pub fn options(&self) -> &SocketControl {
		&self.control
	}

	/// Address of the local end.
	pub fn local_addr(&self) -> SocketAddr {
		self.local_addr
	}

	/// Address of the remote end.
	pub fn remote_addr(&self) -> SocketAddr {
		self.remote_addr
	}

	/// Watches whether the connection is open, closed or failed.
	pub fn state(&self) -> watch::Receiver<ConnectionState> {
		self.adapter.state()
	}

	/// Cancels both pumps, shuts both socket directions down and waits until
	/// the pumps release the socket.
	///
	/// The duplicate descriptor behind [`Self::options`] stays open until the
	/// handle is dropped, so options remain readable after close. Setting them
	/// then has no effect on traffic.
	pub async fn close(&mut self) {
		self.adapter.close().await;
		tracing::debug!(remote = %self.remote_addr, "tunnel.connection.closed");
	}
}
