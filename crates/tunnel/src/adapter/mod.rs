//! Full-duplex relay between a socket and two logical byte channels.
//!
//! The adapter runs two pumps in one [`PumpScope`]:
//! * the send pump drains the send channel into the socket, in enqueue order
//! * the receive pump reads the socket in fixed-size chunks and forwards each
//!   chunk to the receive channel, waiting for capacity when the consumer lags
//!
//! An I/O error in either pump tears the whole connection down: the abort
//! hook runs, the scope is cancelled and the sibling pump stops. Consumers
//! observe closed channels; the cause is published on [`ConnectionState`].

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::scope::PumpScope;

/// Default maximum size of a forwarded chunk.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

const PUMP_COUNT: usize = 2;

/// Hook run once when a pump fails, before the scope is cancelled.
pub type AbortHook = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle of an adapted socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
	/// Both pumps may still move bytes.
	Open,
	/// Closed by the owner, or both directions ended cleanly.
	Closed,
	/// Torn down after an I/O error; carries its description.
	Failed(String),
}

/// Sizing parameters for an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterOptions {
	/// Maximum number of bytes forwarded per received chunk.
	pub read_chunk_size: usize,
	/// Capacity of each logical channel, in chunks.
	pub channel_capacity: usize,
}

impl Default for AdapterOptions {
	fn default() -> Self {
		Self {
			read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
			channel_capacity: 64,
		}
	}
}

/// The caller's ends of the two logical channels.
#[derive(Debug)]
pub struct ChannelPair {
	/// Bytes queued here are written to the socket.
	pub send: mpsc::Sender<Bytes>,
	/// Bytes read from the socket arrive here.
	pub receive: mpsc::Receiver<Bytes>,
}

/// Owner of the pumps relaying one socket.
pub struct SocketAdapter {
	scope: PumpScope,
	lifecycle: Arc<Lifecycle>,
}

impl SocketAdapter {
	/// Splits `stream` and starts both pumps on the current runtime.
	///
	/// `abort` runs when a pump fails and when the adapter is closed; for OS
	/// sockets it shuts both directions down so blocked peers wake up.
	pub fn spawn<S>(stream: S, options: AdapterOptions, abort: Option<AbortHook>) -> (Self, ChannelPair)
	where
		S: AsyncRead + AsyncWrite + Send + 'static,
	{
		let (reader, writer) = tokio::io::split(stream);
		let (send_tx, send_rx) = mpsc::channel(options.channel_capacity.max(1));
		let (receive_tx, receive_rx) = mpsc::channel(options.channel_capacity.max(1));

		let mut scope = PumpScope::new();
		let lifecycle = Arc::new(Lifecycle::new(scope.token(), abort));

		scope.spawn("send", send_pump(writer, send_rx, Arc::clone(&lifecycle)));
		scope.spawn(
			"receive",
			receive_pump(reader, receive_tx, options.read_chunk_size.max(1), Arc::clone(&lifecycle)),
		);

		let channels = ChannelPair {
			send: send_tx,
			receive: receive_rx,
		};
		(Self { scope, lifecycle }, channels)
	}

	/// Watches the lifecycle of the adapted socket.
	pub fn state(&self) -> watch::Receiver<ConnectionState> {
		self.lifecycle.state.subscribe()
	}

	/// Returns true once the adapter is closed or failed.
	pub fn is_closed(&self) -> bool {
		self.scope.is_cancelled() || *self.lifecycle.state.borrow() != ConnectionState::Open
	}

	/// Stops both pumps, shuts the socket down and waits for the pumps to
	/// release it.
	pub async fn close(&mut self) {
		self.lifecycle.transition(ConnectionState::Closed);
		self.scope.cancel();
		self.lifecycle.run_abort();
		self.scope.join().await;
		tracing::debug!("tunnel.adapter.closed");
	}
}

impl std::fmt::Debug for SocketAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SocketAdapter")
			.field("state", &*self.lifecycle.state.borrow())
			.finish_non_exhaustive()
	}
}

/// State shared by the pumps of one adapter.
struct Lifecycle {
	state: watch::Sender<ConnectionState>,
	cancel: CancellationToken,
	abort: Option<AbortHook>,
	live_pumps: AtomicUsize,
}

impl Lifecycle {
	fn new(cancel: CancellationToken, abort: Option<AbortHook>) -> Self {
		Self {
			state: watch::Sender::new(ConnectionState::Open),
			cancel,
			abort,
			live_pumps: AtomicUsize::new(PUMP_COUNT),
		}
	}

	/// Leaves `Open` once; later transitions are ignored.
	fn transition(&self, next: ConnectionState) -> bool {
		self.state.send_if_modified(|state| {
			if *state == ConnectionState::Open {
				*state = next;
				true
			} else {
				false
			}
		})
	}

	fn run_abort(&self) {
		if let Some(abort) = &self.abort {
			abort();
		}
	}

	/// Tears everything down after an I/O error in `pump`.
	fn fail(&self, pump: &'static str, error: &io::Error) {
		if self.transition(ConnectionState::Failed(error.to_string())) {
			tracing::warn!(pump, error = %error, "tunnel pump failed; closing connection");
		}
		self.run_abort();
		self.cancel.cancel();
	}

	/// Records a clean pump exit; the last one marks the connection closed.
	fn finish(&self, pump: &'static str) {
		tracing::trace!(pump, "tunnel.pump.drained");
		if self.live_pumps.fetch_sub(1, Ordering::AcqRel) == 1 {
			self.transition(ConnectionState::Closed);
		}
	}
}

async fn send_pump<W>(mut writer: W, mut outbound: mpsc::Receiver<Bytes>, lifecycle: Arc<Lifecycle>)
where
	W: AsyncWrite + Unpin,
{
	while let Some(chunk) = outbound.recv().await {
		let written = async {
			writer.write_all(&chunk).await?;
			writer.flush().await
		};
		if let Err(error) = written.await {
			lifecycle.fail("send", &error);
			return;
		}
	}

	// Every sender is gone: half-close so the peer sees EOF.
	if let Err(error) = writer.shutdown().await {
		tracing::debug!(error = %error, "tunnel.send.shutdown_failed");
	}
	lifecycle.finish("send");
}

async fn receive_pump<R>(mut reader: R, inbound: mpsc::Sender<Bytes>, chunk_size: usize, lifecycle: Arc<Lifecycle>)
where
	R: AsyncRead + Unpin,
{
	let mut buf = vec![0u8; chunk_size];
	loop {
		let read = match reader.read(&mut buf).await {
			Ok(0) => break,
			Ok(read) => read,
			Err(error) => {
				lifecycle.fail("receive", &error);
				return;
			}
		};
		if inbound.send(Bytes::copy_from_slice(&buf[..read])).await.is_err() {
			tracing::trace!("tunnel.receive.consumer_gone");
			break;
		}
	}

	// Dropping `inbound` closes the receive channel.
	lifecycle.finish("receive");
}

#[cfg(test)]
mod tests;
