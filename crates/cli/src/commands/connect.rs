//! `eel connect`: relays stdin and stdout through a local tunnel.

use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, bail};
use bytes::Bytes;
use eel_tunnel::{ConnectionState, EelTunnelsApi, HostAddress, LocalTunnels, TunnelConfig};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::ConnectArgs;

const INPUT_CHUNK: usize = 8 * 1024;

/// Connects, relays until the remote side closes and reports failures.
pub async fn run(args: &ConnectArgs) -> anyhow::Result<()> {
	let config = match &args.config {
		Some(path) => TunnelConfig::load(path)?,
		None => TunnelConfig::discover()?,
	};
	let address = target(args, &config)?;

	let tunnels = LocalTunnels::new(config);
	let connection = tunnels
		.connect_to_remote_port(&address)
		.await
		.with_context(|| format!("cannot connect to {address}"))?;
	info!(local = %connection.local_addr(), remote = %connection.remote_addr(), "connected");

	let (send, receive, mut handle) = connection.into_parts();
	let downloaded = relay(std::io::stdin(), send, receive, tokio::io::stdout()).await;

	let state = handle.state().borrow().clone();
	handle.close().await;
	if let ConnectionState::Failed(reason) = state {
		bail!("connection to {address} failed: {reason}");
	}
	downloaded.context("cannot write to stdout")
}

/// Address to connect to; the flag wins over the configured timeout.
fn target(args: &ConnectArgs, config: &TunnelConfig) -> anyhow::Result<HostAddress> {
	let address: HostAddress = args.address.parse()?;
	let timeout = args.timeout_ms.map_or_else(|| config.connect_timeout(), Duration::from_millis);
	Ok(address.with_connect_timeout(timeout))
}

/// Relays `input` into `send` and `receive` into `output`.
///
/// Returns once the receive side ends. The input is read on a detached
/// thread, so a read still blocked on an open terminal or pipe does not hold
/// up the caller or process exit.
async fn relay<R, W>(input: R, send: mpsc::Sender<Bytes>, receive: mpsc::Receiver<Bytes>, output: W) -> io::Result<()>
where
	R: Read + Send + 'static,
	W: AsyncWrite + Unpin,
{
	spawn_upload(input, send)?;
	download(receive, output).await
}

/// Forwards `input` into the connection until EOF on its own thread.
/// Dropping `send` when the thread ends half-closes the socket.
fn spawn_upload<R>(mut input: R, send: mpsc::Sender<Bytes>) -> io::Result<()>
where
	R: Read + Send + 'static,
{
	// Detached: the handle is dropped and the thread is never joined.
	std::thread::Builder::new().name("eel-upload".to_string()).spawn(move || {
		let mut buf = vec![0u8; INPUT_CHUNK];
		loop {
			let read = match input.read(&mut buf) {
				Ok(0) => break,
				Ok(read) => read,
				Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
				Err(error) => {
					tracing::warn!(error = %error, "reading input failed; closing the write side");
					break;
				}
			};
			if send.blocking_send(Bytes::copy_from_slice(&buf[..read])).is_err() {
				break;
			}
		}
		tracing::debug!("upload finished");
	})?;
	Ok(())
}

/// Writes every received chunk to `output` until the connection closes.
async fn download<W>(mut receive: mpsc::Receiver<Bytes>, mut output: W) -> io::Result<()>
where
	W: AsyncWrite + Unpin,
{
	while let Some(chunk) = receive.recv().await {
		output.write_all(&chunk).await?;
		output.flush().await?;
	}
	Ok(())
}
