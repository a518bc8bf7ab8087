use std::pin::Pin;
use std::task::{Context, Poll};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadBuf};

use super::*;

fn adapter(chunk: usize) -> (SocketAdapter, ChannelPair, DuplexStream) {
	let (local, peer) = tokio::io::duplex(64 * 1024);
	let options = AdapterOptions {
		read_chunk_size: chunk,
		channel_capacity: 4,
	};
	let (adapter, channels) = SocketAdapter::spawn(local, options, None);
	(adapter, channels, peer)
}

async fn collect(receive: &mut mpsc::Receiver<Bytes>) -> Vec<Bytes> {
	let mut chunks = Vec::new();
	while let Some(chunk) = receive.recv().await {
		chunks.push(chunk);
	}
	chunks
}

#[tokio::test]
async fn received_bytes_keep_order_and_chunk_bound() {
	let (_adapter, mut channels, mut peer) = adapter(DEFAULT_READ_CHUNK_SIZE);
	let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();

	let writer = tokio::spawn(async move {
		peer.write_all(&payload).await.unwrap();
		peer.shutdown().await.unwrap();
		(payload, peer)
	});

	let chunks = collect(&mut channels.receive).await;
	let (payload, _peer) = writer.await.unwrap();
	assert!(chunks.iter().all(|chunk| !chunk.is_empty() && chunk.len() <= DEFAULT_READ_CHUNK_SIZE));
	assert_eq!(chunks.concat(), payload);
}

#[tokio::test]
async fn small_chunk_size_splits_reads() {
	let (_adapter, mut channels, mut peer) = adapter(3);
	peer.write_all(b"abcdefgh").await.unwrap();
	peer.shutdown().await.unwrap();
	let chunks = collect(&mut channels.receive).await;
	assert!(chunks.iter().all(|chunk| chunk.len() <= 3));
	assert_eq!(chunks.concat(), b"abcdefgh");
}

#[tokio::test]
async fn sent_bytes_arrive_in_enqueue_order() {
	let (_adapter, channels, mut peer) = adapter(DEFAULT_READ_CHUNK_SIZE);
	let ChannelPair { send, receive: _receive } = channels;
	for part in ["one ", "two ", "three"] {
		send.send(Bytes::from_static(part.as_bytes())).await.unwrap();
	}
	drop(send);

	let mut received = Vec::new();
	peer.read_to_end(&mut received).await.unwrap();
	assert_eq!(received, b"one two three");
}

#[tokio::test]
async fn both_directions_ending_marks_closed() {
	let (adapter, channels, mut peer) = adapter(DEFAULT_READ_CHUNK_SIZE);
	let mut state = adapter.state();
	let ChannelPair { send, mut receive } = channels;
	drop(send);
	peer.shutdown().await.unwrap();
	assert!(receive.recv().await.is_none());

	state.wait_for(|state| *state == ConnectionState::Closed).await.unwrap();
	assert!(adapter.is_closed());
}

#[tokio::test]
async fn close_stops_pumps_and_releases_stream() {
	let (mut adapter, mut channels, mut peer) = adapter(DEFAULT_READ_CHUNK_SIZE);
	adapter.close().await;

	assert_eq!(*adapter.state().borrow(), ConnectionState::Closed);
	assert!(channels.receive.recv().await.is_none());
	assert!(channels.send.send(Bytes::from_static(b"late")).await.is_err());
	let mut rest = Vec::new();
	peer.read_to_end(&mut rest).await.unwrap();
	assert!(rest.is_empty());
}

/// Stream whose reads fail and whose writes never complete.
struct BrokenStream;

impl AsyncRead for BrokenStream {
	fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
		Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")))
	}
}

impl AsyncWrite for BrokenStream {
	fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
		Poll::Pending
	}

	fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
		Poll::Ready(Ok(()))
	}

	fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
		Poll::Ready(Ok(()))
	}
}

#[tokio::test]
async fn io_error_tears_down_both_pumps() {
	let aborts = Arc::new(AtomicUsize::new(0));
	let hook: AbortHook = {
		let aborts = Arc::clone(&aborts);
		Arc::new(move || {
			aborts.fetch_add(1, Ordering::SeqCst);
		})
	};
	let (adapter, mut channels) = SocketAdapter::spawn(BrokenStream, AdapterOptions::default(), Some(hook));
	let mut state = adapter.state();

	let failed = state.wait_for(|state| matches!(state, ConnectionState::Failed(_))).await.unwrap().clone();
	assert_eq!(failed, ConnectionState::Failed("reset by peer".to_string()));

	// The receive side observes closure, not the cause.
	assert!(channels.receive.recv().await.is_none());
	// The send pump was cancelled along with the receive pump.
	channels.send.closed().await;
	assert!(adapter.is_closed());
	assert_eq!(aborts.load(Ordering::SeqCst), 1);
}

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
	tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(fut)
}

/// Bytes the peer writes, as seen on the receive channel.
async fn receive_through(payload: Vec<u8>, chunk: usize) -> Vec<Bytes> {
	let (_adapter, mut channels, mut peer) = adapter(chunk);
	let writer = tokio::spawn(async move {
		peer.write_all(&payload).await.unwrap();
		peer.shutdown().await.unwrap();
		peer
	});
	let chunks = collect(&mut channels.receive).await;
	let _peer = writer.await.unwrap();
	chunks
}

/// Bytes queued on the send channel in `pieces`, as read by the peer.
async fn send_through(pieces: Vec<Vec<u8>>) -> Vec<u8> {
	let (_adapter, channels, mut peer) = adapter(DEFAULT_READ_CHUNK_SIZE);
	let ChannelPair { send, receive: _receive } = channels;
	let reader = tokio::spawn(async move {
		let mut received = Vec::new();
		peer.read_to_end(&mut received).await.unwrap();
		received
	});
	for piece in pieces {
		send.send(Bytes::from(piece)).await.unwrap();
	}
	drop(send);
	reader.await.unwrap()
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn receive_preserves_bytes_within_chunk_bound(
		payload in prop::collection::vec(any::<u8>(), 0..20_000),
		chunk in 1usize..6_000,
	) {
		let chunks = block_on(receive_through(payload.clone(), chunk));
		prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= chunk));
		prop_assert_eq!(chunks.concat(), payload);
	}

	#[test]
	fn send_preserves_enqueue_order(pieces in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..3_000), 0..16)) {
		let expected = pieces.concat();
		prop_assert_eq!(block_on(send_through(pieces)), expected);
	}
}
