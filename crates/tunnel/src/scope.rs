use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Shared lifetime for the pump tasks of one connection.
///
/// Cancelling the scope stops every task spawned into it at its next
/// suspension point. Dropping the scope cancels it and aborts the tasks.
#[derive(Debug)]
pub(crate) struct PumpScope {
	cancel: CancellationToken,
	tasks: JoinSet<()>,
}

impl PumpScope {
	/// Creates an empty scope.
	pub fn new() -> Self {
		Self {
			cancel: CancellationToken::new(),
			tasks: JoinSet::new(),
		}
	}

	/// Token that cancels this scope when triggered.
	pub fn token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Spawns a task that ends when `fut` completes or the scope is cancelled,
	/// whichever happens first.
	pub fn spawn<F>(&mut self, pump: &'static str, fut: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		tracing::trace!(pump, pending = self.tasks.len(), "tunnel.pump.spawn");
		let cancel = self.cancel.clone();
		self.tasks.spawn(async move {
			tokio::select! {
				biased;
				() = cancel.cancelled() => tracing::trace!(pump, "tunnel.pump.cancelled"),
				() = fut => tracing::trace!(pump, "tunnel.pump.finished"),
			}
		});
	}

	/// Requests cancellation of every task in the scope.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Returns true once cancellation has been requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Waits until every task has ended.
	pub async fn join(&mut self) {
		while let Some(result) = self.tasks.join_next().await {
			if let Err(error) = result {
				if error.is_panic() {
					tracing::error!(error = %error, "tunnel.pump.panicked");
				}
			}
		}
	}
}

impl Drop for PumpScope {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}
