//! Background expiry sweeper that keeps the trust store bounded.

// crates.io
use tokio::{
	sync::oneshot,
	task::JoinHandle,
	time::{Instant, MissedTickBehavior},
};
// self
use crate::{_prelude::*, cache::TokenCache};

/// Periodic task removing expired entries from a [`TokenCache`]'s store.
#[derive(Debug)]
pub struct Sweeper {
	cache: TokenCache,
	period: std::time::Duration,
}
impl Sweeper {
	/// Creates a sweeper for `cache` ticking every `period`.
	pub fn new(cache: TokenCache, period: std::time::Duration) -> Self {
		Self { cache, period }
	}

	/// Spawns the sweeper on the current tokio runtime.
	///
	/// The first sweep runs one full period after spawning. The task runs until
	/// [`SweeperHandle::stop`] is called or the handle is dropped.
	pub fn spawn(self) -> SweeperHandle {
		let (stop_tx, stop_rx) = oneshot::channel();
		let task = tokio::spawn(self.run(stop_rx));

		SweeperHandle { stop: Some(stop_tx), task }
	}

	async fn run(self, mut stop: oneshot::Receiver<()>) {
		let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);

		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		tracing::debug!(period = ?self.period, "expiry sweeper started");

		loop {
			tokio::select! {
				// Fires on an explicit stop and when the handle is dropped.
				_ = &mut stop => break,
				_ = ticker.tick() => {
					self.cache.sweep();
				},
			}
		}

		tracing::debug!("expiry sweeper stopped");
	}
}

/// Owner handle for a running [`Sweeper`].
#[derive(Debug)]
pub struct SweeperHandle {
	stop: Option<oneshot::Sender<()>>,
	task: JoinHandle<()>,
}
impl SweeperHandle {
	/// Signals the sweeper to stop and waits for the task to finish.
	pub async fn stop(mut self) {
		if let Some(stop) = self.stop.take() {
			let _ = stop.send(());
		}
		if let Err(e) = self.task.await {
			tracing::warn!(error = %e, "expiry sweeper task ended abnormally");
		}
	}

	/// Returns true once the sweeper task has exited.
	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}
}
