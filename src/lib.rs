//! Bearer-token gate for static asset servers: remote verification, a TTL-bounded trust cache,
//! and a background expiry sweeper behind one axum middleware.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod obs;
pub mod server;
pub mod store;
pub mod sweep;
pub mod verify;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fakes for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		auth::Credential,
		cache::Clock,
		verify::{Verifier, VerifyError, VerifyFuture},
	};

	/// Scripted answer returned by [`CountingVerifier`].
	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub enum Verdict {
		/// Authority accepts the credential.
		Accept,
		/// Authority answers with the given non-200 status.
		Reject(u16),
		/// Call exceeds its timeout.
		Timeout,
	}

	/// In-process verifier that returns a scripted [`Verdict`] and counts its calls.
	#[derive(Debug)]
	pub struct CountingVerifier {
		verdict: Mutex<Verdict>,
		calls: AtomicUsize,
		delay: Option<std::time::Duration>,
	}
	impl CountingVerifier {
		/// Verifier that accepts every credential.
		pub fn accepting() -> Self {
			Self::with_verdict(Verdict::Accept)
		}

		/// Verifier that rejects every credential with `status`.
		pub fn rejecting(status: u16) -> Self {
			Self::with_verdict(Verdict::Reject(status))
		}

		/// Verifier whose calls always time out.
		pub fn timing_out() -> Self {
			Self::with_verdict(Verdict::Timeout)
		}

		/// Verifier returning `verdict`.
		pub fn with_verdict(verdict: Verdict) -> Self {
			Self { verdict: Mutex::new(verdict), calls: AtomicUsize::new(0), delay: None }
		}

		/// Sleeps for `delay` inside every call before answering.
		pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
			self.delay = Some(delay);

			self
		}

		/// Changes the answer for subsequent calls.
		pub fn set_verdict(&self, verdict: Verdict) {
			*self.verdict.lock() = verdict;
		}

		/// Number of verification calls made so far.
		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl Verifier for CountingVerifier {
		fn verify<'a>(&'a self, _credential: &'a Credential) -> VerifyFuture<'a> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);

				if let Some(delay) = self.delay {
					tokio::time::sleep(delay).await;
				}

				let verdict = *self.verdict.lock();

				match verdict {
					Verdict::Accept => Ok(()),
					Verdict::Reject(status) => Err(VerifyError::Rejected { status }),
					Verdict::Timeout => Err(VerifyError::Timeout),
				}
			})
		}
	}

	/// Manually advanced clock shared between a test and the cache under test.
	#[derive(Clone, Debug)]
	pub struct ManualClock(Arc<Mutex<OffsetDateTime>>);
	impl ManualClock {
		/// Starts the clock at `start`.
		pub fn new(start: OffsetDateTime) -> Self {
			Self(Arc::new(Mutex::new(start)))
		}

		/// Current reading.
		pub fn now(&self) -> OffsetDateTime {
			*self.0.lock()
		}

		/// Moves the clock forward by `by`.
		pub fn advance(&self, by: Duration) {
			*self.0.lock() += by;
		}

		/// Returns a [`Clock`] reading from this instance.
		pub fn clock(&self) -> Clock {
			let inner = self.0.clone();

			Arc::new(move || *inner.lock())
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::PathBuf,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "cli")] use {clap as _, color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, tempfile as _};
#[cfg(all(test, not(feature = "cli")))] use color_eyre as _;
