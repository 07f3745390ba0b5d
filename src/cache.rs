//! Token cache deciding whether a credential is currently trusted.
//!
//! [`TokenCache::evaluate`] consults the shared [`MemoryStore`] first and only calls the remote
//! [`Verifier`] on a miss or an expired entry. The store lock is never held across the remote
//! call, so one slow verification does not block other lookups. Successful verifications are
//! memoized for the configured TTL; failures are never cached.
//!
//! Without coalescing, two concurrent misses for the same credential both reach the verifier and
//! the later write wins. With [`TokenCache::with_coalescing`], a per-credential guard lets the
//! first caller verify while the others wait and then re-check the store.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	obs::{self, AuthorizeOutcome},
	store::{CacheEntry, MemoryStore},
	verify::{Verifier, VerifyError},
};

/// Time source used for lookups, inserts, and sweeps.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

type GuardMap = Arc<Mutex<HashMap<Credential, Inflight>>>;

/// Reason a credential was not authorized.
#[derive(Debug, ThisError)]
pub enum AuthorizeError {
	/// The request carried no usable bearer credential.
	#[error("Request did not carry a bearer credential.")]
	MissingCredential,
	/// The remote authority did not confirm the credential.
	#[error(transparent)]
	Verification(#[from] VerifyError),
}
impl AuthorizeError {
	/// Outcome label recorded for this failure.
	pub const fn outcome(&self) -> AuthorizeOutcome {
		match self {
			Self::MissingCredential => AuthorizeOutcome::MissingCredential,
			Self::Verification(_) => AuthorizeOutcome::Rejected,
		}
	}

	/// Stable label for the failure cause.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::MissingCredential => "missing_credential",
			Self::Verification(e) => e.kind(),
		}
	}
}

/// How an authorized credential was confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
	/// Trusted from an unexpired store entry; no remote call was made.
	CacheHit,
	/// Confirmed by the remote authority and written to the store.
	Verified,
}
impl Grant {
	/// Outcome label recorded for this grant.
	pub const fn outcome(self) -> AuthorizeOutcome {
		match self {
			Self::CacheHit => AuthorizeOutcome::CacheHit,
			Self::Verified => AuthorizeOutcome::Verified,
		}
	}
}

/// Credential trust cache backed by a shared store and a remote verifier.
#[derive(Clone)]
pub struct TokenCache {
	store: MemoryStore,
	verifier: Arc<dyn Verifier>,
	ttl: Duration,
	clock: Clock,
	coalesce: bool,
	inflight: GuardMap,
}
impl TokenCache {
	/// Creates a cache that trusts verified credentials for `ttl`.
	pub fn new(store: MemoryStore, verifier: Arc<dyn Verifier>, ttl: Duration) -> Self {
		Self {
			store,
			verifier,
			ttl,
			clock: Arc::new(OffsetDateTime::now_utc),
			coalesce: false,
			inflight: Default::default(),
		}
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Clock) -> Self {
		self.clock = clock;

		self
	}

	/// Enables or disables sharing one verification between concurrent misses.
	pub fn with_coalescing(mut self, enabled: bool) -> Self {
		self.coalesce = enabled;

		self
	}

	/// Store shared with the sweeper.
	pub fn store(&self) -> &MemoryStore {
		&self.store
	}

	/// Current time according to the cache's clock.
	pub fn now(&self) -> OffsetDateTime {
		(self.clock)()
	}

	/// Returns true when `credential` is currently trusted.
	///
	/// All failures collapse to `false`; use [`TokenCache::evaluate`] to keep the cause.
	pub async fn authorize(&self, credential: &Credential) -> bool {
		self.evaluate(credential).await.is_ok()
	}

	/// Decides whether `credential` is trusted, keeping the failure cause.
	pub async fn evaluate(&self, credential: &Credential) -> Result<Grant, AuthorizeError> {
		let result = self.evaluate_uncounted(credential).await;

		obs::record_authorize_outcome(match &result {
			Ok(grant) => grant.outcome(),
			Err(e) => e.outcome(),
		});

		result
	}

	/// Removes every expired entry from the store, returning how many were removed.
	pub fn sweep(&self) -> usize {
		let removed = self.store.remove_expired(self.now());

		obs::record_swept(removed);

		if removed > 0 {
			tracing::debug!(removed, remaining = self.store.len(), "swept expired credentials");
		}

		removed
	}

	async fn evaluate_uncounted(&self, credential: &Credential) -> Result<Grant, AuthorizeError> {
		if credential.is_empty() {
			return Err(AuthorizeError::MissingCredential);
		}
		if self.store.is_trusted_at(credential, self.now()) {
			return Ok(Grant::CacheHit);
		}
		if !self.coalesce {
			return self.verify_and_save(credential).await;
		}

		let slot = InflightSlot::acquire(&self.inflight, credential);
		let _singleflight = slot.guard.lock().await;

		// Another holder of the guard may have verified while this caller waited.
		if self.store.is_trusted_at(credential, self.now()) {
			return Ok(Grant::CacheHit);
		}

		self.verify_and_save(credential).await
	}

	async fn verify_and_save(&self, credential: &Credential) -> Result<Grant, AuthorizeError> {
		if let Err(e) = self.verifier.verify(credential).await {
			tracing::debug!(
				credential = %credential.fingerprint(),
				kind = e.kind(),
				error = %e,
				"remote verification failed"
			);

			return Err(e.into());
		}

		self.store.save(credential.clone(), CacheEntry::new(self.now(), self.ttl));

		Ok(Grant::Verified)
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("entries", &self.store.len())
			.field("ttl", &self.ttl)
			.field("coalesce", &self.coalesce)
			.finish()
	}
}

// Per-credential singleflight guard; drops its map entry once the last holder is done.
struct InflightSlot<'a> {
	map: &'a GuardMap,
	credential: &'a Credential,
	guard: Arc<AsyncMutex<()>>,
}
impl<'a> InflightSlot<'a> {
	fn acquire(map: &'a GuardMap, credential: &'a Credential) -> Self {
		let mut guards = map.lock();
		let entry = guards.entry(credential.clone()).or_default();

		entry.holders += 1;

		Self { map, credential, guard: entry.guard.clone() }
	}
}
impl Drop for InflightSlot<'_> {
	fn drop(&mut self) {
		let mut guards = self.map.lock();

		if let Some(entry) = guards.get_mut(self.credential) {
			entry.holders -= 1;

			if entry.holders == 0 {
				guards.remove(self.credential);
			}
		}
	}
}

#[derive(Default)]
struct Inflight {
	guard: Arc<AsyncMutex<()>>,
	holders: usize,
}
