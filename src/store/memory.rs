//! Thread-safe in-memory trust store shared by the cache and the sweeper.

// self
use crate::{_prelude::*, auth::Credential, store::CacheEntry};

type StoreMap = Arc<RwLock<HashMap<Credential, CacheEntry>>>;

/// Process-lifetime map from credential to [`CacheEntry`].
///
/// Clones share the same underlying map. Every operation takes the lock once and releases it
/// before returning, so readers never observe a partially written entry and no lock is held
/// across an `.await`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the entry for `credential`, expired or not.
	pub fn lookup(&self, credential: &Credential) -> Option<CacheEntry> {
		self.0.read().get(credential).copied()
	}

	/// Returns true when `credential` has an entry still valid at `now`.
	pub fn is_trusted_at(&self, credential: &Credential, now: OffsetDateTime) -> bool {
		self.0.read().get(credential).is_some_and(|entry| entry.is_valid_at(now))
	}

	/// Writes or overwrites the entry for `credential`.
	pub fn save(&self, credential: Credential, entry: CacheEntry) {
		self.0.write().insert(credential, entry);
	}

	/// Removes every entry whose `valid_until` is at or before `now`, returning how many.
	pub fn remove_expired(&self, now: OffsetDateTime) -> usize {
		let mut guard = self.0.write();
		let before = guard.len();

		guard.retain(|_, entry| entry.is_valid_at(now));

		before - guard.len()
	}

	/// Number of entries currently held, including expired ones not yet swept.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when the store holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
