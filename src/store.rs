//! Trust store contracts: cache entries and the in-memory token store.

pub mod memory;

pub use memory::MemoryStore;

// crates.io
use time::PrimitiveDateTime;
// self
use crate::_prelude::*;

/// Trust record kept for a verified credential.
///
/// Entries are only ever created from a successful remote verification, and a re-verification
/// overwrites the previous entry rather than merging with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheEntry {
	/// Instant after which the credential must be re-verified.
	pub valid_until: OffsetDateTime,
}
impl CacheEntry {
	/// Creates an entry trusted for `ttl` starting at `verified_at`.
	///
	/// A window reaching past the last representable instant is clamped to that instant.
	pub fn new(verified_at: OffsetDateTime, ttl: Duration) -> Self {
		let valid_until = verified_at
			.checked_add(ttl)
			.unwrap_or_else(|| PrimitiveDateTime::MAX.assume_offset(verified_at.offset()));

		Self { valid_until }
	}

	/// Returns true while `now` is strictly before `valid_until`.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		now < self.valid_until
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn entry_expires_exactly_at_valid_until() {
		let verified_at = macros::datetime!(2025-11-10 12:00 UTC);
		let entry = CacheEntry::new(verified_at, Duration::minutes(30));

		assert_eq!(entry.valid_until, macros::datetime!(2025-11-10 12:30 UTC));
		assert!(entry.is_valid_at(verified_at));
		assert!(entry.is_valid_at(macros::datetime!(2025-11-10 12:29:59 UTC)));
		assert!(!entry.is_valid_at(macros::datetime!(2025-11-10 12:30 UTC)));
		assert!(!entry.is_valid_at(macros::datetime!(2025-11-10 12:31 UTC)));
	}

	#[test]
	fn oversized_ttl_clamps_to_last_instant() {
		let verified_at = macros::datetime!(2025-11-10 12:00 UTC);
		let entry = CacheEntry::new(verified_at, Duration::seconds(9_000_000_000_000_000));

		assert_eq!(entry.valid_until, PrimitiveDateTime::MAX.assume_utc());
		assert!(entry.is_valid_at(verified_at));
	}
}
