//! Observability helpers for gate decisions.
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment the `bearer_gate_authorize_total` counter for every decision,
//!   labeled by `outcome`, and the `bearer_gate_swept_total` counter for swept entries.

mod metrics;

pub use metrics::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each authorization decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorizeOutcome {
	/// Credential was trusted from the local store.
	CacheHit,
	/// Credential was accepted by the remote authority and memoized.
	Verified,
	/// Request carried no usable bearer credential.
	MissingCredential,
	/// Remote verification failed or was refused.
	Rejected,
}
impl AuthorizeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthorizeOutcome::CacheHit => "cache_hit",
			AuthorizeOutcome::Verified => "verified",
			AuthorizeOutcome::MissingCredential => "missing_credential",
			AuthorizeOutcome::Rejected => "rejected",
		}
	}
}
impl Display for AuthorizeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
