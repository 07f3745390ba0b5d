// self
use crate::obs::AuthorizeOutcome;

/// Records an authorization outcome via the global metrics recorder (when enabled).
pub fn record_authorize_outcome(outcome: AuthorizeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("bearer_gate_authorize_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records how many entries a sweep removed (when enabled).
pub fn record_swept(removed: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("bearer_gate_swept_total").increment(removed as u64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = removed;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_installed_recorder() {
		record_authorize_outcome(AuthorizeOutcome::Rejected);
		record_swept(3);
	}
}
