//! Opaque bearer credential that redacts itself and extracts from `Authorization` headers.

// crates.io
use axum::http::{HeaderMap, header::AUTHORIZATION};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Scheme prefix that must precede the token in an `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Opaque bearer token presented by a client.
///
/// The value is never written to logs in full: `Debug` and `Display` redact it, and
/// [`Credential::fingerprint`] yields a short stable digest for log correlation.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Credential(String);
impl Credential {
	/// Wraps a raw token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Extracts the credential from a raw `Authorization` header value.
	///
	/// Only a well-formed `Bearer <token>` value yields a non-empty credential. A missing
	/// header, any other scheme, or an empty token all produce an empty credential.
	pub fn from_authorization(value: Option<&str>) -> Self {
		value.and_then(|raw| raw.strip_prefix(BEARER_PREFIX)).map(Self::new).unwrap_or_default()
	}

	/// Extracts the credential from request headers; see [`Credential::from_authorization`].
	pub fn from_headers(headers: &HeaderMap) -> Self {
		Self::from_authorization(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
	}

	/// Returns true when no token was presented.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short hex digest (first 8 bytes of SHA-256) safe to include in logs.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());

		digest[..8].iter().map(|b| format!("{b:02x}")).collect()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::http::HeaderValue;
	// self
	use super::*;

	#[test]
	fn bearer_prefix_yields_token() {
		let credential = Credential::from_authorization(Some("Bearer abc.def"));

		assert_eq!(credential.expose(), "abc.def");
		assert!(!credential.is_empty());
	}

	#[test]
	fn other_forms_yield_empty_credential() {
		for raw in
			[None, Some(""), Some("Basic xyz"), Some("Bearer "), Some("bearer abc"), Some("Bearer")]
		{
			assert!(
				Credential::from_authorization(raw).is_empty(),
				"Header {raw:?} should not yield a credential."
			);
		}
	}

	#[test]
	fn headers_without_valid_utf8_yield_empty_credential() {
		let mut headers = HeaderMap::new();

		headers.insert(
			AUTHORIZATION,
			HeaderValue::from_bytes(b"Bearer \xff\xfe")
				.expect("Opaque header bytes should be accepted by HeaderValue."),
		);

		assert!(Credential::from_headers(&headers).is_empty());

		headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token-1"));

		assert_eq!(Credential::from_headers(&headers).expose(), "token-1");
	}

	#[test]
	fn formatters_redact_and_fingerprint_is_stable() {
		let credential = Credential::new("super-secret");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
		assert_eq!(format!("{credential}"), "<redacted>");
		assert_eq!(credential.fingerprint().len(), 16);
		assert_eq!(credential.fingerprint(), Credential::new("super-secret").fingerprint());
		assert_ne!(credential.fingerprint(), Credential::new("other-secret").fingerprint());
		assert!(!credential.fingerprint().contains("secret"));
	}
}
