//! Request gate: axum middleware that forwards only requests carrying a trusted bearer credential.
//!
//! Every response leaving the gate, authorized or not, carries cache-prevention headers. Failed
//! checks answer `401` with a generic plain-text body. Callers never learn whether the token was
//! bad or the authority was unreachable; the detail goes to the logs only.

// crates.io
use axum::{
	extract::{Request, State},
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{CACHE_CONTROL, EXPIRES, PRAGMA},
	},
	middleware::Next,
	response::{IntoResponse, Response},
};
// self
use crate::{
	auth::Credential,
	cache::{AuthorizeError, TokenCache},
};

/// Body returned with every `401` response.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

/// Middleware entry point; install with `axum::middleware::from_fn_with_state`.
pub async fn gate(State(cache): State<TokenCache>, request: Request, next: Next) -> Response {
	let credential = Credential::from_headers(request.headers());
	let path = request.uri().path().to_owned();
	let mut response = match cache.evaluate(&credential).await {
		Ok(grant) => {
			tracing::info!(
				path = %path,
				outcome = %grant.outcome(),
				credential = %credential.fingerprint(),
				"request authorized"
			);

			next.run(request).await
		},
		Err(e @ AuthorizeError::MissingCredential) => {
			tracing::info!(
				path = %path,
				outcome = %e.outcome(),
				"request rejected without credential"
			);

			unauthorized()
		},
		Err(e) => {
			tracing::warn!(
				path = %path,
				outcome = %e.outcome(),
				kind = e.kind(),
				credential = %credential.fingerprint(),
				error = %e,
				"request rejected"
			);

			unauthorized()
		},
	};

	apply_no_cache_headers(response.headers_mut());

	response
}

/// Sets the headers that forbid clients and intermediaries from caching the response.
pub fn apply_no_cache_headers(headers: &mut HeaderMap) {
	headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store, must-revalidate"));
	headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
	headers.insert(EXPIRES, HeaderValue::from_static("0"));
}

fn unauthorized() -> Response {
	(StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response()
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::{
		Router,
		body::{self, Body},
		http::header::AUTHORIZATION,
		middleware,
		routing::get,
	};
	use time::macros;
	use tower::ServiceExt;
	// self
	use super::*;
	use crate::{
		_prelude::*,
		_preludet::{CountingVerifier, ManualClock},
		store::MemoryStore,
		verify::Verifier,
	};

	fn build_app(verifier: &Arc<CountingVerifier>) -> Router {
		let shared: Arc<dyn Verifier> = verifier.clone();
		let cache = TokenCache::new(MemoryStore::default(), shared, Duration::minutes(30))
			.with_clock(ManualClock::new(macros::datetime!(2025-11-10 12:00 UTC)).clock());

		Router::new()
			.route("/asset.txt", get(|| async { "asset" }))
			.layer(middleware::from_fn_with_state(cache, gate))
	}

	fn request(authorization: Option<&str>) -> Request {
		let mut builder = axum::http::Request::builder().uri("/asset.txt");

		if let Some(value) = authorization {
			builder = builder.header(AUTHORIZATION, value);
		}

		builder.body(Body::empty()).expect("Test request should build.")
	}

	fn assert_no_cache_headers(response: &Response) {
		let headers = response.headers();

		assert_eq!(headers[CACHE_CONTROL], "no-cache, no-store, must-revalidate");
		assert_eq!(headers[PRAGMA], "no-cache");
		assert_eq!(headers[EXPIRES], "0");
	}

	async fn body_text(response: Response) -> String {
		let bytes = body::to_bytes(response.into_body(), usize::MAX)
			.await
			.expect("Response body should be readable.");

		String::from_utf8(bytes.to_vec()).expect("Response body should be UTF-8.")
	}

	#[tokio::test]
	async fn trusted_credential_reaches_downstream() {
		let verifier = Arc::new(CountingVerifier::accepting());
		let app = build_app(&verifier);
		let response = app
			.clone()
			.oneshot(request(Some("Bearer abc")))
			.await
			.expect("Gate should not fail as a service.");

		assert_eq!(response.status(), StatusCode::OK);
		assert_no_cache_headers(&response);
		assert_eq!(body_text(response).await, "asset");

		let response = app
			.oneshot(request(Some("Bearer abc")))
			.await
			.expect("Gate should not fail as a service.");

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(verifier.calls(), 1);
	}

	#[tokio::test]
	async fn wrong_scheme_is_rejected_without_verification() {
		let verifier = Arc::new(CountingVerifier::accepting());
		let response = build_app(&verifier)
			.oneshot(request(Some("Basic xyz")))
			.await
			.expect("Gate should not fail as a service.");

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_no_cache_headers(&response);
		assert_eq!(body_text(response).await, UNAUTHORIZED_BODY);
		assert_eq!(verifier.calls(), 0);
	}

	#[tokio::test]
	async fn missing_header_is_rejected() {
		let verifier = Arc::new(CountingVerifier::accepting());
		let response = build_app(&verifier)
			.oneshot(request(None))
			.await
			.expect("Gate should not fail as a service.");

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(verifier.calls(), 0);
	}

	#[tokio::test]
	async fn verifier_failures_share_one_generic_response() {
		let rejecting = Arc::new(CountingVerifier::rejecting(403));
		let timing_out = Arc::new(CountingVerifier::timing_out());
		let rejected = build_app(&rejecting)
			.oneshot(request(Some("Bearer bad")))
			.await
			.expect("Gate should not fail as a service.");
		let timed_out = build_app(&timing_out)
			.oneshot(request(Some("Bearer slow")))
			.await
			.expect("Gate should not fail as a service.");

		assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(timed_out.status(), StatusCode::UNAUTHORIZED);
		assert_no_cache_headers(&timed_out);
		assert_eq!(body_text(rejected).await, body_text(timed_out).await);
	}
}
