//! Remote verification contract and the reqwest-backed verifier.
//!
//! A [`Verifier`] performs exactly one outbound check per call: no retries, no backoff. Every
//! failure mode collapses into a [`VerifyError`] that keeps its kind and cause, so callers can
//! log the detail before reducing the outcome to authorized/unauthorized.

// self
use crate::{_prelude::*, auth::Credential, error::BoxError};
#[cfg(feature = "reqwest")]
use crate::{
	config::{self, GateConfig},
	error::ConfigError,
};

/// Boxed future returned by [`Verifier::verify`].
pub type VerifyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), VerifyError>> + 'a + Send>>;

/// Outbound authorization check against the remote authority.
pub trait Verifier
where
	Self: Send + Sync,
{
	/// Resolves to `Ok(())` only when the authority explicitly accepts the credential.
	fn verify<'a>(&'a self, credential: &'a Credential) -> VerifyFuture<'a>;
}

/// Failure reported by a [`Verifier`].
#[derive(Debug, ThisError)]
pub enum VerifyError {
	/// Network, TLS, or response-body failure while talking to the authority.
	#[error("Transport error occurred while calling the remote authority.")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// The call did not complete within the configured timeout.
	#[error("Remote authority did not respond in time.")]
	Timeout,
	/// The authority answered with a status other than 200.
	#[error("Remote authority rejected the credential with status {status}.")]
	Rejected {
		/// HTTP status code returned by the authority.
		status: u16,
	},
}
impl VerifyError {
	/// Wraps a transport-specific failure.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Returns a stable label suitable for log and metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Transport { .. } => "transport",
			Self::Timeout => "timeout",
			Self::Rejected { .. } => "rejected",
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for VerifyError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::transport(e) }
	}
}

/// Verifier that issues `GET <endpoint>` with `Authorization: Bearer <token>` through reqwest.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestVerifier {
	client: ReqwestClient,
	endpoint: Url,
	timeout: std::time::Duration,
}
#[cfg(feature = "reqwest")]
impl ReqwestVerifier {
	const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

	/// Creates a verifier against `endpoint` using a default reqwest client.
	pub fn new(endpoint: Url) -> Self {
		Self::with_client(ReqwestClient::new(), endpoint)
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint, timeout: Self::DEFAULT_TIMEOUT }
	}

	/// Builds a verifier from the gate configuration (endpoint + timeout).
	pub fn from_config(config: &GateConfig) -> Result<Self, ConfigError> {
		let timeout = config::std_duration(config.verifier_timeout, "verifier_timeout")?;
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self { client, endpoint: config.verifier_url.clone(), timeout })
	}

	/// Overrides the per-request timeout.
	pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Endpoint every verification call targets.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn verify_now(&self, credential: &Credential) -> Result<(), VerifyError> {
		let response = self
			.client
			.get(self.endpoint.clone())
			.bearer_auth(credential.expose())
			.timeout(self.timeout)
			.send()
			.await?;
		let status = response.status();

		// Drain the body so the connection can be reused; its content is irrelevant.
		response.bytes().await?;

		if status == reqwest::StatusCode::OK {
			Ok(())
		} else {
			Err(VerifyError::Rejected { status: status.as_u16() })
		}
	}
}
#[cfg(feature = "reqwest")]
impl Verifier for ReqwestVerifier {
	fn verify<'a>(&'a self, credential: &'a Credential) -> VerifyFuture<'a> {
		Box::pin(self.verify_now(credential))
	}
}
