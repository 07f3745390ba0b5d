// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use bearer_gate::{
	auth::Credential,
	config::GateConfig,
	url::Url,
	verify::{ReqwestVerifier, Verifier, VerifyError},
};

const PROTECTED: &str = "/launcher/Protected/";

fn endpoint(server: &MockServer) -> Url {
	Url::parse(&server.url(PROTECTED)).expect("Mock authority endpoint should parse successfully.")
}

#[tokio::test]
async fn status_200_accepts_and_presents_bearer_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PROTECTED).header("authorization", "Bearer good-token");
			then.status(200).body("welcome");
		})
		.await;

	ReqwestVerifier::new(endpoint(&server))
		.verify(&Credential::new("good-token"))
		.await
		.expect("Status 200 should verify the credential.");

	mock.assert_async().await;
}

#[tokio::test]
async fn any_other_status_is_a_rejection() {
	let server = MockServer::start_async().await;
	let unauthorized = server
		.mock_async(|when, then| {
			when.method(GET).path(PROTECTED).header("authorization", "Bearer revoked");
			then.status(401);
		})
		.await;
	let no_content = server
		.mock_async(|when, then| {
			when.method(GET).path(PROTECTED).header("authorization", "Bearer odd");
			then.status(204);
		})
		.await;
	let verifier = ReqwestVerifier::new(endpoint(&server));
	let err = verifier
		.verify(&Credential::new("revoked"))
		.await
		.expect_err("Status 401 should reject the credential.");

	assert!(matches!(err, VerifyError::Rejected { status: 401 }));

	let err = verifier
		.verify(&Credential::new("odd"))
		.await
		.expect_err("Only status 200 counts as success.");

	assert!(matches!(err, VerifyError::Rejected { status: 204 }));

	unauthorized.assert_async().await;
	no_content.assert_async().await;
}

#[tokio::test]
async fn slow_authority_times_out_without_retry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PROTECTED);
			then.status(200).delay(Duration::from_millis(500));
		})
		.await;
	let err = ReqwestVerifier::new(endpoint(&server))
		.with_timeout(Duration::from_millis(50))
		.verify(&Credential::new("slow"))
		.await
		.expect_err("Calls exceeding the timeout should fail.");

	assert!(matches!(err, VerifyError::Timeout));
	assert_eq!(err.kind(), "timeout");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_authority_is_a_transport_failure() {
	let endpoint = Url::parse("http://127.0.0.1:1/launcher/Protected/")
		.expect("Unreachable endpoint fixture should parse.");
	let err = ReqwestVerifier::new(endpoint)
		.verify(&Credential::new("any"))
		.await
		.expect_err("Connection failures should not verify.");

	assert!(matches!(err, VerifyError::Transport { .. }));
	assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn config_supplies_endpoint_and_timeout() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PROTECTED);
			then.status(200).delay(Duration::from_millis(1_500));
		})
		.await;
	let config = GateConfig::new(endpoint(&server))
		.with_verifier_timeout(time::Duration::seconds(1));
	let verifier = ReqwestVerifier::from_config(&config)
		.expect("Verifier should build from a valid configuration.");

	assert_eq!(verifier.endpoint(), &config.verifier_url);
	assert!(matches!(
		verifier.verify(&Credential::new("late")).await,
		Err(VerifyError::Timeout)
	));

	mock.assert_async().await;
}
