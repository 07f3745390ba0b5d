//! Top-level composition: gate in front of the static responder, plus the expiry sweeper.

// std
use std::path::Path;
// crates.io
use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
// self
use crate::{
	_prelude::*,
	cache::TokenCache,
	config::{self, GateConfig},
	gate,
	store::MemoryStore,
	sweep::Sweeper,
	verify::Verifier,
};

/// Builds the router: every request passes the gate before reaching files under `public_dir`.
pub fn router(cache: TokenCache, public_dir: impl AsRef<Path>) -> Router {
	Router::new()
		.fallback_service(ServeDir::new(public_dir))
		.layer(middleware::from_fn_with_state(cache, gate::gate))
}

/// Creates a cache over a fresh, empty store using the configured TTL and coalescing mode.
pub fn build_cache(config: &GateConfig, verifier: Arc<dyn Verifier>) -> TokenCache {
	TokenCache::new(MemoryStore::default(), verifier, config.ttl)
		.with_coalescing(config.coalesce_verifications)
}

/// Verifies with reqwest against the configured endpoint and serves until `shutdown` resolves.
#[cfg(feature = "reqwest")]
pub async fn run<F>(config: GateConfig, shutdown: F) -> Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	let verifier = Arc::new(crate::verify::ReqwestVerifier::from_config(&config)?);

	serve(config, verifier, shutdown).await
}

/// Binds `config.listen_addr` and serves until `shutdown` resolves.
pub async fn serve<F>(config: GateConfig, verifier: Arc<dyn Verifier>, shutdown: F) -> Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	let listener = TcpListener::bind(config.listen_addr).await?;

	serve_with_listener(listener, config, verifier, shutdown).await
}

/// Serves on an already bound listener until `shutdown` resolves, then stops the sweeper.
pub async fn serve_with_listener<F>(
	listener: TcpListener,
	config: GateConfig,
	verifier: Arc<dyn Verifier>,
	shutdown: F,
) -> Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	config.validate()?;

	let period = config::std_duration(config.sweep_interval, "sweep_interval")?;
	let cache = build_cache(&config, verifier);
	let sweeper = Sweeper::new(cache.clone(), period).spawn();
	let app = router(cache, &config.public_dir);

	tracing::info!(
		addr = %listener.local_addr()?,
		public_dir = %config.public_dir.display(),
		verifier = %config.verifier_url,
		ttl = %config.ttl,
		"bearer gate listening"
	);

	let served = axum::serve(listener, app).with_graceful_shutdown(shutdown).await;

	sweeper.stop().await;
	tracing::info!("bearer gate stopped");

	Ok(served?)
}
