//! `bearer-gate` binary: serves a directory to requests carrying a remotely verified bearer token.

// std
use std::{net::SocketAddr, path::PathBuf};
// crates.io
use bearer_gate::config::PartialGateConfig;
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Command-line and environment settings; each one overrides the config file.
#[derive(Debug, Parser)]
#[command(name = "bearer-gate", version, about)]
struct Args {
	/// Path to a TOML configuration file.
	#[arg(long, env = "BEARER_GATE_CONFIG")]
	config: Option<PathBuf>,
	/// Address to listen on, e.g. `0.0.0.0:9090`.
	#[arg(long, env = "BEARER_GATE_LISTEN_ADDR")]
	listen_addr: Option<SocketAddr>,
	/// Remote authority endpoint that validates bearer tokens.
	#[arg(long, env = "BEARER_GATE_VERIFIER_URL")]
	verifier_url: Option<String>,
	/// Seconds a verified token stays trusted.
	#[arg(long, env = "BEARER_GATE_TTL_SECS")]
	ttl_secs: Option<u64>,
	/// Seconds between expiry sweeps.
	#[arg(long, env = "BEARER_GATE_SWEEP_INTERVAL_SECS")]
	sweep_interval_secs: Option<u64>,
	/// Timeout in seconds for each remote verification.
	#[arg(long, env = "BEARER_GATE_VERIFIER_TIMEOUT_SECS")]
	verifier_timeout_secs: Option<u64>,
	/// Directory served to authorized requests.
	#[arg(long, env = "BEARER_GATE_PUBLIC_DIR")]
	public_dir: Option<PathBuf>,
	/// Share one remote verification between concurrent requests with the same token.
	#[arg(long, env = "BEARER_GATE_COALESCE_VERIFICATIONS")]
	coalesce_verifications: Option<bool>,
}
impl Args {
	fn into_layers(self) -> Result<PartialGateConfig> {
		let file = match &self.config {
			Some(path) => PartialGateConfig::from_path(path)?,
			None => PartialGateConfig::default(),
		};
		let overrides = PartialGateConfig {
			listen_addr: self.listen_addr,
			verifier_url: self.verifier_url,
			ttl_secs: self.ttl_secs,
			sweep_interval_secs: self.sweep_interval_secs,
			verifier_timeout_secs: self.verifier_timeout_secs,
			public_dir: self.public_dir,
			coalesce_verifications: self.coalesce_verifications,
		};

		Ok(file.merge(overrides))
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	init_tracing();

	let config = Args::parse().into_layers()?.build()?;

	bearer_gate::server::run(config, shutdown_signal()).await?;

	Ok(())
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for ctrl-c");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::error!(error = %e, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("shutdown signal received");
}
