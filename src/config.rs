//! Gate configuration: defaults, TOML loading, layered overrides, and validation.
//!
//! Settings arrive as a [`PartialGateConfig`] (from a TOML file, CLI flags, or code), are merged
//! with later layers taking precedence, and are then built into a validated [`GateConfig`].

// std
use std::{
	fs,
	net::{Ipv4Addr, SocketAddr, SocketAddrV4},
	path::Path,
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Fully resolved gate settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateConfig {
	/// Address the HTTP listener binds to.
	pub listen_addr: SocketAddr,
	/// Remote authority endpoint used for credential verification.
	pub verifier_url: Url,
	/// How long a verified credential stays trusted without re-verification.
	pub ttl: Duration,
	/// Period between expiry sweeps.
	pub sweep_interval: Duration,
	/// Upper bound on a single remote verification call.
	pub verifier_timeout: Duration,
	/// Root directory served to authorized requests.
	pub public_dir: PathBuf,
	/// Share one remote verification between concurrent misses for the same credential.
	pub coalesce_verifications: bool,
}
impl GateConfig {
	/// Default bind address (`0.0.0.0:9090`).
	pub const DEFAULT_LISTEN_ADDR: SocketAddr =
		SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 9090));
	/// Default sweep period.
	pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::minutes(1);
	/// Default cache validity.
	pub const DEFAULT_TTL: Duration = Duration::minutes(30);
	/// Default timeout applied to each remote verification.
	pub const DEFAULT_VERIFIER_TIMEOUT: Duration = Duration::seconds(10);

	/// Creates a configuration with default settings for the given verifier endpoint.
	pub fn new(verifier_url: Url) -> Self {
		Self {
			listen_addr: Self::DEFAULT_LISTEN_ADDR,
			verifier_url,
			ttl: Self::DEFAULT_TTL,
			sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
			verifier_timeout: Self::DEFAULT_VERIFIER_TIMEOUT,
			public_dir: PathBuf::from("./public"),
			coalesce_verifications: false,
		}
	}

	/// Parses and validates a TOML document.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		PartialGateConfig::from_toml_str(raw)?.build()
	}

	/// Reads, parses, and validates a TOML file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		PartialGateConfig::from_path(path)?.build()
	}

	/// Overrides the listener address.
	pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
		self.listen_addr = addr;

		self
	}

	/// Overrides the cache validity.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Overrides the sweep period.
	pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
		self.sweep_interval = interval;

		self
	}

	/// Overrides the remote verification timeout.
	pub fn with_verifier_timeout(mut self, timeout: Duration) -> Self {
		self.verifier_timeout = timeout;

		self
	}

	/// Overrides the served directory.
	pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.public_dir = dir.into();

		self
	}

	/// Enables or disables in-flight verification coalescing.
	pub fn with_coalescing(mut self, enabled: bool) -> Self {
		self.coalesce_verifications = enabled;

		self
	}

	/// Rejects non-positive durations, TTLs past the representable time range, and non-HTTP(S)
	/// verifier endpoints.
	pub fn validate(&self) -> Result<(), ConfigError> {
		for (field, value) in [
			("ttl", self.ttl),
			("sweep_interval", self.sweep_interval),
			("verifier_timeout", self.verifier_timeout),
		] {
			if !value.is_positive() {
				return Err(ConfigError::NonPositiveDuration { field });
			}
		}

		if OffsetDateTime::now_utc().checked_add(self.ttl).is_none() {
			return Err(ConfigError::DurationOutOfRange { field: "ttl" });
		}

		match self.verifier_url.scheme() {
			"http" | "https" => Ok(()),
			scheme => Err(ConfigError::UnsupportedScheme { scheme: scheme.to_owned() }),
		}
	}
}

/// One layer of optional settings, as found in a TOML file or on the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialGateConfig {
	/// See [`GateConfig::listen_addr`].
	pub listen_addr: Option<SocketAddr>,
	/// See [`GateConfig::verifier_url`].
	pub verifier_url: Option<String>,
	/// Cache validity in seconds.
	pub ttl_secs: Option<u64>,
	/// Sweep period in seconds.
	pub sweep_interval_secs: Option<u64>,
	/// Remote verification timeout in seconds.
	pub verifier_timeout_secs: Option<u64>,
	/// See [`GateConfig::public_dir`].
	pub public_dir: Option<PathBuf>,
	/// See [`GateConfig::coalesce_verifications`].
	pub coalesce_verifications: Option<bool>,
}
impl PartialGateConfig {
	/// Parses a TOML document; errors carry the path of the offending key.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		serde_path_to_error::deserialize(toml::Deserializer::new(raw))
			.map_err(|source| ConfigError::Parse { source })
	}

	/// Reads and parses a TOML file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;

		Self::from_toml_str(&raw)
	}

	/// Layers `other` on top of `self`; fields set in `other` win.
	pub fn merge(self, other: Self) -> Self {
		Self {
			listen_addr: other.listen_addr.or(self.listen_addr),
			verifier_url: other.verifier_url.or(self.verifier_url),
			ttl_secs: other.ttl_secs.or(self.ttl_secs),
			sweep_interval_secs: other.sweep_interval_secs.or(self.sweep_interval_secs),
			verifier_timeout_secs: other.verifier_timeout_secs.or(self.verifier_timeout_secs),
			public_dir: other.public_dir.or(self.public_dir),
			coalesce_verifications: other.coalesce_verifications.or(self.coalesce_verifications),
		}
	}

	/// Resolves defaults and validates the result.
	pub fn build(self) -> Result<GateConfig, ConfigError> {
		let raw_url = self.verifier_url.ok_or(ConfigError::MissingVerifierUrl)?;
		let verifier_url =
			Url::parse(&raw_url).map_err(|source| ConfigError::InvalidVerifierUrl { source })?;
		let mut config = GateConfig::new(verifier_url);

		if let Some(addr) = self.listen_addr {
			config.listen_addr = addr;
		}
		if let Some(secs) = self.ttl_secs {
			config.ttl = seconds(secs, "ttl")?;
		}
		if let Some(secs) = self.sweep_interval_secs {
			config.sweep_interval = seconds(secs, "sweep_interval")?;
		}
		if let Some(secs) = self.verifier_timeout_secs {
			config.verifier_timeout = seconds(secs, "verifier_timeout")?;
		}
		if let Some(dir) = self.public_dir {
			config.public_dir = dir;
		}
		if let Some(enabled) = self.coalesce_verifications {
			config.coalesce_verifications = enabled;
		}

		config.validate()?;

		Ok(config)
	}
}

fn seconds(secs: u64, field: &'static str) -> Result<Duration, ConfigError> {
	i64::try_from(secs)
		.map(Duration::seconds)
		.map_err(|_| ConfigError::DurationOutOfRange { field })
}

/// Converts a positive [`Duration`] into the std form used by timers and HTTP clients.
pub(crate) fn std_duration(
	value: Duration,
	field: &'static str,
) -> Result<std::time::Duration, ConfigError> {
	match std::time::Duration::try_from(value) {
		Ok(converted) if !converted.is_zero() => Ok(converted),
		_ => Err(ConfigError::NonPositiveDuration { field }),
	}
}
