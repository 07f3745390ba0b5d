//! Gate-level error types shared across configuration and serving.

// self
use crate::_prelude::*;

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Listener or serving I/O failure.
	#[error("I/O error occurred while serving requests.")]
	Io(#[from] std::io::Error),
}

/// Configuration and validation failures raised while assembling the gate.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration file could not be read.
	#[error("Configuration file `{path}` could not be read.")]
	Read {
		/// Path that failed to load.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration file is not valid TOML or does not match the expected shape.
	#[error("Configuration is invalid at `{}`.", .source.path())]
	Parse {
		/// Structured parsing failure, including the offending key path.
		#[source]
		source: serde_path_to_error::Error<toml::de::Error>,
	},
	/// No verifier URL was supplied by any configuration source.
	#[error("A verifier URL is required.")]
	MissingVerifierUrl,
	/// Verifier URL cannot be parsed.
	#[error("Verifier URL is invalid.")]
	InvalidVerifierUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Verifier URL uses a scheme other than HTTP(S).
	#[error("Verifier URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme found in the configured URL.
		scheme: String,
	},
	/// A duration setting is zero or negative.
	#[error("The {field} setting must be positive.")]
	NonPositiveDuration {
		/// Configuration field label.
		field: &'static str,
	},
	/// A duration setting exceeds the supported range.
	#[error("The {field} setting exceeds the supported range.")]
	DurationOutOfRange {
		/// Configuration field label.
		field: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn config_error_converts_into_gate_error_transparently() {
		let gate_error: Error = ConfigError::MissingVerifierUrl.into();

		assert!(matches!(gate_error, Error::Config(ConfigError::MissingVerifierUrl)));
		assert_eq!(gate_error.to_string(), "A verifier URL is required.");
	}

	#[test]
	fn non_positive_duration_names_the_field() {
		let err = ConfigError::NonPositiveDuration { field: "ttl" };

		assert_eq!(err.to_string(), "The ttl setting must be positive.");
	}

	#[test]
	fn read_error_exposes_io_source() {
		let err = ConfigError::Read {
			path: PathBuf::from("/missing/gate.toml"),
			source: std::io::Error::from(std::io::ErrorKind::NotFound),
		};
		let source =
			StdError::source(&err).expect("Read errors should expose the IO failure as source.");

		assert!(err.to_string().contains("/missing/gate.toml"));
		assert_eq!(
			source.to_string(),
			std::io::Error::from(std::io::ErrorKind::NotFound).to_string()
		);
	}
}
