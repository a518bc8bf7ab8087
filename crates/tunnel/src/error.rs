//! Error types for tunnels and their configuration.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why an outbound connection could not be established.
///
/// Connection attempts report these as values; nothing panics or retries
/// across the connect boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EelConnectionError {
	/// Any I/O failure without a more specific variant.
	#[error("connection failed: {0}")]
	UnknownFailure(String),

	/// The remote side actively refused the connection.
	#[error("connection refused: {0}")]
	ConnectionRefused(String),

	/// The host name did not resolve to any address.
	#[error("cannot resolve host: {0}")]
	ResolveFailure(String),

	/// The connect attempt did not finish within the timeout.
	#[error("connecting to {address} timed out after {timeout:?}")]
	Timeout {
		/// The address that was being connected to.
		address: String,
		/// The timeout that elapsed.
		timeout: Duration,
	},

	/// The operation is not available for this environment.
	#[error("{operation} is not supported by this tunnel implementation")]
	Unsupported {
		/// Name of the unavailable operation.
		operation: &'static str,
	},
}

impl From<io::Error> for EelConnectionError {
	fn from(error: io::Error) -> Self {
		match error.kind() {
			io::ErrorKind::ConnectionRefused => Self::ConnectionRefused(error.to_string()),
			_ => Self::UnknownFailure(error.to_string()),
		}
	}
}

/// A `host:port` string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid host address {input:?}: {reason}")]
pub struct AddressParseError {
	/// The rejected input.
	pub input: String,
	/// What made the input invalid.
	pub reason: &'static str,
}

/// Errors that can occur when loading tunnel configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: io::Error,
	},

	/// Error parsing TOML syntax or an unknown key.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value is syntactically valid but unusable.
	#[error("invalid value for '{option}': {reason}")]
	InvalidValue {
		/// The option's TOML key.
		option: &'static str,
		/// Why the value was rejected.
		reason: &'static str,
	},
}
