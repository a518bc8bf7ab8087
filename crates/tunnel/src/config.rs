//! Tunnel configuration loaded from `tunnel.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::adapter::AdapterOptions;
use crate::error::ConfigError;

/// Tunable parameters for tunnels and their socket adapters.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunnelConfig {
	/// Timeout for outbound connect attempts, in milliseconds.
	pub connect_timeout_ms: u64,
	/// Maximum number of bytes forwarded per received chunk.
	pub read_chunk_size: usize,
	/// Capacity of each logical byte channel, in chunks.
	pub channel_capacity: usize,
	/// Enables `TCP_NODELAY` on new connections.
	pub no_delay: bool,
}

impl Default for TunnelConfig {
	fn default() -> Self {
		Self {
			connect_timeout_ms: 10_000,
			read_chunk_size: crate::adapter::DEFAULT_READ_CHUNK_SIZE,
			channel_capacity: 64,
			no_delay: false,
		}
	}
}

impl TunnelConfig {
	/// Parses and validates a configuration from TOML source.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Toml`] for syntax errors and unknown keys and
	/// [`ConfigError::InvalidValue`] for unusable values.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and validates a configuration file.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
	/// [`Self::from_toml_str`].
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&source)?;
		tracing::debug!(path = %path.display(), "tunnel.config.loaded");
		Ok(config)
	}

	/// Loads the user configuration if one exists, defaults otherwise.
	///
	/// # Errors
	///
	/// Fails only when a configuration file exists but is invalid.
	pub fn discover() -> Result<Self, ConfigError> {
		match Self::default_path() {
			Some(path) if path.is_file() => Self::load(&path),
			_ => Ok(Self::default()),
		}
	}

	/// `<config dir>/eel/tunnel.toml`, when the platform has a config dir.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("eel").join("tunnel.toml"))
	}

	/// Connect timeout as a [`Duration`].
	pub const fn connect_timeout(&self) -> Duration {
		Duration::from_millis(self.connect_timeout_ms)
	}

	/// Adapter parameters derived from this configuration.
	pub const fn adapter_options(&self) -> AdapterOptions {
		AdapterOptions {
			read_chunk_size: self.read_chunk_size,
			channel_capacity: self.channel_capacity,
		}
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.connect_timeout_ms == 0 {
			return Err(ConfigError::InvalidValue {
				option: "connect_timeout_ms",
				reason: "must be greater than zero",
			});
		}
		if self.read_chunk_size == 0 {
			return Err(ConfigError::InvalidValue {
				option: "read_chunk_size",
				reason: "must be greater than zero",
			});
		}
		if self.channel_capacity == 0 {
			return Err(ConfigError::InvalidValue {
				option: "channel_capacity",
				reason: "must be greater than zero",
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_source_yields_defaults() {
		let config = TunnelConfig::from_toml_str("").unwrap();
		assert_eq!(config, TunnelConfig::default());
		assert_eq!(config.read_chunk_size, 4096);
		assert_eq!(config.connect_timeout(), Duration::from_secs(10));
	}

	#[test]
	fn overrides_individual_fields() {
		let config = TunnelConfig::from_toml_str("connect_timeout_ms = 250\nno_delay = true").unwrap();
		assert_eq!(config.connect_timeout(), Duration::from_millis(250));
		assert!(config.no_delay);
		assert_eq!(config.channel_capacity, 64);
	}

	#[test]
	fn rejects_unknown_keys() {
		let err = TunnelConfig::from_toml_str("chunk = 1").unwrap_err();
		assert!(matches!(err, ConfigError::Toml(_)));
	}

	#[test]
	fn rejects_zero_sizes() {
		let err = TunnelConfig::from_toml_str("read_chunk_size = 0").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { option: "read_chunk_size", .. }));
		let err = TunnelConfig::from_toml_str("channel_capacity = 0").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { option: "channel_capacity", .. }));
	}

	#[test]
	fn rejects_zero_connect_timeout() {
		let err = TunnelConfig::from_toml_str("connect_timeout_ms = 0").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { option: "connect_timeout_ms", .. }));
		assert!(TunnelConfig::from_toml_str("connect_timeout_ms = 1").is_ok());
	}

	#[test]
	fn loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "read_chunk_size = 512").unwrap();
		let config = TunnelConfig::load(file.path()).unwrap();
		assert_eq!(config.adapter_options().read_chunk_size, 512);
	}

	#[test]
	fn missing_file_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent.toml");
		match TunnelConfig::load(&path) {
			Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected I/O error, got {other:?}"),
		}
	}
}
