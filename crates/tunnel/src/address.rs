use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AddressParseError;

/// Connect timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An immutable request for an outbound connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostAddress {
	hostname: String,
	port: u16,
	connect_timeout: Duration,
}

impl HostAddress {
	/// Starts building an address for `port` on `localhost`.
	pub fn builder(port: u16) -> HostAddressBuilder {
		HostAddressBuilder {
			hostname: "localhost".to_string(),
			port,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
		}
	}

	/// Host name or IP literal, without brackets.
	pub fn hostname(&self) -> &str {
		&self.hostname
	}

	/// Remote port.
	pub const fn port(&self) -> u16 {
		self.port
	}

	/// How long a connect attempt may take.
	pub const fn connect_timeout(&self) -> Duration {
		self.connect_timeout
	}

	/// Copy of this address with another timeout.
	#[must_use]
	pub fn with_connect_timeout(&self, connect_timeout: Duration) -> Self {
		Self {
			connect_timeout,
			..self.clone()
		}
	}
}

impl fmt::Display for HostAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.hostname.contains(':') {
			write!(f, "[{}]:{}", self.hostname, self.port)
		} else {
			write!(f, "{}:{}", self.hostname, self.port)
		}
	}
}

/// Parses `host:port` or `[ipv6]:port` with the default timeout.
impl FromStr for HostAddress {
	type Err = AddressParseError;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let error = |reason| AddressParseError {
			input: input.to_string(),
			reason,
		};
		let (host, port) = if let Some(rest) = input.strip_prefix('[') {
			let (host, rest) = rest.split_once(']').ok_or_else(|| error("unterminated '[' in IPv6 literal"))?;
			let port = rest.strip_prefix(':').ok_or_else(|| error("missing port"))?;
			(host, port)
		} else {
			input.rsplit_once(':').ok_or_else(|| error("missing port"))?
		};
		if host.is_empty() {
			return Err(error("missing host name"));
		}
		if host.contains(':') && !input.starts_with('[') {
			return Err(error("IPv6 literals must be enclosed in brackets"));
		}
		let port = port.parse::<u16>().map_err(|_| error("port is not a number between 0 and 65535"))?;
		Ok(Self::builder(port).hostname(host).build())
	}
}

/// Builder for [`HostAddress`].
#[derive(Debug, Clone)]
pub struct HostAddressBuilder {
	hostname: String,
	port: u16,
	connect_timeout: Duration,
}

impl HostAddressBuilder {
	/// Sets the host name or IP literal.
	#[must_use]
	pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
		self.hostname = hostname.into();
		self
	}

	/// Sets the connect timeout.
	#[must_use]
	pub fn connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	/// Finishes the address.
	pub fn build(self) -> HostAddress {
		HostAddress {
			hostname: self.hostname,
			port: self.port,
			connect_timeout: self.connect_timeout,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_defaults_to_localhost() {
		let address = HostAddress::builder(8080).build();
		assert_eq!(address.hostname(), "localhost");
		assert_eq!(address.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
		assert_eq!(address.to_string(), "localhost:8080");
	}

	#[test]
	fn parses_host_and_port() {
		let address: HostAddress = "example.org:443".parse().unwrap();
		assert_eq!(address.hostname(), "example.org");
		assert_eq!(address.port(), 443);
	}

	#[test]
	fn parses_bracketed_ipv6() {
		let address: HostAddress = "[::1]:22".parse().unwrap();
		assert_eq!(address.hostname(), "::1");
		assert_eq!(address.to_string(), "[::1]:22");
	}

	#[test]
	fn rejects_malformed_input() {
		for input in ["example.org", ":80", "host:http", "[::1:22", "::1:22", "host:70000"] {
			assert!(input.parse::<HostAddress>().is_err(), "{input:?} should be rejected");
		}
	}
}
