use std::fmt;
use std::sync::Arc;

use crate::os::EelOs;
use crate::platform::EelPlatform;

const LOCAL_NAME: &str = "local";

/// Identity of the execution environment that owns a path.
///
/// Two absolute paths are only comparable when they share a descriptor: `/tmp`
/// inside a container is not `/tmp` on the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EelDescriptor {
	name: Arc<str>,
	platform: EelPlatform,
}

impl EelDescriptor {
	/// Creates a descriptor for a named environment.
	pub fn new(name: impl Into<Arc<str>>, platform: EelPlatform) -> Self {
		Self {
			name: name.into(),
			platform,
		}
	}

	/// Descriptor of the host this process runs on.
	pub fn local() -> Self {
		Self::new(LOCAL_NAME, EelPlatform::current())
	}

	/// Environment name, e.g. `local` or `docker:web`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Platform of the environment.
	pub const fn platform(&self) -> EelPlatform {
		self.platform
	}

	/// Path semantics family of the environment.
	pub const fn os(&self) -> EelOs {
		self.platform.os()
	}

	/// Returns true if this describes the host this process runs on.
	pub fn is_local(&self) -> bool {
		&*self.name == LOCAL_NAME && self.platform == EelPlatform::current()
	}
}

impl fmt::Display for EelDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.platform)
	}
}
