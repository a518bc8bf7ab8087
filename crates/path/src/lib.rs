//! Path model for local and remote execution environments.
//!
//! Paths are parsed against the operating system family of the environment
//! that owns them, so a Windows path can be manipulated on a Linux host and
//! vice versa. Values are immutable: every manipulation returns a new path.

/// Environment identity attached to absolute paths.
pub mod descriptor;
/// Error types for parsing and manipulating paths.
pub mod error;
/// Operating system families and their separator rules.
pub mod os;
/// Absolute and relative path values.
pub mod path;
/// Finer platform descriptions (OS flavour and CPU architecture).
pub mod platform;
/// Root tokens of absolute paths.
pub mod root;

pub use descriptor::EelDescriptor;
pub use error::{EelPathError, Result};
pub use os::EelOs;
pub use path::{AbsolutePath, EelPath, RelativePath};
pub use platform::{EelArch, EelPlatform};
pub use root::EelRoot;
