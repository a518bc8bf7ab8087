use std::fmt;

use crate::os::EelOs;

/// CPU architecture of an execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EelArch {
	/// 64-bit x86.
	X86_64,
	/// 64-bit ARM.
	Aarch64,
	/// 32-bit x86.
	X86,
	/// 32-bit ARM.
	Arm,
	/// Anything else.
	Unknown,
}

impl EelArch {
	/// Returns the architecture this process was compiled for.
	pub fn current() -> Self {
		match std::env::consts::ARCH {
			"x86_64" => Self::X86_64,
			"aarch64" => Self::Aarch64,
			"x86" => Self::X86,
			"arm" => Self::Arm,
			_ => Self::Unknown,
		}
	}

	/// Short lowercase name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::X86_64 => "x86_64",
			Self::Aarch64 => "aarch64",
			Self::X86 => "x86",
			Self::Arm => "arm",
			Self::Unknown => "unknown",
		}
	}
}

/// Operating system flavour and architecture of an execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EelPlatform {
	/// Linux, including containers and WSL distributions.
	Linux(EelArch),
	/// macOS.
	Darwin(EelArch),
	/// FreeBSD.
	FreeBsd(EelArch),
	/// Windows.
	Windows(EelArch),
}

impl EelPlatform {
	/// Describes the host this process runs on.
	pub fn current() -> Self {
		let arch = EelArch::current();
		match std::env::consts::OS {
			"windows" => Self::Windows(arch),
			"macos" => Self::Darwin(arch),
			"freebsd" => Self::FreeBsd(arch),
			_ => Self::Linux(arch),
		}
	}

	/// Generic platform of the given family on the host architecture.
	pub fn generic(os: EelOs) -> Self {
		let arch = EelArch::current();
		match os {
			EelOs::Posix => Self::Linux(arch),
			EelOs::Windows => Self::Windows(arch),
		}
	}

	/// Path semantics family of this platform.
	pub const fn os(self) -> EelOs {
		match self {
			Self::Windows(_) => EelOs::Windows,
			Self::Linux(_) | Self::Darwin(_) | Self::FreeBsd(_) => EelOs::Posix,
		}
	}

	/// CPU architecture.
	pub const fn arch(self) -> EelArch {
		match self {
			Self::Linux(arch) | Self::Darwin(arch) | Self::FreeBsd(arch) | Self::Windows(arch) => arch,
		}
	}

	const fn flavour(self) -> &'static str {
		match self {
			Self::Linux(_) => "linux",
			Self::Darwin(_) => "darwin",
			Self::FreeBsd(_) => "freebsd",
			Self::Windows(_) => "windows",
		}
	}
}

impl fmt::Display for EelPlatform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.flavour(), self.arch().as_str())
	}
}
