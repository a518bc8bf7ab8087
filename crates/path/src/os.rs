use std::fmt;
use std::str::FromStr;

use crate::error::EelPathError;

/// Path semantics family of an execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EelOs {
	/// `/`-separated paths rooted at `/`.
	Posix,
	/// `\`-separated paths rooted at a drive letter or a UNC share.
	Windows,
}

impl EelOs {
	/// Returns the family of the host this process runs on.
	pub const fn current() -> Self {
		if cfg!(windows) { Self::Windows } else { Self::Posix }
	}

	/// Separator emitted when a path is turned into a string.
	pub const fn separator(self) -> char {
		match self {
			Self::Posix => '/',
			Self::Windows => '\\',
		}
	}

	/// Returns true if `c` separates segments on input.
	///
	/// Windows accepts both `\` and `/`.
	pub const fn is_separator(self, c: char) -> bool {
		match self {
			Self::Posix => c == '/',
			Self::Windows => c == '\\' || c == '/',
		}
	}

	/// Returns true if `c` may never appear inside a segment.
	pub(crate) const fn is_forbidden(self, c: char) -> bool {
		match self {
			Self::Posix => c == '\0',
			Self::Windows => (c as u32) < 0x20 || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'),
		}
	}

	/// Returns true if segments compare without regard to ASCII case.
	pub const fn is_case_insensitive(self) -> bool {
		matches!(self, Self::Windows)
	}

	/// Lowercase name used in messages and on the command line.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Posix => "posix",
			Self::Windows => "windows",
		}
	}
}

impl fmt::Display for EelOs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EelOs {
	type Err = EelPathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"posix" | "unix" | "linux" | "macos" | "darwin" => Ok(Self::Posix),
			"windows" | "win" => Ok(Self::Windows),
			_ => Err(EelPathError::UnknownOs(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn windows_accepts_both_separators() {
		assert!(EelOs::Windows.is_separator('\\'));
		assert!(EelOs::Windows.is_separator('/'));
		assert!(EelOs::Posix.is_separator('/'));
		assert!(!EelOs::Posix.is_separator('\\'));
	}

	#[test]
	fn forbidden_characters_depend_on_family() {
		assert!(EelOs::Posix.is_forbidden('\0'));
		assert!(!EelOs::Posix.is_forbidden(':'));
		assert!(EelOs::Windows.is_forbidden(':'));
		assert!(EelOs::Windows.is_forbidden('\u{1}'));
		assert!(!EelOs::Windows.is_forbidden(' '));
	}

	#[test]
	fn parses_family_names() {
		assert_eq!("Windows".parse::<EelOs>(), Ok(EelOs::Windows));
		assert_eq!("linux".parse::<EelOs>(), Ok(EelOs::Posix));
		assert!(matches!("plan9".parse::<EelOs>(), Err(EelPathError::UnknownOs(_))));
	}
}
