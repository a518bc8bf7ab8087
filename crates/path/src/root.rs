use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::os::EelOs;

/// Root token of an absolute path.
///
/// Drive letters and UNC names keep the case they were written with but
/// compare case-insensitively.
#[derive(Debug, Clone)]
pub enum EelRoot {
	/// The POSIX root `/`.
	Posix,
	/// A Windows drive such as `C:\`.
	Drive(char),
	/// A Windows UNC share such as `\\server\share`.
	Unc {
		/// Host part of the prefix.
		server: String,
		/// Share part of the prefix.
		share: String,
	},
}

impl EelRoot {
	/// OS family this root belongs to.
	pub const fn os(&self) -> EelOs {
		match self {
			Self::Posix => EelOs::Posix,
			Self::Drive(_) | Self::Unc { .. } => EelOs::Windows,
		}
	}

	/// The root as a single leading component: `/`, `C:` or `\\server\share`.
	pub fn label(&self) -> String {
		match self {
			Self::Posix => "/".to_string(),
			Self::Drive(letter) => format!("{letter}:"),
			Self::Unc { server, share } => format!(r"\\{server}\{share}"),
		}
	}

	/// Returns true if the string form already ends with a separator.
	pub(crate) const fn ends_with_separator(&self) -> bool {
		!matches!(self, Self::Unc { .. })
	}

	/// Splits a root off the front of `raw`.
	///
	/// Returns `Ok(None)` when `raw` carries no root at all and an error
	/// reason when it starts like a root but is malformed.
	pub(crate) fn split_prefix(raw: &str, os: EelOs) -> Result<Option<(Self, &str)>, &'static str> {
		match os {
			EelOs::Posix => Ok(raw.strip_prefix('/').map(|rest| (Self::Posix, rest))),
			EelOs::Windows => split_windows_prefix(raw),
		}
	}

	fn sort_key(&self) -> (u8, String, String) {
		match self {
			Self::Posix => (0, String::new(), String::new()),
			Self::Drive(letter) => (1, letter.to_ascii_uppercase().to_string(), String::new()),
			Self::Unc { server, share } => (2, server.to_ascii_lowercase(), share.to_ascii_lowercase()),
		}
	}
}

fn split_windows_prefix(raw: &str) -> Result<Option<(EelRoot, &str)>, &'static str> {
	let os = EelOs::Windows;
	let mut chars = raw.chars();
	match (chars.next(), chars.next()) {
		(Some(a), Some(b)) if os.is_separator(a) && os.is_separator(b) => {
			let rest = &raw[2..];
			let server_end = rest.find(|c| os.is_separator(c)).ok_or("UNC prefix is missing a share name")?;
			let server = &rest[..server_end];
			if server.is_empty() {
				return Err("UNC prefix is missing a server name");
			}
			let rest = &rest[server_end + 1..];
			let share_end = rest.find(|c| os.is_separator(c)).unwrap_or(rest.len());
			let share = &rest[..share_end];
			if share.is_empty() {
				return Err("UNC prefix is missing a share name");
			}
			if server.chars().chain(share.chars()).any(|c| os.is_forbidden(c)) {
				return Err("UNC prefix contains a forbidden character");
			}
			let root = EelRoot::Unc {
				server: server.to_string(),
				share: share.to_string(),
			};
			Ok(Some((root, &rest[share_end..])))
		}
		(Some(a), _) if os.is_separator(a) => Err("rooted path has no drive letter or UNC prefix"),
		(Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
			let rest = &raw[2..];
			match rest.chars().next() {
				None => Ok(Some((EelRoot::Drive(letter), rest))),
				Some(c) if os.is_separator(c) => Ok(Some((EelRoot::Drive(letter), rest))),
				Some(_) => Err("drive-relative paths are not supported"),
			}
		}
		_ => Ok(None),
	}
}

impl fmt::Display for EelRoot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Posix => f.write_str("/"),
			Self::Drive(letter) => write!(f, r"{letter}:\"),
			Self::Unc { server, share } => write!(f, r"\\{server}\{share}"),
		}
	}
}

impl PartialEq for EelRoot {
	fn eq(&self, other: &Self) -> bool {
		self.sort_key() == other.sort_key()
	}
}

impl Eq for EelRoot {}

impl Hash for EelRoot {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.sort_key().hash(state);
	}
}

impl PartialOrd for EelRoot {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for EelRoot {
	fn cmp(&self, other: &Self) -> Ordering {
		self.sort_key().cmp(&other.sort_key())
	}
}
