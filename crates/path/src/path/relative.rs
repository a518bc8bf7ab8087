use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::{comparison_key, ends_with_components, get_name, normalize_parts, parse_segments, segments_match, validate_segments};
use crate::error::{EelPathError, Result};
use crate::os::EelOs;
use crate::root::EelRoot;

/// A path without a root.
///
/// The empty relative path stands for the current directory and prints as
/// an empty string.
#[derive(Debug, Clone)]
pub struct RelativePath {
	os: EelOs,
	parts: Vec<String>,
}

impl RelativePath {
	/// The empty relative path.
	pub const fn empty(os: EelOs) -> Self {
		Self { os, parts: Vec::new() }
	}

	/// Parses a relative path.
	///
	/// Empty and whitespace-only input yields the empty path. Windows input
	/// may use `\` and `/` interchangeably; repeated separators collapse.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::Parse`] for rooted input or a segment with a
	/// forbidden character.
	pub fn parse(raw: &str, os: EelOs) -> Result<Self> {
		if raw.trim().is_empty() {
			return Ok(Self::empty(os));
		}
		let parse_error = |reason| EelPathError::Parse {
			raw: raw.to_string(),
			os,
			reason,
		};
		if raw.starts_with(|c| os.is_separator(c)) {
			return Err(parse_error("relative path must not start with a separator"));
		}
		if let Ok(Some(_)) = EelRoot::split_prefix(raw, os) {
			return Err(parse_error("relative path must not start with a drive prefix"));
		}
		let parts = parse_segments(raw, raw, os)?;
		Ok(Self { os, parts })
	}

	/// Builds a relative path from individual segments.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::InvalidSegment`] if a segment is empty, holds
	/// a separator, or holds a forbidden character.
	pub fn from_parts<I, S>(os: EelOs, parts: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let parts = validate_segments(parts, os)?;
		Ok(Self { os, parts })
	}

	/// OS family the path was built for.
	pub const fn os(&self) -> EelOs {
		self.os
	}

	/// Segments in order.
	pub fn parts(&self) -> &[String] {
		&self.parts
	}

	/// Returns true for the empty path.
	pub fn is_empty(&self) -> bool {
		self.parts.is_empty()
	}

	/// Number of segments.
	pub fn name_count(&self) -> usize {
		self.parts.len()
	}

	/// Returns the segment at `index`.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::IndexOutOfBounds`] past the last segment.
	pub fn get_name(&self, index: usize) -> Result<&str> {
		get_name(&self.parts, index)
	}

	/// Last segment, if any.
	pub fn file_name(&self) -> Option<&str> {
		self.parts.last().map(String::as_str)
	}

	/// Path without its last segment, or `None` for zero or one segment.
	pub fn parent(&self) -> Option<Self> {
		if self.parts.len() <= 1 {
			return None;
		}
		Some(Self {
			os: self.os,
			parts: self.parts[..self.parts.len() - 1].to_vec(),
		})
	}

	/// Appends a single segment.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::InvalidSegment`] if `name` is not one valid segment.
	pub fn child(&self, name: &str) -> Result<Self> {
		let mut parts = self.parts.clone();
		parts.extend(validate_segments([name], self.os)?);
		Ok(Self { os: self.os, parts })
	}

	/// Appends the segments of `other` verbatim; `..` and `.` are kept.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::InvalidSegment`] when `other` comes from a
	/// different OS family and one of its segments is not valid here.
	pub fn resolve(&self, other: &RelativePath) -> Result<Self> {
		let mut parts = self.parts.clone();
		if other.os == self.os {
			parts.extend(other.parts.iter().cloned());
		} else {
			parts.extend(validate_segments(other.parts.iter().cloned(), self.os)?);
		}
		Ok(Self { os: self.os, parts })
	}

	/// Drops `.` and folds `seg/..` pairs; leading `..` segments survive.
	#[must_use]
	pub fn normalize(&self) -> Self {
		Self {
			os: self.os,
			parts: normalize_parts(&self.parts, false),
		}
	}

	/// Literal suffix match on segments.
	pub fn ends_with(&self, suffix: &[&str]) -> bool {
		ends_with_components(self.parts.iter().map(|part| Cow::Borrowed(part.as_str())), suffix)
	}

	/// Literal segment prefix match.
	pub fn starts_with(&self, other: &RelativePath) -> bool {
		other.parts.len() <= self.parts.len()
			&& self.parts.iter().zip(&other.parts).all(|(left, right)| segments_match(left, right, self.os))
	}

	fn key(&self) -> Vec<String> {
		comparison_key(&self.parts, self.os, false)
	}
}

impl fmt::Display for RelativePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let separator = self.os.separator();
		for (index, part) in self.parts.iter().enumerate() {
			if index > 0 {
				write!(f, "{separator}")?;
			}
			f.write_str(part)?;
		}
		Ok(())
	}
}

impl PartialEq for RelativePath {
	fn eq(&self, other: &Self) -> bool {
		self.os == other.os && self.key() == other.key()
	}
}

impl Eq for RelativePath {}

impl Hash for RelativePath {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.os.hash(state);
		self.key().hash(state);
	}
}

impl PartialOrd for RelativePath {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for RelativePath {
	fn cmp(&self, other: &Self) -> Ordering {
		self.os.cmp(&other.os).then_with(|| self.key().cmp(&other.key()))
	}
}
