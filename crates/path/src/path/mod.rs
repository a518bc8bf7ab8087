use std::borrow::Cow;
use std::fmt;

use crate::descriptor::EelDescriptor;
use crate::error::{EelPathError, Result};
use crate::os::EelOs;
use crate::root::EelRoot;

mod absolute;
mod relative;

pub use absolute::AbsolutePath;
pub use relative::RelativePath;

/// A path whose kind was decided by parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EelPath {
	/// A path with a root.
	Absolute(AbsolutePath),
	/// A path without a root.
	Relative(RelativePath),
}

impl EelPath {
	/// Parses `raw` as absolute when it carries a root for the descriptor's
	/// OS family, and as relative otherwise.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::Parse`] when the string is malformed for the
	/// OS family, e.g. a UNC prefix without a share name.
	pub fn parse(raw: &str, descriptor: &EelDescriptor) -> Result<Self> {
		let os = descriptor.os();
		match EelRoot::split_prefix(raw, os) {
			Ok(Some(_)) | Err(_) => AbsolutePath::parse(raw, descriptor).map(Self::Absolute),
			Ok(None) => RelativePath::parse(raw, os).map(Self::Relative),
		}
	}

	/// OS family of the path.
	pub fn os(&self) -> EelOs {
		match self {
			Self::Absolute(path) => path.os(),
			Self::Relative(path) => path.os(),
		}
	}

	/// Returns true for [`EelPath::Absolute`].
	pub const fn is_absolute(&self) -> bool {
		matches!(self, Self::Absolute(_))
	}

	/// Segments of the path, root excluded.
	pub fn parts(&self) -> &[String] {
		match self {
			Self::Absolute(path) => path.parts(),
			Self::Relative(path) => path.parts(),
		}
	}

	/// See [`AbsolutePath::normalize`] and [`RelativePath::normalize`].
	#[must_use]
	pub fn normalize(&self) -> Self {
		match self {
			Self::Absolute(path) => Self::Absolute(path.normalize()),
			Self::Relative(path) => Self::Relative(path.normalize()),
		}
	}

	/// See [`AbsolutePath::parent`] and [`RelativePath::parent`].
	pub fn parent(&self) -> Option<Self> {
		match self {
			Self::Absolute(path) => path.parent().map(Self::Absolute),
			Self::Relative(path) => path.parent().map(Self::Relative),
		}
	}

	/// Returns the segment at `index`, root excluded.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::IndexOutOfBounds`] past the last segment.
	pub fn get_name(&self, index: usize) -> Result<&str> {
		get_name(self.parts(), index)
	}

	/// Appends `other` without normalising.
	///
	/// # Errors
	///
	/// Fails when a segment of `other` is not valid for this path's OS family.
	pub fn resolve(&self, other: &RelativePath) -> Result<Self> {
		match self {
			Self::Absolute(path) => path.resolve(other).map(Self::Absolute),
			Self::Relative(path) => path.resolve(other).map(Self::Relative),
		}
	}
}

impl fmt::Display for EelPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Absolute(path) => path.fmt(f),
			Self::Relative(path) => path.fmt(f),
		}
	}
}

impl From<AbsolutePath> for EelPath {
	fn from(path: AbsolutePath) -> Self {
		Self::Absolute(path)
	}
}

impl From<RelativePath> for EelPath {
	fn from(path: RelativePath) -> Self {
		Self::Relative(path)
	}
}

/// Splits the remainder of a path string into its non-empty segments.
fn split_segments(rest: &str, os: EelOs) -> impl Iterator<Item = &str> {
	rest.split(move |c| os.is_separator(c)).filter(|segment| !segment.is_empty())
}

/// Checks that `segment` is a single valid name.
fn check_segment(segment: &str, os: EelOs) -> std::result::Result<(), &'static str> {
	if segment.is_empty() {
		return Err("segment is empty");
	}
	if segment.chars().any(|c| os.is_separator(c)) {
		return Err("segment contains a path separator");
	}
	if segment.chars().any(|c| os.is_forbidden(c)) {
		return Err("segment contains a forbidden character");
	}
	Ok(())
}

fn parse_segments(raw: &str, rest: &str, os: EelOs) -> Result<Vec<String>> {
	split_segments(rest, os)
		.map(|segment| {
			check_segment(segment, os).map(|()| segment.to_string()).map_err(|reason| EelPathError::Parse {
				raw: raw.to_string(),
				os,
				reason,
			})
		})
		.collect()
}

fn validate_segments<I, S>(segments: I, os: EelOs) -> Result<Vec<String>>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	segments
		.into_iter()
		.map(|segment| {
			let segment = segment.into();
			match check_segment(&segment, os) {
				Ok(()) => Ok(segment),
				Err(reason) => Err(EelPathError::InvalidSegment { segment, os, reason }),
			}
		})
		.collect()
}

fn get_name(parts: &[String], index: usize) -> Result<&str> {
	parts.get(index).map(String::as_str).ok_or(EelPathError::IndexOutOfBounds {
		index,
		count: parts.len(),
	})
}

/// Folds `.` and `seg/..` left to right.
///
/// A `..` with nothing left to remove is kept for relative paths and
/// dropped for rooted ones.
fn normalize_parts(parts: &[String], rooted: bool) -> Vec<String> {
	let mut out: Vec<String> = Vec::with_capacity(parts.len());
	for part in parts {
		match part.as_str() {
			"." => {}
			".." => match out.last().map(String::as_str) {
				Some("..") | None => {
					if !rooted {
						out.push(part.clone());
					}
				}
				Some(_) => {
					out.pop();
				}
			},
			_ => out.push(part.clone()),
		}
	}
	out
}

/// Normalised segments in the form used for equality, hashing and ordering.
fn comparison_key(parts: &[String], os: EelOs, rooted: bool) -> Vec<String> {
	let mut key = normalize_parts(parts, rooted);
	if os.is_case_insensitive() {
		key.iter_mut().for_each(|part| part.make_ascii_lowercase());
	}
	key
}

fn segments_match(left: &str, right: &str, os: EelOs) -> bool {
	if os.is_case_insensitive() { left.eq_ignore_ascii_case(right) } else { left == right }
}

fn ends_with_components<'a>(components: impl DoubleEndedIterator<Item = Cow<'a, str>>, suffix: &[&str]) -> bool {
	let mut components = components.rev();
	for expected in suffix.iter().rev() {
		match components.next() {
			Some(actual) if actual == *expected => {}
			_ => return false,
		}
	}
	true
}
