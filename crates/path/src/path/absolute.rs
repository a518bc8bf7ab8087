use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use super::{
	RelativePath, comparison_key, ends_with_components, get_name, normalize_parts, parse_segments, segments_match,
	validate_segments,
};
use crate::descriptor::EelDescriptor;
use crate::error::{EelPathError, Result};
use crate::os::EelOs;
use crate::root::EelRoot;

/// A path with exactly one root, owned by an execution environment.
///
/// Segments are stored literally. Equality, hashing and ordering look at the
/// environment, the root and the normalised segments, so `/a/b/..` equals
/// `/a`; [`fmt::Display`] always reproduces the literal form.
#[derive(Debug, Clone)]
pub struct AbsolutePath {
	descriptor: EelDescriptor,
	root: EelRoot,
	parts: Vec<String>,
}

impl AbsolutePath {
	/// Parses an absolute path for the descriptor's OS family.
	///
	/// POSIX paths start with `/`. Windows paths start with a drive (`C:\`,
	/// `C:/` or a bare `C:`) or a UNC prefix (`\\server\share`, either
	/// separator).
	///
	/// # Errors
	///
	/// Returns [`EelPathError::Parse`] for relative input, malformed UNC
	/// prefixes, drive-relative input and segments with forbidden characters.
	pub fn parse(raw: &str, descriptor: &EelDescriptor) -> Result<Self> {
		let os = descriptor.os();
		let parse_error = |reason| EelPathError::Parse {
			raw: raw.to_string(),
			os,
			reason,
		};
		let (root, rest) = match EelRoot::split_prefix(raw, os) {
			Ok(Some(split)) => split,
			Ok(None) => return Err(parse_error("path is not absolute")),
			Err(reason) => return Err(parse_error(reason)),
		};
		let parts = parse_segments(raw, rest, os)?;
		Ok(Self {
			descriptor: descriptor.clone(),
			root,
			parts,
		})
	}

	/// Builds an absolute path from a root and individual segments.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::RootMismatch`] when the root belongs to another
	/// OS family and [`EelPathError::InvalidSegment`] for invalid segments.
	pub fn from_parts<I, S>(descriptor: &EelDescriptor, root: EelRoot, parts: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let os = descriptor.os();
		if root.os() != os {
			return Err(EelPathError::RootMismatch {
				root: root.label(),
				os,
			});
		}
		let parts = validate_segments(parts, os)?;
		Ok(Self {
			descriptor: descriptor.clone(),
			root,
			parts,
		})
	}

	/// Converts a host path into a path of the local environment.
	///
	/// # Errors
	///
	/// Fails for relative or non-UTF-8 paths.
	pub fn from_std_path(path: &Path) -> Result<Self> {
		let descriptor = EelDescriptor::local();
		let raw = path.to_str().ok_or_else(|| EelPathError::Parse {
			raw: path.to_string_lossy().into_owned(),
			os: descriptor.os(),
			reason: "path is not valid UTF-8",
		})?;
		Self::parse(raw, &descriptor)
	}

	/// Host path for paths of the local environment, `None` for remote ones.
	pub fn to_std_path(&self) -> Option<PathBuf> {
		self.descriptor.is_local().then(|| PathBuf::from(self.to_string()))
	}

	/// Environment owning the path.
	pub const fn descriptor(&self) -> &EelDescriptor {
		&self.descriptor
	}

	/// OS family of the owning environment.
	pub const fn os(&self) -> EelOs {
		self.descriptor.os()
	}

	/// Root token.
	pub const fn root_token(&self) -> &EelRoot {
		&self.root
	}

	/// The bare root as a path.
	pub fn root(&self) -> Self {
		Self {
			descriptor: self.descriptor.clone(),
			root: self.root.clone(),
			parts: Vec::new(),
		}
	}

	/// Returns true if the path has no segments past its root.
	pub fn is_root(&self) -> bool {
		self.parts.is_empty()
	}

	/// Segments after the root, in order.
	pub fn parts(&self) -> &[String] {
		&self.parts
	}

	/// Number of segments after the root.
	pub fn name_count(&self) -> usize {
		self.parts.len()
	}

	/// Returns the segment at `index`; the root is not indexed.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::IndexOutOfBounds`] past the last segment.
	pub fn get_name(&self, index: usize) -> Result<&str> {
		get_name(&self.parts, index)
	}

	/// Last segment, `None` for a bare root.
	pub fn file_name(&self) -> Option<&str> {
		self.parts.last().map(String::as_str)
	}

	/// Path without its last segment; `None` for a bare root.
	pub fn parent(&self) -> Option<Self> {
		let (_, init) = self.parts.split_last()?;
		Some(Self {
			descriptor: self.descriptor.clone(),
			root: self.root.clone(),
			parts: init.to_vec(),
		})
	}

	/// Appends a single segment.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::InvalidSegment`] if `name` is not one valid segment.
	pub fn child(&self, name: &str) -> Result<Self> {
		let mut path = self.clone();
		path.parts.extend(validate_segments([name], self.os())?);
		Ok(path)
	}

	/// Appends the segments of `other` verbatim; `..` and `.` are kept.
	///
	/// # Errors
	///
	/// Returns [`EelPathError::InvalidSegment`] when `other` comes from a
	/// different OS family and one of its segments is not valid here.
	pub fn resolve(&self, other: &RelativePath) -> Result<Self> {
		let mut path = self.clone();
		if other.os() == self.os() {
			path.parts.extend(other.parts().iter().cloned());
		} else {
			path.parts.extend(validate_segments(other.parts().iter().cloned(), self.os())?);
		}
		Ok(path)
	}

	/// Drops `.` and folds `seg/..` pairs; `..` at the root is discarded.
	#[must_use]
	pub fn normalize(&self) -> Self {
		Self {
			descriptor: self.descriptor.clone(),
			root: self.root.clone(),
			parts: normalize_parts(&self.parts, true),
		}
	}

	/// Literal suffix match; the root label (`/`, `C:`, `\\server\share`)
	/// is the first component.
	pub fn ends_with(&self, suffix: &[&str]) -> bool {
		let components = std::iter::once(Cow::Owned(self.root.label())).chain(self.parts.iter().map(|part| Cow::Borrowed(part.as_str())));
		ends_with_components(components, suffix)
	}

	/// Same environment, same root, and `other`'s segments form a prefix of ours.
	pub fn starts_with(&self, other: &AbsolutePath) -> bool {
		self.same_environment(other)
			&& self.root == other.root
			&& other.parts.len() <= self.parts.len()
			&& self.parts.iter().zip(&other.parts).all(|(left, right)| segments_match(left, right, self.os()))
	}

	/// Relative path leading from `self` to `other`.
	///
	/// Both paths are normalised first, so the result satisfies
	/// `self.resolve(&rel).normalize() == other.normalize()`.
	///
	/// # Errors
	///
	/// Fails when the paths belong to different environments or roots.
	pub fn relativize(&self, other: &AbsolutePath) -> Result<RelativePath> {
		if !self.same_environment(other) {
			return Err(EelPathError::DifferentEnvironments {
				left: self.descriptor.to_string(),
				right: other.descriptor.to_string(),
			});
		}
		if self.root != other.root {
			return Err(EelPathError::DifferentRoots {
				left: self.root.label(),
				right: other.root.label(),
			});
		}
		let os = self.os();
		let base = normalize_parts(&self.parts, true);
		let target = normalize_parts(&other.parts, true);
		let common = base
			.iter()
			.zip(&target)
			.take_while(|(left, right)| segments_match(left, right, os))
			.count();
		let ups = std::iter::repeat_n("..".to_string(), base.len() - common);
		RelativePath::from_parts(os, ups.chain(target[common..].iter().cloned()))
	}

	fn same_environment(&self, other: &AbsolutePath) -> bool {
		self.descriptor.name() == other.descriptor.name() && self.os() == other.os()
	}

	fn key(&self) -> Vec<String> {
		comparison_key(&self.parts, self.os(), true)
	}
}

impl fmt::Display for AbsolutePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let separator = self.os().separator();
		write!(f, "{}", self.root)?;
		let mut needs_separator = !self.root.ends_with_separator();
		for part in &self.parts {
			if needs_separator {
				write!(f, "{separator}")?;
			}
			f.write_str(part)?;
			needs_separator = true;
		}
		Ok(())
	}
}

impl PartialEq for AbsolutePath {
	fn eq(&self, other: &Self) -> bool {
		self.same_environment(other) && self.root == other.root && self.key() == other.key()
	}
}

impl Eq for AbsolutePath {}

impl Hash for AbsolutePath {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.descriptor.name().hash(state);
		self.os().hash(state);
		self.root.hash(state);
		self.key().hash(state);
	}
}

impl PartialOrd for AbsolutePath {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for AbsolutePath {
	fn cmp(&self, other: &Self) -> Ordering {
		self.descriptor
			.name()
			.cmp(other.descriptor.name())
			.then_with(|| self.os().cmp(&other.os()))
			.then_with(|| self.root.cmp(&other.root))
			.then_with(|| self.key().cmp(&other.key()))
	}
}
