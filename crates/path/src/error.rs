//! Error types for path parsing and manipulation.

use thiserror::Error;

use crate::os::EelOs;

/// Errors produced by the path model.
///
/// Every variant is a synchronous failure reported to the caller of the
/// operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EelPathError {
	/// The input string is not a well-formed path for the OS family.
	#[error("cannot parse {raw:?} as a {os} path: {reason}")]
	Parse {
		/// The rejected input.
		raw: String,
		/// The OS family the input was parsed for.
		os: EelOs,
		/// What made the input malformed.
		reason: &'static str,
	},

	/// A segment passed to a builder or `resolve` is not a single valid name.
	#[error("invalid {os} path segment {segment:?}: {reason}")]
	InvalidSegment {
		/// The rejected segment.
		segment: String,
		/// The OS family the segment was validated for.
		os: EelOs,
		/// What made the segment invalid.
		reason: &'static str,
	},

	/// A segment index is outside the path.
	#[error("index {index} is out of bounds for a path with {count} names")]
	IndexOutOfBounds {
		/// The requested index.
		index: usize,
		/// Number of names in the path.
		count: usize,
	},

	/// Two paths belong to different environments.
	#[error("paths belong to different environments: {left} and {right}")]
	DifferentEnvironments {
		/// Environment of the receiver.
		left: String,
		/// Environment of the argument.
		right: String,
	},

	/// Two absolute paths have different roots.
	#[error("paths have different roots: {left} and {right}")]
	DifferentRoots {
		/// Root of the receiver.
		left: String,
		/// Root of the argument.
		right: String,
	},

	/// A root token does not belong to the environment's OS family.
	#[error("root {root} cannot be used in a {os} environment")]
	RootMismatch {
		/// The offending root.
		root: String,
		/// OS family of the environment.
		os: EelOs,
	},

	/// An OS family name was not recognised.
	#[error("unknown operating system family: {0}")]
	UnknownOs(String),
}

/// Result type for path operations.
pub type Result<T> = std::result::Result<T, EelPathError>;
