//! `eel path`: exercises the path model on the command line.

use std::fmt::Write as _;

use anyhow::{Context, bail};
use eel_path::{EelDescriptor, EelOs, EelPath, EelPlatform, RelativePath};

use crate::cli::PathAction;

/// Descriptor whose rules apply to command-line paths.
///
/// The host descriptor when `os` matches the host, a synthetic one otherwise.
pub fn descriptor_for(os: Option<EelOs>) -> EelDescriptor {
	match os {
		Some(os) if os != EelOs::current() => EelDescriptor::new("cli", EelPlatform::generic(os)),
		_ => EelDescriptor::local(),
	}
}

/// Runs `action` and returns what it prints.
pub fn run(action: &PathAction, descriptor: &EelDescriptor) -> anyhow::Result<String> {
	let parse = |raw: &str| EelPath::parse(raw, descriptor).with_context(|| format!("cannot parse {raw:?}"));

	let output = match action {
		PathAction::Normalize { path } => parse(path)?.normalize().to_string(),
		PathAction::Parse { path } => describe(&parse(path)?),
		PathAction::Resolve { base, other } => {
			let other = RelativePath::parse(other, descriptor.os())
				.with_context(|| format!("{other:?} is not a relative path"))?;
			parse(base)?.resolve(&other).context("cannot resolve")?.to_string()
		}
		PathAction::Parent { path } => match parse(path)?.parent() {
			Some(parent) => parent.to_string(),
			None => bail!("{path:?} has no parent"),
		},
		PathAction::Name { path, index } => parse(path)?.get_name(*index)?.to_string(),
	};
	tracing::debug!(?action, %output, "path command finished");
	Ok(output)
}

fn describe(path: &EelPath) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "os: {}", path.os());
	match path {
		EelPath::Absolute(path) => {
			let _ = writeln!(out, "kind: absolute");
			let _ = writeln!(out, "environment: {}", path.descriptor());
			let _ = writeln!(out, "root: {}", path.root_token());
		}
		EelPath::Relative(_) => {
			let _ = writeln!(out, "kind: relative");
		}
	}
	for (index, part) in path.parts().iter().enumerate() {
		let _ = writeln!(out, "{index}: {part}");
	}
	let _ = write!(out, "display: {path}");
	out
}
