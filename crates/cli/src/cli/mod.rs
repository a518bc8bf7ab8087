//! CLI schema for the eel binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eel_path::EelOs;

#[derive(Parser, Debug)]
#[command(name = "eel")]
#[command(about = "Execution-environment paths and tunnels")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Inspect and manipulate environment paths
	Path {
		/// Path operation.
		#[command(subcommand)]
		action: PathAction,

		/// OS family whose path rules apply (posix or windows); defaults to the host
		#[arg(long, global = true, value_name = "OS")]
		os: Option<EelOs>,
	},
	/// Open a tunnel to host:port and relay stdin and stdout through it
	Connect(ConnectArgs),
}

/// Path operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PathAction {
	/// Print the normalized form of a path
	Normalize {
		/// Path to normalize.
		path: String,
	},
	/// Print how a path is decomposed
	Parse {
		/// Path to parse.
		path: String,
	},
	/// Append a relative path to a base path without normalizing
	Resolve {
		/// Base path, absolute or relative.
		base: String,
		/// Relative path to append.
		other: String,
	},
	/// Print the parent of a path
	Parent {
		/// Path whose parent to print.
		path: String,
	},
	/// Print the segment at an index (the root is not indexed)
	Name {
		/// Path to index into.
		path: String,
		/// Zero-based segment index.
		index: usize,
	},
}

/// Arguments of `eel connect`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConnectArgs {
	/// Target as host:port or [ipv6]:port
	#[arg(value_name = "HOST:PORT")]
	pub address: String,

	/// Connect timeout in milliseconds; overrides the configuration
	#[arg(long, value_name = "MS")]
	pub timeout_ms: Option<u64>,

	/// Tunnel configuration file (defaults to the user config dir)
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests;
