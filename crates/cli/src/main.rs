//! The `eel` binary.
//!
//! Front end for the path model and local tunnels:
//! - `eel path ...` parses and manipulates environment paths
//! - `eel connect host:port` relays stdin and stdout through a tunnel

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	// Logs go to stderr; stdout carries command output and relayed bytes.
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if cli.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.with_writer(std::io::stderr)
		.finish();

	tracing::subscriber::set_global_default(subscriber)?;

	match &cli.command {
		Command::Path { action, os } => {
			let descriptor = commands::path::descriptor_for(*os);
			println!("{}", commands::path::run(action, &descriptor)?);
		}
		Command::Connect(args) => commands::connect::run(args).await?,
	}

	Ok(())
}
