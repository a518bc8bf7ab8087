use clap::Parser;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn parses_path_subcommand_with_os() {
	let cli = Cli::try_parse_from(["eel", "path", "normalize", "C:\\a\\..\\b", "--os", "windows"]).unwrap();
	match cli.command {
		Command::Path { action, os } => {
			assert_eq!(os, Some(EelOs::Windows));
			assert_eq!(
				action,
				PathAction::Normalize {
					path: "C:\\a\\..\\b".to_string()
				}
			);
		}
		other => panic!("unexpected command {other:?}"),
	}
}

#[test]
fn os_defaults_to_host() {
	let cli = Cli::try_parse_from(["eel", "path", "parent", "/a/b"]).unwrap();
	assert!(matches!(cli.command, Command::Path { os: None, .. }));
	assert!(!cli.verbose);
}

#[test]
fn rejects_unknown_os() {
	assert!(Cli::try_parse_from(["eel", "path", "parse", "/a", "--os", "plan9"]).is_err());
}

#[test]
fn parses_name_index() {
	let cli = Cli::try_parse_from(["eel", "path", "name", "/a/b", "1"]).unwrap();
	match cli.command {
		Command::Path {
			action: PathAction::Name { path, index },
			..
		} => {
			assert_eq!(path, "/a/b");
			assert_eq!(index, 1);
		}
		other => panic!("unexpected command {other:?}"),
	}
}

#[test]
fn parses_connect_arguments() {
	let cli = Cli::try_parse_from(["eel", "-v", "connect", "localhost:8080", "--timeout-ms", "500"]).unwrap();
	assert!(cli.verbose);
	match cli.command {
		Command::Connect(args) => {
			assert_eq!(args.address, "localhost:8080");
			assert_eq!(args.timeout_ms, Some(500));
			assert_eq!(args.config, None);
		}
		other => panic!("unexpected command {other:?}"),
	}
}
