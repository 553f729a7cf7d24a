//! Command-line arguments for the `testdown` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "testdown",
    version,
    about = "Run the code block assertions embedded in Markdown documents."
)]
pub struct Args {
    /// Config file to read instead of ./testdown.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory that test paths are relative to.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load documents and check every assertion with an output command.
    Run {
        /// File or directory to load, relative to the root.
        path: Option<String>,

        /// Also print the logs of scopes that passed.
        #[arg(short, long)]
        verbose: bool,

        /// Print the report tree as JSON.
        #[arg(long)]
        json: bool,

        /// Output command and its arguments; receives each input on stdin.
        #[arg(last = true)]
        command: Vec<String>,
    },
    /// Print the tests that would run.
    List {
        /// File or directory to load, relative to the root.
        path: Option<String>,

        /// Print the loaded tree as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_trailing_command() {
        let args = Args::parse_from(["testdown", "--root", "docs", "run", "guide", "--", "jq", "."]);

        assert_eq!(args.root, Some(PathBuf::from("docs")));
        let Command::Run {
            path,
            verbose,
            json,
            command,
        } = args.command
        else {
            panic!("expected run");
        };
        assert_eq!(path.as_deref(), Some("guide"));
        assert!(!verbose);
        assert!(!json);
        assert_eq!(command, vec!["jq", "."]);
    }

    #[test]
    fn test_list_defaults() {
        let args = Args::parse_from(["testdown", "list", "--json"]);

        assert_eq!(args.config, None);
        let Command::List { path, json } = args.command else {
            panic!("expected list");
        };
        assert_eq!(path, None);
        assert!(json);
    }
}
