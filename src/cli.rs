//! Command-line arguments.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Re-encode site media under a byte budget and rewrite references to
/// renamed assets.
#[derive(Debug, Parser)]
#[command(name = "mediaopt", version, about)]
pub struct Cli {
    /// Image files or glob patterns to process [default: everything under the media root]
    pub paths: Vec<String>,
    /// Reprocess files even if the cache says they're up to date
    #[arg(long)]
    pub force: bool,
    /// Report what would be processed without changing anything
    #[arg(long)]
    pub dry_run: bool,
    /// Application root [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
    /// Additional configuration file, merged over `mediaopt.toml`
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

const VALUE_FLAGS: [&str; 2] = ["--root", "--config"];
const SWITCHES: [&str; 7] = ["--force", "--dry-run", "--verbose", "--help", "-h", "--version", "-V"];

/// Split raw arguments into those clap understands and unknown flags.
///
/// Unknown flags are dropped instead of being a hard error; the caller warns
/// about them. The first argument (the program name) is always kept, as is
/// everything after `--`.
pub fn partition_args(args: impl IntoIterator<Item = String>) -> (Vec<String>, Vec<String>) {
    let mut known = vec![];
    let mut unknown = vec![];
    let mut args = args.into_iter();
    known.extend(args.next());
    while let Some(arg) = args.next() {
        if arg == "--" {
            known.push(arg);
            known.extend(args.by_ref());
            break;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            known.push(arg);
            known.extend(args.next());
            continue;
        }
        let is_known = SWITCHES.contains(&arg.as_str())
            || VALUE_FLAGS.iter().any(|flag| arg.strip_prefix(flag).is_some_and(|rest| rest.starts_with('=')))
            || arg.strip_prefix('-').is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c == 'v'));
        match is_known || !arg.starts_with('-') || arg == "-" {
            true => known.push(arg),
            false => unknown.push(arg),
        }
    }
    (known, unknown)
}
