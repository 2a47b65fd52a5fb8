//! This module defines the command-line arguments for nvchecker-issue.
use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

/// Long flags that nvchecker hooks pass with a single leading dash
const SINGLE_DASH_FLAGS: [&str; 4] = ["name", "newver", "oldver", "file"];

/// The top level clap parser and CLI arguments
#[derive(Parser, Debug)]
#[command(name = "nvchecker-issue")]
#[command(version = clap::crate_version!())]
#[command(about = "Create or update a GitHub issue when nvchecker finds a new version")]
pub struct Opts {
    #[arg(long = "name", help = "Package name")]
    pub name: String,

    #[arg(long = "newver", help = "New upstream version")]
    pub newver: String,

    #[arg(long = "oldver", default_value = "", help = "Previous version")]
    pub oldver: String,

    #[arg(long = "file", help = "TOML file mapping packages to GitHub accounts")]
    pub file: PathBuf,

    #[arg(long = "access-token", help = "GitHub access token, defaults to GITHUB_TOKEN")]
    pub access_token: Option<String>,

    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

impl Opts {
    /// Parse options from the process arguments, accepting `-name` as well as `--name`
    pub fn parse_normalized() -> Opts {
        Opts::parse_from(normalize_args(std::env::args_os()))
    }
}

/// Rewrite `-name value` and `-name=value` into the `--name` form clap expects.
/// Anything else is passed through untouched.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if is_single_dash_flag(s) => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}

fn is_single_dash_flag(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        Some(rest) if !rest.starts_with('-') => {
            let flag = rest.split_once('=').map_or(rest, |(flag, _)| flag);
            SINGLE_DASH_FLAGS.contains(&flag)
        }
        _ => false,
    }
}
