//! This module defines the code that files or updates the nvchecker tracking issue.
pub mod draft;
pub mod maintainers;
pub mod reconcile;

use std::env::VarError;
use std::io::Write;

use anyhow::{Context as _, Result};
use log::{debug, info};

use crate::commands::Opts;
use crate::error::Error;
use crate::github::GitHubTracker;
use crate::utils::split_repo_full_name;
use draft::{is_canonical_repository, IssueDraft};
use reconcile::{reconcile, Outcome};

const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// A context object that holds state for one notifier run
#[derive(Debug)]
pub struct Context {
    pub repository: String,
    pub access_token: String,
    pub opts: Opts,
}

fn required_env_var(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) | Err(VarError::NotPresent) => Err(Error::MissingEnvironment(name).into()),
        Err(e) => Err(e).with_context(|| format!("Reading {name}")),
    }
}

fn get_access_token(opts: &Opts) -> Result<String> {
    match &opts.access_token {
        Some(access_token) => Ok(access_token.clone()),
        None => required_env_var(GITHUB_TOKEN),
    }
}

/// Log records go to stderr as `[LEVEL file:line] message`; stdout only carries the result
pub fn init_logging(opts: &Opts) {
    env_logger::builder()
        .filter_level(opts.verbose.log_level_filter())
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}

/// Run the notifier
pub async fn cli(opts: Opts) -> Result<()> {
    init_logging(&opts);

    let repository = required_env_var(GITHUB_REPOSITORY)?;
    split_repo_full_name(&repository)?;
    let mention = is_canonical_repository(&repository);
    debug!("Operating on {repository}, mentions enabled: {mention}");

    let maintainers = maintainers::resolve(&opts.file, &opts.name)?;
    let draft = IssueDraft::new(
        &opts.name,
        &opts.oldver,
        &opts.newver,
        maintainers.as_ref(),
        mention,
    );

    let access_token = get_access_token(&opts)?;
    let context = Context {
        repository,
        access_token,
        opts,
    };
    run(&context, &draft).await
}

async fn run(context: &Context, draft: &IssueDraft) -> Result<()> {
    let tracker = GitHubTracker::new(&context.access_token)?;
    let outcome = reconcile(&tracker, &context.repository, draft)
        .await
        .with_context(|| format!("Reconciling issue for {}", context.opts.name))?;

    match outcome {
        Outcome::Unchanged { url } => info!("Issue already up to date: {url}"),
        Outcome::Updated { url } => println!("Updated issue: {url}"),
        Outcome::Created { url } => println!("Created issue: {url}"),
    }
    Ok(())
}
