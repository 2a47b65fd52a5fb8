use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

/// The `github_account` value of a package: one handle or a list of handles
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Maintainers {
    Single(String),
    Multiple(Vec<String>),
}

impl Maintainers {
    /// The handles in document order
    pub fn handles(&self) -> Vec<&str> {
        match self {
            Maintainers::Single(handle) => vec![handle.as_str()],
            Maintainers::Multiple(handles) => handles.iter().map(String::as_str).collect(),
        }
    }
}

/// The part of a package entry we care about. Other keys are ignored.
#[derive(Debug, Deserialize)]
struct PackageEntry {
    github_account: Option<Maintainers>,
}

/// Read the maintainer file at `path` and look up the maintainers of `package`.
///
/// Returns `Ok(None)` when the package exists but has no `github_account`.
pub fn resolve(path: &Path, package: &str) -> Result<Option<Maintainers>> {
    debug!("Reading maintainer file {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&contents).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    match table.get(package) {
        Some(value) => {
            let entry: PackageEntry =
                value
                    .clone()
                    .try_into()
                    .map_err(|source| Error::InvalidMaintainers {
                        package: package.to_string(),
                        source,
                    })?;
            debug!("Maintainers of {package}: {:?}", entry.github_account);
            Ok(entry.github_account)
        }
        None => Err(Error::PackageNotFound {
            package: package.to_string(),
            path: path.to_path_buf(),
        }),
    }
}
