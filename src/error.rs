//! Error types for the notifier.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The broad category of a failure. Every category is fatal for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Environment,
    Remote,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Environment => write!(f, "environment"),
            ErrorKind::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} environment variable is not set")]
    MissingEnvironment(&'static str),

    #[error("Invalid repository name: {0}")]
    InvalidRepository(String),

    #[error("Failed to open maintainer file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse maintainer file {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Package {package} not found in {}", .path.display())]
    PackageNotFound { package: String, path: PathBuf },

    #[error("Invalid github_account for package {package}")]
    InvalidMaintainers {
        package: String,
        source: toml::de::Error,
    },

    #[error("GitHub API request failed")]
    GitHub(#[from] octocrab::Error),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("GraphQL response is missing {0}")]
    MissingData(&'static str),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingEnvironment(_) | Error::InvalidRepository(_) => ErrorKind::Environment,
            Error::ConfigRead { .. }
            | Error::ConfigParse { .. }
            | Error::PackageNotFound { .. }
            | Error::InvalidMaintainers { .. } => ErrorKind::Configuration,
            Error::GitHub(_) | Error::GraphQl(_) | Error::MissingData(_) => ErrorKind::Remote,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::MissingEnvironment("GITHUB_TOKEN").kind(),
            ErrorKind::Environment
        );
        assert_eq!(
            Error::PackageNotFound {
                package: "foo".to_string(),
                path: PathBuf::from("overlay.toml"),
            }
            .kind(),
            ErrorKind::Configuration
        );
        assert_eq!(Error::GraphQl("boom".to_string()).kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_wrapped_errors_do_not_repeat_their_source() {
        let err = Error::ConfigRead {
            path: PathBuf::from("missing.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(err.to_string(), "Failed to open maintainer file missing.toml");

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain, "Failed to open maintainer file missing.toml: No such file");
        assert_eq!(chain.matches("No such file").count(), 1);
    }

    #[test]
    fn test_missing_environment_message() {
        assert_eq!(
            Error::MissingEnvironment("GITHUB_REPOSITORY").to_string(),
            "GITHUB_REPOSITORY environment variable is not set"
        );
    }
}
