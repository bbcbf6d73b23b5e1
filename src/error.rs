use ron::error::SpannedError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    /// The string does not match the `ll[_RR][@variant]` grammar.
    #[error("invalid locale identifier: '{0}'")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum BundleError {
    /// Filesystem error while reading a resource file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resource file exists but cannot be parsed. Fatal for the whole
    /// locale: a partially loaded translation set is worse than a failure.
    #[error("RON parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SpannedError,
    },
}
