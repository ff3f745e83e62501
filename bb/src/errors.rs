use std::error::Error as StdError;
use std::path::PathBuf;
use std::{fmt, io};

pub use bb_core::ConfigError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Cache(CacheError),
    /// There is no user cache directory to default to, usually because there is no home directory.
    NoCacheDir,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::Cache(err) => err.fmt(f),
            Error::NoCacheDir => {
                write!(f, "no default bookmark cache directory, the home directory is unknown")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Config(err) => err.source(),
            Error::Cache(err) => err.source(),
            Error::NoCacheDir => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        Error::Cache(err)
    }
}

/// A failure to access the bookmark cache. These are logged and never abort the operation that
/// triggered them.
#[derive(Debug)]
pub enum CacheError {
    Open { path: PathBuf, source: io::Error },
    Read { path: PathBuf, source: io::Error },
    Malformed { path: PathBuf, source: serde_json::Error },
    Write { path: PathBuf, source: io::Error },
    Remove { path: PathBuf, source: io::Error },
}

impl CacheError {
    pub fn path(&self) -> &PathBuf {
        match self {
            CacheError::Open { path, .. }
            | CacheError::Read { path, .. }
            | CacheError::Malformed { path, .. }
            | CacheError::Write { path, .. }
            | CacheError::Remove { path, .. } => path,
        }
    }

    /// Whether this is just a missing cache entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path().display();
        match self {
            CacheError::Open { source, .. } => {
                write!(f, "failed to create cache directory `{path}`: {source}")
            }
            CacheError::Read { source, .. } => write!(f, "failed to read `{path}`: {source}"),
            CacheError::Malformed { source, .. } => {
                write!(f, "malformed cache entry `{path}`: {source}")
            }
            CacheError::Write { source, .. } => write!(f, "failed to write `{path}`: {source}"),
            CacheError::Remove { source, .. } => write!(f, "failed to remove `{path}`: {source}"),
        }
    }
}

impl StdError for CacheError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CacheError::Open { source, .. }
            | CacheError::Read { source, .. }
            | CacheError::Write { source, .. }
            | CacheError::Remove { source, .. } => Some(source),
            CacheError::Malformed { source, .. } => Some(source),
        }
    }
}
