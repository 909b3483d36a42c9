//! Error type shared by every `PathTree` operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creation target is already occupied by a file or directory.
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Path is missing or has the wrong kind for the operation.
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Path is missing or refers to a directory where a file is required.
    #[error("invalid file: {}", .0.display())]
    InvalidFile(PathBuf),

    /// State file could not be opened, read or written.
    #[error("unable to access state file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
