use std::io;
use std::path::PathBuf;

/// Errors raised by [`HashedStore`](crate::HashedStore).
///
/// A missing record is not an error: reads return `Ok(None)` for that.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Store root ({path}) is invalid: {error}")]
    RootPathInvalid { path: PathBuf, error: io::Error },

    #[error("Record ({path}) could not be read: {error}")]
    Read { path: PathBuf, error: io::Error },

    #[error("Record ({path}) could not be written: {error}")]
    Write { path: PathBuf, error: io::Error },
}

impl StoreError {
    /// The file-system path the failed operation was working on.
    pub fn path(&self) -> &PathBuf {
        match self {
            StoreError::RootPathInvalid { path, .. }
            | StoreError::Read { path, .. }
            | StoreError::Write { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_path() {
        let e = StoreError::Write {
            path: PathBuf::from("/tmp/kvstore/abc"),
            error: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let display = format!("{}", e);
        assert!(display.contains("/tmp/kvstore/abc"));
        assert!(display.contains("could not be written"));
        assert!(display.contains("denied"));
        assert_eq!(e.path(), &PathBuf::from("/tmp/kvstore/abc"));
    }

    #[test]
    fn root_error_display() {
        let e = StoreError::RootPathInvalid {
            path: PathBuf::from("/nope"),
            error: io::Error::other("Root path must be a directory."),
        };
        assert!(format!("{}", e).contains("must be a directory"));
    }
}
