use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::decode::url_decode;
use crate::digest::{DigestFunction, Md5Digest};
use crate::StoreError;

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAck {
    /// Hex digest naming the record file.
    pub digest: String,
    /// Number of decoded bytes written.
    pub len: usize,
}

/// A directory of records, one file per key, named by the key's digest.
///
/// There is no in-process locking. Writes go to a temporary file in the root
/// and are renamed over the record, so a concurrent reader sees either the
/// previous value or the new one. The last rename wins.
pub struct HashedStore<D = Md5Digest> {
    root: PathBuf,
    digest: D,
}

impl HashedStore<Md5Digest> {
    /// Open (creating if needed) a store rooted at `root`, using MD5 names.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_digest(root, Md5Digest)
    }
}

impl<D: DigestFunction> HashedStore<D> {
    pub fn with_digest(root: impl AsRef<Path>, digest: D) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root).map_err(|error| StoreError::RootPathInvalid {
            path: root.clone(),
            error,
        })?;

        let attr = fs::metadata(&root).map_err(|error| StoreError::RootPathInvalid {
            path: root.clone(),
            error,
        })?;

        if !attr.is_dir() {
            return Err(StoreError::RootPathInvalid {
                path: root,
                error: io::Error::other("Root path must be a directory."),
            });
        }

        if attr.permissions().readonly() {
            return Err(StoreError::RootPathInvalid {
                path: root,
                error: io::Error::other("Root directory must be writable"),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(HashedStore { root, digest }),
            Err(error) => Err(StoreError::RootPathInvalid { path: root, error }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path of the record for `key`. Pure function of the key bytes.
    pub fn record_path(&self, key: impl AsRef<[u8]>) -> PathBuf {
        self.root.join(self.digest.hex_digest(key.as_ref()))
    }

    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        self.record_path(key).is_file()
    }

    /// Read the full contents of the record for `key`.
    ///
    /// Returns `Ok(None)` if no record exists.
    pub fn fetch(&self, key: impl AsRef<[u8]>) -> Result<Option<Bytes>, StoreError> {
        let key = key.as_ref();
        let path = self.record_path(key);
        debug!(key = %String::from_utf8_lossy(key), path = %path.display(), "fetch");

        match fs::read(&path) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StoreError::Read { path, error }),
        }
    }

    /// Decode a raw query value and write it as the record for `key`.
    pub fn store(&self, key: impl AsRef<[u8]>, raw_value: &[u8]) -> Result<StoreAck, StoreError> {
        let value = url_decode(raw_value);
        self.store_decoded(key, &value)
    }

    /// Write `value` verbatim as the record for `key`, replacing any previous one.
    ///
    /// Keys are arbitrary bytes; they need not be valid UTF-8.
    pub fn store_decoded(
        &self,
        key: impl AsRef<[u8]>,
        value: &[u8],
    ) -> Result<StoreAck, StoreError> {
        let key = key.as_ref();
        let digest = self.digest.hex_digest(key);
        let path = self.root.join(&digest);
        debug!(
            key = %String::from_utf8_lossy(key),
            path = %path.display(),
            len = value.len(),
            "store"
        );

        let write_error = |error: io::Error| StoreError::Write {
            path: path.clone(),
            error,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".kvlite-")
            .tempfile_in(&self.root)
            .map_err(write_error)?;
        tmp.write_all(value).map_err(write_error)?;
        tmp.flush().map_err(write_error)?;
        tmp.persist(&path).map_err(|e| write_error(e.error))?;

        Ok(StoreAck {
            digest,
            len: value.len(),
        })
    }
}
