//! kvlite-store: hash-indexed file storage
//!
//! Every key maps to exactly one file under the store root. The file name is
//! the lowercase hex digest of the key, so the key itself is never written to
//! disk and no index is kept: the mapping is recomputed on every access.
//!
//! ```text
//! key "greeting"  --md5-->  /tmp/kvstore/<32 hex chars>   (contents: raw value)
//! ```
//!
//! # Example
//!
//! ```rust
//! use kvlite_store::HashedStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = HashedStore::open(dir.path()).unwrap();
//!
//! // Values arrive percent-encoded, straight from the query string.
//! store.store("greeting", b"hello+world%21").unwrap();
//!
//! let value = store.fetch("greeting").unwrap().unwrap();
//! assert_eq!(&value[..], b"hello world!");
//! assert!(store.fetch("missing").unwrap().is_none());
//! ```

pub use bytes::Bytes;

pub mod decode;
pub mod digest;
mod error;
mod hashed_store;

pub use decode::url_decode;
pub use digest::{DigestFunction, Md5Digest, DIGEST_HEX_LEN};
pub use error::StoreError;
pub use hashed_store::{HashedStore, StoreAck};
