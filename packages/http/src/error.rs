use std::net::SocketAddr;

use kvlite_store::StoreError;

/// Process-fatal failures. Per-request problems never become a `ServerError`;
/// they are turned into a response and logged.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("accept: {0}")]
    Accept(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
