//! # kvlite-http
//!
//! A deliberately small HTTP/1.0 front end for [`kvlite_store::HashedStore`].
//!
//! Every connection carries exactly one request. Only the request line is
//! interpreted; header lines are read and thrown away, and there is never a
//! request body. The response is written and the connection closed.
//!
//! ## Routes
//!
//! | Target                 | Effect                                   |
//! |------------------------|------------------------------------------|
//! | `/get/{key}`           | raw stored bytes                         |
//! | `/set/{key}?v={value}` | decode and store `value`, ack `set {key}` |
//! | `/edit/{key}`          | HTML form that submits back to `/set/`   |
//! | anything else          | 404 page                                 |
//!
//! Prefixes match case-insensitively, in that order, so `/get/set/x` is a
//! fetch of the key `set/x`.
//!
//! ## Serving
//!
//! ```no_run
//! use kvlite_http::{Server, ServerConfig};
//!
//! let config = ServerConfig::new(4444).with_store_root("/var/kvlite/");
//! let server = Server::bind(config)?;
//! server.run()?;
//! # Ok::<(), kvlite_http::ServerError>(())
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use config::{Concurrency, ErrorPolicy, ServerConfig};
pub use error::ServerError;
pub use request::{parse_request, Request};
pub use response::Response;
pub use router::{Route, Router};
pub use server::{handle_stream, Server};
