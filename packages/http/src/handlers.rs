//! The three operations behind the routes.
//!
//! Handlers never fail: every store outcome becomes a [`Response`]. Which
//! status a store error maps to depends on the [`ErrorPolicy`].

use bytes::Bytes;
use tracing::{debug, warn};

use kvlite_store::{DigestFunction, HashedStore, StoreError};

use crate::config::ErrorPolicy;
use crate::response::Response;

/// Return the stored value for `key`, byte for byte.
pub fn fetch<D: DigestFunction>(
    store: &HashedStore<D>,
    key: &[u8],
    policy: ErrorPolicy,
) -> Response {
    match store.fetch(key) {
        Ok(Some(value)) => Response::ok(value),
        Ok(None) => {
            debug!(key = %String::from_utf8_lossy(key), "no record");
            Response::not_found()
        }
        Err(error) => store_failure(&error, policy),
    }
}

/// Decode `raw_value` and store it under `key`.
pub fn store<D: DigestFunction>(
    store: &HashedStore<D>,
    key: &[u8],
    raw_value: &[u8],
    policy: ErrorPolicy,
) -> Response {
    match store.store(key, raw_value) {
        Ok(ack) => {
            debug!(
                key = %String::from_utf8_lossy(key),
                digest = %ack.digest,
                len = ack.len,
                "stored"
            );
            let mut body = Vec::with_capacity(key.len() + 5);
            body.extend_from_slice(b"set ");
            body.extend_from_slice(key);
            body.push(b'\n');
            Response::ok(body)
        }
        Err(error) => store_failure(&error, policy),
    }
}

/// Serve the stored value inside an HTML form that submits back to `/set/{key}`.
pub fn edit_form<D: DigestFunction>(
    store: &HashedStore<D>,
    key: &[u8],
    policy: ErrorPolicy,
) -> Response {
    match store.fetch(key) {
        Ok(Some(content)) => Response::ok(render_edit_form(key, &content)),
        Ok(None) => Response::not_found(),
        Err(error) => store_failure(&error, policy),
    }
}

/// The key and the stored bytes go into the form as-is, without HTML escaping.
pub fn render_edit_form(key: &[u8], content: &[u8]) -> Bytes {
    let mut html = Vec::with_capacity(key.len() + content.len() + 160);
    html.extend_from_slice(b"<form action=\"/set/");
    html.extend_from_slice(key);
    html.extend_from_slice(b"\">");
    html.extend_from_slice(b"<textarea name=\"v\" rows=\"30\" cols=\"80\">");
    html.extend_from_slice(content);
    html.extend_from_slice(b"</textarea>");
    html.extend_from_slice(b"<input type=\"submit\" value=\"save\">");
    html.extend_from_slice(b"</form>");
    Bytes::from(html)
}

fn store_failure(error: &StoreError, policy: ErrorPolicy) -> Response {
    warn!(%error, "store operation failed");
    match policy {
        ErrorPolicy::Compatible => Response::not_found(),
        ErrorPolicy::Strict => Response::internal_error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn open_temp() -> (tempfile::TempDir, HashedStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HashedStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn render_edit_form_layout() {
        let html = render_edit_form(b"notes", b"hello");
        assert_eq!(
            &html[..],
            &b"<form action=\"/set/notes\"><textarea name=\"v\" rows=\"30\" cols=\"80\">hello</textarea><input type=\"submit\" value=\"save\"></form>"[..]
        );
    }

    #[test]
    fn fetch_returns_raw_value() {
        let (_dir, s) = open_temp();
        s.store_decoded("k", b"<b>raw</b>").unwrap();
        let r = fetch(&s, b"k", ErrorPolicy::Compatible);
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(&r.body[..], b"<b>raw</b>");
    }

    #[test]
    fn store_acknowledges_with_key() {
        let (_dir, s) = open_temp();
        let r = store(&s, b"k", b"a+b", ErrorPolicy::Compatible);
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(&r.body[..], b"set k\n");
        assert_eq!(&s.fetch("k").unwrap().unwrap()[..], b"a b");
    }

    #[test]
    fn edit_form_wraps_stored_value() {
        let (_dir, s) = open_temp();
        s.store_decoded("k", b"hello").unwrap();
        let r = edit_form(&s, b"k", ErrorPolicy::Compatible);
        let body = String::from_utf8(r.body.to_vec()).unwrap();
        assert!(body.contains("action=\"/set/k\""));
        assert!(body.contains(">hello</textarea>"));
    }

    #[test]
    fn missing_records_are_not_found() {
        let (_dir, s) = open_temp();
        for policy in [ErrorPolicy::Compatible, ErrorPolicy::Strict] {
            assert_eq!(fetch(&s, b"nope", policy).status, StatusCode::NOT_FOUND);
            assert_eq!(edit_form(&s, b"nope", policy).status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn write_failure_status_follows_policy() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        let s = HashedStore::open(&root).unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert_eq!(
            store(&s, b"k", b"v", ErrorPolicy::Compatible).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            store(&s, b"k", b"v", ErrorPolicy::Strict).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn raw_key_bytes_are_echoed() {
        let (_dir, s) = open_temp();
        let r = store(&s, b"caf\xe9", b"x", ErrorPolicy::Compatible);
        assert_eq!(&r.body[..], b"set caf\xe9\n");

        let r = edit_form(&s, b"caf\xe9", ErrorPolicy::Compatible);
        assert!(r.body.starts_with(b"<form action=\"/set/caf\xe9\">"));
    }
}
