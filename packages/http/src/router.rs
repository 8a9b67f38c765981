use tracing::debug;

use kvlite_store::{DigestFunction, HashedStore, Md5Digest};

use crate::config::ErrorPolicy;
use crate::handlers;
use crate::request::Request;
use crate::response::Response;

const GET_PREFIX: &[u8] = b"/get/";
const SET_PREFIX: &[u8] = b"/set/";
const EDIT_PREFIX: &[u8] = b"/edit/";

/// What a request target asks for.
///
/// Keys are taken literally from the target: nothing in them is decoded, and
/// a `/` inside a key is just another key byte. Keys need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Fetch { key: &'a [u8] },
    /// `raw_value` is the query with its first two bytes (normally `v=`)
    /// skipped and still percent-encoded.
    Store { key: &'a [u8], raw_value: &'a [u8] },
    /// `/set/{key}` with no `?`.
    SetWithoutValue { key: &'a [u8] },
    Edit { key: &'a [u8] },
    Unknown,
}

impl<'a> Route<'a> {
    /// Match `target` against the route prefixes, ASCII case-insensitively,
    /// in the order get, set, edit. The first match wins.
    pub fn parse(target: &'a [u8]) -> Route<'a> {
        if let Some(key) = strip_prefix_ignore_case(target, GET_PREFIX) {
            return Route::Fetch { key };
        }

        if let Some(rest) = strip_prefix_ignore_case(target, SET_PREFIX) {
            return match rest.iter().position(|&b| b == b'?') {
                Some(q) => Route::Store {
                    key: &rest[..q],
                    raw_value: rest[q + 1..].get(2..).unwrap_or_default(),
                },
                None => Route::SetWithoutValue { key: rest },
            };
        }

        if let Some(key) = strip_prefix_ignore_case(target, EDIT_PREFIX) {
            return Route::Edit { key };
        }

        Route::Unknown
    }

    /// True for routes that would change the store.
    pub fn is_write(&self) -> bool {
        matches!(self, Route::Store { .. } | Route::SetWithoutValue { .. })
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Turns parsed requests into responses against one store.
pub struct Router<D = Md5Digest> {
    store: HashedStore<D>,
    policy: ErrorPolicy,
}

impl<D: DigestFunction> Router<D> {
    pub fn new(store: HashedStore<D>, policy: ErrorPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &HashedStore<D> {
        &self.store
    }

    pub fn handle(&self, request: &Request) -> Response {
        let route = Route::parse(&request.target);
        debug!(
            method = %request.method_lossy(),
            target = %request.target_lossy(),
            "dispatch"
        );

        if self.policy == ErrorPolicy::Compatible {
            return self.dispatch(route);
        }

        if request.is_empty() {
            return Response::bad_request();
        }
        match request.http_method() {
            Some(http::Method::GET) => self.dispatch(route),
            // HEAD never writes.
            Some(http::Method::HEAD) if route.is_write() => {
                Response::not_implemented().without_body()
            }
            Some(http::Method::HEAD) => self.dispatch(route).without_body(),
            _ => {
                debug!(method = %request.method_lossy(), "unsupported method");
                Response::not_implemented()
            }
        }
    }

    fn dispatch(&self, route: Route<'_>) -> Response {
        match route {
            Route::Fetch { key } => handlers::fetch(&self.store, key, self.policy),
            Route::Store { key, raw_value } => {
                handlers::store(&self.store, key, raw_value, self.policy)
            }
            Route::Edit { key } => handlers::edit_form(&self.store, key, self.policy),
            Route::SetWithoutValue { .. } => match self.policy {
                ErrorPolicy::Compatible => Response::not_found(),
                ErrorPolicy::Strict => Response::bad_request(),
            },
            Route::Unknown => Response::not_found(),
        }
    }
}

#[cfg(test)]
mod route_tests {
    use super::*;

    #[test]
    fn parses_each_prefix() {
        assert_eq!(Route::parse(b"/get/k"), Route::Fetch { key: b"k" });
        assert_eq!(Route::parse(b"/edit/k"), Route::Edit { key: b"k" });
        assert_eq!(
            Route::parse(b"/set/k?v=a%20b"),
            Route::Store {
                key: b"k",
                raw_value: b"a%20b"
            }
        );
        assert_eq!(
            Route::parse(b"/set/k"),
            Route::SetWithoutValue { key: b"k" }
        );
        assert_eq!(Route::parse(b"/"), Route::Unknown);
        assert_eq!(Route::parse(b"/delete/k"), Route::Unknown);
        assert_eq!(Route::parse(b""), Route::Unknown);
    }

    #[test]
    fn prefixes_ignore_case() {
        assert_eq!(Route::parse(b"/GET/Key"), Route::Fetch { key: b"Key" });
        assert_eq!(Route::parse(b"/Edit/k"), Route::Edit { key: b"k" });
        assert!(matches!(Route::parse(b"/SeT/k?v=1"), Route::Store { .. }));
    }

    #[test]
    fn prefix_match_wins_over_nesting() {
        assert_eq!(Route::parse(b"/get/set/x"), Route::Fetch { key: b"set/x" });
        assert_eq!(Route::parse(b"/edit/get/x"), Route::Edit { key: b"get/x" });
    }

    #[test]
    fn get_keys_keep_their_query() {
        assert_eq!(Route::parse(b"/get/k?x=1"), Route::Fetch { key: b"k?x=1" });
    }

    #[test]
    fn set_skips_two_query_bytes_whatever_they_are() {
        assert_eq!(
            Route::parse(b"/set/k?x=1&v=2"),
            Route::Store {
                key: b"k",
                raw_value: b"1&v=2"
            }
        );
        assert_eq!(
            Route::parse(b"/set/k?v"),
            Route::Store {
                key: b"k",
                raw_value: b""
            }
        );
        assert_eq!(
            Route::parse(b"/set/k?"),
            Route::Store {
                key: b"k",
                raw_value: b""
            }
        );
    }

    #[test]
    fn set_splits_on_first_question_mark() {
        assert_eq!(
            Route::parse(b"/set/k?v=what?"),
            Route::Store {
                key: b"k",
                raw_value: b"what?"
            }
        );
    }

    #[test]
    fn prefix_requires_trailing_slash() {
        assert_eq!(Route::parse(b"/get"), Route::Unknown);
        assert_eq!(Route::parse(b"/getk"), Route::Unknown);
        assert_eq!(Route::parse(b"/get/"), Route::Fetch { key: b"" });
    }

    #[test]
    fn non_utf8_keys_are_kept_verbatim() {
        assert_eq!(
            Route::parse(b"/SET/caf\xe9?v=a\xffb"),
            Route::Store {
                key: b"caf\xe9",
                raw_value: b"a\xffb"
            }
        );
        assert_eq!(Route::parse(b"/get/\xff"), Route::Fetch { key: b"\xff" });
    }

    #[test]
    fn multibyte_targets_do_not_panic() {
        assert_eq!(Route::parse("/gé/k".as_bytes()), Route::Unknown);
        assert_eq!(
            Route::parse("/get/ключ".as_bytes()),
            Route::Fetch {
                key: "ключ".as_bytes()
            }
        );
    }
}
