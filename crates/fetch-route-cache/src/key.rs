//! Cache key composition.
//!
//! Every request yields two URLs from the same template:
//! - the [`StorageKey`], the canonical cache identity with ignored query
//!   params stripped, and
//! - the [`FetchKey`], the URL actually sent over the network, whose
//!   `partials` list only names fragments that are not cached yet.

use std::fmt;

use fetch_route_core::{Params, Query, QueryValue, PARTIALS_PARAM};
use serde::{Deserialize, Serialize};

/// Canonical cache identity of a route's data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

/// Literal URL handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchKey(String);

macro_rules! url_key {
    ($name:ident) => {
        impl $name {
            /// Create a key from a compiled URL.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Get the key string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the key string.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self::new(key)
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

url_key!(StorageKey);
url_key!(FetchKey);

/// The key pair derived for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlKeys {
    /// URL sent to the transport.
    pub fetch_key: FetchKey,
    /// URL the result is cached under.
    pub storage_key: StorageKey,
}

/// Compile a URL template against params and a query.
///
/// Each `:key` placeholder is replaced (first occurrence) by its param value,
/// in param key order. The query is form-urlencoded; list values become
/// repeated `key=value` pairs. No `?` is appended for an empty query.
///
/// Params without a placeholder are ignored and placeholders without a param
/// are left in place; see [`unresolved_placeholders`].
pub fn compile_url(template: &str, params: &Params, query: &Query) -> String {
    let mut url = params.iter().fold(template.to_string(), |url, (key, value)| {
        url.replacen(&format!(":{}", key), value, 1)
    });

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        for v in value.values() {
            serializer.append_pair(key, v);
        }
    }
    let search = serializer.finish();

    if !search.is_empty() {
        url.push('?');
        url.push_str(&search);
    }
    url
}

/// Copy of `query` without the ignored keys.
pub fn strip_ignored<S: AsRef<str>>(query: &Query, ignored: &[S]) -> Query {
    let mut result = query.clone();
    for key in ignored {
        result.remove(key.as_ref());
    }
    result
}

/// Copy of `query` whose `partials` list only keeps names for which
/// `is_cached` is false. The `partials` key is dropped when nothing remains.
pub fn narrow_partials(query: &Query, is_cached: impl Fn(&str) -> bool) -> Query {
    let mut result = query.clone();
    let remaining: Vec<String> = result
        .remove(PARTIALS_PARAM)
        .map(QueryValue::into_values)
        .unwrap_or_default()
        .into_iter()
        .filter(|name| !is_cached(name))
        .collect();

    if !remaining.is_empty() {
        result.insert(PARTIALS_PARAM.to_string(), QueryValue::Many(remaining));
    }
    result
}

/// Derive the storage key only.
pub fn storage_key<S: AsRef<str>>(
    template: &str,
    params: &Params,
    query: &Query,
    ignored: &[S],
) -> StorageKey {
    StorageKey(compile_url(template, params, &strip_ignored(query, ignored)))
}

/// Derive the fetch/storage key pair for a request.
pub fn derive_keys<S: AsRef<str>>(
    template: &str,
    params: &Params,
    query: &Query,
    ignored: &[S],
    is_cached_partial: impl Fn(&str) -> bool,
) -> UrlKeys {
    UrlKeys {
        fetch_key: FetchKey(compile_url(
            template,
            params,
            &narrow_partials(query, is_cached_partial),
        )),
        storage_key: storage_key(template, params, query, ignored),
    }
}

/// Names of `:placeholder` tokens left in the path part of a compiled URL.
///
/// A placeholder name starts with an ASCII letter or `_`, so ports
/// (`host:8080`) and schemes (`https://`) are not reported.
pub fn unresolved_placeholders(url: &str) -> Vec<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let mut found = Vec::new();

    for (idx, _) in path.match_indices(':') {
        let name: String = path[idx + 1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        if name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            found.push(name);
        }
    }
    found
}
