//! Request header shapes and content-type detection.
//!
//! Callers can describe request headers in three shapes, see [`HeadersInit`].
//! Every lookup goes through [`HeadersInit::normalize`], which produces a
//! [`HeaderList`]: an ordered list of `(name, value)` entries that remembers
//! whether names compare case-insensitively. Values keep their raw bytes,
//! so a normalized list is also what goes on the wire.
//!
//! ```
//! use courier_core::HeadersInit;
//!
//! let headers = HeadersInit::pairs([("content-type", "application/json")]);
//! assert_eq!(headers.content_type().as_deref(), Some("application/json"));
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::{Error, Result};

/// Name of the header consulted for content negotiation.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Request headers as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadersInit {
    /// Header collection with case-insensitive names.
    Collection(HeaderMap),
    /// List of `[name, value]` pairs, names compared case-insensitively.
    ///
    /// Pairs are not validated: a pair holding only a name yields an empty
    /// value, an empty pair is ignored.
    Pairs(Vec<Vec<String>>),
    /// Plain key-value mapping, names compared exactly.
    Map(HashMap<String, String>),
}

impl Default for HeadersInit {
    fn default() -> Self {
        Self::Map(HashMap::new())
    }
}

/// How header names are compared in a [`HeaderList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatching {
    /// ASCII case-insensitive comparison.
    IgnoreCase,
    /// Byte-for-byte comparison.
    Exact,
}

/// Canonical, ordered view over a [`HeadersInit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, Bytes)>,
    matching: NameMatching,
}

impl HeaderList {
    /// Value of the first entry named `name`.
    ///
    /// Bytes that are not UTF-8 are replaced by `U+FFFD`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        self.entries
            .iter()
            .find(|(candidate, _)| match self.matching {
                NameMatching::IgnoreCase => candidate.eq_ignore_ascii_case(name),
                NameMatching::Exact => candidate == name,
            })
            .map(|(_, value)| String::from_utf8_lossy(value))
    }

    /// Name comparison mode.
    #[must_use]
    pub const fn matching(&self) -> NameMatching {
        self.matching
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Consume into the ordered entries, values untouched.
    #[must_use]
    pub fn into_entries(self) -> Vec<(String, Bytes)> {
        self.entries
    }
}

impl HeadersInit {
    /// Build a pair list from `(name, value)` tuples.
    pub fn pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| vec![name.into(), value.into()])
                .collect(),
        )
    }

    /// Build a plain mapping from `(name, value)` tuples.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Normalize into a [`HeaderList`].
    ///
    /// No entry is dropped: collection values that are not visible ASCII
    /// keep their bytes. Mapping entries are sorted by name so the order is
    /// stable.
    #[must_use]
    pub fn normalize(&self) -> HeaderList {
        match self {
            Self::Collection(headers) => HeaderList {
                entries: headers
                    .iter()
                    .map(|(name, value)| {
                        (name.to_string(), Bytes::copy_from_slice(value.as_bytes()))
                    })
                    .collect(),
                matching: NameMatching::IgnoreCase,
            },
            Self::Pairs(pairs) => HeaderList {
                entries: pairs
                    .iter()
                    .filter_map(|pair| match pair.as_slice() {
                        [] => None,
                        [name] => Some((name.clone(), Bytes::new())),
                        [name, value, ..] => Some((name.clone(), Bytes::from(value.clone()))),
                    })
                    .collect(),
                matching: NameMatching::IgnoreCase,
            },
            Self::Map(map) => {
                let mut entries: Vec<_> = map
                    .iter()
                    .map(|(name, value)| (name.clone(), Bytes::from(value.clone())))
                    .collect();
                entries.sort();
                HeaderList {
                    entries,
                    matching: NameMatching::Exact,
                }
            }
        }
    }

    /// Declared `Content-Type`, if any.
    ///
    /// Returns `None` when no entry matches, including for an empty pair
    /// list. A matching pair without a value yields an empty string.
    #[must_use]
    pub fn content_type(&self) -> Option<String> {
        self.normalize().get(CONTENT_TYPE).map(Cow::into_owned)
    }

    /// Set a header, replacing any entry with the same name.
    ///
    /// Keeps the current shape. Only the collection shape validates names
    /// and values.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        match self {
            Self::Collection(headers) => {
                let name = HeaderName::try_from(name.as_str())
                    .map_err(|e| Error::invalid_request(format!("header name '{name}': {e}")))?;
                let value = HeaderValue::try_from(value.as_str())
                    .map_err(|e| Error::invalid_request(format!("header value '{value}': {e}")))?;
                headers.insert(name, value);
            }
            Self::Pairs(pairs) => {
                pairs.retain(|pair| {
                    pair.first()
                        .is_none_or(|existing| !existing.eq_ignore_ascii_case(&name))
                });
                pairs.push(vec![name, value]);
            }
            Self::Map(map) => {
                map.insert(name, value);
            }
        }
        Ok(())
    }
}

impl From<HeaderMap> for HeadersInit {
    fn from(headers: HeaderMap) -> Self {
        Self::Collection(headers)
    }
}

impl From<HashMap<String, String>> for HeadersInit {
    fn from(map: HashMap<String, String>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<Vec<String>>> for HeadersInit {
    fn from(pairs: Vec<Vec<String>>) -> Self {
        Self::Pairs(pairs)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use http::header;

    use super::*;

    fn json_collection() -> HeadersInit {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        HeadersInit::Collection(headers)
    }

    #[test]
    fn content_type_from_all_shapes() {
        let pairs = HeadersInit::pairs([("Content-Type", "application/json")]);
        let map = HeadersInit::map([("Content-Type", "application/json")]);

        check!(json_collection().content_type().as_deref() == Some("application/json"));
        check!(pairs.content_type().as_deref() == Some("application/json"));
        check!(map.content_type().as_deref() == Some("application/json"));
    }

    #[test]
    fn empty_pairs_have_no_content_type() {
        check!(HeadersInit::Pairs(vec![]).content_type() == None);
    }

    #[test]
    fn pairs_match_name_ignoring_case() {
        let headers = HeadersInit::pairs([("accept", "*/*"), ("CONTENT-TYPE", "text/plain")]);
        check!(headers.content_type().as_deref() == Some("text/plain"));
    }

    #[test]
    fn pairs_without_match_have_no_content_type() {
        let headers = HeadersInit::pairs([("Accept", "application/json")]);
        check!(headers.content_type() == None);
    }

    #[test]
    fn malformed_pair_yields_empty_content_type() {
        let headers = HeadersInit::Pairs(vec![vec![], vec!["content-type".to_string()]]);
        check!(headers.content_type().as_deref() == Some(""));
    }

    #[test]
    fn map_lookup_is_exact() {
        let headers = HeadersInit::map([("content-type", "application/json")]);
        check!(headers.content_type() == None);
    }

    #[test]
    fn collection_lookup_ignores_case() {
        let list = json_collection().normalize();
        check!(list.matching() == NameMatching::IgnoreCase);
        check!(list.get("CONTENT-TYPE").as_deref() == Some("application/json"));
    }

    #[test]
    fn collection_keeps_opaque_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-name", HeaderValue::from_bytes(b"caf\xe9").expect("obs-text"));
        headers.insert("x-plain", HeaderValue::from_static("ok"));

        let list = HeadersInit::Collection(headers).normalize();

        check!(list.len() == 2);
        check!(list.get("X-Name").as_deref() == Some("caf\u{fffd}"));
        let entries = list.into_entries();
        let_assert!(Some((_, raw)) = entries.iter().find(|(name, _)| name == "x-name"));
        check!(&raw[..] == b"caf\xe9");
    }

    #[test]
    fn map_normalizes_in_name_order() {
        let list = HeadersInit::map([("X-B", "2"), ("X-A", "1")]).normalize();
        let names: Vec<_> = list.iter().map(|(name, _)| name).collect();
        check!(names == ["X-A", "X-B"]);
    }

    #[test]
    fn insert_replaces_pair_ignoring_case() {
        let mut headers = HeadersInit::pairs([("content-type", "text/plain"), ("Accept", "*/*")]);
        headers
            .insert("Content-Type", "application/json")
            .expect("pairs accept any name");

        let list = headers.normalize();
        check!(list.len() == 2);
        check!(list.get("content-type").as_deref() == Some("application/json"));
    }

    #[test]
    fn insert_into_collection_validates() {
        let mut headers = HeadersInit::Collection(HeaderMap::new());
        let_assert!(Err(Error::InvalidRequest(_)) = headers.insert("bad name", "x"));

        headers
            .insert("Authorization", "Bearer token")
            .expect("valid header");
        check!(headers.normalize().get("authorization").as_deref() == Some("Bearer token"));
    }
}
