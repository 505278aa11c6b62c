//! Body serialization utilities.

use bytes::Bytes;

use crate::Result;

/// How a response body is handled, chosen from the declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`: the body is decoded into a JSON value.
    Json,
    /// Anything else, including no declaration: the body is left as is.
    Other,
}

impl ContentType {
    const JSON_MIME: &'static str = "application/json";

    /// Classify a declared content type.
    ///
    /// Matches by substring, so parameters such as `;charset=UTF-8` are
    /// accepted.
    #[must_use]
    pub fn detect(declared: Option<&str>) -> Self {
        match declared {
            Some(declared) if declared.contains(Self::JSON_MIME) => Self::Json,
            _ => Self::Other,
        }
    }
}

/// Serialize a value to JSON bytes.
///
/// # Example
///
/// ```
/// use courier_core::to_json;
///
/// let bytes = to_json(&serde_json::json!({ "name": "Alice" })).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// # Example
///
/// ```
/// use courier_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_json(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Convert an already decoded JSON value into a typed value, with the same
/// path-aware errors as [`from_json`].
pub fn from_json_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
