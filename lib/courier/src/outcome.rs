//! Result value of a pipeline call.

use bytes::Bytes;
use serde_json::Value;

use crate::{Error, Response, Result};

/// What a pipeline call resolves to.
///
/// With the default interceptors a call yields [`Outcome::Json`] when the
/// request declared a JSON content type, [`Outcome::Raw`] otherwise, and
/// [`Outcome::Error`] on any failure. Custom interceptors may return any
/// variant; the outcome does not record which interceptor produced it.
#[derive(Debug)]
pub enum Outcome {
    /// Decoded JSON body.
    Json(Value),
    /// Raw response handle, for content the pipeline does not decode.
    Raw(Response<Bytes>),
    /// Error value returned by an error interceptor.
    Error(Error),
}

impl Outcome {
    /// Whether the outcome holds an error value.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error value, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    /// The decoded JSON value, if any.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The raw response, if any.
    #[must_use]
    pub const fn as_response(&self) -> Option<&Response<Bytes>> {
        match self {
            Self::Raw(response) => Some(response),
            _ => None,
        }
    }

    /// Move an error value into the `Err` channel.
    pub fn into_result(self) -> Result<Self> {
        match self {
            Self::Error(err) => Err(err),
            other => Ok(other),
        }
    }

    /// Deserialize the outcome into `T`.
    ///
    /// Decoded values are converted directly, raw responses are parsed as
    /// JSON whatever their content type, and error values are returned as
    /// `Err`.
    pub fn into_json<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(value) => courier_core::from_json_value(value),
            Self::Raw(response) => response.json(),
            Self::Error(err) => Err(err),
        }
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Response<Bytes>> for Outcome {
    fn from(response: Response<Bytes>) -> Self {
        Self::Raw(response)
    }
}

impl From<Error> for Outcome {
    fn from(err: Error) -> Self {
        Self::Error(err)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::HeaderMap;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct User {
        id: u64,
    }

    #[test]
    fn json_outcome_deserializes() {
        let outcome = Outcome::from(json!({ "id": 7 }));
        check!(outcome.as_value().is_some());
        check!(outcome.into_json::<User>().expect("user") == User { id: 7 });
    }

    #[test]
    fn raw_outcome_parses_body() {
        let response = Response::new(200, HeaderMap::new(), Bytes::from_static(br#"{"id":3}"#));
        let outcome = Outcome::from(response);
        check!(outcome.as_response().map(Response::status) == Some(200));
        check!(outcome.into_json::<User>().expect("user") == User { id: 3 });
    }

    #[test]
    fn error_outcome() {
        let outcome = Outcome::from(Error::http(500, "boom"));
        check!(outcome.is_error());
        check!(outcome.error().and_then(Error::status) == Some(500));

        let_assert!(Err(err) = outcome.into_result());
        check!(err.is_server_error());
    }
}
