//! Error types for courier.

use derive_more::{Display, Error, From};

/// Main error type for courier operations.
///
/// Errors never escape a pipeline call on their own: they are handed to the
/// send-error or response-error interceptor, whose return value becomes the
/// call's outcome.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Response status outside of the `2xx` range.
    #[display("HTTP status error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Transport-level timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Error raised by a user-supplied interceptor or transform.
    #[display("interceptor error: {_0}")]
    #[from(skip)]
    Interceptor(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an interceptor error.
    #[must_use]
    pub fn interceptor(message: impl Into<String>) -> Self {
        Self::Interceptor(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if this error was produced by an interceptor or transform.
    #[must_use]
    pub const fn is_interceptor(&self) -> bool {
        matches!(self, Self::Interceptor(_))
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `None` if there is no body or this is not an HTTP error.
    ///
    /// ```ignore
    /// if let Some(Ok(api_error)) = err.decode_body::<ApiError>() {
    ///     eprintln!("{}: {}", api_error.code, api_error.message);
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        insta::assert_snapshot!(Error::http(404, "Not Found").to_string(), @"HTTP status error 404: Not Found");
        insta::assert_snapshot!(Error::Timeout.to_string(), @"request timeout");
        insta::assert_snapshot!(
            Error::connection("failed to connect").to_string(),
            @"connection error: failed to connect"
        );
        insta::assert_snapshot!(
            Error::interceptor("token expired").to_string(),
            @"interceptor error: token expired"
        );
        insta::assert_snapshot!(
            Error::json_deserialization("user.address.city", "missing field `city`").to_string(),
            @"JSON deserialization error at 'user.address.city': missing field `city`"
        );
    }

    #[test]
    fn error_status() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = Error::http(500, "Internal Server Error");
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_client_error());
        assert!(err.is_server_error());

        let err = Error::Timeout;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
    }

    #[test]
    fn error_kind_predicates() {
        assert!(Error::Timeout.is_timeout());
        assert!(Error::connection("refused").is_connection());
        assert!(Error::interceptor("nope").is_interceptor());
        assert!(!Error::http(404, "Not Found").is_timeout());
    }

    #[test]
    fn error_from_url_parse() {
        let err: Error = url::Url::parse("not a url").expect_err("invalid").into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            error: String,
        }

        let body = bytes::Bytes::from(r#"{"error": "not found"}"#);
        let err = Error::http_with_body(404, "Not Found", body);

        let decoded = err
            .decode_body::<ApiError>()
            .expect("should have body")
            .expect("should decode");
        assert_eq!(
            decoded,
            ApiError {
                error: "not found".to_string()
            }
        );

        assert!(Error::http(404, "Not Found").decode_body::<ApiError>().is_none());
        assert!(Error::Timeout.decode_body::<ApiError>().is_none());
    }
}
