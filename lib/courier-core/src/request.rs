//! HTTP request handed to the transport.
//!
//! The pipeline builds one [`Request`] per call from the effective
//! configuration; transports consume it through [`crate::HttpClient`].
//!
//! # Example
//!
//! ```
//! use courier_core::{Request, Method};
//! use bytes::Bytes;
//!
//! let request = Request::<Bytes>::builder(Method::Get, "https://api.example.com".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .build();
//! ```

use bytes::Bytes;
use http::Extensions;

use crate::Method;

/// An HTTP request with method, URL, ordered headers, and optional body.
///
/// Header values are raw bytes: values that are not visible ASCII are sent
/// as given.
///
/// Extensions carry transport options that the pipeline passes through
/// without interpreting them.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: Vec<(String, Bytes)>,
    body: Option<B>,
    extensions: Extensions,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers, in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, Bytes)] {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut Vec<(String, Bytes)> {
        &mut self.headers
    }

    /// First header value with the given name, ignoring ASCII case.
    ///
    /// `None` also when the value is not UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| std::str::from_utf8(value).ok())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Transport extensions.
    #[must_use]
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Consume into (method, url, headers, body, extensions).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, Vec<(String, Bytes)>, Option<B>, Extensions) {
        (
            self.method,
            self.url,
            self.headers,
            self.body,
            self.extensions,
        )
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: Vec<(String, Bytes)>,
    body: Option<B>,
    extensions: Extensions,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            extensions: Extensions::new(),
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, Bytes)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets the request body, if any.
    #[must_use]
    pub fn body(mut self, body: Option<B>) -> Self {
        self.body = body;
        self
    }

    /// Sets the transport extensions.
    #[must_use]
    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            extensions: self.extensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_basic() {
        let url = url::Url::parse("https://api.example.com/users").expect("valid URL");
        let request = Request::<Bytes>::builder(Method::Get, url)
            .header("Accept", "application/json")
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url().as_str(), "https://api.example.com/users");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn request_builder_keeps_header_order() {
        let url = url::Url::parse("https://api.example.com").expect("valid URL");
        let request = Request::<Bytes>::builder(Method::Post, url)
            .headers([
                ("X-First".to_string(), Bytes::from_static(b"1")),
                ("X-Second".to_string(), Bytes::from_static(b"2")),
            ])
            .body(Some(Bytes::from_static(b"{}")))
            .build();

        let names: Vec<_> = request.headers().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["X-First", "X-Second"]);
        assert_eq!(request.body(), Some(&Bytes::from_static(b"{}")));
    }

    #[test]
    fn request_carries_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct TraceId(u64);

        let mut extensions = Extensions::new();
        extensions.insert(TraceId(7));

        let url = url::Url::parse("https://api.example.com").expect("valid URL");
        let request = Request::<Bytes>::builder(Method::Get, url)
            .extensions(extensions)
            .build();

        assert_eq!(request.extensions().get::<TraceId>(), Some(&TraceId(7)));
    }
}
