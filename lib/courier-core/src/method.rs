//! HTTP method types.

use std::str::FromStr;

use derive_more::Display;

/// HTTP request method.
///
/// Defaults to [`Method::Get`], the method a pipeline binds when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Method {
    /// CONNECT method - establish a tunnel.
    #[display("CONNECT")]
    Connect,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
    /// GET method - retrieve a resource.
    #[default]
    #[display("GET")]
    Get,
    /// HEAD method - retrieve headers only.
    #[display("HEAD")]
    Head,
    /// OPTIONS method - retrieve allowed methods.
    #[display("OPTIONS")]
    Options,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// TRACE method - loop-back test.
    #[display("TRACE")]
    Trace,
}

impl Method {
    /// All supported methods.
    pub const ALL: [Self; 9] = [
        Self::Connect,
        Self::Delete,
        Self::Get,
        Self::Head,
        Self::Options,
        Self::Patch,
        Self::Post,
        Self::Put,
        Self::Trace,
    ];
}

impl FromStr for Method {
    type Err = crate::Error;

    /// Parses a method name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::invalid_request(format!("unsupported HTTP method: {s}")))
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Connect => Self::CONNECT,
            Method::Delete => Self::DELETE,
            Method::Get => Self::GET,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
            Method::Patch => Self::PATCH,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Trace => Self::TRACE,
        }
    }
}

impl TryFrom<http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_default_is_get() {
        assert_eq!(Method::default(), Method::Get);
    }

    #[test]
    fn method_display() {
        let names: Vec<_> = Method::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE"]
        );
    }

    #[test]
    fn method_from_str() {
        assert_eq!("post".parse::<Method>().expect("post"), Method::Post);
        assert_eq!("TRACE".parse::<Method>().expect("trace"), Method::Trace);
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn method_http_round_trip() {
        for method in Method::ALL {
            let http_method = http::Method::from(method);
            assert_eq!(Method::try_from(http_method).expect("known"), method);
        }
        assert!(Method::try_from(http::Method::from_bytes(b"PURGE").expect("ext")).is_err());
    }
}
