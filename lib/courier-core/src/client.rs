//! Transport trait.
//!
//! The pipeline consumes an [`HttpClient`] and never implements one itself.
//! `courier::HyperClient` is the bundled implementation; tests usually
//! provide a spy.

use std::future::Future;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP transport trait.
///
/// Implementations perform the network I/O for a single request. They
/// return the response whatever its status: status classification belongs
/// to the pipeline.
///
/// # Example
///
/// ```ignore
/// use courier_core::{HttpClient, Request, Response, Result};
/// use bytes::Bytes;
///
/// #[derive(Clone)]
/// struct Canned;
///
/// impl HttpClient for Canned {
///     async fn execute(&self, _request: Request<Bytes>) -> Result<Response<Bytes>> {
///         Ok(Response::new(204, Default::default(), Bytes::new()))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be performed:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts, when the transport enforces one
    /// - Invalid request (e.g. malformed header)
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<C: HttpClient> HttpClient for std::sync::Arc<C> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        C::execute(self, request)
    }
}
