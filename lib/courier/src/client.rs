//! Bundled transport: hyper-util's pooled client behind a tower service.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::util::BoxCloneService;
use tower::{Layer, Service, ServiceExt, service_fn};
use tracing::{debug, warn};

use crate::connector::https_connector;
use crate::{ClientConfig, Error, HttpClient, Request, Response, Result};

/// Type-erased transport service, the unit that layers wrap.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

type Pool = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

type Wrap = Box<dyn FnOnce(BoxedService) -> BoxedService + Send>;

/// Pooled HTTP/HTTPS transport for a [`Pipeline`](crate::Pipeline).
///
/// Every status is a successful exchange here; the pipeline classifies
/// statuses. Response headers are kept whole, repeated names included.
///
/// ```ignore
/// use std::time::Duration;
/// use courier::{HyperClient, Options, Pipeline};
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(30))
///     .build();
/// let pipeline = Pipeline::new(client, Options::new());
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: Arc<Mutex<BoxedService>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperClient {
    /// Client with default settings and no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a client.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        // `BoxCloneService` is not `Sync`: each exchange drives its own clone.
        let service = self
            .service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        service.oneshot(request).await
    }
}

/// Builder for [`HyperClient`].
///
/// ```ignore
/// use courier::HyperClient;
/// use courier::tower::util::MapRequestLayer;
///
/// let client = HyperClient::builder()
///     .layer(MapRequestLayer::new(|request| request))
///     .build();
/// ```
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfig,
    layers: Vec<Wrap>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Limit each exchange, body included. Expiry yields [`Error::Timeout`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Limit connection establishment.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Idle connections kept per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// How long an idle connection stays pooled.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Wrap the transport in a Tower layer. The first layer added sees
    /// requests first.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers
            .push(Box::new(move |inner| BoxCloneService::new(layer.layer(inner))));
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let Self { config, layers } = self;

        let service = layers
            .into_iter()
            .rev()
            .fold(base_service(&config), |inner, wrap| wrap(inner));

        HyperClient {
            service: Arc::new(Mutex::new(service)),
            config,
        }
    }
}

fn base_service(config: &ClientConfig) -> BoxedService {
    let pool: Pool = Client::builder(TokioExecutor::new())
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_idle_per_host)
        .build(https_connector(config));
    let timeout = config.timeout;

    BoxCloneService::new(service_fn(move |request: Request<Bytes>| {
        let pool = pool.clone();
        async move { exchange(&pool, request, timeout).await }
    }))
}

async fn exchange(
    pool: &Pool,
    request: Request<Bytes>,
    timeout: Option<Duration>,
) -> Result<Response<Bytes>> {
    let method = request.method();
    let url = request.url().to_string();
    let request = to_hyper(request)?;
    let started = Instant::now();

    let round_trip = async {
        let response = pool.request(request).await.map_err(map_hyper_error)?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();
        Ok(Response::new(parts.status.as_u16(), parts.headers, body))
    };

    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, round_trip)
            .await
            .unwrap_or_else(|_| Err(Error::Timeout)),
        None => round_trip.await,
    };

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match &result {
        Ok(response) => {
            debug!(%method, %url, status = response.status(), elapsed_ms, "exchange completed");
        }
        Err(err) => warn!(%method, %url, elapsed_ms, error = %err, "exchange failed"),
    }
    result
}

/// Header values go out byte for byte, in list order.
fn to_hyper(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
    let (method, url, headers, body, extensions) = request.into_parts();

    let mut builder = http::Request::builder()
        .method(http::Method::from(method))
        .uri(url.as_str());
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), &value[..]);
    }

    let mut request = builder
        .body(Full::new(body.unwrap_or_default()))
        .map_err(|e| Error::invalid_request(e.to_string()))?;
    *request.extensions_mut() = extensions;
    Ok(request)
}

#[allow(clippy::needless_pass_by_value)]
fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
    let msg = err.to_string();
    if err.is_connect() {
        Error::connection(msg)
    } else if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
        Error::tls(msg)
    } else {
        Error::connection(msg)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;
    use crate::Method;

    fn url(path: &str) -> url::Url {
        url::Url::parse("https://api.example.com")
            .and_then(|base| base.join(path))
            .expect("url")
    }

    #[test]
    fn builder_sets_config() {
        let client = HyperClient::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_per_host(16)
            .build();

        check!(client.config().timeout == Some(Duration::from_secs(60)));
        check!(client.config().pool_idle_per_host == 16);
        check!(HyperClient::new().config().timeout == None);
    }

    #[test]
    fn to_hyper_keeps_order_bytes_and_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct Marker(u8);

        let mut extensions = http::Extensions::new();
        extensions.insert(Marker(7));

        let request = Request::builder(Method::Put, url("/items"))
            .header("X-Trace", "a")
            .header("X-Trace", "b")
            .header("X-Name", Bytes::from_static(b"caf\xe9"))
            .body(Some(Bytes::from_static(b"{}")))
            .extensions(extensions)
            .build();

        let_assert!(Ok(request) = to_hyper(request));
        check!(request.method() == http::Method::PUT);
        let traces: Vec<_> = request.headers().get_all("x-trace").iter().collect();
        check!(traces == ["a", "b"]);
        let_assert!(Some(name) = request.headers().get("x-name"));
        check!(name.as_bytes() == b"caf\xe9");
        check!(request.extensions().get::<Marker>() == Some(&Marker(7)));
    }

    #[test]
    fn invalid_header_name_is_invalid_request() {
        let request = Request::builder(Method::Get, url("/"))
            .header("bad header", "x")
            .build();

        let_assert!(Err(Error::InvalidRequest(_)) = to_hyper(request));
    }

    #[tokio::test]
    async fn layers_wrap_in_order() {
        let client = HyperClient::builder()
            .layer(tower::util::MapRequestLayer::new(|mut request: Request<Bytes>| {
                request
                    .headers_mut()
                    .push(("X-Order".to_string(), Bytes::from_static(b"first")));
                request
            }))
            .layer(tower::util::MapRequestLayer::new(|mut request: Request<Bytes>| {
                let seen: Vec<_> = request.headers().iter().map(|(_, v)| v.clone()).collect();
                assert_eq!(seen, [Bytes::from_static(b"first")]);
                // Stop before the network.
                request.headers_mut().push(("bad header".to_string(), Bytes::new()));
                request
            }))
            .build();

        let request = Request::builder(Method::Get, url("/")).build();
        let_assert!(Err(Error::InvalidRequest(_)) = client.execute(request).await);
    }
}
