//! The request pipeline.
//!
//! A [`Pipeline`] owns the instance-level configuration and a transport.
//! [`Pipeline::create`] binds an HTTP method and returns a [`RequestFn`];
//! each [`RequestFn::call`] then runs one request/response cycle:
//!
//! 1. merge the instance configuration with the call [`Options`];
//! 2. run the before-send chain: instance interceptor first, then the call
//!    interceptor, each receiving the previous one's result;
//! 3. set the method (call-level override, else the bound method);
//! 4. serialize the payload with `transform_data`;
//! 5. dispatch the transport;
//! 6. reject statuses outside `[200, 300)`;
//! 7. decode the body as JSON when the *request* headers declare
//!    `application/json`, else keep the raw response;
//! 8. hand the result to `on_response_success`.
//!
//! Failures in steps 2 to 4 go to `on_send_error` and no transport call is
//! made. Failures in steps 5 to 7 go to `on_response_error`. Either way the
//! interceptor's return value is the call's result, so with the default
//! interceptors a call never returns `Err`.
//!
//! There is no retry, timeout, or cancellation at this level.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{Instrument, debug, debug_span, trace, warn};
use url::Url;

use crate::interceptor::run_before_send;
use crate::options::EffectiveConfig;
use crate::{
    ContentType, Error, HttpClient, Method, Options, Outcome, Request, Response, Result,
    SingletonRegistry,
};

struct Inner<C> {
    transport: C,
    config: EffectiveConfig,
}

/// Factory for per-method request functions.
///
/// Cloning is cheap and yields a handle to the same instance; use
/// [`Pipeline::ptr_eq`] to compare identity.
///
/// # Example
///
/// ```ignore
/// use courier::{HeadersInit, HyperClient, Method, Options, Pipeline};
///
/// let pipeline = Pipeline::new(
///     HyperClient::new(),
///     Options::new()
///         .singleton(true)
///         .headers(HeadersInit::map([("Content-Type", "application/json")])),
/// );
///
/// let fetch_get = pipeline.create(Method::Get);
/// let user = fetch_get.send("https://api.example.com/users/1").await?;
/// ```
pub struct Pipeline<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for Pipeline<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> std::fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<C> Pipeline<C>
where
    C: HttpClient + 'static,
{
    /// Construct a pipeline, honoring the singleton policy against the
    /// process-wide [`SingletonRegistry`].
    ///
    /// The registry holds at most one singleton per transport type `C`, not
    /// one per process: `Pipeline<HyperClient>` and
    /// `Pipeline<Arc<HyperClient>>` each get their own slot.
    ///
    /// When the merged options have `singleton` set and a singleton pipeline
    /// with the same transport type was already constructed, that pipeline is
    /// returned and `transport` and `options` are dropped. The result
    /// therefore depends on construction order. Without `singleton`, a fresh
    /// instance is returned and the registry is left alone, even if a
    /// singleton exists.
    #[must_use]
    pub fn new(transport: C, options: Options) -> Self {
        Self::with_registry(SingletonRegistry::global(), transport, options)
    }

    /// Like [`Pipeline::new`], against an explicit registry.
    #[must_use]
    pub fn with_registry(registry: &SingletonRegistry, transport: C, options: Options) -> Self {
        let config = EffectiveConfig::default().merged(&options);
        if !config.singleton {
            return Self::from_parts(transport, config);
        }

        let (pipeline, reused) =
            registry.get_or_insert_with(|| Self::from_parts(transport, config));
        if reused {
            debug!("singleton pipeline already constructed, discarding new options");
        }
        pipeline
    }

    fn from_parts(transport: C, config: EffectiveConfig) -> Self {
        Self {
            inner: Arc::new(Inner { transport, config }),
        }
    }

    /// Bind a request function to `method`.
    #[must_use]
    pub fn create(&self, method: Method) -> RequestFn<C> {
        RequestFn {
            pipeline: self.clone(),
            method,
        }
    }

    /// Bind a `GET` request function.
    #[must_use]
    pub fn get(&self) -> RequestFn<C> {
        self.create(Method::Get)
    }

    /// Bind a `POST` request function.
    #[must_use]
    pub fn post(&self) -> RequestFn<C> {
        self.create(Method::Post)
    }

    /// Bind a `PUT` request function.
    #[must_use]
    pub fn put(&self) -> RequestFn<C> {
        self.create(Method::Put)
    }

    /// Bind a `PATCH` request function.
    #[must_use]
    pub fn patch(&self) -> RequestFn<C> {
        self.create(Method::Patch)
    }

    /// Bind a `DELETE` request function.
    #[must_use]
    pub fn delete(&self) -> RequestFn<C> {
        self.create(Method::Delete)
    }
}

impl<C> Pipeline<C> {
    /// Instance-level configuration.
    #[must_use]
    pub fn config(&self) -> &EffectiveConfig {
        &self.inner.config
    }

    /// The transport.
    #[must_use]
    pub fn transport(&self) -> &C {
        &self.inner.transport
    }

    /// Whether both handles point to the same instance.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

/// Request function bound to a pipeline and a method.
///
/// Holds no per-call state: calls may run concurrently from clones of the
/// same function.
pub struct RequestFn<C> {
    pipeline: Pipeline<C>,
    method: Method,
}

impl<C> Clone for RequestFn<C> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            method: self.method,
        }
    }
}

impl<C> std::fmt::Debug for RequestFn<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFn")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl<C> RequestFn<C>
where
    C: HttpClient + 'static,
{
    /// Bound method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// The pipeline this function is bound to.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline<C> {
        &self.pipeline
    }

    /// Send a request without payload or call options.
    pub async fn send(&self, url: &str) -> Result<Outcome> {
        self.call(url, None, None).await
    }

    /// Run one request/response cycle.
    ///
    /// `url` is joined against the configured base URL, if any. `data` is
    /// turned into the body by `transform_data`. `options` override the
    /// instance configuration for this call only.
    ///
    /// # Errors
    ///
    /// Only when an interceptor returns `Err`; with the default interceptors
    /// failures resolve to [`Outcome::Error`].
    pub async fn call(
        &self,
        url: &str,
        data: Option<Value>,
        options: Option<Options>,
    ) -> Result<Outcome> {
        self.run(url, Ok(data), options.unwrap_or_default()).await
    }

    /// Like [`RequestFn::call`] with any serializable payload.
    ///
    /// A payload that cannot be represented as JSON is a send error.
    pub async fn call_with<T>(
        &self,
        url: &str,
        data: &T,
        options: Option<Options>,
    ) -> Result<Outcome>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(data).map(Some).map_err(Error::from);
        self.run(url, data, options.unwrap_or_default()).await
    }

    async fn run(&self, url: &str, data: Result<Option<Value>>, call: Options) -> Result<Outcome> {
        let method = call.method_override().unwrap_or(self.method);
        let span = debug_span!("courier_request", %method, url);

        async move {
            let mut config = self.pipeline.config().clone().merged(&call);
            if let Err(err) = self.prepare(&mut config, data, &call) {
                warn!(error = %err, "request failed before sending");
                return config.on_send_error.handle(err);
            }

            let response = match self.dispatch(url, &config).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, "request failed");
                    return config.on_response_error.handle(err);
                }
            };

            let outcome = match decode(&config, response) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(error = %err, "response decoding failed");
                    return config.on_response_error.handle(err);
                }
            };

            config.on_response_success.handle(outcome)
        }
        .instrument(span)
        .await
    }

    /// Steps 2 to 4, applied to the merged `config` in place. On failure
    /// `config` holds the most recent configuration, whose `on_send_error`
    /// handles the error.
    fn prepare(
        &self,
        config: &mut EffectiveConfig,
        data: Result<Option<Value>>,
        call: &Options,
    ) -> Result<()> {
        let instance = self.pipeline.config();
        let chain = [Some(&instance.before_send), call.before_send_interceptor()];
        *config = run_before_send(chain, config.clone())?;
        trace!("before-send chain completed");

        config.method = call.method_override().unwrap_or(self.method);
        config.body = config.transform_data.apply(data?.as_ref())?;
        Ok(())
    }

    /// Steps 5 and 6.
    async fn dispatch(&self, url: &str, config: &EffectiveConfig) -> Result<Response<Bytes>> {
        let url = resolve_url(config.base_url.as_ref(), url)?;
        let headers = config
            .headers
            .as_ref()
            .map(|headers| headers.normalize().into_entries())
            .unwrap_or_default();

        let request = Request::builder(config.method, url)
            .headers(headers)
            .body(config.body.clone())
            .extensions(config.extensions.clone().unwrap_or_default())
            .build();

        debug!("dispatching request");
        let response = self.pipeline.transport().execute(request).await?;

        let status = response.status();
        if !response.is_success() {
            let reason = http::StatusCode::from_u16(status)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("non-success status");
            return Err(Error::http_with_body(status, reason, response.into_body()));
        }

        debug!(status, "response received");
        Ok(response)
    }
}

fn resolve_url(base_url: Option<&Url>, url: &str) -> Result<Url> {
    match base_url {
        Some(base) => base.join(url),
        None => Url::parse(url),
    }
    .map_err(Error::InvalidUrl)
}

/// Steps 7 and 8: content negotiation on the request headers.
fn decode(config: &EffectiveConfig, response: Response<Bytes>) -> Result<Outcome> {
    let declared = config.content_type();
    match ContentType::detect(declared.as_deref()) {
        ContentType::Json => {
            trace!(?declared, "decoding JSON body");
            response.json::<Value>().map(Outcome::Json)
        }
        ContentType::Other => {
            trace!(?declared, "passing raw response through");
            Ok(Outcome::Raw(response))
        }
    }
}
