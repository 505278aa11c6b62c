//! Layered pipeline configuration.
//!
//! Configuration comes in three tiers: builtin defaults
//! ([`EffectiveConfig::default`]), instance-level [`Options`] given to
//! [`Pipeline::new`](crate::Pipeline::new), and call-level [`Options`] given
//! to [`RequestFn::call`](crate::RequestFn::call). [`merge`] resolves them
//! into one [`EffectiveConfig`], field by field: a field set in a later tier
//! replaces the earlier value wholesale. Headers are not merged entry by
//! entry; use a before-send interceptor for that.

use bytes::Bytes;
use serde_json::Value;
use url::Url;

use crate::interceptor::{BeforeSendFn, ErrorFn, Interceptor, SuccessFn, TransformData};
use crate::{Error, Extensions, HeadersInit, Method, Outcome, Result};

/// Resolved configuration for one request.
///
/// Before-send interceptors receive and return this value, so every field is
/// public.
#[derive(Debug, Clone, Default)]
pub struct EffectiveConfig {
    /// Base URL that relative call URLs are joined against.
    pub base_url: Option<Url>,
    /// Request headers, also consulted for content negotiation.
    pub headers: Option<HeadersInit>,
    /// Opaque transport options, passed through to the transport.
    pub extensions: Option<Extensions>,
    /// Request method. Overwritten with the bound or call-level method once
    /// the before-send chain has run.
    pub method: Method,
    /// Request body. Set from the payload by `transform_data`.
    pub body: Option<Bytes>,
    /// Instance construction policy, see [`Pipeline::new`](crate::Pipeline::new).
    pub singleton: bool,
    /// Runs before the request is serialized and sent.
    pub before_send: Interceptor<BeforeSendFn>,
    /// Handles failures of the before-send chain and body serialization.
    pub on_send_error: Interceptor<ErrorFn>,
    /// Handles successful responses.
    pub on_response_success: Interceptor<SuccessFn>,
    /// Handles transport failures and non-2xx responses.
    pub on_response_error: Interceptor<ErrorFn>,
    /// Turns the call payload into the request body.
    pub transform_data: TransformData,
}

impl EffectiveConfig {
    /// Apply `options` on top of this configuration.
    #[must_use]
    pub fn merged(mut self, options: &Options) -> Self {
        let Options {
            base_url,
            headers,
            extensions,
            method,
            singleton,
            before_send,
            on_send_error,
            on_response_success,
            on_response_error,
            transform_data,
        } = options;

        if let Some(base_url) = base_url {
            self.base_url = Some(base_url.clone());
        }
        if let Some(headers) = headers {
            self.headers = Some(headers.clone());
        }
        if let Some(extensions) = extensions {
            self.extensions = Some(extensions.clone());
        }
        if let Some(method) = method {
            self.method = *method;
        }
        if let Some(singleton) = singleton {
            self.singleton = *singleton;
        }
        if let Some(before_send) = before_send {
            self.before_send = before_send.clone();
        }
        if let Some(on_send_error) = on_send_error {
            self.on_send_error = on_send_error.clone();
        }
        if let Some(on_response_success) = on_response_success {
            self.on_response_success = on_response_success.clone();
        }
        if let Some(on_response_error) = on_response_error {
            self.on_response_error = on_response_error.clone();
        }
        if let Some(transform_data) = transform_data {
            self.transform_data = transform_data.clone();
        }
        self
    }

    /// Declared `Content-Type` of the request headers.
    #[must_use]
    pub fn content_type(&self) -> Option<String> {
        self.headers.as_ref().and_then(HeadersInit::content_type)
    }

    /// Set one request header, keeping the others.
    ///
    /// Starts from an empty mapping when no headers are set.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.headers
            .get_or_insert_with(HeadersInit::default)
            .insert(name, value)
    }
}

/// Resolve the three configuration tiers, later tiers winning.
#[must_use]
pub fn merge(defaults: &EffectiveConfig, instance: &Options, call: &Options) -> EffectiveConfig {
    defaults.clone().merged(instance).merged(call)
}

/// Partial configuration for the instance or call tier.
///
/// Unset fields leave the lower tier untouched.
///
/// # Example
///
/// ```ignore
/// use courier::{HeadersInit, Options};
///
/// let options = Options::new()
///     .headers(HeadersInit::map([("Content-Type", "application/json")]))
///     .before_send(|mut config| {
///         config.set_header("Authorization", "Bearer token")?;
///         Ok(config)
///     });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    base_url: Option<Url>,
    headers: Option<HeadersInit>,
    extensions: Option<Extensions>,
    method: Option<Method>,
    singleton: Option<bool>,
    before_send: Option<Interceptor<BeforeSendFn>>,
    on_send_error: Option<Interceptor<ErrorFn>>,
    on_response_success: Option<Interceptor<SuccessFn>>,
    on_response_error: Option<Interceptor<ErrorFn>>,
    transform_data: Option<TransformData>,
}

impl Options {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(base_url.as_ref()).map_err(Error::InvalidUrl)?);
        Ok(self)
    }

    /// Set the request headers.
    #[must_use]
    pub fn headers(mut self, headers: impl Into<HeadersInit>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Set the opaque transport extensions.
    #[must_use]
    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Override the request method.
    ///
    /// At call level this wins over the method bound by
    /// [`Pipeline::create`](crate::Pipeline::create).
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the singleton construction policy.
    #[must_use]
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = Some(singleton);
        self
    }

    /// Set the before-send interceptor.
    #[must_use]
    pub fn before_send<F>(mut self, f: F) -> Self
    where
        F: Fn(EffectiveConfig) -> Result<EffectiveConfig> + Send + Sync + 'static,
    {
        self.before_send = Some(Interceptor::<BeforeSendFn>::before_send(f));
        self
    }

    /// Set the send-error interceptor.
    #[must_use]
    pub fn on_send_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.on_send_error = Some(Interceptor::<ErrorFn>::on_error(f));
        self
    }

    /// Set the response-success interceptor.
    #[must_use]
    pub fn on_response_success<F>(mut self, f: F) -> Self
    where
        F: Fn(Outcome) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.on_response_success = Some(Interceptor::<SuccessFn>::on_success(f));
        self
    }

    /// Set the response-error interceptor.
    #[must_use]
    pub fn on_response_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.on_response_error = Some(Interceptor::<ErrorFn>::on_error(f));
        self
    }

    /// Set a custom payload transform.
    #[must_use]
    pub fn transform_data<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<Option<Bytes>> + Send + Sync + 'static,
    {
        self.transform_data = Some(TransformData::custom(f));
        self
    }

    /// The configured method override, if any.
    #[must_use]
    pub const fn method_override(&self) -> Option<Method> {
        self.method
    }

    /// The configured before-send interceptor, if any.
    #[must_use]
    pub const fn before_send_interceptor(&self) -> Option<&Interceptor<BeforeSendFn>> {
        self.before_send.as_ref()
    }
}
